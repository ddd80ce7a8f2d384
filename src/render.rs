//! View models for service feedback and their markup.
//!
//! Formatting decisions (which sections appear, which words are bold, how verb
//! rows pair up) are made while building the view model, so they can be checked
//! without looking at markup. `to_html` only lays the model out.

use regex::RegexBuilder;

use crate::models::*;

/// A run of text inside an explanation note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub strong: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Segment { text: text.to_string(), strong: false }
    }

    fn strong(text: &str) -> Self {
        Segment { text: text.to_string(), strong: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Explanation {
    /// No usable `term: note` shape; shown as-is.
    Plain(String),
    /// `term: note`, with every whole-word occurrence of the term inside the
    /// note split out as a strong segment.
    Labelled { term: String, note: Vec<Segment> },
}

impl Explanation {
    pub fn parse(text: &str) -> Self {
        let Some(colon) = text.find(':').filter(|&i| i > 0) else {
            return Explanation::Plain(text.to_string());
        };

        let term = text[..colon].trim();
        let rest = text[colon + 1..].trim();
        if term.is_empty() {
            return Explanation::Plain(text.to_string());
        }

        Explanation::Labelled {
            term: term.to_string(),
            note: highlight_term(rest, term),
        }
    }

    fn to_html(&self) -> String {
        match self {
            Explanation::Plain(text) => escape_html(text),
            Explanation::Labelled { term, note } => {
                let mut html = format!("<strong>{}:</strong> ", escape_html(term));
                for segment in note {
                    if segment.strong {
                        html.push_str(&format!("<strong>{}</strong>", escape_html(&segment.text)));
                    } else {
                        html.push_str(&escape_html(&segment.text));
                    }
                }
                html
            }
        }
    }
}

/// Splits `text` around case-insensitive whole-word matches of `term`.
pub fn highlight_term(text: &str, term: &str) -> Vec<Segment> {
    let pattern = format!(r"\b{}\b", regex::escape(term));
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(term, error = %e, "could not build highlight pattern");
            return vec![Segment::plain(text)];
        }
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::plain(&text[last..m.start()]));
        }
        segments.push(Segment::strong(m.as_str()));
        last = m.end();
    }
    if last < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[last..]));
    }
    segments
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerbRow {
    pub person: String,
    pub form: String,
    pub example_fi: String,
    pub example_en: String,
}

impl VerbRow {
    pub fn is_blank(&self) -> bool {
        self.person.is_empty()
            && self.form.is_empty()
            && self.example_fi.is_empty()
            && self.example_en.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbPractice {
    pub label: String,
    pub rows: Vec<VerbRow>,
}

/// Pairs conjugations with examples by position. The result has as many rows
/// as the longer list; rows with nothing in any cell are dropped.
pub fn pair_verb_rows(conjugation: &[ConjugationEntry], examples: &[VerbExample]) -> Vec<VerbRow> {
    let len = conjugation.len().max(examples.len());
    (0..len)
        .map(|i| {
            let c = conjugation.get(i);
            let e = examples.get(i);
            VerbRow {
                person: c.map(|c| c.person.clone()).unwrap_or_default(),
                form: c.map(|c| c.form.clone()).unwrap_or_default(),
                example_fi: e.map(|e| e.fi.clone()).unwrap_or_default(),
                example_en: e.map(|e| e.en.clone()).unwrap_or_default(),
            }
        })
        .filter(|row| !row.is_blank())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionView {
    pub corrected: String,
    pub translation: Option<String>,
    pub explanations: Vec<Explanation>,
    pub overview: Option<String>,
    pub breakdown: Vec<BreakdownItem>,
    pub tone: Option<String>,
    pub verb: Option<VerbPractice>,
}

impl CorrectionView {
    /// `corrected` is the sentence already chosen for the session (the service's
    /// correction, or the learner's own input when the service gave none).
    pub fn build(response: &CorrectionResponse, corrected: &str) -> Self {
        let verb = non_empty(&response.verb_base).map(|base| {
            let label = match non_empty(&response.verb_meaning_en) {
                Some(meaning) => format!("{base} – {meaning}"),
                None => base.to_string(),
            };
            VerbPractice {
                label,
                rows: pair_verb_rows(&response.verb_conjugation, &response.verb_examples),
            }
        });

        CorrectionView {
            corrected: corrected.to_string(),
            translation: non_empty(&response.translation_en).map(str::to_string),
            explanations: response
                .explanations
                .iter()
                .map(|text| Explanation::parse(text))
                .collect(),
            overview: response.overview().map(str::to_string),
            breakdown: response
                .pronunciation_breakdown
                .iter()
                .filter(|item| !item.part.is_empty() || !item.tip.is_empty())
                .cloned()
                .collect(),
            tone: non_empty(&response.tone_feedback).map(str::to_string),
            verb,
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(2048);

        html.push_str(&format!(
            "<p><strong>Corrected sentence (FI):</strong><br>{}</p>",
            escape_html(&self.corrected)
        ));
        html.push_str("<p><button id=\"listen-btn\">🔊 Listen</button></p>");

        if let Some(translation) = &self.translation {
            html.push_str(&format!(
                "<p><strong>Translation (EN):</strong><br>{}</p>",
                escape_html(translation)
            ));
        }

        if !self.explanations.is_empty() {
            html.push_str("<p><strong>Grammar / usage notes:</strong></p><ul>");
            for explanation in &self.explanations {
                html.push_str(&format!("<li>{}</li>", explanation.to_html()));
            }
            html.push_str("</ul>");
        }

        if let Some(overview) = &self.overview {
            html.push_str(&format!(
                "<p><strong>Pronunciation hints (overview):</strong><br>{}</p>",
                escape_html(overview)
            ));
        }

        if !self.breakdown.is_empty() {
            html.push_str("<p><strong>Pronunciation by word/part:</strong></p><ul>");
            for item in &self.breakdown {
                html.push_str(&format!(
                    "<li><strong>{}:</strong> {}</li>",
                    escape_html(&item.part),
                    escape_html(&item.tip)
                ));
            }
            html.push_str("</ul>");
        }

        if let Some(tone) = &self.tone {
            html.push_str(&format!("<p><em>{}</em></p>", escape_html(tone)));
        }

        if let Some(verb) = &self.verb {
            html.push_str(&format!(
                "<hr><p><strong>Verb practice:</strong> {}</p>",
                escape_html(&verb.label)
            ));
            html.push_str("<table class=\"verb-table\"><thead><tr>");
            html.push_str("<th>Person</th><th>Verb form</th><th>Example (FI)</th><th>Example (EN)</th>");
            html.push_str("</tr></thead><tbody>");
            for row in &verb.rows {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td><em>{}</em></td></tr>",
                    escape_html(&row.person),
                    escape_html(&row.form),
                    escape_html(&row.example_fi),
                    escape_html(&row.example_en)
                ));
            }
            html.push_str("</tbody></table>");
        }

        html
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationView {
    pub match_quality: Option<String>,
    pub overall_comment: Option<String>,
    pub problem_words: Vec<ProblemWord>,
}

impl EvaluationView {
    pub fn build(response: &PronunciationEvalResponse) -> Self {
        EvaluationView {
            match_quality: non_empty(&response.match_quality).map(str::to_string),
            overall_comment: non_empty(&response.overall_comment).map(str::to_string),
            problem_words: response.problem_words.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.match_quality.is_none() && self.overall_comment.is_none() && self.problem_words.is_empty()
    }

    pub fn to_html(&self) -> String {
        if self.is_empty() {
            return message_html(NO_DETAILED_FEEDBACK);
        }

        let mut html = String::new();
        if let Some(quality) = &self.match_quality {
            html.push_str(&format!("<p><strong>Match quality:</strong> {}</p>", escape_html(quality)));
        }
        if let Some(comment) = &self.overall_comment {
            html.push_str(&format!(
                "<p><strong>Overall comment:</strong><br>{}</p>",
                escape_html(comment)
            ));
        }
        if !self.problem_words.is_empty() {
            html.push_str("<p><strong>Words to practice:</strong></p><ul>");
            for item in &self.problem_words {
                html.push_str(&format!(
                    "<li><strong>{}:</strong> {}</li>",
                    escape_html(&item.word),
                    escape_html(&item.tip)
                ));
            }
            html.push_str("</ul>");
        }
        html
    }
}

pub const NO_DETAILED_FEEDBACK: &str = "No detailed feedback returned.";

pub fn message_html(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text))
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
