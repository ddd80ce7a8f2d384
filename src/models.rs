use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorrectionRequest {
    pub sentence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PronunciationEvalRequest {
    pub target: String,
    pub spoken: String,
}

// Every field is optional: the service may omit anything, and on failure it
// answers with only `error`. List fields that arrive as something other than a
// list are treated as absent.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CorrectionResponse {
    pub error: Option<String>,
    pub corrected: Option<String>,
    pub translation_en: Option<String>,
    #[serde(deserialize_with = "explanation_list")]
    pub explanations: Vec<String>,
    pub pronunciation_overview: Option<String>,
    /// Older service versions send the overview under this name.
    pub pronunciation_guide: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub pronunciation_breakdown: Vec<BreakdownItem>,
    pub tone_feedback: Option<String>,
    pub verb_base: Option<String>,
    pub verb_meaning_en: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub verb_conjugation: Vec<ConjugationEntry>,
    #[serde(deserialize_with = "lenient_list")]
    pub verb_examples: Vec<VerbExample>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BreakdownItem {
    #[serde(deserialize_with = "lenient_text")]
    pub part: String,
    #[serde(deserialize_with = "lenient_text")]
    pub tip: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConjugationEntry {
    #[serde(deserialize_with = "lenient_text")]
    pub person: String,
    #[serde(deserialize_with = "lenient_text")]
    pub form: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerbExample {
    #[serde(deserialize_with = "lenient_text")]
    pub fi: String,
    #[serde(deserialize_with = "lenient_text")]
    pub en: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PronunciationEvalResponse {
    pub error: Option<String>,
    pub match_quality: Option<String>,
    pub overall_comment: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub problem_words: Vec<ProblemWord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProblemWord {
    #[serde(deserialize_with = "lenient_text")]
    pub word: String,
    #[serde(deserialize_with = "lenient_text")]
    pub tip: String,
}

/// Returns the trimmed value when it carries any text.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl CorrectionResponse {
    /// The service-reported failure, if any.
    pub fn service_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }

    /// Primary overview field first, legacy guide second.
    pub fn overview(&self) -> Option<&str> {
        non_empty(&self.pronunciation_overview).or_else(|| non_empty(&self.pronunciation_guide))
    }
}

impl PronunciationEvalResponse {
    pub fn service_error(&self) -> Option<&str> {
        non_empty(&self.error)
    }
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                let item = if item.is_object() { item } else { Value::Object(Default::default()) };
                serde_json::from_value(item).map_err(serde::de::Error::custom)
            })
            .collect(),
        _ => Ok(Vec::new()),
    }
}

// Non-string entries are stringified, empty ones dropped; a bare string
// instead of a list counts as a single explanation.
fn explanation_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::String(s) => vec![Value::String(s)],
        _ => Vec::new(),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .collect())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
