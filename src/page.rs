//! The logical UI surface the controller drives: one input, two feedback
//! regions, a status line, a blocking notice and the dynamically bound listen
//! trigger. Hosts read it back and paint it however they like.

use crate::render::{CorrectionView, EvaluationView, escape_html, message_html};

pub const FEEDBACK_PLACEHOLDER: &str = "No feedback yet. Write a sentence and click the button.";
pub const PRONUNCIATION_PLACEHOLDER: &str = "No pronunciation check yet.";
pub const WRITE_SENTENCE_FIRST: &str = "Please write a sentence first.";
pub const ANALYZING_SENTENCE: &str = "Analyzing your sentence...";
pub const FEEDBACK_FAILED: &str = "Something went wrong while getting feedback.";
pub const GET_FEEDBACK_FIRST: &str =
    "Please get text feedback first (or write a sentence) before pronunciation check.";
pub const ANALYZING_PRONUNCIATION: &str = "Analyzing your pronunciation...";
pub const PRONUNCIATION_FAILED: &str = "Something went wrong while analyzing pronunciation.";
pub const LISTENING: &str = "Listening... please speak your sentence.";
pub const STOPPED_LISTENING: &str = "Stopped listening.";
pub const SYNTHESIS_UNSUPPORTED: &str = "Your browser does not support speech synthesis.";
pub const RECOGNITION_UNSUPPORTED: &str =
    "Your browser does not support speech recognition. Try Chrome.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Analyzing,
    Rendered,
    Errored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionContent {
    Message(String),
    ServiceError(String),
    Correction(CorrectionView),
    Evaluation(EvaluationView),
}

impl RegionContent {
    pub fn message(text: &str) -> Self {
        RegionContent::Message(text.to_string())
    }

    pub fn to_html(&self) -> String {
        match self {
            RegionContent::Message(text) => message_html(text),
            RegionContent::ServiceError(text) => format!("<p>Error: {}</p>", escape_html(text)),
            RegionContent::Correction(view) => view.to_html(),
            RegionContent::Evaluation(view) => view.to_html(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub content: RegionContent,
    pub state: InteractionState,
}

impl Region {
    fn idle(placeholder: &str) -> Self {
        Region {
            content: RegionContent::message(placeholder),
            state: InteractionState::Idle,
        }
    }

    pub fn show(&mut self, content: RegionContent, state: InteractionState) {
        self.content = content;
        self.state = state;
    }

    pub fn html(&self) -> String {
        self.content.to_html()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub sentence_input: String,
    pub feedback: Region,
    pub pronunciation: Region,
    pub speech_status: String,
    /// Blocking notice (an alert in a browser host).
    pub notice: Option<String>,
    /// Sentence the listen trigger plays; `None` while no trigger exists.
    pub listen_target: Option<String>,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            sentence_input: String::new(),
            feedback: Region::idle(FEEDBACK_PLACEHOLDER),
            pronunciation: Region::idle(PRONUNCIATION_PLACEHOLDER),
            speech_status: String::new(),
            notice: None,
            listen_target: None,
        }
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts every element back to its initial state.
    pub fn reset(&mut self) {
        *self = Page::default();
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}
