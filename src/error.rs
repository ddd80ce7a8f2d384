use thiserror::Error;

/// Failures talking to the correction / pronunciation-evaluation service.
///
/// A service that answers 2xx with an `error` member is *not* an `ApiError`;
/// that case is carried in the decoded response and shown to the user verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode service response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech capability is not available on this host")]
    Unavailable,

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("could not start speech recognition: {0}")]
    Recognition(String),
}
