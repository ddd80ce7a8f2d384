use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::*;

pub const CORRECT_PATH: &str = "/api/correct";
pub const PRONUNCIATION_EVAL_PATH: &str = "/api/pronunciation-eval";

/// The two calls the controller makes against the correction service.
pub trait FeedbackService {
    fn correct(
        &self,
        sentence: &str,
    ) -> impl Future<Output = Result<CorrectionResponse, ApiError>> + Send;

    fn evaluate_pronunciation(
        &self,
        target: &str,
        spoken: &str,
    ) -> impl Future<Output = Result<PronunciationEvalResponse, ApiError>> + Send;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = ClientBuilder::new();
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(ApiClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One POST, no retry. Non-2xx answers become [`ApiError::Status`].
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "posting request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(%url, status = status.as_u16(), bytes = text.len(), "response received");
        Ok(serde_json::from_str(&text)?)
    }
}

impl FeedbackService for ApiClient {
    async fn correct(&self, sentence: &str) -> Result<CorrectionResponse, ApiError> {
        let request = CorrectionRequest {
            sentence: sentence.to_string(),
        };
        self.post_json(CORRECT_PATH, &request).await
    }

    async fn evaluate_pronunciation(
        &self,
        target: &str,
        spoken: &str,
    ) -> Result<PronunciationEvalResponse, ApiError> {
        let request = PronunciationEvalRequest {
            target: target.to_string(),
            spoken: spoken.to_string(),
        };
        self.post_json(PRONUNCIATION_EVAL_PATH, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://localhost:5000/".to_string(),
            request_timeout_seconds: Some(5),
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn status_error_message_carries_status_and_body() {
        let err = ApiError::Status {
            status: 500,
            body: "{\"error\":\"boom\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request failed with status 500: {\"error\":\"boom\"}"
        );
    }
}
