pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod page;
pub mod render;
pub mod session;
pub mod speech;
pub mod tts;

pub use api::{ApiClient, FeedbackService};
pub use config::Config;
pub use controller::FeedbackController;
pub use error::{ApiError, SpeechError};
pub use models::*;
