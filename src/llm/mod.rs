pub mod client;
pub mod error;
pub mod response;
pub mod secrets;

pub use client::{LessonClient, ensure_client, test_configured_api_key};
pub use error::LlmError;
pub use secrets::{ApiKeySource, clear_api_key, prompt_for_api_key, store_api_key};
