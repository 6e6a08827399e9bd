pub mod image; // Decode uploads, re-encode as JPEG data URLs
pub mod openai; // OpenAI-compatible chat completions
pub mod prompt;

pub use openai::{InferenceService, OpenAiClient};
