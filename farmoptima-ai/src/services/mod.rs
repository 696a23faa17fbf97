//! External service clients

pub mod gemini_client;

pub use gemini_client::{parse_analysis, GeminiClient};
