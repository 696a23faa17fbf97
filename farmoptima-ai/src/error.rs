//! Error types for farmoptima-ai

use thiserror::Error;

/// Message shown to the user for any analysis failure
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze data. Please try again.";

/// Analysis gateway errors
///
/// Every variant is a hard failure: no partial result, no retry.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis API key not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API key rejected ({0})")]
    Unauthorized(u16),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Generic user-facing text; details go to the log
    pub fn user_message(&self) -> &'static str {
        ANALYSIS_FAILED_MESSAGE
    }
}
