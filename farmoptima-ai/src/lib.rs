//! farmoptima-ai: farm efficiency analysis gateway
//!
//! Renders the field and machine collections into a fixed prompt, sends it
//! to a hosted text-generation model, and decodes the structured reply into
//! an [`AnalysisResult`]. Results are transient; nothing here touches the store.

pub mod config;
pub mod error;
pub mod prompt;
pub mod services;

pub use crate::config::GatewaySettings;
pub use crate::error::AnalysisError;
pub use crate::services::GeminiClient;
pub use farmoptima_common::models::AnalysisResult;

use farmoptima_common::config::AnalysisConfig;
use farmoptima_common::FarmStore;

/// Build a client from config, resolving the API key
pub fn client_from_config(config: &AnalysisConfig) -> Result<GeminiClient, AnalysisError> {
    GeminiClient::new(GatewaySettings::from_config(config)?)
}

/// Analyze the store's current fields and machines
pub async fn analyze_store(
    client: &GeminiClient,
    store: &FarmStore,
) -> Result<AnalysisResult, AnalysisError> {
    let fields = store.fields().get();
    let machines = store.machines().get();
    client.analyze(&fields, &machines).await
}
