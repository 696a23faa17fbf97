//! Hosted text-generation client for farm analysis
//!
//! One `generateContent` request per analysis. No retries, no caching, no
//! streaming; the caller re-invokes on failure.

use farmoptima_common::models::{AnalysisResult, Field, Machine};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::config::GatewaySettings;
use crate::error::AnalysisError;
use crate::prompt::{build_prompt, response_schema};

const USER_AGENT: &str = concat!("FarmOptima/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-goog-api-key";

/// `generateContent` response, only the parts we read
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Analysis gateway client
pub struct GeminiClient {
    http_client: reqwest::Client,
    settings: GatewaySettings,
}

impl GeminiClient {
    pub fn new(settings: GatewaySettings) -> Result<Self, AnalysisError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    /// `{endpoint}/models/{model}:generateContent`
    pub fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint, self.settings.model
        )
    }

    /// Ask the hosted model for an efficiency analysis of the farm
    pub async fn analyze(
        &self,
        fields: &[Field],
        machines: &[Machine],
    ) -> Result<AnalysisResult, AnalysisError> {
        let result = self.request_analysis(fields, machines).await;
        match &result {
            Ok(analysis) => info!(
                efficiency_score = analysis.efficiency_score,
                recommendations = analysis.recommendations.len(),
                "Farm analysis received"
            ),
            Err(e) => error!(error = %e, "Farm analysis failed"),
        }
        result
    }

    async fn request_analysis(
        &self,
        fields: &[Field],
        machines: &[Machine],
    ) -> Result<AnalysisResult, AnalysisError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(fields, machines)? }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        });

        debug!(
            model = %self.settings.model,
            fields = fields.len(),
            machines = machines.len(),
            "Requesting farm analysis"
        );

        let response = self
            .http_client
            .post(self.request_url())
            .header(API_KEY_HEADER, self.settings.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(AnalysisError::Unauthorized(status.as_u16()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api(status.as_u16(), error_text));
        }

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        let text = generated
            .first_text()
            .ok_or_else(|| AnalysisError::MalformedResponse("response has no text".to_string()))?;

        parse_analysis(&text)
    }
}

/// Decode the model's JSON text into an [`AnalysisResult`]
///
/// The score must be a finite number within 0-100.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let analysis: AnalysisResult = serde_json::from_str(text.trim())
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

    if !analysis.efficiency_score.is_finite() || !(0.0..=100.0).contains(&analysis.efficiency_score) {
        return Err(AnalysisError::MalformedResponse(format!(
            "efficiency score {} outside 0-100",
            analysis.efficiency_score
        )));
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings() -> GatewaySettings {
        GatewaySettings {
            api_key: "test_key".to_string(),
            endpoint: "http://127.0.0.1:1/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_client_creation() {
        assert!(GeminiClient::new(settings()).is_ok());
    }

    #[test]
    fn test_request_url() {
        let client = GeminiClient::new(settings()).unwrap();
        assert_eq!(
            client.request_url(),
            "http://127.0.0.1:1/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_parse_analysis_ok() {
        let analysis = parse_analysis(
            r#" {"efficiencyScore": 81.5, "summary": "Well equipped", "recommendations": ["Sell the spare ATV", "Add a planter"]} "#,
        )
        .unwrap();
        assert_eq!(analysis.efficiency_score, 81.5);
        assert_eq!(analysis.recommendations.len(), 2);
        assert_eq!(analysis.recommendations[0], "Sell the spare ATV");
    }

    #[test]
    fn test_parse_analysis_rejects_bad_shapes() {
        for text in [
            "not json",
            r#"{"summary": "no score", "recommendations": []}"#,
            r#"{"efficiencyScore": "high", "summary": "", "recommendations": []}"#,
            r#"{"efficiencyScore": 50, "summary": "", "recommendations": "one"}"#,
            r#"{"efficiencyScore": 140, "summary": "", "recommendations": []}"#,
            r#"{"efficiencyScore": -1, "summary": "", "recommendations": []}"#,
        ] {
            assert!(
                matches!(parse_analysis(text), Err(AnalysisError::MalformedResponse(_))),
                "should reject {}",
                text
            );
        }
    }

    #[test]
    fn test_first_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(response.first_text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.first_text().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let client = GeminiClient::new(settings()).unwrap();
        let result = client.analyze(&[], &[]).await;
        assert!(matches!(result, Err(AnalysisError::Network(_))));
    }
}
