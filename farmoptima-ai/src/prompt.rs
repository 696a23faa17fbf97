//! Analysis prompt and response schema

use farmoptima_common::models::{Field, Machine};
use serde_json::{json, Value};

use crate::error::AnalysisError;

/// Render the fixed consultant prompt around the farm's fields and machinery
pub fn build_prompt(fields: &[Field], machines: &[Machine]) -> Result<String, AnalysisError> {
    let fields_json = serde_json::to_string_pretty(fields)?;
    let machines_json = serde_json::to_string_pretty(machines)?;

    Ok(format!(
        "You are an expert agricultural consultant. Analyze the following farm data:\n\
         \n\
         Fields:\n\
         {fields_json}\n\
         \n\
         Machinery:\n\
         {machines_json}\n\
         \n\
         Please provide:\n\
         1. An efficiency score (0-100) based on the ratio of horsepower/equipment to acreage.\n\
         2. A brief summary of the farm's operational capacity.\n\
         3. A list of specific recommendations to improve efficiency or identify missing/redundant equipment.\n"
    ))
}

/// Structured output schema handed to the model
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "efficiencyScore": { "type": "NUMBER" },
            "summary": { "type": "STRING" },
            "recommendations": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["efficiencyScore", "summary", "recommendations"]
    })
}
