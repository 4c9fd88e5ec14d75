use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::chart::ChartRecord;

// ============================================================================
// Chart API Models
// ============================================================================

/// Birth data submitted by a client.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    /// Recipient name used to personalise the forecast
    #[serde(default)]
    pub name: Option<String>,
    /// City name exactly as listed by the city search
    pub city: String,
    /// Birth date, YYYY-MM-DD
    pub date: String,
    /// Local birth time, HH:MM or HH:MM:SS
    pub time: String,
    /// Minutes east of UTC for the local birth time; 0 when omitted
    #[serde(default)]
    pub utc_offset: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub success: bool,
    pub data: ChartRecord,
}

#[derive(Debug, Default, Deserialize)]
pub struct CitySearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

// ============================================================================
// Chat Completions API Models
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SearchCitiesRequest {
    /// Case-insensitive fragment of a city name; empty lists the first cities
    #[serde(default)]
    pub search: String,
}
