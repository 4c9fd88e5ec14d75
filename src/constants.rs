/// User agent string for HTTP requests
pub const USER_AGENT: &str = "astro-forecast/0.1.0";

/// OpenAI-compatible API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Chat model used for generated forecasts
pub const OPENAI_MODEL: &str = "gpt-4o";

/// Sampling temperature for generated forecasts
pub const NARRATIVE_TEMPERATURE: f64 = 0.7;

/// Upper bound on generated forecast length
pub const NARRATIVE_MAX_TOKENS: u32 = 2500;

/// System persona for generated forecasts
pub const NARRATIVE_SYSTEM_PROMPT: &str =
    "Ты опытный астролог. Пишешь детальные персональные прогнозы на русском языке.";

/// Julian day of the J2000.0 epoch (2000-01-01T12:00:00Z)
pub const J2000_JD: f64 = 2_451_545.0;

/// Julian day of the Unix epoch
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Maximum number of cities returned by a search
pub const MAX_CITY_RESULTS: usize = 50;

/// Default forecast period length in days
pub const FORECAST_DAYS: u32 = 30;
