use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // AI extraction
    pub gemini_api_key: String,
    pub gemini_model: String,

    // Geocoding + place details
    pub maps_api_key: String,

    // Instagram metadata (RapidAPI)
    pub rapid_api_key: String,

    // Firestore
    pub firebase_project_id: String,
    pub firebase_api_key: String,

    /// Hard wall-clock deadline per submission, in seconds.
    pub deadline_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: required_env("GEMINI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            maps_api_key: required_env("MAPS_API_KEY"),
            rapid_api_key: required_env("RAPID_API_KEY"),
            firebase_project_id: required_env("FIREBASE_PROJECT_ID"),
            firebase_api_key: required_env("FIREBASE_API_KEY"),
            deadline_secs: env::var("PIPELINE_DEADLINE_SECS")
                .unwrap_or_else(|_| "540".to_string())
                .parse()
                .expect("PIPELINE_DEADLINE_SECS must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
