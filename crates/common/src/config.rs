use std::time::Duration;

pub const DEFAULT_NGI_API_BASE: &str = "https://api.ngidata.com";

/// Strips evaluated per trade date when a request does not say otherwise.
pub const DEFAULT_NUM_STRIPS: usize = 5;

/// Where forward curves come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveSource {
    /// Live datafeed, authenticated with an account email and API key.
    Ngi {
        base_url: String,
        email: String,
        api_key: String,
    },
    /// Recorded snapshots read from a JSON file.
    Replay { path: String },
}

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Forward curve provider
    pub curve_source: CurveSource,
    pub http_timeout: Duration,

    // Dashboard
    pub dashboard_token: String,
    pub dashboard_port: u16,

    // Calculation defaults
    pub default_num_strips: usize,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let curve_source = match required_env("CURVE_SOURCE").to_lowercase().as_str() {
            "ngi" => CurveSource::Ngi {
                base_url: optional_env("NGI_API_BASE")
                    .unwrap_or_else(|| DEFAULT_NGI_API_BASE.to_string()),
                email: required_env("NGI_EMAIL"),
                api_key: required_env("NGI_API_KEY"),
            },
            "replay" => CurveSource::Replay {
                path: required_env("REPLAY_FILE"),
            },
            other => panic!("ERROR: CURVE_SOURCE must be 'ngi' or 'replay', got: '{other}'"),
        };

        let default_num_strips = optional_env("DEFAULT_NUM_STRIPS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_NUM_STRIPS);
        if default_num_strips == 0 {
            panic!("DEFAULT_NUM_STRIPS must be at least 1");
        }

        Config {
            curve_source,
            http_timeout: Duration::from_secs(
                optional_env("HTTP_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            dashboard_token: required_env("DASHBOARD_TOKEN"),
            dashboard_port: optional_env("DASHBOARD_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            default_num_strips,
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
