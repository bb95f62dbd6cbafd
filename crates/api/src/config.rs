use kitcheck_core::catalog::DEFAULT_CLASSES;
use kitcheck_core::detector::DEFAULT_BASE_CONFIDENCE;

use crate::auth::jwt::JwtConfig;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Model backend settings.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Master switch (`USE_DETECTOR`). When off the stub is always used.
    pub enabled: bool,
    /// HTTP inference endpoint (`ML_ENDPOINT`).
    pub endpoint: Option<String>,
    /// Base confidence sent to the model.
    pub confidence: f64,
    pub timeout_secs: u64,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub app_name: String,
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins. A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL URL. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Tool classes every kit must contain, in display order.
    pub classes: Vec<String>,
    pub detector: DetectorConfig,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                        |
    /// |-------------------------|------------------------------------------------|
    /// | `APP_NAME`              | `Aero Kit Check Backend`                       |
    /// | `HOST`                  | `127.0.0.1`                                    |
    /// | `PORT`                  | `8000`                                         |
    /// | `CORS_ORIGINS`          | `http://localhost:8080,http://127.0.0.1:8080`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                           |
    /// | `DATABASE_URL`          | unset (in-memory store)                        |
    /// | `CLASSES`               | the 11 standard tool classes                   |
    /// | `USE_DETECTOR`          | `true`                                         |
    /// | `ML_ENDPOINT`           | unset (stub output)                            |
    /// | `DETECTOR_CONFIDENCE`   | `0.25`                                         |
    /// | `DETECTOR_TIMEOUT_SECS` | `10`                                           |
    /// | `LOG_FORMAT`            | `pretty` (`json` for JSON lines)               |
    ///
    /// `CORS_ORIGINS` and `CLASSES` accept a comma-separated list or a JSON
    /// array of strings. JWT settings come from [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on malformed numeric or boolean values.
    pub fn from_env() -> Self {
        let app_name = env_or("APP_NAME", "Aero Kit Check Backend");
        let host = env_or("HOST", "127.0.0.1");

        let port: u16 = env_or("PORT", "8000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_list(&env_or(
            "CORS_ORIGINS",
            "http://localhost:8080,http://127.0.0.1:8080",
        ));

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let classes = match std::env::var("CLASSES") {
            Ok(raw) if !raw.trim().is_empty() => parse_list(&raw),
            _ => DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect(),
        };

        let detector = DetectorConfig {
            enabled: parse_bool(&env_or("USE_DETECTOR", "true"))
                .expect("USE_DETECTOR must be a boolean"),
            endpoint: std::env::var("ML_ENDPOINT")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            confidence: env_or("DETECTOR_CONFIDENCE", &DEFAULT_BASE_CONFIDENCE.to_string())
                .parse()
                .expect("DETECTOR_CONFIDENCE must be a valid f64"),
            timeout_secs: env_or("DETECTOR_TIMEOUT_SECS", "10")
                .parse()
                .expect("DETECTOR_TIMEOUT_SECS must be a valid u64"),
        };

        let log_format = match env_or("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            app_name,
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            jwt: JwtConfig::from_env(),
            classes,
            detector,
            log_format,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated list or a JSON array of strings.
pub fn parse_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
            return items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
