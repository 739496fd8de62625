//! Server configuration, read from environment variables with sane
//! defaults: a single config struct built once at startup rather than
//! scattering `env::var` calls.

use std::net::SocketAddr;

use rating_core::upload::{DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_MB};

/// Runtime configuration for `rating-server`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: std::path::PathBuf,
    pub embedding_base_url: Option<String>,
    pub embedding_model: String,
    pub llm_base_url: Option<String>,
    pub llm_model: String,
    pub max_retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    /// Allowed CORS origins. `None` means "allow any" (the local-dev
    /// default); `Some(origins)` restricts to an explicit allow-list.
    pub cors_origins: Option<Vec<String>>,
    pub log_level: String,
    pub max_upload_mb: u64,
    pub allowed_file_extensions: Vec<String>,
    pub metrics_enabled: bool,
    pub json_logging: bool,
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults suited to local development.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("RATING_SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let data_dir = std::env::var("RATING_SERVER_DATA_DIR")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| std::path::PathBuf::from("."))
                    .join("rating-server")
            });

        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            data_dir,
            embedding_base_url: std::env::var("RATING_EMBEDDING_URL").ok(),
            embedding_model: std::env::var("RATING_EMBEDDING_MODEL")
                .unwrap_or_else(|_| "nomic-embed-text".to_string()),
            llm_base_url: std::env::var("RATING_LLM_URL").ok(),
            llm_model: std::env::var("RATING_LLM_MODEL").unwrap_or_else(|_| "llama3".to_string()),
            max_retry_attempts: std::env::var("RATING_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_base_delay_ms: std::env::var("RATING_RETRY_BASE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),
            cors_origins: std::env::var("RATING_CORS_ORIGINS").ok().map(|v| {
                v.split(',').map(|origin| origin.trim().to_string()).filter(|o| !o.is_empty()).collect()
            }),
            log_level: std::env::var("RATING_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            max_upload_mb: std::env::var("RATING_MAX_UPLOAD_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_MB),
            allowed_file_extensions: std::env::var("RATING_ALLOWED_EXTENSIONS")
                .ok()
                .map(|v| v.split(',').map(|ext| ext.trim().to_string()).filter(|e| !e.is_empty()).collect())
                .unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect()),
            metrics_enabled: std::env::var("RATING_METRICS_ENABLED")
                .ok()
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            json_logging: std::env::var("RATING_JSON_LOGGING")
                .ok()
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_to_port_8080_when_unset() {
        std::env::remove_var("RATING_SERVER_PORT");
        let config = AppConfig::from_env();
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn defaults_upload_limits_when_unset() {
        std::env::remove_var("RATING_MAX_UPLOAD_MB");
        std::env::remove_var("RATING_ALLOWED_EXTENSIONS");
        std::env::remove_var("RATING_CORS_ORIGINS");
        let config = AppConfig::from_env();
        assert_eq!(config.max_upload_mb, DEFAULT_MAX_UPLOAD_MB);
        assert_eq!(config.allowed_file_extensions, DEFAULT_ALLOWED_EXTENSIONS.to_vec());
        assert!(config.cors_origins.is_none());
    }

    #[test]
    fn parses_a_comma_separated_cors_allow_list() {
        std::env::set_var("RATING_CORS_ORIGINS", "https://a.example, https://b.example");
        let config = AppConfig::from_env();
        assert_eq!(config.cors_origins, Some(vec!["https://a.example".to_string(), "https://b.example".to_string()]));
        std::env::remove_var("RATING_CORS_ORIGINS");
    }
}
