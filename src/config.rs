//! Startup configuration from environment variables

use crate::agent::DEFAULT_MAX_TOOL_ROUNDS;
use crate::llm::OpenAiConfig;
use crate::weather::OpenMeteoConfig;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Everything `main` needs to wire the server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub openai: OpenAiConfig,
    pub open_meteo: OpenMeteoConfig,
    pub max_tool_rounds: usize,
    /// Per-step limit for workflow runs; `None` waits indefinitely
    pub step_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable numbers fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        // Whole-request limit for Open-Meteo; connect and idle limit for streamed replies
        let timeout = Duration::from_secs(number("HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS));

        let openai_defaults = OpenAiConfig::default();
        let openai = OpenAiConfig {
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or(openai_defaults.base_url),
            model: lookup("OPENAI_MODEL").unwrap_or(openai_defaults.model),
            idle_timeout: timeout,
        };

        let meteo_defaults = OpenMeteoConfig::default();
        let open_meteo = OpenMeteoConfig {
            geocoding_base_url: lookup("GEOCODING_BASE_URL")
                .unwrap_or(meteo_defaults.geocoding_base_url),
            forecast_base_url: lookup("FORECAST_BASE_URL")
                .unwrap_or(meteo_defaults.forecast_base_url),
            timeout,
        };

        Self {
            port: lookup("FORECAST_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            openai,
            open_meteo,
            max_tool_rounds: number("MAX_TOOL_ROUNDS")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(DEFAULT_MAX_TOOL_ROUNDS),
            step_timeout: number("WORKFLOW_STEP_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.openai.api_key, None);
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.idle_timeout, Duration::from_secs(60));
        assert_eq!(
            config.open_meteo.geocoding_base_url,
            "https://geocoding-api.open-meteo.com"
        );
        assert_eq!(config.max_tool_rounds, DEFAULT_MAX_TOOL_ROUNDS);
        assert_eq!(config.step_timeout, None);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("FORECAST_PORT", "9090"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("FORECAST_BASE_URL", "http://127.0.0.1:1234"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("MAX_TOOL_ROUNDS", "2"),
            ("WORKFLOW_STEP_TIMEOUT_SECS", "30"),
        ]);
        assert_eq!(config.port, 9090);
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.open_meteo.forecast_base_url, "http://127.0.0.1:1234");
        assert_eq!(config.open_meteo.timeout, Duration::from_secs(5));
        assert_eq!(config.openai.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.max_tool_rounds, 2);
        assert_eq!(config.step_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_garbage_falls_back() {
        let config = config(&[
            ("FORECAST_PORT", "eighty"),
            ("OPENAI_API_KEY", ""),
            ("WORKFLOW_STEP_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.openai.api_key, None);
        assert_eq!(config.step_timeout, None);
    }
}
