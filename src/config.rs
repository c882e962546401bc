use crate::errors::ConfigError;
use crate::gemini::{GeminiSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use std::{env, path::PathBuf, str::FromStr, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_ROLLOVER_SECS: u64 = 60;
const DEFAULT_HEART_RATE_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub gemini: GeminiSettings,
    pub rollover_interval: Duration,
    pub heart_rate_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = var("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let gemini = GeminiSettings {
            endpoint: var("HEALTH_AI_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: var("HEALTH_AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: var("API_KEY").or_else(|| var("GEMINI_API_KEY")),
            temperature: parse_var(
                "HEALTH_AI_TEMPERATURE",
                var("HEALTH_AI_TEMPERATURE"),
                DEFAULT_TEMPERATURE,
            )?,
            timeout: match var("HEALTH_AI_TIMEOUT_SECS") {
                Some(value) => Some(Duration::from_secs(positive_secs(
                    "HEALTH_AI_TIMEOUT_SECS",
                    &value,
                )?)),
                None => None,
            },
        };

        let rollover_interval = Duration::from_secs(match var("ROLLOVER_INTERVAL_SECS") {
            Some(value) => positive_secs("ROLLOVER_INTERVAL_SECS", &value)?,
            None => DEFAULT_ROLLOVER_SECS,
        });
        let heart_rate_interval = Duration::from_secs(match var("HEART_RATE_INTERVAL_SECS") {
            Some(value) => positive_secs("HEART_RATE_INTERVAL_SECS", &value)?,
            None => DEFAULT_HEART_RATE_SECS,
        });

        Ok(Self {
            port,
            data_path,
            gemini,
            rollover_interval,
            heart_rate_interval,
        })
    }
}

fn parse_var<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|err: T::Err| ConfigError::InvalidValue {
                var: name,
                reason: err.to_string(),
            }),
        None => Ok(default),
    }
}

fn positive_secs(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    let secs: u64 = parse_var(name, Some(value.to_string()), 0)?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            var: name,
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(secs)
}
