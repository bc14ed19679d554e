//! Client configuration from environment variables.
use super::ClientBuilder;

/// The error returned when the client configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A setting had a value that could not be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// The setting, e.g. `GRAFANA_PORT`.
        key: &'static str,
        /// The value that was given.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Only one half of a username/password pair was given.
    #[error("basic auth requires both a username and a password, but the {missing} is missing")]
    IncompleteBasicAuth {
        /// Either `username` or `password`.
        missing: &'static str,
    },

    /// The Grafana URL could not be parsed or cannot have API paths appended to it.
    #[error("invalid Grafana URL {url:?}: {reason}")]
    InvalidUrl {
        /// The URL that was given or assembled from host and port.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ClientBuilder {
    const API_KEY: &'static str = "GRAFANA_API_KEY";
    const USER: &'static str = "GRAFANA_USER";
    const PASSWORD: &'static str = "GRAFANA_PASSWORD";
    const HOST: &'static str = "GRAFANA_HOST";
    const PORT: &'static str = "GRAFANA_PORT";
    const USE_HTTPS: &'static str = "GRAFANA_USE_HTTPS";

    /// Create a builder configured from `GRAFANA_*` environment variables.
    ///
    /// The variables read are `GRAFANA_HOST`, `GRAFANA_PORT`, `GRAFANA_USE_HTTPS`,
    /// `GRAFANA_API_KEY`, `GRAFANA_USER` and `GRAFANA_PASSWORD`. Unset or empty variables
    /// leave the corresponding default in place.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `GRAFANA_PORT` or `GRAFANA_USE_HTTPS` can't be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a builder configured by looking up `GRAFANA_*` settings with `lookup`.
    ///
    /// This behaves like [`ClientBuilder::from_env`] but reads settings from any source.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `GRAFANA_PORT` or `GRAFANA_USE_HTTPS` can't be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = Self::new();
        if let Some(host) = get(Self::HOST) {
            builder = builder.host(host);
        }
        if let Some(port) = get(Self::PORT) {
            builder = builder.port(port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: Self::PORT,
                value: port.clone(),
                reason: "expected a port number",
            })?);
        }
        if let Some(use_https) = get(Self::USE_HTTPS) {
            builder = builder.use_https(parse_bool(Self::USE_HTTPS, &use_https)?);
        }
        if let Some(api_key) = get(Self::API_KEY) {
            builder = builder.api_key(api_key);
        }
        if let Some(user) = get(Self::USER) {
            builder = builder.username(user);
        }
        if let Some(password) = get(Self::PASSWORD) {
            builder = builder.password(password);
        }
        Ok(builder)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected true or false",
        }),
    }
}
