//! Error types returned by the library.
use http::StatusCode;
use thiserror::Error;

use crate::client::ConfigError;

/// Convenience alias for results returned by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A model could not be constructed because it violates its schema.
///
/// Returned by the `build` methods of the model builders, before anything is serialized
/// or sent to Grafana.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A field required by the schema was not provided.
    #[error("{model}: missing required field `{field}`")]
    MissingField {
        /// The name of the model being built.
        model: &'static str,
        /// The wire name of the missing field.
        field: &'static str,
    },

    /// A field was provided but its value is outside the range allowed by the schema.
    #[error("{model}: field `{field}` {reason}")]
    OutOfRange {
        /// The name of the model being built.
        model: &'static str,
        /// The wire name of the offending field.
        field: &'static str,
        /// A description of the constraint that was violated.
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn missing(model: &'static str, field: &'static str) -> Self {
        Self::MissingField { model, field }
    }

    pub(crate) fn out_of_range(
        model: &'static str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            model,
            field,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur when talking to Grafana.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A model failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Grafana responded with a non-2xx status code.
    #[error("Grafana returned HTTP {status}: {}", message_or_body(.body))]
    Http {
        /// The status code of the response.
        status: StatusCode,
        /// The raw body of the response.
        body: String,
    },

    /// The request could not be sent, or the response could not be read.
    #[error("connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// A model or response could not be converted to or from JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client was configured incorrectly.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The runtime backing the blocking client could not be started.
    #[error("could not start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl Error {
    /// The HTTP status code, if this error was caused by a non-2xx response.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `message` field of Grafana's JSON error body, if there was one.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Http { body, .. } => grafana_message(body),
            _ => None,
        }
    }
}

fn grafana_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(ToString::to_string)
}

fn message_or_body(body: &str) -> String {
    grafana_message(body).unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn http_error_prefers_grafana_message() {
        let err = Error::Http {
            status: StatusCode::UNAUTHORIZED,
            body: r#"{"message":"Invalid API key"}"#.to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.message().as_deref(), Some("Invalid API key"));
        assert_eq!(
            err.to_string(),
            "Grafana returned HTTP 401 Unauthorized: Invalid API key"
        );
    }

    #[test]
    fn http_error_falls_back_to_body() {
        let err = Error::Http {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream unavailable".to_string(),
        };
        assert_eq!(err.message(), None);
        assert!(err.to_string().ends_with("upstream unavailable"));
    }

    #[test]
    fn validation_display() {
        let err = ValidationError::missing("Panel", "type");
        assert_eq!(err.to_string(), "Panel: missing required field `type`");
    }
}
