// ── Core error types ──
//
// User-facing errors from breachwatch-core. Consumers never see reqwest
// or serde failures directly; the `From<breachwatch_api::Error>` impl
// translates transport-layer errors into domain variants.

use thiserror::Error;

use crate::model::FilterKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Malformed backend response: {message}")]
    Malformed { message: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error(transparent)]
    InvalidRange(#[from] RangeError),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Rejection of a user-entered exclusion range.
///
/// The `Display` text is shown verbatim next to the input field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("IP range cannot be empty")]
    Empty,

    #[error("'{0}' is not a valid IPv4 range (expected a.b.c.d or a.b.c.d/0-32)")]
    Malformed(String),

    #[error("{0} is already excluded")]
    Duplicate(String),
}

/// Rejection of a typed `kind:value` facet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacetError {
    #[error("expected KIND:VALUE (e.g. status:breached), got '{0}'")]
    MissingSeparator(String),

    #[error(
        "unknown facet kind '{0}' (expected one of: domain, ip, port, path, \
         application, login_type, status, tag)"
    )]
    UnknownKind(String),

    #[error("missing value for '{0}'")]
    EmptyValue(FilterKind),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<breachwatch_api::Error> for CoreError {
    fn from(err: breachwatch_api::Error) -> Self {
        match err {
            breachwatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else if e.is_decode() {
                    CoreError::Malformed {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            breachwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            breachwatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            breachwatch_api::Error::Http { status, message } => CoreError::Api {
                message: if message.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {message}")
                },
                status: Some(status),
            },
            breachwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Malformed { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_keep_status() {
        let err = CoreError::from(breachwatch_api::Error::Http {
            status: 502,
            message: "bad gateway".into(),
        });
        assert!(matches!(err, CoreError::Api { status: Some(502), .. }));
        assert_eq!(err.to_string(), "API error: HTTP 502: bad gateway");
    }

    #[test]
    fn deserialization_becomes_malformed() {
        let err = CoreError::from(breachwatch_api::Error::Deserialization {
            message: "missing field `results`".into(),
            body: "{}".into(),
        });
        assert!(matches!(err, CoreError::Malformed { .. }));
    }

    #[test]
    fn range_error_is_transparent() {
        let err = CoreError::from(RangeError::Empty);
        assert_eq!(err.to_string(), "IP range cannot be empty");
    }
}
