//! # error
//!
//! Error types for each concern of the reporter.
//!
//! Only [`ConfigError`] is fatal. Broker and notifier errors are returned to
//! the entry point, which logs them and carries on with empty data or the
//! next target.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Both an API key and session credentials were supplied.
    #[error("IBKR_API_KEY and IBKR_USERNAME/IBKR_PASSWORD are both set; configure exactly one authentication mode")]
    ConflictingAuth,

    /// Neither authentication mode was supplied.
    #[error("no broker credentials: set IBKR_API_KEY, or IBKR_USERNAME and IBKR_PASSWORD (or enable DEMO_MODE)")]
    MissingAuth,

    /// Only half of the session credentials were supplied.
    #[error("session login needs both IBKR_USERNAME and IBKR_PASSWORD (missing {0})")]
    IncompleteSession(&'static str),

    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key:    &'static str,
        value:  String,
        reason: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum BrokerError {
    /// Transport failure: connect, TLS, timeout.
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway returned HTTP {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status:   StatusCode,
        body:     String,
    },

    /// Session login was refused.
    #[error("gateway authentication failed: {0}")]
    Auth(String),

    /// The body was not the JSON shape we expect.
    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source:   serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport failure. The URL is stripped: webhook and bot URLs embed secrets.
    #[error("webhook request failed: {0}")]
    Http(reqwest::Error),

    #[error("{channel} rejected message: HTTP {status}: {body}")]
    Rejected {
        channel: &'static str,
        status:  StatusCode,
        body:    String,
    },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Http(err.without_url())
    }
}
