//! Error types for every stage of the match-thread pipeline.
//!
//! Each stage owns a small `thiserror` enum so call sites can tell a network
//! failure from a page that simply does not carry a field yet. [`Error`]
//! gathers them for the polling loop and `main`.

use thiserror::Error;

/// The HTTP request for a page failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// The response body could not be turned into a document tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{url} returned an empty body")]
    EmptyBody { url: String },
    #[error("{url} has no root element")]
    NoRoot { url: String },
}

/// A field could not be read from a document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("marker `{marker}` not found")]
    MissingField { marker: String },
    #[error("{field} has unexpected value {value:?}")]
    Malformed { field: &'static str, value: String },
    #[error("unrecognized card fill {fill:?}")]
    UnrecognizedCard { fill: String },
    #[error("cannot read a minute from {token:?}")]
    BadMinute { token: String },
}

impl ExtractError {
    pub(crate) fn missing(marker: impl ToString) -> Self {
        ExtractError::MissingField {
            marker: marker.to_string(),
        }
    }
}

/// The secrets file is missing or does not hold what we need.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} is malformed: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("config value {key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Talking to the discussion forum failed.
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("forum login rejected: {0}")]
    Auth(String),
    #[error("forum request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("forum response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("forum rejected {action}: {message}")]
    Api {
        action: &'static str,
        message: String,
    },
}

/// Anything that can stop a match session.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Forum(#[from] ForumError),
}
