//! Error types for the contest client.
//!
//! # Design
//! `ApiProblem` is the closed set of reasons a network exchange can fail.
//! It is returned as a value from every `Api` operation and never escapes as
//! a panic. `StoreError` covers the state layer: snapshot storage faults and
//! lookups of entities the store does not hold. `ConfigError` is raised only
//! while building an `Api`.

use std::num::ParseIntError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified failure of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "kebab-case")]
pub enum ApiProblem {
    /// The host could not be reached.
    #[error("cannot connect to the server")]
    CannotConnect,

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// HTTP 401.
    #[error("unauthorized")]
    Unauthorized,

    /// HTTP 403.
    #[error("forbidden")]
    Forbidden,

    /// HTTP 404.
    #[error("not found")]
    NotFound,

    /// Any HTTP 5xx.
    #[error("server error")]
    Server,

    /// The response body did not match the expected schema.
    #[error("bad data")]
    BadData,

    #[error("unknown problem")]
    Unknown,
}

impl ApiProblem {
    /// Wire name of the problem kind, e.g. `"not-found"`.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiProblem::CannotConnect => "cannot-connect",
            ApiProblem::Timeout => "timeout",
            ApiProblem::Unauthorized => "unauthorized",
            ApiProblem::Forbidden => "forbidden",
            ApiProblem::NotFound => "not-found",
            ApiProblem::Server => "server",
            ApiProblem::BadData => "bad-data",
            ApiProblem::Unknown => "unknown",
        }
    }
}

/// Errors returned by `RootStore` actions and `SnapshotStorage`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiProblem),

    #[error("contest {0} is not loaded")]
    UnknownContest(u64),

    #[error("round {round_id} of contest {contest_id} is not loaded")]
    UnknownRound { contest_id: u64, round_id: u64 },

    #[error("snapshot storage failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Errors raised while assembling an `ApiConfig` or an `Api`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid timeout {value:?}: {source}")]
    InvalidTimeout {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_serializes_as_kind() {
        for problem in [
            ApiProblem::CannotConnect,
            ApiProblem::Timeout,
            ApiProblem::Unauthorized,
            ApiProblem::Forbidden,
            ApiProblem::NotFound,
            ApiProblem::Server,
            ApiProblem::BadData,
            ApiProblem::Unknown,
        ] {
            let json = serde_json::to_value(problem).unwrap();
            assert_eq!(json, problem.kind());
        }
    }

    #[test]
    fn http_client_error_keeps_source() {
        use std::error::Error as _;

        let source = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err: ConfigError = source.into();
        assert!(matches!(err, ConfigError::HttpClient(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn store_error_wraps_problem() {
        let err: StoreError = ApiProblem::Forbidden.into();
        assert!(matches!(err, StoreError::Api(ApiProblem::Forbidden)));
        assert_eq!(err.to_string(), "forbidden");
    }
}
