//! Client core for the contest voting backend.
//!
//! # Overview
//! Talks to the contest REST API, normalizes its payloads into canonical
//! snapshots and keeps them in a single state tree.
//!
//! # Design
//! - `ContestClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `Exchange`. It never performs I/O.
//! - `Api` executes those requests asynchronously and is the only place that
//!   touches the network.
//! - Every failure of an API call is an `ApiProblem` value, classified by
//!   `problem::classify`. Nothing is retried.
//! - Server JSON is deserialized into `wire::Raw*` types first and then
//!   converted by `normalize`; a schema mismatch is `ApiProblem::BadData`.
//! - `RootStore` owns the session and the fetched data, and resets to a
//!   persisted snapshot on logout.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod problem;
pub mod storage;
pub mod store;
pub mod types;
pub mod wire;

pub use api::Api;
pub use client::ContestClient;
pub use config::ApiConfig;
pub use error::{ApiProblem, ConfigError, StoreError};
pub use http::{Body, Exchange, HttpMethod, HttpRequest, HttpResponse, TransportError, TransportErrorKind};
pub use normalize::{time_status, TimeStatus, Timed};
pub use problem::classify;
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};
pub use store::{ContestsStore, FetchStatus, RootSnapshot, RootStore, Route, ROOT_STATE_KEY};
pub use types::{
    Contest, ContestStatus, Credentials, LoginResult, Participant, Round, RoundStatus, Series,
    Session, SessionStatus, User,
};
