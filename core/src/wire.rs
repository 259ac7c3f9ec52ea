//! Server payload shapes.
//!
//! # Design
//! Each `Raw*` type is the schema check for one server record: `id` is
//! required, everything else is optional and unknown fields are ignored. A
//! body that fails to deserialize into these types is reported as
//! `ApiProblem::BadData` by the client; a body that does deserialize can
//! always be normalized. Timestamps are RFC 3339 strings on the wire.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RawToken {
    pub access_token: String,
    pub email: Option<String>,
}

/// Paginated envelope around the contest list.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContestPage {
    pub results: Vec<RawContest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawContest {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRound {
    pub id: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub round_no: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSeries {
    pub id: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(alias = "series_no")]
    pub jseries_no: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParticipant {
    pub id: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Id of the contest this participant is voted in.
    pub vote: Option<u64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: u64,
    pub name: Option<String>,
}
