//! Canonical snapshot types held by the store.
//!
//! # Design
//! These are the client's own shapes, never the server's: they are produced
//! only by the functions in `normalize` and serialize in camelCase so a whole
//! state tree can be persisted and restored. Time fields are epoch
//! milliseconds; `None` means the server did not send the field.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContestStatus {
    #[default]
    Offline,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundStatus {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub password: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub status: ContestStatus,
    pub rounds: Vec<Round>,
}

/// A round of a contest. `contest_id` points back at the owning contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub contest_id: u64,
    pub id: u64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub round_number: u32,
    pub status: RoundStatus,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: u64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub series_number: u32,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: u64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub contest_id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub voted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// Username/password pair submitted to the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Successful login: the bearer token and the account email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub token: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Success,
    Error,
}

/// The signed-in user. An empty `token` means nobody is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub email: String,
    pub name: String,
    pub status: SessionStatus,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        !self.token.is_empty()
    }
}
