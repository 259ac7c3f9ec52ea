//! Conversion of server records into canonical snapshots, and time status.
//!
//! Every transform takes one typed raw record and returns one canonical
//! record. Fields the server does not own start at their defaults: a
//! contest is `Offline` with no rounds, a round is `NotLoaded` with no
//! series, a participant has not voted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    Contest, ContestStatus, Participant, Round, RoundStatus, Series, User,
};
use crate::wire::{RawContest, RawParticipant, RawRound, RawSeries, RawUser};

fn millis(time: Option<DateTime<Utc>>) -> Option<i64> {
    time.map(|t| t.timestamp_millis())
}

pub fn normalize_contest(raw: RawContest) -> Contest {
    Contest {
        id: raw.id,
        kind: raw.kind.unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
        password: raw.password.unwrap_or_default(),
        start_time: millis(raw.start_time),
        end_time: millis(raw.end_time),
        status: ContestStatus::Offline,
        rounds: Vec::new(),
    }
}

pub fn normalize_round(raw: RawRound, contest_id: u64) -> Round {
    Round {
        contest_id,
        id: raw.id,
        start_time: millis(raw.start_time),
        end_time: millis(raw.end_time),
        round_number: raw.round_no.unwrap_or_default(),
        status: RoundStatus::NotLoaded,
        series: Vec::new(),
    }
}

pub fn normalize_series(raw: RawSeries) -> Series {
    Series {
        id: raw.id,
        start_time: millis(raw.start_time),
        end_time: millis(raw.end_time),
        series_number: raw.jseries_no.unwrap_or_default(),
        participants: Vec::new(),
    }
}

pub fn normalize_participant(raw: RawParticipant) -> Participant {
    Participant {
        id: raw.id,
        start_time: millis(raw.start_time),
        end_time: millis(raw.end_time),
        contest_id: raw.vote,
        first_name: raw.first_name.unwrap_or_default(),
        last_name: raw.last_name.unwrap_or_default(),
        voted: false,
    }
}

pub fn normalize_user(raw: RawUser) -> User {
    User {
        id: raw.id,
        name: raw.name.unwrap_or_default(),
    }
}

/// Where the current moment falls relative to an item's time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// Status of the window `[start, end)` at `now`, all in epoch millis.
///
/// A window with a missing bound is never in progress; it is finished only
/// once a known `end` has passed.
pub fn time_status(start: Option<i64>, end: Option<i64>, now: i64) -> TimeStatus {
    match (start, end) {
        (Some(start), Some(end)) if start <= now && now < end => TimeStatus::InProgress,
        (_, Some(end)) if now >= end => TimeStatus::Finished,
        _ => TimeStatus::NotStarted,
    }
}

/// Anything with a start/end time window.
pub trait Timed {
    fn start_time(&self) -> Option<i64>;
    fn end_time(&self) -> Option<i64>;

    fn time_status_at(&self, now: i64) -> TimeStatus {
        time_status(self.start_time(), self.end_time(), now)
    }

    /// Status against the wall clock, read on every call.
    fn time_status(&self) -> TimeStatus {
        self.time_status_at(Utc::now().timestamp_millis())
    }
}

macro_rules! impl_timed {
    ($($ty:ty),*) => {
        $(impl Timed for $ty {
            fn start_time(&self) -> Option<i64> {
                self.start_time
            }

            fn end_time(&self) -> Option<i64> {
                self.end_time
            }
        })*
    };
}

impl_timed!(Contest, Round, Series, Participant);
