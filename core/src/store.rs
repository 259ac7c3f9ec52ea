//! Root state tree and the actions that fold API results into it.
//!
//! # Design
//! `RootStore` owns the whole client state as one `RootSnapshot` together
//! with the `Api` and a `SnapshotStorage`. Actions take `&mut self`, await
//! the network call, then mutate state synchronously, so a response always
//! lands on a consistent tree. The session token is read from the owned
//! `Session` and passed explicitly to each authenticated call.
//!
//! Fetched collections replace what the store holds; nothing is merged.
//! A failed fetch keeps the previous data and flags the failure.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::Api;
use crate::error::StoreError;
use crate::storage::SnapshotStorage;
use crate::types::{
    Contest, ContestStatus, Credentials, Participant, Round, RoundStatus, Series, Session,
    SessionStatus,
};

/// Storage key of the snapshot that `logout` resets to.
pub const ROOT_STATE_KEY: &str = "ROOT_STATE";

/// Top-level screen the UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    #[default]
    Auth,
    Contests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStatus {
    #[default]
    Idle,
    Pending,
    Done,
    Error,
}

/// Contests with their rounds, series and participants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestsStore {
    pub contests: Vec<Contest>,
    pub status: FetchStatus,
}

impl ContestsStore {
    pub fn contest(&self, id: u64) -> Option<&Contest> {
        self.contests.iter().find(|c| c.id == id)
    }

    pub fn contest_mut(&mut self, id: u64) -> Option<&mut Contest> {
        self.contests.iter_mut().find(|c| c.id == id)
    }

    pub fn round(&self, contest_id: u64, round_id: u64) -> Option<&Round> {
        self.contest(contest_id)?
            .rounds
            .iter()
            .find(|r| r.id == round_id)
    }

    fn round_mut(&mut self, contest_id: u64, round_id: u64) -> Option<&mut Round> {
        self.contest_mut(contest_id)?
            .rounds
            .iter_mut()
            .find(|r| r.id == round_id)
    }

    pub fn replace_contests(&mut self, contests: Vec<Contest>) {
        self.contests = contests;
    }

    /// Replace the rounds of a contest and mark it live.
    pub fn replace_rounds(&mut self, contest_id: u64, rounds: Vec<Round>) -> Result<(), StoreError> {
        let contest = self
            .contest_mut(contest_id)
            .ok_or(StoreError::UnknownContest(contest_id))?;
        contest.rounds = rounds;
        contest.status = ContestStatus::Live;
        Ok(())
    }

    /// Record a failed round fetch: the contest goes back offline and the
    /// rounds it still holds are flagged `Error`.
    pub fn mark_rounds_failed(&mut self, contest_id: u64) -> Result<(), StoreError> {
        let contest = self
            .contest_mut(contest_id)
            .ok_or(StoreError::UnknownContest(contest_id))?;
        contest.status = ContestStatus::Offline;
        for round in &mut contest.rounds {
            round.status = RoundStatus::Error;
        }
        Ok(())
    }

    pub fn set_round_status(
        &mut self,
        contest_id: u64,
        round_id: u64,
        status: RoundStatus,
    ) -> Result<(), StoreError> {
        self.round_mut(contest_id, round_id)
            .ok_or(StoreError::UnknownRound { contest_id, round_id })?
            .status = status;
        Ok(())
    }

    /// Replace the series of a round and mark it loaded.
    pub fn replace_round_series(
        &mut self,
        contest_id: u64,
        round_id: u64,
        series: Vec<Series>,
    ) -> Result<(), StoreError> {
        let round = self
            .round_mut(contest_id, round_id)
            .ok_or(StoreError::UnknownRound { contest_id, round_id })?;
        round.series = series;
        round.status = RoundStatus::Loaded;
        Ok(())
    }

    pub fn participant(&self, participant_id: u64) -> Option<&Participant> {
        self.participants().find(|p| p.id == participant_id)
    }

    fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.contests
            .iter()
            .flat_map(|c| &c.rounds)
            .flat_map(|r| &r.series)
            .flat_map(|s| &s.participants)
    }

    /// Record a vote for every occurrence of the participant. Returns whether
    /// the participant was found.
    pub fn mark_voted(&mut self, participant_id: u64) -> bool {
        let mut found = false;
        let participants = self
            .contests
            .iter_mut()
            .flat_map(|c| &mut c.rounds)
            .flat_map(|r| &mut r.series)
            .flat_map(|s| &mut s.participants);
        for participant in participants.filter(|p| p.id == participant_id) {
            participant.voted = true;
            found = true;
        }
        found
    }
}

/// Serializable form of the whole state tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootSnapshot {
    pub route: Route,
    pub session: Session,
    pub contests: ContestsStore,
}

pub struct RootStore<S> {
    api: Api,
    storage: S,
    state: RootSnapshot,
}

impl<S: SnapshotStorage> RootStore<S> {
    pub fn new(api: Api, storage: S) -> Self {
        Self::restore(api, storage, RootSnapshot::default())
    }

    /// Store resumed from a previously taken snapshot, session included.
    pub fn restore(api: Api, storage: S, state: RootSnapshot) -> Self {
        Self {
            api,
            storage,
            state,
        }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn snapshot(&self) -> &RootSnapshot {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.state.session
    }

    pub fn route(&self) -> Route {
        self.state.route
    }

    pub fn contests(&self) -> &ContestsStore {
        &self.state.contests
    }

    pub fn contests_mut(&mut self) -> &mut ContestsStore {
        &mut self.state.contests
    }

    /// Sign in. On success the session is replaced and the route moves to
    /// the contest list; on failure only the session status changes.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), StoreError> {
        match self.api.login(credentials).await {
            Ok(result) => {
                self.state.session = Session {
                    token: result.token,
                    email: result.email,
                    name: credentials.username.clone(),
                    status: SessionStatus::Success,
                };
                self.state.route = Route::Contests;
                info!(user = %credentials.username, "signed in");
                Ok(())
            }
            Err(problem) => {
                self.state.session.status = SessionStatus::Error;
                Err(problem.into())
            }
        }
    }

    /// Sign out on the server, then reset the whole tree to the snapshot
    /// saved under `ROOT_STATE_KEY`.
    ///
    /// A failed server logout is logged and the local reset still happens.
    /// If the stored snapshot cannot be read the tree resets to
    /// `RootSnapshot::default()` and the storage error is returned.
    pub async fn logout(&mut self) -> Result<(), StoreError> {
        if self.state.session.is_signed_in() {
            if let Err(problem) = self.api.logout(&self.state.session.token).await {
                warn!(problem = problem.kind(), "server logout failed");
            }
        }
        // The token is gone either way, so an unreadable snapshot still resets.
        match self.storage.load(ROOT_STATE_KEY).await {
            Ok(snapshot) => {
                self.state = snapshot.unwrap_or_default();
                info!("signed out");
                Ok(())
            }
            Err(e) => {
                self.state = RootSnapshot::default();
                warn!(error = %e, "cannot read default snapshot");
                Err(e)
            }
        }
    }

    /// Persist the current tree as the snapshot `logout` resets to.
    pub async fn save_default_snapshot(&self) -> Result<(), StoreError> {
        self.storage.save(ROOT_STATE_KEY, &self.state).await
    }

    pub async fn fetch_contests(&mut self) -> Result<(), StoreError> {
        self.state.contests.status = FetchStatus::Pending;
        match self.api.get_contests(&self.state.session.token).await {
            Ok(contests) => {
                info!(count = contests.len(), "contests loaded");
                self.state.contests.replace_contests(contests);
                self.state.contests.status = FetchStatus::Done;
                Ok(())
            }
            Err(problem) => {
                self.state.contests.status = FetchStatus::Error;
                Err(problem.into())
            }
        }
    }

    /// Load the rounds of a contest already in the store, unlocking them
    /// with the contest's own password.
    pub async fn fetch_rounds(&mut self, contest_id: u64) -> Result<(), StoreError> {
        let password = self
            .state
            .contests
            .contest(contest_id)
            .ok_or(StoreError::UnknownContest(contest_id))?
            .password
            .clone();
        match self
            .api
            .get_contest_rounds(&self.state.session.token, contest_id, &password)
            .await
        {
            Ok(rounds) => {
                info!(contest_id, count = rounds.len(), "rounds loaded");
                self.state.contests.replace_rounds(contest_id, rounds)
            }
            Err(problem) => {
                self.state.contests.mark_rounds_failed(contest_id)?;
                Err(problem.into())
            }
        }
    }
}
