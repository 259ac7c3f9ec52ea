use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const CLIENT_ID: &str = "contest-mobile";
pub const CLIENT_SECRET: &str = "contest-mobile-secret";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContestRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub password: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundRecord {
    pub id: u64,
    pub start_time: String,
    pub end_time: String,
    pub round_no: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContestPage {
    pub count: usize,
    pub results: Vec<ContestRecord>,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct RoundAccess {
    #[serde(default)]
    pub password: String,
}

/// In-memory backend: accounts, live sessions and contest data.
#[derive(Debug, Default)]
pub struct Backend {
    pub accounts: Vec<Account>,
    pub sessions: HashSet<String>,
    pub contests: Vec<ContestRecord>,
    pub rounds: HashMap<u64, Vec<RoundRecord>>,
    pub users: Vec<UserRecord>,
}

impl Backend {
    /// Backend with one account, two contests and the rounds of the first.
    pub fn seeded() -> Self {
        let contests = vec![
            ContestRecord {
                id: 1,
                kind: "choir".to_string(),
                name: "Spring Choir".to_string(),
                password: "spring".to_string(),
                start_time: "2024-04-01T18:00:00Z".to_string(),
                end_time: "2024-04-01T22:00:00Z".to_string(),
            },
            ContestRecord {
                id: 2,
                kind: "solo".to_string(),
                name: "Open Mic".to_string(),
                password: "mic".to_string(),
                start_time: "2024-05-10T19:00:00Z".to_string(),
                end_time: "2024-05-10T21:30:00Z".to_string(),
            },
        ];
        let rounds = HashMap::from([(
            1,
            vec![
                RoundRecord {
                    id: 10,
                    start_time: "2024-04-01T18:00:00Z".to_string(),
                    end_time: "2024-04-01T19:30:00Z".to_string(),
                    round_no: 1,
                },
                RoundRecord {
                    id: 11,
                    start_time: "2024-04-01T20:00:00Z".to_string(),
                    end_time: "2024-04-01T22:00:00Z".to_string(),
                    round_no: 2,
                },
            ],
        )]);
        Self {
            accounts: vec![Account {
                username: "ana".to_string(),
                password: "ana-password".to_string(),
                email: "ana@example.org".to_string(),
            }],
            sessions: HashSet::new(),
            contests,
            rounds,
            users: vec![
                UserRecord {
                    id: 1,
                    name: "Ana".to_string(),
                },
                UserRecord {
                    id: 2,
                    name: "Bo".to_string(),
                },
            ],
        }
    }

    fn has_session(&self, headers: &HeaderMap) -> bool {
        bearer_token(headers).is_some_and(|token| self.sessions.contains(token))
    }
}

pub type Db = Arc<RwLock<Backend>>;

pub fn app() -> Router {
    app_with(Backend::seeded())
}

pub fn app_with(backend: Backend) -> Router {
    let db: Db = Arc::new(RwLock::new(backend));
    Router::new()
        .route("/auth/token/", post(issue_token))
        .route("/auth/logout/", post(logout))
        .route("/contest", get(list_contests))
        .route("/round/{contest_id}", post(list_rounds))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `Authorization` value the token endpoint expects from the mobile client.
pub fn client_basic_auth() -> String {
    format!("Basic {}", STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}")))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn issue_token(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(input): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, StatusCode> {
    let basic = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if basic != Some(client_basic_auth().as_str()) {
        warn!("token request with bad client credentials");
        return Err(StatusCode::UNAUTHORIZED);
    }
    if input.grant_type != "password" {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut backend = db.write().await;
    let email = backend
        .accounts
        .iter()
        .find(|a| a.username == input.username && a.password == input.password)
        .map(|a| a.email.clone())
        .ok_or_else(|| {
            warn!(username = %input.username, "login rejected");
            StatusCode::UNAUTHORIZED
        })?;
    let token = Uuid::new_v4().simple().to_string();
    backend.sessions.insert(token.clone());
    info!(username = %input.username, "token issued");

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        email,
    }))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> StatusCode {
    let mut backend = db.write().await;
    let removed = bearer_token(&headers).is_some_and(|token| backend.sessions.remove(token));
    if removed {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn list_contests(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<ContestPage>, StatusCode> {
    let backend = db.read().await;
    if !backend.has_session(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(ContestPage {
        count: backend.contests.len(),
        results: backend.contests.clone(),
    }))
}

async fn list_rounds(
    State(db): State<Db>,
    Path(contest_id): Path<u64>,
    headers: HeaderMap,
    Form(access): Form<RoundAccess>,
) -> Result<Json<Vec<RoundRecord>>, StatusCode> {
    let backend = db.read().await;
    if !backend.has_session(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let contest = backend
        .contests
        .iter()
        .find(|c| c.id == contest_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if contest.password != access.password {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(Json(
        backend.rounds.get(&contest_id).cloned().unwrap_or_default(),
    ))
}

async fn list_users(State(db): State<Db>) -> Json<Vec<UserRecord>> {
    Json(db.read().await.users.clone())
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<UserRecord>, StatusCode> {
    let backend = db.read().await;
    backend
        .users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
