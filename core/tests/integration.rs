//! End-to-end tests against live HTTP servers.
//!
//! # Design
//! Each test binds a server on a random port: either the full mock backend
//! or a one-route fixture that returns a canned response. The `Api` and
//! `RootStore` are then exercised over real HTTP.

use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use contest_core::{
    Api, ApiConfig, ApiProblem, ContestStatus, Credentials, FetchStatus, FileStorage,
    LoginResult, MemoryStorage, RootSnapshot, RootStore, RoundStatus, Route, SessionStatus,
    SnapshotStorage, StoreError, ROOT_STATE_KEY,
};
use serde_json::json;
use tokio::net::TcpListener;

/// Serve `router` on a random local port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

async fn mock_api() -> Api {
    let url = serve(mock_server::app()).await;
    Api::new(&ApiConfig::new(url)).unwrap()
}

fn ana() -> Credentials {
    Credentials::new("ana", "ana-password")
}

// --- login ---

#[tokio::test]
async fn login_returns_token_and_email() {
    let router = Router::new().route(
        "/auth/token/",
        post(|| async { Json(json!({"access_token": "T", "email": "a@b.com"})) }),
    );
    let api = Api::new(&ApiConfig::new(serve(router).await)).unwrap();

    let result = api.login(&Credentials::new("a", "b")).await;
    assert_eq!(
        result,
        Ok(LoginResult {
            token: "T".to_string(),
            email: "a@b.com".to_string()
        })
    );
}

#[tokio::test]
async fn login_401_is_unauthorized() {
    let router = Router::new().route("/auth/token/", post(|| async { StatusCode::UNAUTHORIZED }));
    let api = Api::new(&ApiConfig::new(serve(router).await)).unwrap();

    let result = api.login(&Credentials::new("a", "b")).await;
    assert_eq!(result, Err(ApiProblem::Unauthorized));
}

#[tokio::test]
async fn login_against_mock_backend() {
    let api = mock_api().await;

    let result = api.login(&ana()).await.unwrap();
    assert!(!result.token.is_empty());
    assert_eq!(result.email, "ana@example.org");

    let result = api.login(&Credentials::new("ana", "wrong")).await;
    assert_eq!(result, Err(ApiProblem::Unauthorized));
}

#[tokio::test]
async fn login_with_wrong_client_secret_is_unauthorized() {
    let url = serve(mock_server::app()).await;
    let config = ApiConfig::new(url).with_client_credentials("contest-mobile", "guess");
    let api = Api::new(&config).unwrap();

    assert_eq!(api.login(&ana()).await, Err(ApiProblem::Unauthorized));
}

// --- data endpoints ---

#[tokio::test]
async fn contests_and_rounds_are_normalized() {
    let api = mock_api().await;
    let token = api.login(&ana()).await.unwrap().token;

    let contests = api.get_contests(&token).await.unwrap();
    assert_eq!(contests.len(), 2);
    let spring = &contests[0];
    assert_eq!(spring.kind, "choir");
    // 2024-04-01T18:00:00Z
    assert_eq!(spring.start_time, Some(1_711_994_400_000));
    assert_eq!(spring.status, ContestStatus::Offline);
    assert!(spring.rounds.is_empty());

    let rounds = api
        .get_contest_rounds(&token, spring.id, &spring.password)
        .await
        .unwrap();
    assert_eq!(rounds.len(), 2);
    assert!(rounds.iter().all(|r| r.contest_id == spring.id));
    assert!(rounds.iter().all(|r| r.status == RoundStatus::NotLoaded));

    let err = api.get_contest_rounds(&token, spring.id, "autumn").await;
    assert_eq!(err, Err(ApiProblem::Forbidden));
    let err = api.get_contest_rounds(&token, 42, "x").await;
    assert_eq!(err, Err(ApiProblem::NotFound));
}

#[tokio::test]
async fn users_are_fetched_without_token() {
    let api = mock_api().await;

    let users = api.get_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(api.get_user(2).await.unwrap().name, "Bo");
    assert_eq!(api.get_user(99).await, Err(ApiProblem::NotFound));
}

// --- problem mapping over the wire ---

#[tokio::test]
async fn server_error_is_server() {
    let router = Router::new().route("/users", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let api = Api::new(&ApiConfig::new(serve(router).await)).unwrap();

    assert_eq!(api.get_users().await, Err(ApiProblem::Server));
}

#[tokio::test]
async fn unexpected_shape_is_bad_data() {
    let router = Router::new()
        .route("/contest", get(|| async { Json(json!({"results": "none"})) }))
        .route("/users", get(|| async { "<html>maintenance</html>" }));
    let api = Api::new(&ApiConfig::new(serve(router).await)).unwrap();

    assert_eq!(api.get_contests("T").await, Err(ApiProblem::BadData));
    assert_eq!(api.get_users().await, Err(ApiProblem::BadData));
}

#[tokio::test]
async fn slow_response_is_timeout() {
    let router = Router::new().route(
        "/users",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!([]))
        }),
    );
    let config = ApiConfig::new(serve(router).await).with_timeout_ms(50);
    let api = Api::new(&config).unwrap();

    assert_eq!(api.get_users().await, Err(ApiProblem::Timeout));
}

#[tokio::test]
async fn closed_port_is_cannot_connect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = Api::new(&ApiConfig::new(format!("http://{addr}"))).unwrap();

    assert_eq!(api.login(&ana()).await, Err(ApiProblem::CannotConnect));
}

// --- store ---

#[tokio::test]
async fn store_lifecycle() {
    let api = mock_api().await;
    let mut store = RootStore::new(api.clone(), MemoryStorage::new());

    // Step 1: persist the signed-out tree as the reset target.
    store.save_default_snapshot().await.unwrap();

    // Step 2: login.
    store.login(&ana()).await.unwrap();
    assert_eq!(store.session().status, SessionStatus::Success);
    assert_eq!(store.session().name, "ana");
    assert_eq!(store.session().email, "ana@example.org");
    assert_eq!(store.route(), Route::Contests);
    let token = store.session().token.clone();

    // Step 3: contests.
    store.fetch_contests().await.unwrap();
    assert_eq!(store.contests().status, FetchStatus::Done);
    assert_eq!(store.contests().contests.len(), 2);

    // Step 4: rounds of the first contest.
    store.fetch_rounds(1).await.unwrap();
    let contest = store.contests().contest(1).unwrap();
    assert_eq!(contest.status, ContestStatus::Live);
    assert_eq!(contest.rounds.len(), 2);

    // Step 5: a refetch replaces contests wholesale.
    store.fetch_contests().await.unwrap();
    assert!(store.contests().contest(1).unwrap().rounds.is_empty());

    // Step 6: logout resets the whole tree and revokes the token.
    store.logout().await.unwrap();
    assert_eq!(store.snapshot(), &RootSnapshot::default());
    assert_eq!(api.get_contests(&token).await, Err(ApiProblem::Unauthorized));
}

#[tokio::test]
async fn failed_login_only_flags_session() {
    let mut store = RootStore::new(mock_api().await, MemoryStorage::new());

    let err = store.login(&Credentials::new("ana", "wrong")).await.unwrap_err();
    assert!(matches!(err, StoreError::Api(ApiProblem::Unauthorized)));
    assert_eq!(store.session().status, SessionStatus::Error);
    assert!(!store.session().is_signed_in());
    assert_eq!(store.route(), Route::Auth);
}

#[tokio::test]
async fn failed_fetch_keeps_stale_contests() {
    let api = mock_api().await;
    let mut store = RootStore::new(api.clone(), MemoryStorage::new());
    store.login(&ana()).await.unwrap();
    store.fetch_contests().await.unwrap();

    // Revoke the session behind the store's back.
    api.logout(&store.session().token).await.unwrap();

    let err = store.fetch_contests().await.unwrap_err();
    assert!(matches!(err, StoreError::Api(ApiProblem::Unauthorized)));
    assert_eq!(store.contests().status, FetchStatus::Error);
    assert_eq!(store.contests().contests.len(), 2);
}

#[tokio::test]
async fn fetch_rounds_of_unloaded_contest_fails_locally() {
    let mut store = RootStore::new(mock_api().await, MemoryStorage::new());
    store.login(&ana()).await.unwrap();

    let err = store.fetch_rounds(1).await.unwrap_err();
    assert!(matches!(err, StoreError::UnknownContest(1)));
}

#[tokio::test]
async fn fetch_rounds_with_stale_password_is_forbidden() {
    let mut store = RootStore::new(mock_api().await, MemoryStorage::new());
    store.login(&ana()).await.unwrap();
    store.fetch_contests().await.unwrap();
    store.contests_mut().contest_mut(1).unwrap().password = "old".to_string();

    let err = store.fetch_rounds(1).await.unwrap_err();
    assert!(matches!(err, StoreError::Api(ApiProblem::Forbidden)));
    assert!(store.contests().contest(1).unwrap().rounds.is_empty());
}

#[tokio::test]
async fn failed_round_refetch_flags_rounds() {
    let mut store = RootStore::new(mock_api().await, MemoryStorage::new());
    store.login(&ana()).await.unwrap();
    store.fetch_contests().await.unwrap();
    store.fetch_rounds(1).await.unwrap();
    store.contests_mut().contest_mut(1).unwrap().password = "old".to_string();

    let err = store.fetch_rounds(1).await.unwrap_err();
    assert!(matches!(err, StoreError::Api(ApiProblem::Forbidden)));
    let contest = store.contests().contest(1).unwrap();
    assert_eq!(contest.status, ContestStatus::Offline);
    assert_eq!(contest.rounds.len(), 2);
    assert!(contest.rounds.iter().all(|r| r.status == RoundStatus::Error));
}

#[tokio::test]
async fn logout_with_corrupt_snapshot_still_signs_out() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{ROOT_STATE_KEY}.json")), "{not json").unwrap();
    let mut store = RootStore::new(mock_api().await, FileStorage::new(dir.path()));
    store.login(&ana()).await.unwrap();

    let err = store.logout().await.unwrap_err();
    assert!(matches!(err, StoreError::Snapshot(_)));
    assert!(!store.session().is_signed_in());
    assert_eq!(store.route(), Route::Auth);
    assert_eq!(store.snapshot(), &RootSnapshot::default());
}

#[tokio::test]
async fn logout_resets_to_snapshot_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    let mut saved = RootSnapshot::default();
    saved.session.name = "guest".to_string();
    storage.save(ROOT_STATE_KEY, &saved).await.unwrap();

    let mut store = RootStore::new(mock_api().await, storage);
    store.login(&ana()).await.unwrap();
    store.fetch_contests().await.unwrap();

    store.logout().await.unwrap();
    assert_eq!(store.snapshot(), &saved);
}

#[tokio::test]
async fn logout_without_saved_snapshot_uses_default() {
    let mut store = RootStore::new(mock_api().await, MemoryStorage::new());
    store.login(&ana()).await.unwrap();

    store.logout().await.unwrap();
    assert_eq!(store.snapshot(), &RootSnapshot::default());
}

#[tokio::test]
async fn logout_resets_even_when_server_is_down() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = Api::new(&ApiConfig::new(format!("http://{addr}"))).unwrap();

    let mut state = RootSnapshot::default();
    state.session.token = "T".to_string();
    state.route = Route::Contests;
    let mut store = RootStore::restore(api, MemoryStorage::new(), state);

    store.logout().await.unwrap();
    assert_eq!(store.snapshot(), &RootSnapshot::default());
}

#[tokio::test]
async fn restored_session_token_is_used() {
    let api = mock_api().await;
    let token = api.login(&ana()).await.unwrap().token;

    let mut state = RootSnapshot::default();
    state.session.token = token;
    let mut store = RootStore::restore(api, MemoryStorage::new(), state);

    store.fetch_contests().await.unwrap();
    assert_eq!(store.contests().contests.len(), 2);
}
