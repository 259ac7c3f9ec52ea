//! Async executor for `ContestClient` requests.
//!
//! # Design
//! `Api` pairs the stateless `ContestClient` with a `reqwest::Client`
//! configured with the request timeout. `execute` never fails: transport
//! faults become `Exchange::Failed` so the problem mapper can classify them
//! alongside HTTP statuses. There are no retries; a failed call is returned
//! to the caller as an `ApiProblem`.

use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::client::ContestClient;
use crate::config::ApiConfig;
use crate::error::{ApiProblem, ConfigError};
use crate::http::{Body, Exchange, HttpMethod, HttpRequest, HttpResponse, TransportError, TransportErrorKind};
use crate::types::{Contest, Credentials, LoginResult, Round, User};

#[derive(Debug, Clone)]
pub struct Api {
    client: ContestClient,
    http: reqwest::Client,
}

impl Api {
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client: ContestClient::from_config(config),
            http,
        })
    }

    pub fn client(&self) -> &ContestClient {
        &self.client
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResult, ApiProblem> {
        let exchange = self.execute(self.client.build_login(credentials)).await;
        self.client
            .parse_login(exchange)
            .inspect_err(|problem| report("login", problem))
    }

    /// Invalidate `token` on the server.
    pub async fn logout(&self, token: &str) -> Result<(), ApiProblem> {
        let exchange = self.execute(self.client.build_logout(token)).await;
        self.client
            .parse_logout(exchange)
            .inspect_err(|problem| report("logout", problem))
    }

    pub async fn get_contests(&self, token: &str) -> Result<Vec<Contest>, ApiProblem> {
        let exchange = self.execute(self.client.build_list_contests(token)).await;
        self.client
            .parse_list_contests(exchange)
            .inspect_err(|problem| report("get_contests", problem))
    }

    /// Rounds of `contest_id`, unlocked with the contest password.
    pub async fn get_contest_rounds(
        &self,
        token: &str,
        contest_id: u64,
        password: &str,
    ) -> Result<Vec<Round>, ApiProblem> {
        let request = self.client.build_list_rounds(token, contest_id, password);
        let exchange = self.execute(request).await;
        self.client
            .parse_list_rounds(exchange, contest_id)
            .inspect_err(|problem| report("get_contest_rounds", problem))
    }

    pub async fn get_users(&self) -> Result<Vec<User>, ApiProblem> {
        let exchange = self.execute(self.client.build_list_users()).await;
        self.client
            .parse_list_users(exchange)
            .inspect_err(|problem| report("get_users", problem))
    }

    pub async fn get_user(&self, id: u64) -> Result<User, ApiProblem> {
        let exchange = self.execute(self.client.build_get_user(id)).await;
        self.client
            .parse_get_user(exchange)
            .inspect_err(|problem| report("get_user", problem))
    }

    /// Perform one HTTP round-trip.
    pub async fn execute(&self, request: HttpRequest) -> Exchange {
        debug!(method = ?request.method, path = %request.path, "sending request");

        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.path),
            HttpMethod::Post => self.http.post(&request.path),
        };
        for (name, value) in &request.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => builder = builder.header(name, value),
                _ => {
                    return TransportError::new(
                        TransportErrorKind::Other,
                        format!("invalid header {name}"),
                    )
                    .into()
                }
            }
        }
        if let Some(Body::Form(fields)) = &request.body {
            builder = builder.form(fields);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return transport_error(&e).into(),
        };
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        match response.text().await {
            Ok(body) => HttpResponse {
                status,
                headers,
                body,
            }
            .into(),
            Err(e) => transport_error(&e).into(),
        }
    }
}

fn transport_error(error: &reqwest::Error) -> TransportError {
    let kind = if error.is_connect() {
        TransportErrorKind::Connect
    } else if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_decode() || error.is_body() {
        TransportErrorKind::Decode
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, error.to_string())
}

fn report(operation: &str, problem: &ApiProblem) {
    warn!(operation, problem = problem.kind(), "api call failed");
}
