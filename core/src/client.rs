//! Stateless request builder and response parser for the contest API.
//!
//! # Design
//! `ContestClient` holds only the base URL and the precomputed Basic
//! credential for the token endpoint. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `Exchange`. Bearer tokens are passed into every
//! authenticated `build_*` call rather than stored. Every `parse_*` method
//! returns an `ApiProblem` instead of failing: HTTP and transport failures go
//! through `problem::classify`, and bodies that do not match the wire schema
//! become `ApiProblem::BadData`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiProblem;
use crate::http::{Body, Exchange, HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::{normalize_contest, normalize_round, normalize_user};
use crate::problem::classify;
use crate::types::{Contest, Credentials, LoginResult, Round, User};
use crate::wire::{RawContestPage, RawRound, RawToken, RawUser};

/// Synchronous, stateless client for the contest API.
#[derive(Debug, Clone)]
pub struct ContestClient {
    base_url: String,
    basic_auth: String,
}

impl ContestClient {
    pub fn new(base_url: &str, client_id: &str, client_secret: &str) -> Self {
        let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            basic_auth: format!("Basic {encoded}"),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.url, &config.client_id, &config.client_secret)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_login(&self, credentials: &Credentials) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/auth/token/", self.base_url),
            headers: vec![
                accept_json(),
                ("authorization".to_string(), self.basic_auth.clone()),
            ],
            body: Some(form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])),
        }
    }

    pub fn build_logout(&self, token: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/auth/logout/", self.base_url),
            headers: vec![accept_json(), bearer(token)],
            body: None,
        }
    }

    pub fn build_list_contests(&self, token: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/contest", self.base_url),
            headers: vec![accept_json(), bearer(token)],
            body: None,
        }
    }

    pub fn build_list_rounds(&self, token: &str, contest_id: u64, password: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/round/{contest_id}", self.base_url),
            headers: vec![accept_json(), bearer(token)],
            body: Some(form(&[("password", password)])),
        }
    }

    pub fn build_list_users(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/users", self.base_url),
            headers: vec![accept_json()],
            body: None,
        }
    }

    pub fn build_get_user(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/users/{id}", self.base_url),
            headers: vec![accept_json()],
            body: None,
        }
    }

    pub fn parse_login(&self, exchange: Exchange) -> Result<LoginResult, ApiProblem> {
        let raw: RawToken = decode(&expect_success(exchange)?)?;
        Ok(LoginResult {
            token: raw.access_token,
            email: raw.email.unwrap_or_default(),
        })
    }

    pub fn parse_logout(&self, exchange: Exchange) -> Result<(), ApiProblem> {
        expect_success(exchange).map(|_| ())
    }

    pub fn parse_list_contests(&self, exchange: Exchange) -> Result<Vec<Contest>, ApiProblem> {
        let page: RawContestPage = decode(&expect_success(exchange)?)?;
        Ok(page.results.into_iter().map(normalize_contest).collect())
    }

    pub fn parse_list_rounds(
        &self,
        exchange: Exchange,
        contest_id: u64,
    ) -> Result<Vec<Round>, ApiProblem> {
        let raw: Vec<RawRound> = decode(&expect_success(exchange)?)?;
        Ok(raw
            .into_iter()
            .map(|round| normalize_round(round, contest_id))
            .collect())
    }

    pub fn parse_list_users(&self, exchange: Exchange) -> Result<Vec<User>, ApiProblem> {
        let raw: Vec<RawUser> = decode(&expect_success(exchange)?)?;
        Ok(raw.into_iter().map(normalize_user).collect())
    }

    pub fn parse_get_user(&self, exchange: Exchange) -> Result<User, ApiProblem> {
        let raw: RawUser = decode(&expect_success(exchange)?)?;
        Ok(normalize_user(raw))
    }
}

fn accept_json() -> (String, String) {
    ("accept".to_string(), "application/json".to_string())
}

fn bearer(token: &str) -> (String, String) {
    ("authorization".to_string(), format!("Bearer {token}"))
}

fn form(fields: &[(&str, &str)]) -> Body {
    Body::Form(
        fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    )
}

/// Return the response of a successful exchange, or the problem it maps to.
fn expect_success(exchange: Exchange) -> Result<HttpResponse, ApiProblem> {
    if let Some(problem) = classify(&exchange) {
        return Err(problem);
    }
    match exchange {
        Exchange::Response(response) => Ok(response),
        Exchange::Failed(_) => Err(ApiProblem::Unknown),
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiProblem> {
    serde_json::from_str(&response.body).map_err(|e| {
        debug!(status = response.status, error = %e, "response body does not match schema");
        ApiProblem::BadData
    })
}
