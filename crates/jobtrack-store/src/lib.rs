// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Blocking client for the hosted backend: GoTrue-style auth under
//! `/auth/v1` and PostgREST-style tables under `/rest/v1`.

mod remote;
mod session;

pub use remote::RemoteStore;
pub use session::{SESSION_PATH_ENV, Session, default_session_path};

use anyhow::{Context, Result, anyhow, bail};
use jobtrack_app::{SessionUser, UserId};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{info, warn};
use url::Url;

pub const APP_NAME: &str = "jobtrack";
pub const APPLICATIONS_TABLE: &str = "applications";
pub const CONTACTS_TABLE: &str = "network_contacts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The backend auto-confirmed the account and issued a session.
    SignedIn(Session),
    /// A confirmation email was sent; sign in after verifying.
    ConfirmationRequired { email: String },
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    anon_key: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("backend.url must not be empty -- set [backend].url and retry");
        }
        Url::parse(&base_url)
            .with_context(|| format!("backend.url {base_url:?} is not a valid URL"))?;
        if anon_key.trim().is_empty() {
            bail!("backend.anon_key must not be empty -- set [backend].anon_key and retry");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            anon_key: anon_key.trim().to_owned(),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Reachability probe against the auth service.
    pub fn health(&self) -> Result<()> {
        let response = self
            .http
            .get(self.endpoint("auth/v1/health", &[])?)
            .header("apikey", &self.anon_key)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        check_status(response).map(|_| ())
    }

    pub fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let response = self
            .http
            .post(self.endpoint("auth/v1/signup", &[])?)
            .header("apikey", &self.anon_key)
            .json(&Credentials { email, password })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let parsed: SignUpResponse = check_status(response)?
            .json()
            .context("decode sign-up response")?;

        if let Some(access_token) = parsed.access_token {
            let user = parsed
                .user
                .ok_or_else(|| anyhow!("sign-up response carried a token but no user"))?;
            let session = session_from_parts(
                access_token,
                parsed.refresh_token.unwrap_or_default(),
                parsed.expires_in,
                parsed.expires_at,
                user,
            );
            info!("signed up and signed in as {}", session.user.email);
            return Ok(SignUpOutcome::SignedIn(session));
        }

        let email = parsed
            .email
            .or_else(|| parsed.user.and_then(|user| user.email))
            .unwrap_or_else(|| email.to_owned());
        info!("sign-up pending confirmation for {email}");
        Ok(SignUpOutcome::ConfirmationRequired { email })
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .http
            .post(self.endpoint("auth/v1/token", &[("grant_type", "password")])?)
            .header("apikey", &self.anon_key)
            .json(&Credentials { email, password })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let session = decode_token(response)?;
        info!("signed in as {}", session.user.email);
        Ok(session)
    }

    pub fn refresh(&self, session: &Session) -> Result<Session> {
        let response = self
            .http
            .post(self.endpoint("auth/v1/token", &[("grant_type", "refresh_token")])?)
            .header("apikey", &self.anon_key)
            .json(&RefreshRequest {
                refresh_token: &session.refresh_token,
            })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        decode_token(response).context("refresh session -- sign in again")
    }

    pub fn sign_out(&self, session: &Session) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("auth/v1/logout", &[])?)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        check_status(response)?;
        info!("signed out {}", session.user.email);
        Ok(())
    }

    pub fn current_user(&self, session: &Session) -> Result<SessionUser> {
        let response = self
            .http
            .get(self.endpoint("auth/v1/user", &[])?)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let user: UserPayload = check_status(response)?
            .json()
            .context("decode current user")?;
        Ok(user.into())
    }

    /// Reloads a persisted session: refreshes it once when expired, then
    /// confirms the user with the backend. `None` means sign in again.
    pub fn resume(&self, session: Session, now: OffsetDateTime) -> Option<Session> {
        let mut session = session;
        if session.is_expired(now) {
            session = match self.refresh(&session) {
                Ok(refreshed) => refreshed,
                Err(error) => {
                    warn!("stored session could not be refreshed: {error:#}");
                    return None;
                }
            };
        }
        match self.current_user(&session) {
            Ok(user) => {
                session.user = user;
                Some(session)
            }
            Err(error) => {
                warn!("stored session was rejected: {error:#}");
                None
            }
        }
    }

    pub(crate) fn select<T: DeserializeOwned>(
        &self,
        access_token: &str,
        table: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let response = self
            .table_request(self.http.get(self.table_url(table, params)?), access_token)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        check_status(response)?
            .json()
            .with_context(|| format!("decode {table} rows"))
    }

    pub(crate) fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        access_token: &str,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .table_request(self.http.post(self.table_url(table, &[])?), access_token)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let mut rows: Vec<T> = check_status(response)?
            .json()
            .with_context(|| format!("decode inserted {table} row"))?;
        if rows.is_empty() {
            bail!("insert into {table} returned no row -- check row-level security policies");
        }
        Ok(rows.swap_remove(0))
    }

    pub(crate) fn patch<B: Serialize>(
        &self,
        access_token: &str,
        table: &str,
        filters: &[(&str, &str)],
        body: &B,
    ) -> Result<()> {
        let response = self
            .table_request(self.http.patch(self.table_url(table, filters)?), access_token)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        check_status(response).map(|_| ())
    }

    pub(crate) fn delete(
        &self,
        access_token: &str,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<()> {
        let response = self
            .table_request(self.http.delete(self.table_url(table, filters)?), access_token)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        check_status(response).map(|_| ())
    }

    fn table_request(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    fn table_url(&self, table: &str, params: &[(&str, &str)]) -> Result<Url> {
        self.endpoint(&format!("rest/v1/{table}"), params)
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))
            .with_context(|| format!("build URL for {path}"))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}

/// `eq.` filter value for an owner column.
pub fn eq_filter(value: &str) -> String {
    format!("eq.{value}")
}

/// Case-insensitive "contains" pattern. LIKE metacharacters in the input
/// are escaped so they match literally.
pub fn ilike_contains(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("ilike.*{escaped}*")
}

fn decode_token(response: Response) -> Result<Session> {
    let parsed: TokenResponse = check_status(response)?
        .json()
        .context("decode auth token response")?;
    Ok(session_from_parts(
        parsed.access_token,
        parsed.refresh_token,
        parsed.expires_in,
        parsed.expires_at,
        parsed.user,
    ))
}

fn session_from_parts(
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: UserPayload,
) -> Session {
    let now = OffsetDateTime::now_utc();
    let expires_at = expires_at
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .unwrap_or_else(|| now + time::Duration::seconds(expires_in.unwrap_or(3600)));
    Session {
        access_token,
        refresh_token,
        expires_at,
        user: user.into(),
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(clean_error_response(status, &body))
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check [backend].url and your network ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.best_message()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if status == StatusCode::UNAUTHORIZED {
        return anyhow!("server returned 401 -- session expired, sign in again");
    }

    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserPayload> for SessionUser {
    fn from(payload: UserPayload) -> Self {
        Self {
            id: payload.id,
            email: payload.email.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<UserPayload>,
    #[serde(default)]
    email: Option<String>,
}

/// Union of the GoTrue and PostgREST error bodies.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorEnvelope {
    fn best_message(self) -> Option<String> {
        [self.error_description, self.msg, self.message, self.error]
            .into_iter()
            .flatten()
            .find(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{clean_error_response, ilike_contains};
    use reqwest::StatusCode;

    #[test]
    fn ilike_pattern_escapes_like_metacharacters() {
        assert_eq!(ilike_contains("Acme"), "ilike.*Acme*");
        assert_eq!(ilike_contains(" 100%_Co\\ "), "ilike.*100\\%\\_Co\\\\*");
    }

    #[test]
    fn gotrue_error_description_wins() {
        let error = clean_error_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(
            error.to_string(),
            "server error (400): Invalid login credentials"
        );
    }

    #[test]
    fn postgrest_message_is_used() {
        let error = clean_error_response(
            StatusCode::FORBIDDEN,
            r#"{"code":"42501","message":"new row violates row-level security policy"}"#,
        );
        assert_eq!(
            error.to_string(),
            "server error (403): new row violates row-level security policy"
        );
    }

    #[test]
    fn bare_unauthorized_suggests_signing_in() {
        let error = clean_error_response(StatusCode::UNAUTHORIZED, "");
        assert!(error.to_string().contains("sign in again"));
    }

    #[test]
    fn short_plain_body_is_echoed() {
        let error = clean_error_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(error.to_string(), "server error (502): upstream down");
    }
}
