//! REST API client for the Swing Boudoir backend.
//!
//! Wraps the `/api` endpoints using [`reqwest`], attaches the session token
//! as a bearer header and unwraps the `{success, data}` envelope.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use swing_core::profile::{Profile, ProfileDraft};
use swing_core::voting::VoteEligibility;

use crate::error::{ClientError, ClientResult};
use crate::models::{
    Competition, LeaderboardEntry, Notification, Registration, Session, User, UserUpdate,
    VotePackage, VoteReceipt, VoteRequest,
};
use crate::onboarding::ProfileApi;

/// HTTP client for one backend instance.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
    code: String,
}

#[derive(Deserialize)]
struct CountBody {
    count: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkedReadBody {
    marked_read: u64,
}

impl ApiClient {
    /// * `base_url` - server origin, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // ---- auth ----

    /// Exchange a Google ID token for a session. The session token is kept
    /// for subsequent calls.
    pub async fn sign_in_with_google(&mut self, credential: &str) -> ClientResult<Session> {
        let session: Session = self
            .send(
                self.request(Method::POST, "/auth/google")
                    .json(&json!({ "credential": credential })),
            )
            .await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    pub async fn refresh_session(&mut self) -> ClientResult<Session> {
        let session: Session = self.send(self.request(Method::POST, "/auth/refresh")).await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    // ---- user ----

    pub async fn current_user(&self) -> ClientResult<User> {
        self.send(self.request(Method::GET, "/user")).await
    }

    pub async fn my_registrations(&self) -> ClientResult<Vec<Registration>> {
        self.send(self.request(Method::GET, "/user/registrations")).await
    }

    // ---- competitions ----

    pub async fn list_competitions(&self, status: Option<&str>) -> ClientResult<Vec<Competition>> {
        let mut request = self.request(Method::GET, "/competitions");
        if let Some(status) = status {
            request = request.query(&[("status", status)]);
        }
        self.send(request).await
    }

    pub async fn list_available_competitions(&self) -> ClientResult<Vec<Competition>> {
        self.send(self.request(Method::GET, "/competitions/available"))
            .await
    }

    pub async fn leaderboard(&self, competition_id: &str) -> ClientResult<Vec<LeaderboardEntry>> {
        self.send(self.request(
            Method::GET,
            &format!("/competitions/{competition_id}/leaderboard"),
        ))
        .await
    }

    pub async fn join_competition(&self, competition_id: &str) -> ClientResult<Registration> {
        self.send(self.request(Method::POST, &format!("/competitions/{competition_id}/join")))
            .await
    }

    pub async fn withdraw_competition(&self, competition_id: &str) -> ClientResult<Registration> {
        self.send(self.request(
            Method::POST,
            &format!("/competitions/{competition_id}/withdraw"),
        ))
        .await
    }

    // ---- voting ----

    pub async fn cast_vote(&self, model_id: &str, vote: &VoteRequest) -> ClientResult<VoteReceipt> {
        self.send(
            self.request(Method::POST, &format!("/public/profile/{model_id}/vote"))
                .json(vote),
        )
        .await
    }

    pub async fn vote_status(&self, model_id: &str, voter_id: &str) -> ClientResult<VoteEligibility> {
        self.send(
            self.request(Method::GET, &format!("/public/profile/{model_id}/vote-status"))
                .query(&[("voterId", voter_id)]),
        )
        .await
    }

    pub async fn vote_packages(&self) -> ClientResult<Vec<VotePackage>> {
        self.send(self.request(Method::GET, "/public/vote-packages"))
            .await
    }

    // ---- notifications ----

    pub async fn list_notifications(&self, unread_only: bool) -> ClientResult<Vec<Notification>> {
        self.send(
            self.request(Method::GET, "/notifications")
                .query(&[("unreadOnly", unread_only)]),
        )
        .await
    }

    pub async fn unread_notification_count(&self) -> ClientResult<i64> {
        let body: CountBody = self
            .send(self.request(Method::GET, "/notifications/unread-count"))
            .await?;
        Ok(body.count)
    }

    pub async fn mark_notification_read(&self, id: &str) -> ClientResult<()> {
        self.send_empty(self.request(Method::POST, &format!("/notifications/{id}/read")))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> ClientResult<u64> {
        let body: MarkedReadBody = self
            .send(self.request(Method::POST, "/notifications/read-all"))
            .await?;
        Ok(body.marked_read)
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}/api{path}", self.base_url));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send the request and unwrap the `data` of a success envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = Self::ensure_success(request.send().await?).await?;
        let envelope: DataEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    /// Send the request, discarding any body.
    async fn send_empty(&self, request: RequestBuilder) -> ClientResult<()> {
        Self::ensure_success(request.send().await?).await?;
        Ok(())
    }

    /// Map a non-2xx response to [`ClientError::Api`], reading `error` and
    /// `code` from the failure envelope when the body has one.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => (envelope.code, envelope.error),
            Err(_) => (fallback_code(status), body),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

fn fallback_code(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
        .replace(' ', "_")
}

#[async_trait]
impl ProfileApi for ApiClient {
    async fn create_profile(&self, draft: &ProfileDraft) -> ClientResult<Profile> {
        self.send(self.request(Method::POST, "/user/profile").json(draft))
            .await
    }

    async fn update_user(&self, update: &UserUpdate) -> ClientResult<User> {
        self.send(self.request(Method::PATCH, "/user").json(update))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
        assert!(client.token().is_none());
    }

    #[test]
    fn fallback_codes_are_screaming_snake() {
        assert_eq!(fallback_code(StatusCode::NOT_FOUND), "NOT_FOUND");
        assert_eq!(fallback_code(StatusCode::BAD_GATEWAY), "BAD_GATEWAY");
    }
}
