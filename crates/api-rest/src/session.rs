//! In-memory login sessions carried in the `sid` cookie.
//!
//! Sessions expire `SESSION_TTL_HOURS` after login and live only as long as the process. A
//! restart logs everyone out.

use crate::error::ApiError;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use carepoint_core::ShardableUuid;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const SESSION_COOKIE: &str = "sid";

/// How long a session stays valid after login.
pub const SESSION_TTL_HOURS: i64 = 24;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: ShardableUuid,
    created_at: DateTime<Utc>,
}

impl SessionEntry {
    fn is_live(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at < ttl
    }
}

/// Token to user map shared by every request.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(SESSION_TTL_HOURS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Starts a session for `user_id` and returns its opaque token.
    ///
    /// Expired sessions are pruned first.
    pub async fn create(&self, user_id: ShardableUuid) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let now = Utc::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.is_live(self.ttl, now));
        if sessions.len() < before {
            tracing::debug!(pruned = before - sessions.len(), "expired sessions pruned");
        }
        sessions.insert(
            token.clone(),
            SessionEntry {
                user_id,
                created_at: now,
            },
        );
        token
    }

    /// User behind `token`, or `None` if the session is unknown or expired.
    pub async fn user_id(&self, token: &str) -> Option<ShardableUuid> {
        let now = Utc::now();
        self.inner
            .read()
            .await
            .get(token)
            .filter(|entry| entry.is_live(self.ttl, now))
            .map(|entry| entry.user_id.clone())
    }

    /// Ends one session. Returns false if the token was unknown.
    pub async fn remove(&self, token: &str) -> bool {
        self.inner.write().await.remove(token).is_some()
    }

    /// Ends every session belonging to `user_id`, returning how many were dropped.
    pub async fn remove_user(&self, user_id: &ShardableUuid) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| &entry.user_id != user_id);
        before - sessions.len()
    }

    /// Session start time, for diagnostics.
    pub async fn created_at(&self, token: &str) -> Option<DateTime<Utc>> {
        self.inner.read().await.get(token).map(|e| e.created_at)
    }
}

/// `Set-Cookie` value that installs `token`.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Finds the session token among the request's cookies.
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// An authenticated request. Extracting it from a request without a live session rejects
/// with 401.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: ShardableUuid,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionStore: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionStore::from_ref(state);
        let token =
            token_from_headers(&parts.headers).ok_or(ApiError::Unauthorized("Unauthorized"))?;
        let user_id = store
            .user_id(&token)
            .await
            .ok_or(ApiError::Unauthorized("Unauthorized"))?;

        Ok(Session { token, user_id })
    }
}
