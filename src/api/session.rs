//! Bearer-token sessions and the extractors built on them.
//!
//! Tokens live in memory only; restarting the server logs everybody out.

use super::AppState;
use crate::{
    core::user::get_user_by_id,
    entities::user,
    errors::Error,
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Token → user id map shared by all requests
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, i64>>>,
}

impl SessionStore {
    /// Starts a session for `user_id` and returns its token.
    pub async fn create(&self, user_id: i64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.write().await.insert(token.clone(), user_id);
        info!("Session started for user {user_id}");
        token
    }

    /// User behind `token`, if the session exists.
    pub async fn user_id(&self, token: &str) -> Option<i64> {
        self.sessions.read().await.get(token).copied()
    }

    /// Ends one session. Returns false if the token was unknown.
    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Ends every session of `user_id` and returns how many there were.
    pub async fn remove_user(&self, user_id: i64) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, owner| *owner != user_id);
        before - sessions.len()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Any logged-in account
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The account, reloaded for this request
    pub user: user::Model,
    /// Session token the request carried
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let token = bearer_token(parts).ok_or(Error::Unauthorized)?.to_string();
        let user_id = state
            .sessions
            .user_id(&token)
            .await
            .ok_or(Error::Unauthorized)?;

        match get_user_by_id(&state.db, user_id).await? {
            Some(user) => Ok(Self { user, token }),
            None => {
                debug!("Dropping session of deleted user {user_id}");
                state.sessions.remove(&token).await;
                Err(Error::Unauthorized)
            }
        }
    }
}

/// A logged-in administrator
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let CurrentUser { user, .. } = CurrentUser::from_request_parts(parts, state).await?;
        if user.is_admin() {
            Ok(Self(user))
        } else {
            Err(Error::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::default();
        let first = store.create(7).await;
        let second = store.create(7).await;
        let other = store.create(8).await;
        assert_ne!(first, second);

        assert_eq!(store.user_id(&first).await, Some(7));
        assert!(store.remove(&first).await);
        assert!(!store.remove(&first).await);
        assert_eq!(store.user_id(&first).await, None);

        assert_eq!(store.remove_user(7).await, 1);
        assert_eq!(store.user_id(&second).await, None);
        assert_eq!(store.user_id(&other).await, Some(8));
    }
}
