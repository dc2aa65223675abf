//! Single-flight refresh of the access token.
//!
//! The first caller to need a refresh spawns it and publishes a receiver in
//! the coordinator's slot; later callers clone that receiver instead of
//! starting their own. The spawned task commits the outcome to the session
//! exactly once (login on success, logout on failure), empties the slot and
//! only then wakes the waiters.

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    models::{AuthResponse, RefreshTokenRequest},
    session::SessionStore,
};

pub const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Debug, Clone, Error)]
pub enum RefreshFailure {
    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Failed to refresh token: backend answered {0}")]
    Rejected(StatusCode),

    #[error("Failed to refresh token: {0}")]
    Transport(String),

    /// The refresh task went away without reporting back.
    #[error("Token refresh ended without a result")]
    Abandoned,
}

pub(crate) type RefreshOutcome = Result<AuthResponse, RefreshFailure>;

type Pending = watch::Receiver<Option<RefreshOutcome>>;

/// Performs the refresh call itself.
#[derive(Clone)]
pub(crate) struct TokenRefresher {
    http: Client,
    endpoint: String,
    session: SessionStore,
}

impl TokenRefresher {
    pub(crate) fn new(http: Client, endpoint: String, session: SessionStore) -> Self {
        Self {
            http,
            endpoint,
            session,
        }
    }

    /// POSTs the current refresh token. Never attaches the access token.
    async fn refresh(&self) -> RefreshOutcome {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(RefreshFailure::MissingRefreshToken)?;

        let response = self
            .http
            .post(&self.endpoint)
            .json(&RefreshTokenRequest { refresh_token })
            .send()
            .await
            .map_err(|err| RefreshFailure::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshFailure::Rejected(status));
        }

        response
            .json::<AuthResponse>()
            .await
            .map_err(|err| RefreshFailure::Transport(err.to_string()))
    }

    async fn refresh_and_commit(&self) -> RefreshOutcome {
        let outcome = self.refresh().await;
        match &outcome {
            Ok(auth) => {
                info!(user = %auth.user.username, "access token refreshed");
                self.session.login(auth.user.clone(), auth.tokens.clone());
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.session.logout();
            }
        }
        outcome
    }
}

#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    in_flight: Arc<Mutex<Option<Pending>>>,
}

impl RefreshCoordinator {
    /// Waits for the in-flight refresh, starting one if there is none.
    pub(crate) async fn refresh(&self, refresher: &TokenRefresher) -> RefreshOutcome {
        let mut pending = self.join_or_start(refresher);
        let outcome = match pending.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone().unwrap_or(Err(RefreshFailure::Abandoned)),
            Err(_) => Err(RefreshFailure::Abandoned),
        };
        outcome
    }

    // Checking the slot and claiming it happen under one lock, so two callers
    // can never both start a refresh.
    fn join_or_start(&self, refresher: &TokenRefresher) -> Pending {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        // a closed channel means the task died; start over
        if let Some(pending) = slot.as_ref().filter(|p| p.has_changed().is_ok()) {
            debug!("joining in-flight token refresh");
            return pending.clone();
        }

        debug!("starting token refresh");
        let (tx, rx) = watch::channel(None);
        *slot = Some(rx.clone());

        let refresher = refresher.clone();
        let in_flight = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            let outcome = refresher.refresh_and_commit().await;
            in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            tx.send_replace(Some(outcome));
        });

        rx
    }

    #[cfg(test)]
    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthTokens, User};
    use serde_json::json;

    fn user() -> User {
        serde_json::from_value(json!({
            "id": "u1",
            "email": "ada@example.com",
            "username": "ada",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_without_a_request() {
        let session = SessionStore::in_memory();
        session.set_user(Some(user()));

        // nothing listens on this port; a request would surface as Transport
        let refresher = TokenRefresher::new(
            Client::new(),
            "http://127.0.0.1:9/auth/refresh".into(),
            session.clone(),
        );
        let coordinator = RefreshCoordinator::default();

        let outcome = coordinator.refresh(&refresher).await;

        assert!(matches!(outcome, Err(RefreshFailure::MissingRefreshToken)));
        assert!(!session.is_authenticated());
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test]
    async fn transport_failure_logs_out_and_clears_the_slot() {
        let session = SessionStore::in_memory();
        session.login(user(), AuthTokens::new("a1", "r1"));

        let refresher = TokenRefresher::new(
            Client::new(),
            "http://127.0.0.1:9/auth/refresh".into(),
            session.clone(),
        );
        let coordinator = RefreshCoordinator::default();

        let outcome = coordinator.refresh(&refresher).await;

        assert!(matches!(outcome, Err(RefreshFailure::Transport(_))));
        assert_eq!(session.tokens(), None);
        assert!(!coordinator.is_in_flight());
    }
}
