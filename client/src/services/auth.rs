//! Login, registration, logout and token validation.

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    api::{ApiClient, RequestOptions},
    cache::RecipeCache,
    errors::ClientError,
    models::{
        AuthResponse, LoginRequest, LogoutRequest, RegisterRequest, User, ValidateTokenRequest,
    },
};

pub struct AuthService<'a> {
    api: &'a ApiClient,
    cache: &'a RecipeCache,
}

impl<'a> AuthService<'a> {
    pub fn new(api: &'a ApiClient, cache: &'a RecipeCache) -> Self {
        Self { api, cache }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<User, ClientError> {
        let auth: AuthResponse = self
            .api
            .post("/auth/login", credentials, RequestOptions::public())
            .await?;
        info!(user = %auth.user.username, "logged in");
        self.api.session().login(auth.user.clone(), auth.tokens);
        Ok(auth.user)
    }

    /// A taken email or username comes back as an error for which
    /// [`ClientError::is_conflict`] holds.
    pub async fn register(&self, details: &RegisterRequest) -> Result<User, ClientError> {
        let auth: AuthResponse = self
            .api
            .post("/auth/register", details, RequestOptions::public())
            .await?;
        info!(user = %auth.user.username, "registered");
        self.api.session().login(auth.user.clone(), auth.tokens);
        Ok(auth.user)
    }

    /// Revokes the refresh token on the backend when there is one, then
    /// clears local state. The local logout happens even if the backend call
    /// fails.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.api.session().refresh_token() {
            let result: Result<Value, _> = self
                .api
                .post("/auth/logout", &LogoutRequest { refresh_token }, RequestOptions::new())
                .await;
            if let Err(err) = result {
                warn!(error = %err, "backend logout failed, clearing local session anyway");
            }
        }
        self.cache.clear().await;
        self.api.session().logout();
        info!("logged out");
    }

    /// Asks the backend whether `token` is valid. Clears the session if not.
    pub async fn validate_token(&self, token: &str) -> Result<(), ClientError> {
        let result: Result<Value, _> = self
            .api
            .post(
                "/auth/validate",
                &ValidateTokenRequest {
                    token: token.to_string(),
                },
                RequestOptions::public(),
            )
            .await;

        if let Err(err) = result {
            self.api.session().logout();
            return Err(err);
        }
        Ok(())
    }

    /// Startup check of a restored session: validates the stored access token
    /// (as an authenticated request, so an expired token gets a refresh
    /// first) and logs out when the backend rejects it.
    ///
    /// Returns whether the session is still logged in.
    pub async fn check_session(&self) -> bool {
        let session = self.api.session();
        let Some(token) = session.access_token().filter(|_| session.is_authenticated()) else {
            return false;
        };

        let result: Result<Value, _> = self
            .api
            .post("/auth/validate", &ValidateTokenRequest { token }, RequestOptions::new())
            .await;

        if let Err(err) = result {
            warn!(error = %err, "stored session rejected");
            session.logout();
        }
        session.is_authenticated()
    }
}
