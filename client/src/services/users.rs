//! Public profiles and management of the logged in account.

use serde::{de::IgnoredAny, Deserialize, Serialize};
use tracing::info;

use crate::{
    api::{ApiClient, RequestOptions},
    cache::RecipeCache,
    errors::ClientError,
    models::{Recipe, User, UserUpdate},
};

/// How many recipes a profile page shows.
pub const PROFILE_RECIPE_LIMIT: u32 = 12;

/// A user together with the first page of their recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub user: User,
    pub recipes: Vec<Recipe>,
}

pub struct UserService<'a> {
    api: &'a ApiClient,
    cache: &'a RecipeCache,
}

impl<'a> UserService<'a> {
    pub fn new(api: &'a ApiClient, cache: &'a RecipeCache) -> Self {
        Self { api, cache }
    }

    pub async fn by_username(&self, username: &str) -> Result<User, ClientError> {
        self.api
            .get(&format!("/users/username/{username}"), RequestOptions::public())
            .await
    }

    pub async fn profile(&self, username: &str) -> Result<PublicProfile, ClientError> {
        let user = self.by_username(username).await?;
        let recipes = self
            .api
            .get(
                &format!(
                    "/recipes/author/{}?page=1&limit={PROFILE_RECIPE_LIMIT}",
                    user.email
                ),
                RequestOptions::public(),
            )
            .await?;
        Ok(PublicProfile { user, recipes })
    }

    /// Updates the logged in user and merges the result into the session.
    pub async fn update_me(&self, changes: &UserUpdate) -> Result<User, ClientError> {
        let email = self.current_email()?;
        let updated: User = self
            .api
            .patch(&format!("/users/email/{email}"), changes, RequestOptions::new())
            .await?;
        self.api.session().update_user(updated.clone().into());
        Ok(updated)
    }

    /// Deletes the logged in account, then drops every cached list and logs
    /// out.
    pub async fn delete_me(&self) -> Result<(), ClientError> {
        let email = self.current_email()?;
        let _: IgnoredAny = self
            .api
            .delete(&format!("/users/email/{email}"), RequestOptions::new())
            .await?;
        self.cache.clear().await;
        self.api.session().logout();
        info!(%email, "account deleted");
        Ok(())
    }

    fn current_email(&self) -> Result<String, ClientError> {
        self.api
            .session()
            .user()
            .map(|u| u.email)
            .ok_or(ClientError::NotAuthenticated)
    }
}
