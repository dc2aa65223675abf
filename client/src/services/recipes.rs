//! Recipe search, reads and authoring.
//!
//! Authoring operations keep the current user's cached recipe list in step
//! with the backend: updates and deletions are applied to the cache first and
//! rolled back if the request fails. Confirmed changes invalidate the list so
//! the next [`RecipeService::mine`] refetches it.

use chrono::Utc;
use serde::de::IgnoredAny;
use url::form_urlencoded;

use crate::{
    api::{ApiClient, RequestOptions},
    cache::RecipeCache,
    catalog::RecipeQuery,
    errors::ClientError,
    models::{CreateRecipe, Recipe, UpdateRecipe},
    validation,
};

pub struct RecipeService<'a> {
    api: &'a ApiClient,
    cache: &'a RecipeCache,
    catalog_url: &'a str,
}

impl<'a> RecipeService<'a> {
    pub fn new(api: &'a ApiClient, cache: &'a RecipeCache, catalog_url: &'a str) -> Self {
        Self {
            api,
            cache,
            catalog_url,
        }
    }

    /// Catalog search through `GET {catalog_url}/api/recipes`.
    pub async fn search(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, ClientError> {
        let mut url = format!("{}/api/recipes", self.catalog_url.trim_end_matches('/'));
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        self.api.get(&url, RequestOptions::public()).await
    }

    pub async fn get(&self, slug: &str) -> Result<Recipe, ClientError> {
        self.api
            .get(&format!("/recipes/slug/{slug}"), RequestOptions::public())
            .await
    }

    pub async fn by_author(
        &self,
        email: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Recipe>, ClientError> {
        self.api
            .get(
                &format!("/recipes/author/{email}?page={page}&limit={limit}"),
                RequestOptions::public(),
            )
            .await
    }

    /// All recipes of the logged in user, served from the cache unless the
    /// cached list has been invalidated.
    pub async fn mine(&self) -> Result<Vec<Recipe>, ClientError> {
        let email = self.current_email()?;
        if let Some(cached) = self.cache.get_fresh(&email).await {
            return Ok(cached);
        }

        let recipes: Vec<Recipe> = self
            .api
            .get(&format!("/recipes/author/{email}"), RequestOptions::new())
            .await?;
        self.cache.set(&email, recipes.clone()).await;
        Ok(recipes)
    }

    pub async fn create(&self, recipe: &CreateRecipe) -> Result<Recipe, ClientError> {
        validation::validate_new(recipe)?;

        let created: Recipe = self.api.post("/recipes", recipe, RequestOptions::new()).await?;
        if let Some(email) = self.api.session().user().map(|u| u.email) {
            self.cache.prepend(&email, created.clone()).await;
            self.cache.invalidate(&email).await;
        }
        Ok(created)
    }

    pub async fn update(&self, slug: &str, changes: &UpdateRecipe) -> Result<Recipe, ClientError> {
        validation::validate_update(changes)?;
        let email = self.api.session().user().map(|u| u.email);

        let snapshot = match &email {
            Some(email) => Some(
                self.cache
                    .apply(email, |recipes| {
                        let now = Utc::now();
                        for recipe in recipes.iter_mut().filter(|r| r.has_slug(slug)) {
                            recipe.apply(changes);
                            recipe.updated_at = Some(now);
                        }
                    })
                    .await,
            ),
            None => None,
        };

        let result: Result<Recipe, _> = self
            .api
            .patch(&format!("/recipes/slug/{slug}"), changes, RequestOptions::new())
            .await;

        match (result, email, snapshot) {
            (Ok(updated), Some(email), _) => {
                let confirmed = updated.clone();
                let _ = self
                    .cache
                    .apply(&email, |recipes| {
                        for recipe in recipes.iter_mut().filter(|r| r.has_slug(slug)) {
                            *recipe = confirmed.clone();
                        }
                    })
                    .await;
                self.cache.invalidate(&email).await;
                Ok(updated)
            }
            (Ok(updated), None, _) => Ok(updated),
            (Err(err), _, Some(snapshot)) => {
                self.cache.restore(snapshot).await;
                Err(err)
            }
            (Err(err), _, None) => Err(err),
        }
    }

    pub async fn delete(&self, slug: &str) -> Result<(), ClientError> {
        let email = self.api.session().user().map(|u| u.email);
        let snapshot = match &email {
            Some(email) => Some(
                self.cache
                    .apply(email, |recipes| recipes.retain(|r| !r.has_slug(slug)))
                    .await,
            ),
            None => None,
        };

        // the body of a successful delete carries nothing we need
        let result: Result<IgnoredAny, _> = self
            .api
            .delete(&format!("/recipes/slug/{slug}"), RequestOptions::new())
            .await;

        match (result, snapshot) {
            (Ok(_), _) => {
                if let Some(email) = &email {
                    self.cache.invalidate(email).await;
                }
                Ok(())
            }
            (Err(err), Some(snapshot)) => {
                self.cache.restore(snapshot).await;
                Err(err)
            }
            (Err(err), None) => Err(err),
        }
    }

    fn current_email(&self) -> Result<String, ClientError> {
        self.api
            .session()
            .user()
            .map(|u| u.email)
            .ok_or(ClientError::NotAuthenticated)
    }
}
