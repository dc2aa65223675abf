//! Client-side cache of the logged in user's recipes.
//!
//! Mutations are applied optimistically before the backend confirms them;
//! [`RecipeCache::apply`] hands back a [`Snapshot`] that restores the previous
//! list when the request fails. Once the backend confirms a change the entry
//! is invalidated: it stays readable but the next fetch goes to the backend.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::models::Recipe;

/// Cached lists keyed by author email.
#[derive(Debug, Clone, Default)]
pub struct RecipeCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    recipes: Vec<Recipe>,
    stale: bool,
}

/// The state of one cache entry before an optimistic change.
#[derive(Debug, Clone)]
#[must_use = "a snapshot is needed to roll back a failed change"]
pub struct Snapshot {
    key: String,
    entry: Option<Entry>,
}

impl RecipeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached list, stale or not.
    pub async fn get(&self, key: &str) -> Option<Vec<Recipe>> {
        self.entries.read().await.get(key).map(|e| e.recipes.clone())
    }

    /// The cached list unless it has been invalidated since it was fetched.
    pub async fn get_fresh(&self, key: &str) -> Option<Vec<Recipe>> {
        self.entries
            .read()
            .await
            .get(key)
            .filter(|e| !e.stale)
            .map(|e| e.recipes.clone())
    }

    pub async fn set(&self, key: &str, recipes: Vec<Recipe>) {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                recipes,
                stale: false,
            },
        );
    }

    /// Puts a new recipe at the front of a cached list. Lists that are not
    /// cached are left alone so a later read fetches the complete list.
    pub async fn prepend(&self, key: &str, recipe: Recipe) {
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            entry.recipes.insert(0, recipe);
        }
    }

    /// Applies `change` to a cached list and returns what it held before.
    /// Missing entries are not created.
    pub async fn apply(&self, key: &str, change: impl FnOnce(&mut Vec<Recipe>)) -> Snapshot {
        let mut entries = self.entries.write().await;
        let previous = entries.get(key).cloned();
        if let Some(entry) = entries.get_mut(key) {
            change(&mut entry.recipes);
        }
        Snapshot {
            key: key.to_string(),
            entry: previous,
        }
    }

    /// Rolls an entry back to a snapshot taken by [`RecipeCache::apply`].
    pub async fn restore(&self, snapshot: Snapshot) {
        let mut entries = self.entries.write().await;
        match snapshot.entry {
            Some(entry) => entries.insert(snapshot.key, entry),
            None => entries.remove(&snapshot.key),
        };
    }

    /// Marks an entry stale so the next fetch goes to the backend. The list
    /// stays readable through [`RecipeCache::get`] until then.
    pub async fn invalidate(&self, key: &str) {
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            entry.stale = true;
        }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(slug: &str, name: &str) -> Recipe {
        Recipe {
            id: slug.into(),
            slug: Some(slug.into()),
            name: name.into(),
            description: None,
            ingredients: vec![],
            instructions: vec![],
            cooking_time: "10 minutes".into(),
            servings: 1,
            image: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn prepend_only_touches_cached_lists() {
        let cache = RecipeCache::new();
        cache.prepend("nobody@example.com", recipe("soup", "Soup")).await;
        assert_eq!(cache.get("nobody@example.com").await, None);

        cache.set("ada@example.com", vec![]).await;
        cache.prepend("ada@example.com", recipe("soup", "Soup")).await;
        cache.prepend("ada@example.com", recipe("cake", "Cake")).await;

        let names: Vec<_> = cache
            .get("ada@example.com")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Cake", "Soup"]);
    }

    #[tokio::test]
    async fn restore_undoes_an_optimistic_change() {
        let cache = RecipeCache::new();
        cache.set("k", vec![recipe("soup", "Soup"), recipe("cake", "Cake")]).await;

        let snapshot = cache.apply("k", |list| list.retain(|r| !r.has_slug("soup"))).await;
        assert_eq!(cache.get("k").await.unwrap().len(), 1);

        cache.restore(snapshot).await;
        assert_eq!(cache.get("k").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn apply_leaves_missing_entries_missing() {
        let cache = RecipeCache::new();
        let snapshot = cache.apply("k", |list| list.push(recipe("soup", "Soup"))).await;
        assert_eq!(cache.get("k").await, None);

        cache.restore(snapshot).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn invalidated_lists_stay_readable_but_not_fresh() {
        let cache = RecipeCache::new();
        cache.set("a", vec![recipe("soup", "Soup")]).await;
        cache.set("b", vec![]).await;

        cache.invalidate("a").await;
        assert_eq!(cache.get("a").await.unwrap().len(), 1);
        assert_eq!(cache.get_fresh("a").await, None);
        assert!(cache.get_fresh("b").await.is_some());

        cache.set("a", vec![]).await;
        assert_eq!(cache.get_fresh("a").await, Some(vec![]));

        cache.clear().await;
        assert_eq!(cache.get("b").await, None);
    }

    #[tokio::test]
    async fn restore_brings_back_freshness() {
        let cache = RecipeCache::new();
        cache.set("k", vec![recipe("soup", "Soup")]).await;

        let snapshot = cache.apply("k", Vec::clear).await;
        cache.invalidate("k").await;
        cache.restore(snapshot).await;

        assert_eq!(cache.get_fresh("k").await.unwrap().len(), 1);
    }
}
