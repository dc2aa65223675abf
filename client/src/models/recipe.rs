//! Recipe resources and the bodies used to author them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Free text such as `"30 minutes"` or `"2 hours"`.
    pub cooking_time: String,
    pub servings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Recipe {
    pub fn has_slug(&self, slug: &str) -> bool {
        self.slug.as_deref() == Some(slug)
    }

    /// Applies a partial update in place. Unset fields are left untouched.
    pub fn apply(&mut self, changes: &UpdateRecipe) {
        if let Some(name) = &changes.name {
            self.name.clone_from(name);
        }
        if changes.description.is_some() {
            self.description.clone_from(&changes.description);
        }
        if let Some(ingredients) = &changes.ingredients {
            self.ingredients.clone_from(ingredients);
        }
        if let Some(instructions) = &changes.instructions {
            self.instructions.clone_from(instructions);
        }
        if let Some(cooking_time) = &changes.cooking_time {
            self.cooking_time.clone_from(cooking_time);
        }
        if let Some(servings) = changes.servings {
            self.servings = servings;
        }
        if changes.image.is_some() {
            self.image.clone_from(&changes.image);
        }
    }
}

/// Body of `POST /recipes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipe {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: String,
    pub servings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Body of `PATCH /recipes/slug/{slug}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
