//! Local checks for recipe bodies before they are sent to the backend.
//!
//! Every rule is evaluated and all violations are reported together, so a
//! form can highlight each offending field at once.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::models::{CreateRecipe, UpdateRecipe};

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;
pub const INGREDIENTS_MAX: usize = 50;
pub const INSTRUCTIONS_MAX: usize = 20;
pub const SERVINGS_RANGE: std::ops::RangeInclusive<u32> = 1..=50;

static COOKING_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d+\s*(minutes?|hours?|hrs?)$").expect("cooking time pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid recipe: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|e| e.field)
    }
}

#[derive(Default)]
struct Checker(Vec<FieldError>);

impl Checker {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn name(&mut self, name: &str) {
        if name.is_empty() {
            self.fail("name", "Recipe name is required");
        } else if name.chars().count() > NAME_MAX {
            self.fail("name", format!("Recipe name must not exceed {NAME_MAX} characters"));
        }
    }

    fn description(&mut self, description: Option<&str>) {
        if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX) {
            self.fail(
                "description",
                format!("Description must not exceed {DESCRIPTION_MAX} characters"),
            );
        }
    }

    fn steps(&mut self, field: &'static str, label: &str, items: &[String], max: usize) {
        if items.is_empty() {
            self.fail(field, format!("At least one {label} is required"));
        } else if items.len() > max {
            self.fail(field, format!("Cannot exceed {max} {field}"));
        }
        if items.iter().any(String::is_empty) {
            self.fail(field, format!("{} cannot be empty", capitalize(label)));
        }
    }

    fn cooking_time(&mut self, cooking_time: &str) {
        if cooking_time.is_empty() {
            self.fail("cookingTime", "Cooking time is required");
        } else if !COOKING_TIME.is_match(cooking_time) {
            self.fail(
                "cookingTime",
                r#"Cooking time must be in format like "30 minutes" or "2 hours""#,
            );
        }
    }

    fn servings(&mut self, servings: u32) {
        if servings < *SERVINGS_RANGE.start() {
            self.fail("servings", "Servings must be at least 1");
        } else if servings > *SERVINGS_RANGE.end() {
            self.fail("servings", "Servings cannot exceed 50");
        }
    }

    fn image(&mut self, image: Option<&str>) {
        if let Some(image) = image {
            if Url::parse(image).is_err() {
                self.fail("image", "Image must be a valid URL");
            }
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn validate_new(recipe: &CreateRecipe) -> Result<(), ValidationErrors> {
    let mut check = Checker::default();
    check.name(&recipe.name);
    check.description(recipe.description.as_deref());
    check.steps("ingredients", "ingredient", &recipe.ingredients, INGREDIENTS_MAX);
    check.steps("instructions", "instruction", &recipe.instructions, INSTRUCTIONS_MAX);
    check.cooking_time(&recipe.cooking_time);
    check.servings(recipe.servings);
    check.image(recipe.image.as_deref());
    check.finish()
}

/// Same rules as [`validate_new`], applied only to the fields being changed.
pub fn validate_update(changes: &UpdateRecipe) -> Result<(), ValidationErrors> {
    let mut check = Checker::default();
    if let Some(name) = &changes.name {
        check.name(name);
    }
    check.description(changes.description.as_deref());
    if let Some(ingredients) = &changes.ingredients {
        check.steps("ingredients", "ingredient", ingredients, INGREDIENTS_MAX);
    }
    if let Some(instructions) = &changes.instructions {
        check.steps("instructions", "instruction", instructions, INSTRUCTIONS_MAX);
    }
    if let Some(cooking_time) = &changes.cooking_time {
        check.cooking_time(cooking_time);
    }
    if let Some(servings) = changes.servings {
        check.servings(servings);
    }
    check.image(changes.image.as_deref());
    check.finish()
}
