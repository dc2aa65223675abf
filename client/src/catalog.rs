//! Catalog search: the filter behind `GET /api/recipes`.
//!
//! The same [`RecipeQuery`] is used by the backend to filter its recipe list
//! and by the client to build the query string it sends.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::models::Recipe;

/// Cooking-time bucket, keyed on the leading number of the cooking time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    /// Under 30.
    Quick,
    /// 30 to 60 inclusive.
    Medium,
    /// Over 60.
    Long,
    /// Unknown values also land here.
    #[default]
    #[serde(other)]
    All,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::All => "all",
            TimeFilter::Quick => "quick",
            TimeFilter::Medium => "medium",
            TimeFilter::Long => "long",
        }
    }

    pub fn matches(&self, cooking_time: &str) -> bool {
        if *self == TimeFilter::All {
            return true;
        }
        let Some(minutes) = leading_number(cooking_time) else {
            return false;
        };
        match self {
            TimeFilter::All => true,
            TimeFilter::Quick => minutes < 30,
            TimeFilter::Medium => (30..=60).contains(&minutes),
            TimeFilter::Long => minutes > 60,
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "quick" => TimeFilter::Quick,
            "medium" => TimeFilter::Medium,
            "long" => TimeFilter::Long,
            _ => TimeFilter::All,
        })
    }
}

/// The integer a cooking time starts with, ignoring leading whitespace.
///
/// The unit is not looked at, so `"2 hours"` reads as 2.
pub fn leading_number(cooking_time: &str) -> Option<i64> {
    let trimmed = cooking_time.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Search parameters of the catalog route. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RecipeQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_time(mut self, time: TimeFilter) -> Self {
        self.time = Some(time);
        self
    }

    fn id_filter(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    /// Filters `recipes`. An id lookup short-circuits every other parameter
    /// and yields at most one recipe.
    pub fn apply(&self, recipes: &[Recipe]) -> Vec<Recipe> {
        if let Some(id) = self.id_filter() {
            return recipes.iter().find(|r| r.id == id).cloned().into_iter().collect();
        }

        let term = self.search_term();
        let time = self.time.unwrap_or_default();
        recipes
            .iter()
            .filter(|recipe| term.as_deref().is_none_or(|term| matches_term(recipe, term)))
            .filter(|recipe| time.matches(&recipe.cooking_time))
            .cloned()
            .collect()
    }

    /// Query string pairs, skipping unset parameters.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("search", term.to_string()));
        }
        if let Some(time) = self.time {
            pairs.push(("time", time.to_string()));
        }
        if let Some(id) = self.id_filter() {
            pairs.push(("id", id.to_string()));
        }
        pairs
    }
}

fn matches_term(recipe: &Recipe, term: &str) -> bool {
    recipe.id.to_lowercase().contains(term)
        || recipe.name.to_lowercase().contains(term)
        || recipe
            .ingredients
            .iter()
            .any(|ingredient| ingredient.to_lowercase().contains(term))
}
