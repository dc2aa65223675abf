//! The recipe catalog served by the search route.
//!
//! Recipes are read once at startup and kept in memory; every query filters
//! the same immutable list.

use std::{fs, path::Path};

use recipehub_client::{Recipe, RecipeQuery};

use crate::errors::CatalogError;

#[derive(Debug, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let recipes = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(recipes))
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn search(&self, query: &RecipeQuery) -> Vec<Recipe> {
        query.apply(&self.recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use recipehub_client::TimeFilter;
    use tempfile::NamedTempFile;

    const RECIPES: &str = r#"[
        {"id": "pancakes", "name": "Pancakes", "ingredients": ["Flour", "Milk"],
         "instructions": ["Mix", "Fry"], "cookingTime": "20 minutes", "servings": 4},
        {"id": "stew", "name": "Beef Stew", "ingredients": ["Beef", "Carrots"],
         "instructions": ["Simmer"], "cookingTime": "2 hours", "servings": 6}
    ]"#;

    fn recipe_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_a_json_array() {
        let file = recipe_file(RECIPES);

        let catalog = Catalog::load(file.path()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
        let found = catalog.search(&RecipeQuery::search("milk"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "pancakes");
    }

    #[test]
    fn empty_array_is_an_empty_catalog() {
        let catalog = Catalog::load(recipe_file("[]").path()).unwrap();

        assert!(catalog.is_empty());
        assert!(catalog.search(&RecipeQuery::default()).is_empty());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = Catalog::load(&dir.path().join("absent.json")).unwrap_err();

        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let file = recipe_file(r#"{"not": "an array"}"#);

        let err = Catalog::load(file.path()).unwrap_err();

        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn id_lookup_ignores_other_filters() {
        let catalog = Catalog::load(recipe_file(RECIPES).path()).unwrap();

        let found = catalog.search(&RecipeQuery {
            search: Some("nothing matches this".into()),
            time: Some(TimeFilter::Quick),
            id: Some("stew".into()),
        });

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Beef Stew");
    }
}
