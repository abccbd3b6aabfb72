use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::RecipeRepository;
use crate::{
    error::AppResult,
    models::{RawRecipeRecord, RecipeId},
};

/// JSON layout accepted by [`InMemoryRecipeRepository::from_json_file`]
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSnapshot {
    pub recipes: Vec<RawRecipeRecord>,
    /// username -> saved recipe ids
    #[serde(default)]
    pub saved: HashMap<String, Vec<RecipeId>>,
}

/// Recipe repository backed by plain vectors, for tests and offline demos
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecipeRepository {
    recipes: Vec<RawRecipeRecord>,
    saved: HashMap<String, Vec<RecipeId>>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a recipe to the catalog
    pub fn with_recipe(mut self, recipe: RawRecipeRecord) -> Self {
        self.recipes.push(recipe);
        self
    }

    /// Registers a user with no saved recipes
    pub fn with_user(mut self, username: &str) -> Self {
        self.saved.entry(username.to_string()).or_default();
        self
    }

    /// Records that a user saved a recipe, registering the user if needed
    pub fn save_recipe(&mut self, username: &str, recipe_id: RecipeId) {
        let saved = self.saved.entry(username.to_string()).or_default();
        if !saved.contains(&recipe_id) {
            saved.push(recipe_id);
        }
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            recipes: snapshot.recipes,
            saved: snapshot.saved,
        }
    }

    /// Loads a catalog snapshot from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read catalog {}: {}", path.display(), e))?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid catalog {}: {}", path.display(), e))?;
        Ok(Self::from_snapshot(snapshot))
    }
}

#[async_trait::async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn fetch_all(&self) -> AppResult<Vec<RawRecipeRecord>> {
        Ok(self.recipes.clone())
    }

    async fn fetch_recipe(&self, recipe_id: RecipeId) -> AppResult<Option<RawRecipeRecord>> {
        Ok(self.recipes.iter().find(|r| r.id == recipe_id).cloned())
    }

    async fn saved_recipe_ids(&self, username: &str) -> AppResult<Option<Vec<RecipeId>>> {
        Ok(self.saved.get(username).cloned())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
