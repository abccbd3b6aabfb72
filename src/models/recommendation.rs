use serde::{Deserialize, Serialize};

use super::RecipeId;

/// What a recommendation request is anchored on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SimilarityQuery {
    /// Recipes resembling one catalog recipe
    ByRecipe { recipe_id: RecipeId },
    /// Recipes matching the taste profile built from a user's saved recipes
    ByUserProfile { saved_recipe_ids: Vec<RecipeId> },
    /// Recipes whose ingredients overlap free-text ingredients
    ByIngredientText { text: String },
}

/// One ranked recipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecipe {
    pub recipe_id: RecipeId,
    /// Cosine similarity to the query, in [0, 1]
    pub similarity: f64,
    /// Final ranking score; blended for recipe queries, equal to `similarity` otherwise
    pub score: f64,
}

/// Ordered recommendations without duplicate recipe ids
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedResult {
    entries: Vec<ScoredRecipe>,
}

impl RankedResult {
    /// An empty result, meaning "no recommendations"
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_sorted(entries: Vec<ScoredRecipe>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredRecipe> {
        self.entries.iter()
    }

    /// Recipe ids in rank order, for the caller to hydrate
    pub fn recipe_ids(&self) -> Vec<RecipeId> {
        self.entries.iter().map(|e| e.recipe_id).collect()
    }

    pub fn into_vec(self) -> Vec<ScoredRecipe> {
        self.entries
    }
}
