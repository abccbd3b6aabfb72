/// Recipe data access
///
/// The recommender only reads recipes; it never writes. Implementations must
/// report a missing user as `Ok(None)` rather than an error so callers can
/// render "no recommendations".
use crate::{
    error::AppResult,
    models::{RawRecipeRecord, RecipeId},
};

pub mod memory;
pub mod postgres;

pub use memory::{CatalogSnapshot, InMemoryRecipeRepository};
pub use postgres::{create_pool, PgRecipeRepository};

/// Source of raw recipe records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Every recipe in the catalog, in a stable order
    async fn fetch_all(&self) -> AppResult<Vec<RawRecipeRecord>>;

    /// A single recipe, or `None` when it does not exist
    async fn fetch_recipe(&self, recipe_id: RecipeId) -> AppResult<Option<RawRecipeRecord>>;

    /// Ids of the recipes a user saved, or `None` when the user does not exist
    async fn saved_recipe_ids(&self, username: &str) -> AppResult<Option<Vec<RecipeId>>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
