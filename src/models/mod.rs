mod recipe;
mod recommendation;

pub use recipe::{NormalizedRecipeRecord, Nutrition, RawNutrition, RawRecipeRecord, RecipeId};
pub use recommendation::{RankedResult, ScoredRecipe, SimilarityQuery};
