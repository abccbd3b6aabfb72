use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{RankedResult, RecipeId, ScoredRecipe},
};

use super::AppState;

/// Message returned alongside an empty recommendation list
pub const NO_RECOMMENDATIONS: &str = "No recommendations available.";

// Request/Response types

#[derive(Debug, Default, Deserialize)]
pub struct SimilarQuery {
    pub top_n: Option<usize>,
    pub min_similarity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub min_similarity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientsRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<ScoredRecipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl From<RankedResult> for RecommendationResponse {
    fn from(result: RankedResult) -> Self {
        let message = result.is_empty().then(|| NO_RECOMMENDATIONS.to_string());
        Self {
            recommendations: result.into_vec(),
            message,
            generated_at: Utc::now(),
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recipes similar to one catalog recipe
pub async fn similar_recipes(
    State(state): State<AppState>,
    Path(recipe_id): Path<RecipeId>,
    Query(query): Query<SimilarQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    validate_min_similarity(query.min_similarity)?;

    let result = state
        .recommendations
        .similar_to_recipe(recipe_id, query.top_n, query.min_similarity)
        .await?;
    Ok(Json(result.into()))
}

/// Recipes matching a user's saved-recipe profile
pub async fn user_recommendations(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    validate_min_similarity(query.min_similarity)?;

    let result = state
        .recommendations
        .similar_to_user_profile(&username, query.min_similarity)
        .await?;
    Ok(Json(result.into()))
}

/// Recipes sharing ingredients with a free-text ingredient list
pub async fn recipes_by_ingredients(
    State(state): State<AppState>,
    Json(request): Json<IngredientsRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    if request.ingredients.iter().all(|line| line.trim().is_empty()) {
        return Err(AppError::InvalidInput("Missing ingredients".to_string()));
    }

    let result = state
        .recommendations
        .similar_to_ingredients(&request.ingredients)
        .await?;
    Ok(Json(result.into()))
}

fn validate_min_similarity(value: Option<f64>) -> AppResult<()> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(AppError::InvalidInput(format!(
            "min_similarity must be between 0 and 1, got {v}"
        ))),
        _ => Ok(()),
    }
}
