use std::sync::Arc;

use crate::{db::RecipeRepository, services::RecommendationService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(recommendations: RecommendationService) -> Self {
        Self {
            recommendations: Arc::new(recommendations),
        }
    }

    /// Builds the recommendation service over `repository`
    pub fn from_repository(
        repository: Arc<dyn RecipeRepository>,
        settings: crate::services::RecommendationSettings,
    ) -> Self {
        tracing::info!(repository = repository.name(), "Using recipe repository");
        Self::new(RecommendationService::new(repository, settings))
    }
}
