use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recipe_recommender::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, InMemoryRecipeRepository, PgRecipeRepository, RecipeRepository},
    services::RecommendationSettings,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let repository: Arc<dyn RecipeRepository> = match &config.catalog_path {
        Some(path) => {
            tracing::info!(path = %path, "Loading recipe catalog snapshot");
            Arc::new(InMemoryRecipeRepository::from_json_file(path)?)
        }
        None => {
            let pool = create_pool(&config.database_url, config.max_connections).await?;
            Arc::new(PgRecipeRepository::new(pool))
        }
    };

    let state = AppState::from_repository(repository, RecommendationSettings::from(&config));
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
