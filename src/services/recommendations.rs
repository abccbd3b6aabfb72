use std::sync::Arc;
use std::time::Instant;

use crate::{
    config::Config,
    db::RecipeRepository,
    error::AppResult,
    models::{RankedResult, RecipeId, SimilarityQuery},
    services::{
        corpus::{Corpus, TextView},
        normalizer, ranker,
        vectorizer::TfidfVectorizer,
    },
};

/// Default thresholds applied when a call does not override them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationSettings {
    pub min_similarity: f64,
    pub top_n: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            min_similarity: 0.3,
            top_n: 5,
        }
    }
}

impl From<&Config> for RecommendationSettings {
    fn from(config: &Config) -> Self {
        Self {
            min_similarity: config.min_similarity,
            top_n: config.top_n,
        }
    }
}

/// Per-call overrides; `None` falls back to [`RecommendationSettings`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecommendOptions {
    pub top_n: Option<usize>,
    pub min_similarity: Option<f64>,
}

/// Content-based recipe recommendations
///
/// Every call reloads the catalog from the repository and fits a fresh
/// TF-IDF space, so results always reflect the current data.
pub struct RecommendationService {
    repository: Arc<dyn RecipeRepository>,
    settings: RecommendationSettings,
}

impl RecommendationService {
    pub fn new(repository: Arc<dyn RecipeRepository>, settings: RecommendationSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Recipes most similar to `recipe_id`, best first
    #[tracing::instrument(skip(self))]
    pub async fn similar_to_recipe(
        &self,
        recipe_id: RecipeId,
        top_n: Option<usize>,
        min_similarity: Option<f64>,
    ) -> AppResult<RankedResult> {
        self.recommend(
            SimilarityQuery::ByRecipe { recipe_id },
            RecommendOptions {
                top_n,
                min_similarity,
            },
        )
        .await
    }

    /// Unsaved recipes matching the taste of everything `username` saved
    #[tracing::instrument(skip(self))]
    pub async fn similar_to_user_profile(
        &self,
        username: &str,
        min_similarity: Option<f64>,
    ) -> AppResult<RankedResult> {
        let Some(saved_recipe_ids) = self.repository.saved_recipe_ids(username).await? else {
            tracing::info!("Unknown user, no recommendations");
            return Ok(RankedResult::empty());
        };

        self.recommend(
            SimilarityQuery::ByUserProfile { saved_recipe_ids },
            RecommendOptions {
                top_n: None,
                min_similarity,
            },
        )
        .await
    }

    /// Recipes sharing ingredients with free-text ingredient lines
    #[tracing::instrument(skip(self, ingredient_texts), fields(count = ingredient_texts.len()))]
    pub async fn similar_to_ingredients(
        &self,
        ingredient_texts: &[String],
    ) -> AppResult<RankedResult> {
        let text = ingredient_texts
            .iter()
            .map(|line| normalizer::normalize_ingredient(line))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        self.recommend(
            SimilarityQuery::ByIngredientText { text },
            RecommendOptions::default(),
        )
        .await
    }

    /// Runs any query against a freshly loaded catalog
    ///
    /// `top_n` only applies to recipe queries; `min_similarity` does not
    /// apply to ingredient queries, which keep every positive match.
    pub async fn recommend(
        &self,
        query: SimilarityQuery,
        options: RecommendOptions,
    ) -> AppResult<RankedResult> {
        let start = Instant::now();
        let min_similarity = options
            .min_similarity
            .unwrap_or(self.settings.min_similarity);
        let top_n = options.top_n.unwrap_or(self.settings.top_n);

        // 1. Load and normalize the catalog
        let catalog = Corpus::catalog(self.repository.as_ref()).await?;
        if catalog.is_empty() {
            tracing::info!(repository = self.repository.name(), "Catalog is empty");
            return Ok(RankedResult::empty());
        }

        // 2. Vectorize and rank
        let result = match &query {
            SimilarityQuery::ByRecipe { recipe_id } => {
                self.rank_by_recipe(&catalog, *recipe_id, min_similarity, top_n)
                    .await?
            }
            SimilarityQuery::ByUserProfile { saved_recipe_ids } => {
                rank_by_profile(&catalog, saved_recipe_ids, min_similarity)
            }
            SimilarityQuery::ByIngredientText { text } => rank_by_ingredients(&catalog, text),
        };

        tracing::info!(
            catalog = catalog.len(),
            results = result.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendations computed"
        );

        Ok(result)
    }

    async fn rank_by_recipe(
        &self,
        catalog: &Corpus,
        recipe_id: RecipeId,
        min_similarity: f64,
        top_n: usize,
    ) -> AppResult<RankedResult> {
        let base = match catalog.get(recipe_id) {
            Some(record) => record.clone(),
            None => {
                let single = Corpus::single(self.repository.as_ref(), recipe_id).await?;
                match single.records().first() {
                    Some(record) => record.clone(),
                    None => {
                        tracing::info!(recipe_id, "Recipe not found, no recommendations");
                        return Ok(RankedResult::empty());
                    }
                }
            }
        };

        let mut texts = catalog.texts(TextView::Recipe);
        let query = TextView::Recipe.combine(&base);
        texts.push(query.clone());

        let space = TfidfVectorizer::new().fit(&texts);
        let vectors = space.transform_all(&texts[..catalog.len()]);
        let base_vector = space.transform(&query);

        Ok(ranker::rank_by_recipe(
            &base,
            &base_vector,
            catalog.records(),
            &vectors,
            min_similarity,
            top_n,
        ))
    }
}

fn rank_by_profile(
    catalog: &Corpus,
    saved_recipe_ids: &[RecipeId],
    min_similarity: f64,
) -> RankedResult {
    let saved = catalog.subset(saved_recipe_ids);
    if saved.is_empty() {
        tracing::info!("No saved recipes in catalog, no recommendations");
        return RankedResult::empty();
    }

    let catalog_texts = catalog.texts(TextView::Profile);
    let saved_texts = saved.texts(TextView::Profile);
    let documents: Vec<&String> = catalog_texts.iter().chain(&saved_texts).collect();

    let space = TfidfVectorizer::new()
        .with_english_stop_words()
        .fit(&documents);

    ranker::rank_by_profile(
        saved.records(),
        &space.transform_all(&saved_texts),
        catalog.records(),
        &space.transform_all(&catalog_texts),
        min_similarity,
    )
}

fn rank_by_ingredients(catalog: &Corpus, text: &str) -> RankedResult {
    if text.trim().is_empty() {
        return RankedResult::empty();
    }

    let mut texts = catalog.texts(TextView::Ingredients);
    texts.push(text.to_string());

    let space = TfidfVectorizer::new().fit(&texts);
    let query = space.transform(text);
    if query.is_zero() {
        return RankedResult::empty();
    }

    ranker::rank_by_ingredients(
        &query,
        catalog.records(),
        &space.transform_all(&texts[..catalog.len()]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockRecipeRepository;
    use crate::error::AppError;
    use crate::models::{RawNutrition, RawRecipeRecord};
    use tokio_test::assert_ok;

    fn raw(id: RecipeId, ingredients: &[&str], cuisine: &str, minutes: &str) -> RawRecipeRecord {
        RawRecipeRecord {
            id,
            title: format!("Recipe {id}"),
            description: "A home cooked meal".to_string(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            total_time: minutes.to_string(),
            difficulty_level: "Easy".to_string(),
            cuisine: Some(cuisine.to_string()),
            courses: vec!["Main".to_string()],
            dietary_restrictions: Vec::new(),
            instructions: vec!["Cook everything together.".to_string()],
            equipment: vec!["Pan".to_string()],
            nutrition: RawNutrition {
                calories: "450 kcal".to_string(),
                protein: "25g".to_string(),
                carbs: "40g".to_string(),
                fat: "12g".to_string(),
            },
        }
    }

    fn catalog() -> Vec<RawRecipeRecord> {
        vec![
            raw(1, &["Chicken breasts", "Garlic cloves", "Lemons"], "Greek", "30 minutes"),
            raw(2, &["Chicken thighs", "Garlic cloves", "Lemons"], "Greek", "45 minutes"),
            raw(3, &["Chicken breasts", "Garlic cloves", "Rosemary"], "Italian", "35 minutes"),
            raw(4, &["Dark chocolate", "Sugar", "Butter"], "French", "1 hour"),
            raw(5, &["Tofu", "Soy sauce", "Ginger"], "Japanese", "20 minutes"),
        ]
    }

    fn service(repo: MockRecipeRepository) -> RecommendationService {
        RecommendationService::new(Arc::new(repo), RecommendationSettings::default())
    }

    fn catalog_repo() -> MockRecipeRepository {
        let mut repo = MockRecipeRepository::new();
        repo.expect_fetch_all().returning(|| Ok(catalog()));
        repo.expect_name().return_const("mock");
        repo
    }

    #[tokio::test]
    async fn test_similar_to_recipe_excludes_itself() {
        let service = service(catalog_repo());
        let result = assert_ok!(service.similar_to_recipe(1, None, None).await);

        assert!(!result.is_empty());
        assert!(!result.recipe_ids().contains(&1));
        assert!(result.len() <= 5);
        let scores: Vec<f64> = result.iter().map(|s| s.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(result.iter().all(|s| s.similarity >= 0.3));
    }

    #[tokio::test]
    async fn test_similar_to_recipe_top_n_override() {
        let service = service(catalog_repo());
        let result = service.similar_to_recipe(1, Some(1), Some(0.0)).await.unwrap();
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_similar_to_unknown_recipe_is_empty() {
        let mut repo = catalog_repo();
        repo.expect_fetch_recipe().returning(|_| Ok(None));

        let result = service(repo).similar_to_recipe(42, None, None).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog_is_empty() {
        let mut repo = MockRecipeRepository::new();
        repo.expect_fetch_all().returning(|| Ok(Vec::new()));
        repo.expect_name().return_const("mock");

        let result = service(repo).similar_to_recipe(1, None, None).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_catalog_propagates() {
        let mut repo = MockRecipeRepository::new();
        repo.expect_fetch_all()
            .returning(|| Ok(vec![raw(1, &["Rice"], "Thai", "a while")]));

        let err = service(repo)
            .similar_to_recipe(1, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Normalization(_)));
    }

    #[tokio::test]
    async fn test_user_profile_excludes_saved() {
        let mut repo = catalog_repo();
        repo.expect_saved_recipe_ids()
            .returning(|username| Ok((username == "alice").then(|| vec![1])));

        let result = service(repo)
            .similar_to_user_profile("alice", None)
            .await
            .unwrap();

        let ids = result.recipe_ids();
        assert!(!ids.contains(&1));
        assert!(ids.contains(&2));
        assert!(!ids.contains(&5));
        assert!(result.iter().all(|s| s.similarity >= 0.3 && s.similarity <= 1.0));
    }

    #[tokio::test]
    async fn test_unknown_user_is_empty() {
        let mut repo = MockRecipeRepository::new();
        repo.expect_saved_recipe_ids().returning(|_| Ok(None));

        let result = service(repo)
            .similar_to_user_profile("nobody", None)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_user_without_saved_recipes_is_empty() {
        let mut repo = catalog_repo();
        repo.expect_saved_recipe_ids().returning(|_| Ok(Some(Vec::new())));

        let result = service(repo)
            .similar_to_user_profile("bob", None)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_similar_to_ingredients() {
        let service = service(catalog_repo());
        let result = service
            .similar_to_ingredients(&["Chicken breast".to_string()])
            .await
            .unwrap();

        let ids = result.recipe_ids();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&4));
        assert!(!ids.contains(&5));
        assert!(result.iter().all(|s| s.similarity > 0.0));
    }

    #[tokio::test]
    async fn test_similar_to_blank_ingredients_is_empty() {
        let service = service(catalog_repo());
        let result = service
            .similar_to_ingredients(&["  ".to_string(), "(optional)".to_string()])
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_dispatches_profile_query() {
        let service = service(catalog_repo());
        let result = service
            .recommend(
                SimilarityQuery::ByUserProfile {
                    saved_recipe_ids: vec![4],
                },
                RecommendOptions::default(),
            )
            .await
            .unwrap();
        assert!(!result.recipe_ids().contains(&4));
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config::from_vars([
            ("MIN_SIMILARITY".to_string(), "0.5".to_string()),
            ("TOP_N".to_string(), "10".to_string()),
        ])
        .unwrap();
        let settings = RecommendationSettings::from(&config);
        assert_eq!(settings.min_similarity, 0.5);
        assert_eq!(settings.top_n, 10);
    }
}
