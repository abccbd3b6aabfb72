use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{NormalizedRecipeRecord, RankedResult, RecipeId, ScoredRecipe};

use super::vectorizer::SparseVector;

/// Weight of text similarity in the blended recipe score
pub const SIMILARITY_WEIGHT: f64 = 0.7;
/// Weight of each numeric proximity term (time, calories, protein, carbs, fat)
pub const FEATURE_WEIGHT: f64 = 0.1;

/// Cosine similarity clamped to [0, 1]; zero vectors score 0
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denominator = a.norm() * b.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denominator).clamp(0.0, 1.0)
}

/// Per-column min-max scaling fitted on a set of points
///
/// A column with no spread is shifted by its minimum but not stretched.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler<const N: usize> {
    min: [f64; N],
    range: [f64; N],
}

impl<const N: usize> MinMaxScaler<N> {
    pub fn fit(points: &[[f64; N]]) -> Self {
        let mut min = [f64::INFINITY; N];
        let mut max = [f64::NEG_INFINITY; N];
        for point in points {
            for column in 0..N {
                min[column] = min[column].min(point[column]);
                max[column] = max[column].max(point[column]);
            }
        }

        let mut range = [1.0; N];
        for column in 0..N {
            if points.is_empty() {
                min[column] = 0.0;
                continue;
            }
            let spread = max[column] - min[column];
            if spread > 0.0 {
                range[column] = spread;
            }
        }

        Self { min, range }
    }

    pub fn transform(&self, point: &[f64; N]) -> [f64; N] {
        let mut scaled = [0.0; N];
        for column in 0..N {
            scaled[column] = (point[column] - self.min[column]) / self.range[column];
        }
        scaled
    }
}

/// Ranks recipes similar to `base`, blending text similarity with numeric proximity
///
/// The base recipe is excluded first, then candidates under `min_similarity`
/// are dropped. Numeric features are scaled over the surviving candidates and
/// the base point is projected with the same scaler. The weights add up to
/// 1.2 (0.7 + 5 x 0.1), so scores are not confined to [0, 1].
pub fn rank_by_recipe(
    base: &NormalizedRecipeRecord,
    base_vector: &SparseVector,
    corpus: &[NormalizedRecipeRecord],
    corpus_vectors: &[SparseVector],
    min_similarity: f64,
    top_n: usize,
) -> RankedResult {
    let candidates: Vec<(&NormalizedRecipeRecord, f64)> = corpus
        .iter()
        .zip(corpus_vectors)
        .filter(|(record, _)| record.id != base.id)
        .map(|(record, vector)| (record, cosine_similarity(base_vector, vector)))
        .filter(|(_, similarity)| *similarity >= min_similarity)
        .collect();

    if candidates.is_empty() {
        return RankedResult::empty();
    }

    let features: Vec<[f64; 5]> = candidates
        .iter()
        .map(|(record, _)| record.numeric_features())
        .collect();
    let scaler = MinMaxScaler::fit(&features);
    let base_scaled = scaler.transform(&base.numeric_features());

    let mut scored: Vec<ScoredRecipe> = candidates
        .iter()
        .zip(&features)
        .map(|((record, similarity), point)| {
            let scaled = scaler.transform(point);
            let proximity: f64 = scaled
                .iter()
                .zip(&base_scaled)
                .map(|(value, base_value)| FEATURE_WEIGHT * (1.0 - (value - base_value).abs()))
                .sum();
            ScoredRecipe {
                recipe_id: record.id,
                similarity: *similarity,
                score: SIMILARITY_WEIGHT * similarity + proximity,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(top_n);

    RankedResult::from_sorted(scored)
}

/// Ranks unsaved recipes against the mean vector of a user's saved recipes
///
/// Ties on similarity go to the recipe closest to the user's average
/// difficulty, then closest to their average total time.
pub fn rank_by_profile(
    saved: &[NormalizedRecipeRecord],
    saved_vectors: &[SparseVector],
    corpus: &[NormalizedRecipeRecord],
    corpus_vectors: &[SparseVector],
    min_similarity: f64,
) -> RankedResult {
    if saved.is_empty() {
        return RankedResult::empty();
    }

    let profile = SparseVector::mean(saved_vectors);
    let saved_ids: HashSet<RecipeId> = saved.iter().map(|r| r.id).collect();

    let count = saved.len() as f64;
    let avg_minutes = saved.iter().map(|r| f64::from(r.total_minutes)).sum::<f64>() / count;
    let avg_difficulty = saved.iter().map(|r| f64::from(r.difficulty)).sum::<f64>() / count;

    struct Candidate {
        recipe_id: RecipeId,
        similarity: f64,
        difficulty_distance: f64,
        time_distance: f64,
    }

    let mut candidates: Vec<Candidate> = corpus
        .iter()
        .zip(corpus_vectors)
        .filter(|(record, _)| !saved_ids.contains(&record.id))
        .map(|(record, vector)| Candidate {
            recipe_id: record.id,
            similarity: cosine_similarity(vector, &profile),
            difficulty_distance: (f64::from(record.difficulty) - avg_difficulty).abs(),
            time_distance: (f64::from(record.total_minutes) - avg_minutes).abs(),
        })
        .filter(|c| c.similarity >= min_similarity)
        .collect();

    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.difficulty_distance
                    .partial_cmp(&b.difficulty_distance)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| {
                a.time_distance
                    .partial_cmp(&b.time_distance)
                    .unwrap_or(Ordering::Equal)
            })
    });

    RankedResult::from_sorted(
        candidates
            .into_iter()
            .map(|c| ScoredRecipe {
                recipe_id: c.recipe_id,
                similarity: c.similarity,
                score: c.similarity,
            })
            .collect(),
    )
}

/// Ranks recipes by ingredient overlap with a query; zero-similarity recipes are dropped
pub fn rank_by_ingredients(
    query: &SparseVector,
    corpus: &[NormalizedRecipeRecord],
    corpus_vectors: &[SparseVector],
) -> RankedResult {
    let mut scored: Vec<ScoredRecipe> = corpus
        .iter()
        .zip(corpus_vectors)
        .map(|(record, vector)| {
            let similarity = cosine_similarity(query, vector);
            ScoredRecipe {
                recipe_id: record.id,
                similarity,
                score: similarity,
            }
        })
        .filter(|s| s.similarity > 0.0)
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });

    RankedResult::from_sorted(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Nutrition;
    use crate::services::vectorizer::TfidfVectorizer;

    const EPS: f64 = 1e-9;

    fn record(
        id: RecipeId,
        ingredients: &str,
        minutes: u32,
        difficulty: u8,
        calories: u32,
    ) -> NormalizedRecipeRecord {
        NormalizedRecipeRecord {
            id,
            description: String::new(),
            ingredients: ingredients.to_string(),
            total_minutes: minutes,
            difficulty,
            cuisine: String::new(),
            course: String::new(),
            dietary_restrictions: String::new(),
            instructions: String::new(),
            equipment: String::new(),
            nutrition: Nutrition {
                calories,
                protein: 10,
                carbs: 20,
                fat: 5,
            },
        }
    }

    fn catalog() -> Vec<NormalizedRecipeRecord> {
        vec![
            record(1, "chicken breast garlic lemon", 30, 1, 400),
            record(2, "chicken thigh garlic lemon", 45, 2, 500),
            record(3, "chicken breast garlic rosemary", 35, 1, 420),
            record(4, "chocolate sugar butter flour", 60, 2, 700),
            record(5, "chicken breast garlic lemon", 30, 1, 410),
        ]
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        let space = TfidfVectorizer::new().fit(&["apple pear", "kiwi mango"]);
        let a = space.transform("apple pear");
        let b = space.transform("kiwi mango");
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < EPS);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&a, &SparseVector::default()), 0.0);
    }

    #[test]
    fn test_min_max_scaler() {
        let scaler = MinMaxScaler::fit(&[[0.0, 5.0], [10.0, 5.0]]);
        assert_eq!(scaler.transform(&[5.0, 5.0]), [0.5, 0.0]);
        // Constant column only shifts
        assert_eq!(scaler.transform(&[5.0, 7.0]), [0.5, 2.0]);
        // Points outside the fitted range are not clipped
        assert_eq!(scaler.transform(&[20.0, 5.0]), [2.0, 0.0]);
    }

    #[test]
    fn test_rank_by_recipe_excludes_base_and_is_sorted() {
        let corpus = catalog();
        let mut texts: Vec<String> = corpus.iter().map(|r| r.ingredients.clone()).collect();
        texts.push(corpus[0].ingredients.clone());
        let space = TfidfVectorizer::new().fit(&texts);
        let corpus_vectors = space.transform_all(&texts[..corpus.len()]);
        let base_vector = space.transform(&corpus[0].ingredients);

        let result = rank_by_recipe(&corpus[0], &base_vector, &corpus, &corpus_vectors, 0.3, 5);

        assert!(!result.recipe_ids().contains(&1));
        assert!(!result.recipe_ids().contains(&4));
        assert_eq!(result.recipe_ids()[0], 5);
        let scores: Vec<f64> = result.iter().map(|s| s.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(result.iter().all(|s| s.similarity >= 0.3 && s.similarity <= 1.0));
    }

    #[test]
    fn test_rank_by_recipe_respects_top_n() {
        let corpus = catalog();
        let texts: Vec<String> = corpus.iter().map(|r| r.ingredients.clone()).collect();
        let space = TfidfVectorizer::new().fit(&texts);
        let corpus_vectors = space.transform_all(&texts);
        let base_vector = space.transform(&corpus[0].ingredients);

        let result = rank_by_recipe(&corpus[0], &base_vector, &corpus, &corpus_vectors, 0.0, 2);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_rank_by_recipe_blend_arithmetic() {
        // Identical candidate: similarity 1 and zero distance on every feature
        let base = record(1, "rice bean", 30, 1, 400);
        let twin = record(2, "rice bean", 30, 1, 400);
        let corpus = vec![base.clone(), twin];
        let texts: Vec<String> = corpus.iter().map(|r| r.ingredients.clone()).collect();
        let space = TfidfVectorizer::new().fit(&texts);
        let corpus_vectors = space.transform_all(&texts);
        let base_vector = space.transform(&base.ingredients);

        let result = rank_by_recipe(&base, &base_vector, &corpus, &corpus_vectors, 0.3, 5);
        let top = result.iter().next().unwrap();
        assert_eq!(top.recipe_id, 2);
        assert!((top.score - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_rank_by_recipe_nothing_above_threshold() {
        let corpus = catalog();
        let texts: Vec<String> = corpus.iter().map(|r| r.ingredients.clone()).collect();
        let space = TfidfVectorizer::new().fit(&texts);
        let corpus_vectors = space.transform_all(&texts);
        let base_vector = space.transform(&corpus[3].ingredients);

        let result = rank_by_recipe(&corpus[3], &base_vector, &corpus, &corpus_vectors, 0.3, 5);
        assert!(result.is_empty());
    }

    #[test]
    fn test_rank_by_profile_excludes_saved() {
        let corpus = catalog();
        let saved = vec![corpus[0].clone(), corpus[1].clone()];
        let texts: Vec<String> = corpus.iter().map(|r| r.ingredients.clone()).collect();
        let saved_texts: Vec<String> = saved.iter().map(|r| r.ingredients.clone()).collect();
        let all: Vec<String> = texts.iter().chain(&saved_texts).cloned().collect();
        let space = TfidfVectorizer::new().with_english_stop_words().fit(&all);

        let result = rank_by_profile(
            &saved,
            &space.transform_all(&saved_texts),
            &corpus,
            &space.transform_all(&texts),
            0.3,
        );

        let ids = result.recipe_ids();
        assert!(!ids.contains(&1));
        assert!(!ids.contains(&2));
        assert!(!ids.contains(&4));
        assert_eq!(ids[0], 5);
        assert!(result.iter().all(|s| s.similarity >= 0.3));
    }

    #[test]
    fn test_rank_by_profile_tie_breaks_on_difficulty_then_time() {
        let saved = vec![record(1, "tofu rice", 20, 1, 300)];
        let corpus = vec![
            saved[0].clone(),
            record(2, "tofu rice", 90, 1, 300),
            record(3, "tofu rice", 20, 3, 300),
            record(4, "tofu rice", 25, 1, 300),
        ];
        let texts: Vec<String> = corpus.iter().map(|r| r.ingredients.clone()).collect();
        let space = TfidfVectorizer::new().fit(&texts);
        let vectors = space.transform_all(&texts);

        let result = rank_by_profile(&saved, &vectors[..1], &corpus, &vectors, 0.3);
        assert_eq!(result.recipe_ids(), vec![4, 2, 3]);
    }

    #[test]
    fn test_rank_by_profile_without_saved_recipes() {
        let corpus = catalog();
        let result = rank_by_profile(&[], &[], &corpus, &[], 0.3);
        assert!(result.is_empty());
    }

    #[test]
    fn test_rank_by_ingredients_drops_zero_overlap() {
        let corpus = catalog();
        let mut texts: Vec<String> = corpus.iter().map(|r| r.ingredients.clone()).collect();
        texts.push("chicken breast".to_string());
        let space = TfidfVectorizer::new().fit(&texts);
        let query = space.transform("chicken breast");

        let result = rank_by_ingredients(&query, &corpus, &space.transform_all(&texts[..corpus.len()]));
        let ids = result.recipe_ids();
        assert!(!ids.contains(&4));
        assert_eq!(ids.len(), 4);
        let sims: Vec<f64> = result.iter().map(|s| s.similarity).collect();
        assert!(sims.windows(2).all(|w| w[0] >= w[1]));
        assert!(sims.iter().all(|s| *s > 0.0 && *s <= 1.0));
    }
}
