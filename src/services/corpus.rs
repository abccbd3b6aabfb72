use std::collections::{HashMap, HashSet};

use crate::{
    db::RecipeRepository,
    error::AppResult,
    models::{NormalizedRecipeRecord, RawRecipeRecord, RecipeId},
    services::normalizer,
};

/// Normalized recipes in repository order, keyed by their originating id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    records: Vec<NormalizedRecipeRecord>,
    positions: HashMap<RecipeId, usize>,
}

impl Corpus {
    /// Normalizes raw records, keeping the first occurrence of each id
    pub fn from_raw(raw: &[RawRecipeRecord]) -> AppResult<Self> {
        let mut corpus = Corpus::default();
        for record in raw {
            if corpus.positions.contains_key(&record.id) {
                tracing::warn!(recipe_id = record.id, "Duplicate recipe id in catalog, skipping");
                continue;
            }
            let normalized = normalizer::normalize(record)?;
            corpus.positions.insert(normalized.id, corpus.records.len());
            corpus.records.push(normalized);
        }
        Ok(corpus)
    }

    /// The whole catalog
    pub async fn catalog(repository: &dyn RecipeRepository) -> AppResult<Self> {
        let raw = repository.fetch_all().await?;
        Self::from_raw(&raw)
    }

    /// A single recipe; empty when it does not exist
    pub async fn single(repository: &dyn RecipeRepository, recipe_id: RecipeId) -> AppResult<Self> {
        match repository.fetch_recipe(recipe_id).await? {
            Some(raw) => Self::from_raw(std::slice::from_ref(&raw)),
            None => Ok(Self::default()),
        }
    }

    /// The user's saved recipes, taken from an already built catalog
    ///
    /// Ids missing from the catalog are ignored.
    pub fn subset(&self, recipe_ids: &[RecipeId]) -> Self {
        let wanted: HashSet<RecipeId> = recipe_ids.iter().copied().collect();
        let records: Vec<NormalizedRecipeRecord> = self
            .records
            .iter()
            .filter(|r| wanted.contains(&r.id))
            .cloned()
            .collect();
        let positions = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();
        Self { records, positions }
    }

    pub fn records(&self) -> &[NormalizedRecipeRecord] {
        &self.records
    }

    pub fn get(&self, recipe_id: RecipeId) -> Option<&NormalizedRecipeRecord> {
        self.positions.get(&recipe_id).map(|&i| &self.records[i])
    }

    #[cfg(test)]
    fn contains(&self, recipe_id: RecipeId) -> bool {
        self.positions.contains_key(&recipe_id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    fn ids(&self) -> Vec<RecipeId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Combined text of every record under the given view
    pub fn texts(&self, view: TextView) -> Vec<String> {
        self.records.iter().map(|r| view.combine(r)).collect()
    }
}

/// Which normalized fields make up a recipe's combined text
///
/// Repeated fields weight their terms more heavily in TF-IDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextView {
    /// Everything, with ingredients and course counted twice
    Recipe,
    /// Ingredients and dietary restrictions twice, plus cuisine
    Profile,
    /// Ingredients only
    Ingredients,
}

impl TextView {
    pub fn combine(self, record: &NormalizedRecipeRecord) -> String {
        let parts: Vec<&str> = match self {
            TextView::Recipe => vec![
                record.description.as_str(),
                record.ingredients.as_str(),
                record.ingredients.as_str(),
                record.cuisine.as_str(),
                record.dietary_restrictions.as_str(),
                record.instructions.as_str(),
                record.equipment.as_str(),
                record.course.as_str(),
                record.course.as_str(),
            ],
            TextView::Profile => vec![
                record.ingredients.as_str(),
                record.ingredients.as_str(),
                record.dietary_restrictions.as_str(),
                record.dietary_restrictions.as_str(),
                record.cuisine.as_str(),
            ],
            TextView::Ingredients => vec![record.ingredients.as_str()],
        };
        parts.join(" ")
    }
}
