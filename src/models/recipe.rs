use serde::{Deserialize, Serialize};

/// Identifier of a recipe in the catalog
pub type RecipeId = i64;

/// Nutrition facts as stored by the recipe application (free text, e.g. "250 kcal")
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawNutrition {
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub protein: String,
    #[serde(default)]
    pub carbs: String,
    #[serde(default)]
    pub fat: String,
}

/// A recipe exactly as the repository supplies it, before any normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRecipeRecord {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Ingredient lines, possibly with notes ("Tomatoes, chopped (fresh)")
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Natural-language duration ("1 hour 30 minutes")
    pub total_time: String,
    /// "Easy", "Medium" or "Hard"
    #[serde(default)]
    pub difficulty_level: String,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub nutrition: RawNutrition,
}

/// Integer nutrition facts extracted from [`RawNutrition`]
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Nutrition {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

/// Derived, immutable view of a recipe used for vectorization and ranking
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NormalizedRecipeRecord {
    pub id: RecipeId,
    pub description: String,
    /// Singular, lowercase ingredient phrases joined by spaces
    pub ingredients: String,
    pub total_minutes: u32,
    /// 1 (easy) to 3 (hard)
    pub difficulty: u8,
    pub cuisine: String,
    pub course: String,
    pub dietary_restrictions: String,
    pub instructions: String,
    pub equipment: String,
    pub nutrition: Nutrition,
}

impl NormalizedRecipeRecord {
    /// Numeric features used by the blended ranking, in a fixed order:
    /// total time, calories, protein, carbs, fat
    pub fn numeric_features(&self) -> [f64; 5] {
        [
            f64::from(self.total_minutes),
            f64::from(self.nutrition.calories),
            f64::from(self.nutrition.protein),
            f64::from(self.nutrition.carbs),
            f64::from(self.nutrition.fat),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_recipe_deserializes_with_defaults() {
        let json = r#"{"id": 7, "title": "Toast", "total_time": "5 minutes"}"#;
        let raw: RawRecipeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id, 7);
        assert!(raw.ingredients.is_empty());
        assert_eq!(raw.cuisine, None);
        assert_eq!(raw.nutrition, RawNutrition::default());
    }

    #[test]
    fn test_numeric_features_order() {
        let record = NormalizedRecipeRecord {
            id: 1,
            description: String::new(),
            ingredients: String::new(),
            total_minutes: 30,
            difficulty: 1,
            cuisine: String::new(),
            course: String::new(),
            dietary_restrictions: String::new(),
            instructions: String::new(),
            equipment: String::new(),
            nutrition: Nutrition {
                calories: 400,
                protein: 20,
                carbs: 50,
                fat: 10,
            },
        };
        assert_eq!(record.numeric_features(), [30.0, 400.0, 20.0, 50.0, 10.0]);
    }
}
