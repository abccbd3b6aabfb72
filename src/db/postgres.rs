use std::collections::HashMap;

use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use super::RecipeRepository;
use crate::{
    error::AppResult,
    models::{RawNutrition, RawRecipeRecord, RecipeId},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const RECIPE_COLUMNS: &str = r#"
    SELECT r.id, r.title, r.description, r.total_time, r.difficulty_level,
           cu.name AS cuisine, co.name AS course,
           n.calories, n.protein, n.carbs, n.fat
    FROM api_recipe r
    LEFT JOIN api_cuisine cu ON cu.id = r.cuisine_id
    LEFT JOIN api_course co ON co.id = r.course_id
    LEFT JOIN api_nutritionalinformation n ON n.recipe_id = r.id
"#;

#[derive(Debug, FromRow)]
struct RecipeRow {
    id: i64,
    title: String,
    description: String,
    total_time: String,
    difficulty_level: String,
    cuisine: Option<String>,
    course: Option<String>,
    calories: Option<String>,
    protein: Option<String>,
    carbs: Option<String>,
    fat: Option<String>,
}

impl From<RecipeRow> for RawRecipeRecord {
    fn from(row: RecipeRow) -> Self {
        RawRecipeRecord {
            id: row.id,
            title: row.title,
            description: row.description,
            ingredients: Vec::new(),
            total_time: row.total_time,
            difficulty_level: row.difficulty_level,
            cuisine: row.cuisine,
            courses: row.course.into_iter().collect(),
            dietary_restrictions: Vec::new(),
            instructions: Vec::new(),
            equipment: Vec::new(),
            // A recipe without a nutrition row yields empty strings, which fail normalization
            nutrition: RawNutrition {
                calories: row.calories.unwrap_or_default(),
                protein: row.protein.unwrap_or_default(),
                carbs: row.carbs.unwrap_or_default(),
                fat: row.fat.unwrap_or_default(),
            },
        }
    }
}

/// Reads recipes from the recipe application's PostgreSQL tables
///
/// The schema is owned by the recipe application; this repository only
/// issues read queries against it.
#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: PgPool,
}

impl PgRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the one-to-many recipe children for a batch of recipes
    async fn attach_children(&self, recipes: &mut [RawRecipeRecord]) -> AppResult<()> {
        if recipes.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();

        let mut ingredients = self
            .grouped(
                "SELECT recipe_id, ingredient FROM api_ingredient WHERE recipe_id = ANY($1) ORDER BY id",
                &ids,
            )
            .await?;
        let mut instructions = self
            .grouped(
                "SELECT recipe_id, step FROM api_instruction WHERE recipe_id = ANY($1) ORDER BY id",
                &ids,
            )
            .await?;
        let mut equipment = self
            .grouped(
                "SELECT recipe_id, name FROM api_equipment WHERE recipe_id = ANY($1) ORDER BY id",
                &ids,
            )
            .await?;
        let mut dietary = self
            .grouped(
                r#"
                SELECT rd.recipe_id, d.name
                FROM api_recipe_dietary_restrictions rd
                JOIN api_dietaryrestriction d ON d.id = rd.dietaryrestriction_id
                WHERE rd.recipe_id = ANY($1)
                ORDER BY rd.id
                "#,
                &ids,
            )
            .await?;

        for recipe in recipes.iter_mut() {
            recipe.ingredients = ingredients.remove(&recipe.id).unwrap_or_default();
            recipe.instructions = instructions.remove(&recipe.id).unwrap_or_default();
            recipe.equipment = equipment.remove(&recipe.id).unwrap_or_default();
            recipe.dietary_restrictions = dietary.remove(&recipe.id).unwrap_or_default();
        }

        Ok(())
    }

    /// Runs a `(recipe_id, text)` query and groups the text values by recipe
    async fn grouped(&self, sql: &str, ids: &[i64]) -> AppResult<HashMap<i64, Vec<String>>> {
        let rows: Vec<(i64, Option<String>)> = sqlx::query_as(sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
        for (recipe_id, value) in rows {
            if let Some(value) = value {
                grouped.entry(recipe_id).or_default().push(value);
            }
        }
        Ok(grouped)
    }
}

#[async_trait::async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn fetch_all(&self) -> AppResult<Vec<RawRecipeRecord>> {
        let sql = format!("{RECIPE_COLUMNS} ORDER BY r.id");
        let rows: Vec<RecipeRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        let mut recipes: Vec<RawRecipeRecord> = rows.into_iter().map(Into::into).collect();
        self.attach_children(&mut recipes).await?;

        tracing::debug!(count = recipes.len(), "Loaded recipe catalog");
        Ok(recipes)
    }

    async fn fetch_recipe(&self, recipe_id: RecipeId) -> AppResult<Option<RawRecipeRecord>> {
        let sql = format!("{RECIPE_COLUMNS} WHERE r.id = $1");
        let row: Option<RecipeRow> = sqlx::query_as(&sql)
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            tracing::debug!(recipe_id, "Recipe not found");
            return Ok(None);
        };

        let mut recipes = vec![RawRecipeRecord::from(row)];
        self.attach_children(&mut recipes).await?;
        Ok(recipes.pop())
    }

    async fn saved_recipe_ids(&self, username: &str) -> AppResult<Option<Vec<RecipeId>>> {
        let user_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM api_customuser WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        let Some(user_id) = user_id else {
            tracing::debug!(username = %username, "User not found");
            return Ok(None);
        };

        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT recipe_id FROM api_savedrecipe WHERE user_id = $1 ORDER BY saved_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ids))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
