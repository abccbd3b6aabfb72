//! Feature normalization for raw recipe records.
//!
//! Every function here is pure: the same input always yields the same output.
//! Time and nutrition values without a usable number fail with [`ParseError`];
//! difficulty is the only field that falls back to a default.
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::inflection::singularize;
use crate::models::{NormalizedRecipeRecord, Nutrition, RawNutrition, RawRecipeRecord};

/// Errors raised while coercing free-text recipe fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no number found in {field}: {value:?}")]
    MissingDigits { field: &'static str, value: String },
    #[error("number out of range in {field}: {value:?}")]
    OutOfRange { field: &'static str, value: String },
}

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("parenthetical pattern is valid"));
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9]+").expect("word pattern is valid"));

/// Normalizes a raw recipe into the view used by the recommender
pub fn normalize(raw: &RawRecipeRecord) -> Result<NormalizedRecipeRecord, ParseError> {
    Ok(NormalizedRecipeRecord {
        id: raw.id,
        description: alphanumeric_text([raw.description.as_str()]),
        ingredients: normalize_ingredients(&raw.ingredients),
        total_minutes: parse_minutes(&raw.total_time)?,
        difficulty: difficulty_level(&raw.difficulty_level),
        cuisine: raw.cuisine.as_deref().unwrap_or_default().trim().to_lowercase(),
        course: lowercase_join(&raw.courses),
        dietary_restrictions: lowercase_join(&raw.dietary_restrictions),
        instructions: alphanumeric_text(raw.instructions.iter().map(String::as_str)),
        equipment: alphanumeric_text(raw.equipment.iter().map(String::as_str)),
        nutrition: parse_nutrition(&raw.nutrition)?,
    })
}

/// Normalizes every ingredient line and joins them into one string
pub fn normalize_ingredients(ingredients: &[String]) -> String {
    ingredients
        .iter()
        .map(|line| normalize_ingredient(line))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes one ingredient line
///
/// Parenthetical notes are dropped, the remainder is split on commas, and the
/// head noun (last word) of each segment is singularized:
/// `"Tomatoes, chopped (fresh)"` becomes `"tomato chopped"`.
pub fn normalize_ingredient(line: &str) -> String {
    PARENTHETICAL
        .replace_all(line, " ")
        .split(',')
        .map(|segment| segment.trim().to_lowercase())
        .filter(|segment| !segment.is_empty())
        .map(|segment| singularize_head(&segment))
        .collect::<Vec<_>>()
        .join(" ")
}

fn singularize_head(segment: &str) -> String {
    let mut words: Vec<&str> = segment.split_whitespace().collect();
    let Some(head) = words.pop() else {
        return String::new();
    };
    let singular = singularize(head);
    words.push(&singular);
    words.join(" ")
}

/// Parses a duration such as "1 hour 30 minutes" into whole minutes
///
/// Without an "hour" keyword the first number is taken as minutes.
pub fn parse_minutes(value: &str) -> Result<u32, ParseError> {
    const FIELD: &str = "total_time";

    let lowered = value.to_lowercase();
    let runs = digit_runs(&lowered);
    let number_at = |index: usize| -> Result<u32, ParseError> {
        let run = runs.get(index).ok_or_else(|| ParseError::MissingDigits {
            field: FIELD,
            value: value.to_owned(),
        })?;
        run.parse::<u32>().map_err(|_| ParseError::OutOfRange {
            field: FIELD,
            value: value.to_owned(),
        })
    };

    let has_hours = lowered.contains("hour");
    let has_minutes = lowered.contains("minute");

    let minutes = match (has_hours, has_minutes) {
        (true, true) => number_at(0)?
            .checked_mul(60)
            .and_then(|hours| hours.checked_add(number_at(1).ok()?)),
        (true, false) => number_at(0)?.checked_mul(60),
        (false, _) => Some(number_at(0)?),
    };

    match minutes {
        Some(minutes) => Ok(minutes),
        // A "hour ... minute" string with a single number lands here as well
        None if has_hours && has_minutes && runs.len() < 2 => Err(ParseError::MissingDigits {
            field: FIELD,
            value: value.to_owned(),
        }),
        None => Err(ParseError::OutOfRange {
            field: FIELD,
            value: value.to_owned(),
        }),
    }
}

/// Encodes a difficulty label; anything other than "Medium" or "Hard" is 1
pub fn difficulty_level(label: &str) -> u8 {
    match label {
        "Medium" => 2,
        "Hard" => 3,
        _ => 1,
    }
}

/// Extracts the first integer from a free-text value ("250 kcal" -> 250)
pub fn parse_leading_integer(field: &'static str, value: &str) -> Result<u32, ParseError> {
    let runs = digit_runs(value);
    let first = runs.first().ok_or_else(|| ParseError::MissingDigits {
        field,
        value: value.to_owned(),
    })?;
    first.parse::<u32>().map_err(|_| ParseError::OutOfRange {
        field,
        value: value.to_owned(),
    })
}

fn parse_nutrition(raw: &RawNutrition) -> Result<Nutrition, ParseError> {
    Ok(Nutrition {
        calories: parse_leading_integer("calories", &raw.calories)?,
        protein: parse_leading_integer("protein", &raw.protein)?,
        carbs: parse_leading_integer("carbs", &raw.carbs)?,
        fat: parse_leading_integer("fat", &raw.fat)?,
    })
}

fn digit_runs(value: &str) -> Vec<&str> {
    DIGIT_RUN.find_iter(value).map(|m| m.as_str()).collect()
}

/// Keeps only alphanumeric tokens, lowercased and single-space separated
fn alphanumeric_text<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    let joined = pieces.into_iter().collect::<Vec<_>>().join(" ");
    WORD.find_iter(&joined)
        .map(|m| m.as_str().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn lowercase_join(values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
