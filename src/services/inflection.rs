//! English noun singularization for ingredient head words.
//!
//! Rules are checked in order: uncountable words, irregular forms, then
//! suffix rules. Singular input comes back unchanged, so applying
//! [`singularize`] twice gives the same result as applying it once.

// =============================================================================
// Word tables
// =============================================================================

/// Words that are the same in singular and plural
const UNCOUNTABLE: &[&str] = &[
    "asparagus",
    "couscous",
    "deer",
    "fish",
    "grits",
    "hummus",
    "molasses",
    "rice",
    "series",
    "sheep",
    "species",
    "swiss",
];

/// Plurals that no suffix rule covers
const IRREGULAR: &[(&str, &str)] = &[
    ("calves", "calf"),
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("halves", "half"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("mice", "mouse"),
    ("scarves", "scarf"),
    ("shelves", "shelf"),
    ("teeth", "tooth"),
    ("wolves", "wolf"),
];

/// "-ies" plurals whose singular ends in "ie"
const IE_SINGULARS: &[&str] = &[
    "brownies",
    "calories",
    "cookies",
    "movies",
    "pies",
    "smoothies",
    "veggies",
];

// =============================================================================
// Public API
// =============================================================================

/// Returns the singular form of a lowercase English noun
pub fn singularize(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_owned();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return (*singular).to_owned();
    }
    if IE_SINGULARS.contains(&word) {
        return word[..word.len() - 1].to_owned();
    }

    // berries -> berry
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{stem}y");
        }
    }
    // tomatoes -> tomato
    if let Some(stem) = word.strip_suffix("oes") {
        return format!("{stem}o");
    }
    // glasses -> glass, peaches -> peach, radishes -> radish, boxes -> box
    for suffix in ["sses", "ches", "shes", "xes", "zzes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_owned();
        }
    }
    // hummus and glass stay as they are
    if word.ends_with("us") || word.ends_with("ss") || word.ends_with("is") {
        return word.to_owned();
    }
    // olives -> olive, eggs -> egg
    match word.strip_suffix('s') {
        Some(stem) if stem.len() > 1 => stem.to_owned(),
        _ => word.to_owned(),
    }
}
