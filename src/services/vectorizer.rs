/// TF-IDF vectorization of recipe text
///
/// A [`TfidfVectorizer`] is configured once and fitted per request into a
/// [`VectorSpace`]; nothing is cached between fits. Weighting follows the
/// usual smoothed form:
///
/// ```text
/// idf(t)   = ln((1 + n) / (1 + df(t))) + 1
/// w(t, d)  = count(t, d) * idf(t)          then L2-normalized per document
/// ```
///
/// Tokens are lowercase runs of at least two word characters.
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use super::stop_words::is_english_stop_word;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Sparse vector with entries sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_map(map: BTreeMap<usize, f64>) -> Self {
        Self {
            entries: map.into_iter().filter(|(_, w)| *w != 0.0).collect(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Element-wise mean of several vectors, without re-normalizing
    pub fn mean(vectors: &[SparseVector]) -> SparseVector {
        if vectors.is_empty() {
            return SparseVector::default();
        }
        let mut sums: BTreeMap<usize, f64> = BTreeMap::new();
        for vector in vectors {
            for &(index, weight) in &vector.entries {
                *sums.entry(index).or_insert(0.0) += weight;
            }
        }
        let count = vectors.len() as f64;
        for weight in sums.values_mut() {
            *weight /= count;
        }
        SparseVector::from_map(sums)
    }
}

/// Vectorizer settings
#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfVectorizer {
    remove_english_stop_words: bool,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop English stop words before counting terms
    pub fn with_english_stop_words(mut self) -> Self {
        self.remove_english_stop_words = true;
        self
    }

    /// Learns the vocabulary and document frequencies of `documents`
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> VectorSpace {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();

        for doc in documents {
            let mut seen: Vec<usize> = Vec::new();
            for token in self.tokenize(doc.as_ref()) {
                let next_index = vocabulary.len();
                let index = *vocabulary.entry(token).or_insert(next_index);
                if index == doc_freq.len() {
                    doc_freq.push(0);
                }
                if !seen.contains(&index) {
                    seen.push(index);
                    doc_freq[index] += 1;
                }
            }
        }

        let n = documents.len() as f64;
        let idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        VectorSpace {
            settings: *self,
            vocabulary,
            idf,
        }
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !(self.remove_english_stop_words && is_english_stop_word(token)))
            .map(str::to_owned)
            .collect()
    }
}

/// A fitted TF-IDF vocabulary
#[derive(Debug, Clone)]
pub struct VectorSpace {
    settings: TfidfVectorizer,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl VectorSpace {
    #[cfg(test)]
    fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    #[cfg(test)]
    fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Projects one document into the space; unknown terms are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in self.settings.tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        for (index, weight) in counts.iter_mut() {
            *weight *= self.idf[*index];
        }

        let norm = counts.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in counts.values_mut() {
                *weight /= norm;
            }
        }

        SparseVector::from_map(counts)
    }

    pub fn transform_all<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents.iter().map(|d| self.transform(d.as_ref())).collect()
    }
}
