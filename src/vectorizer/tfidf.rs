use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{utils::math::vector::ZeroSpVec, vectorizer::{corpus::Corpus, token::TokenFrequency}};

/// A term weighting strategy.
/// `idf_vec` runs once at fit time, `tf_vec` once per document.
pub trait WeightingEngine {
    /// Build the per-term IDF vector
    /// # Arguments
    /// * `corpus` - document frequencies of the fitted documents
    /// * `term_dim_sample` - term dimensions, column order
    /// # Returns
    /// * `Vec<f64>` - one weight per column
    fn idf_vec(corpus: &Corpus, term_dim_sample: &IndexSet<String>) -> Vec<f64>;

    /// Build the weighted vector of one document
    /// # Arguments
    /// * `freq` - token counts of the document
    /// * `term_dim_sample` - term dimensions, column order
    /// * `idf` - IDF vector from `idf_vec`
    /// * `sublinear_tf` - use `1 + ln(tf)` instead of raw counts
    fn tf_vec(freq: &TokenFrequency, term_dim_sample: &IndexSet<String>, idf: &[f64], sublinear_tf: bool) -> ZeroSpVec<f64>;
}

/// Raw term counts, no IDF and no normalization
#[derive(Debug)]
pub struct CountEngine;

impl WeightingEngine for CountEngine {
    fn idf_vec(_corpus: &Corpus, term_dim_sample: &IndexSet<String>) -> Vec<f64> {
        vec![1.0; term_dim_sample.len()]
    }

    fn tf_vec(freq: &TokenFrequency, term_dim_sample: &IndexSet<String>, _idf: &[f64], _sublinear_tf: bool) -> ZeroSpVec<f64> {
        ZeroSpVec::from_raw_iter(
            term_dim_sample.len(),
            freq.iter().filter_map(|(token, count)| {
                term_dim_sample.get_index_of(token).map(|col| (col, count as f64))
            }),
        )
    }
}

/// Smoothed TF-IDF with L2-normalized rows
/// idf(t) = ln((1 + n) / (1 + df(t))) + 1
#[derive(Debug)]
pub struct TfIdfEngine;

impl TfIdfEngine {
    #[inline]
    fn tf_calc(count: u32, sublinear_tf: bool) -> f64 {
        if sublinear_tf {
            1.0 + (count as f64).ln()
        } else {
            count as f64
        }
    }
}

impl WeightingEngine for TfIdfEngine {
    fn idf_vec(corpus: &Corpus, term_dim_sample: &IndexSet<String>) -> Vec<f64> {
        let doc_num = corpus.get_doc_num() as f64;
        term_dim_sample
            .iter()
            .map(|term| {
                let doc_freq = corpus.get_term_count(term) as f64;
                ((1.0 + doc_num) / (1.0 + doc_freq)).ln() + 1.0
            })
            .collect()
    }

    fn tf_vec(freq: &TokenFrequency, term_dim_sample: &IndexSet<String>, idf: &[f64], sublinear_tf: bool) -> ZeroSpVec<f64> {
        let mut vec = ZeroSpVec::from_raw_iter(
            term_dim_sample.len(),
            freq.iter().filter_map(|(token, count)| {
                term_dim_sample
                    .get_index_of(token)
                    .map(|col| (col, Self::tf_calc(count, sublinear_tf) * idf[col]))
            }),
        );
        let norm = vec.raw_iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            vec.map_values(|v| v / norm);
        }
        vec
    }
}

/// Weighting scheme chosen at fit time and persisted with the vectorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    Count,
    TfIdf { sublinear_tf: bool },
}

impl Weighting {
    pub fn from_params(tfidf: bool, sublinear_tf: bool) -> Self {
        if tfidf {
            Weighting::TfIdf { sublinear_tf }
        } else {
            Weighting::Count
        }
    }

    pub fn idf_vec(&self, corpus: &Corpus, term_dim_sample: &IndexSet<String>) -> Vec<f64> {
        match self {
            Weighting::Count => CountEngine::idf_vec(corpus, term_dim_sample),
            Weighting::TfIdf { .. } => TfIdfEngine::idf_vec(corpus, term_dim_sample),
        }
    }

    pub fn tf_vec(&self, freq: &TokenFrequency, term_dim_sample: &IndexSet<String>, idf: &[f64]) -> ZeroSpVec<f64> {
        match *self {
            Weighting::Count => CountEngine::tf_vec(freq, term_dim_sample, idf, false),
            Weighting::TfIdf { sublinear_tf } => TfIdfEngine::tf_vec(freq, term_dim_sample, idf, sublinear_tf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(terms: &[&str]) -> IndexSet<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn smoothed_idf_matches_formula() {
        let mut corpus = Corpus::new();
        corpus.add_set(&["paris", "france"]);
        corpus.add_set(&["paris", "texas"]);
        let idf = TfIdfEngine::idf_vec(&corpus, &dims(&["france", "paris", "texas"]));
        assert!((idf[0] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
        assert!((idf[1] - 1.0).abs() < 1e-12);
        assert!((idf[2] - idf[0]).abs() < 1e-12);
    }

    #[test]
    fn tfidf_rows_are_unit_length() {
        let terms = dims(&["france", "paris", "texas"]);
        let idf = vec![1.5, 1.0, 1.5];
        let freq = TokenFrequency::from_text("paris paris france");
        let vec = TfIdfEngine::tf_vec(&freq, &terms, &idf, false);
        let norm: f64 = vec.raw_iter().map(|(_, v)| v * v).sum();
        assert!((norm - 1.0).abs() < 1e-12);
        // paris: 2 * 1.0, france: 1 * 1.5
        assert!((vec[1] / vec[0] - 2.0 / 1.5).abs() < 1e-12);
        assert_eq!(vec[2], 0.0);
    }

    #[test]
    fn count_engine_ignores_unknown_terms() {
        let terms = dims(&["paris", "texas"]);
        let freq = TokenFrequency::from_text("paris london paris");
        let vec = CountEngine::tf_vec(&freq, &terms, &[1.0, 1.0], false);
        assert_eq!(vec[0], 2.0);
        assert_eq!(vec.nnz(), 1);
    }

    #[test]
    fn sublinear_tf_dampens_repeats() {
        assert_eq!(TfIdfEngine::tf_calc(1, true), 1.0);
        assert!((TfIdfEngine::tf_calc(3, true) - (1.0 + 3f64.ln())).abs() < 1e-12);
        assert_eq!(TfIdfEngine::tf_calc(3, false), 3.0);
    }
}
