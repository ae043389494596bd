pub mod compare;
pub mod corpus;
pub mod matrix;
pub mod tfidf;
pub mod token;

use indexmap::IndexSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{utils::math::vector::ZeroSpVec, vectorizer::{corpus::Corpus, matrix::CandidateMatrix, tfidf::Weighting, token::TokenFrequency}};

/// Fitted term weighting model.
///
/// Holds the term dimensions (columns, sorted lexicographically), the IDF
/// vector, and the weighting scheme. It is fit once over the candidate
/// profiles and afterwards turns any text, such as a query context, into a
/// vector in the same column space as the [`CandidateMatrix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermVectorizer {
    weighting: Weighting,
    /// term dimension sample, index == column
    term_dim_sample: IndexSet<String>,
    /// IDF vector, one entry per column
    idf: Vec<f64>,
}

impl TermVectorizer {
    /// Fit the weighting model over `documents` and vectorize them.
    /// Row `i` of the returned matrix is the vector of `documents[i]`.
    pub fn fit_transform<S>(weighting: Weighting, documents: &[S]) -> (Self, CandidateMatrix)
    where
        S: AsRef<str> + Sync,
    {
        let freqs: Vec<TokenFrequency> = documents
            .par_iter()
            .map(|doc| TokenFrequency::from_text(doc.as_ref()))
            .collect();

        let mut corpus = Corpus::new();
        for freq in &freqs {
            corpus.add_set(&freq.token_set_ref_str());
        }

        let term_dim_sample: IndexSet<String> = corpus.sorted_terms().into_iter().collect();
        let idf = weighting.idf_vec(&corpus, &term_dim_sample);
        let vectorizer = TermVectorizer {
            weighting,
            term_dim_sample,
            idf,
        };

        let rows: Vec<ZeroSpVec<f64>> = freqs
            .par_iter()
            .map(|freq| vectorizer.vectorize(freq))
            .collect();
        let matrix = CandidateMatrix::new(rows, vectorizer.vocab_size());
        (vectorizer, matrix)
    }

    /// Vectorize arbitrary text with the fitted model.
    /// Terms unseen at fit time are ignored.
    pub fn transform(&self, text: &str) -> ZeroSpVec<f64> {
        self.vectorize(&TokenFrequency::from_text(text))
    }

    fn vectorize(&self, freq: &TokenFrequency) -> ZeroSpVec<f64> {
        let mut vec = self.weighting.tf_vec(freq, &self.term_dim_sample, &self.idf);
        vec.shrink_to_fit();
        vec
    }

    /// Number of term dimensions
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_dim_sample.len()
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.term_dim_sample.contains(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILES: [&str; 3] = [
        "Paris, capital city of France",
        "Paris Hilton, American media personality",
        "London, capital city of England",
    ];

    #[test]
    fn matrix_shape_matches_documents_and_terms() {
        let (vectorizer, matrix) = TermVectorizer::fit_transform(Weighting::TfIdf { sublinear_tf: false }, &PROFILES);
        let (rows, cols) = matrix.shape();
        assert_eq!(rows, PROFILES.len());
        assert_eq!(cols, vectorizer.vocab_size());
        assert!(vectorizer.contains_term("hilton"));
        assert!(vectorizer.contains_term("of"));
        assert!(!vectorizer.contains_term("a"));
    }

    #[test]
    fn transform_reproduces_fitted_rows() {
        let (vectorizer, matrix) = TermVectorizer::fit_transform(Weighting::TfIdf { sublinear_tf: false }, &PROFILES);
        for (i, profile) in PROFILES.iter().enumerate() {
            assert_eq!(&vectorizer.transform(profile), matrix.row(i).unwrap());
        }
    }

    #[test]
    fn count_weighting_keeps_raw_counts() {
        let (vectorizer, matrix) = TermVectorizer::fit_transform(Weighting::Count, &["paris paris france", "texas"]);
        let query = vectorizer.transform("paris");
        assert_eq!(matrix.dot_rows(&[0, 1], &query), vec![2.0, 0.0]);
    }

    #[test]
    fn fitting_is_deterministic() {
        let a = TermVectorizer::fit_transform(Weighting::TfIdf { sublinear_tf: true }, &PROFILES);
        let b = TermVectorizer::fit_transform(Weighting::TfIdf { sublinear_tf: true }, &PROFILES);
        assert_eq!(a, b);
    }

    #[test]
    fn context_scores_related_profile_higher() {
        let (vectorizer, matrix) = TermVectorizer::fit_transform(Weighting::TfIdf { sublinear_tf: false }, &PROFILES);
        let query = vectorizer.transform("the capital of France is Paris");
        let scores = matrix.dot_rows(&[0, 1], &query);
        assert!(scores[0] > scores[1]);
    }
}
