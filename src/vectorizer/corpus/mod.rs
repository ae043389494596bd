use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// keep document count and per-term document frequencies
/// for the IDF side of the weighting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Corpus {
    /// number of documents added
    pub doc_num: u64,
    /// number of documents each term appears in
    #[serde(with = "indexmap::map::serde_seq")]
    pub term_counts: IndexMap<Box<str>, u64>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            term_counts: IndexMap::new(),
        }
    }

    /// Add one document's distinct terms to the corpus.
    /// Every term in `terms` must appear only once.
    pub fn add_set<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        for term in terms {
            *self.term_counts.entry(term.as_ref().into()).or_insert(0) += 1;
        }
    }

    /// Get the number of documents in the corpus
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Get the document frequency of a term
    #[inline]
    pub fn get_term_count(&self, term: &str) -> u64 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    /// All terms, sorted lexicographically
    pub fn sorted_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = self.term_counts.keys().map(|t| t.to_string()).collect();
        terms.sort_unstable();
        terms
    }
}
