//! This crate is an entity linker ranking catalog candidates by TF-IDF context similarity.

pub mod candidate;
pub mod dataset;
pub mod error;
pub mod index;
pub mod linker;
pub mod store;
pub mod utils;
pub mod vectorizer;

/// Sparse Linker
/// The top-level struct of this crate.
/// It trains a model from tab-separated corpora and links mentions in a
/// context to catalog candidates.
///
/// Training:
/// - extracts unique phrases from the `targets` column
/// - asks a `CandidateGenerator` for the candidates of each phrase
/// - fits a term weighting model over the candidate profiles
/// - saves every artifact into the model directory
///
/// Linking scores each candidate of a phrase by the dot product of its
/// vector with the context vector, optionally multiplied by the lexical
/// overlap of its name with the phrase, and keeps the best one.
///
/// # Thread Safety
/// `link` takes `&self` and scores phrases in parallel.
pub use linker::SparseLinker;

/// Link Result and Link Outcome
/// - `LinkResult`: the input phrase, its outcome and the candidates that had no vector row
/// - `LinkOutcome`: linked, not found, or failed for this phrase only
pub use linker::{LinkOutcome, LinkResult};

/// Phrase, Candidate and Linked Candidate value types
/// `Phrase` compares on text and offsets, `Candidate` on name only, so both
/// work directly as map and set keys.
/// `LinkedCandidate` pairs the winning candidate with its score and link.
pub use candidate::{Candidate, LinkedCandidate, Phrase};

/// Collaborator traits
/// - `CandidateGenerator`: phrase to admissible candidates (`Catalog` is an in-memory implementation)
/// - `OverlapScorer`: bounded name similarity (`TokenOverlap` is the default)
/// - `LinkResolver`: knowledge-base id to canonical URI (`DbpediaResolver` is the default)
///
/// Closures with the matching signature implement each trait.
pub use candidate::generator::{CandidateGenerator, Catalog};
pub use candidate::overlap::{OverlapScorer, TokenOverlap};
pub use candidate::resolve::{DbpediaResolver, LinkResolver};

/// Model Store and Linker Params
/// Persists the model artifacts, one file each, inside a directory.
/// A directory may hold a partial model; missing artifacts are reported when
/// an operation needs them.
pub use store::{LinkerParams, ModelArtifacts, ModelStore, UnindexedPolicy};

/// Term Vectorizer
/// Fitted weighting model (counts or TF-IDF) and the candidate matrix it produces.
pub use vectorizer::{matrix::CandidateMatrix, tfidf::Weighting, TermVectorizer};

pub use error::{LinkerError, Result};
