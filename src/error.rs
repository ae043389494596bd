use std::path::PathBuf;

/// Errors raised while training, persisting, or serving a linker.
#[derive(Debug, thiserror::Error)]
pub enum LinkerError {
    /// The training corpus is structurally unusable (e.g. no `targets` column).
    #[error("cannot parse corpus {path}: {reason}")]
    CorpusParse { path: PathBuf, reason: String },

    /// An operation needs an artifact the loaded model does not hold.
    #[error("missing model artifact: {0}")]
    MissingArtifact(&'static str),

    /// The candidate generator failed for one phrase.
    #[error("candidate generation failed for '{phrase}': {reason}")]
    CandidateGeneration { phrase: String, reason: String },

    /// The link resolver could not produce a URI for a candidate.
    #[error("cannot resolve a link for candidate '{candidate}': {reason}")]
    Resolve { candidate: String, reason: String },

    /// Loaded vectors and candidate index disagree on the number of candidates.
    #[error("vector matrix has {rows} rows but {indexed} candidates are indexed")]
    ShapeMismatch { rows: usize, indexed: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CBOR error: {0}")]
    Cbor(#[from] serde_cbor::Error),
}

pub type Result<T> = std::result::Result<T, LinkerError>;
