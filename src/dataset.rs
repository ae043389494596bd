//! Phrase extraction from tab-separated training corpora.

use std::path::Path;

use indexmap::IndexSet;
use log::{info, warn};

use crate::candidate::{make_phrases, Phrase};
use crate::error::{LinkerError, Result};

/// Column holding comma-separated surface forms.
pub const TARGETS_COLUMN: &str = "targets";

/// Unique phrases found in a corpus, plus how many rows were skipped.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Phrases in first-seen order across files and rows
    pub phrases: Vec<Phrase>,
    pub skipped_rows: usize,
}

/// Collect the unique surface forms of every `targets` cell in `paths`.
///
/// Each comma-separated form is trimmed; empty forms are dropped and exact
/// duplicates collapse across all files. A file without a `targets` column
/// aborts the extraction, a malformed row is skipped with a warning.
pub fn extract_phrases<P>(paths: &[P]) -> Result<Extraction>
where
    P: AsRef<Path>,
{
    let mut voc: IndexSet<String> = IndexSet::new();
    let mut skipped_rows = 0;

    for path in paths {
        let path = path.as_ref();
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_path(path)?;

        let headers = rdr.headers()?.clone();
        let idx_targets = headers
            .iter()
            .position(|h| h.trim() == TARGETS_COLUMN)
            .ok_or_else(|| LinkerError::CorpusParse {
                path: path.to_path_buf(),
                reason: format!("missing '{}' column", TARGETS_COLUMN),
            })?;

        for (row, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    warn!("skipping row {} of {}: {}", row + 1, path.display(), err);
                    skipped_rows += 1;
                    continue;
                }
            };
            let Some(targets) = record.get(idx_targets) else {
                warn!("skipping row {} of {}: no targets field", row + 1, path.display());
                skipped_rows += 1;
                continue;
            };
            for target in targets.split(',') {
                let target = target.trim();
                if !target.is_empty() {
                    voc.insert(target.to_string());
                }
            }
        }
        info!("Read {}: {} unique phrases so far", path.display(), voc.len());
    }

    Ok(Extraction {
        phrases: make_phrases(voc.iter()),
        skipped_rows,
    })
}
