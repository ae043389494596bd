use std::collections::{HashMap, HashSet};
use std::path::Path;

use indexmap::IndexSet;
use log::{info, warn};

use crate::candidate::{Candidate, Phrase};
use crate::error::{LinkerError, Result};
use crate::vectorizer::token::tokenize;

/// Maps a normalized phrase to its admissible candidates.
pub trait CandidateGenerator {
    /// Candidates for one phrase. Order is kept, duplicates collapse later.
    fn candidates(&self, phrase: &Phrase) -> Result<Vec<Candidate>>;

    /// Candidates for many phrases, aligned with `phrases`.
    /// Implementations backed by a remote service may batch here.
    fn generate(&self, phrases: &[Phrase]) -> Vec<Result<IndexSet<Candidate>>> {
        phrases
            .iter()
            .map(|phrase| self.candidates(phrase).map(|c| c.into_iter().collect()))
            .collect()
    }
}

impl<F> CandidateGenerator for F
where
    F: Fn(&Phrase) -> Result<Vec<Candidate>>,
{
    fn candidates(&self, phrase: &Phrase) -> Result<Vec<Candidate>> {
        self(phrase)
    }
}

/// In-memory candidate catalog.
///
/// A phrase matches an entry when its lowercase text equals the entry's name
/// or one of its aliases, or when every token of the phrase occurs in the
/// entry's name. Matches come back in catalog order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Candidate>,
    name_tokens: Vec<HashSet<String>>,
    aliases: HashMap<String, Vec<usize>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a tab-separated catalog.
    ///
    /// Required columns: `name`, `text`. Optional: `wiki` (defaults to the
    /// name), `uris` (whitespace-separated) and `aliases` (`|`-separated).
    pub fn from_tsv(path: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(path)?;

        let headers = rdr.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let missing = |name: &str| LinkerError::CorpusParse {
            path: path.to_path_buf(),
            reason: format!("catalog is missing the '{}' column", name),
        };
        let idx_name = column("name").ok_or_else(|| missing("name"))?;
        let idx_text = column("text").ok_or_else(|| missing("text"))?;
        let idx_wiki = column("wiki");
        let idx_uris = column("uris");
        let idx_aliases = column("aliases");

        let mut catalog = Catalog::new();
        for (row, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    warn!("skipping catalog row {} of {}: {}", row + 1, path.display(), err);
                    continue;
                }
            };
            let name = record.get(idx_name).map(str::trim).unwrap_or("");
            if name.is_empty() {
                warn!("skipping catalog row {} of {}: empty name", row + 1, path.display());
                continue;
            }
            let text = record.get(idx_text).unwrap_or("");
            // the name doubles as the wiki title when none is given
            let wiki = idx_wiki
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .unwrap_or(name);
            let mut candidate = Candidate::new(name, text).with_wiki(wiki);
            if let Some(uris) = idx_uris.and_then(|i| record.get(i)) {
                candidate = candidate.with_uris(uris.split_whitespace());
            }
            let aliases: Vec<&str> = idx_aliases
                .and_then(|i| record.get(i))
                .map(|a| a.split('|').map(str::trim).filter(|a| !a.is_empty()).collect())
                .unwrap_or_default();
            catalog.insert(candidate, &aliases);
        }
        info!("Loaded {} catalog entries from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Add an entry with optional extra surface forms.
    pub fn insert(&mut self, candidate: Candidate, aliases: &[&str]) {
        let idx = self.entries.len();
        let mut keys: Vec<String> = vec![candidate.name().to_lowercase()];
        keys.extend(aliases.iter().map(|a| a.to_lowercase()));
        for key in keys {
            let slots = self.aliases.entry(key).or_default();
            if !slots.contains(&idx) {
                slots.push(idx);
            }
        }
        self.name_tokens.push(tokenize(candidate.name()).into_iter().collect());
        self.entries.push(candidate);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CandidateGenerator for Catalog {
    fn candidates(&self, phrase: &Phrase) -> Result<Vec<Candidate>> {
        let key = phrase.text().trim().to_lowercase();
        let mut hits: Vec<usize> = self.aliases.get(&key).cloned().unwrap_or_default();

        let tokens = tokenize(&key);
        if !tokens.is_empty() {
            for (idx, name_tokens) in self.name_tokens.iter().enumerate() {
                if tokens.iter().all(|t| name_tokens.contains(t)) && !hits.contains(&idx) {
                    hits.push(idx);
                }
            }
        }
        hits.sort_unstable();
        Ok(hits.into_iter().map(|idx| self.entries[idx].clone()).collect())
    }
}
