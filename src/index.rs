//! Phrase → candidates index and the candidate → row assignment.

use indexmap::{IndexMap, IndexSet};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::candidate::{generator::CandidateGenerator, Candidate, Phrase};

/// Candidate sets keyed by normalized phrase, in phrase insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhraseIndex {
    #[serde(with = "indexmap::map::serde_seq")]
    entries: IndexMap<Phrase, IndexSet<Candidate>>,
}

impl PhraseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `candidates` into the set of `phrase`; duplicates collapse by name.
    pub fn insert<I>(&mut self, phrase: Phrase, candidates: I)
    where
        I: IntoIterator<Item = Candidate>,
    {
        self.entries.entry(phrase).or_default().extend(candidates);
    }

    #[inline]
    pub fn get(&self, phrase: &Phrase) -> Option<&IndexSet<Candidate>> {
        self.entries.get(phrase)
    }

    #[inline]
    pub fn contains(&self, phrase: &Phrase) -> bool {
        self.entries.contains_key(phrase)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Phrase, &IndexSet<Candidate>)> + '_ {
        self.entries.iter()
    }

    /// Every reachable candidate once, in first-seen order.
    pub fn candidates(&self) -> IndexSet<Candidate> {
        self.entries.values().flatten().cloned().collect()
    }
}

/// Dense row index per candidate. A candidate's row is its position, so every
/// index in `[0, len)` is used exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateIndexMap {
    candidates: IndexSet<Candidate>,
}

impl CandidateIndexMap {
    pub fn new(candidates: IndexSet<Candidate>) -> Self {
        Self { candidates }
    }

    #[inline]
    pub fn index_of(&self, candidate: &Candidate) -> Option<usize> {
        self.candidates.get_index_of(candidate)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates in row order
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.candidates.iter()
    }
}

/// Counters reported after building the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub phrases: usize,
    pub indexed_phrases: usize,
    pub failed_phrases: usize,
    pub candidates: usize,
}

/// The two training-time lookup structures, built together.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    pub phrase2candidates: PhraseIndex,
    pub candidate2index: CandidateIndexMap,
}

impl CandidateIndex {
    /// Ask `generator` for the candidates of every phrase and index them.
    ///
    /// Phrases whose generation fails are logged and left out. Candidates
    /// with an empty name are dropped, and phrases left with no candidates
    /// are not indexed. Rows are assigned in first-seen order
    /// while walking phrases in order and each candidate set in order.
    pub fn build<G>(phrases: &[Phrase], generator: &G) -> (Self, IndexStats)
    where
        G: CandidateGenerator + ?Sized,
    {
        let mut phrase2candidates = PhraseIndex::new();
        let mut stats = IndexStats {
            phrases: phrases.len(),
            ..IndexStats::default()
        };

        for (phrase, generated) in phrases.iter().zip(generator.generate(phrases)) {
            match generated {
                Ok(candidates) => {
                    let named: IndexSet<Candidate> = candidates
                        .into_iter()
                        .filter(|candidate| {
                            if candidate.is_empty() {
                                warn!("dropping nameless candidate for phrase '{}'", phrase.text());
                            }
                            !candidate.is_empty()
                        })
                        .collect();
                    if !named.is_empty() {
                        phrase2candidates.insert(phrase.clone(), named);
                    }
                }
                Err(err) => {
                    warn!("skipping phrase '{}': {}", phrase.text(), err);
                    stats.failed_phrases += 1;
                }
            }
        }

        let candidate2index = CandidateIndexMap::new(phrase2candidates.candidates());
        stats.indexed_phrases = phrase2candidates.len();
        stats.candidates = candidate2index.len();
        info!(
            "Indexed {} of {} phrases, {} candidates ({} failed)",
            stats.indexed_phrases, stats.phrases, stats.candidates, stats.failed_phrases
        );

        (
            CandidateIndex {
                phrase2candidates,
                candidate2index,
            },
            stats,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::make_phrases;
    use crate::error::{LinkerError, Result};

    fn generator(phrase: &Phrase) -> Result<Vec<Candidate>> {
        match phrase.text() {
            "Paris" => Ok(vec![
                Candidate::new("Paris", "capital of France"),
                Candidate::new("Paris Hilton", "media personality"),
            ]),
            "Hilton" => Ok(vec![
                Candidate::new("Hilton Hotels", "hotel chain"),
                Candidate::new("Paris Hilton", "media personality"),
            ]),
            "Nameless" => Ok(vec![Candidate::new("", "reserved for the sentinel")]),
            "Mixed" => Ok(vec![Candidate::empty(), Candidate::new("Mixed Martial Arts", "combat sport")]),
            "Broken" => Err(LinkerError::CandidateGeneration {
                phrase: phrase.text().to_string(),
                reason: "timeout".to_string(),
            }),
            _ => Ok(vec![]),
        }
    }

    #[test]
    fn rows_follow_first_seen_order() {
        let phrases = make_phrases(["Paris", "Hilton"]);
        let (index, stats) = CandidateIndex::build(&phrases, &generator);
        let names: Vec<&str> = index.candidate2index.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Paris", "Paris Hilton", "Hilton Hotels"]);
        assert_eq!(index.candidate2index.index_of(&Candidate::new("Hilton Hotels", "")), Some(2));
        assert_eq!(stats.candidates, 3);
    }

    #[test]
    fn vocabulary_equals_reachable_candidates() {
        let phrases = make_phrases(["Paris", "Hilton", "Atlantis"]);
        let (index, _) = CandidateIndex::build(&phrases, &generator);
        let reachable: IndexSet<Candidate> = index
            .phrase2candidates
            .iter()
            .flat_map(|(_, set)| set.iter().cloned())
            .collect();
        assert_eq!(reachable.len(), index.candidate2index.len());
        for candidate in &reachable {
            assert!(index.candidate2index.index_of(candidate).is_some());
        }
    }

    #[test]
    fn failed_and_empty_phrases_are_not_indexed() {
        let phrases = make_phrases(["Paris", "Broken", "Atlantis"]);
        let (index, stats) = CandidateIndex::build(&phrases, &generator);
        assert!(index.phrase2candidates.contains(&Phrase::default_for("Paris")));
        assert!(!index.phrase2candidates.contains(&Phrase::default_for("Broken")));
        assert!(!index.phrase2candidates.contains(&Phrase::default_for("Atlantis")));
        assert_eq!(stats.failed_phrases, 1);
        assert_eq!(stats.indexed_phrases, 1);
    }

    #[test]
    fn nameless_candidates_are_dropped() {
        let phrases = make_phrases(["Nameless", "Mixed"]);
        let (index, stats) = CandidateIndex::build(&phrases, &generator);
        assert!(!index.phrase2candidates.contains(&Phrase::default_for("Nameless")));
        let mixed = index.phrase2candidates.get(&Phrase::default_for("Mixed")).unwrap();
        assert_eq!(mixed.len(), 1);
        assert!(index.candidate2index.iter().all(|c| !c.is_empty()));
        assert_eq!(stats.candidates, 1);
        assert_eq!(stats.indexed_phrases, 1);
    }
}
