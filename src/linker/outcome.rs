use serde::Serialize;

use crate::candidate::{LinkedCandidate, Phrase};

/// What happened to one phrase during linking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    Linked(LinkedCandidate),
    /// The phrase has no entry in the phrase index.
    NotFound,
    /// Scoring or link resolution failed for this phrase only.
    Failed(String),
}

/// Result for one input phrase, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkResult {
    pub phrase: Phrase,
    pub outcome: LinkOutcome,
    /// names of candidates that had no row in the vector matrix
    pub unindexed: Vec<String>,
}

impl LinkResult {
    pub fn new(phrase: Phrase, outcome: LinkOutcome) -> Self {
        LinkResult {
            phrase,
            outcome,
            unindexed: Vec::new(),
        }
    }

    #[inline]
    pub fn linked(&self) -> Option<&LinkedCandidate> {
        match &self.outcome {
            LinkOutcome::Linked(linked) => Some(linked),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self.outcome {
            LinkOutcome::Linked(_) => "linked",
            LinkOutcome::NotFound => "not_found",
            LinkOutcome::Failed(_) => "failed",
        }
    }

    /// `(phrase, candidate)` with the empty sentinel when nothing was linked.
    pub fn into_pair(self) -> (Phrase, LinkedCandidate) {
        match self.outcome {
            LinkOutcome::Linked(linked) => (self.phrase, linked),
            _ => (self.phrase, LinkedCandidate::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;

    #[test]
    fn non_linked_outcomes_pair_with_the_sentinel() {
        let phrase = Phrase::default_for("Atlantis");
        for outcome in [LinkOutcome::NotFound, LinkOutcome::Failed("boom".to_string())] {
            let result = LinkResult::new(phrase.clone(), outcome);
            assert!(result.linked().is_none());
            let (p, linked) = result.into_pair();
            assert_eq!(p, phrase);
            assert!(linked.is_empty());
        }
    }

    #[test]
    fn linked_outcome_keeps_the_candidate() {
        let linked = LinkedCandidate {
            candidate: Candidate::new("Paris", "capital of France"),
            score: 0.4,
            link: "http://dbpedia.org/resource/Paris".to_string(),
        };
        let result = LinkResult::new(Phrase::default_for("Paris"), LinkOutcome::Linked(linked.clone()));
        assert_eq!(result.status(), "linked");
        assert_eq!(result.into_pair().1, linked);
    }
}
