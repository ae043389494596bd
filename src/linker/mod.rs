//! Training pipeline and the ranker that links mentions to candidates.

pub mod outcome;

use std::path::Path;
use std::time::Instant;

use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::candidate::{
    generator::CandidateGenerator,
    overlap::{OverlapScorer, TokenOverlap},
    resolve::{DbpediaResolver, LinkResolver},
    Candidate, LinkedCandidate, Phrase,
};
use crate::dataset::extract_phrases;
use crate::error::{LinkerError, Result};
use crate::index::{CandidateIndex, CandidateIndexMap, IndexStats, PhraseIndex};
use crate::store::{LinkerParams, ModelArtifacts, ModelStore, UnindexedPolicy, VectorSpace};
use crate::utils::math::vector::ZeroSpVec;
use crate::vectorizer::TermVectorizer;

pub use outcome::{LinkOutcome, LinkResult};

/// Entity linker bound to one model directory.
///
/// Training writes every artifact into the directory; linking reads the
/// loaded artifacts only, so one instance can serve concurrent `link` calls.
pub struct SparseLinker {
    store: ModelStore,
    artifacts: ModelArtifacts,
    overlap: Box<dyn OverlapScorer + Send + Sync>,
    resolver: Box<dyn LinkResolver + Send + Sync>,
}

impl SparseLinker {
    /// Load whatever the model directory holds. A missing or empty directory
    /// gives an untrained linker with default params.
    pub fn open(model_dir: impl AsRef<Path>) -> Result<Self> {
        let store = ModelStore::new(model_dir.as_ref());
        let artifacts = store.load()?;
        Ok(SparseLinker {
            store,
            artifacts,
            overlap: Box::new(TokenOverlap),
            resolver: Box::new(DbpediaResolver::new()),
        })
    }

    pub fn with_overlap<O>(self, overlap: O) -> Self
    where
        O: OverlapScorer + Send + Sync + 'static,
    {
        SparseLinker {
            overlap: Box::new(overlap),
            ..self
        }
    }

    pub fn with_resolver<R>(self, resolver: R) -> Self
    where
        R: LinkResolver + Send + Sync + 'static,
    {
        SparseLinker {
            resolver: Box::new(resolver),
            ..self
        }
    }

    #[inline]
    pub fn params(&self) -> &LinkerParams {
        &self.artifacts.params
    }

    /// Merge `overrides` into the current params. Takes effect on the next
    /// training run and on linking.
    pub fn set_params(&mut self, overrides: &Map<String, Value>) -> Result<()> {
        self.artifacts.params.merge(overrides)
    }

    #[inline]
    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    #[inline]
    pub fn model_dir(&self) -> &Path {
        self.store.dir()
    }

    /// Extract phrases from `corpus_paths`, index their candidates, fit the
    /// vector space over the candidate profiles and save everything.
    ///
    /// The previous model, in memory and on disk, is replaced as a whole.
    pub fn train<P, G>(&mut self, corpus_paths: &[P], generator: &G) -> Result<IndexStats>
    where
        P: AsRef<Path>,
        G: CandidateGenerator + ?Sized,
    {
        let tic = Instant::now();
        let extraction = extract_phrases(corpus_paths)?;
        info!(
            "Extracted {} phrases ({} rows skipped)",
            extraction.phrases.len(),
            extraction.skipped_rows
        );

        let (index, stats) = CandidateIndex::build(&extraction.phrases, generator);

        info!("Fitting vector space...");
        let mut params = self.artifacts.params.clone();
        let profiles: Vec<&str> = index.candidate2index.iter().map(Candidate::text).collect();
        let (vectorizer, matrix) = TermVectorizer::fit_transform(params.weighting(), &profiles);
        let shape = matrix.shape();
        info!("Vector matrix shape: {:?}", shape);

        params.num_phrases = Some(extraction.phrases.len());
        params.num_candidates = Some(index.candidate2index.len());
        params.shape = Some(shape);

        let mut artifacts = ModelArtifacts::default();
        artifacts.params = params;
        artifacts.phrases = Some(extraction.phrases.iter().map(|p| p.text().to_string()).collect());
        artifacts.phrase2candidates = Some(index.phrase2candidates);
        artifacts.candidate2index = Some(index.candidate2index);
        artifacts.vector_space = Some(VectorSpace { vectorizer, matrix });

        self.store.save(&artifacts)?;
        self.artifacts = artifacts;
        info!("Trained in {:.2} sec.", tic.elapsed().as_secs_f64());
        Ok(stats)
    }

    /// Link every phrase against `context`. The output has exactly one entry
    /// per input phrase, in input order.
    ///
    /// Fails only when the model lacks an artifact ranking needs. Problems with
    /// a single phrase end up in that phrase's [`LinkOutcome`].
    pub fn link(&self, context: &str, phrases: &[Phrase]) -> Result<Vec<LinkResult>> {
        let phrase2candidates = self.artifacts.require_phrase2candidates()?;
        let candidate2index = self.artifacts.require_candidate2index()?;
        let space = self.artifacts.require_vector_space()?;
        let ranker = Ranker {
            phrase2candidates,
            candidate2index,
            space,
            query: space.vectorizer.transform(context),
            params: &self.artifacts.params,
            overlap: self.overlap.as_ref(),
            resolver: self.resolver.as_ref(),
        };

        Ok(phrases.par_iter().map(|phrase| ranker.rank(phrase)).collect())
    }
}

/// Borrowed view of a loaded model plus one vectorized context.
struct Ranker<'a> {
    phrase2candidates: &'a PhraseIndex,
    candidate2index: &'a CandidateIndexMap,
    space: &'a VectorSpace,
    query: ZeroSpVec<f64>,
    params: &'a LinkerParams,
    overlap: &'a (dyn OverlapScorer + Send + Sync),
    resolver: &'a (dyn LinkResolver + Send + Sync),
}

impl Ranker<'_> {
    fn rank(&self, phrase: &Phrase) -> LinkResult {
        let Some(candidates) = self.phrase2candidates.get(&phrase.normalized()) else {
            warn!("phrase not found: '{}'", phrase.text());
            return LinkResult::new(phrase.clone(), LinkOutcome::NotFound);
        };

        let mut ranked: Vec<&Candidate> = Vec::with_capacity(candidates.len());
        let mut rows: Vec<usize> = Vec::with_capacity(candidates.len());
        let mut unindexed = Vec::new();
        for candidate in candidates {
            match self.candidate2index.index_of(candidate) {
                Some(row) => {
                    ranked.push(candidate);
                    rows.push(row);
                }
                None => {
                    warn!("candidate not indexed: '{}' (phrase '{}')", candidate.name(), phrase.text());
                    unindexed.push(candidate.name().to_string());
                    if self.params.unindexed_candidates == UnindexedPolicy::RowZero {
                        ranked.push(candidate);
                        rows.push(0);
                    }
                }
            }
        }
        debug!("'{}': {} candidates retrieved, {} scored", phrase.text(), candidates.len(), ranked.len());

        let outcome = self.select(phrase, &ranked, &rows);
        if let LinkOutcome::Failed(reason) = &outcome {
            error!("failed to link '{}': {}", phrase.text(), reason);
        }
        LinkResult {
            phrase: phrase.clone(),
            outcome,
            unindexed,
        }
    }

    fn select(&self, phrase: &Phrase, ranked: &[&Candidate], rows: &[usize]) -> LinkOutcome {
        if ranked.is_empty() {
            return LinkOutcome::Failed("no indexed candidates".to_string());
        }

        let mut scores = self.space.matrix.dot_rows(rows, &self.query);
        if self.params.use_overlap {
            for (score, candidate) in scores.iter_mut().zip(ranked) {
                *score *= self.overlap.overlap(candidate.name(), phrase.text());
            }
        }

        // first maximum wins
        let mut best = 0;
        for (i, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = i;
            }
        }

        let winner = ranked[best];
        match self.resolver.resolve(winner.wiki(), winner.uris()) {
            Ok(link) => LinkOutcome::Linked(LinkedCandidate {
                candidate: winner.clone(),
                score: scores[best],
                link,
            }),
            Err(err) => {
                let err = match err {
                    LinkerError::Resolve { reason, .. } => LinkerError::Resolve {
                        candidate: winner.name().to_string(),
                        reason,
                    },
                    other => other,
                };
                LinkOutcome::Failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;

    fn cities(phrase: &Phrase) -> Result<Vec<Candidate>> {
        Ok(match phrase.text() {
            "Paris" => vec![
                Candidate::new("Paris Hilton", "Paris Hilton hotel heiress and media personality").with_wiki("Paris Hilton"),
                Candidate::new("Paris", "Paris capital city of France").with_wiki("Paris"),
            ],
            "London" => vec![Candidate::new("London", "London capital city of England").with_wiki("London")],
            _ => vec![],
        })
    }

    /// Two candidates with identical profiles
    fn twins(phrase: &Phrase) -> Result<Vec<Candidate>> {
        Ok(match phrase.text() {
            "Paris" => vec![
                Candidate::new("Paris Hilton", "city").with_wiki("Paris Hilton"),
                Candidate::new("Paris", "city").with_wiki("Paris"),
            ],
            _ => vec![],
        })
    }

    fn trained<G>(dir: &Path, generator: &G, overrides: serde_json::Value) -> SparseLinker
    where
        G: CandidateGenerator,
    {
        let corpus = dir.join("corpus.tsv");
        fs::write(&corpus, "id\ttargets\n1\tParis,London\n2\tLondon\n").unwrap();
        let mut linker = SparseLinker::open(dir.join("model")).unwrap();
        linker.set_params(overrides.as_object().unwrap()).unwrap();
        linker.train(&[corpus], generator).unwrap();
        linker
    }

    fn winner(result: &LinkResult) -> &str {
        result.linked().map(|l| l.candidate.name()).unwrap_or_default()
    }

    #[test]
    fn train_records_sizes_in_params() {
        let dir = tempfile::tempdir().unwrap();
        let linker = trained(dir.path(), &cities, serde_json::json!({}));
        let params = linker.params();
        assert_eq!(params.num_phrases, Some(2));
        assert_eq!(params.num_candidates, Some(3));
        let (rows, cols) = params.shape.unwrap();
        assert_eq!(rows, 3);
        assert_eq!(cols, linker.artifacts().require_vector_space().unwrap().vectorizer.vocab_size());
    }

    #[test]
    fn context_similarity_picks_the_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let linker = trained(dir.path(), &cities, serde_json::json!({"use_overlap": false}));
        let results = linker
            .link("the capital of France", &[Phrase::default_for("Paris")])
            .unwrap();
        assert_eq!(winner(&results[0]), "Paris");
        let linked = results[0].linked().unwrap();
        assert!(linked.score > 0.0);
        assert_eq!(linked.link, "http://dbpedia.org/resource/Paris");
    }

    #[test]
    fn equal_similarity_without_overlap_keeps_the_first_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let linker = trained(dir.path(), &twins, serde_json::json!({"use_overlap": false}));
        let results = linker.link("a city", &[Phrase::default_for("Paris")]).unwrap();
        assert_eq!(winner(&results[0]), "Paris Hilton");
        assert!((results[0].linked().unwrap().score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn overlap_breaks_equal_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let linker = trained(dir.path(), &twins, serde_json::json!({"use_overlap": true}));
        let results = linker.link("a city", &[Phrase::default_for("Paris")]).unwrap();
        assert_eq!(winner(&results[0]), "Paris");
    }

    #[test]
    fn output_maps_one_to_one_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let linker = trained(dir.path(), &cities, serde_json::json!({}));
        let phrases = vec![
            Phrase::new("London", 30, 36, ""),
            Phrase::default_for("Atlantis"),
            Phrase::new("Paris", 3, 8, ""),
        ];
        let results = linker.link("capital city", &phrases).unwrap();
        assert_eq!(results.len(), phrases.len());
        for (result, phrase) in results.iter().zip(&phrases) {
            assert_eq!(&result.phrase, phrase);
        }
        assert_eq!(winner(&results[0]), "London");
        assert_eq!(results[1].outcome, LinkOutcome::NotFound);
        assert!(results[2].linked().is_some());
    }

    #[test]
    fn unknown_phrase_gives_the_empty_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let linker = trained(dir.path(), &cities, serde_json::json!({}));
        let results = linker.link("lost city", &[Phrase::default_for("Atlantis")]).unwrap();
        let (phrase, linked) = results.into_iter().next().unwrap().into_pair();
        assert_eq!(phrase.text(), "Atlantis");
        assert!(linked.is_empty());
        assert_eq!(linked.score, 0.0);
    }

    #[test]
    fn unindexed_candidate_scores_with_row_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut linker = trained(dir.path(), &cities, serde_json::json!({"use_overlap": false}));
        let ghost = Candidate::new("Ghost", "nothing in common").with_wiki("Ghost");
        linker
            .artifacts
            .phrase2candidates
            .as_mut()
            .unwrap()
            .insert(Phrase::default_for("Ghost town"), vec![ghost]);

        let context = "Paris Hilton hotel";
        let results = linker.link(context, &[Phrase::default_for("Ghost town")]).unwrap();
        let linked = results[0].linked().unwrap();
        assert_eq!(linked.candidate.name(), "Ghost");
        assert_eq!(results[0].unindexed, vec!["Ghost".to_string()]);

        let space = linker.artifacts.require_vector_space().unwrap();
        let row_zero = space.matrix.dot_rows(&[0], &space.vectorizer.transform(context))[0];
        assert!(row_zero > 0.0);
        assert_eq!(linked.score, row_zero);
    }

    #[test]
    fn skip_policy_leaves_unindexed_candidates_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut linker = trained(dir.path(), &cities, serde_json::json!({"unindexed_candidates": "skip"}));
        let index = linker.artifacts.phrase2candidates.as_mut().unwrap();
        index.insert(Phrase::default_for("Ghost town"), vec![Candidate::new("Ghost", "").with_wiki("Ghost")]);
        index.insert(Phrase::default_for("London"), vec![Candidate::new("Ghost", "").with_wiki("Ghost")]);

        let phrases = [Phrase::default_for("Ghost town"), Phrase::default_for("London")];
        let results = linker.link("capital of England", &phrases).unwrap();
        assert!(matches!(results[0].outcome, LinkOutcome::Failed(_)));
        assert_eq!(winner(&results[1]), "London");
        assert_eq!(results[1].unindexed, vec!["Ghost".to_string()]);
    }

    #[test]
    fn resolver_failure_is_isolated_to_its_phrase() {
        let dir = tempfile::tempdir().unwrap();
        let linker = trained(dir.path(), &cities, serde_json::json!({})).with_resolver(
            |wiki: Option<&str>, _uris: &BTreeSet<String>| -> Result<String> {
                match wiki {
                    Some("London") => Err(LinkerError::Resolve {
                        candidate: String::new(),
                        reason: "offline".to_string(),
                    }),
                    other => Ok(format!("kb:{}", other.unwrap_or_default())),
                }
            },
        );
        let phrases = [Phrase::default_for("London"), Phrase::default_for("Paris")];
        let results = linker.link("capital city", &phrases).unwrap();
        match &results[0].outcome {
            LinkOutcome::Failed(reason) => assert!(reason.contains("candidate 'London'"), "{}", reason),
            other => panic!("expected a failure, got {:?}", other),
        }
        assert!(results[0].clone().into_pair().1.is_empty());
        assert!(results[1].linked().unwrap().link.starts_with("kb:"));
    }

    #[test]
    fn reload_gives_identical_results() {
        let dir = tempfile::tempdir().unwrap();
        let linker = trained(dir.path(), &cities, serde_json::json!({}));
        let phrases = [Phrase::default_for("Paris"), Phrase::default_for("London")];
        let context = "Paris is the capital city of France";
        let before = linker.link(context, &phrases).unwrap();

        let reloaded = SparseLinker::open(linker.model_dir()).unwrap();
        assert_eq!(reloaded.params(), linker.params());
        assert_eq!(reloaded.link(context, &phrases).unwrap(), before);
    }

    #[test]
    fn untrained_model_reports_the_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let linker = SparseLinker::open(dir.path()).unwrap();
        let err = linker.link("anything", &[Phrase::default_for("Paris")]).unwrap_err();
        assert!(matches!(err, LinkerError::MissingArtifact(_)));
    }
}
