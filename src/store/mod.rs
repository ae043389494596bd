//! Model persistence.
//!
//! A model directory holds one file per artifact. Saving stages every file
//! as `<name>.tmp` and renames them into place only once all of them were
//! written. Loading picks up whatever is present.

pub mod params;

pub use params::{LinkerParams, UnindexedPolicy};

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{info, warn};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LinkerError, Result};
use crate::index::{CandidateIndexMap, PhraseIndex};
use crate::vectorizer::{matrix::CandidateMatrix, TermVectorizer};

pub const PARAMS_FILE: &str = "params.json";
pub const VECTORIZER_FILE: &str = "vectorizer.cbor";
pub const CANDIDATE2INDEX_FILE: &str = "candidate2index.cbor";
pub const VECTORS_FILE: &str = "vectors.cbor";
pub const PHRASE2CANDIDATES_FILE: &str = "phrase2candidates.cbor";
pub const PHRASES_FILE: &str = "phrases.txt";
pub const CANDIDATES_FILE: &str = "candidates.txt";

/// Fitted weighting model and the matrix it produced. Always stored and
/// loaded together.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSpace {
    pub vectorizer: TermVectorizer,
    pub matrix: CandidateMatrix,
}

/// Everything a model directory can hold. Each artifact is either present
/// or absent; consumers ask for what they need through the `require_*`
/// accessors.
#[derive(Debug, Clone, Default)]
pub struct ModelArtifacts {
    pub params: LinkerParams,
    /// phrase texts, one per training phrase
    pub phrases: Option<Vec<String>>,
    pub phrase2candidates: Option<PhraseIndex>,
    pub candidate2index: Option<CandidateIndexMap>,
    pub vector_space: Option<VectorSpace>,
    /// file that kept `vector_space` from loading
    absent_vector_part: Option<&'static str>,
}

impl ModelArtifacts {
    pub fn require_phrase2candidates(&self) -> Result<&PhraseIndex> {
        self.phrase2candidates
            .as_ref()
            .ok_or(LinkerError::MissingArtifact(PHRASE2CANDIDATES_FILE))
    }

    pub fn require_candidate2index(&self) -> Result<&CandidateIndexMap> {
        self.candidate2index
            .as_ref()
            .ok_or(LinkerError::MissingArtifact(CANDIDATE2INDEX_FILE))
    }

    pub fn require_vector_space(&self) -> Result<&VectorSpace> {
        self.vector_space
            .as_ref()
            .ok_or(LinkerError::MissingArtifact(self.absent_vector_part.unwrap_or(VECTORIZER_FILE)))
    }

    /// Rows of the matrix must line up with the candidate index.
    fn check_shape(&self) -> Result<()> {
        if let (Some(space), Some(index)) = (&self.vector_space, &self.candidate2index) {
            let (rows, _) = space.matrix.shape();
            if rows != index.len() {
                return Err(LinkerError::ShapeMismatch {
                    rows,
                    indexed: index.len(),
                });
            }
        }
        Ok(())
    }
}

/// Reads and writes [`ModelArtifacts`] inside one directory.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ModelStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write every present artifact plus the params.
    pub fn save(&self, artifacts: &ModelArtifacts) -> Result<()> {
        artifacts.check_shape()?;
        fs::create_dir_all(&self.dir)?;

        let mut staged = Staged::new(self);
        let written = (|| -> Result<()> {
            staged.write(PARAMS_FILE, |w| Ok(serde_json::to_writer_pretty(w, &artifacts.params)?))?;
            if let Some(phrases) = &artifacts.phrases {
                staged.write(PHRASES_FILE, |w| write_lines(w, phrases.iter().map(String::as_str)))?;
            }
            if let Some(index) = &artifacts.phrase2candidates {
                staged.write(PHRASE2CANDIDATES_FILE, |w| write_cbor(w, index))?;
            }
            if let Some(index) = &artifacts.candidate2index {
                staged.write(CANDIDATES_FILE, |w| write_lines(w, index.iter().map(|c| c.name())))?;
                staged.write(CANDIDATE2INDEX_FILE, |w| write_cbor(w, index))?;
            }
            if let Some(space) = &artifacts.vector_space {
                staged.write(VECTORIZER_FILE, |w| write_cbor(w, &space.vectorizer))?;
                staged.write(VECTORS_FILE, |w| write_cbor(w, &space.matrix))?;
            }
            Ok(())
        })();

        match written {
            Ok(()) => staged.commit(),
            Err(err) => {
                staged.discard();
                Err(err)
            }
        }
    }

    /// Read whichever artifacts exist. Absent files leave their field unset.
    pub fn load(&self) -> Result<ModelArtifacts> {
        let tic = Instant::now();
        let mut artifacts = ModelArtifacts::default();

        if let Some(file) = self.open(PARAMS_FILE)? {
            artifacts.params = serde_json::from_reader(file)?;
            info!("Parameters:\n- {}", artifacts.params.describe().join("\n- "));
        }
        if let Some(file) = self.open(PHRASES_FILE)? {
            artifacts.phrases = Some(file.lines().collect::<std::io::Result<Vec<String>>>()?);
        }
        if let Some(file) = self.open(PHRASE2CANDIDATES_FILE)? {
            artifacts.phrase2candidates = Some(serde_cbor::from_reader(file)?);
        }
        if let Some(file) = self.open(CANDIDATE2INDEX_FILE)? {
            artifacts.candidate2index = Some(serde_cbor::from_reader(file)?);
        }

        let vectorizer: Option<TermVectorizer> = self.read_cbor(VECTORIZER_FILE)?;
        let matrix: Option<CandidateMatrix> = self.read_cbor(VECTORS_FILE)?;
        artifacts.vector_space = match (vectorizer, matrix) {
            (Some(vectorizer), Some(matrix)) => Some(VectorSpace { vectorizer, matrix }),
            (Some(_), None) => {
                warn!("ignoring {}: {} is missing", VECTORIZER_FILE, VECTORS_FILE);
                artifacts.absent_vector_part = Some(VECTORS_FILE);
                None
            }
            (None, Some(_)) => {
                warn!("ignoring {}: {} is missing", VECTORS_FILE, VECTORIZER_FILE);
                artifacts.absent_vector_part = Some(VECTORIZER_FILE);
                None
            }
            (None, None) => None,
        };

        artifacts.check_shape()?;
        info!("Loaded {} in {:.2} sec.", self.dir.display(), tic.elapsed().as_secs_f64());
        Ok(artifacts)
    }

    fn open(&self, name: &str) -> Result<Option<BufReader<File>>> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(BufReader::new(File::open(path)?)))
    }

    fn read_cbor<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.open(name)? {
            Some(file) => Ok(Some(serde_cbor::from_reader(file)?)),
            None => Ok(None),
        }
    }
}

fn write_cbor<T: Serialize>(w: &mut BufWriter<File>, value: &T) -> Result<()> {
    serde_cbor::to_writer(w, value)?;
    Ok(())
}

fn write_lines<'a, I>(w: &mut BufWriter<File>, lines: I) -> Result<()>
where
    I: Iterator<Item = &'a str>,
{
    for line in lines {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Files written under a temporary name, renamed on commit.
struct Staged<'a> {
    store: &'a ModelStore,
    files: Vec<(PathBuf, PathBuf)>,
}

impl<'a> Staged<'a> {
    fn new(store: &'a ModelStore) -> Self {
        Staged {
            store,
            files: Vec::new(),
        }
    }

    fn write<F>(&mut self, name: &str, fill: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        let target = self.store.path(name);
        let tmp = self.store.path(&format!("{}.tmp", name));
        self.files.push((tmp.clone(), target));
        let mut writer = BufWriter::new(File::create(&tmp)?);
        fill(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        for (tmp, target) in &self.files {
            fs::rename(tmp, target)?;
            info!("Saved {}", target.display());
        }
        Ok(())
    }

    fn discard(self) {
        for (tmp, _) in &self.files {
            let _ = fs::remove_file(tmp);
        }
    }
}
