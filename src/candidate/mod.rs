//! Phrase and candidate value types.
//!
//! Both types are immutable value objects whose equality and hash are
//! derived from their key fields only, so they can be used directly as
//! map and set keys.

pub mod generator;
pub mod overlap;
pub mod resolve;

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A mention in a document.
///
/// Equality and hashing use `text`, `beg` and `end`; the fallback `uri` is
/// carried along but never compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phrase {
    text: String,
    beg: usize,
    end: usize,
    uri: String,
}

impl Phrase {
    pub fn new(text: impl Into<String>, beg: usize, end: usize, uri: impl Into<String>) -> Self {
        Phrase {
            text: text.into(),
            beg,
            end,
            uri: uri.into(),
        }
    }

    /// Build the lookup key for a raw surface form.
    ///
    /// The text is trimmed, `beg` is 1, `end` is the length of the trimmed
    /// text in characters and the fallback URI is `http://<text>`.
    pub fn default_for(text: &str) -> Self {
        let text = text.trim();
        Phrase {
            text: text.to_string(),
            beg: 1,
            end: text.chars().count(),
            uri: format!("http://{}", text),
        }
    }

    /// The lookup key for this phrase, whatever its actual offsets.
    pub fn normalized(&self) -> Self {
        Phrase::default_for(&self.text)
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn beg(&self) -> usize {
        self.beg
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl PartialEq for Phrase {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.beg == other.beg && self.end == other.end
    }
}

impl Eq for Phrase {}

impl Hash for Phrase {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
        self.beg.hash(state);
        self.end.hash(state);
    }
}

/// Turn unique surface forms into lookup phrases with [`Phrase::default_for`].
pub fn make_phrases<I, S>(texts: I) -> Vec<Phrase>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts
        .into_iter()
        .map(|text| Phrase::default_for(text.as_ref()))
        .collect()
}

/// A catalog entity that may be the referent of a mention.
///
/// Equality and hashing use `name` only. The empty name is reserved for the
/// "no link" sentinel, see [`Candidate::empty`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    name: String,
    /// textual profile used for vectorization
    text: String,
    /// knowledge-base identifier
    wiki: Option<String>,
    /// alternate URIs
    uris: BTreeSet<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Candidate {
            name: name.into(),
            text: text.into(),
            wiki: None,
            uris: BTreeSet::new(),
        }
    }

    pub fn with_wiki(self, wiki: impl Into<String>) -> Self {
        Candidate {
            wiki: Some(wiki.into()),
            ..self
        }
    }

    pub fn with_uris<I, S>(self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Candidate {
            uris: uris.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// The "no link found" sentinel.
    pub fn empty() -> Self {
        Candidate::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn wiki(&self) -> Option<&str> {
        self.wiki.as_deref()
    }

    #[inline]
    pub fn uris(&self) -> &BTreeSet<String> {
        &self.uris
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Ranking outcome for one mention: the winning candidate, its combined
/// score and its resolved link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub link: String,
}

impl LinkedCandidate {
    /// Empty name, zero score, empty link.
    pub fn empty() -> Self {
        LinkedCandidate {
            candidate: Candidate::empty(),
            score: 0.0,
            link: String::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidate.is_empty()
    }
}
