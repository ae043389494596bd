use std::collections::BTreeSet;

use crate::error::{LinkerError, Result};

/// Turns a knowledge-base identifier and alternate URIs into one canonical URI.
pub trait LinkResolver {
    fn resolve(&self, wiki: Option<&str>, uris: &BTreeSet<String>) -> Result<String>;
}

impl<F> LinkResolver for F
where
    F: Fn(Option<&str>, &BTreeSet<String>) -> Result<String>,
{
    fn resolve(&self, wiki: Option<&str>, uris: &BTreeSet<String>) -> Result<String> {
        self(wiki, uris)
    }
}

pub const DBPEDIA_RESOURCE: &str = "http://dbpedia.org/resource/";

/// Resolve to a DBpedia resource URI.
///
/// Preference order: an alternate URI already under the resource prefix,
/// then a URI built from the wiki title, then any alternate URI.
#[derive(Debug, Clone)]
pub struct DbpediaResolver {
    prefix: String,
}

impl DbpediaResolver {
    pub fn new() -> Self {
        Self::with_prefix(DBPEDIA_RESOURCE)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        DbpediaResolver {
            prefix: prefix.into(),
        }
    }
}

impl Default for DbpediaResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkResolver for DbpediaResolver {
    fn resolve(&self, wiki: Option<&str>, uris: &BTreeSet<String>) -> Result<String> {
        if let Some(uri) = uris.iter().find(|u| u.starts_with(&self.prefix)) {
            return Ok(uri.clone());
        }
        if let Some(title) = wiki.map(str::trim).filter(|w| !w.is_empty()) {
            return Ok(format!("{}{}", self.prefix, title.replace(' ', "_")));
        }
        uris.iter().next().cloned().ok_or_else(|| LinkerError::Resolve {
            candidate: wiki.unwrap_or_default().to_string(),
            reason: "no wiki identifier and no alternate URIs".to_string(),
        })
    }
}
