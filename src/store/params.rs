use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::vectorizer::tfidf::Weighting;

/// What ranking does with a candidate that has no row in the vector matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnindexedPolicy {
    /// Score it with row 0 and warn. Row 0 belongs to another candidate.
    #[default]
    RowZero,
    /// Leave it out of scoring and of the final ranking.
    Skip,
}

fn default_true() -> bool {
    true
}

/// Flat key/value configuration persisted as `params.json`.
///
/// Keys this crate does not know are kept in `extra` and written back on
/// the next save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkerParams {
    /// TF-IDF weighting when true, raw term counts otherwise
    #[serde(default = "default_true")]
    pub tfidf: bool,
    /// Multiply similarity by the lexical overlap of name and mention
    #[serde(default = "default_true")]
    pub use_overlap: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub unindexed_candidates: UnindexedPolicy,

    // written after training
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_phrases: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_candidates: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<(usize, usize)>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for LinkerParams {
    fn default() -> Self {
        LinkerParams {
            tfidf: true,
            use_overlap: true,
            description: String::new(),
            sublinear_tf: false,
            unindexed_candidates: UnindexedPolicy::default(),
            num_phrases: None,
            num_candidates: None,
            shape: None,
            extra: Map::new(),
        }
    }
}

impl LinkerParams {
    /// Weighting scheme these params select
    pub fn weighting(&self) -> Weighting {
        Weighting::from_params(self.tfidf, self.sublinear_tf)
    }

    /// Overwrite individual keys; keys not in `overrides` keep their value.
    pub fn merge(&mut self, overrides: &Map<String, Value>) -> Result<()> {
        let mut current = match serde_json::to_value(&*self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in overrides {
            current.insert(key.clone(), value.clone());
        }
        *self = serde_json::from_value(Value::Object(current))?;
        Ok(())
    }

    /// `key: value` lines for logging
    pub fn describe(&self) -> Vec<String> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect(),
            _ => Vec::new(),
        }
    }
}
