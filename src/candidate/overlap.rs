use std::cmp::Ordering;

use crate::vectorizer::token::tokenize;

/// Bounded string similarity between a candidate name and a mention.
pub trait OverlapScorer {
    /// Score in `[0, 1]`
    fn overlap(&self, name_a: &str, name_b: &str) -> f64;
}

impl<F> OverlapScorer for F
where
    F: Fn(&str, &str) -> f64,
{
    fn overlap(&self, name_a: &str, name_b: &str) -> f64 {
        self(name_a, name_b).clamp(0.0, 1.0)
    }
}

/// Jaccard overlap of the lowercase word-token sets.
///
/// Strings without any word token (e.g. a single letter) score 1 when they
/// are equal ignoring case and surrounding whitespace, otherwise 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenOverlap;

impl OverlapScorer for TokenOverlap {
    fn overlap(&self, name_a: &str, name_b: &str) -> f64 {
        let a = sorted_tokens(name_a);
        let b = sorted_tokens(name_b);
        if a.is_empty() && b.is_empty() {
            let equal = name_a.trim().to_lowercase() == name_b.trim().to_lowercase();
            return if equal && !name_a.trim().is_empty() { 1.0 } else { 0.0 };
        }
        jaccard_sorted(&a, &b)
    }
}

fn sorted_tokens(text: &str) -> Vec<String> {
    let mut tokens = tokenize(text);
    tokens.sort_unstable();
    tokens.dedup();
    tokens
}

fn jaccard_sorted(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (mut i, mut j, mut inter) = (0usize, 0usize, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                inter += 1;
                i += 1;
                j += 1;
            }
        }
    }
    let union = a.len() + b.len() - inter;
    inter as f64 / union as f64
}
