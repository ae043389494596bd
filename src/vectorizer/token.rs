use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Word tokens of two or more word characters.
    static ref TOKEN_PATTERN: Regex = Regex::new(r"(?u)\b\w\w+\b").unwrap();
}

/// Split text into lowercase word tokens.
///
/// # Arguments
/// * `text` - raw text
///
/// # Returns
/// * `Vec<String>` - tokens in order of appearance
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// TokenFrequency
/// Counts how often each token occurs in one document.
/// Tokens keep first-seen order.
///
/// # Examples
/// ```
/// use sparse_linker::vectorizer::token::TokenFrequency;
/// let freq = TokenFrequency::from_text("Paris is the capital. Paris!");
/// assert_eq!(freq.token_count("paris"), 2);
/// assert_eq!(freq.token_sum(), 5);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TokenFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    token_count: IndexMap<String, u32>,
    total_token_count: u64,
}

impl TokenFrequency {
    pub fn new() -> Self {
        TokenFrequency {
            token_count: IndexMap::new(),
            total_token_count: 0,
        }
    }

    /// Tokenize `text` and count every token.
    pub fn from_text(text: &str) -> Self {
        let mut freq = TokenFrequency::new();
        freq.add_tokens(&tokenize(text));
        freq
    }

    /// Add one token
    ///
    /// # Arguments
    /// * `token` - token to add
    #[inline]
    pub fn add_token(&mut self, token: &str) -> &mut Self {
        let count = self.token_count.entry(token.to_string()).or_insert(0);
        *count += 1;
        self.total_token_count += 1;
        self
    }

    /// Add many tokens
    ///
    /// # Arguments
    /// * `tokens` - slice of tokens to add
    #[inline]
    pub fn add_tokens<T>(&mut self, tokens: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for token in tokens {
            self.add_token(token.as_ref());
        }
        self
    }

    /// Occurrence count of `token`, zero when absent
    #[inline]
    pub fn token_count(&self, token: &str) -> u32 {
        *self.token_count.get(token).unwrap_or(&0)
    }

    /// Total number of tokens added
    #[inline]
    pub fn token_sum(&self) -> u64 {
        self.total_token_count
    }

    /// Distinct tokens, borrowed, in first-seen order
    #[inline]
    pub fn token_set_ref_str(&self) -> Vec<&str> {
        self.token_count.keys().map(|s| s.as_str()).collect()
    }

    /// `(token, count)` pairs in first-seen order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.token_count.iter().map(|(t, c)| (t.as_str(), *c))
    }

    /// Number of distinct tokens
    #[inline]
    pub fn token_num(&self) -> usize {
        self.token_count.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_drops_single_chars() {
        assert_eq!(
            tokenize("I visited Paris, France in 2019!"),
            vec!["visited", "paris", "france", "in", "2019"]
        );
    }

    #[test]
    fn tokenize_keeps_unicode_words() {
        assert_eq!(tokenize("São Paulo é grande"), vec!["são", "paulo", "grande"]);
    }

    #[test]
    fn counts_follow_first_seen_order() {
        let freq = TokenFrequency::from_text("b a b c b");
        // single characters are not tokens
        assert_eq!(freq.token_sum(), 0);

        let freq = TokenFrequency::from_text("bb aa bb cc bb");
        assert_eq!(freq.token_set_ref_str(), vec!["bb", "aa", "cc"]);
        assert_eq!(freq.token_count("bb"), 3);
        assert_eq!(freq.token_count("zz"), 0);
        assert_eq!(freq.token_num(), 3);
        assert_eq!(freq.token_sum(), 5);
    }
}
