use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TokenizerError {
    #[error("No tokens found in input")]
    NoTokens,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub tokens: Vec<String>,
}

impl TokenInfo {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Keeps at most `max_tokens` leading tokens.
    pub fn truncate(&mut self, max_tokens: usize) {
        self.tokens.truncate(max_tokens);
    }
}

pub struct Tokenizer;

impl Tokenizer {
    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        // words (with inner apostrophes) or single punctuation marks
        PATTERN.get_or_init(|| {
            Regex::new(r"[\p{L}\p{N}_]+(?:['’][\p{L}\p{N}_]+)*|[^\s\p{L}\p{N}_]")
                .expect("static token pattern")
        })
    }

    pub fn tokenize(input: &str) -> Result<TokenInfo, TokenizerError> {
        let tokens: Vec<String> = Self::pattern()
            .find_iter(input)
            .map(|m| m.as_str().to_lowercase())
            .collect();

        if tokens.is_empty() {
            return Err(TokenizerError::NoTokens);
        }

        Ok(TokenInfo { tokens })
    }

    /// Token count without allocating the tokens.
    pub fn count(input: &str) -> usize {
        Self::pattern().find_iter(input).count()
    }
}
