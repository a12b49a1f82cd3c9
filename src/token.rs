//! Tokens and token streams produced by the span tokenizer.
//!
//! Tokens are created once by [`crate::tokenizer::tokenize`] and are immutable
//! afterwards. A merged multi-word token keeps the spans of the raw tokens it
//! absorbed in `component_spans`; merging never loses position information.

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// Shape-based classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// A run of letters/digits (with internal apostrophes or hyphens)
    Word,
    /// A digit run, optionally with one decimal point ("8", "3.5")
    Number,
    /// A digit run with an agreeing ordinal suffix ("2nd", "21st")
    Ordinal,
    /// A single punctuation character
    Punctuation,
    /// A quote-delimited string, delimiters included in the span
    Quote,
    /// A maximal run of operator characters ("+", "->", "%")
    Operator,
    /// A merged multi-word idiom ("and then", "every other")
    MultiWord,
    /// A word containing an internal apostrophe ("don't")
    Contraction,
    /// Anything the scanner could not place; never dropped
    Unknown,
}

/// Heuristic part-of-speech-like tags attached by the tokenizer from closed
/// word lists. A token may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenTag {
    Verb,
    Adjective,
    Preposition,
    Determiner,
    Pronoun,
    Conjunction,
    Negation,
    Degree,
    Question,
    Modal,
    NumberWord,
    UnitWord,
}

/// A single token with full provenance back to the source string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Shape classification
    pub token_type: TokenType,
    /// Lowercased text with smart quotes/dashes/ellipses folded to ASCII.
    /// For a `Quote` token this is the inner text without the delimiters.
    pub normalized_text: String,
    /// The exact source slice this token covers
    pub original_text: String,
    /// Byte span into the original source
    pub span: Span,
    /// Position in the primary (whitespace-filtered) token sequence
    pub index: usize,
    /// Heuristic tags from closed word lists
    pub tags: Vec<TokenTag>,
    /// True if this token was produced by a multi-word idiom merge
    pub merged: bool,
    /// Spans of the raw tokens a merged token absorbed
    pub component_spans: Option<Vec<Span>>,
}

impl Token {
    /// True if the token carries the given tag.
    pub fn has_tag(&self, tag: TokenTag) -> bool {
        self.tags.contains(&tag)
    }

    /// True for token types that behave like words in grammar analysis.
    pub fn is_word_like(&self) -> bool {
        matches!(
            self.token_type,
            TokenType::Word | TokenType::MultiWord | TokenType::Contraction
        )
    }
}

/// The ordered token stream for one utterance.
///
/// `tokens` is the primary sequence the analyzers consume; whitespace runs are
/// kept as bare spans so the original text can be reconstructed exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenStream {
    source: String,
    /// Non-whitespace tokens, in source order, indexed by `Token::index`
    pub tokens: Vec<Token>,
    /// Whitespace runs, in source order
    pub whitespace: Vec<Span>,
}

impl TokenStream {
    pub(crate) fn new(source: String, tokens: Vec<Token>, whitespace: Vec<Span>) -> Self {
        Self {
            source,
            tokens,
            whitespace,
        }
    }

    /// The original source string.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of non-whitespace tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the stream holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Iterate the primary token sequence.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// The covering span of a token index range, if non-empty.
    pub fn span_of(&self, range: std::ops::Range<usize>) -> Option<Span> {
        let spans: Vec<Span> = self.tokens.get(range)?.iter().map(|t| t.span).collect();
        Span::cover(&spans)
    }

    /// Source slice covered by a token index range.
    pub fn slice_of(&self, range: std::ops::Range<usize>) -> Option<&str> {
        self.span_of(range).map(|s| s.slice(&self.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: usize, index: usize) -> Token {
        Token {
            token_type: TokenType::Word,
            normalized_text: text.to_lowercase(),
            original_text: text.to_string(),
            span: Span::new(start, start + text.len()),
            index,
            tags: Vec::new(),
            merged: false,
            component_spans: None,
        }
    }

    #[test]
    fn span_of_covers_token_range() {
        let stream = TokenStream::new(
            "boost the bass".to_string(),
            vec![word("boost", 0, 0), word("the", 6, 1), word("bass", 10, 2)],
            vec![Span::new(5, 6), Span::new(9, 10)],
        );
        assert_eq!(stream.span_of(0..2), Some(Span::new(0, 9)));
        assert_eq!(stream.slice_of(1..3), Some("the bass"));
        assert_eq!(stream.span_of(1..1), None);
    }

    #[test]
    fn word_like_covers_merged_and_contractions() {
        let mut t = word("don't", 0, 0);
        t.token_type = TokenType::Contraction;
        assert!(t.is_word_like());
        t.token_type = TokenType::Number;
        assert!(!t.is_word_like());
    }
}
