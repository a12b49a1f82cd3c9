//! Multi-word idiom merging.
//!
//! A fixed table of known idioms ("and then", "instead of", "every other") is
//! matched greedily left-to-right over the raw token stream. A match replaces
//! the consumed tokens with one `MultiWord` token whose span is the union of
//! the originals and whose `component_spans` records each original span, so
//! merging never loses position information. Consumed positions are advanced
//! past the match, so overlap is impossible.

use once_cell::sync::Lazy;

use crate::span::Span;
use crate::token::{Token, TokenTag, TokenType};

/// One idiom in the merge table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IdiomEntry {
    /// The constituent words, lowercased
    pub words: &'static [&'static str],
    /// Higher wins among same-length candidates at one position
    pub priority: u8,
    /// Tags the merged token inherits from the idiom entry
    pub tags: &'static [TokenTag],
}

const IDIOMS: &[IdiomEntry] = &[
    IdiomEntry { words: &["and", "then"], priority: 2, tags: &[TokenTag::Conjunction] },
    IdiomEntry { words: &["rather", "than"], priority: 1, tags: &[TokenTag::Conjunction] },
    IdiomEntry { words: &["instead", "of"], priority: 1, tags: &[TokenTag::Conjunction] },
    IdiomEntry { words: &["as", "well", "as"], priority: 1, tags: &[TokenTag::Conjunction] },
    IdiomEntry { words: &["as", "soon", "as"], priority: 1, tags: &[TokenTag::Conjunction] },
    IdiomEntry { words: &["so", "that"], priority: 1, tags: &[TokenTag::Conjunction] },
    IdiomEntry { words: &["every", "other"], priority: 2, tags: &[TokenTag::Determiner] },
    IdiomEntry { words: &["every", "single"], priority: 1, tags: &[TokenTag::Determiner] },
    IdiomEntry { words: &["at", "least"], priority: 2, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["at", "most"], priority: 2, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["no", "more", "than"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["no", "less", "than"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["up", "to"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["more", "than"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["less", "than"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["all", "the", "way"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["a", "bit"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["a", "little"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["kind", "of"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["sort", "of"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["nothing", "but"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["give", "or", "take"], priority: 1, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["more", "or", "less"], priority: 2, tags: &[TokenTag::Degree] },
    IdiomEntry { words: &["such", "as"], priority: 1, tags: &[TokenTag::Preposition] },
    IdiomEntry { words: &["except", "for"], priority: 1, tags: &[TokenTag::Preposition] },
    IdiomEntry { words: &["other", "than"], priority: 1, tags: &[TokenTag::Preposition] },
    IdiomEntry { words: &["along", "with"], priority: 1, tags: &[TokenTag::Preposition] },
    IdiomEntry { words: &["together", "with"], priority: 1, tags: &[TokenTag::Preposition] },
    IdiomEntry { words: &["middle", "eight"], priority: 1, tags: &[] },
    IdiomEntry { words: &["the", "rest"], priority: 1, tags: &[TokenTag::Pronoun] },
];

/// The match table, sorted once: longest first, then highest priority.
///
/// The sort is *stable*, so two idioms of equal length and priority resolve
/// by table order — an explicit tie-break rather than incidental iteration
/// order.
static SORTED_IDIOMS: Lazy<Vec<IdiomEntry>> = Lazy::new(|| sort_idioms(IDIOMS.to_vec()));

fn sort_idioms(mut idioms: Vec<IdiomEntry>) -> Vec<IdiomEntry> {
    idioms.sort_by(|a, b| {
        b.words
            .len()
            .cmp(&a.words.len())
            .then(b.priority.cmp(&a.priority))
    });
    idioms
}

/// Greedy left-to-right merge over a classified token stream.
///
/// At each position the longest, highest-priority idiom whose word sequence
/// matches case-insensitively is taken; its tokens collapse into a single
/// `MultiWord` token and scanning resumes past the match.
pub(crate) fn merge_idioms(source: &str, tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        match match_at(&tokens, i) {
            Some(entry) => {
                let consumed = &tokens[i..i + entry.words.len()];
                let component_spans: Vec<Span> = consumed.iter().map(|t| t.span).collect();
                let span = Span::cover(&component_spans)
                    .unwrap_or_else(|| consumed[0].span);
                merged.push(Token {
                    token_type: TokenType::MultiWord,
                    normalized_text: entry.words.join(" "),
                    original_text: span.slice(source).to_string(),
                    span,
                    index: 0, // reindexed by the tokenizer after merging
                    tags: entry.tags.to_vec(),
                    merged: true,
                    component_spans: Some(component_spans),
                });
                i += entry.words.len();
            }
            None => {
                merged.push(tokens[i].clone());
                i += 1;
            }
        }
    }

    merged
}

fn match_at(tokens: &[Token], at: usize) -> Option<IdiomEntry> {
    SORTED_IDIOMS
        .iter()
        .find(|entry| {
            tokens.len() - at >= entry.words.len()
                && entry
                    .words
                    .iter()
                    .zip(&tokens[at..])
                    .all(|(word, token)| token.is_word_like() && token.normalized_text == *word)
        })
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: usize) -> Token {
        Token {
            token_type: TokenType::Word,
            normalized_text: text.to_lowercase(),
            original_text: text.to_string(),
            span: Span::new(start, start + text.len()),
            index: 0,
            tags: Vec::new(),
            merged: false,
            component_spans: None,
        }
    }

    fn words(source: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for part in source.split(' ') {
            tokens.push(word(part, offset));
            offset += part.len() + 1;
        }
        tokens
    }

    #[test]
    fn merges_known_idiom_with_component_spans() {
        let source = "boost the bass and then add reverb";
        let merged = merge_idioms(source, words(source));
        let idiom = merged
            .iter()
            .find(|t| t.token_type == TokenType::MultiWord)
            .unwrap();
        assert_eq!(idiom.normalized_text, "and then");
        assert_eq!(idiom.original_text, "and then");
        assert!(idiom.merged);
        let components = idiom.component_spans.as_ref().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].slice(source), "and");
        assert_eq!(components[1].slice(source), "then");
        assert_eq!(idiom.span, components[0].union(components[1]));
    }

    #[test]
    fn longest_idiom_wins_at_a_position() {
        // "no more than" must beat "more than" starting one word later.
        let source = "no more than two bars";
        let merged = merge_idioms(source, words(source));
        assert_eq!(merged[0].normalized_text, "no more than");
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn consumed_positions_cannot_overlap() {
        let source = "kind of sort of bright";
        let merged = merge_idioms(source, words(source));
        let idioms: Vec<&str> = merged
            .iter()
            .filter(|t| t.merged)
            .map(|t| t.normalized_text.as_str())
            .collect();
        assert_eq!(idioms, vec!["kind of", "sort of"]);
    }

    #[test]
    fn case_insensitive_matching() {
        let source = "And Then louder";
        let merged = merge_idioms(source, words(source));
        assert_eq!(merged[0].normalized_text, "and then");
        assert_eq!(merged[0].original_text, "And Then");
    }

    #[test]
    fn no_merge_across_non_word_tokens() {
        let source = "and , then";
        let mut tokens = words(source);
        tokens[1].token_type = TokenType::Punctuation;
        let merged = merge_idioms(source, tokens);
        assert!(merged.iter().all(|t| !t.merged));
    }

    #[test]
    fn equal_priority_ties_resolve_by_table_order() {
        // Two entries with equal length and priority; tags distinguish them.
        let first = IdiomEntry { words: &["up", "to"], priority: 1, tags: &[TokenTag::Degree] };
        let second = IdiomEntry { words: &["up", "to"], priority: 1, tags: &[] };
        let sorted = sort_idioms(vec![first, second]);
        // Stable sort: the earlier table entry stays first.
        assert_eq!(sorted[0].tags, &[TokenTag::Degree]);
        assert!(sorted[1].tags.is_empty());
    }

    #[test]
    fn remerging_canonical_text_is_idempotent() {
        let source = "every other";
        let once = merge_idioms(source, words(source));
        assert_eq!(once.len(), 1);
        let again = merge_idioms(source, once.clone());
        assert_eq!(once, again);
    }
}
