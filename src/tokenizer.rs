//! The span tokenizer: raw text → ordered, span-tagged token stream.
//!
//! Four phases, each deterministic and individually reproducible:
//!
//! 1. *Raw scan* — partitions the input into whitespace runs, quoted spans,
//!    single punctuation characters, operator runs, and word runs. Smart
//!    quotes, en/em dashes, and ellipses are folded to ASCII in each token's
//!    `normalized_text`; spans always index the raw source.
//! 2. *Multi-word merge* — known idioms collapse into `MultiWord` tokens
//!    (see [`crate::idiom`]).
//! 3. *Classify* — assigns a [`TokenType`] by shape.
//! 4. *Tag* — attaches heuristic tags from closed word lists; a merged token
//!    inherits the tags declared by its idiom entry.
//!
//! There is no failure mode: unrecognized graphemes become `Unknown` tokens
//! rather than being dropped or raising an error.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::idiom::merge_idioms;
use crate::lexicon;
use crate::numbers;
use crate::span::Span;
use crate::token::{Token, TokenStream, TokenTag, TokenType};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("valid regex"));
static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)(st|nd|rd|th)$").expect("valid regex"));

/// Tokenize one utterance.
pub fn tokenize(source: &str) -> TokenStream {
    let mut tokens: Vec<Token> = Vec::new();
    let mut whitespace: Vec<Span> = Vec::new();

    for piece in raw_scan(source) {
        match piece.kind {
            RawKind::Whitespace => whitespace.push(piece.span),
            RawKind::Word => tokens.push(build_word_token(source, piece.span)),
            RawKind::Punctuation => tokens.push(build_simple_token(
                source,
                piece.span,
                TokenType::Punctuation,
            )),
            RawKind::Operator => {
                tokens.push(build_simple_token(source, piece.span, TokenType::Operator))
            }
            RawKind::Quote { inner } => tokens.push(build_quote_token(source, piece.span, inner)),
            RawKind::Unknown => {
                tokens.push(build_simple_token(source, piece.span, TokenType::Unknown))
            }
        }
    }

    let mut tokens = merge_idioms(source, tokens);
    for (index, token) in tokens.iter_mut().enumerate() {
        token.index = index;
        attach_tags(token);
    }

    TokenStream::new(source.to_string(), tokens, whitespace)
}

// ============================================================================
// Raw scan
// ============================================================================

struct RawPiece {
    span: Span,
    kind: RawKind,
}

enum RawKind {
    Whitespace,
    Word,
    Punctuation,
    Operator,
    Quote { inner: Span },
    Unknown,
}

fn raw_scan(source: &str) -> Vec<RawPiece> {
    let mut pieces = Vec::new();
    let mut i = 0;

    while i < source.len() {
        let c = match source[i..].chars().next() {
            Some(c) => c,
            None => break,
        };

        if c.is_whitespace() {
            let end = scan_while(source, i, char::is_whitespace);
            pieces.push(RawPiece { span: Span::new(i, end), kind: RawKind::Whitespace });
            i = end;
        } else if c.is_alphanumeric() {
            let end = scan_word(source, i);
            pieces.push(RawPiece { span: Span::new(i, end), kind: RawKind::Word });
            i = end;
        } else if let Some(close) = quote_close_for(c) {
            if apostrophe_like(c) && prev_is_alphanumeric(source, i) {
                // A possessive/trailing apostrophe, not a quote opener.
                let end = i + c.len_utf8();
                pieces.push(RawPiece { span: Span::new(i, end), kind: RawKind::Punctuation });
                i = end;
            } else {
                match find_close(source, i + c.len_utf8(), close) {
                    Some(close_start) => {
                        let end = close_start + close.len_utf8();
                        pieces.push(RawPiece {
                            span: Span::new(i, end),
                            kind: RawKind::Quote {
                                inner: Span::new(i + c.len_utf8(), close_start),
                            },
                        });
                        i = end;
                    }
                    None => {
                        // Unmatched opener degrades to punctuation.
                        let end = i + c.len_utf8();
                        pieces.push(RawPiece {
                            span: Span::new(i, end),
                            kind: RawKind::Punctuation,
                        });
                        i = end;
                    }
                }
            }
        } else if is_operator_char(c) {
            let end = scan_while(source, i, is_operator_char);
            pieces.push(RawPiece { span: Span::new(i, end), kind: RawKind::Operator });
            i = end;
        } else if is_punct_char(c) {
            let end = i + c.len_utf8();
            pieces.push(RawPiece { span: Span::new(i, end), kind: RawKind::Punctuation });
            i = end;
        } else {
            // One whole grapheme per Unknown token, so multi-scalar clusters
            // (emoji with modifiers, malformed input) stay in one piece.
            let grapheme_len = source[i..]
                .graphemes(true)
                .next()
                .map(str::len)
                .unwrap_or(c.len_utf8());
            pieces.push(RawPiece {
                span: Span::new(i, i + grapheme_len),
                kind: RawKind::Unknown,
            });
            i += grapheme_len;
        }
    }

    pieces
}

fn scan_while(source: &str, start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    for (offset, c) in source[start..].char_indices() {
        if pred(c) {
            end = start + offset + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

/// Maximal word run: letters/digits, internal apostrophes and hyphens, and a
/// single decimal point inside a digit run. Trailing `.`/`-`/`'` are excluded
/// because continuation requires an alphanumeric character after them.
fn scan_word(source: &str, start: usize) -> usize {
    let mut end = start;
    let mut all_digits = true;
    let mut seen_dot = false;

    let mut chars = source[start..].char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        let abs = start + offset;

        let take = if c.is_alphanumeric() {
            if !c.is_ascii_digit() {
                all_digits = false;
            }
            true
        } else if (c == '\'' || c == '\u{2019}') && next.map_or(false, char::is_alphabetic) {
            all_digits = false;
            true
        } else if c == '-' && next.map_or(false, char::is_alphanumeric) {
            all_digits = false;
            true
        } else if c == '.' && all_digits && !seen_dot && next.map_or(false, |n| n.is_ascii_digit())
        {
            seen_dot = true;
            true
        } else {
            false
        };

        if take {
            end = abs + c.len_utf8();
        } else {
            break;
        }
    }

    end
}

fn quote_close_for(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\'' => Some('\''),
        '`' => Some('`'),
        '\u{201C}' => Some('\u{201D}'), // “ ”
        '\u{2018}' => Some('\u{2019}'), // ‘ ’
        _ => None,
    }
}

fn apostrophe_like(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

fn prev_is_alphanumeric(source: &str, at: usize) -> bool {
    source[..at].chars().next_back().map_or(false, char::is_alphanumeric)
}

/// Find the closing delimiter, skipping word-internal apostrophes when the
/// delimiter is an apostrophe-like character.
fn find_close(source: &str, from: usize, close: char) -> Option<usize> {
    for (offset, c) in source[from..].char_indices() {
        if c == close {
            let at = from + offset;
            if apostrophe_like(close) {
                let followed_by_letter = source[at + c.len_utf8()..]
                    .chars()
                    .next()
                    .map_or(false, char::is_alphabetic);
                if prev_is_alphanumeric(source, at) && followed_by_letter {
                    continue; // "don't" inside the quoted span
                }
            }
            return Some(at);
        }
    }
    None
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '=' | '<' | '>' | '#' | '@' | '&' | '%' | '^' | '~' | '|'
    ) || matches!(c, '\u{2013}' | '\u{2014}') // – —
}

fn is_punct_char(c: char) -> bool {
    matches!(
        c,
        ',' | '.' | '!' | '?' | ';' | ':' | '(' | ')' | '[' | ']' | '{' | '}'
    ) || c == '\u{2026}' // …
}

// ============================================================================
// Token construction: classify + normalize
// ============================================================================

/// Fold smart punctuation to ASCII equivalents.
fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2015}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{A0}' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

fn build_word_token(source: &str, span: Span) -> Token {
    let original = span.slice(source);
    let normalized = fold(original).to_lowercase();
    let token_type = classify_word(&normalized);
    Token {
        token_type,
        normalized_text: normalized,
        original_text: original.to_string(),
        span,
        index: 0,
        tags: Vec::new(),
        merged: false,
        component_spans: None,
    }
}

fn classify_word(normalized: &str) -> TokenType {
    if NUMBER_RE.is_match(normalized) {
        TokenType::Number
    } else if ORDINAL_RE.is_match(normalized) && numbers::parse_ordinal(normalized).is_some() {
        // Suffix must agree with the number: "2nd" yes, "7st" no.
        TokenType::Ordinal
    } else if normalized.contains('\'') {
        TokenType::Contraction
    } else {
        TokenType::Word
    }
}

fn build_simple_token(source: &str, span: Span, token_type: TokenType) -> Token {
    let original = span.slice(source);
    Token {
        token_type,
        normalized_text: fold(original).to_lowercase(),
        original_text: original.to_string(),
        span,
        index: 0,
        tags: Vec::new(),
        merged: false,
        component_spans: None,
    }
}

fn build_quote_token(source: &str, span: Span, inner: Span) -> Token {
    // Quote tokens keep the inner text's case: quoted names bind exactly.
    Token {
        token_type: TokenType::Quote,
        normalized_text: fold(inner.slice(source)),
        original_text: span.slice(source).to_string(),
        span,
        index: 0,
        tags: Vec::new(),
        merged: false,
        component_spans: None,
    }
}

// ============================================================================
// Tagging
// ============================================================================

fn attach_tags(token: &mut Token) {
    if !token.is_word_like() {
        return;
    }
    let text = token.normalized_text.as_str();
    let checks: &[(bool, TokenTag)] = &[
        (lexicon::lookup_verb(text).is_some(), TokenTag::Verb),
        (lexicon::lookup_adjective(text).is_some(), TokenTag::Adjective),
        (lexicon::is_preposition(text), TokenTag::Preposition),
        (lexicon::is_determiner(text), TokenTag::Determiner),
        (lexicon::is_pronoun(text), TokenTag::Pronoun),
        (lexicon::is_conjunction_word(text), TokenTag::Conjunction),
        (lexicon::is_negation(text), TokenTag::Negation),
        (lexicon::is_degree_word(text), TokenTag::Degree),
        (lexicon::is_question_word(text), TokenTag::Question),
        (lexicon::is_modal(text), TokenTag::Modal),
        (lexicon::is_number_word(text), TokenTag::NumberWord),
        (lexicon::is_unit_word(text), TokenTag::UnitWord),
    ];
    for &(hit, tag) in checks {
        if hit && !token.tags.contains(&tag) {
            token.tags.push(tag);
        }
    }
}
