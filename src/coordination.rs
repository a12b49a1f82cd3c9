//! Coordination analysis.
//!
//! Finds conjunctions and builds coordination structures around them: what is
//! being joined, at what syntactic level, whether order matters, and what the
//! second conjunct borrows from the first (ellipsis). Conjunctions with more
//! than one sense ("but", "while") keep every sense on record and warn rather
//! than silently committing.

use serde::{Deserialize, Serialize};

use crate::lexicon::WordClass;
use crate::morphology;
use crate::span::Span;
use crate::token::{Token, TokenStream, TokenTag, TokenType};
use crate::warnings::AnalysisWarning;

/// The semantic relation a conjunction establishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinationKind {
    /// "and": both apply, order free
    Parallel,
    /// "then", "and then": second follows first
    Sequential,
    /// "but", "yet": second contrasts with first
    Contrastive,
    /// "or", "nor": one of the two
    Alternative,
    /// "if", "unless": second gated on first
    Conditional,
    /// "while": both at once
    Concurrent,
    /// "plus", "as well as": second added to first
    Additive,
    /// "instead of", "not ... but": second replaces first
    Corrective,
    /// "such as": second exemplifies first
    Elaborative,
    /// "so", "so that", "because": second motivated by first
    Causal,
}

/// The syntactic level at which the conjuncts attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinationLevel {
    Sentence,
    VerbPhrase,
    Adjective,
    NounPhrase,
    PrepPhrase,
    Mixed,
}

/// What the second conjunct borrows from the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EllipsisPattern {
    /// "boost the bass and the drums" — verb carried over
    SharedVerb,
    /// "boost the bass in the chorus and the verse" — verb and preposition
    SharedVerbAndPreposition,
    /// "compress and brighten the vocals" — object carried backward
    SharedObject,
    /// "boost the bass and cut the drums in the chorus" — scope carried backward
    SharedScope,
    None,
}

/// One conjunct with surface provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    pub text: String,
    pub span: Span,
}

/// A coordination structure recovered from the utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCoordination {
    pub kind: CoordinationKind,
    pub level: CoordinationLevel,
    /// The conjunction surface as written
    pub conjunction: String,
    pub constituents: Vec<Constituent>,
    /// True when the conjuncts cannot be reordered without changing meaning
    pub order_strict: bool,
    /// True when a correlative opener ("both", "either", "not") was linked
    pub correlative_used: bool,
    pub ellipsis: EllipsisPattern,
    pub span: Span,
    pub confidence: f64,
    pub warnings: Vec<AnalysisWarning>,
}

// (kind, priority, order_strict); multiple entries per surface mean the
// conjunction is ambiguous between senses.
type Sense = (CoordinationKind, u8, bool);

fn senses_for(text: &str) -> &'static [Sense] {
    match text {
        "and" => &[(CoordinationKind::Parallel, 2, false)],
        "and then" => &[(CoordinationKind::Sequential, 2, true)],
        "then" => &[(CoordinationKind::Sequential, 1, true)],
        "or" => &[(CoordinationKind::Alternative, 2, false)],
        "nor" => &[(CoordinationKind::Alternative, 1, false)],
        "but" => &[
            (CoordinationKind::Contrastive, 2, false),
            (CoordinationKind::Corrective, 1, true),
        ],
        "yet" => &[(CoordinationKind::Contrastive, 1, false)],
        "while" => &[
            (CoordinationKind::Concurrent, 2, false),
            (CoordinationKind::Contrastive, 1, false),
        ],
        "plus" => &[(CoordinationKind::Additive, 1, false)],
        "as well as" => &[(CoordinationKind::Additive, 2, false)],
        "along with" => &[(CoordinationKind::Additive, 1, false)],
        "together with" => &[(CoordinationKind::Additive, 1, false)],
        "instead of" => &[(CoordinationKind::Corrective, 2, true)],
        "rather than" => &[(CoordinationKind::Corrective, 2, true)],
        "such as" => &[(CoordinationKind::Elaborative, 1, false)],
        "so" => &[(CoordinationKind::Causal, 1, true)],
        "so that" => &[(CoordinationKind::Causal, 2, true)],
        "because" => &[(CoordinationKind::Causal, 1, false)],
        "since" => &[(CoordinationKind::Causal, 1, false)],
        "if" => &[(CoordinationKind::Conditional, 2, true)],
        "unless" => &[(CoordinationKind::Conditional, 2, true)],
        "as soon as" => &[(CoordinationKind::Conditional, 1, true)],
        _ => &[],
    }
}

const CORRELATIVE_PAIRS: &[(&str, &str)] = &[
    ("both", "and"),
    ("either", "or"),
    ("neither", "nor"),
    ("not", "but"),
    ("first", "then"),
];

/// Openers that grammatically require a partner; the others ("not", "first")
/// stand alone routinely.
const REQUIRED_OPENERS: &[&str] = &["both", "either", "neither"];

/// Builds coordination structures over a token stream.
#[derive(Debug, Default)]
pub struct CoordinationAnalyzer;

impl CoordinationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, stream: &TokenStream) -> Vec<ParsedCoordination> {
        let tokens: Vec<&Token> = stream.iter().collect();
        let conj_positions: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_word_like() && !senses_for(&t.normalized_text).is_empty())
            .map(|(i, _)| i)
            .collect();

        let mut found = Vec::new();
        let mut used_positions: Vec<usize> = Vec::new();

        for &c in &conj_positions {
            if used_positions.contains(&c) {
                continue;
            }
            if let Some(parsed) = self.list_at(stream.source(), &tokens, &conj_positions, c) {
                used_positions.push(c);
                found.push(parsed);
                continue;
            }
            used_positions.push(c);
            found.push(self.binary_at(stream.source(), &tokens, &conj_positions, c));
        }

        self.missing_correlatives(stream.source(), &tokens, &conj_positions, &mut found);
        found
    }

    /// N-way comma list ending in this conjunction: "A, B, and C".
    fn list_at(
        &self,
        source: &str,
        tokens: &[&Token],
        conj_positions: &[usize],
        c: usize,
    ) -> Option<ParsedCoordination> {
        let text = tokens[c].normalized_text.as_str();
        if text != "and" && text != "or" {
            return None;
        }

        let seg_start = segment_start(tokens, conj_positions, c);
        let seg_end = segment_end(tokens, conj_positions, c);

        // Split the left segment on commas; the conjunction splits the tail.
        let mut items: Vec<(usize, usize)> = Vec::new();
        let mut run_start = seg_start;
        for i in seg_start..c {
            if is_comma(tokens[i]) {
                if i > run_start {
                    items.push((run_start, i));
                }
                run_start = i + 1;
            }
        }
        if items.is_empty() {
            return None; // no commas, not a list
        }
        if c > run_start {
            items.push((run_start, c)); // item before the conjunction
        }
        if seg_end > c + 1 {
            items.push((c + 1, seg_end));
        }
        if items.len() < 3 {
            return None;
        }

        let senses = senses_for(text);
        let constituents: Vec<Constituent> = items
            .iter()
            .map(|&(start, end)| constituent(source, &tokens[start..end]))
            .collect();
        let span = match Span::cover(&constituents.iter().map(|c| c.span).collect::<Vec<_>>()) {
            Some(span) => span,
            None => tokens[c].span,
        };

        Some(ParsedCoordination {
            kind: senses[0].0,
            level: list_level(tokens, &items),
            conjunction: tokens[c].original_text.clone(),
            constituents,
            order_strict: false,
            correlative_used: false,
            ellipsis: EllipsisPattern::SharedVerb,
            span,
            confidence: 0.85,
            warnings: Vec::new(),
        })
    }

    /// Two-conjunct coordination around one conjunction.
    fn binary_at(
        &self,
        source: &str,
        tokens: &[&Token],
        conj_positions: &[usize],
        c: usize,
    ) -> ParsedCoordination {
        let seg_start = segment_start(tokens, conj_positions, c);
        let seg_end = segment_end(tokens, conj_positions, c);
        let left = &tokens[seg_start..c];
        let right = &tokens[c + 1..seg_end];

        let text = tokens[c].normalized_text.as_str();
        let senses = senses_for(text);
        let mut warnings = Vec::new();
        let mut correlative_used = false;

        // A correlative opener in the left conjunct settles the sense.
        let mut chosen: Sense = senses[0];
        for &(opener, partner) in CORRELATIVE_PAIRS {
            if partner == text && left.iter().any(|t| t.normalized_text == opener) {
                correlative_used = true;
                if opener == "not" {
                    // "not X but Y" is corrective, not contrastive.
                    if let Some(&corrective) = senses
                        .iter()
                        .find(|(kind, _, _)| *kind == CoordinationKind::Corrective)
                    {
                        chosen = corrective;
                    }
                }
                break;
            }
        }

        if senses.len() > 1 && !correlative_used {
            warnings.push(AnalysisWarning::AmbiguousConjunction {
                conjunction: tokens[c].normalized_text.clone(),
                senses: senses.iter().map(|&(kind, _, _)| kind).collect(),
            });
        }

        let mut constituents = Vec::new();
        if !left.is_empty() {
            constituents.push(constituent(source, left));
        }
        if !right.is_empty() {
            constituents.push(constituent(source, right));
        }
        let mut spans: Vec<Span> = constituents.iter().map(|c| c.span).collect();
        spans.push(tokens[c].span);
        let span = match Span::cover(&spans) {
            Some(span) => span,
            None => tokens[c].span,
        };

        let confidence = if correlative_used {
            0.95
        } else if senses.len() > 1 {
            0.7
        } else {
            0.9
        };

        ParsedCoordination {
            kind: chosen.0,
            level: level_for(chosen.0, left, right),
            conjunction: tokens[c].original_text.clone(),
            constituents,
            order_strict: chosen.2,
            correlative_used,
            ellipsis: ellipsis_for(left, right),
            span,
            confidence,
            warnings,
        }
    }

    /// Correlative openers that never found their partner.
    fn missing_correlatives(
        &self,
        source: &str,
        tokens: &[&Token],
        conj_positions: &[usize],
        found: &mut Vec<ParsedCoordination>,
    ) {
        for (i, token) in tokens.iter().enumerate() {
            let opener = token.normalized_text.as_str();
            if !REQUIRED_OPENERS.contains(&opener) {
                continue;
            }
            let (_, partner) = match CORRELATIVE_PAIRS.iter().find(|&&(o, _)| o == opener) {
                Some(pair) => pair,
                None => continue,
            };
            let partnered = conj_positions
                .iter()
                .any(|&c| c > i && tokens[c].normalized_text == *partner);
            if partnered {
                continue;
            }

            let seg_end = segment_end(tokens, conj_positions, i);
            let rest = &tokens[i + 1..seg_end];
            let mut constituents = Vec::new();
            if !rest.is_empty() {
                constituents.push(constituent(source, rest));
            }
            let span = match constituents.first() {
                Some(c) => token.span.union(c.span),
                None => token.span,
            };
            found.push(ParsedCoordination {
                kind: expected_kind(partner),
                level: CoordinationLevel::Mixed,
                conjunction: token.original_text.clone(),
                constituents,
                order_strict: false,
                correlative_used: false,
                ellipsis: EllipsisPattern::None,
                span,
                confidence: 0.4,
                warnings: vec![AnalysisWarning::MissingCorrelative {
                    opener: token.normalized_text.clone(),
                    expected: (*partner).to_string(),
                }],
            });
        }
    }
}

fn expected_kind(partner: &str) -> CoordinationKind {
    match senses_for(partner).first() {
        Some(&(kind, _, _)) => kind,
        None => CoordinationKind::Parallel,
    }
}

fn is_comma(token: &Token) -> bool {
    token.token_type == TokenType::Punctuation && token.normalized_text == ","
}

fn is_sentence_punct(token: &Token) -> bool {
    token.token_type == TokenType::Punctuation
        && matches!(token.normalized_text.as_str(), "." | ";" | "!" | "?")
}

/// Index where the conjunct segment around `c` begins.
fn segment_start(tokens: &[&Token], conj_positions: &[usize], c: usize) -> usize {
    (0..c)
        .rev()
        .find(|&i| is_sentence_punct(tokens[i]) || conj_positions.contains(&i))
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Index just past the end of the conjunct segment around `c`.
fn segment_end(tokens: &[&Token], conj_positions: &[usize], c: usize) -> usize {
    (c + 1..tokens.len())
        .find(|&i| is_sentence_punct(tokens[i]) || conj_positions.contains(&i))
        .unwrap_or(tokens.len())
}

fn constituent(source: &str, tokens: &[&Token]) -> Constituent {
    let spans: Vec<Span> = tokens.iter().map(|t| t.span).collect();
    let span = Span::cover(&spans).unwrap_or_else(|| Span::new(0, 0));
    Constituent {
        text: span.slice(source).to_string(),
        span,
    }
}

fn has_verb(tokens: &[&Token]) -> bool {
    tokens.iter().any(|t| t.has_tag(TokenTag::Verb))
}

fn has_noun(tokens: &[&Token]) -> bool {
    tokens.iter().any(|t| is_noun(t))
}

fn has_preposition(tokens: &[&Token]) -> bool {
    tokens.iter().any(|t| t.has_tag(TokenTag::Preposition))
}

fn is_noun(token: &Token) -> bool {
    token.is_word_like()
        && morphology::lemmatize(&token.normalized_text).word_class == WordClass::Noun
}

fn is_adjective(token: &Token) -> bool {
    token.has_tag(TokenTag::Adjective)
}

/// First token of the conjunct after an optional determiner.
fn first_content<'a>(tokens: &'a [&'a Token]) -> Option<&'a Token> {
    tokens
        .iter()
        .find(|t| !t.has_tag(TokenTag::Determiner))
        .copied()
}

fn level_for(kind: CoordinationKind, left: &[&Token], right: &[&Token]) -> CoordinationLevel {
    if matches!(
        kind,
        CoordinationKind::Sequential | CoordinationKind::Conditional
    ) {
        return CoordinationLevel::Sentence;
    }

    let left_last = left.last().copied();
    let right_first = right.first().copied();

    if left_last.map_or(false, |t| is_adjective(t))
        && first_content(right).map_or(false, is_adjective)
    {
        return CoordinationLevel::Adjective;
    }
    if has_verb(left) && has_verb(right) {
        return if has_noun(left) && has_noun(right) {
            CoordinationLevel::Sentence
        } else {
            CoordinationLevel::VerbPhrase
        };
    }
    if right_first.map_or(false, |t| t.has_tag(TokenTag::Preposition)) {
        return CoordinationLevel::PrepPhrase;
    }
    if right_first.map_or(false, |t| t.has_tag(TokenTag::Verb)) {
        return CoordinationLevel::VerbPhrase;
    }
    if left_last.map_or(false, is_noun) && first_content(right).map_or(false, is_noun) {
        return CoordinationLevel::NounPhrase;
    }
    CoordinationLevel::Mixed
}

fn list_level(tokens: &[&Token], items: &[(usize, usize)]) -> CoordinationLevel {
    let with_verb = items
        .iter()
        .filter(|&&(start, end)| has_verb(&tokens[start..end]))
        .count();
    if with_verb == items.len() {
        CoordinationLevel::Sentence
    } else if with_verb == 0 || with_verb == 1 {
        // A single leading verb distributes over the list.
        CoordinationLevel::NounPhrase
    } else {
        CoordinationLevel::Mixed
    }
}

fn ellipsis_for(left: &[&Token], right: &[&Token]) -> EllipsisPattern {
    let left_verb = has_verb(left);
    let right_verb = has_verb(right);

    if left_verb && !right_verb {
        if has_preposition(left) && !has_preposition(right) {
            return EllipsisPattern::SharedVerbAndPreposition;
        }
        return EllipsisPattern::SharedVerb;
    }
    if left_verb && right_verb {
        if !has_noun(left) && has_noun(right) {
            return EllipsisPattern::SharedObject;
        }
        if !has_preposition(left) && trailing_prep_phrase(right) {
            return EllipsisPattern::SharedScope;
        }
    }
    EllipsisPattern::None
}

/// True when the conjunct ends in a preposition phrase ("... in the chorus").
fn trailing_prep_phrase(tokens: &[&Token]) -> bool {
    let prep = match tokens
        .iter()
        .rposition(|t| t.has_tag(TokenTag::Preposition))
    {
        Some(i) => i,
        None => return false,
    };
    tokens[prep + 1..].iter().any(|t| is_noun(t)) && tokens[prep + 1..].len() <= 3
}
