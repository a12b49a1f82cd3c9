//! Named reference analysis.
//!
//! Finds user-given names in the utterance: quoted names ("the 'Glass Pad'
//! track"), naming-verb patterns ("the track called Warm Keys"), renames
//! ("rename 'Old' to 'New'"), and tag references ("#vocals"). Quoted names
//! resolve exactly; an unquoted name is only trusted after a naming verb, and
//! even then binding it is flagged as requiring fuzzy matching.

use serde::{Deserialize, Serialize};

use crate::lexicon::{self, EntityType};
use crate::morphology;
use crate::span::Span;
use crate::token::{Token, TokenStream, TokenType};
use crate::warnings::AnalysisWarning;

/// The quoting convention used around a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStyle {
    Single,
    Double,
    Smart,
    Backtick,
}

/// The surface pattern the reference was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamedReferenceType {
    /// A quoted name on its own: "'Glass Pad'"
    Standalone,
    /// Quoted name with a type word: "the 'Glass Pad' track"
    QuotedWithType,
    /// "the track called 'Glass Pad'" or an unquoted name after "called"
    CalledPattern,
    /// A name being assigned: "call it 'Glass Pad'", the target of a rename
    NamingCommand,
    /// The source of a rename: first name in "rename 'X' to 'Y'"
    RenamingCommand,
    /// "find 'Glass Pad'"
    SearchCommand,
}

/// What the utterance wants done with the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingOperation {
    /// Use the name to locate an existing entity
    ReferenceByName,
    /// Give an entity this name
    AssignName,
    /// Replace an entity's current name
    Rename,
    /// Strip an entity's name
    RemoveName,
    /// Search the project for entities matching the name
    SearchByName,
}

/// How a downstream resolver should bind the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStrategy {
    /// Quoted names bind exactly, case and all
    ExactMatch,
    /// Unquoted names tolerate case and minor spelling drift
    FuzzyMatch,
    /// Tag references bind against the tag index
    TagMatch,
}

/// One named reference with surface provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedReference {
    /// The name itself, case preserved, without delimiters
    pub name: String,
    pub surface: String,
    pub ref_type: NamedReferenceType,
    /// The quoting style, when the name was quoted
    pub quote_style: Option<QuoteStyle>,
    pub entity_type_hint: Option<EntityType>,
    /// Lemma of the naming verb that introduced the reference
    pub naming_verb: Option<String>,
    pub operation: NamingOperation,
    pub resolution_strategy: ResolutionStrategy,
    pub span: Span,
    pub confidence: f64,
    pub warnings: Vec<AnalysisWarning>,
}

// Naming-verb lemmas and the operation their imperative form performs.
const NAMING_VERBS: &[(&str, NamingOperation)] = &[
    ("call", NamingOperation::AssignName),
    ("name", NamingOperation::AssignName),
    ("label", NamingOperation::AssignName),
    ("title", NamingOperation::AssignName),
    ("rename", NamingOperation::Rename),
    ("retitle", NamingOperation::Rename),
    ("find", NamingOperation::SearchByName),
    ("search", NamingOperation::SearchByName),
    ("locate", NamingOperation::SearchByName),
    ("unname", NamingOperation::RemoveName),
    ("unlabel", NamingOperation::RemoveName),
];

/// Detects named references over a token stream.
#[derive(Debug, Default)]
pub struct NamedReferenceAnalyzer;

impl NamedReferenceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, stream: &TokenStream) -> Vec<NamedReference> {
        let tokens: Vec<&Token> = stream.iter().collect();
        let mut found: Vec<NamedReference> = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];
            match token.token_type {
                TokenType::Quote => {
                    found.push(quoted_reference(stream.source(), &tokens, i, &found));
                    i += 1;
                }
                TokenType::Operator
                    if matches!(token.normalized_text.as_str(), "#" | "@") =>
                {
                    if let Some(reference) = tag_reference(stream.source(), &tokens, i) {
                        found.push(reference);
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                _ => {
                    if let Some((reference, consumed)) =
                        unquoted_after_verb(stream.source(), &tokens, i)
                    {
                        found.push(reference);
                        i += consumed;
                    } else {
                        i += 1;
                    }
                }
            }
        }

        found
    }
}

fn quote_style_of(original: &str) -> Option<QuoteStyle> {
    match original.chars().next()? {
        '\'' => Some(QuoteStyle::Single),
        '"' => Some(QuoteStyle::Double),
        '`' => Some(QuoteStyle::Backtick),
        '\u{2018}' | '\u{201C}' => Some(QuoteStyle::Smart),
        _ => None,
    }
}

/// The verb entry for a token, when it is a naming verb.
struct VerbContext {
    lemma: String,
    operation: NamingOperation,
    /// Past/participle form ("called") references rather than assigns
    is_past: bool,
}

fn naming_verb_context(token: &Token) -> Option<VerbContext> {
    if !token.is_word_like() {
        return None;
    }
    let lemma = morphology::lemmatize(&token.normalized_text);
    let &(_, operation) = NAMING_VERBS
        .iter()
        .find(|(verb, _)| *verb == lemma.lemma)?;
    let is_past = matches!(
        lemma.inflection,
        lexicon::Inflection::Past | lexicon::Inflection::PastParticiple
    );
    Some(VerbContext {
        lemma: lemma.lemma,
        operation,
        is_past,
    })
}

/// Entity hint from a type word, only when the word is unambiguous.
fn entity_hint(token: Option<&&Token>) -> Option<EntityType> {
    let token = token?;
    if !token.is_word_like() {
        return None;
    }
    let lemma = morphology::lemmatize(&token.normalized_text).lemma;
    match lexicon::lookup_noun_types(&lemma) {
        [single] => Some(*single),
        _ => None,
    }
}

fn quoted_reference(
    source: &str,
    tokens: &[&Token],
    at: usize,
    found: &[NamedReference],
) -> NamedReference {
    let token = tokens[at];
    let name = token.normalized_text.clone();
    let quote_style = quote_style_of(&token.original_text);
    let prev = at.checked_sub(1).and_then(|i| tokens.get(i)).copied();
    let next = tokens.get(at + 1).copied();

    // "rename 'X' to 'Y'" — this quote is the new name.
    let after_rename_to = prev.map_or(false, |t| t.normalized_text == "to")
        && found
            .iter()
            .any(|r| r.operation == NamingOperation::Rename && r.span.end < token.span.start);
    if after_rename_to {
        return NamedReference {
            name,
            surface: token.original_text.clone(),
            ref_type: NamedReferenceType::NamingCommand,
            quote_style,
            entity_type_hint: None,
            naming_verb: None,
            operation: NamingOperation::AssignName,
            resolution_strategy: ResolutionStrategy::ExactMatch,
            span: token.span,
            confidence: 0.95,
            warnings: Vec::new(),
        };
    }

    // The verb may sit one token back behind a pronoun or determiner:
    // "call it 'Glass Pad'", "name the bus 'Drums'".
    let (verb_at, verb_context) = match prev.and_then(naming_verb_context) {
        Some(context) => (at.wrapping_sub(1), Some(context)),
        None => {
            let skippable = prev.map_or(false, |t| {
                t.is_word_like()
                    && (lexicon::is_pronoun(&t.normalized_text)
                        || lexicon::is_determiner(&t.normalized_text)
                        || lexicon::is_known_noun(&t.normalized_text))
            });
            let behind = at.checked_sub(2).and_then(|i| tokens.get(i)).copied();
            match behind.and_then(naming_verb_context) {
                Some(context) if skippable => (at - 2, Some(context)),
                _ => (at, None),
            }
        }
    };

    if let Some(context) = verb_context {
        let (ref_type, operation) = match context.operation {
            NamingOperation::Rename => {
                (NamedReferenceType::RenamingCommand, NamingOperation::Rename)
            }
            NamingOperation::SearchByName => {
                (NamedReferenceType::SearchCommand, NamingOperation::SearchByName)
            }
            NamingOperation::RemoveName => {
                (NamedReferenceType::NamingCommand, NamingOperation::RemoveName)
            }
            NamingOperation::AssignName | NamingOperation::ReferenceByName => {
                if context.is_past {
                    // "the track called 'Glass Pad'"
                    (NamedReferenceType::CalledPattern, NamingOperation::ReferenceByName)
                } else {
                    (NamedReferenceType::NamingCommand, NamingOperation::AssignName)
                }
            }
        };
        // "the track called 'X'" — the type word sits before the verb.
        let hint = entity_hint(verb_at.checked_sub(1).and_then(|i| tokens.get(i)));
        let verb_token = tokens.get(verb_at).copied().unwrap_or(token);
        let span = verb_token.span.union(token.span);
        return NamedReference {
            name,
            surface: span.slice(source).to_string(),
            ref_type,
            quote_style,
            entity_type_hint: hint,
            naming_verb: Some(context.lemma),
            operation,
            resolution_strategy: ResolutionStrategy::ExactMatch,
            span,
            confidence: 0.95,
            warnings: Vec::new(),
        };
    }

    // "the 'Glass Pad' track" — a type word right after the quote.
    if let Some(hint) = entity_hint(next.as_ref()) {
        let next_token = match next {
            Some(t) => t,
            None => token,
        };
        let span = token.span.union(next_token.span);
        return NamedReference {
            name,
            surface: span.slice(source).to_string(),
            ref_type: NamedReferenceType::QuotedWithType,
            quote_style,
            entity_type_hint: Some(hint),
            naming_verb: None,
            operation: NamingOperation::ReferenceByName,
            resolution_strategy: ResolutionStrategy::ExactMatch,
            span,
            confidence: 0.95,
            warnings: Vec::new(),
        };
    }

    NamedReference {
        name,
        surface: token.original_text.clone(),
        ref_type: NamedReferenceType::Standalone,
        quote_style,
        entity_type_hint: None,
        naming_verb: None,
        operation: NamingOperation::ReferenceByName,
        resolution_strategy: ResolutionStrategy::ExactMatch,
        span: token.span,
        confidence: 0.9,
        warnings: Vec::new(),
    }
}

/// `#name` / `@name` with the sigil touching the word.
fn tag_reference(source: &str, tokens: &[&Token], at: usize) -> Option<NamedReference> {
    let sigil = tokens[at];
    let word = tokens.get(at + 1)?;
    if word.token_type != TokenType::Word || sigil.span.end != word.span.start {
        return None;
    }
    let span = sigil.span.union(word.span);
    Some(NamedReference {
        name: word.original_text.clone(),
        surface: span.slice(source).to_string(),
        ref_type: NamedReferenceType::Standalone,
        quote_style: None,
        entity_type_hint: None,
        naming_verb: None,
        operation: NamingOperation::ReferenceByName,
        resolution_strategy: ResolutionStrategy::TagMatch,
        span,
        confidence: 0.9,
        warnings: Vec::new(),
    })
}

/// An unquoted capitalized run after a naming verb: "the track called Warm
/// Keys". Without the verb a capitalized run is left alone.
fn unquoted_after_verb(
    source: &str,
    tokens: &[&Token],
    at: usize,
) -> Option<(NamedReference, usize)> {
    let context = naming_verb_context(tokens[at])?;
    let mut name_tokens: Vec<&Token> = Vec::new();
    for offset in 1..=4usize {
        match tokens.get(at + offset) {
            Some(t) if t.token_type == TokenType::Word && is_capitalized(t) => {
                name_tokens.push(t);
            }
            _ => break,
        }
    }
    // "call it Something": skip one pronoun/determiner between verb and name.
    let mut skipped = 0;
    if name_tokens.is_empty() {
        if let Some(t) = tokens.get(at + 1) {
            if t.is_word_like()
                && (lexicon::is_pronoun(&t.normalized_text)
                    || lexicon::is_determiner(&t.normalized_text))
            {
                skipped = 1;
                for offset in 2..=5usize {
                    match tokens.get(at + offset) {
                        Some(t) if t.token_type == TokenType::Word && is_capitalized(t) => {
                            name_tokens.push(t);
                        }
                        _ => break,
                    }
                }
            }
        }
    }
    if name_tokens.is_empty() {
        return None;
    }

    let name_span = match Span::cover(&name_tokens.iter().map(|t| t.span).collect::<Vec<_>>()) {
        Some(span) => span,
        None => return None,
    };
    let name = name_span.slice(source).to_string();
    let span = tokens[at].span.union(name_span);
    let (ref_type, operation) = if context.is_past {
        (NamedReferenceType::CalledPattern, NamingOperation::ReferenceByName)
    } else {
        (NamedReferenceType::NamingCommand, context.operation)
    };

    let reference = NamedReference {
        name: name.clone(),
        surface: span.slice(source).to_string(),
        ref_type,
        quote_style: None,
        entity_type_hint: entity_hint(tokens.get(at.wrapping_sub(1))),
        naming_verb: Some(context.lemma),
        operation,
        resolution_strategy: ResolutionStrategy::FuzzyMatch,
        span,
        confidence: 0.7,
        warnings: vec![AnalysisWarning::FuzzyResolutionRequired { name }],
    };
    Some((reference, 1 + skipped + name_tokens.len()))
}

fn is_capitalized(token: &Token) -> bool {
    token
        .original_text
        .chars()
        .next()
        .map_or(false, char::is_uppercase)
}
