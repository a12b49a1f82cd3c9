//! Quantifier scope analysis.
//!
//! Detects quantified selections ("every chorus", "all the tracks", "two of
//! the verses") and assigns each a scope reading. Where the surface commits
//! to a reading ("every" distributes, "all" collects) the reading is stated
//! with high confidence; where it does not ("some tracks", bare numerals) the
//! reading is left underspecified and a warning lists the candidates.

use serde::{Deserialize, Serialize};

use crate::lexicon::{self, EntityType, WordClass};
use crate::morphology;
use crate::numbers;
use crate::span::Span;
use crate::token::{Token, TokenStream, TokenTag, TokenType};
use crate::warnings::AnalysisWarning;

/// The semantic family of a quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantifierKind {
    /// "every", "each", "all"
    Universal,
    /// "some", "any"
    Existential,
    /// "no", "none", "neither"
    Negative,
    /// "two", "both", "3"
    Numeric,
    /// "most", "half"
    Proportional,
    /// "which", "what"
    Interrogative,
    /// "many", "few", "several"
    Degree,
    /// "at least three", "no more than two"
    Comparative,
    /// "the rest"
    Relative,
    /// Any of the above with an "of the" shell: "two of the verses"
    Partitive,
}

/// How a quantified selection distributes over its restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeReading {
    /// Apply to each member independently ("every chorus")
    Distributive,
    /// Apply to the members as one group ("all the choruses")
    Collective,
    /// A total spread over members without pairing ("three edits across four bars")
    Cumulative,
    /// The surface does not commit; see the attached warning
    Underspecified,
}

/// Entailment direction of the quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Monotonicity {
    Increasing,
    Decreasing,
    NonMonotone,
}

/// An every-Nth selection filter ("every other bar" = step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalFilter {
    pub step: u32,
    pub offset: u32,
}

/// One quantified selection recovered from the utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionPredicate {
    pub quantifier: QuantifierKind,
    /// Lemma of the head noun being quantified over, when one was found
    pub restriction: Option<String>,
    /// Domain entity hints for the restriction (may be empty or ambiguous)
    pub entity_types: Vec<EntityType>,
    pub scope_reading: ScopeReading,
    pub monotonicity: Monotonicity,
    /// Cardinality when the surface states one ("two", "both")
    pub count: Option<f64>,
    pub ordinal_filter: Option<OrdinalFilter>,
    /// Adjective modifiers between quantifier and head ("every *quiet* verse")
    pub modifiers: Vec<String>,
    pub surface: String,
    pub span: Span,
    pub confidence: f64,
    pub warnings: Vec<AnalysisWarning>,
}

/// Detects quantified selections over a token stream.
#[derive(Debug, Default)]
pub struct QuantifierDetector;

impl QuantifierDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, stream: &TokenStream) -> Vec<SelectionPredicate> {
        let tokens: Vec<&Token> = stream.iter().collect();
        let mut found = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            match self.detect_at(stream.source(), &tokens, i) {
                Some((predicate, consumed)) => {
                    found.push(predicate);
                    i += consumed.max(1);
                }
                None => i += 1,
            }
        }

        found
    }

    fn detect_at(
        &self,
        source: &str,
        tokens: &[&Token],
        at: usize,
    ) -> Option<(SelectionPredicate, usize)> {
        let token = tokens[at];
        if !token.is_word_like() {
            return None;
        }

        let seed = trigger_for(token, tokens.get(at + 1).copied())?;
        let mut consumed = seed.trigger_len;
        let mut kind = seed.kind;

        // Partitive shell: "<quantifier> of [the] <noun>".
        if let Some(shell) = partitive_shell(tokens, at + consumed) {
            consumed += shell;
            kind = QuantifierKind::Partitive;
        }

        let head = find_head(tokens, at + consumed);
        let mut warnings = seed.warnings;
        let last_index = match &head {
            Some(head) => at + consumed + head.consumed - 1,
            None => at + seed.trigger_len - 1,
        };
        let span = tokens[at].span.union(tokens[last_index].span);

        // A bare numeral only quantifies when it binds a known noun;
        // otherwise it belongs to the unit parser.
        if seed.numeric_needs_noun && head.as_ref().map_or(true, |h| h.entity_types.is_empty()) {
            return None;
        }

        // Question words and threshold idioms only quantify when they bind a
        // noun: "which tracks" selects, "at least 3 db" is a threshold on a
        // value and belongs to the unit and locality analyzers.
        if matches!(
            kind,
            QuantifierKind::Interrogative | QuantifierKind::Comparative
        ) && head.is_none()
        {
            return None;
        }

        let (restriction, entity_types, modifiers) = match head {
            Some(head) => (Some(head.lemma), head.entity_types, head.modifiers),
            None => (None, Vec::new(), Vec::new()),
        };

        let confidence = if restriction.is_some() {
            seed.confidence
        } else {
            0.6
        };

        if seed.scope_reading == ScopeReading::Underspecified {
            warnings.push(AnalysisWarning::ScopeAmbiguity {
                marker: token.normalized_text.clone(),
                candidates: seed.scope_candidates.clone(),
            });
        }

        let predicate = SelectionPredicate {
            quantifier: kind,
            restriction,
            entity_types,
            scope_reading: seed.scope_reading,
            monotonicity: seed.monotonicity,
            count: seed.count,
            ordinal_filter: seed.ordinal_filter,
            modifiers,
            surface: span.slice(source).to_string(),
            span,
            confidence,
            warnings,
        };
        Some((predicate, last_index - at + 1))
    }
}

struct TriggerSeed {
    kind: QuantifierKind,
    scope_reading: ScopeReading,
    scope_candidates: Vec<ScopeReading>,
    monotonicity: Monotonicity,
    count: Option<f64>,
    ordinal_filter: Option<OrdinalFilter>,
    trigger_len: usize,
    confidence: f64,
    numeric_needs_noun: bool,
    warnings: Vec<AnalysisWarning>,
}

impl TriggerSeed {
    fn committed(kind: QuantifierKind, scope: ScopeReading, mono: Monotonicity) -> Self {
        Self {
            kind,
            scope_reading: scope,
            scope_candidates: Vec::new(),
            monotonicity: mono,
            count: None,
            ordinal_filter: None,
            trigger_len: 1,
            confidence: 0.9,
            numeric_needs_noun: false,
            warnings: Vec::new(),
        }
    }

    fn underspecified(kind: QuantifierKind, mono: Monotonicity) -> Self {
        Self {
            kind,
            scope_reading: ScopeReading::Underspecified,
            scope_candidates: vec![ScopeReading::Distributive, ScopeReading::Collective],
            monotonicity: mono,
            count: None,
            ordinal_filter: None,
            trigger_len: 1,
            confidence: 0.85,
            numeric_needs_noun: false,
            warnings: Vec::new(),
        }
    }
}

fn trigger_for(token: &Token, next: Option<&Token>) -> Option<TriggerSeed> {
    let text = token.normalized_text.as_str();

    // Merged idioms first.
    if token.token_type == TokenType::MultiWord {
        return match text {
            "every other" => {
                let mut seed = TriggerSeed::committed(
                    QuantifierKind::Universal,
                    ScopeReading::Distributive,
                    Monotonicity::Increasing,
                );
                seed.ordinal_filter = Some(OrdinalFilter { step: 2, offset: 0 });
                Some(seed)
            }
            "every single" => Some(TriggerSeed::committed(
                QuantifierKind::Universal,
                ScopeReading::Distributive,
                Monotonicity::Increasing,
            )),
            "the rest" => Some(TriggerSeed::committed(
                QuantifierKind::Relative,
                ScopeReading::Collective,
                Monotonicity::NonMonotone,
            )),
            "at least" | "more than" | "no less than" => comparative(next, Monotonicity::Increasing),
            "at most" | "no more than" | "up to" | "less than" => {
                comparative(next, Monotonicity::Decreasing)
            }
            _ => None,
        };
    }

    match text {
        "every" | "each" => {
            let mut seed = TriggerSeed::committed(
                QuantifierKind::Universal,
                ScopeReading::Distributive,
                Monotonicity::Increasing,
            );
            // "every third bar" selects an every-Nth filter.
            if let Some(step) = next.and_then(|t| numbers::parse_ordinal_word(&t.normalized_text)) {
                seed.ordinal_filter = Some(OrdinalFilter { step, offset: 0 });
                seed.trigger_len = 2;
            }
            Some(seed)
        }
        "all" => Some(TriggerSeed::committed(
            QuantifierKind::Universal,
            ScopeReading::Collective,
            Monotonicity::Increasing,
        )),
        "some" | "any" => Some(TriggerSeed::underspecified(
            QuantifierKind::Existential,
            Monotonicity::Increasing,
        )),
        "most" => Some(TriggerSeed::committed(
            QuantifierKind::Proportional,
            ScopeReading::Collective,
            Monotonicity::NonMonotone,
        )),
        "half" => {
            let mut seed = TriggerSeed::committed(
                QuantifierKind::Proportional,
                ScopeReading::Collective,
                Monotonicity::NonMonotone,
            );
            seed.count = Some(0.5);
            Some(seed)
        }
        "both" => {
            let mut seed = TriggerSeed::committed(
                QuantifierKind::Numeric,
                ScopeReading::Collective,
                Monotonicity::Increasing,
            );
            seed.count = Some(2.0);
            Some(seed)
        }
        "no" | "none" | "neither" => Some(TriggerSeed::committed(
            QuantifierKind::Negative,
            ScopeReading::Collective,
            Monotonicity::Decreasing,
        )),
        "which" | "what" => Some(TriggerSeed::committed(
            QuantifierKind::Interrogative,
            ScopeReading::Collective,
            Monotonicity::NonMonotone,
        )),
        "many" => Some(TriggerSeed::committed(
            QuantifierKind::Degree,
            ScopeReading::Collective,
            Monotonicity::Increasing,
        )),
        "few" => Some(TriggerSeed::committed(
            QuantifierKind::Degree,
            ScopeReading::Collective,
            Monotonicity::Decreasing,
        )),
        "several" => Some(TriggerSeed::committed(
            QuantifierKind::Degree,
            ScopeReading::Collective,
            Monotonicity::NonMonotone,
        )),
        _ => bare_numeral(token),
    }
}

/// A bare numeral quantifies only when it binds a known noun: "two bars" is a
/// selection, "two db" is a unit expression, and "track two" is neither.
/// Without an explicit distributor the reading stays open.
fn bare_numeral(token: &Token) -> Option<TriggerSeed> {
    if token.has_tag(TokenTag::UnitWord) {
        return None;
    }
    let value = match token.token_type {
        TokenType::Number => token.normalized_text.parse::<f64>().ok()?,
        TokenType::Word if token.has_tag(TokenTag::NumberWord) => {
            f64::from(numbers::parse_cardinal_word(&token.normalized_text)?)
        }
        _ => return None,
    };
    let mut seed = TriggerSeed::underspecified(QuantifierKind::Numeric, Monotonicity::NonMonotone);
    seed.scope_candidates = vec![
        ScopeReading::Distributive,
        ScopeReading::Collective,
        ScopeReading::Cumulative,
    ];
    seed.count = Some(value);
    seed.numeric_needs_noun = true;
    Some(seed)
}

/// A degree idiom followed by a numeral: "at least three".
fn comparative(next: Option<&Token>, mono: Monotonicity) -> Option<TriggerSeed> {
    let next = next?;
    let value = numbers::parse_cardinal(&next.normalized_text)?;
    let mut seed = TriggerSeed::committed(
        QuantifierKind::Comparative,
        ScopeReading::Collective,
        mono,
    );
    seed.count = Some(value.value);
    seed.trigger_len = 2;
    Some(seed)
}

/// "of" or "of the" after the trigger.
fn partitive_shell(tokens: &[&Token], at: usize) -> Option<usize> {
    let of = tokens.get(at)?;
    if of.normalized_text != "of" {
        return None;
    }
    match tokens.get(at + 1) {
        Some(t) if t.normalized_text == "the" => Some(2),
        _ => Some(1),
    }
}

struct Head {
    lemma: String,
    entity_types: Vec<EntityType>,
    modifiers: Vec<String>,
    consumed: usize,
}

/// Walk forward from the quantifier, skipping determiners and collecting
/// adjectives, until a known noun appears. Gives up after four tokens.
fn find_head(tokens: &[&Token], from: usize) -> Option<Head> {
    let mut modifiers = Vec::new();

    for offset in 0..4usize {
        let token = tokens.get(from + offset)?;
        if !token.is_word_like() {
            return None;
        }
        let text = token.normalized_text.as_str();
        if text == "the" || text == "of" {
            continue;
        }
        let lemma = morphology::lemmatize(text);
        match lemma.word_class {
            WordClass::Adjective => modifiers.push(lemma.lemma),
            WordClass::Noun => {
                let entity_types = lexicon::lookup_noun_types(&lemma.lemma).to_vec();
                return Some(Head {
                    lemma: lemma.lemma,
                    entity_types,
                    modifiers,
                    consumed: offset + 1,
                });
            }
            _ => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn analyze(source: &str) -> Vec<SelectionPredicate> {
        QuantifierDetector::new().analyze(&tokenize(source))
    }

    #[test]
    fn every_is_distributive() {
        let found = analyze("add reverb to every chorus");
        assert_eq!(found.len(), 1);
        let p = &found[0];
        assert_eq!(p.quantifier, QuantifierKind::Universal);
        assert_eq!(p.scope_reading, ScopeReading::Distributive);
        assert_eq!(p.restriction.as_deref(), Some("chorus"));
        assert_eq!(p.surface, "every chorus");
        assert!(p.warnings.is_empty());
        assert!(p.confidence > 0.8);
    }

    #[test]
    fn all_is_collective() {
        let found = analyze("mute all the tracks");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].quantifier, QuantifierKind::Universal);
        assert_eq!(found[0].scope_reading, ScopeReading::Collective);
        assert_eq!(found[0].restriction.as_deref(), Some("track"));
    }

    #[test]
    fn some_is_underspecified_with_warning() {
        let found = analyze("brighten some tracks");
        assert_eq!(found.len(), 1);
        let p = &found[0];
        assert_eq!(p.quantifier, QuantifierKind::Existential);
        assert_eq!(p.scope_reading, ScopeReading::Underspecified);
        assert!(matches!(
            p.warnings.as_slice(),
            [AnalysisWarning::ScopeAmbiguity { marker, candidates }]
                if marker == "some" && candidates.len() == 2
        ));
    }

    #[test]
    fn bare_numeral_with_noun_is_open() {
        let found = analyze("cut two bars");
        assert_eq!(found.len(), 1);
        let p = &found[0];
        assert_eq!(p.quantifier, QuantifierKind::Numeric);
        assert_eq!(p.count, Some(2.0));
        assert_eq!(p.scope_reading, ScopeReading::Underspecified);
        assert_eq!(p.warnings.len(), 1);
    }

    #[test]
    fn numeral_bound_to_a_unit_is_not_a_selection() {
        // "3 db" belongs to the unit parser.
        assert!(analyze("boost it 3 db").is_empty());
    }

    #[test]
    fn partitive_shell_changes_kind() {
        let found = analyze("delete two of the verses");
        assert_eq!(found.len(), 1);
        let p = &found[0];
        assert_eq!(p.quantifier, QuantifierKind::Partitive);
        assert_eq!(p.count, Some(2.0));
        assert_eq!(p.restriction.as_deref(), Some("verse"));
        assert_eq!(p.surface, "two of the verses");
    }

    #[test]
    fn both_counts_two_collectively() {
        let found = analyze("pan both guitars wide");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].quantifier, QuantifierKind::Numeric);
        assert_eq!(found[0].count, Some(2.0));
        assert_eq!(found[0].scope_reading, ScopeReading::Collective);
    }

    #[test]
    fn every_other_sets_an_ordinal_filter() {
        let found = analyze("mute every other bar");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ordinal_filter, Some(OrdinalFilter { step: 2, offset: 0 }));
        assert_eq!(found[0].scope_reading, ScopeReading::Distributive);
    }

    #[test]
    fn every_third_sets_step_three() {
        let found = analyze("accent every third beat");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ordinal_filter, Some(OrdinalFilter { step: 3, offset: 0 }));
        assert_eq!(found[0].restriction.as_deref(), Some("beat"));
    }

    #[test]
    fn negative_quantifier_is_decreasing() {
        let found = analyze("no drums in the intro");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].quantifier, QuantifierKind::Negative);
        assert_eq!(found[0].monotonicity, Monotonicity::Decreasing);
        assert_eq!(found[0].restriction.as_deref(), Some("drum"));
    }

    #[test]
    fn comparative_binds_threshold_count() {
        let found = analyze("use at least three tracks");
        assert_eq!(found.len(), 1);
        let p = &found[0];
        assert_eq!(p.quantifier, QuantifierKind::Comparative);
        assert_eq!(p.count, Some(3.0));
        assert_eq!(p.monotonicity, Monotonicity::Increasing);
        assert_eq!(p.restriction.as_deref(), Some("track"));
    }

    #[test]
    fn adjective_modifiers_collect_before_the_head() {
        let found = analyze("soften every quiet verse");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].modifiers, vec!["quiet".to_string()]);
        assert_eq!(found[0].restriction.as_deref(), Some("verse"));
    }

    #[test]
    fn ambiguous_entity_hints_are_kept_not_resolved() {
        let found = analyze("mute every bass");
        assert_eq!(found.len(), 1);
        assert!(found[0].entity_types.len() > 1);
    }

    #[test]
    fn spans_cover_the_whole_selection() {
        let source = "add shimmer to every other chorus";
        let found = QuantifierDetector::new().analyze(&tokenize(source));
        assert_eq!(found[0].span.slice(source), "every other chorus");
    }
}
