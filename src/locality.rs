//! Edit locality analysis.
//!
//! Small words carry big constraints: "just", "only", "at least", "all the
//! way". Each marker is classified, turned into a cost bias (which direction
//! the edit should lean and how strongly) and a scope effect (narrow, widen,
//! or lock the edit's reach), and markers that pull against each other are
//! reported as conflicts rather than silently reconciled.

use serde::{Deserialize, Serialize};

use crate::numbers;
use crate::span::Span;
use crate::token::{Token, TokenStream};
use crate::warnings::AnalysisWarning;

/// What kind of constraint a marker places on the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalityType {
    /// "just", "only": do this and nothing more
    Restriction,
    /// "at least": a floor on the change
    MinimumThreshold,
    /// "at most", "no more than": a ceiling on the change
    MaximumThreshold,
    /// "about", "roughly": the value is soft
    Approximation,
    /// "solely", "nothing but": this and actively nothing else
    Exclusivity,
    /// "especially", "mainly": weight this part
    Emphasis,
    /// "exactly", "precisely": the value is hard
    Precision,
    /// "enough": reach a sufficient level and stop
    Sufficiency,
    /// "too much", "overly": current state overshoots
    Excess,
    /// "completely", "all the way": go to the limit
    Totality,
}

/// Direction the marker biases the edit cost function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiasDirection {
    /// Prefer the smallest change that satisfies the request
    Minimize,
    /// Prefer the largest reasonable change
    Maximize,
    /// Hold to a stated value or bound
    Constrain,
    /// Loosen matching around the stated value
    Relax,
    Neutral,
}

/// The cost-function bias a marker implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBias {
    pub direction: BiasDirection,
    /// Relative strength in 0.0..=1.0
    pub magnitude: f64,
    /// True when untouched material must stay untouched
    pub implies_preserve_rest: bool,
    /// Numeric bound when the marker states one ("at least 3")
    pub threshold: Option<f64>,
}

/// How the marker reshapes the edit's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeModification {
    Narrow,
    Widen,
    Lock,
    Relax,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeEffect {
    pub modification: ScopeModification,
    /// True when everything outside the scope is excluded, not just deprioritized
    pub exclusive: bool,
    pub priority_adjust: i8,
}

/// One locality marker found in the utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalityExpression {
    pub locality_type: LocalityType,
    /// The marker surface as written
    pub marker: String,
    pub cost_bias: CostBias,
    pub scope_effect: ScopeEffect,
    /// What the marker implicitly protects, when it protects anything
    pub implied_preservation: Option<String>,
    pub span: Span,
    pub confidence: f64,
}

/// How the found markers combine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerInteraction {
    /// The strongest bias across all markers, preservation OR-ed together
    pub combined_bias: Option<CostBias>,
    /// True when two markers push the same way
    pub reinforced: bool,
    pub warnings: Vec<AnalysisWarning>,
}

/// The full locality picture for one utterance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalityAnalysis {
    pub expressions: Vec<LocalityExpression>,
    pub interaction: MarkerInteraction,
}

// Marker phrases, space-joined over normalized tokens. Multi-word phrases
// that the tokenizer merges ("at least") match as a single token; the rest
// ("too much") match across a token window.
const MARKERS: &[(&str, LocalityType)] = &[
    ("just", LocalityType::Restriction),
    ("only", LocalityType::Restriction),
    ("merely", LocalityType::Restriction),
    ("simply", LocalityType::Restriction),
    ("solely", LocalityType::Exclusivity),
    ("exclusively", LocalityType::Exclusivity),
    ("nothing but", LocalityType::Exclusivity),
    ("and nothing else", LocalityType::Exclusivity),
    ("at least", LocalityType::MinimumThreshold),
    ("no less than", LocalityType::MinimumThreshold),
    ("a minimum of", LocalityType::MinimumThreshold),
    ("at most", LocalityType::MaximumThreshold),
    ("no more than", LocalityType::MaximumThreshold),
    ("up to", LocalityType::MaximumThreshold),
    ("a maximum of", LocalityType::MaximumThreshold),
    ("about", LocalityType::Approximation),
    ("around", LocalityType::Approximation),
    ("roughly", LocalityType::Approximation),
    ("approximately", LocalityType::Approximation),
    ("more or less", LocalityType::Approximation),
    ("give or take", LocalityType::Approximation),
    ("exactly", LocalityType::Precision),
    ("precisely", LocalityType::Precision),
    ("especially", LocalityType::Emphasis),
    ("particularly", LocalityType::Emphasis),
    ("mainly", LocalityType::Emphasis),
    ("mostly", LocalityType::Emphasis),
    ("primarily", LocalityType::Emphasis),
    ("enough", LocalityType::Sufficiency),
    ("sufficiently", LocalityType::Sufficiency),
    ("too much", LocalityType::Excess),
    ("way too much", LocalityType::Excess),
    ("overly", LocalityType::Excess),
    ("excessively", LocalityType::Excess),
    ("completely", LocalityType::Totality),
    ("entirely", LocalityType::Totality),
    ("totally", LocalityType::Totality),
    ("fully", LocalityType::Totality),
    ("wholly", LocalityType::Totality),
    ("all the way", LocalityType::Totality),
];

// Pairs of marker types that contradict each other.
const CONFLICTS: &[(LocalityType, LocalityType)] = &[
    (LocalityType::Restriction, LocalityType::Totality),
    (LocalityType::Precision, LocalityType::Approximation),
    (LocalityType::Exclusivity, LocalityType::Totality),
];

/// Detects locality markers and their interactions.
#[derive(Debug, Default)]
pub struct EditLocalityAnalyzer;

impl EditLocalityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, stream: &TokenStream) -> LocalityAnalysis {
        let tokens: Vec<&Token> = stream.iter().collect();
        let mut expressions = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            match match_marker(&tokens, i) {
                Some((locality_type, width)) => {
                    expressions.push(build_expression(
                        stream.source(),
                        &tokens,
                        i,
                        width,
                        locality_type,
                    ));
                    i += width;
                }
                None => i += 1,
            }
        }

        let interaction = interact(&expressions);
        LocalityAnalysis { expressions, interaction }
    }
}

/// Longest marker phrase starting at this position, up to four tokens wide.
fn match_marker(tokens: &[&Token], at: usize) -> Option<(LocalityType, usize)> {
    for width in (1..=4usize.min(tokens.len() - at)).rev() {
        let window = &tokens[at..at + width];
        if !window.iter().all(|t| t.is_word_like()) {
            continue;
        }
        let phrase = window
            .iter()
            .map(|t| t.normalized_text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(&(_, locality_type)) = MARKERS.iter().find(|(m, _)| *m == phrase) {
            return Some((locality_type, width));
        }
    }
    None
}

fn build_expression(
    source: &str,
    tokens: &[&Token],
    at: usize,
    width: usize,
    locality_type: LocalityType,
) -> LocalityExpression {
    let span = tokens[at].span.union(tokens[at + width - 1].span);
    let threshold = match locality_type {
        LocalityType::MinimumThreshold | LocalityType::MaximumThreshold => {
            following_number(tokens, at + width)
        }
        _ => None,
    };

    let (cost_bias, scope_effect) = derive_effects(locality_type, threshold);
    let implied_preservation = match locality_type {
        LocalityType::Restriction | LocalityType::Exclusivity => {
            Some("everything outside the marked scope".to_string())
        }
        _ => None,
    };

    LocalityExpression {
        locality_type,
        marker: span.slice(source).to_string(),
        cost_bias,
        scope_effect,
        implied_preservation,
        span,
        confidence: 0.9,
    }
}

/// Fixed bias/scope derivation per marker type.
fn derive_effects(locality_type: LocalityType, threshold: Option<f64>) -> (CostBias, ScopeEffect) {
    let bias = |direction, magnitude, preserve| CostBias {
        direction,
        magnitude,
        implies_preserve_rest: preserve,
        threshold,
    };
    let scope = |modification, exclusive, priority_adjust| ScopeEffect {
        modification,
        exclusive,
        priority_adjust,
    };

    match locality_type {
        LocalityType::Restriction => (
            bias(BiasDirection::Minimize, 0.8, true),
            scope(ScopeModification::Narrow, false, 0),
        ),
        LocalityType::Exclusivity => (
            bias(BiasDirection::Minimize, 1.0, true),
            scope(ScopeModification::Narrow, true, 0),
        ),
        LocalityType::MinimumThreshold | LocalityType::MaximumThreshold => (
            bias(BiasDirection::Constrain, 0.7, false),
            scope(ScopeModification::None, false, 0),
        ),
        LocalityType::Approximation => (
            bias(BiasDirection::Relax, 0.3, false),
            scope(ScopeModification::Relax, false, 0),
        ),
        LocalityType::Precision => (
            bias(BiasDirection::Constrain, 0.9, false),
            scope(ScopeModification::Lock, false, 0),
        ),
        LocalityType::Emphasis => (
            bias(BiasDirection::Maximize, 0.6, false),
            scope(ScopeModification::None, false, 1),
        ),
        LocalityType::Sufficiency => (
            bias(BiasDirection::Constrain, 0.4, false),
            scope(ScopeModification::None, false, 0),
        ),
        LocalityType::Excess => (
            bias(BiasDirection::Minimize, 0.7, false),
            scope(ScopeModification::None, false, 0),
        ),
        LocalityType::Totality => (
            bias(BiasDirection::Maximize, 0.8, false),
            scope(ScopeModification::Widen, false, 0),
        ),
    }
}

/// A numeral within the next two tokens ("at least 3 db", "up to two bars").
fn following_number(tokens: &[&Token], from: usize) -> Option<f64> {
    tokens[from..]
        .iter()
        .take(2)
        .find_map(|t| numbers::parse_cardinal(&t.normalized_text))
        .map(|n| n.value)
}

/// Second pass: conflicts, reinforcements, and the combined bias.
fn interact(expressions: &[LocalityExpression]) -> MarkerInteraction {
    let mut warnings = Vec::new();
    let mut reinforced = false;

    for (i, a) in expressions.iter().enumerate() {
        for b in &expressions[i + 1..] {
            let pair = (a.locality_type, b.locality_type);
            let conflicting = CONFLICTS
                .iter()
                .any(|&(x, y)| pair == (x, y) || pair == (y, x));
            if conflicting {
                warnings.push(AnalysisWarning::MarkerConflict {
                    first: a.marker.clone(),
                    second: b.marker.clone(),
                });
            } else if a.locality_type == b.locality_type
                || is_threshold_range(a.locality_type, b.locality_type)
            {
                reinforced = true;
            }
        }
    }

    let combined_bias = expressions
        .iter()
        .max_by(|a, b| {
            a.cost_bias
                .magnitude
                .partial_cmp(&b.cost_bias.magnitude)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|strongest| CostBias {
            direction: strongest.cost_bias.direction,
            magnitude: strongest.cost_bias.magnitude,
            implies_preserve_rest: expressions
                .iter()
                .any(|e| e.cost_bias.implies_preserve_rest),
            threshold: strongest.cost_bias.threshold,
        });

    MarkerInteraction {
        combined_bias,
        reinforced,
        warnings,
    }
}

/// A floor and a ceiling together describe a range, not a conflict.
fn is_threshold_range(a: LocalityType, b: LocalityType) -> bool {
    matches!(
        (a, b),
        (LocalityType::MinimumThreshold, LocalityType::MaximumThreshold)
            | (LocalityType::MaximumThreshold, LocalityType::MinimumThreshold)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn analyze(source: &str) -> LocalityAnalysis {
        EditLocalityAnalyzer::new().analyze(&tokenize(source))
    }

    #[test]
    fn just_restricts_and_preserves_the_rest() {
        let analysis = analyze("just boost the bass");
        assert_eq!(analysis.expressions.len(), 1);
        let e = &analysis.expressions[0];
        assert_eq!(e.locality_type, LocalityType::Restriction);
        assert_eq!(e.cost_bias.direction, BiasDirection::Minimize);
        assert!(e.cost_bias.implies_preserve_rest);
        assert_eq!(e.scope_effect.modification, ScopeModification::Narrow);
        assert!(e.implied_preservation.is_some());
    }

    #[test]
    fn exclusivity_is_stronger_than_restriction() {
        let analysis = analyze("boost nothing but the bass");
        let e = &analysis.expressions[0];
        assert_eq!(e.locality_type, LocalityType::Exclusivity);
        assert!(e.scope_effect.exclusive);
        assert_eq!(e.cost_bias.magnitude, 1.0);
    }

    #[test]
    fn minimum_threshold_captures_the_number() {
        let analysis = analyze("boost it at least 3 db");
        assert_eq!(analysis.expressions.len(), 1);
        let e = &analysis.expressions[0];
        assert_eq!(e.locality_type, LocalityType::MinimumThreshold);
        assert_eq!(e.cost_bias.direction, BiasDirection::Constrain);
        assert_eq!(e.cost_bias.threshold, Some(3.0));
    }

    #[test]
    fn maximum_threshold_with_spelled_number() {
        let analysis = analyze("raise it no more than two db");
        assert_eq!(analysis.expressions.len(), 1);
        let e = &analysis.expressions[0];
        assert_eq!(e.locality_type, LocalityType::MaximumThreshold);
        assert_eq!(e.cost_bias.threshold, Some(2.0));
    }

    #[test]
    fn approximation_relaxes() {
        let analysis = analyze("set it to roughly 120 bpm");
        let e = &analysis.expressions[0];
        assert_eq!(e.locality_type, LocalityType::Approximation);
        assert_eq!(e.cost_bias.direction, BiasDirection::Relax);
        assert_eq!(e.scope_effect.modification, ScopeModification::Relax);
    }

    #[test]
    fn precision_locks_scope() {
        let analysis = analyze("set it to exactly 120 bpm");
        let e = &analysis.expressions[0];
        assert_eq!(e.locality_type, LocalityType::Precision);
        assert_eq!(e.scope_effect.modification, ScopeModification::Lock);
    }

    #[test]
    fn emphasis_raises_priority() {
        let analysis = analyze("clean up the mix, especially the vocals");
        let e = &analysis.expressions[0];
        assert_eq!(e.locality_type, LocalityType::Emphasis);
        assert_eq!(e.scope_effect.priority_adjust, 1);
        assert_eq!(e.cost_bias.direction, BiasDirection::Maximize);
    }

    #[test]
    fn totality_widens() {
        let analysis = analyze("remove the reverb completely");
        let e = &analysis.expressions[0];
        assert_eq!(e.locality_type, LocalityType::Totality);
        assert_eq!(e.scope_effect.modification, ScopeModification::Widen);
    }

    #[test]
    fn all_the_way_matches_merged_idiom() {
        let analysis = analyze("pan it all the way left");
        assert_eq!(analysis.expressions.len(), 1);
        assert_eq!(analysis.expressions[0].locality_type, LocalityType::Totality);
        assert_eq!(analysis.expressions[0].marker, "all the way");
    }

    #[test]
    fn excess_minimizes() {
        let analysis = analyze("there is way too much reverb");
        assert_eq!(analysis.expressions.len(), 1);
        let e = &analysis.expressions[0];
        assert_eq!(e.locality_type, LocalityType::Excess);
        assert_eq!(e.marker, "way too much");
        assert_eq!(e.cost_bias.direction, BiasDirection::Minimize);
    }

    #[test]
    fn restriction_against_totality_conflicts() {
        let analysis = analyze("just tweak it but change everything completely");
        assert!(matches!(
            analysis.interaction.warnings.as_slice(),
            [AnalysisWarning::MarkerConflict { first, second }]
                if first == "just" && second == "completely"
        ));
    }

    #[test]
    fn min_and_max_form_a_range_not_a_conflict() {
        let analysis = analyze("boost it at least 2 db but at most 5 db");
        assert_eq!(analysis.expressions.len(), 2);
        assert!(analysis.interaction.warnings.is_empty());
        assert!(analysis.interaction.reinforced);
    }

    #[test]
    fn combined_bias_takes_strongest_and_ors_preservation() {
        let analysis = analyze("just the drums, and make them exactly 90 bpm");
        let combined = analysis.interaction.combined_bias.as_ref().unwrap();
        // Precision (0.9) outweighs restriction (0.8)...
        assert_eq!(combined.direction, BiasDirection::Constrain);
        // ...but restriction's preservation survives the merge.
        assert!(combined.implies_preserve_rest);
    }

    #[test]
    fn no_markers_means_empty_analysis() {
        let analysis = analyze("boost the bass in the chorus");
        assert!(analysis.expressions.is_empty());
        assert!(analysis.interaction.combined_bias.is_none());
        assert!(analysis.interaction.warnings.is_empty());
    }
}
