//! The full analysis pipeline: one call from raw text to every fragment the
//! analyzers produce, bundled with provenance and warnings.
//!
//! The pipeline is deterministic end to end — same input, same bundle — and
//! each analyzer runs independently over the shared token stream, so a
//! fragment from one analyzer never mutates another's view of the utterance.

use serde::{Deserialize, Serialize};

use crate::coordination::{CoordinationAnalyzer, ParsedCoordination};
use crate::locality::{EditLocalityAnalyzer, LocalityAnalysis};
use crate::named_ref::{NamedReference, NamedReferenceAnalyzer};
use crate::quantifier::{QuantifierDetector, SelectionPredicate};
use crate::time_expr::{TimeExpression, TimeExpressionAnalyzer};
use crate::token::TokenStream;
use crate::tokenizer;
use crate::units::{self, UnitExpression};
use crate::warnings::AnalysisWarning;

/// Everything the pipeline recovered from one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtteranceAnalysis {
    pub tokens: TokenStream,
    pub unit_expressions: Vec<UnitExpression>,
    pub selections: Vec<SelectionPredicate>,
    pub coordinations: Vec<ParsedCoordination>,
    pub time_expressions: Vec<TimeExpression>,
    pub named_references: Vec<NamedReference>,
    pub locality: LocalityAnalysis,
}

impl UtteranceAnalysis {
    /// Every warning from every analyzer, in fragment order.
    pub fn warnings(&self) -> Vec<&AnalysisWarning> {
        let mut all: Vec<&AnalysisWarning> = Vec::new();
        all.extend(self.selections.iter().flat_map(|s| &s.warnings));
        all.extend(self.coordinations.iter().flat_map(|c| &c.warnings));
        all.extend(self.time_expressions.iter().flat_map(|t| &t.warnings));
        all.extend(self.named_references.iter().flat_map(|n| &n.warnings));
        all.extend(self.locality.interaction.warnings.iter());
        all
    }

    /// Serialize the whole bundle for hand-off to a downstream consumer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The analyzer set, run in a fixed order over a shared token stream.
#[derive(Debug, Default)]
pub struct Pipeline {
    quantifier: QuantifierDetector,
    coordination: CoordinationAnalyzer,
    time: TimeExpressionAnalyzer,
    named: NamedReferenceAnalyzer,
    locality: EditLocalityAnalyzer,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze one utterance end to end.
    pub fn analyze(&self, source: &str) -> UtteranceAnalysis {
        let tokens = tokenizer::tokenize(source);
        UtteranceAnalysis {
            unit_expressions: units::scan_unit_expressions(&tokens),
            selections: self.quantifier.analyze(&tokens),
            coordinations: self.coordination.analyze(&tokens),
            time_expressions: self.time.analyze(&tokens),
            named_references: self.named.analyze(&tokens),
            locality: self.locality.analyze(&tokens),
            tokens,
        }
    }
}

/// One-shot convenience over a default [`Pipeline`].
pub fn analyze(source: &str) -> UtteranceAnalysis {
    Pipeline::new().analyze(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_is_deterministic() {
        let source = "just boost every chorus by 3 db and then mute 'Glass Pad'";
        assert_eq!(analyze(source), analyze(source));
    }

    #[test]
    fn bundle_collects_all_analyzers() {
        let analysis =
            analyze("boost the bass 3 db in the second chorus and mute the track called 'Glass Pad'");
        assert!(!analysis.unit_expressions.is_empty());
        assert!(!analysis.coordinations.is_empty());
        assert!(!analysis.time_expressions.is_empty());
        assert!(!analysis.named_references.is_empty());
    }

    #[test]
    fn warnings_aggregate_across_analyzers() {
        let analysis = analyze("brighten some tracks in the chorus");
        let codes: Vec<&str> = analysis.warnings().iter().map(|w| w.code()).collect();
        assert!(codes.contains(&"scope_ambiguity"));
        assert!(codes.contains(&"missing_ordinal"));
    }

    #[test]
    fn json_round_trips() {
        let analysis = analyze("boost every chorus 3 db");
        let json = analysis.to_json().unwrap();
        let back: UtteranceAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(analysis, back);
    }
}
