//! Analyzer warnings.
//!
//! Ambiguity is data, not failure: when an analyzer cannot commit to one
//! reading it records every candidate and emits a warning naming them, so a
//! downstream consumer (or the user) makes the call. Nothing in the pipeline
//! silently picks a reading the input does not justify.

use serde::{Deserialize, Serialize};

use crate::coordination::CoordinationKind;
use crate::quantifier::ScopeReading;

/// A structured diagnostic attached to an analysis fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// A quantifier admits more than one scope reading.
    ScopeAmbiguity {
        /// The quantifier surface ("some", "two")
        marker: String,
        /// Every reading the surface admits
        candidates: Vec<ScopeReading>,
    },
    /// A correlative opener with no partner in range ("both ... and").
    MissingCorrelative {
        /// The opener as written ("both", "either")
        opener: String,
        /// The partner word that never arrived
        expected: String,
    },
    /// A section known to repeat was referenced without an ordinal.
    MissingOrdinal {
        /// The canonical section name ("chorus")
        section: String,
    },
    /// A conjunction with more than one plausible sense.
    AmbiguousConjunction {
        conjunction: String,
        /// Every sense the surface admits, strongest first
        senses: Vec<CoordinationKind>,
    },
    /// Two locality markers pull in opposite directions.
    MarkerConflict {
        first: String,
        second: String,
    },
    /// An unquoted name was recognized; binding it needs fuzzy matching.
    FuzzyResolutionRequired {
        name: String,
    },
}

impl AnalysisWarning {
    /// A short stable code for grouping warnings in logs and output.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisWarning::ScopeAmbiguity { .. } => "scope_ambiguity",
            AnalysisWarning::MissingCorrelative { .. } => "missing_correlative",
            AnalysisWarning::MissingOrdinal { .. } => "missing_ordinal",
            AnalysisWarning::AmbiguousConjunction { .. } => "ambiguous_conjunction",
            AnalysisWarning::MarkerConflict { .. } => "marker_conflict",
            AnalysisWarning::FuzzyResolutionRequired { .. } => "fuzzy_resolution_required",
        }
    }
}
