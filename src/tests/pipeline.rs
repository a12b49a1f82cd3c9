//! End-to-end checks over the public pipeline surface: the guarantees a
//! consumer relies on, exercised through realistic edit requests.

use crate::coordination::CoordinationKind;
use crate::locality::LocalityType;
use crate::named_ref::ResolutionStrategy;
use crate::pipeline::analyze;
use crate::quantifier::ScopeReading;
use crate::time_expr::{MusicalPosition, TimeRange};
use crate::tokenizer::tokenize;
use crate::units::ValueMode;
use crate::warnings::AnalysisWarning;

// ---------------------------------------------------------------------------
// Provenance guarantees
// ---------------------------------------------------------------------------

const SAMPLES: &[&str] = &[
    "just boost every chorus by 3 db and then mute the track called 'Glass Pad'",
    "fade out from bar 8 to bar 16, but keep the bass line",
    "pan both guitars all the way left \u{2014} wider, brighter, louder!",
    "rename \u{201C}Old Mix\u{201D} to \u{201C}New Mix\u{201D} and compress at 4:1",
    "don't touch the guitars' tone; raise #vocals roughly 25%",
];

#[test]
fn every_fragment_span_reproduces_its_surface() {
    for &source in SAMPLES {
        let analysis = analyze(source);
        for e in &analysis.unit_expressions {
            assert_eq!(e.span.slice(source), e.original, "unit in {source:?}");
        }
        for s in &analysis.selections {
            assert_eq!(s.span.slice(source), s.surface, "selection in {source:?}");
        }
        for t in &analysis.time_expressions {
            assert_eq!(t.span.slice(source), t.surface, "time in {source:?}");
        }
        for n in &analysis.named_references {
            assert_eq!(n.span.slice(source), n.surface, "name in {source:?}");
        }
        for l in &analysis.locality.expressions {
            assert_eq!(l.span.slice(source), l.marker, "marker in {source:?}");
        }
    }
}

#[test]
fn token_spans_tile_the_source_without_loss() {
    for &source in SAMPLES {
        let stream = tokenize(source);
        let mut spans: Vec<_> = stream
            .iter()
            .flat_map(|t| match &t.component_spans {
                Some(parts) => parts.clone(),
                None => vec![t.span],
            })
            .chain(stream.whitespace.iter().copied())
            .collect();
        spans.sort();
        let mut cursor = 0;
        for span in spans {
            assert_eq!(span.start, cursor, "gap in {source:?}");
            cursor = span.end;
        }
        assert_eq!(cursor, source.len(), "missing tail in {source:?}");
    }
}

#[test]
fn analysis_is_deterministic_across_runs() {
    for &source in SAMPLES {
        assert_eq!(analyze(source), analyze(source), "{source:?}");
    }
}

#[test]
fn confidences_stay_in_range() {
    for &source in SAMPLES {
        let analysis = analyze(source);
        let all = analysis
            .selections
            .iter()
            .map(|s| s.confidence)
            .chain(analysis.coordinations.iter().map(|c| c.confidence))
            .chain(analysis.time_expressions.iter().map(|t| t.confidence))
            .chain(analysis.named_references.iter().map(|n| n.confidence))
            .chain(analysis.locality.expressions.iter().map(|l| l.confidence));
        for confidence in all {
            assert!((0.0..=1.0).contains(&confidence), "{source:?}");
        }
    }
}

// ---------------------------------------------------------------------------
// Cross-analyzer behavior on one utterance
// ---------------------------------------------------------------------------

#[test]
fn full_request_decomposes_into_all_layers() {
    let source = "just boost every chorus by 3 db and then mute the track called 'Glass Pad'";
    let analysis = analyze(source);

    let selection = &analysis.selections[0];
    assert_eq!(selection.restriction.as_deref(), Some("chorus"));
    assert_eq!(selection.scope_reading, ScopeReading::Distributive);

    let unit = &analysis.unit_expressions[0];
    assert_eq!(unit.value.value, 3.0);
    assert_eq!(unit.unit.name, "decibel");
    assert_eq!(unit.mode, ValueMode::Absolute);

    let coordination = &analysis.coordinations[0];
    assert_eq!(coordination.kind, CoordinationKind::Sequential);
    assert!(coordination.order_strict);

    let name = &analysis.named_references[0];
    assert_eq!(name.name, "Glass Pad");
    assert_eq!(name.resolution_strategy, ResolutionStrategy::ExactMatch);

    let marker = &analysis.locality.expressions[0];
    assert_eq!(marker.locality_type, LocalityType::Restriction);
    assert!(marker.cost_bias.implies_preserve_rest);
}

#[test]
fn distributive_collective_and_underspecified_scopes() {
    assert_eq!(
        analyze("brighten every chorus").selections[0].scope_reading,
        ScopeReading::Distributive,
    );
    assert_eq!(
        analyze("brighten all the choruses").selections[0].scope_reading,
        ScopeReading::Collective,
    );
    let some = analyze("brighten some tracks");
    assert_eq!(some.selections[0].scope_reading, ScopeReading::Underspecified);
    assert!(some
        .warnings()
        .iter()
        .any(|w| matches!(w, AnalysisWarning::ScopeAmbiguity { marker, .. } if marker == "some")));
}

#[test]
fn correlatives_link_and_missing_partners_warn() {
    let linked = analyze("mute both the bass and the drums");
    assert!(linked.coordinations[0].correlative_used);
    assert!(linked.coordinations[0].warnings.is_empty());

    let missing = analyze("either mute the drums");
    assert!(missing.warnings().iter().any(|w| matches!(
        w,
        AnalysisWarning::MissingCorrelative { opener, expected }
            if opener == "either" && expected == "or"
    )));
}

#[test]
fn absolute_ranges_and_section_ordinals() {
    let bars = analyze("fade out from bar 8 to bar 16");
    assert_eq!(
        bars.time_expressions[0].range,
        TimeRange::Absolute {
            start: MusicalPosition::bar(8),
            end: MusicalPosition::bar(16),
        }
    );

    let section = analyze("brighten the second verse");
    assert_eq!(
        section.time_expressions[0].range,
        TimeRange::Section {
            name: "verse".to_string(),
            ordinal: Some(2),
            is_last: false,
        }
    );
}

#[test]
fn quoted_names_bind_exactly_and_bare_names_do_not_bind() {
    let quoted = analyze("mute the track called 'Glass Pad'");
    assert_eq!(quoted.named_references.len(), 1);
    assert_eq!(
        quoted.named_references[0].resolution_strategy,
        ResolutionStrategy::ExactMatch,
    );

    // Without a naming verb a capitalized run is left alone.
    assert!(analyze("mute Glass Pad").named_references.is_empty());
}

#[test]
fn conflicting_markers_warn_instead_of_reconciling() {
    let analysis = analyze("just tweak the intro but rebuild it completely");
    assert!(analysis
        .warnings()
        .iter()
        .any(|w| matches!(w, AnalysisWarning::MarkerConflict { .. })));
}

#[test]
fn warning_free_input_has_no_warnings() {
    let analysis = analyze("boost the bass 3 db in the second verse");
    assert!(analysis.warnings().is_empty(), "{:?}", analysis.warnings());
}

#[test]
fn empty_and_trivial_inputs_are_handled() {
    let empty = analyze("");
    assert!(empty.tokens.is_empty());
    assert!(empty.warnings().is_empty());

    let punct = analyze("!!!");
    assert!(punct.selections.is_empty());
    assert!(punct.time_expressions.is_empty());
}
