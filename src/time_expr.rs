//! Time expression analysis.
//!
//! Recovers when an edit applies: absolute bar/beat ranges, named sections
//! with ordinals, relative anchors ("before the drop"), durations,
//! repetitions ("every 4 bars"), and whole-song scope. Section names that
//! usually repeat ("chorus") get a warning when referenced without an ordinal
//! instead of a silently guessed occurrence.

use serde::{Deserialize, Serialize};

use crate::numbers;
use crate::span::Span;
use crate::token::{Token, TokenStream, TokenType};
use crate::units::{self, CanonicalUnit, UnitDimension};
use crate::warnings::AnalysisWarning;

/// A position in musical time. Ordering is lexicographic: bar, then beat,
/// then subdivision, with an absent component sorting before any present one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MusicalPosition {
    pub bar: u32,
    pub beat: Option<u32>,
    pub subdivision: Option<u32>,
}

impl MusicalPosition {
    pub fn bar(bar: u32) -> Self {
        Self { bar, beat: None, subdivision: None }
    }

    pub fn bar_beat(bar: u32, beat: u32) -> Self {
        Self { bar, beat: Some(beat), subdivision: None }
    }
}

/// How a relative range sits against its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeRelation {
    Before,
    After,
    Around,
    At,
}

/// How composite sub-ranges combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineOp {
    Intersection,
    Union,
}

/// A resolved-enough description of when an edit applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeRange {
    /// "from bar 8 to bar 16"
    Absolute {
        start: MusicalPosition,
        end: MusicalPosition,
    },
    /// "the second chorus"
    Section {
        name: String,
        ordinal: Option<u32>,
        is_last: bool,
    },
    /// "before the drop"
    Relative {
        relation: RangeRelation,
        reference: Box<TimeRange>,
    },
    /// "for two bars", optionally anchored ("for two bars after the chorus")
    Duration {
        value: f64,
        unit: CanonicalUnit,
        anchor: Option<Box<TimeRange>>,
    },
    /// "at bar 8 beat 3"
    Point { position: MusicalPosition },
    /// "the whole song", "everywhere"
    Whole,
    /// "every 4 bars"
    Repetition {
        interval: u32,
        unit: Option<CanonicalUnit>,
        every_other: bool,
    },
    /// Several sub-ranges: "from the verse to the chorus" (union),
    /// "in the chorus from bar 2 to bar 4" (intersection)
    Composite {
        ranges: Vec<TimeRange>,
        combine: CombineOp,
    },
}

/// One time expression with surface provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeExpression {
    pub range: TimeRange,
    pub surface: String,
    pub span: Span,
    pub confidence: f64,
    pub warnings: Vec<AnalysisWarning>,
}

/// Song-structure vocabulary: surface word → canonical section, its typical
/// place in an arrangement, and whether it usually occurs more than once.
#[derive(Debug, Clone, Copy)]
pub struct SectionInfo {
    pub canonical: &'static str,
    pub typical_order: u8,
    pub repeats: bool,
}

const SECTIONS: &[(&str, SectionInfo)] = &[
    ("intro", SectionInfo { canonical: "intro", typical_order: 1, repeats: false }),
    ("verse", SectionInfo { canonical: "verse", typical_order: 2, repeats: true }),
    ("prechorus", SectionInfo { canonical: "pre-chorus", typical_order: 3, repeats: true }),
    ("pre-chorus", SectionInfo { canonical: "pre-chorus", typical_order: 3, repeats: true }),
    ("build", SectionInfo { canonical: "pre-chorus", typical_order: 3, repeats: true }),
    ("buildup", SectionInfo { canonical: "pre-chorus", typical_order: 3, repeats: true }),
    ("ramp", SectionInfo { canonical: "pre-chorus", typical_order: 3, repeats: true }),
    ("chorus", SectionInfo { canonical: "chorus", typical_order: 4, repeats: true }),
    ("hook", SectionInfo { canonical: "chorus", typical_order: 4, repeats: true }),
    ("refrain", SectionInfo { canonical: "chorus", typical_order: 4, repeats: true }),
    ("drop", SectionInfo { canonical: "drop", typical_order: 4, repeats: true }),
    ("bridge", SectionInfo { canonical: "bridge", typical_order: 5, repeats: false }),
    ("middle eight", SectionInfo { canonical: "bridge", typical_order: 5, repeats: false }),
    ("breakdown", SectionInfo { canonical: "breakdown", typical_order: 5, repeats: false }),
    ("outro", SectionInfo { canonical: "outro", typical_order: 6, repeats: false }),
    ("coda", SectionInfo { canonical: "outro", typical_order: 6, repeats: false }),
    ("section", SectionInfo { canonical: "section", typical_order: 0, repeats: true }),
];

/// Look up song-structure vocabulary for a surface word.
pub fn section_info(word: &str) -> Option<SectionInfo> {
    SECTIONS
        .iter()
        .find(|(surface, _)| *surface == word)
        .map(|&(_, info)| info)
}

/// A partial parse: the range, tokens consumed, and warnings gathered.
struct Parsed {
    range: TimeRange,
    consumed: usize,
    confidence: f64,
    warnings: Vec<AnalysisWarning>,
}

/// Detects time expressions over a token stream.
#[derive(Debug, Default)]
pub struct TimeExpressionAnalyzer;

impl TimeExpressionAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, stream: &TokenStream) -> Vec<TimeExpression> {
        let tokens: Vec<&Token> = stream.iter().collect();
        let mut found = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            match parse_at(&tokens[i..]) {
                Some(mut parsed) => {
                    // A section followed directly by a bar range narrows to
                    // their intersection: "in the chorus from bar 2 to bar 4".
                    if is_section_like(&parsed.range) {
                        if let Some(tail) = parse_from_to(&tokens[i + parsed.consumed..]) {
                            if matches!(tail.range, TimeRange::Absolute { .. }) {
                                parsed = Parsed {
                                    range: TimeRange::Composite {
                                        ranges: vec![parsed.range, tail.range],
                                        combine: CombineOp::Intersection,
                                    },
                                    consumed: parsed.consumed + tail.consumed,
                                    confidence: parsed.confidence.min(tail.confidence),
                                    warnings: {
                                        let mut w = parsed.warnings;
                                        w.extend(tail.warnings);
                                        w
                                    },
                                };
                            }
                        }
                    }

                    let span = tokens[i].span.union(tokens[i + parsed.consumed - 1].span);
                    found.push(TimeExpression {
                        range: parsed.range,
                        surface: span.slice(stream.source()).to_string(),
                        span,
                        confidence: parsed.confidence,
                        warnings: parsed.warnings,
                    });
                    i += parsed.consumed;
                }
                None => i += 1,
            }
        }

        found
    }
}

fn is_section_like(range: &TimeRange) -> bool {
    matches!(range, TimeRange::Section { .. })
}

/// Try each form at this position, highest priority first.
fn parse_at(tokens: &[&Token]) -> Option<Parsed> {
    parse_from_to(tokens)
        .or_else(|| parse_between(tokens))
        .or_else(|| parse_duration(tokens))
        .or_else(|| parse_prefixed(tokens))
        .or_else(|| parse_repetition(tokens))
        .or_else(|| parse_whole(tokens))
        .or_else(|| parse_position_expr(tokens))
        .or_else(|| parse_bare_section(tokens))
}

/// "from A to B".
fn parse_from_to(tokens: &[&Token]) -> Option<Parsed> {
    if text_of(tokens, 0)? != "from" {
        return None;
    }
    let left = parse_endpoint(&tokens[1..])?;
    let to_at = 1 + left.consumed;
    if text_of(tokens, to_at)? != "to" {
        return None;
    }
    let right = parse_endpoint(&tokens[to_at + 1..])?;
    combine_endpoints(left, right, to_at + 1)
}

/// "between A and B".
fn parse_between(tokens: &[&Token]) -> Option<Parsed> {
    if text_of(tokens, 0)? != "between" {
        return None;
    }
    let left = parse_endpoint(&tokens[1..])?;
    let and_at = 1 + left.consumed;
    if text_of(tokens, and_at)? != "and" {
        return None;
    }
    let right = parse_endpoint(&tokens[and_at + 1..])?;
    combine_endpoints(left, right, and_at + 1)
}

fn combine_endpoints(left: Endpoint, right: Endpoint, right_offset: usize) -> Option<Parsed> {
    let consumed = right_offset + right.consumed;
    match (left.value, right.value) {
        (EndpointValue::Position(start), EndpointValue::Position(end)) => Some(Parsed {
            range: TimeRange::Absolute { start, end },
            consumed,
            confidence: 0.95,
            warnings: Vec::new(),
        }),
        (left_value, right_value) => {
            let mut warnings = left.warnings;
            warnings.extend(right.warnings);
            Some(Parsed {
                range: TimeRange::Composite {
                    ranges: vec![left_value.into_range(), right_value.into_range()],
                    combine: CombineOp::Union,
                },
                consumed,
                confidence: 0.8,
                warnings,
            })
        }
    }
}

enum EndpointValue {
    Position(MusicalPosition),
    Section(TimeRange),
}

impl EndpointValue {
    fn into_range(self) -> TimeRange {
        match self {
            EndpointValue::Position(position) => TimeRange::Point { position },
            EndpointValue::Section(range) => range,
        }
    }
}

struct Endpoint {
    value: EndpointValue,
    consumed: usize,
    warnings: Vec<AnalysisWarning>,
}

/// A range endpoint: "bar 8 [beat 3]", a bare number (read as a bar), or a
/// section reference.
fn parse_endpoint(tokens: &[&Token]) -> Option<Endpoint> {
    if let Some((position, consumed)) = parse_position(tokens) {
        return Some(Endpoint {
            value: EndpointValue::Position(position),
            consumed,
            warnings: Vec::new(),
        });
    }
    if let Some(bar) = bare_number(tokens, 0) {
        return Some(Endpoint {
            value: EndpointValue::Position(MusicalPosition::bar(bar)),
            consumed: 1,
            warnings: Vec::new(),
        });
    }
    if let Some(section) = parse_section_ref(tokens) {
        return Some(Endpoint {
            value: EndpointValue::Section(section.range),
            consumed: section.consumed,
            warnings: section.warnings,
        });
    }
    None
}

/// "bar N [beat M]".
fn parse_position(tokens: &[&Token]) -> Option<(MusicalPosition, usize)> {
    let head = text_of(tokens, 0)?;
    if head != "bar" && head != "measure" {
        return None;
    }
    let bar = bare_number(tokens, 1)?;
    if text_of(tokens, 2) == Some("beat") {
        if let Some(beat) = bare_number(tokens, 3) {
            return Some((MusicalPosition::bar_beat(bar, beat), 4));
        }
    }
    Some((MusicalPosition::bar(bar), 2))
}

/// "at bar 8 beat 3" without a preposition; rare but unambiguous.
fn parse_position_expr(tokens: &[&Token]) -> Option<Parsed> {
    let (position, consumed) = parse_position(tokens)?;
    Some(Parsed {
        range: TimeRange::Point { position },
        consumed,
        confidence: 0.95,
        warnings: Vec::new(),
    })
}

/// "for N unit", optionally anchored by a following relative phrase.
fn parse_duration(tokens: &[&Token]) -> Option<Parsed> {
    if text_of(tokens, 0)? != "for" {
        return None;
    }
    let value = numbers::parse_cardinal(text_of(tokens, 1)?)?;
    let unit = time_unit(text_of(tokens, 2)?)?;
    let mut consumed = 3;
    let mut warnings = Vec::new();

    let anchor = match parse_prefixed(&tokens[consumed..]) {
        Some(anchored) => {
            consumed += anchored.consumed;
            warnings.extend(anchored.warnings);
            Some(Box::new(anchored.range))
        }
        None => None,
    };

    Some(Parsed {
        range: TimeRange::Duration { value: value.value, unit, anchor },
        consumed,
        confidence: 0.9,
        warnings,
    })
}

/// A preposition followed by a position or section.
fn parse_prefixed(tokens: &[&Token]) -> Option<Parsed> {
    let relation = match text_of(tokens, 0)? {
        "in" | "at" | "during" | "on" => RangeRelation::At,
        "before" | "until" | "till" => RangeRelation::Before,
        "after" | "following" | "past" => RangeRelation::After,
        "around" | "near" => RangeRelation::Around,
        _ => return None,
    };

    if let Some((position, consumed)) = parse_position(&tokens[1..]) {
        let range = match relation {
            RangeRelation::At => TimeRange::Point { position },
            relation => TimeRange::Relative {
                relation,
                reference: Box::new(TimeRange::Point { position }),
            },
        };
        return Some(Parsed {
            range,
            consumed: consumed + 1,
            confidence: 0.95,
            warnings: Vec::new(),
        });
    }

    let section = parse_section_ref(&tokens[1..])?;
    let range = match relation {
        RangeRelation::At => section.range,
        relation => TimeRange::Relative {
            relation,
            reference: Box::new(section.range),
        },
    };
    Some(Parsed {
        range,
        consumed: section.consumed + 1,
        confidence: section.confidence * 0.95,
        warnings: section.warnings,
    })
}

/// "every 4 bars", "every bar", "every other bar". Only fires when the
/// repeated thing is a time unit; "every chorus" belongs to the quantifier
/// analyzer.
fn parse_repetition(tokens: &[&Token]) -> Option<Parsed> {
    let head = tokens.first()?;
    match head.normalized_text.as_str() {
        "every other" if head.token_type == TokenType::MultiWord => {
            let unit = time_unit(text_of(tokens, 1)?)?;
            Some(Parsed {
                range: TimeRange::Repetition {
                    interval: 2,
                    unit: Some(unit),
                    every_other: true,
                },
                consumed: 2,
                confidence: 0.9,
                warnings: Vec::new(),
            })
        }
        "every" => {
            if let Some(interval) = bare_number(tokens, 1) {
                let unit = time_unit(text_of(tokens, 2)?)?;
                return Some(Parsed {
                    range: TimeRange::Repetition { interval, unit: Some(unit), every_other: false },
                    consumed: 3,
                    confidence: 0.9,
                    warnings: Vec::new(),
                });
            }
            let unit = time_unit(text_of(tokens, 1)?)?;
            Some(Parsed {
                range: TimeRange::Repetition { interval: 1, unit: Some(unit), every_other: false },
                consumed: 2,
                confidence: 0.9,
                warnings: Vec::new(),
            })
        }
        _ => None,
    }
}

/// "the whole song", "everywhere", "throughout".
fn parse_whole(tokens: &[&Token]) -> Option<Parsed> {
    let first = text_of(tokens, 0)?;
    if first == "everywhere" || first == "throughout" {
        return Some(Parsed {
            range: TimeRange::Whole,
            consumed: 1,
            confidence: 0.9,
            warnings: Vec::new(),
        });
    }
    let mut at = 0;
    if first == "the" {
        at = 1;
    }
    if text_of(tokens, at)? != "whole" && text_of(tokens, at)? != "entire" {
        return None;
    }
    match text_of(tokens, at + 1)? {
        "song" | "track" | "mix" | "thing" => Some(Parsed {
            range: TimeRange::Whole,
            consumed: at + 2,
            confidence: 0.9,
            warnings: Vec::new(),
        }),
        _ => None,
    }
}

/// "[the] [second|2nd|last|final] <section> [N]". A bare section word with no
/// determiner or ordinal is skipped: "chorus" alone may be the effect.
fn parse_bare_section(tokens: &[&Token]) -> Option<Parsed> {
    let section = parse_section_ref(tokens)?;
    if !section.anchored {
        return None;
    }
    Some(Parsed {
        range: section.range,
        consumed: section.consumed,
        confidence: section.confidence,
        warnings: section.warnings,
    })
}

struct SectionRef {
    range: TimeRange,
    consumed: usize,
    confidence: f64,
    warnings: Vec<AnalysisWarning>,
    /// True when a determiner or ordinal preceded the section word
    anchored: bool,
}

fn parse_section_ref(tokens: &[&Token]) -> Option<SectionRef> {
    let mut at = 0;
    let mut anchored = false;
    if text_of(tokens, at) == Some("the") {
        at += 1;
        anchored = true;
    }

    let mut ordinal: Option<u32> = None;
    let mut is_last = false;
    if let Some(text) = text_of(tokens, at) {
        if text == "last" || text == "final" {
            is_last = true;
            at += 1;
            anchored = true;
        } else if let Some(value) = numbers::parse_ordinal(text) {
            ordinal = Some(value);
            at += 1;
            anchored = true;
        }
    }

    let word = text_of(tokens, at)?;
    let info = section_info(word)?;
    at += 1;

    // Trailing number as ordinal: "verse 2".
    if ordinal.is_none() && !is_last {
        if let Some(value) = bare_number(tokens, at) {
            ordinal = Some(value);
            at += 1;
            anchored = true;
        }
    }

    let mut warnings = Vec::new();
    let confidence = if ordinal.is_some() || is_last {
        0.9
    } else if info.repeats {
        warnings.push(AnalysisWarning::MissingOrdinal {
            section: info.canonical.to_string(),
        });
        0.7
    } else {
        0.9
    };

    Some(SectionRef {
        range: TimeRange::Section {
            name: info.canonical.to_string(),
            ordinal,
            is_last,
        },
        consumed: at,
        confidence,
        warnings,
        anchored,
    })
}

fn text_of<'a>(tokens: &'a [&'a Token], at: usize) -> Option<&'a str> {
    tokens.get(at).map(|t| t.normalized_text.as_str())
}

fn bare_number(tokens: &[&Token], at: usize) -> Option<u32> {
    let token = tokens.get(at)?;
    if token.token_type != TokenType::Number {
        return None;
    }
    let value: f64 = token.normalized_text.parse().ok()?;
    if value.fract() == 0.0 && value >= 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

/// A unit word usable in time expressions.
fn time_unit(word: &str) -> Option<CanonicalUnit> {
    let unit = units::lookup_unit(word)?;
    match unit.dimension {
        UnitDimension::TimeMusical | UnitDimension::TimeAbsolute => Some(unit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn analyze(source: &str) -> Vec<TimeExpression> {
        TimeExpressionAnalyzer::new().analyze(&tokenize(source))
    }

    #[test]
    fn from_bar_to_bar_is_absolute() {
        let found = analyze("fade out from bar 8 to bar 16");
        assert_eq!(found.len(), 1);
        let e = &found[0];
        assert_eq!(
            e.range,
            TimeRange::Absolute {
                start: MusicalPosition::bar(8),
                end: MusicalPosition::bar(16),
            }
        );
        assert_eq!(e.surface, "from bar 8 to bar 16");
        assert!(e.warnings.is_empty());
    }

    #[test]
    fn second_endpoint_may_be_a_bare_number() {
        let found = analyze("loop from bar 8 to 16");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].range,
            TimeRange::Absolute {
                start: MusicalPosition::bar(8),
                end: MusicalPosition::bar(16),
            }
        );
    }

    #[test]
    fn section_with_ordinal_word() {
        let found = analyze("brighten the second verse");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].range,
            TimeRange::Section {
                name: "verse".to_string(),
                ordinal: Some(2),
                is_last: false,
            }
        );
        assert!(found[0].warnings.is_empty());
    }

    #[test]
    fn repeating_section_without_ordinal_warns() {
        let found = analyze("add shimmer in the chorus");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            found[0].warnings.as_slice(),
            [AnalysisWarning::MissingOrdinal { section }] if section == "chorus"
        ));
        assert!(found[0].confidence < 0.8);
    }

    #[test]
    fn last_section_needs_no_ordinal() {
        let found = analyze("mute the drums in the last chorus");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].range,
            TimeRange::Section {
                name: "chorus".to_string(),
                ordinal: None,
                is_last: true,
            }
        );
        assert!(found[0].warnings.is_empty());
    }

    #[test]
    fn non_repeating_section_needs_no_ordinal() {
        let found = analyze("fade in during the intro");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].range,
            TimeRange::Section {
                name: "intro".to_string(),
                ordinal: None,
                is_last: false,
            }
        );
        assert!(found[0].warnings.is_empty());
    }

    #[test]
    fn section_synonyms_canonicalize() {
        let found = analyze("tighten the hook");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0].range,
            TimeRange::Section { name, .. } if name == "chorus"
        ));
    }

    #[test]
    fn middle_eight_maps_to_bridge() {
        let found = analyze("strip back the middle eight");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0].range,
            TimeRange::Section { name, .. } if name == "bridge"
        ));
    }

    #[test]
    fn bare_section_word_without_determiner_is_skipped() {
        // "chorus" here is the effect, not the section.
        assert!(analyze("add chorus to the pads").is_empty());
    }

    #[test]
    fn trailing_number_is_an_ordinal() {
        let found = analyze("edit the verse 2");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0].range,
            TimeRange::Section { ordinal: Some(2), .. }
        ));
    }

    #[test]
    fn before_a_section_is_relative() {
        let found = analyze("add a riser before the drop");
        assert_eq!(found.len(), 1);
        match &found[0].range {
            TimeRange::Relative { relation, reference } => {
                assert_eq!(*relation, RangeRelation::Before);
                assert!(matches!(
                    reference.as_ref(),
                    TimeRange::Section { name, .. } if name == "drop"
                ));
            }
            other => panic!("expected relative range, got {other:?}"),
        }
    }

    #[test]
    fn position_with_beat() {
        let found = analyze("place the hit at bar 8 beat 3");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].range,
            TimeRange::Point {
                position: MusicalPosition::bar_beat(8, 3),
            }
        );
    }

    #[test]
    fn duration_with_anchor() {
        let found = analyze("hold the pad for two bars after the bridge");
        assert_eq!(found.len(), 1);
        match &found[0].range {
            TimeRange::Duration { value, unit, anchor } => {
                assert_eq!(*value, 2.0);
                assert_eq!(unit.name, "bar");
                assert!(matches!(
                    anchor.as_deref(),
                    Some(TimeRange::Relative { relation: RangeRelation::After, .. })
                ));
            }
            other => panic!("expected duration, got {other:?}"),
        }
    }

    #[test]
    fn repetition_every_n_bars() {
        let found = analyze("put a crash every 4 bars");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            found[0].range,
            TimeRange::Repetition { interval: 4, every_other: false, .. }
        ));
    }

    #[test]
    fn every_other_bar_repetition() {
        let found = analyze("mute the kick every other bar");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            found[0].range,
            TimeRange::Repetition { interval: 2, every_other: true, .. }
        ));
    }

    #[test]
    fn every_chorus_is_not_a_repetition() {
        // Entity repetition belongs to the quantifier analyzer.
        let found = analyze("add reverb to every chorus");
        assert!(found
            .iter()
            .all(|e| !matches!(e.range, TimeRange::Repetition { .. })));
    }

    #[test]
    fn whole_song_phrases() {
        for source in ["normalize the whole song", "add glue everywhere"] {
            let found = analyze(source);
            assert_eq!(found.len(), 1, "{source}");
            assert_eq!(found[0].range, TimeRange::Whole, "{source}");
        }
    }

    #[test]
    fn section_range_unions() {
        let found = analyze("clean up from the verse to the chorus");
        assert_eq!(found.len(), 1);
        match &found[0].range {
            TimeRange::Composite { ranges, combine } => {
                assert_eq!(*combine, CombineOp::Union);
                assert_eq!(ranges.len(), 2);
            }
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn section_narrowed_by_bar_range_intersects() {
        let found = analyze("quieten the bridge from bar 2 to bar 4");
        assert_eq!(found.len(), 1);
        match &found[0].range {
            TimeRange::Composite { ranges, combine } => {
                assert_eq!(*combine, CombineOp::Intersection);
                assert!(matches!(&ranges[0], TimeRange::Section { name, .. } if name == "bridge"));
                assert!(matches!(&ranges[1], TimeRange::Absolute { .. }));
            }
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn positions_order_lexicographically() {
        assert!(MusicalPosition::bar(8) < MusicalPosition::bar_beat(8, 1));
        assert!(MusicalPosition::bar_beat(8, 3) < MusicalPosition::bar(9));
        assert!(MusicalPosition::bar(8) < MusicalPosition::bar(16));
    }

    #[test]
    fn between_bars_is_absolute() {
        let found = analyze("mute everything between bar 4 and bar 8");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].range,
            TimeRange::Absolute {
                start: MusicalPosition::bar(4),
                end: MusicalPosition::bar(8),
            }
        );
    }
}
