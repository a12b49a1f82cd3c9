//! Domain unit parsing and conversion.
//!
//! A fixed alias table maps surface unit words ("st", "semitones", "half
//! step") to canonical units, each belonging to a dimension with a designated
//! base unit. Conversion is linear within a dimension and refuses to cross
//! dimensions. The expression scanner walks a token stream and extracts
//! number+unit expressions in their surface form: spaced ("3 db"), attached
//! ("7st", "440hz"), percentages ("25%", "25 percent"), and ratios ("2:1").

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::numbers::{self, ParsedNumber};
use crate::span::Span;
use crate::token::{Token, TokenStream, TokenType};

/// The measurement dimension a unit belongs to. Conversion never crosses
/// dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitDimension {
    /// Bars and beats: musical time, tempo-relative
    TimeMusical,
    /// Seconds and friends: wall-clock time
    TimeAbsolute,
    /// Semitones, cents, octaves
    Pitch,
    /// Hertz
    Frequency,
    /// Decibels
    Dynamics,
    /// Beats per minute
    Tempo,
    /// Percent
    Percentage,
    /// Pan/width positions
    Spatial,
    /// MIDI velocity and CC values
    Midi,
    /// Compression ratios and similar factors
    Ratio,
    /// A bare count with no unit word
    Dimensionless,
}

/// One canonical unit: its name, dimension, and scale to the dimension base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanonicalUnit {
    pub name: &'static str,
    pub dimension: UnitDimension,
    /// Multiplier to the dimension's base unit (beat, second, semitone, hz)
    pub to_base: f64,
}

impl<'de> Deserialize<'de> for CanonicalUnit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Repr {
            name: String,
        }
        let repr = Repr::deserialize(deserializer)?;
        lookup_unit(&repr.name)
            .ok_or_else(|| de::Error::custom(format!("unknown canonical unit: {}", repr.name)))
    }
}

/// How a value is meant to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueMode {
    /// Set to this value ("set tempo to 120 bpm")
    Absolute,
    /// Adjust by this signed amount ("+3 db", "-2 st")
    Relative,
    /// Proportional change ("25%", "25 percent")
    Percentage,
    /// A multiplier or ratio ("2:1")
    Factor,
}

/// A number bound to a unit with surface provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitExpression {
    pub value: ParsedNumber,
    pub unit: CanonicalUnit,
    pub mode: ValueMode,
    /// The surface text as written ("+3 dB", "7st", "2:1")
    pub original: String,
    pub span: Span,
}

/// Unit conversion failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    DimensionMismatch {
        from: UnitDimension,
        to: UnitDimension,
    },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::DimensionMismatch { from, to } => {
                write!(f, "cannot convert {from:?} to {to:?}")
            }
        }
    }
}

impl std::error::Error for ConversionError {}

// (name, dimension, to_base)
const UNITS: &[CanonicalUnit] = &[
    CanonicalUnit { name: "bar", dimension: UnitDimension::TimeMusical, to_base: 4.0 },
    CanonicalUnit { name: "beat", dimension: UnitDimension::TimeMusical, to_base: 1.0 },
    CanonicalUnit { name: "second", dimension: UnitDimension::TimeAbsolute, to_base: 1.0 },
    CanonicalUnit { name: "millisecond", dimension: UnitDimension::TimeAbsolute, to_base: 0.001 },
    CanonicalUnit { name: "minute", dimension: UnitDimension::TimeAbsolute, to_base: 60.0 },
    CanonicalUnit { name: "semitone", dimension: UnitDimension::Pitch, to_base: 1.0 },
    CanonicalUnit { name: "cent", dimension: UnitDimension::Pitch, to_base: 0.01 },
    CanonicalUnit { name: "octave", dimension: UnitDimension::Pitch, to_base: 12.0 },
    CanonicalUnit { name: "hertz", dimension: UnitDimension::Frequency, to_base: 1.0 },
    CanonicalUnit { name: "kilohertz", dimension: UnitDimension::Frequency, to_base: 1000.0 },
    CanonicalUnit { name: "decibel", dimension: UnitDimension::Dynamics, to_base: 1.0 },
    CanonicalUnit { name: "bpm", dimension: UnitDimension::Tempo, to_base: 1.0 },
    CanonicalUnit { name: "percent", dimension: UnitDimension::Percentage, to_base: 1.0 },
    CanonicalUnit { name: "pan", dimension: UnitDimension::Spatial, to_base: 1.0 },
    CanonicalUnit { name: "velocity", dimension: UnitDimension::Midi, to_base: 1.0 },
    CanonicalUnit { name: "ratio", dimension: UnitDimension::Ratio, to_base: 1.0 },
    CanonicalUnit { name: "count", dimension: UnitDimension::Dimensionless, to_base: 1.0 },
];

// (alias, canonical name); multi-word aliases are space-joined and matched
// over adjacent tokens.
const ALIASES: &[(&str, &str)] = &[
    ("bar", "bar"),
    ("bars", "bar"),
    ("measure", "bar"),
    ("measures", "bar"),
    ("beat", "beat"),
    ("beats", "beat"),
    ("second", "second"),
    ("seconds", "second"),
    ("sec", "second"),
    ("secs", "second"),
    ("s", "second"),
    ("millisecond", "millisecond"),
    ("milliseconds", "millisecond"),
    ("ms", "millisecond"),
    ("minute", "minute"),
    ("minutes", "minute"),
    ("min", "minute"),
    ("mins", "minute"),
    ("semitone", "semitone"),
    ("semitones", "semitone"),
    ("st", "semitone"),
    ("half step", "semitone"),
    ("half steps", "semitone"),
    ("halfstep", "semitone"),
    ("halfsteps", "semitone"),
    ("step", "semitone"),
    ("steps", "semitone"),
    ("cent", "cent"),
    ("cents", "cent"),
    ("octave", "octave"),
    ("octaves", "octave"),
    ("hertz", "hertz"),
    ("hz", "hertz"),
    ("kilohertz", "kilohertz"),
    ("khz", "kilohertz"),
    ("k", "kilohertz"),
    ("decibel", "decibel"),
    ("decibels", "decibel"),
    ("db", "decibel"),
    ("bpm", "bpm"),
    ("percent", "percent"),
    ("pct", "percent"),
    ("velocity", "velocity"),
];

static UNIT_BY_NAME: Lazy<std::collections::HashMap<&'static str, CanonicalUnit>> =
    Lazy::new(|| UNITS.iter().map(|u| (u.name, *u)).collect());

static UNIT_BY_ALIAS: Lazy<std::collections::HashMap<&'static str, CanonicalUnit>> =
    Lazy::new(|| {
        ALIASES
            .iter()
            .filter_map(|&(alias, name)| UNIT_BY_NAME.get(name).map(|u| (alias, *u)))
            .collect()
    });

/// Split an attached number-unit surface: "7st", "440hz", "3.5db".
static ATTACHED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)([a-z]+)$").expect("valid regex"));

/// Resolve a unit alias (or canonical name) to its canonical unit.
pub fn lookup_unit(alias: &str) -> Option<CanonicalUnit> {
    let lower = alias.to_lowercase();
    UNIT_BY_ALIAS
        .get(lower.as_str())
        .or_else(|| UNIT_BY_NAME.get(lower.as_str()))
        .copied()
}

/// The canonical unit used for bare counts.
pub fn dimensionless() -> CanonicalUnit {
    UNITS[UNITS.len() - 1]
}

/// Convert a value between two units of the same dimension.
pub fn convert(value: f64, from: CanonicalUnit, to: CanonicalUnit) -> Result<f64, ConversionError> {
    if from.dimension != to.dimension {
        return Err(ConversionError::DimensionMismatch {
            from: from.dimension,
            to: to.dimension,
        });
    }
    Ok(value * from.to_base / to.to_base)
}

/// Scan the whole stream for unit expressions, longest window first.
///
/// Each token participates in at most one expression; windows shrink from
/// four tokens down to one, and a successful parse marks its tokens consumed.
pub fn scan_unit_expressions(stream: &TokenStream) -> Vec<UnitExpression> {
    let tokens: Vec<&Token> = stream.iter().collect();
    let mut consumed = vec![false; tokens.len()];
    let mut found: Vec<(usize, UnitExpression)> = Vec::new();

    for width in (1..=4usize).rev() {
        let mut i = 0;
        while i + width <= tokens.len() {
            if consumed[i..i + width].iter().any(|&c| c) {
                i += 1;
                continue;
            }
            if let Some(expr) = parse_window(stream.source(), &tokens[i..i + width]) {
                for slot in &mut consumed[i..i + width] {
                    *slot = true;
                }
                found.push((i, expr));
                i += width;
            } else {
                i += 1;
            }
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, expr)| expr).collect()
}

/// Parse exactly one window of tokens as a unit expression, or nothing.
///
/// Window forms, in priority order: signed spaced ("+ 3 db"), ratio ("2:1"),
/// percentage operator ("25 %"), spaced number+unit ("3 db", "3 half steps"),
/// attached ("7st"), "25 percent" (handled by the spaced path).
fn parse_window(source: &str, window: &[&Token]) -> Option<UnitExpression> {
    match window.len() {
        4 => parse_signed(source, window),
        3 => parse_signed(source, window)
            .or_else(|| parse_ratio(source, window))
            .or_else(|| parse_spaced(source, window, ValueMode::Absolute)),
        2 => parse_signed(source, window)
            .or_else(|| parse_percent_operator(source, window))
            .or_else(|| parse_spaced(source, window, ValueMode::Absolute)),
        1 => parse_attached(source, window[0]),
        _ => None,
    }
}

/// Leading `+`/`-` operator adjacent to the number makes the value relative.
fn parse_signed(source: &str, window: &[&Token]) -> Option<UnitExpression> {
    let (sign, rest) = window.split_first()?;
    if sign.token_type != TokenType::Operator {
        return None;
    }
    let negative = match sign.normalized_text.as_str() {
        "+" => false,
        "-" => true,
        _ => return None,
    };
    // The sign must touch the number: "+3 db" yes, "pan - 3 db" no.
    if sign.span.end != rest.first()?.span.start {
        return None;
    }
    let inner = match rest.len() {
        1 => parse_attached(source, rest[0]),
        2 => parse_spaced(source, rest, ValueMode::Absolute)
            .or_else(|| parse_percent_operator(source, rest)),
        3 => parse_spaced(source, rest, ValueMode::Absolute),
        _ => None,
    }?;
    let span = sign.span.union(inner.span);
    let value = if negative {
        ParsedNumber::new(-inner.value.value, format!("-{}", inner.value.original))
    } else {
        ParsedNumber::new(inner.value.value, format!("+{}", inner.value.original))
    };
    Some(UnitExpression {
        value,
        unit: inner.unit,
        mode: ValueMode::Relative,
        original: span.slice(source).to_string(),
        span,
    })
}

/// `N : M` with all three tokens adjacent — a compression-style ratio.
fn parse_ratio(source: &str, window: &[&Token]) -> Option<UnitExpression> {
    let [left, colon, right] = window else {
        return None;
    };
    if colon.normalized_text != ":" {
        return None;
    }
    if left.token_type != TokenType::Number || right.token_type != TokenType::Number {
        return None;
    }
    if left.span.end != colon.span.start || colon.span.end != right.span.start {
        return None;
    }
    let numerator: f64 = left.normalized_text.parse().ok()?;
    let denominator: f64 = right.normalized_text.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    let span = left.span.union(right.span);
    Some(UnitExpression {
        value: ParsedNumber::new(numerator / denominator, span.slice(source)),
        unit: lookup_unit("ratio")?,
        mode: ValueMode::Factor,
        original: span.slice(source).to_string(),
        span,
    })
}

/// `N %` with the operator adjacent to the number.
fn parse_percent_operator(source: &str, window: &[&Token]) -> Option<UnitExpression> {
    let [number, percent] = window else {
        return None;
    };
    if percent.normalized_text != "%" || number.token_type != TokenType::Number {
        return None;
    }
    if number.span.end != percent.span.start {
        return None;
    }
    let value = numbers::parse_cardinal(&number.normalized_text)?;
    let span = number.span.union(percent.span);
    Some(UnitExpression {
        value,
        unit: lookup_unit("percent")?,
        mode: ValueMode::Percentage,
        original: span.slice(source).to_string(),
        span,
    })
}

/// Number token followed by one or two unit words ("3 db", "2 half steps").
fn parse_spaced(source: &str, window: &[&Token], mode: ValueMode) -> Option<UnitExpression> {
    let (number, unit_words) = window.split_first()?;
    if !matches!(number.token_type, TokenType::Number | TokenType::Word) {
        return None;
    }
    let value = numbers::parse_cardinal(&number.normalized_text)?;
    if unit_words.is_empty() || unit_words.len() > 2 {
        return None;
    }
    let alias = unit_words
        .iter()
        .map(|t| t.normalized_text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let unit = lookup_unit(&alias)?;
    let span = number.span.union(unit_words[unit_words.len() - 1].span);
    let mode = if unit.dimension == UnitDimension::Percentage {
        ValueMode::Percentage
    } else {
        mode
    };
    Some(UnitExpression {
        value,
        unit,
        mode,
        original: span.slice(source).to_string(),
        span,
    })
}

/// An attached number-unit in one token: "7st", "440hz", "3.5db".
fn parse_attached(source: &str, token: &Token) -> Option<UnitExpression> {
    if token.token_type != TokenType::Word {
        return None;
    }
    let caps = ATTACHED_RE.captures(&token.normalized_text)?;
    let value = numbers::parse_cardinal(caps.get(1)?.as_str())?;
    let unit = lookup_unit(caps.get(2)?.as_str())?;
    let mode = if unit.dimension == UnitDimension::Percentage {
        ValueMode::Percentage
    } else {
        ValueMode::Absolute
    };
    Some(UnitExpression {
        value,
        unit,
        mode,
        original: token.span.slice(source).to_string(),
        span: token.span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn scan(source: &str) -> Vec<UnitExpression> {
        scan_unit_expressions(&tokenize(source))
    }

    #[test]
    fn alias_lookup_is_case_insensitive() {
        assert_eq!(lookup_unit("dB").unwrap().name, "decibel");
        assert_eq!(lookup_unit("SEMITONES").unwrap().name, "semitone");
        assert_eq!(lookup_unit("furlongs"), None);
    }

    #[test]
    fn spaced_number_unit() {
        let found = scan("boost the bass 3 db");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value.value, 3.0);
        assert_eq!(found[0].unit.name, "decibel");
        assert_eq!(found[0].mode, ValueMode::Absolute);
        assert_eq!(found[0].original, "3 db");
    }

    #[test]
    fn two_word_unit_alias() {
        let found = scan("up two half steps");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value.value, 2.0);
        assert_eq!(found[0].unit.name, "semitone");
    }

    #[test]
    fn attached_number_unit() {
        let found = scan("transpose up 7st and tune to 440hz");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value.value, 7.0);
        assert_eq!(found[0].unit.name, "semitone");
        assert_eq!(found[1].value.value, 440.0);
        assert_eq!(found[1].unit.name, "hertz");
    }

    #[test]
    fn leading_sign_makes_relative() {
        let source = "drop the vocal -2 db";
        let found = scan(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value.value, -2.0);
        assert_eq!(found[0].mode, ValueMode::Relative);
        assert_eq!(found[0].original, "-2 db");
        assert_eq!(found[0].span.slice(source), "-2 db");
    }

    #[test]
    fn detached_sign_is_not_a_sign() {
        // The hyphen is not adjacent to the number.
        let found = scan("pan - 3 db");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mode, ValueMode::Absolute);
        assert_eq!(found[0].value.value, 3.0);
    }

    #[test]
    fn percent_operator_and_word_forms() {
        let found = scan("reduce reverb 25% or maybe 30 percent");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].mode, ValueMode::Percentage);
        assert_eq!(found[0].value.value, 25.0);
        assert_eq!(found[1].mode, ValueMode::Percentage);
        assert_eq!(found[1].value.value, 30.0);
    }

    #[test]
    fn ratio_parses_as_factor() {
        let found = scan("compress at 4:1");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mode, ValueMode::Factor);
        assert_eq!(found[0].value.value, 4.0);
        assert_eq!(found[0].original, "4:1");
    }

    #[test]
    fn ratio_requires_adjacency_and_nonzero_denominator() {
        assert!(scan("compress at 4 : 1").iter().all(|e| e.mode != ValueMode::Factor));
        assert!(scan("compress at 4:0").is_empty());
    }

    #[test]
    fn spelled_numbers_bind_units() {
        let found = scan("wait two bars");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value.value, 2.0);
        assert_eq!(found[0].unit.name, "bar");
    }

    #[test]
    fn tokens_participate_in_one_expression_only() {
        let found = scan("+3 db");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mode, ValueMode::Relative);
    }

    #[test]
    fn conversion_within_a_dimension() {
        let bar = lookup_unit("bars").unwrap();
        let beat = lookup_unit("beats").unwrap();
        assert_eq!(convert(2.0, bar, beat).unwrap(), 8.0);
        assert_eq!(convert(0.5, lookup_unit("khz").unwrap(), lookup_unit("hz").unwrap()).unwrap(), 500.0);
    }

    #[test]
    fn conversion_across_dimensions_fails() {
        let db = lookup_unit("db").unwrap();
        let st = lookup_unit("st").unwrap();
        assert!(matches!(
            convert(3.0, db, st),
            Err(ConversionError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn canonical_unit_deserializes_by_name() {
        let unit: CanonicalUnit = serde_json::from_str(r#"{"name":"semitone"}"#).unwrap();
        assert_eq!(unit.dimension, UnitDimension::Pitch);
        assert!(serde_json::from_str::<CanonicalUnit>(r#"{"name":"furlong"}"#).is_err());
    }
}
