//! Cardinal and ordinal parsing shared by the unit, quantifier, and time
//! analyzers. Covers digits, spelled-out numbers 0–20 plus decade words, and
//! ordinal words/suffixes.

use serde::{Deserialize, Serialize};

/// A parsed numeric value together with the surface it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedNumber {
    pub value: f64,
    /// The surface text as written ("3.5", "twelve", "-4")
    pub original: String,
}

impl ParsedNumber {
    pub fn new(value: f64, original: impl Into<String>) -> Self {
        Self {
            value,
            original: original.into(),
        }
    }
}

/// Parse a spelled-out cardinal: 0–20 plus decade words.
pub fn parse_cardinal_word(text: &str) -> Option<u32> {
    let value = match text.to_lowercase().as_str() {
        "zero" => 0,
        "one" | "a" | "an" => 1,
        "two" | "couple" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" | "dozen" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        "hundred" => 100,
        _ => return None,
    };
    Some(value)
}

/// Parse a cardinal from digits or a spelled-out word.
pub fn parse_cardinal(text: &str) -> Option<ParsedNumber> {
    if let Ok(value) = text.parse::<f64>() {
        if value.is_finite() {
            return Some(ParsedNumber::new(value, text));
        }
        return None;
    }
    parse_cardinal_word(text).map(|v| ParsedNumber::new(f64::from(v), text))
}

/// Parse a spelled-out ordinal word ("first" … "twentieth").
pub fn parse_ordinal_word(text: &str) -> Option<u32> {
    let value = match text.to_lowercase().as_str() {
        "first" => 1,
        "second" => 2,
        "third" => 3,
        "fourth" => 4,
        "fifth" => 5,
        "sixth" => 6,
        "seventh" => 7,
        "eighth" => 8,
        "ninth" => 9,
        "tenth" => 10,
        "eleventh" => 11,
        "twelfth" => 12,
        "thirteenth" => 13,
        "fourteenth" => 14,
        "fifteenth" => 15,
        "sixteenth" => 16,
        "seventeenth" => 17,
        "eighteenth" => 18,
        "nineteenth" => 19,
        "twentieth" => 20,
        _ => return None,
    };
    Some(value)
}

/// Parse an ordinal from a digit+suffix form ("2nd") or an ordinal word.
///
/// Digit forms only count when the suffix agrees with the number ("7st" is
/// not an ordinal; the unit parser reads it as an attached number-unit).
pub fn parse_ordinal(text: &str) -> Option<u32> {
    if let Some(value) = parse_ordinal_word(text) {
        return Some(value);
    }
    let lower = text.to_lowercase();
    let digits_end = lower.find(|c: char| !c.is_ascii_digit())?;
    let (digits, suffix) = lower.split_at(digits_end);
    if digits.is_empty() {
        return None;
    }
    let value: u32 = digits.parse().ok()?;
    if ordinal_suffix_for(value) == suffix {
        Some(value)
    } else {
        None
    }
}

/// The agreeing ordinal suffix for a number (11–13 take "th").
pub fn ordinal_suffix_for(value: u32) -> &'static str {
    match (value % 10, value % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
