//! Morphological normalization: surface word → lemma + inflection.
//!
//! Resolution is two-tier: exact matches against the domain verb and
//! adjective tables come first, keeping irregular domain forms exact; a
//! regular-morphology fallback of ordered suffix rules degrades gracefully on
//! novel vocabulary. [`lemmatize`] is pure and total — it always returns a
//! result, falling back to the unchanged word with an unknown class.

use serde::{Deserialize, Serialize};

use crate::lexicon::{self, Inflection, WordClass};

/// The result of lemmatizing one word. Same input always yields the same
/// output; there is no hidden state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmaResult {
    /// Canonical/dictionary form
    pub lemma: String,
    /// The surface form as given (lowercased)
    pub original: String,
    /// How the surface form inflects the lemma
    pub inflection: Inflection,
    /// True when resolved by a domain table rather than a fallback rule
    pub from_table: bool,
    /// Word class of the lemma per the vocabulary tables
    pub word_class: WordClass,
}

/// Words ending in "-er" that are not comparatives.
const ER_EXCEPTIONS: &[&str] = &[
    "filter", "master", "mixer", "fader", "limiter", "render", "layer", "other", "over",
    "under", "after", "never", "together",
];

/// Words ending in "-est" that are not superlatives.
const EST_EXCEPTIONS: &[&str] = &["best", "rest", "test", "latest"];

/// Lemmatize a single word.
///
/// Resolution order: domain verb table, domain adjective table, then ordered
/// regular suffix rules. Each fallback rule strips its suffix and accepts the
/// first candidate (stripped, degeminated, or silent-`e` restored) that the
/// vocabulary independently knows; otherwise the next rule is tried. If
/// nothing applies the word is returned unchanged with an unknown class.
pub fn lemmatize(word: &str) -> LemmaResult {
    let original = word.to_lowercase();

    if let Some(form) = lexicon::lookup_verb(&original) {
        return LemmaResult {
            lemma: form.lemma.to_string(),
            original,
            inflection: form.inflection,
            from_table: true,
            word_class: WordClass::Verb,
        };
    }

    if let Some(form) = lexicon::lookup_adjective(&original) {
        return LemmaResult {
            lemma: form.base.to_string(),
            original,
            inflection: form.inflection,
            from_table: true,
            word_class: WordClass::Adjective,
        };
    }

    if let Some(result) = apply_suffix_rules(&original) {
        return result;
    }

    let word_class = lexicon::word_class_of(&original);
    LemmaResult {
        lemma: original.clone(),
        original,
        inflection: Inflection::Base,
        from_table: false,
        word_class,
    }
}

/// Ordered regular-morphology rules: `-ing`, `-ed`, `-er`/`-est`, `-s`/`-es`,
/// `-ness`, `-ly`.
fn apply_suffix_rules(word: &str) -> Option<LemmaResult> {
    let rules: &[(&str, Inflection)] = &[
        ("ing", Inflection::PresentParticiple),
        ("ed", Inflection::Past),
        ("er", Inflection::Comparative),
        ("est", Inflection::Superlative),
        ("s", Inflection::Plural),
        ("ness", Inflection::Nominalization),
        ("ly", Inflection::Adverbial),
    ];

    for &(suffix, inflection) in rules {
        if let Some(lemma) = try_strip(word, suffix, inflection) {
            let word_class = lexicon::word_class_of(&lemma);
            return Some(LemmaResult {
                lemma,
                original: word.to_string(),
                inflection: adjust_plural(inflection, word_class),
                from_table: false,
                word_class,
            });
        }
    }
    None
}

/// A stripped "-s" on a verb lemma is third person, not a plural.
fn adjust_plural(inflection: Inflection, word_class: WordClass) -> Inflection {
    if inflection == Inflection::Plural && word_class == WordClass::Verb {
        Inflection::ThirdPerson
    } else {
        inflection
    }
}

/// Try one suffix rule; returns the recovered lemma only when it is
/// independently known to the vocabulary.
fn try_strip(word: &str, suffix: &str, inflection: Inflection) -> Option<String> {
    let stem = word.strip_suffix(suffix)?;
    if stem.len() < 2 {
        return None;
    }

    match inflection {
        Inflection::Comparative if ER_EXCEPTIONS.contains(&word) => return None,
        Inflection::Superlative if EST_EXCEPTIONS.contains(&word) => return None,
        _ => {}
    }

    // Plural handles "-es" as well ("boxes", "compresses").
    let mut candidates: Vec<String> = Vec::new();
    candidates.push(stem.to_string());
    if inflection == Inflection::Plural {
        if let Some(es_stem) = word.strip_suffix("es") {
            if es_stem.len() >= 2 {
                candidates.push(es_stem.to_string());
            }
        }
    }
    if let Some(degeminated) = degeminate(stem) {
        candidates.push(degeminated);
    }
    candidates.push(format!("{stem}e"));
    // "-ier"/"-iest"/"-ies" from a "-y" base ("muddier" -> "muddy").
    if let Some(i_stem) = stem.strip_suffix('i') {
        if i_stem.len() >= 2 {
            candidates.push(format!("{i_stem}y"));
        }
    }

    candidates.into_iter().find(|c| lexicon::is_known_word(c))
}

/// Undo consonant doubling: "pann" → "pan", "dropp" → "drop".
fn degeminate(stem: &str) -> Option<String> {
    let mut chars = stem.chars().rev();
    let last = chars.next()?;
    let second_last = chars.next()?;
    if last == second_last && last.is_ascii_alphabetic() && !"aeiou".contains(last) {
        Some(stem[..stem.len() - last.len_utf8()].to_string())
    } else {
        None
    }
}
