//! Vocabulary collaborator: pure lookup functions over read-only tables.
//!
//! Analyzers depend on this module only through the `lookup_*` / `is_*`
//! functions; they never inspect table internals, so the vocabulary can be
//! swapped or extended without touching analyzer logic. Tables are built once
//! on first access and never mutated afterwards.
//!
//! The tables here are a representative slice of the production vocabulary
//! (the full lexicons live outside this crate); the lookup surface is the
//! contract, not the table contents.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Coarse word class reported by morphological lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordClass {
    Verb,
    Adjective,
    Noun,
    Adverb,
    Unknown,
}

/// Coarse entity type hints inferred from head nouns.
///
/// A surface noun may map to several types ("bass" the instrument vs "bass"
/// the frequency band); lookup returns every candidate and the caller decides
/// what to do with the ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Track,
    Section,
    Effect,
    Parameter,
    Instrument,
    Note,
    TimeUnit,
    Project,
}

/// How an inflected form relates to its lemma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Inflection {
    Base,
    ThirdPerson,
    Past,
    PastParticiple,
    PresentParticiple,
    Comparative,
    Superlative,
    Nominalization,
    Plural,
    Adverbial,
}

/// A resolved verb form: the lemma plus how the surface form inflects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerbForm {
    pub lemma: &'static str,
    pub inflection: Inflection,
}

/// A resolved adjective form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjectiveForm {
    pub base: &'static str,
    pub inflection: Inflection,
}

/// Domain verb table: lemma, 3rd person, past, past participle, present
/// participle. Irregular forms are spelled out; everything else follows
/// regular morphology and is caught by the fallback rules instead.
const VERBS: &[(&str, &str, &str, &str, &str)] = &[
    ("boost", "boosts", "boosted", "boosted", "boosting"),
    ("cut", "cuts", "cut", "cut", "cutting"),
    ("raise", "raises", "raised", "raised", "raising"),
    ("lower", "lowers", "lowered", "lowered", "lowering"),
    ("increase", "increases", "increased", "increased", "increasing"),
    ("decrease", "decreases", "decreased", "decreased", "decreasing"),
    ("add", "adds", "added", "added", "adding"),
    ("remove", "removes", "removed", "removed", "removing"),
    ("delete", "deletes", "deleted", "deleted", "deleting"),
    ("mute", "mutes", "muted", "muted", "muting"),
    ("solo", "solos", "soloed", "soloed", "soloing"),
    ("pan", "pans", "panned", "panned", "panning"),
    ("fade", "fades", "faded", "faded", "fading"),
    ("loop", "loops", "looped", "looped", "looping"),
    ("quantize", "quantizes", "quantized", "quantized", "quantizing"),
    ("transpose", "transposes", "transposed", "transposed", "transposing"),
    ("double", "doubles", "doubled", "doubled", "doubling"),
    ("halve", "halves", "halved", "halved", "halving"),
    ("widen", "widens", "widened", "widened", "widening"),
    ("narrow", "narrows", "narrowed", "narrowed", "narrowing"),
    ("brighten", "brightens", "brightened", "brightened", "brightening"),
    ("darken", "darkens", "darkened", "darkened", "darkening"),
    ("compress", "compresses", "compressed", "compressed", "compressing"),
    ("normalize", "normalizes", "normalized", "normalized", "normalizing"),
    ("reverse", "reverses", "reversed", "reversed", "reversing"),
    ("shift", "shifts", "shifted", "shifted", "shifting"),
    ("move", "moves", "moved", "moved", "moving"),
    ("copy", "copies", "copied", "copied", "copying"),
    ("extend", "extends", "extended", "extended", "extending"),
    ("shorten", "shortens", "shortened", "shortened", "shortening"),
    ("tighten", "tightens", "tightened", "tightened", "tightening"),
    ("soften", "softens", "softened", "softened", "softening"),
    ("emphasize", "emphasizes", "emphasized", "emphasized", "emphasizing"),
    ("keep", "keeps", "kept", "kept", "keeping"),
    ("make", "makes", "made", "made", "making"),
    ("set", "sets", "set", "set", "setting"),
    ("apply", "applies", "applied", "applied", "applying"),
    ("turn", "turns", "turned", "turned", "turning"),
    ("bring", "brings", "brought", "brought", "bringing"),
    ("drop", "drops", "dropped", "dropped", "dropping"),
    ("filter", "filters", "filtered", "filtered", "filtering"),
    ("master", "masters", "mastered", "mastered", "mastering"),
    ("mix", "mixes", "mixed", "mixed", "mixing"),
    ("record", "records", "recorded", "recorded", "recording"),
    ("trim", "trims", "trimmed", "trimmed", "trimming"),
    ("stretch", "stretches", "stretched", "stretched", "stretching"),
    ("speed", "speeds", "sped", "sped", "speeding"),
    ("slow", "slows", "slowed", "slowed", "slowing"),
    ("rename", "renames", "renamed", "renamed", "renaming"),
    ("call", "calls", "called", "called", "calling"),
    ("name", "names", "named", "named", "naming"),
    ("label", "labels", "labelled", "labelled", "labelling"),
    ("title", "titles", "titled", "titled", "titling"),
];

/// Domain adjective table: base, comparative, superlative, nominalization.
const ADJECTIVES: &[(&str, &str, &str, &str)] = &[
    ("bright", "brighter", "brightest", "brightness"),
    ("dark", "darker", "darkest", "darkness"),
    ("warm", "warmer", "warmest", "warmth"),
    ("loud", "louder", "loudest", "loudness"),
    ("quiet", "quieter", "quietest", "quietness"),
    ("soft", "softer", "softest", "softness"),
    ("punchy", "punchier", "punchiest", "punchiness"),
    ("muddy", "muddier", "muddiest", "muddiness"),
    ("crisp", "crisper", "crispest", "crispness"),
    ("wide", "wider", "widest", "wideness"),
    ("narrow", "narrower", "narrowest", "narrowness"),
    ("tight", "tighter", "tightest", "tightness"),
    ("clean", "cleaner", "cleanest", "cleanness"),
    ("dry", "drier", "driest", "dryness"),
    ("wet", "wetter", "wettest", "wetness"),
    ("big", "bigger", "biggest", "bigness"),
    ("small", "smaller", "smallest", "smallness"),
    ("fast", "faster", "fastest", "fastness"),
    ("slow", "slower", "slowest", "slowness"),
    ("heavy", "heavier", "heaviest", "heaviness"),
    ("thin", "thinner", "thinnest", "thinness"),
    ("full", "fuller", "fullest", "fullness"),
    ("harsh", "harsher", "harshest", "harshness"),
    ("smooth", "smoother", "smoothest", "smoothness"),
    ("airy", "airier", "airiest", "airiness"),
    ("boomy", "boomier", "boomiest", "boominess"),
    ("thick", "thicker", "thickest", "thickness"),
    ("sharp", "sharper", "sharpest", "sharpness"),
];

/// Noun → entity type hints. Ambiguous surfaces list every candidate.
const NOUN_TYPES: &[(&str, &[EntityType])] = &[
    ("track", &[EntityType::Track]),
    ("channel", &[EntityType::Track]),
    ("stem", &[EntityType::Track]),
    ("bus", &[EntityType::Track]),
    ("layer", &[EntityType::Track]),
    ("verse", &[EntityType::Section]),
    ("bridge", &[EntityType::Section]),
    ("intro", &[EntityType::Section]),
    ("outro", &[EntityType::Section]),
    ("section", &[EntityType::Section]),
    ("hook", &[EntityType::Section]),
    ("refrain", &[EntityType::Section]),
    ("breakdown", &[EntityType::Section]),
    ("chorus", &[EntityType::Section, EntityType::Effect]),
    ("drop", &[EntityType::Section]),
    ("reverb", &[EntityType::Effect]),
    ("delay", &[EntityType::Effect]),
    ("echo", &[EntityType::Effect]),
    ("compression", &[EntityType::Effect]),
    ("compressor", &[EntityType::Effect]),
    ("distortion", &[EntityType::Effect]),
    ("eq", &[EntityType::Effect]),
    ("filter", &[EntityType::Effect]),
    ("saturation", &[EntityType::Effect]),
    ("volume", &[EntityType::Parameter]),
    ("gain", &[EntityType::Parameter]),
    ("pitch", &[EntityType::Parameter]),
    ("tempo", &[EntityType::Parameter]),
    ("pan", &[EntityType::Parameter]),
    ("level", &[EntityType::Parameter]),
    ("treble", &[EntityType::Parameter]),
    ("mids", &[EntityType::Parameter]),
    ("highs", &[EntityType::Parameter]),
    ("lows", &[EntityType::Parameter]),
    ("bass", &[EntityType::Instrument, EntityType::Parameter]),
    ("drums", &[EntityType::Instrument]),
    ("drum", &[EntityType::Instrument]),
    ("vocals", &[EntityType::Instrument]),
    ("vocal", &[EntityType::Instrument]),
    ("guitar", &[EntityType::Instrument]),
    ("synth", &[EntityType::Instrument]),
    ("piano", &[EntityType::Instrument]),
    ("keys", &[EntityType::Instrument]),
    ("strings", &[EntityType::Instrument]),
    ("pad", &[EntityType::Instrument]),
    ("lead", &[EntityType::Instrument]),
    ("kick", &[EntityType::Instrument]),
    ("snare", &[EntityType::Instrument]),
    ("hats", &[EntityType::Instrument]),
    ("note", &[EntityType::Note]),
    ("chord", &[EntityType::Note]),
    ("melody", &[EntityType::Note]),
    ("harmony", &[EntityType::Note]),
    ("riff", &[EntityType::Note]),
    ("bar", &[EntityType::TimeUnit]),
    ("beat", &[EntityType::TimeUnit]),
    ("measure", &[EntityType::TimeUnit]),
    ("song", &[EntityType::Project]),
    ("mix", &[EntityType::Project]),
    ("project", &[EntityType::Project]),
];

const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "to", "from", "by", "with", "of", "for", "between", "after", "before",
    "during", "around", "near", "through", "until", "till", "into", "over", "under", "within",
    "throughout", "past", "following",
];

const DETERMINERS: &[&str] = &["the", "a", "an", "this", "that", "these", "those"];

const PRONOUNS: &[&str] = &[
    "it", "them", "they", "its", "itself", "everything", "something", "anything", "nothing",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "then", "so", "nor", "yet", "while", "plus", "because", "since", "if",
    "unless",
];

const NEGATIONS: &[&str] = &["not", "no", "never", "without", "don't", "dont"];

const DEGREE_WORDS: &[&str] = &[
    "very", "slightly", "really", "quite", "extremely", "somewhat", "more", "less", "too",
    "way", "super", "barely",
];

const QUESTION_WORDS: &[&str] = &["what", "which", "where", "when", "how", "why", "who"];

const MODALS: &[&str] = &[
    "can", "could", "should", "would", "will", "must", "may", "might", "shall",
];

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    "hundred", "half", "couple", "dozen",
];

const UNIT_WORDS: &[&str] = &[
    "db", "decibel", "decibels", "semitone", "semitones", "st", "cent", "cents", "hz", "khz",
    "bpm", "bar", "bars", "beat", "beats", "measure", "measures", "ms", "millisecond",
    "milliseconds", "second", "seconds", "sec", "secs", "minute", "minutes", "min", "percent",
    "octave", "octaves", "step", "steps", "degrees", "velocity",
];

static VERB_FORMS: Lazy<HashMap<&'static str, VerbForm>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for &(lemma, third, past, past_part, pres_part) in VERBS {
        let forms = [
            (lemma, Inflection::Base),
            (third, Inflection::ThirdPerson),
            (past, Inflection::Past),
            (past_part, Inflection::PastParticiple),
            (pres_part, Inflection::PresentParticiple),
        ];
        for (surface, inflection) in forms {
            // First entry wins so shared forms (past == past participle) keep
            // the earlier, more common reading.
            map.entry(surface).or_insert(VerbForm { lemma, inflection });
        }
    }
    map
});

static ADJECTIVE_FORMS: Lazy<HashMap<&'static str, AdjectiveForm>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for &(base, comparative, superlative, nominalization) in ADJECTIVES {
        let forms = [
            (base, Inflection::Base),
            (comparative, Inflection::Comparative),
            (superlative, Inflection::Superlative),
            (nominalization, Inflection::Nominalization),
        ];
        for (surface, inflection) in forms {
            map.entry(surface).or_insert(AdjectiveForm { base, inflection });
        }
    }
    map
});

static NOUN_TYPE_MAP: Lazy<HashMap<&'static str, &'static [EntityType]>> =
    Lazy::new(|| NOUN_TYPES.iter().map(|&(noun, types)| (noun, types)).collect());

/// Look up a surface form in the domain verb table.
pub fn lookup_verb(surface: &str) -> Option<VerbForm> {
    VERB_FORMS.get(surface).copied()
}

/// Look up a surface form in the domain adjective table.
pub fn lookup_adjective(surface: &str) -> Option<AdjectiveForm> {
    ADJECTIVE_FORMS.get(surface).copied()
}

/// Entity type candidates for a noun lemma; empty when the noun is unknown.
pub fn lookup_noun_types(lemma: &str) -> &'static [EntityType] {
    NOUN_TYPE_MAP.get(lemma).copied().unwrap_or(&[])
}

/// True if the lemma is a known domain noun.
pub fn is_known_noun(lemma: &str) -> bool {
    NOUN_TYPE_MAP.contains_key(lemma)
}

pub fn is_preposition(word: &str) -> bool {
    PREPOSITIONS.contains(&word)
}

pub fn is_determiner(word: &str) -> bool {
    DETERMINERS.contains(&word)
}

pub fn is_pronoun(word: &str) -> bool {
    PRONOUNS.contains(&word)
}

pub fn is_conjunction_word(word: &str) -> bool {
    CONJUNCTIONS.contains(&word)
}

pub fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word)
}

pub fn is_degree_word(word: &str) -> bool {
    DEGREE_WORDS.contains(&word)
}

pub fn is_question_word(word: &str) -> bool {
    QUESTION_WORDS.contains(&word)
}

pub fn is_modal(word: &str) -> bool {
    MODALS.contains(&word)
}

pub fn is_number_word(word: &str) -> bool {
    NUMBER_WORDS.contains(&word)
}

pub fn is_unit_word(word: &str) -> bool {
    UNIT_WORDS.contains(&word)
}

/// True if the word is independently known to any table.
///
/// The morphology fallback uses this as its guard: a suffix rule only applies
/// when stripping (plus degemination or silent-e restoration) yields a word
/// the vocabulary already knows.
pub fn is_known_word(word: &str) -> bool {
    VERB_FORMS.contains_key(word)
        || ADJECTIVE_FORMS.contains_key(word)
        || NOUN_TYPE_MAP.contains_key(word)
        || is_preposition(word)
        || is_determiner(word)
        || is_pronoun(word)
        || is_conjunction_word(word)
        || is_degree_word(word)
        || is_number_word(word)
        || is_unit_word(word)
}

/// The word class the vocabulary assigns to a base form.
pub fn word_class_of(word: &str) -> WordClass {
    if VERB_FORMS.contains_key(word) {
        WordClass::Verb
    } else if ADJECTIVE_FORMS.contains_key(word) {
        WordClass::Adjective
    } else if NOUN_TYPE_MAP.contains_key(word) {
        WordClass::Noun
    } else {
        WordClass::Unknown
    }
}
