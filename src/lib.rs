//! Deterministic natural-language analysis for music edit requests.
//!
//! Turns an utterance like *"just boost every chorus by 3 db and then mute
//! the track called 'Glass Pad'"* into structured fragments a music editor
//! can act on. Everything is rule-table driven: no models, no network, no
//! randomness — the same input always produces the same analysis, and every
//! fragment carries a byte span back into the original text.
//!
//! The pipeline layers:
//!
//! - [`tokenizer`] — span-preserving tokenization with multi-word idiom
//!   merging and word-list tagging
//! - [`morphology`] — surface word → lemma + inflection
//! - [`units`] / [`numbers`] — number and unit expression parsing with
//!   dimension-checked conversion
//! - [`quantifier`] — quantified selections and their scope readings
//! - [`coordination`] — conjunction structure, correlatives, ellipsis
//! - [`time_expr`] — bar/beat ranges, sections, durations, repetitions
//! - [`named_ref`] — quoted names, naming commands, tag references
//! - [`locality`] — restriction/threshold/totality markers and their
//!   combined cost bias
//! - [`pipeline`] — one call that runs everything and bundles the results
//!
//! Ambiguity is never resolved silently: when the surface admits more than
//! one reading, the fragment records every candidate and carries an
//! [`AnalysisWarning`] naming them.
//!
//! ```
//! let analysis = mixdown_nlp::analyze("add reverb to every chorus");
//!
//! let selection = &analysis.selections[0];
//! assert_eq!(selection.restriction.as_deref(), Some("chorus"));
//! assert_eq!(
//!     selection.scope_reading,
//!     mixdown_nlp::quantifier::ScopeReading::Distributive,
//! );
//! ```

pub mod coordination;
mod idiom;
pub mod lexicon;
pub mod locality;
pub mod morphology;
pub mod named_ref;
pub mod numbers;
pub mod pipeline;
pub mod quantifier;
pub mod span;
pub mod time_expr;
pub mod token;
pub mod tokenizer;
pub mod units;
pub mod warnings;

pub use crate::pipeline::{analyze, Pipeline, UtteranceAnalysis};
pub use crate::span::Span;
pub use crate::token::{Token, TokenStream, TokenTag, TokenType};
pub use crate::tokenizer::tokenize;
pub use crate::warnings::AnalysisWarning;
