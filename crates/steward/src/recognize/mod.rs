//! Named-entity recognition for privacy profiling.
//!
//! The [`Recognizer`] trait is the seam to any entity detector. The built-in
//! [`PatternRecognizer`] combines regular expressions and word lists with the
//! column header as context; every label it emits is described in the
//! [`catalog`].
//!
//! # Example
//!
//! ```
//! use steward::recognize::{PatternRecognizer, Recognizer};
//!
//! let recognizer = PatternRecognizer::new();
//! let hits = recognizer.analyze("email", "ada@example.org").unwrap();
//! assert_eq!(hits[0].label, "EMAIL_ADDRESS");
//! ```

pub mod catalog;
mod header;
pub mod lexicon;
mod patterns;
mod recognizer;

pub use catalog::{EntityInfo, PrivacyClass, RiskLevel};
pub use header::{HeaderMatch, HeaderMatcher, header_has_keyword, header_tokens};
pub use patterns::{PatternRecognizer, RecognizerConfig};
pub use recognizer::{EntityHit, NullRecognizer, Recognizer, Span, resolve_overlaps};
