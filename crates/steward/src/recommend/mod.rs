//! Candidate actions per column.
//!
//! The [`RecommendationEngine`] reads column profiles and proposes zero or
//! more [`Recommendation`]s per column, each with typed [`Evidence`] that a
//! reviewer or a judge can decide on without re-profiling the data.

mod action;
mod engine;
mod recommendation;
mod reference;

pub use action::Action;
pub use engine::{RecommendConfig, RecommendationEngine};
pub use recommendation::{
    BucketExample, CategorizeEvidence, DropEvidence, EnrichEvidence, Evidence, FillCandidates,
    GeneralizeEvidence, MaskEvidence, Recommendation,
};
pub use reference::{CountryReference, ReferenceLookup};
