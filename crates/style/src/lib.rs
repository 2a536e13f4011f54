//! # Style Engine
//!
//! Selector matching, property definitions, and the per-element value
//! pipeline: Assigned → Specified → Computed, with lazy inheritance and
//! cascade merging.

pub mod cascade;
pub mod error;
pub mod layout;
pub mod matching;
pub mod property;
pub mod registry;
pub mod store;
pub mod value;

pub use cascade::{
    Declaration, MatchedRule, StyleRule, apply_matched_rules, cascade_tree,
    collect_matching_rules,
};
pub use error::{PropertyTypeError, ResolutionError, Result, StyleError};
pub use layout::{LayoutContext, PercentageBase, StaticLayout, absolute_unit_scale};
pub use matching::{
    CaseSensitivity, MatchingContext, QuirksMode, SelectorElement, matches, matches_compound,
    matches_list, matches_simple,
};
pub use property::{Provenance, StyleOrigin, StyleProperty};
pub use registry::{Dirt, PercentageResolver, PropertyDefinition, PropertyId, PropertyRegistry};
pub use store::{StyleChange, StyleStore, SubscriptionId};
pub use value::{StyleValue, Unit, ValueKinds};
