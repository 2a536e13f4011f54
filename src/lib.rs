//! Selector matching and style cascade core.
//!
//! Re-exports the member crates: `css` parses selectors, `dom` is the
//! reference element tree, and `style` matches selectors and resolves
//! property values.

pub use arena;
pub use css;
pub use dom;
pub use style;

pub use css::{SelectorList, SelectorParseError, Specificity, parse_single_str, parse_str};
pub use style::{
    LayoutContext, MatchingContext, PropertyRegistry, StyleStore, StyleValue, matches,
    matches_list,
};
