use dom::NodeId;
use thiserror::Error;

use crate::layout::PercentageBase;
use crate::value::Unit;

/// An Assigned write the property's definition does not permit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyTypeError {
    #[error("`{property}` does not accept {kind} values")]
    KindNotAllowed {
        property: String,
        kind: &'static str,
    },
    #[error("`{property}` does not accept the keyword `{keyword}`")]
    KeywordNotAllowed { property: String, keyword: String },
}

/// A Specified value that cannot be turned into a Computed one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    #[error("`{property}` has no percentage resolver")]
    NoPercentageResolver { property: String },
    #[error("layout has no {base:?} for {element:?}")]
    MissingPercentageBase {
        element: NodeId,
        base: PercentageBase,
    },
    #[error("layout cannot resolve unit `{unit}` for {element:?}")]
    UnknownUnit { element: NodeId, unit: Unit },
    #[error("unknown property `{0}`")]
    UnknownProperty(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error(transparent)]
    Type(#[from] PropertyTypeError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Selector(#[from] css::SelectorParseError),
    #[error("element {0:?} is not in the style store")]
    UnknownElement(NodeId),
    #[error("{parent:?} cannot become the parent of {element:?}")]
    InvalidParent { element: NodeId, parent: NodeId },
}

pub type Result<T> = std::result::Result<T, StyleError>;
