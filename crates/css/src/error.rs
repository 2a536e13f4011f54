use thiserror::Error;

use crate::token::CssToken;

/// What went wrong while parsing a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectorErrorKind {
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("empty selector")]
    EmptySelector,
    #[error("combinator without a following compound selector")]
    DanglingCombinator,
    #[error("expected `|` between namespace and name")]
    ExpectedNamespaceSeparator,
    #[error("namespace prefix without a local name")]
    MissingLocalName,
    #[error("attribute selector is not closed")]
    UnterminatedAttribute,
    #[error("invalid attribute operator")]
    InvalidAttributeOperator,
    #[error("attribute value must be an identifier or string")]
    InvalidAttributeValue,
    #[error("function token where none is allowed")]
    UnexpectedFunction,
    #[error("function arguments are not closed")]
    UnterminatedFunction,
}

/// Selector syntax error. Carries the offending token and its index in the
/// token stream handed to the parser.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid selector: {kind} at token {position} ({token:?})")]
pub struct SelectorParseError {
    pub kind: SelectorErrorKind,
    pub token: CssToken,
    pub position: usize,
}

impl SelectorParseError {
    pub fn new(kind: SelectorErrorKind, token: CssToken, position: usize) -> Self {
        Self {
            kind,
            token,
            position,
        }
    }
}

pub type Result<T> = std::result::Result<T, SelectorParseError>;
