//! CSS selector syntax: tokens, the selector AST and a strict parser.

pub mod error;
pub mod parser;
pub mod selector;
pub mod specificity;
pub mod stream;
pub mod token;

pub use error::{SelectorErrorKind, SelectorParseError};
pub use parser::{parse, parse_single, parse_single_str, parse_str};
pub use selector::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, NamespaceConstraint,
    SelectorList, SimpleSelector, Step,
};
pub use specificity::{Specificity, compute_specificity, specificity};
pub use stream::TokenStream;
pub use token::{CssToken, Tokenizer, tokenize};
