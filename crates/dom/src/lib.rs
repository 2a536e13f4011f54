//! Arena-backed element tree.
//!
//! Uses generational indices from the `arena` crate instead of Rc/RefCell.

pub mod element;
pub mod node;
pub mod tree;

pub use element::ElementRef;
pub use node::*;
pub use tree::Dom;
