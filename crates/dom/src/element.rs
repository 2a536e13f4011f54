//! Borrowed view of one element.

use crate::node::{ElementData, NodeId};
use crate::tree::Dom;

/// An element together with the tree it lives in. Cheap to copy; the
/// selector matcher navigates through it.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    dom: &'a Dom,
    id: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    /// `None` if `id` is stale or not an element.
    pub fn new(dom: &'a Dom, id: NodeId) -> Option<Self> {
        let data = dom.element(id)?;
        Some(Self { dom, id, data })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn dom(&self) -> &'a Dom {
        self.dom
    }

    pub fn data(&self) -> &'a ElementData {
        self.data
    }

    pub fn parent(&self) -> Option<Self> {
        Self::new(self.dom, self.dom.parent_element(self.id)?)
    }

    pub fn prev_sibling(&self) -> Option<Self> {
        Self::new(self.dom, self.dom.prev_sibling_element(self.id)?)
    }

    pub fn next_sibling(&self) -> Option<Self> {
        Self::new(self.dom, self.dom.next_sibling_element(self.id)?)
    }

    /// No parent at all, or a document parent.
    pub fn is_root(&self) -> bool {
        self.dom.parent_element(self.id).is_none()
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dom, other.dom) && self.id == other.id
    }
}

impl Eq for ElementRef<'_> {}

impl std::fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{} {:?}>", self.data.local_name, self.id)
    }
}
