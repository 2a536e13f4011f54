//! Tree construction and navigation.
//!
//! [`Dom`] owns the node arena and keeps the intrusive links consistent.

use arena::Arena;
use log::trace;

use crate::node::{Attr, ElementData, HTML_NAMESPACE, Node, NodeData, NodeId};

/// An element tree, usually rooted at a document node.
#[derive(Debug, Default)]
pub struct Dom {
    nodes: Arena<Node>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    // =======================================================================
    // Node creation
    // =======================================================================

    pub fn create_document(&mut self) -> NodeId {
        self.nodes.alloc(Node::new(NodeData::Document))
    }

    pub fn create_element(
        &mut self,
        local_name: &str,
        namespace: Option<&str>,
        attrs: Vec<Attr>,
    ) -> NodeId {
        let data = ElementData::new(local_name, namespace, attrs);
        self.nodes.alloc(Node::new(NodeData::Element(data)))
    }

    /// HTML element with the given `id="…" class="…"`-style attributes.
    pub fn create_html_element(&mut self, local_name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|&(name, value)| Attr::new(name, value))
            .collect();
        self.create_element(local_name, Some(HTML_NAMESPACE), attrs)
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.nodes.alloc(Node::new(NodeData::Text {
            data: data.to_string(),
        }))
    }

    // =======================================================================
    // Access
    // =======================================================================

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes.get(id)?.as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id)?.as_element_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =======================================================================
    // Mutation
    // =======================================================================

    /// Make `child` the last child of `parent`, moving it if already attached.
    /// Returns `false` if either id is stale or the move would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference` (at the end for `None`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> bool {
        if !self.contains(parent) || !self.contains(child) || self.is_inclusive_ancestor(child, parent)
        {
            return false;
        }
        if let Some(r) = reference {
            if r == child || self.nodes.get(r).and_then(|n| n.parent) != Some(parent) {
                return false;
            }
        }

        self.detach(child);

        let prev = match reference {
            Some(r) => self.nodes.get(r).and_then(|n| n.prev_sibling),
            None => self.nodes.get(parent).and_then(|n| n.last_child),
        };

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        match prev {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(p) {
                    node.next_sibling = Some(child);
                }
            }
            None => {
                if let Some(node) = self.nodes.get_mut(parent) {
                    node.first_child = Some(child);
                }
            }
        }
        match reference {
            Some(r) => {
                if let Some(node) = self.nodes.get_mut(r) {
                    node.prev_sibling = Some(child);
                }
            }
            None => {
                if let Some(node) = self.nodes.get_mut(parent) {
                    node.last_child = Some(child);
                }
            }
        }
        trace!("attached {child:?} under {parent:?}");
        true
    }

    /// Unlink `id` from its parent. The subtree below it stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let Some((parent, prev, next)) = self
            .nodes
            .get(id)
            .map(|n| (n.parent, n.prev_sibling, n.next_sibling))
        else {
            return;
        };
        let Some(parent) = parent else {
            return;
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(p) {
                    node.next_sibling = next;
                }
            }
            None => {
                if let Some(node) = self.nodes.get_mut(parent) {
                    node.first_child = next;
                }
            }
        }
        match next {
            Some(n) => {
                if let Some(node) = self.nodes.get_mut(n) {
                    node.prev_sibling = prev;
                }
            }
            None => {
                if let Some(node) = self.nodes.get_mut(parent) {
                    node.last_child = prev;
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    /// Detach `id` and free it with its whole subtree. Returns the freed ids,
    /// `id` first.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        self.detach(id);
        let mut freed = vec![id];
        freed.extend(self.descendants(id));
        for &node in &freed {
            self.nodes.remove(node);
        }
        freed
    }

    // =======================================================================
    // Traversal
    // =======================================================================

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Parent if it is an element; a document parent does not count.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.element(p).is_some())
    }

    pub fn prev_sibling_element(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.nodes.get(id)?.prev_sibling;
        while let Some(sib) = cursor {
            if self.element(sib).is_some() {
                return Some(sib);
            }
            cursor = self.nodes.get(sib)?.prev_sibling;
        }
        None
    }

    pub fn next_sibling_element(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.nodes.get(id)?.next_sibling;
        while let Some(sib) = cursor {
            if self.element(sib).is_some() {
                return Some(sib);
            }
            cursor = self.nodes.get(sib)?.next_sibling;
        }
        None
    }

    /// Children in document order.
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.nodes.get(parent).and_then(|n| n.first_child);
        std::iter::successors(first, move |&id| self.nodes.get(id).and_then(|n| n.next_sibling))
    }

    /// Parent first, root last.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Pre-order descendants, not including `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let start = stack.len();
            stack.extend(self.children(next));
            stack[start..].reverse();
        }
        out
    }

    /// `true` if `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).any(|a| a == ancestor)
    }

    /// No element children and no non-empty text, as `:empty` defines it.
    pub fn is_empty_element(&self, id: NodeId) -> bool {
        self.children(id).all(|child| match self.nodes.get(child) {
            Some(node) => node.text().is_some_and(str::is_empty),
            None => true,
        })
    }
}
