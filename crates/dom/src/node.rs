//! Node model for the element tree.
//!
//! Nodes live in an `Arena<Node>` and are referenced by [`NodeId`]. Tree
//! structure is stored as intrusive parent/child/sibling links on each node.

use arena::Idx;

/// Handle to a node in a [`crate::Dom`].
pub type NodeId = Idx<Node>;

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// One attribute. `namespace` is `None` for ordinary (null-namespace)
/// attributes such as `class` or `href`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            namespace: None,
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn namespaced(namespace: &str, name: &str, value: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Element data
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    /// Namespace URL; `None` for elements in no namespace.
    pub namespace: Option<String>,
    /// Lowercase for HTML elements, as written otherwise.
    pub local_name: String,
    pub attrs: Vec<Attr>,
    /// Cached `id` attribute.
    pub id: Option<String>,
    /// Cached, whitespace-split `class` attribute.
    pub classes: Vec<String>,
}

impl ElementData {
    pub fn new(local_name: &str, namespace: Option<&str>, attrs: Vec<Attr>) -> Self {
        let local_name = if namespace == Some(HTML_NAMESPACE) {
            local_name.to_ascii_lowercase()
        } else {
            local_name.to_string()
        };
        let mut data = Self {
            namespace: namespace.map(str::to_string),
            local_name,
            attrs,
            id: None,
            classes: Vec::new(),
        };
        data.refresh_caches();
        data
    }

    /// Value of the attribute `name` in `namespace` (`None` = null namespace).
    pub fn attribute(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.namespace.as_deref() == namespace && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Every attribute called `name`, whatever its namespace.
    pub fn attributes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Attr> + 'a {
        self.attrs.iter().filter(move |a| a.name == name)
    }

    /// Add or replace an attribute, keeping the `id`/`class` caches in sync.
    pub fn set_attribute(&mut self, attr: Attr) {
        match self
            .attrs
            .iter_mut()
            .find(|a| a.namespace == attr.namespace && a.name == attr.name)
        {
            Some(existing) => existing.value = attr.value,
            None => self.attrs.push(attr),
        }
        self.refresh_caches();
    }

    pub fn remove_attribute(&mut self, namespace: Option<&str>, name: &str) -> Option<Attr> {
        let pos = self
            .attrs
            .iter()
            .position(|a| a.namespace.as_deref() == namespace && a.name == name)?;
        let removed = self.attrs.remove(pos);
        self.refresh_caches();
        Some(removed)
    }

    fn refresh_caches(&mut self) {
        self.id = self.attribute(None, "id").map(str::to_string);
        self.classes = self
            .attribute(None, "class")
            .map(|v| v.split_ascii_whitespace().map(String::from).collect())
            .unwrap_or_default();
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text { data: String },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub data: NodeData,

    // -- tree links ----------------------------------------------------------
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text { data } => Some(data),
            _ => None,
        }
    }
}
