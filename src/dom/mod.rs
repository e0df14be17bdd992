//! Page Document Model
//!
//! A small in-memory stand-in for the page markup. Elements carry an optional
//! id, classes, attributes, display text, an inline `display` style and, for
//! form fields, a current and a default value. The dashboard components only
//! ever touch the page through this model.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Index of an element within its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A single page element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub id: Option<String>,
    pub tag: String,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    /// Inline `display` style; `None` means the stylesheet decides
    pub display: Option<String>,
    /// Current value of a form field
    pub value: String,
    /// Value restored by a form reset
    pub default_value: String,
    pub parent: Option<NodeId>,
}

impl Element {
    /// Create an element with the given tag name
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set the element id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    /// Set an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the display text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the inline display style
    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Set both the current and the default value of a form field
    pub fn value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.default_value = value.clone();
        self.value = value;
        self
    }

    /// Whether the element has the class
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Look up an attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the inline style hides the element
    pub fn is_hidden(&self) -> bool {
        self.display.as_deref() == Some("none")
    }
}

/// In-memory page document
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
    by_id: HashMap<String, NodeId>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element at the top level
    pub fn append(&mut self, element: Element) -> NodeId {
        self.insert(element, None)
    }

    /// Append an element as a child of `parent`
    pub fn append_child(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.insert(element, Some(parent))
    }

    fn insert(&mut self, mut element: Element, parent: Option<NodeId>) -> NodeId {
        let node = NodeId(self.elements.len());
        element.parent = parent;

        // First element with a given id wins, as with getElementById
        if let Some(id) = &element.id {
            self.by_id.entry(id.clone()).or_insert(node);
        }

        self.elements.push(element);
        node
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the document has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Resolve an element id
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    /// Whether an element with the id exists
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.0)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(node.0)
    }

    /// Look up an element by id
    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.find(id).and_then(|node| self.get(node))
    }

    /// Look up an element by id, mutably
    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        let node = self.find(id)?;
        self.get_mut(node)
    }

    /// All elements carrying a class, in document order
    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.has_class(class))
            .map(|(idx, _)| NodeId(idx))
            .collect()
    }

    /// Whether `node` sits anywhere below `ancestor`
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.get(node).and_then(|e| e.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.get(parent).and_then(|e| e.parent);
        }
        false
    }

    /// Set the display text of an element by id
    ///
    /// Returns `false` if the element does not exist.
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        match self.by_id_mut(id) {
            Some(element) => {
                element.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Set the inline display style of an element by id
    pub fn set_display(&mut self, id: &str, display: &str) -> bool {
        match self.by_id_mut(id) {
            Some(element) => {
                element.display = Some(display.to_string());
                true
            }
            None => false,
        }
    }

    /// Add a class to an element by id
    pub fn add_class(&mut self, id: &str, class: &str) -> bool {
        match self.by_id_mut(id) {
            Some(element) => {
                element.classes.insert(class.to_string());
                true
            }
            None => false,
        }
    }

    /// Remove a class from an element by id
    pub fn remove_class(&mut self, id: &str, class: &str) -> bool {
        match self.by_id_mut(id) {
            Some(element) => {
                element.classes.remove(class);
                true
            }
            None => false,
        }
    }

    /// Set the current value of a form field by id
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.by_id_mut(id) {
            Some(element) => {
                element.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Current value of a form field by id
    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.by_id(id).map(|e| e.value.as_str())
    }

    /// Restore every field below the form to its default value
    ///
    /// Returns the number of fields touched.
    pub fn reset_form(&mut self, form_id: &str) -> usize {
        let Some(form) = self.find(form_id) else {
            return 0;
        };

        let fields: Vec<NodeId> = (0..self.elements.len())
            .map(NodeId)
            .filter(|node| self.is_descendant(*node, form))
            .collect();

        for node in &fields {
            if let Some(field) = self.get_mut(*node) {
                field.value = field.default_value.clone();
            }
        }

        fields.len()
    }
}
