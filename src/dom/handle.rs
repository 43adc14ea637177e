//! `NodeRef`: a node handle that keeps its document alive

use super::document::XmlDocument;
use super::node::{NodeId, NodeKind};
use crate::error::SelectorError;
use crate::xpath::{self, Selection};
use std::fmt;
use std::sync::Arc;

/// A node inside a shared, immutable document
///
/// Cloning is cheap. Two handles are `ptr_eq` when they point at the same
/// node of the same document allocation.
#[derive(Clone)]
pub struct NodeRef {
    doc: Arc<XmlDocument>,
    id: NodeId,
}

impl NodeRef {
    /// Handle for `id`, or None when the id is out of range
    pub fn new(doc: Arc<XmlDocument>, id: NodeId) -> Option<Self> {
        doc.get_node(id)?;
        Some(NodeRef { doc, id })
    }

    /// Handle for the document's root element
    pub fn root(doc: Arc<XmlDocument>) -> Option<Self> {
        let id = doc.root_element_id()?;
        Some(NodeRef { doc, id })
    }

    /// Another node of the same document
    pub(crate) fn sibling_handle(&self, id: NodeId) -> NodeRef {
        NodeRef {
            doc: Arc::clone(&self.doc),
            id,
        }
    }

    pub fn document(&self) -> &Arc<XmlDocument> {
        &self.doc
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.doc
            .get_node(self.id)
            .map_or(NodeKind::Document, |n| n.kind)
    }

    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    /// Qualified element name
    pub fn tag(&self) -> Option<&str> {
        match self.kind() {
            NodeKind::Element => self.doc.node_name(self.id),
            _ => None,
        }
    }

    pub fn local_name(&self) -> Option<&str> {
        match self.kind() {
            NodeKind::Element => self.doc.node_local_name(self.id),
            _ => None,
        }
    }

    /// Text before the first non-text child, or None if there is none
    ///
    /// For a text node this is the node's own content.
    pub fn text(&self) -> Option<String> {
        if let Some(content) = self.doc.text_content(self.id) {
            return Some(content.to_string());
        }
        let mut text: Option<String> = None;
        for child in self.doc.children(self.id) {
            match self.doc.get_node(child) {
                Some(node) if node.is_text() => {
                    let content = self.doc.strings().get(node.name_id);
                    text.get_or_insert_with(String::new).push_str(content);
                }
                _ => break,
            }
        }
        text
    }

    /// All descendant text
    pub fn string_value(&self) -> String {
        self.doc.string_value(self.id)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.doc.get_attribute(self.id, name)
    }

    pub fn attributes(&self) -> Vec<(&str, &str)> {
        self.doc.get_attribute_values(self.id)
    }

    pub fn parent(&self) -> Option<NodeRef> {
        let parent = self.doc.get_node(self.id)?.parent?;
        Some(self.sibling_handle(parent))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.doc.children(self.id).map(|id| self.sibling_handle(id))
    }

    /// Child elements only
    pub fn elements(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.children().filter(NodeRef::is_element)
    }

    /// Evaluate a selector with this node as context
    pub fn select(&self, selector: &str) -> Result<Selection, SelectorError> {
        xpath::select(self, selector)
    }

    /// Reference identity
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Arc::ptr_eq(&self.doc, &other.doc) && self.id == other.id
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => write!(f, "NodeRef(<{}> #{})", tag, self.id),
            None => write!(f, "NodeRef({:?} #{})", self.kind(), self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> NodeRef {
        NodeRef::root(Arc::new(XmlDocument::parse(xml).unwrap())).unwrap()
    }

    #[test]
    fn test_text_is_leading_run() {
        let node = parse("<re>  RE0 <slot>1</slot> tail</re>");
        assert_eq!(node.text().as_deref(), Some("  RE0 "));
        assert_eq!(node.string_value(), "  RE0 1 tail");

        let empty = parse("<re><slot>1</slot></re>");
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_text_joins_cdata() {
        let node = parse("<m>a<![CDATA[<b>]]>c<x/></m>");
        assert_eq!(node.text().as_deref(), Some("a<b>c"));
    }

    #[test]
    fn test_navigation() {
        let root = parse("<a><b/>text<c k=\"v\"/></a>");
        assert_eq!(root.children().count(), 3);
        let elems: Vec<_> = root.elements().collect();
        assert_eq!(elems.len(), 2);
        assert_eq!(elems[1].attribute("k"), Some("v"));
        assert!(elems[0].parent().unwrap().ptr_eq(&root));
        assert_eq!(root.parent().map(|p| p.kind()), Some(NodeKind::Document));
    }

    #[test]
    fn test_ptr_eq_needs_same_document() {
        let a = parse("<a/>");
        let b = parse("<a/>");
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }
}
