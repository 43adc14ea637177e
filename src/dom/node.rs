//! XML Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    Element,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
}

/// An XML node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: NodeKind,
    /// Parent node (None for document root)
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// String pool id: name for elements and PIs, content for text-like nodes
    pub name_id: u32,
    /// Start of attributes in attribute arena (for elements)
    pub attr_start: u32,
    pub attr_count: u16,
}

impl XmlNode {
    pub fn new(kind: NodeKind, name_id: u32, parent: Option<NodeId>) -> Self {
        XmlNode {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id,
            attr_start: 0,
            attr_count: 0,
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        XmlNode::new(NodeKind::Document, 0, None)
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Text or CDATA
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::CData)
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// Stored attribute
#[derive(Debug, Clone, Copy)]
pub struct XmlAttribute {
    pub name_id: u32,
    pub value_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_like_kinds() {
        assert!(XmlNode::new(NodeKind::CData, 1, Some(0)).is_text());
        assert!(!XmlNode::new(NodeKind::Comment, 1, Some(0)).is_text());
        assert!(!XmlNode::document().has_children());
    }
}
