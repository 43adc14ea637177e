//! Arena-based XML document
//!
//! Nodes live in one `Vec` with the document node at index 0. Ids are handed
//! out as events arrive, so id order is document order.

use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use super::strings::StringPool;
use crate::config::EngineConfig;
use crate::error::ParseError;
use crate::reader::events::{local_part, StartElement};
use crate::reader::{SliceReader, XmlEvent};

/// A parsed reply document, independent of the input bytes
#[derive(Debug)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
    attributes: Vec<XmlAttribute>,
    strings: StringPool,
    root_element: Option<NodeId>,
}

impl XmlDocument {
    fn empty() -> Self {
        let mut nodes = Vec::with_capacity(256);
        nodes.push(XmlNode::document());
        XmlDocument {
            nodes,
            attributes: Vec::with_capacity(128),
            strings: StringPool::new(),
            root_element: None,
        }
    }

    /// Parse leniently
    ///
    /// A mismatched end tag closes the nearest open element with that name
    /// (or is ignored), unclosed elements are closed at end of input and
    /// anything after an unterminated construct is dropped.
    pub fn parse(input: impl AsRef<[u8]>) -> Result<Self, ParseError> {
        Self::build(input.as_ref(), false)
    }

    /// Parse as well-formed XML 1.0 (tags, nesting and root checks only)
    pub fn parse_strict(input: impl AsRef<[u8]>) -> Result<Self, ParseError> {
        Self::build(input.as_ref(), true)
    }

    pub fn parse_with(config: &EngineConfig, input: impl AsRef<[u8]>) -> Result<Self, ParseError> {
        Self::build(input.as_ref(), config.strict_parsing)
    }

    fn build(input: &[u8], strict: bool) -> Result<Self, ParseError> {
        let mut doc = XmlDocument::empty();
        let mut reader = if strict {
            SliceReader::new_strict(input)
        } else {
            SliceReader::new(input)
        };
        // Open elements with their raw names, for end-tag matching
        let mut open: Vec<(NodeId, Vec<u8>)> = Vec::new();

        while let Some(event) = reader.next_event() {
            let parent_id = open.last().map_or(0, |(id, _)| *id);

            match event {
                XmlEvent::StartElement(elem) | XmlEvent::EmptyElement(elem)
                    if strict && open.is_empty() && doc.root_element.is_some() =>
                {
                    let name = String::from_utf8_lossy(elem.name);
                    return Err(ParseError::new(
                        format!("Document has multiple root elements (second: <{}>)", name),
                        reader.position(),
                    ));
                }
                XmlEvent::StartElement(elem) => {
                    let name = elem.name.to_vec();
                    let id = doc.add_element(&elem, parent_id);
                    open.push((id, name));
                }
                XmlEvent::EmptyElement(elem) => {
                    doc.add_element(&elem, parent_id);
                }
                XmlEvent::EndElement(name) => {
                    match open.iter().rposition(|(_, open_name)| open_name == name) {
                        Some(pos) if strict && pos + 1 != open.len() => {
                            let expected = String::from_utf8_lossy(&open[open.len() - 1].1);
                            return Err(ParseError::new(
                                format!(
                                    "Tag mismatch: <{}> closed with </{}>",
                                    expected,
                                    String::from_utf8_lossy(name)
                                ),
                                reader.position(),
                            ));
                        }
                        Some(pos) => open.truncate(pos),
                        None if strict => {
                            return Err(ParseError::new(
                                format!(
                                    "Unexpected end tag </{}>",
                                    String::from_utf8_lossy(name)
                                ),
                                reader.position(),
                            ));
                        }
                        None => {}
                    }
                }
                XmlEvent::Text(content) | XmlEvent::CData(content) if open.is_empty() => {
                    if strict && !content.iter().all(u8::is_ascii_whitespace) {
                        return Err(ParseError::new(
                            "Text content not allowed outside the root element",
                            reader.position(),
                        ));
                    }
                }
                XmlEvent::Text(content) => {
                    doc.add_leaf(NodeKind::Text, &content, parent_id);
                }
                XmlEvent::CData(content) => {
                    doc.add_leaf(NodeKind::CData, &content, parent_id);
                }
                XmlEvent::Comment(content) => {
                    doc.add_leaf(NodeKind::Comment, &content, parent_id);
                }
                XmlEvent::ProcessingInstruction { target, .. } => {
                    doc.add_leaf(NodeKind::ProcessingInstruction, target, parent_id);
                }
                XmlEvent::XmlDeclaration | XmlEvent::DocType => {}
            }
        }

        if strict {
            if let Some(err) = reader.error() {
                return Err(err.clone());
            }
            if let Some((_, name)) = open.first() {
                return Err(ParseError::new(
                    format!("Unclosed tag: <{}>", String::from_utf8_lossy(name)),
                    reader.position(),
                ));
            }
        }
        if doc.root_element.is_none() {
            return Err(ParseError::new("Document has no root element", reader.position()));
        }
        Ok(doc)
    }

    fn add_element(&mut self, elem: &StartElement<'_>, parent_id: NodeId) -> NodeId {
        let name_id = self.strings.intern_bytes(elem.name);
        let mut node = XmlNode::new(NodeKind::Element, name_id, Some(parent_id));

        node.attr_start = self.attributes.len() as u32;
        for attr in &elem.attributes {
            let name_id = self.strings.intern_bytes(attr.name);
            let value_id = self.strings.intern_bytes(&attr.value);
            self.attributes.push(XmlAttribute { name_id, value_id });
        }
        node.attr_count = elem.attributes.len().min(u16::MAX as usize) as u16;

        let id = self.push_node(node, parent_id);
        if self.root_element.is_none() && parent_id == 0 {
            self.root_element = Some(id);
        }
        id
    }

    fn add_leaf(&mut self, kind: NodeKind, content: &[u8], parent_id: NodeId) {
        let name_id = self.strings.intern_bytes(content);
        self.push_node(XmlNode::new(kind, name_id, Some(parent_id)), parent_id);
    }

    fn push_node(&mut self, node: XmlNode, parent_id: NodeId) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.link_child(parent_id, id);
        id
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let last_child_opt = self.nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            self.nodes[child_id as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }

    /// Get the root element (first element child of document)
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.root_element
    }

    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    /// Qualified name of an element or PI target
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Element | NodeKind::ProcessingInstruction => Some(self.strings.get(node.name_id)),
            _ => None,
        }
    }

    pub fn node_local_name(&self, id: NodeId) -> Option<&str> {
        self.node_name(id).map(|name| match name.split_once(':') {
            Some((_, local)) => local,
            None => name,
        })
    }

    /// Content of a text, CDATA or comment node
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Text | NodeKind::CData | NodeKind::Comment => Some(self.strings.get(node.name_id)),
            _ => None,
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        match self.get_node(id) {
            Some(node) if node.is_element() => {
                let start = node.attr_start as usize;
                &self.attributes[start..start + node.attr_count as usize]
            }
            _ => &[],
        }
    }

    /// Attribute value by qualified name, falling back to a local-name match
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let attrs = self.attributes(id);
        attrs
            .iter()
            .find(|a| self.strings.get(a.name_id) == name)
            .or_else(|| {
                attrs
                    .iter()
                    .find(|a| local_part(self.strings.get(a.name_id).as_bytes()) == name.as_bytes())
            })
            .map(|a| self.strings.get(a.value_id))
    }

    pub fn get_attribute_values(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.attributes(id)
            .iter()
            .map(|a| (self.strings.get(a.name_id), self.strings.get(a.value_id)))
            .collect()
    }

    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        ChildIter {
            doc: self,
            next: self.get_node(id).and_then(|n| n.first_child),
        }
    }

    /// Descendants in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut iter = DescendantIter {
            doc: self,
            stack: Vec::new(),
        };
        iter.push_children(id);
        iter
    }

    /// Concatenated text of all descendant text nodes
    pub fn string_value(&self, id: NodeId) -> String {
        let Some(node) = self.get_node(id) else {
            return String::new();
        };
        match node.kind {
            NodeKind::Text | NodeKind::CData | NodeKind::Comment => {
                self.strings.get(node.name_id).to_string()
            }
            NodeKind::ProcessingInstruction => String::new(),
            NodeKind::Element | NodeKind::Document => self
                .descendants(id)
                .filter(|&d| self.nodes[d as usize].is_text())
                .map(|d| self.strings.get(self.nodes[d as usize].name_id))
                .collect(),
        }
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d XmlDocument,
    next: Option<NodeId>,
}

impl<'d> Iterator for ChildIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first)
pub struct DescendantIter<'d> {
    doc: &'d XmlDocument,
    stack: Vec<NodeId>,
}

impl<'d> DescendantIter<'d> {
    /// Children go on in reverse so the first child pops first
    fn push_children(&mut self, id: NodeId) {
        let mut child_id = self.doc.get_node(id).and_then(|n| n.last_child);
        while let Some(cid) = child_id {
            self.stack.push(cid);
            child_id = self.doc.get_node(cid).and_then(|n| n.prev_sibling);
        }
    }
}

impl<'d> Iterator for DescendantIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.push_children(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(doc: &XmlDocument) -> NodeId {
        doc.root_element_id().unwrap()
    }

    #[test]
    fn test_parse_simple() {
        let doc = XmlDocument::parse("<route-engine>hello</route-engine>").unwrap();
        assert_eq!(doc.node_name(root(&doc)), Some("route-engine"));
        assert_eq!(doc.string_value(root(&doc)), "hello");
    }

    #[test]
    fn test_ids_in_document_order() {
        let doc = XmlDocument::parse("<root><a/><b><c/></b><d/></root>").unwrap();
        let names: Vec<_> = doc
            .descendants(root(&doc))
            .map(|id| doc.node_name(id).unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        let ids: Vec<_> = doc.descendants(root(&doc)).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_siblings() {
        let doc = XmlDocument::parse("<root><a/><b/><c/></root>").unwrap();
        let children: Vec<_> = doc.children(root(&doc)).collect();
        assert_eq!(children.len(), 3);
        let first = doc.get_node(children[0]).unwrap();
        assert!(first.prev_sibling.is_none());
        assert_eq!(first.next_sibling, Some(children[1]));
    }

    #[test]
    fn test_attributes_and_prefixes() {
        let doc = XmlDocument::parse(r#"<junos:re junos:style="brief" slot="1"/>"#).unwrap();
        let id = root(&doc);
        assert_eq!(doc.node_local_name(id), Some("re"));
        assert_eq!(doc.get_attribute(id, "slot"), Some("1"));
        assert_eq!(doc.get_attribute(id, "style"), Some("brief"));
        assert_eq!(doc.get_attribute(id, "junos:style"), Some("brief"));
        assert_eq!(doc.get_attribute_values(id).len(), 2);
    }

    #[test]
    fn test_lenient_mismatch_closes_nearest() {
        let doc = XmlDocument::parse("<a><b><c>x</b><d/></a>").unwrap();
        let a = root(&doc);
        let names: Vec<_> = doc
            .children(a)
            .filter_map(|id| doc.node_name(id))
            .collect();
        assert_eq!(names, vec!["b", "d"]);
    }

    #[test]
    fn test_lenient_tolerates_unclosed() {
        let doc = XmlDocument::parse("<a><b>text").unwrap();
        assert_eq!(doc.string_value(root(&doc)), "text");
    }

    #[test]
    fn test_strict_rejections() {
        assert!(XmlDocument::parse_strict("<a><b></a>").is_err());
        assert!(XmlDocument::parse_strict("<a>").is_err());
        assert!(XmlDocument::parse_strict("<a/><b/>").is_err());
        assert!(XmlDocument::parse_strict("<a/>junk").is_err());
        assert!(XmlDocument::parse_strict("<a x=1/>").is_err());
        assert!(XmlDocument::parse_strict("<?xml version=\"1.0\"?>\n<a/>\n").is_ok());
    }

    #[test]
    fn test_no_root_is_error() {
        assert!(XmlDocument::parse("").is_err());
        assert!(XmlDocument::parse("just text").is_err());
        assert!(XmlDocument::parse("<!-- only -->").is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let strict = EngineConfig {
            strict_parsing: true,
            ..EngineConfig::default()
        };
        assert!(XmlDocument::parse_with(&strict, "<a><b></a>").is_err());
        assert!(XmlDocument::parse_with(&EngineConfig::default(), "<a><b></a>").is_ok());
    }

    #[test]
    fn test_entities_decoded_in_text_and_attributes() {
        let doc = XmlDocument::parse(r#"<m v="a&amp;b">x &lt; y</m>"#).unwrap();
        let id = root(&doc);
        assert_eq!(doc.get_attribute(id, "v"), Some("a&b"));
        assert_eq!(doc.string_value(id), "x < y");
    }

    #[test]
    fn test_deep_nesting_parses() {
        let depth = 70_000;
        let xml = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        let doc = XmlDocument::parse(&xml).unwrap();
        assert_eq!(doc.node_count(), depth + 1);
        let strict = XmlDocument::parse_strict(&xml).unwrap();
        let deepest = (strict.node_count() - 1) as NodeId;
        assert_eq!(strict.get_node(deepest).and_then(|n| n.parent), Some(deepest - 1));
    }
}
