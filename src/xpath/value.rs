//! XPath Value Types
//!
//! The four XPath 1.0 types, plus attribute values. Attributes are not
//! arena nodes, so the attribute axis yields their values directly.

use crate::dom::{NodeId, XmlDocument};

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum XPathValue {
    /// Nodes in document order, no duplicates
    NodeSet(Vec<NodeId>),
    /// Attribute values in document order
    AttrValues(Vec<String>),
    Boolean(bool),
    Number(f64),
    String(String),
}

impl XPathValue {
    pub fn empty_nodeset() -> Self {
        XPathValue::NodeSet(Vec::new())
    }

    pub fn single_node(id: NodeId) -> Self {
        XPathValue::NodeSet(vec![id])
    }

    /// XPath boolean() semantics
    pub fn to_boolean(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::AttrValues(values) => !values.is_empty(),
            XPathValue::Boolean(b) => *b,
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::String(s) => !s.is_empty(),
        }
    }

    /// XPath number() semantics
    pub fn to_number(&self, doc: &XmlDocument) -> f64 {
        match self {
            XPathValue::Boolean(b) => f64::from(u8::from(*b)),
            XPathValue::Number(n) => *n,
            _ => parse_number(&self.to_string_value(doc)),
        }
    }

    /// XPath string() semantics; a set converts through its first member
    pub fn to_string_value(&self, doc: &XmlDocument) -> String {
        match self {
            XPathValue::NodeSet(nodes) => nodes
                .first()
                .map(|&id| doc.string_value(id))
                .unwrap_or_default(),
            XPathValue::AttrValues(values) => values.first().cloned().unwrap_or_default(),
            XPathValue::Boolean(b) => b.to_string(),
            XPathValue::Number(n) => format_number(*n),
            XPathValue::String(s) => s.clone(),
        }
    }

    pub fn is_nodeset(&self) -> bool {
        matches!(self, XPathValue::NodeSet(_))
    }

    pub fn as_nodeset(&self) -> Option<&[NodeId]> {
        match self {
            XPathValue::NodeSet(nodes) => Some(nodes),
            _ => None,
        }
    }
}

impl Default for XPathValue {
    fn default() -> Self {
        XPathValue::empty_nodeset()
    }
}

impl From<bool> for XPathValue {
    fn from(b: bool) -> Self {
        XPathValue::Boolean(b)
    }
}

impl From<f64> for XPathValue {
    fn from(n: f64) -> Self {
        XPathValue::Number(n)
    }
}

impl From<String> for XPathValue {
    fn from(s: String) -> Self {
        XPathValue::String(s)
    }
}

/// XPath number literal grammar: optional '-', digits, optional fraction
pub fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    let valid = !digits.is_empty()
        && digits != "."
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && digits.bytes().filter(|&b| b == b'.').count() <= 1;
    if valid {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// XPath string form of a number: integers without a fraction
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> XmlDocument {
        XmlDocument::parse("<r><n> 42 </n></r>").unwrap()
    }

    #[test]
    fn test_boolean_conversion() {
        assert!(XPathValue::NodeSet(vec![1]).to_boolean());
        assert!(!XPathValue::NodeSet(vec![]).to_boolean());
        assert!(XPathValue::AttrValues(vec![String::new()]).to_boolean());
        assert!(!XPathValue::AttrValues(vec![]).to_boolean());
        assert!(!XPathValue::Number(f64::NAN).to_boolean());
        assert!(!XPathValue::String(String::new()).to_boolean());
    }

    #[test]
    fn test_number_conversion() {
        let doc = doc();
        assert_eq!(XPathValue::Boolean(true).to_number(&doc), 1.0);
        assert_eq!(XPathValue::String("42".to_string()).to_number(&doc), 42.0);
        assert!(XPathValue::String("1e3".to_string()).to_number(&doc).is_nan());
        let n = doc.root_element_id().unwrap();
        assert_eq!(XPathValue::NodeSet(vec![n]).to_number(&doc), 42.0);
    }

    #[test]
    fn test_string_conversion() {
        let doc = doc();
        assert_eq!(XPathValue::Boolean(false).to_string_value(&doc), "false");
        assert_eq!(XPathValue::Number(42.0).to_string_value(&doc), "42");
        assert_eq!(XPathValue::Number(3.25).to_string_value(&doc), "3.25");
        assert_eq!(XPathValue::Number(-0.0).to_string_value(&doc), "0");
        assert_eq!(XPathValue::empty_nodeset().to_string_value(&doc), "");
    }
}
