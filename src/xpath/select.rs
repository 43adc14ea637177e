//! Selector results as seen by views
//!
//! Every XPath result type maps onto an ordered list of matches: node-sets
//! give one node per member, attribute values and strings give raw text,
//! numbers give their XPath string form, and a boolean gives `"true"` or
//! nothing at all.

use super::cache;
use super::eval::{evaluate, EvalContext};
use super::value::{format_number, XPathValue};
use crate::dom::NodeRef;
use crate::error::SelectorError;

/// One selector match
#[derive(Debug, Clone)]
pub enum Match {
    Node(NodeRef),
    /// A raw string result (attribute value, string, number or boolean)
    Text(String),
}

impl Match {
    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Match::Node(node) => Some(node),
            Match::Text(_) => None,
        }
    }

    /// Leading text of a node, or the raw string
    pub fn text(&self) -> Option<String> {
        match self {
            Match::Node(node) => node.text(),
            Match::Text(text) => Some(text.clone()),
        }
    }
}

/// Ordered matches of one selector evaluation
#[derive(Debug, Clone, Default)]
pub struct Selection {
    matches: Vec<Match>,
}

impl Selection {
    fn from_value(context: &NodeRef, value: XPathValue) -> Self {
        let matches = match value {
            XPathValue::NodeSet(ids) => ids
                .into_iter()
                .map(|id| Match::Node(context.sibling_handle(id)))
                .collect(),
            XPathValue::AttrValues(values) => values.into_iter().map(Match::Text).collect(),
            XPathValue::String(s) => vec![Match::Text(s)],
            XPathValue::Number(n) => vec![Match::Text(format_number(n))],
            XPathValue::Boolean(true) => vec![Match::Text("true".to_string())],
            XPathValue::Boolean(false) => Vec::new(),
        };
        Selection { matches }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn first(&self) -> Option<&Match> {
        self.matches.first()
    }

    pub fn into_first(self) -> Option<Match> {
        self.matches.into_iter().next()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    /// Node matches only
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRef> {
        self.matches.iter().filter_map(Match::as_node)
    }
}

impl IntoIterator for Selection {
    type Item = Match;
    type IntoIter = std::vec::IntoIter<Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

/// Evaluate `selector` with `context` as the context node
pub fn select(context: &NodeRef, selector: &str) -> Result<Selection, SelectorError> {
    let compiled = cache::compiled(selector)?;
    let ctx = EvalContext::new(context.document(), context.id());
    let value = evaluate(&compiled, &ctx).map_err(|msg| SelectorError::new(selector, msg))?;
    Ok(Selection::from_value(context, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::XmlDocument;
    use std::sync::Arc;

    fn root(xml: &str) -> NodeRef {
        NodeRef::root(Arc::new(XmlDocument::parse(xml).unwrap())).unwrap()
    }

    #[test]
    fn test_node_matches() {
        let node = root("<r><a>1</a><a>2</a></r>");
        let sel = select(&node, "a").unwrap();
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.first().and_then(Match::text).as_deref(), Some("1"));
        assert_eq!(sel.nodes().count(), 2);
    }

    #[test]
    fn test_scalar_results() {
        let node = root(r#"<r k="v"><a/><a/></r>"#);
        let texts = |sel: Selection| -> Vec<Option<String>> {
            sel.iter().map(Match::text).collect()
        };
        assert_eq!(texts(select(&node, "@k").unwrap()), [Some("v".to_string())]);
        assert_eq!(texts(select(&node, "count(a)").unwrap()), [Some("2".to_string())]);
        assert_eq!(texts(select(&node, "concat('x', 'y')").unwrap()), [Some("xy".to_string())]);
        assert_eq!(texts(select(&node, "count(a) = 2").unwrap()), [Some("true".to_string())]);
        assert!(select(&node, "count(a) = 3").unwrap().is_empty());
        assert!(select(&node, "@missing").unwrap().is_empty());
    }

    #[test]
    fn test_matches_share_document() {
        let node = root("<r><a/></r>");
        let sel = select(&node, "a/..").unwrap();
        assert!(sel.nodes().next().unwrap().ptr_eq(&node));
    }

    #[test]
    fn test_bad_selector() {
        let node = root("<r/>");
        let err = select(&node, "a[[").unwrap_err();
        assert_eq!(err.selector, "a[[");
        assert!(select(&node, "unknown-fn()").is_err());
    }
}
