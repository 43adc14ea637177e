//! XPath Axes
//!
//! Node-producing axes over the arena. Results come back in proximity
//! order: document order for forward axes, nearest-first for reverse axes.
//! The attribute axis is handled by the evaluator (attributes are not arena
//! nodes) and the namespace axis is always empty.

use super::parser::{Axis, NodeTest};
use crate::dom::{NodeId, NodeKind, XmlDocument};

/// Navigate along an axis from a context node
pub fn navigate(doc: &XmlDocument, context: NodeId, axis: Axis) -> Vec<NodeId> {
    match axis {
        Axis::Child => doc.children(context).collect(),
        Axis::Descendant => doc.descendants(context).collect(),
        Axis::DescendantOrSelf => std::iter::once(context)
            .chain(doc.descendants(context))
            .collect(),
        Axis::Parent => parent_of(doc, context).into_iter().collect(),
        Axis::Ancestor => ancestors(doc, context).collect(),
        Axis::AncestorOrSelf => std::iter::once(context)
            .chain(ancestors(doc, context))
            .collect(),
        Axis::FollowingSibling => siblings(doc, context, |n| n.next_sibling),
        Axis::PrecedingSibling => siblings(doc, context, |n| n.prev_sibling),
        Axis::Following => following(doc, context),
        Axis::Preceding => preceding(doc, context),
        Axis::Self_ => vec![context],
        Axis::Attribute | Axis::Namespace => Vec::new(),
    }
}

fn parent_of(doc: &XmlDocument, id: NodeId) -> Option<NodeId> {
    doc.get_node(id).and_then(|n| n.parent)
}

fn ancestors(doc: &XmlDocument, context: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(parent_of(doc, context), move |&id| parent_of(doc, id))
}

fn siblings(
    doc: &XmlDocument,
    context: NodeId,
    step: fn(&crate::dom::XmlNode) -> Option<NodeId>,
) -> Vec<NodeId> {
    let next = |id: &NodeId| doc.get_node(*id).and_then(step);
    std::iter::successors(doc.get_node(context).and_then(step), next).collect()
}

/// Last node of the subtree rooted at `id`
fn subtree_end(doc: &XmlDocument, id: NodeId) -> NodeId {
    let mut end = id;
    while let Some(last) = doc.get_node(end).and_then(|n| n.last_child) {
        end = last;
    }
    end
}

/// Everything after the context's subtree
///
/// Ids are assigned in document order, so that is one contiguous range.
fn following(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    let start = subtree_end(doc, context) + 1;
    (start..doc.node_count() as NodeId).collect()
}

/// Everything before the context, minus its ancestors, nearest first
fn preceding(doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
    let skip: Vec<NodeId> = ancestors(doc, context).collect();
    (1..context).rev().filter(|id| !skip.contains(id)).collect()
}

/// Check a node against a node test (principal node type: element)
pub fn matches_node_test(doc: &XmlDocument, node_id: NodeId, node_test: &NodeTest) -> bool {
    let Some(node) = doc.get_node(node_id) else {
        return false;
    };
    match node_test {
        NodeTest::Any => node.kind == NodeKind::Element,
        NodeTest::Name(name) => {
            node.kind == NodeKind::Element && doc.node_local_name(node_id) == Some(name.as_str())
        }
        NodeTest::Node => true,
        NodeTest::Text => node.is_text(),
        NodeTest::Comment => node.kind == NodeKind::Comment,
        NodeTest::ProcessingInstruction(target) => {
            node.kind == NodeKind::ProcessingInstruction
                && target
                    .as_deref()
                    .is_none_or(|t| doc.node_name(node_id) == Some(t))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(doc: &XmlDocument, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|&id| doc.node_name(id).map(str::to_string))
            .collect()
    }

    fn find(doc: &XmlDocument, name: &str) -> NodeId {
        (0..doc.node_count() as NodeId)
            .find(|&id| doc.node_name(id) == Some(name))
            .unwrap()
    }

    #[test]
    fn test_child_and_descendant() {
        let doc = XmlDocument::parse("<root><a><b/></a><c/></root>").unwrap();
        let root = doc.root_element_id().unwrap();
        assert_eq!(names(&doc, &navigate(&doc, root, Axis::Child)), ["a", "c"]);
        assert_eq!(
            names(&doc, &navigate(&doc, root, Axis::Descendant)),
            ["a", "b", "c"]
        );
    }

    #[test]
    fn test_ancestor_nearest_first() {
        let doc = XmlDocument::parse("<root><a><b/></a></root>").unwrap();
        let b = find(&doc, "b");
        let ancestors = navigate(&doc, b, Axis::Ancestor);
        assert_eq!(ancestors.len(), 3);
        assert_eq!(names(&doc, &ancestors), ["a", "root"]);
        assert_eq!(ancestors[2], 0);
    }

    #[test]
    fn test_siblings() {
        let doc = XmlDocument::parse("<r><a/><b/><c/><d/></r>").unwrap();
        let b = find(&doc, "b");
        let c = find(&doc, "c");
        assert_eq!(
            names(&doc, &navigate(&doc, b, Axis::FollowingSibling)),
            ["c", "d"]
        );
        assert_eq!(
            names(&doc, &navigate(&doc, c, Axis::PrecedingSibling)),
            ["b", "a"]
        );
    }

    #[test]
    fn test_following_and_preceding() {
        let doc = XmlDocument::parse("<r><a><a1/></a><b><b1/></b><c/></r>").unwrap();
        let b = find(&doc, "b");
        assert_eq!(names(&doc, &navigate(&doc, b, Axis::Following)), ["c"]);
        let b1 = find(&doc, "b1");
        assert_eq!(names(&doc, &navigate(&doc, b1, Axis::Preceding)), ["a1", "a"]);
    }

    #[test]
    fn test_node_tests() {
        let doc = XmlDocument::parse("<j:r>t<!--c--><?pi x?><e/></j:r>").unwrap();
        let root = doc.root_element_id().unwrap();
        let kids = navigate(&doc, root, Axis::Child);
        assert!(matches_node_test(&doc, root, &NodeTest::Name("r".into())));
        assert!(matches_node_test(&doc, kids[0], &NodeTest::Text));
        assert!(matches_node_test(&doc, kids[1], &NodeTest::Comment));
        assert!(matches_node_test(
            &doc,
            kids[2],
            &NodeTest::ProcessingInstruction(Some("pi".into()))
        ));
        assert!(!matches_node_test(&doc, kids[0], &NodeTest::Any));
        assert!(matches_node_test(&doc, kids[3], &NodeTest::Any));
    }
}
