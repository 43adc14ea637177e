//! XPath Evaluation Engine
//!
//! Runs compiled op lists on a value stack against one document.

use super::axes::{matches_node_test, navigate};
use super::compiler::{CompiledExpr, Op};
use super::functions;
use super::parser::{Axis, BinaryOp, NodeTest};
use super::value::{parse_number, XPathValue};
use crate::dom::{NodeId, XmlDocument};

/// Evaluation context
pub struct EvalContext<'a> {
    pub doc: &'a XmlDocument,
    pub node: NodeId,
    /// 1-based position within the current node list
    pub position: usize,
    pub size: usize,
}

impl<'a> EvalContext<'a> {
    pub fn new(doc: &'a XmlDocument, node: NodeId) -> Self {
        EvalContext {
            doc,
            node,
            position: 1,
            size: 1,
        }
    }
}

/// Evaluate a compiled expression
pub fn evaluate(expr: &CompiledExpr, ctx: &EvalContext<'_>) -> Result<XPathValue, String> {
    fn pop(stack: &mut Vec<XPathValue>) -> Result<XPathValue, String> {
        stack
            .pop()
            .ok_or_else(|| "Malformed expression: value stack underflow".to_string())
    }

    let mut stack: Vec<XPathValue> = Vec::new();

    for op in &expr.ops {
        let value = match op {
            Op::Root => XPathValue::single_node(0),
            Op::Context => XPathValue::single_node(ctx.node),
            Op::Step(axis, test, predicates) => {
                let input = pop(&mut stack)?;
                step(ctx.doc, input, *axis, test, predicates)?
            }
            Op::Filter(pred) => {
                let input = pop(&mut stack)?;
                filter(ctx, input, pred)?
            }
            Op::Union => {
                let right = pop(&mut stack)?;
                let left = pop(&mut stack)?;
                union(left, right)?
            }
            Op::Number(n) => XPathValue::Number(*n),
            Op::String(s) => XPathValue::String(s.clone()),
            Op::Negate => {
                let value = pop(&mut stack)?;
                XPathValue::Number(-value.to_number(ctx.doc))
            }
            Op::Binary(op) => {
                let right = pop(&mut stack)?;
                let left = pop(&mut stack)?;
                binary(ctx.doc, *op, &left, &right)
            }
            Op::Call(name, arg_count) => {
                let split = stack
                    .len()
                    .checked_sub(*arg_count)
                    .ok_or_else(|| format!("Malformed call to {}()", name))?;
                let args = stack.split_off(split);
                functions::call(name, args, ctx)?
            }
        };
        stack.push(value);
    }

    pop(&mut stack)
}

/// One location step from every node of the input set
fn step(
    doc: &XmlDocument,
    input: XPathValue,
    axis: Axis,
    test: &NodeTest,
    predicates: &[CompiledExpr],
) -> Result<XPathValue, String> {
    let nodes = match input {
        XPathValue::NodeSet(nodes) => nodes,
        // Attribute values have no children, parents or siblings here
        XPathValue::AttrValues(_) => return Ok(XPathValue::empty_nodeset()),
        other => return Err(format!("Path step applied to a non-node-set value {:?}", other)),
    };

    if axis == Axis::Attribute {
        return Ok(XPathValue::AttrValues(attribute_values(doc, &nodes, test)));
    }

    let mut result = Vec::new();
    for node in nodes {
        let mut candidates: Vec<NodeId> = navigate(doc, node, axis)
            .into_iter()
            .filter(|&id| matches_node_test(doc, id, test))
            .collect();
        for pred in predicates {
            candidates = apply_predicate(doc, candidates, pred)?;
        }
        result.extend(candidates);
    }
    // Ids are assigned in document order
    result.sort_unstable();
    result.dedup();
    Ok(XPathValue::NodeSet(result))
}

fn attribute_values(doc: &XmlDocument, nodes: &[NodeId], test: &NodeTest) -> Vec<String> {
    let mut values = Vec::new();
    for &node in nodes {
        for (name, value) in doc.get_attribute_values(node) {
            let local = name.split_once(':').map_or(name, |(_, local)| local);
            let matches = match test {
                NodeTest::Any | NodeTest::Node => true,
                NodeTest::Name(wanted) => local == wanted,
                _ => false,
            };
            if matches {
                values.push(value.to_string());
            }
        }
    }
    values
}

/// Keep nodes for which the predicate holds at their position in `nodes`
fn apply_predicate(
    doc: &XmlDocument,
    nodes: Vec<NodeId>,
    pred: &CompiledExpr,
) -> Result<Vec<NodeId>, String> {
    let size = nodes.len();
    let mut kept = Vec::with_capacity(size);
    for (i, node) in nodes.into_iter().enumerate() {
        let ctx = EvalContext {
            doc,
            node,
            position: i + 1,
            size,
        };
        if predicate_holds(&evaluate(pred, &ctx)?, i + 1) {
            kept.push(node);
        }
    }
    Ok(kept)
}

/// A number predicate is a position test, anything else converts to boolean
fn predicate_holds(value: &XPathValue, position: usize) -> bool {
    match value {
        XPathValue::Number(n) => *n == position as f64,
        other => other.to_boolean(),
    }
}

fn filter(ctx: &EvalContext<'_>, input: XPathValue, pred: &CompiledExpr) -> Result<XPathValue, String> {
    match input {
        XPathValue::NodeSet(nodes) => Ok(XPathValue::NodeSet(apply_predicate(ctx.doc, nodes, pred)?)),
        XPathValue::AttrValues(values) => {
            let size = values.len();
            let mut kept = Vec::new();
            for (i, value) in values.into_iter().enumerate() {
                let pred_ctx = EvalContext {
                    doc: ctx.doc,
                    node: ctx.node,
                    position: i + 1,
                    size,
                };
                if predicate_holds(&evaluate(pred, &pred_ctx)?, i + 1) {
                    kept.push(value);
                }
            }
            Ok(XPathValue::AttrValues(kept))
        }
        other => Err(format!("Predicate applied to a non-node-set value {:?}", other)),
    }
}

fn union(left: XPathValue, right: XPathValue) -> Result<XPathValue, String> {
    match (left, right) {
        (XPathValue::NodeSet(mut l), XPathValue::NodeSet(r)) => {
            l.extend(r);
            l.sort_unstable();
            l.dedup();
            Ok(XPathValue::NodeSet(l))
        }
        (XPathValue::AttrValues(mut l), XPathValue::AttrValues(r)) => {
            l.extend(r);
            Ok(XPathValue::AttrValues(l))
        }
        (l @ XPathValue::NodeSet(_), XPathValue::AttrValues(r)) if r.is_empty() => Ok(l),
        (XPathValue::AttrValues(l), r @ XPathValue::NodeSet(_)) if l.is_empty() => Ok(r),
        _ => Err("Union requires two node-sets".to_string()),
    }
}

fn binary(doc: &XmlDocument, op: BinaryOp, left: &XPathValue, right: &XPathValue) -> XPathValue {
    let num = |v: &XPathValue| v.to_number(doc);
    match op {
        BinaryOp::Or => XPathValue::Boolean(left.to_boolean() || right.to_boolean()),
        BinaryOp::And => XPathValue::Boolean(left.to_boolean() && right.to_boolean()),
        BinaryOp::Add => XPathValue::Number(num(left) + num(right)),
        BinaryOp::Sub => XPathValue::Number(num(left) - num(right)),
        BinaryOp::Mul => XPathValue::Number(num(left) * num(right)),
        BinaryOp::Div => XPathValue::Number(num(left) / num(right)),
        BinaryOp::Mod => XPathValue::Number(num(left) % num(right)),
        _ => XPathValue::Boolean(compare(doc, op, left, right)),
    }
}

/// Comparison operand after set expansion
#[derive(Clone, Copy)]
enum Scalar<'a> {
    Str(&'a str),
    Num(f64),
    Bool(bool),
}

impl Scalar<'_> {
    fn number(self) -> f64 {
        match self {
            Scalar::Str(s) => parse_number(s),
            Scalar::Num(n) => n,
            Scalar::Bool(b) => f64::from(u8::from(b)),
        }
    }

    fn boolean(self) -> bool {
        match self {
            Scalar::Str(s) => !s.is_empty(),
            Scalar::Num(n) => n != 0.0 && !n.is_nan(),
            Scalar::Bool(b) => b,
        }
    }
}

fn set_strings(doc: &XmlDocument, value: &XPathValue) -> Option<Vec<String>> {
    match value {
        XPathValue::NodeSet(nodes) => Some(nodes.iter().map(|&id| doc.string_value(id)).collect()),
        XPathValue::AttrValues(values) => Some(values.clone()),
        _ => None,
    }
}

fn scalar(value: &XPathValue) -> Scalar<'_> {
    match value {
        XPathValue::Boolean(b) => Scalar::Bool(*b),
        XPathValue::Number(n) => Scalar::Num(*n),
        XPathValue::String(s) => Scalar::Str(s),
        XPathValue::NodeSet(_) | XPathValue::AttrValues(_) => Scalar::Bool(value.to_boolean()),
    }
}

/// XPath 1.0 comparison: sets compare existentially over their members'
/// string values, except against a boolean, which compares boolean(set)
fn compare(doc: &XmlDocument, op: BinaryOp, left: &XPathValue, right: &XPathValue) -> bool {
    let left_set = set_strings(doc, left);
    let right_set = set_strings(doc, right);
    match (&left_set, &right_set) {
        (Some(ls), Some(rs)) => ls.iter().any(|l| {
            rs.iter()
                .any(|r| compare_scalars(op, Scalar::Str(l), Scalar::Str(r)))
        }),
        (Some(_), None) if matches!(right, XPathValue::Boolean(_)) => {
            compare_scalars(op, scalar(left), scalar(right))
        }
        (None, Some(_)) if matches!(left, XPathValue::Boolean(_)) => {
            compare_scalars(op, scalar(left), scalar(right))
        }
        (Some(ls), None) => ls
            .iter()
            .any(|l| compare_scalars(op, Scalar::Str(l), scalar(right))),
        (None, Some(rs)) => rs
            .iter()
            .any(|r| compare_scalars(op, scalar(left), Scalar::Str(r))),
        (None, None) => compare_scalars(op, scalar(left), scalar(right)),
    }
}

fn compare_scalars(op: BinaryOp, left: Scalar<'_>, right: Scalar<'_>) -> bool {
    match op {
        BinaryOp::Eq | BinaryOp::NotEq => {
            let equal = match (left, right) {
                (Scalar::Bool(a), other) | (other, Scalar::Bool(a)) => a == other.boolean(),
                (Scalar::Num(a), other) | (other, Scalar::Num(a)) => a == other.number(),
                (Scalar::Str(a), Scalar::Str(b)) => a == b,
            };
            equal == (op == BinaryOp::Eq)
        }
        BinaryOp::Lt => left.number() < right.number(),
        BinaryOp::LtEq => left.number() <= right.number(),
        BinaryOp::Gt => left.number() > right.number(),
        BinaryOp::GtEq => left.number() >= right.number(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpath::compiler::compile;

    fn eval(xml: &str, xpath: &str) -> (XmlDocument, XPathValue) {
        let doc = XmlDocument::parse(xml).unwrap();
        let compiled = compile(xpath).unwrap();
        let root = doc.root_element_id().unwrap();
        let value = evaluate(&compiled, &EvalContext::new(&doc, root)).unwrap();
        (doc, value)
    }

    fn count(xml: &str, xpath: &str) -> usize {
        eval(xml, xpath).1.as_nodeset().map_or(0, |n| n.len())
    }

    #[test]
    fn test_relative_and_absolute() {
        let xml = "<root><child/><child/></root>";
        assert_eq!(count(xml, "child"), 2);
        assert_eq!(count(xml, "/root/child"), 2);
        assert_eq!(count(xml, "/child"), 0);
    }

    #[test]
    fn test_step_predicate_is_per_context() {
        let xml = "<r><a><b>1</b><b>2</b></a><a><b>3</b></a></r>";
        let (doc, value) = eval(xml, "a/b[1]");
        let nodes = value.as_nodeset().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(doc.string_value(nodes[1]), "3");
        assert_eq!(count(xml, "(a/b)[1]"), 1);
        assert_eq!(count(xml, "a/b[last()]"), 2);
    }

    #[test]
    fn test_reverse_axis_positions() {
        let xml = "<x><y><z/></y></x>";
        let (doc, value) = eval(xml, "y/z/ancestor::*[1]");
        let nodes = value.as_nodeset().unwrap();
        assert_eq!(doc.node_name(nodes[0]), Some("y"));
    }

    #[test]
    fn test_attribute_values() {
        let xml = r#"<r><e slot="0"/><e slot="1" j:x="y"/></r>"#;
        let (_, value) = eval(xml, "e/@slot");
        assert_eq!(value, XPathValue::AttrValues(vec!["0".into(), "1".into()]));
        assert_eq!(count(xml, "e[@slot='1']"), 1);
        assert_eq!(count(xml, "e[@x]"), 1);
        let (_, value) = eval(xml, "count(e/@*)");
        assert_eq!(value, XPathValue::Number(3.0));
    }

    #[test]
    fn test_comparisons() {
        let xml = "<r><n>5</n><n>10</n><s>master</s></r>";
        assert_eq!(eval(xml, "n > 7").1, XPathValue::Boolean(true));
        assert_eq!(eval(xml, "n = 10").1, XPathValue::Boolean(true));
        assert_eq!(eval(xml, "n != 5").1, XPathValue::Boolean(true));
        assert_eq!(eval(xml, "s = 'master'").1, XPathValue::Boolean(true));
        assert_eq!(eval(xml, "missing = 'x'").1, XPathValue::Boolean(false));
        assert_eq!(eval(xml, "missing = false()").1, XPathValue::Boolean(true));
        assert_eq!(eval(xml, "1 + 2 * 3").1, XPathValue::Number(7.0));
    }

    #[test]
    fn test_union_document_order() {
        let xml = "<r><a/><b/><c/></r>";
        let (doc, value) = eval(xml, "c | a");
        let names: Vec<_> = value
            .as_nodeset()
            .unwrap()
            .iter()
            .map(|&id| doc.node_name(id).unwrap())
            .collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn test_text_and_parent() {
        let xml = "<r><a>hi</a></r>";
        let (doc, value) = eval(xml, "a/text()");
        assert_eq!(doc.text_content(value.as_nodeset().unwrap()[0]), Some("hi"));
        let (doc, value) = eval(xml, "a/..");
        assert_eq!(doc.node_name(value.as_nodeset().unwrap()[0]), Some("r"));
    }

    #[test]
    fn test_descendant_shorthand() {
        let xml = "<r><a><b/></a><b/></r>";
        assert_eq!(count(xml, ".//b"), 2);
        assert_eq!(count(xml, "//b"), 2);
    }

    #[test]
    fn test_step_on_scalar_is_error() {
        let doc = XmlDocument::parse("<r/>").unwrap();
        let compiled = compile("'a'/b").unwrap();
        let ctx = EvalContext::new(&doc, doc.root_element_id().unwrap());
        assert!(evaluate(&compiled, &ctx).is_err());
    }
}
