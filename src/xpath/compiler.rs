//! XPath Expression Compiler
//!
//! Flattens the AST into a postfix op list for the stack evaluator.

use super::parser::{Axis, BinaryOp, Expr, NodeTest, Step};

/// Compiled XPath expression
#[derive(Debug, Clone)]
pub struct CompiledExpr {
    pub ops: Vec<Op>,
}

/// Compiled operation
#[derive(Debug, Clone)]
pub enum Op {
    /// Push the document node
    Root,
    /// Push the context node
    Context,
    /// Replace the node-set on top with one axis step from each member;
    /// predicates run per context node
    Step(Axis, NodeTest, Vec<CompiledExpr>),
    /// Filter the value on top, positions in document order
    Filter(Box<CompiledExpr>),
    Union,
    Number(f64),
    String(String),
    /// Function name and argument count
    Call(String, usize),
    Binary(BinaryOp),
    Negate,
}

impl CompiledExpr {
    pub fn compile(expr: &Expr) -> Self {
        let mut ops = Vec::new();
        Self::compile_expr(expr, &mut ops);
        CompiledExpr { ops }
    }

    fn compile_expr(expr: &Expr, ops: &mut Vec<Op>) {
        match expr {
            Expr::Root => ops.push(Op::Root),
            Expr::Number(n) => ops.push(Op::Number(*n)),
            Expr::String(s) => ops.push(Op::String(s.clone())),
            Expr::Negate(inner) => {
                Self::compile_expr(inner, ops);
                ops.push(Op::Negate);
            }
            Expr::Binary(left, op, right) => {
                Self::compile_expr(left, ops);
                Self::compile_expr(right, ops);
                ops.push(Op::Binary(*op));
            }
            Expr::Union(left, right) => {
                Self::compile_expr(left, ops);
                Self::compile_expr(right, ops);
                ops.push(Op::Union);
            }
            Expr::Path(base, step) => {
                Self::compile_expr(base, ops);
                Self::compile_step(step, ops);
            }
            Expr::Filter(base, pred) => {
                Self::compile_expr(base, ops);
                ops.push(Op::Filter(Box::new(CompiledExpr::compile(pred))));
            }
            Expr::Step(step) => {
                ops.push(Op::Context);
                Self::compile_step(step, ops);
            }
            Expr::Function(name, args) => {
                for arg in args {
                    Self::compile_expr(arg, ops);
                }
                ops.push(Op::Call(name.clone(), args.len()));
            }
        }
    }

    fn compile_step(step: &Step, ops: &mut Vec<Op>) {
        let predicates = step.predicates.iter().map(CompiledExpr::compile).collect();
        ops.push(Op::Step(step.axis, step.node_test.clone(), predicates));
    }
}

/// Compile an XPath expression string
pub fn compile(xpath: &str) -> Result<CompiledExpr, String> {
    let expr = super::parser::parse(xpath)?;
    Ok(CompiledExpr::compile(&expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_absolute() {
        let compiled = compile("/root").unwrap();
        assert!(matches!(compiled.ops[0], Op::Root));
        assert!(matches!(compiled.ops[1], Op::Step(Axis::Child, _, _)));
    }

    #[test]
    fn test_compile_descendant() {
        let compiled = compile("//item[1]").unwrap();
        assert_eq!(compiled.ops.len(), 3);
        match &compiled.ops[2] {
            Op::Step(Axis::Child, NodeTest::Name(name), preds) => {
                assert_eq!(name, "item");
                assert_eq!(preds.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_compile_function_postfix() {
        let compiled = compile("concat('a', 'b')").unwrap();
        assert!(matches!(compiled.ops.last(), Some(Op::Call(name, 2)) if name == "concat"));
    }
}
