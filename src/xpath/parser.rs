//! XPath Parser
//!
//! Recursive descent parser for XPath 1.0 expressions.

use super::lexer::{Lexer, Token};

/// XPath expression AST node
#[derive(Debug, Clone)]
pub enum Expr {
    /// Root path (/)
    Root,
    /// Union of two expressions (|)
    Union(Box<Expr>, Box<Expr>),
    /// Path expression (expr/step)
    Path(Box<Expr>, Box<Step>),
    /// Filter expression with predicate
    Filter(Box<Expr>, Box<Expr>),
    Function(String, Vec<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    /// Unary negation
    Negate(Box<Expr>),
    Number(f64),
    String(String),
    /// Location step relative to the context node
    Step(Box<Step>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Location step in a path
#[derive(Debug, Clone)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    fn bare(axis: Axis, node_test: NodeTest) -> Self {
        Step {
            axis,
            node_test,
            predicates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
    Self_,
    Attribute,
    Namespace,
}

impl Axis {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "child" => Some(Axis::Child),
            "descendant" => Some(Axis::Descendant),
            "descendant-or-self" => Some(Axis::DescendantOrSelf),
            "parent" => Some(Axis::Parent),
            "ancestor" => Some(Axis::Ancestor),
            "ancestor-or-self" => Some(Axis::AncestorOrSelf),
            "following-sibling" => Some(Axis::FollowingSibling),
            "preceding-sibling" => Some(Axis::PrecedingSibling),
            "following" => Some(Axis::Following),
            "preceding" => Some(Axis::Preceding),
            "self" => Some(Axis::Self_),
            "attribute" => Some(Axis::Attribute),
            "namespace" => Some(Axis::Namespace),
            _ => None,
        }
    }

    /// Reverse axes number proximity positions from the context node outward
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Ancestor | Axis::AncestorOrSelf | Axis::Preceding | Axis::PrecedingSibling
        )
    }
}

/// Node test in a location step
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    /// Matches any node of the axis' principal type (*)
    Any,
    /// Matches by local name; a prefix is accepted and ignored
    Name(String),
    /// node()
    Node,
    /// text(), which also matches CDATA
    Text,
    Comment,
    ProcessingInstruction(Option<String>),
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, String> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            peeked: None,
        })
    }

    /// Parse a complete expression; trailing tokens are an error
    pub fn parse(&mut self) -> Result<Expr, String> {
        let expr = self.parse_or_expr()?;
        if self.current != Token::Eof {
            return Err(format!("Unexpected token after expression: {:?}", self.current));
        }
        Ok(expr)
    }

    fn advance(&mut self) -> Result<(), String> {
        self.current = match self.peeked.take() {
            Some(t) => t,
            None => self.lexer.next_token()?,
        };
        Ok(())
    }

    fn peek(&mut self) -> Result<&Token, String> {
        let token = match self.peeked.take() {
            Some(t) => t,
            None => self.lexer.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), String> {
        if self.current != token {
            return Err(format!("Expected {}, got {:?}", what, self.current));
        }
        self.advance()
    }

    /// Left-associative binary level: `next (op next)*`
    fn parse_binary(
        &mut self,
        next: fn(&mut Self) -> Result<Expr, String>,
        op_for: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr, String> {
        let mut left = next(self)?;
        while let Some(op) = op_for(&self.current) {
            self.advance()?;
            let right = next(self)?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_or_expr(&mut self) -> Result<Expr, String> {
        self.parse_binary(Self::parse_and_expr, |t| {
            matches!(t, Token::Or).then_some(BinaryOp::Or)
        })
    }

    fn parse_and_expr(&mut self) -> Result<Expr, String> {
        self.parse_binary(Self::parse_equality_expr, |t| {
            matches!(t, Token::And).then_some(BinaryOp::And)
        })
    }

    fn parse_equality_expr(&mut self) -> Result<Expr, String> {
        self.parse_binary(Self::parse_relational_expr, |t| match t {
            Token::Eq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::NotEq),
            _ => None,
        })
    }

    fn parse_relational_expr(&mut self) -> Result<Expr, String> {
        self.parse_binary(Self::parse_additive_expr, |t| match t {
            Token::Lt => Some(BinaryOp::Lt),
            Token::LtEq => Some(BinaryOp::LtEq),
            Token::Gt => Some(BinaryOp::Gt),
            Token::GtEq => Some(BinaryOp::GtEq),
            _ => None,
        })
    }

    fn parse_additive_expr(&mut self) -> Result<Expr, String> {
        self.parse_binary(Self::parse_multiplicative_expr, |t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplicative_expr(&mut self) -> Result<Expr, String> {
        self.parse_binary(Self::parse_unary_expr, |t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Div => Some(BinaryOp::Div),
            Token::Mod => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, String> {
        if matches!(self.current, Token::Minus) {
            self.advance()?;
            let expr = self.parse_unary_expr()?;
            Ok(Expr::Negate(Box::new(expr)))
        } else {
            self.parse_union_expr()
        }
    }

    fn parse_union_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_path_expr()?;
        while matches!(self.current, Token::Pipe) {
            self.advance()?;
            let right = self.parse_path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_path_expr(&mut self) -> Result<Expr, String> {
        let expr = match self.current {
            Token::Slash => {
                self.advance()?;
                if !self.starts_step() {
                    return Ok(Expr::Root);
                }
                let step = self.parse_step()?;
                Expr::Path(Box::new(Expr::Root), Box::new(step))
            }
            Token::DoubleSlash => {
                self.advance()?;
                let step = self.parse_step()?;
                descendant_path(Expr::Root, step)
            }
            _ => self.parse_filter_expr()?,
        };
        self.parse_path_tail(expr)
    }

    /// `/step` and `//step` continuations
    fn parse_path_tail(&mut self, mut expr: Expr) -> Result<Expr, String> {
        loop {
            match self.current {
                Token::Slash => {
                    self.advance()?;
                    let step = self.parse_step()?;
                    expr = Expr::Path(Box::new(expr), Box::new(step));
                }
                Token::DoubleSlash => {
                    self.advance()?;
                    let step = self.parse_step()?;
                    expr = descendant_path(expr, step);
                }
                _ => return Ok(expr),
            }
        }
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.current,
            Token::Name(_)
                | Token::NameTest(_)
                | Token::NodeType(_)
                | Token::Axis(_)
                | Token::Star
                | Token::At
                | Token::Dot
                | Token::DoubleDot
        )
    }

    /// Primary expression followed by filter predicates
    fn parse_filter_expr(&mut self) -> Result<Expr, String> {
        let mut expr = self.parse_primary_expr()?;
        if matches!(expr, Expr::Step(_)) {
            return Ok(expr);
        }
        while matches!(self.current, Token::LeftBracket) {
            self.advance()?;
            let pred = self.parse_or_expr()?;
            self.expect(Token::RightBracket, "]")?;
            expr = Expr::Filter(Box::new(expr), Box::new(pred));
        }
        Ok(expr)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, String> {
        let is_call =
            matches!(self.current, Token::Name(_)) && matches!(self.peek()?, Token::LeftParen);
        if is_call {
            let name = match &self.current {
                Token::Name(name) => name.clone(),
                _ => String::new(),
            };
            self.advance()?;
            self.advance()?;
            let args = self.parse_function_args()?;
            return Ok(Expr::Function(name, args));
        }

        match &self.current {
            Token::Number(n) => {
                let n = *n;
                self.advance()?;
                Ok(Expr::Number(n))
            }
            Token::String(s) => {
                let s = s.clone();
                self.advance()?;
                Ok(Expr::String(s))
            }
            Token::Dollar => Err("Variables are not supported".to_string()),
            Token::LeftParen => {
                self.advance()?;
                let expr = self.parse_or_expr()?;
                self.expect(Token::RightParen, ")")?;
                Ok(expr)
            }
            _ if self.starts_step() => {
                let step = self.parse_step()?;
                Ok(Expr::Step(Box::new(step)))
            }
            _ => Err(format!("Unexpected token: {:?}", self.current)),
        }
    }

    /// Parse a location step, including abbreviations and predicates
    fn parse_step(&mut self) -> Result<Step, String> {
        let mut axis = Axis::Child;
        match &self.current {
            Token::Dot => {
                self.advance()?;
                return Ok(Step::bare(Axis::Self_, NodeTest::Node));
            }
            Token::DoubleDot => {
                self.advance()?;
                return Ok(Step::bare(Axis::Parent, NodeTest::Node));
            }
            Token::At => {
                axis = Axis::Attribute;
                self.advance()?;
            }
            Token::Axis(name) => {
                axis = Axis::from_name(name).ok_or_else(|| format!("Unknown axis: {}", name))?;
                self.advance()?;
                self.expect(Token::DoubleColon, ":: after axis")?;
            }
            _ => {}
        }

        let node_test = match &self.current {
            Token::Star => NodeTest::Any,
            Token::Name(name) => NodeTest::Name(name.clone()),
            Token::NameTest(qname) => match qname.split_once(':') {
                Some((_, "*")) => NodeTest::Any,
                Some((_, local)) => NodeTest::Name(local.to_string()),
                None => NodeTest::Name(qname.clone()),
            },
            Token::NodeType(name) => {
                let name = name.clone();
                self.advance()?;
                self.expect(Token::LeftParen, "(")?;
                let arg = match &self.current {
                    Token::String(s) if name == "processing-instruction" => Some(s.clone()),
                    _ => None,
                };
                if arg.is_some() {
                    self.advance()?;
                }
                if self.current != Token::RightParen {
                    return Err(format!("Expected ), got {:?}", self.current));
                }
                match name.as_str() {
                    "node" => NodeTest::Node,
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => NodeTest::ProcessingInstruction(arg),
                }
            }
            _ => return Err(format!("Expected node test, got {:?}", self.current)),
        };
        self.advance()?;

        let mut predicates = Vec::new();
        while matches!(self.current, Token::LeftBracket) {
            self.advance()?;
            predicates.push(self.parse_or_expr()?);
            self.expect(Token::RightBracket, "]")?;
        }
        if axis == Axis::Attribute && !predicates.is_empty() {
            return Err("Predicates on the attribute axis are not supported".to_string());
        }

        Ok(Step {
            axis,
            node_test,
            predicates,
        })
    }

    fn parse_function_args(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if !matches!(self.current, Token::RightParen) {
            args.push(self.parse_or_expr()?);
            while matches!(self.current, Token::Comma) {
                self.advance()?;
                args.push(self.parse_or_expr()?);
            }
        }
        self.expect(Token::RightParen, ")")?;
        Ok(args)
    }
}

/// `base//step` is shorthand for `base/descendant-or-self::node()/step`
fn descendant_path(base: Expr, step: Step) -> Expr {
    let desc = Step::bare(Axis::DescendantOrSelf, NodeTest::Node);
    Expr::Path(
        Box::new(Expr::Path(Box::new(base), Box::new(desc))),
        Box::new(step),
    )
}

/// Parse an XPath expression string
pub fn parse(input: &str) -> Result<Expr, String> {
    Parser::new(input)?.parse()
}
