//! Symbolic values held by the substitution environment.
//!
//! The environment does not store rendered text: it stores a small closed
//! sum over expression shapes and serializes to text only at the output
//! boundary (`Display`).  The textual quirks of the folded output all live
//! in that one `Display` impl:
//!
//! - a `*`/`/` left operand whose rendered text contains a space is wrapped
//!   in parentheses; the right operand never is,
//! - unary operators render in prefix-call form (`!(x)`, `-(5)`),
//! - fractionless numbers render without a decimal point.
//!
//! Fold-time simplification happens in the smart constructors: [`SymExpr::binary`]
//! elides an operand rendering exactly `"0"` for every operator (comparisons
//! and logical combinators included), and [`SymExpr::index`] substitutes the
//! element when the base is a literal array.  The branch-predicate collector
//! bypasses the smart constructors on purpose: negated disjunctions must
//! never elide.

use std::fmt;

use crate::error::{FoldError, Result};
use crate::eval;
use crate::parser::{Expr, LiteralValue};
use crate::token::{Token, TokenType};

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,

    /// `!`
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }

    pub fn from_token(token: &Token<'_>) -> Result<Self> {
        match token.token_type {
            TokenType::MINUS => Ok(UnaryOp::Neg),
            TokenType::BANG => Ok(UnaryOp::Not),
            _ => Err(FoldError::eval(format!(
                "unsupported unary operator '{}'",
                token.lexeme
            ))),
        }
    }
}

/// Infix binary and logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    EqEq,
    NotEq,
    And,
    Or,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Less => "<",
            BinOp::LessEq => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEq => ">=",
            BinOp::EqEq => "==",
            BinOp::NotEq => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    pub fn from_token(token: &Token<'_>) -> Result<Self> {
        match token.token_type {
            TokenType::PLUS => Ok(BinOp::Add),
            TokenType::MINUS => Ok(BinOp::Sub),
            TokenType::STAR => Ok(BinOp::Mul),
            TokenType::SLASH => Ok(BinOp::Div),
            TokenType::LESS => Ok(BinOp::Less),
            TokenType::LESS_EQUAL => Ok(BinOp::LessEq),
            TokenType::GREATER => Ok(BinOp::Greater),
            TokenType::GREATER_EQUAL => Ok(BinOp::GreaterEq),
            TokenType::EQUAL_EQUAL => Ok(BinOp::EqEq),
            TokenType::BANG_EQUAL => Ok(BinOp::NotEq),
            TokenType::AMP_AMP => Ok(BinOp::And),
            TokenType::PIPE_PIPE => Ok(BinOp::Or),
            _ => Err(FoldError::eval(format!(
                "unsupported binary operator '{}'",
                token.lexeme
            ))),
        }
    }
}

/// A symbolic expression value: the environment's currency and the shape of
/// every expression in the folded output tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SymExpr {
    /// A literal constant.
    Literal(LiteralValue),

    /// A reference to a name with no known value (function parameters,
    /// input-vector names, undeclared variables).
    VarRef(String),

    /// Prefix unary application.
    Unary {
        op: UnaryOp,
        operand: Box<SymExpr>,
    },

    /// Infix binary or logical application.
    Binary {
        left: Box<SymExpr>,
        op: BinOp,
        right: Box<SymExpr>,
    },

    /// Array literal.
    Array(Vec<SymExpr>),

    /// Symbolic indexing into a base that is not a known literal array.
    Index {
        base: Box<SymExpr>,
        index: Box<SymExpr>,
    },
}

impl SymExpr {
    /// Smart binary constructor: if either operand renders exactly `"0"`,
    /// the result is the other operand alone.  Applied uniformly to every
    /// operator, comparisons and logical combinators included.
    pub fn binary(left: SymExpr, op: BinOp, right: SymExpr) -> SymExpr {
        if left.to_string() == "0" {
            return right;
        }

        if right.to_string() == "0" {
            return left;
        }

        SymExpr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Smart indexing constructor: a literal-array base is indexed
    /// immediately and the element substituted; any other base stays a
    /// symbolic `Index`.
    pub fn index(base: SymExpr, index: SymExpr) -> Result<SymExpr> {
        if let SymExpr::Array(elements) = &base {
            let idx: usize = eval::array_index(&index, elements.len())?;

            return Ok(elements[idx].clone());
        }

        Ok(SymExpr::Index {
            base: Box::new(base),
            index: Box::new(index),
        })
    }

    /// Verbatim structural conversion from the parsed AST: no environment,
    /// no elision, no element substitution.  Used for pass-through
    /// statements and for input-vector value expressions.
    pub fn from_expr(expr: &Expr<'_>) -> Result<SymExpr> {
        match expr {
            Expr::Literal(lit) => Ok(SymExpr::Literal(lit.clone())),

            Expr::Variable(token) => Ok(SymExpr::VarRef(token.lexeme.to_string())),

            Expr::Grouping(inner) => Self::from_expr(inner),

            Expr::Unary { operator, right } => Ok(SymExpr::Unary {
                op: UnaryOp::from_token(operator)?,
                operand: Box::new(Self::from_expr(right)?),
            }),

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => Ok(SymExpr::Binary {
                left: Box::new(Self::from_expr(left)?),
                op: BinOp::from_token(operator)?,
                right: Box::new(Self::from_expr(right)?),
            }),

            Expr::Array(elements) => {
                let converted: Result<Vec<SymExpr>> =
                    elements.iter().map(Self::from_expr).collect();

                Ok(SymExpr::Array(converted?))
            }

            Expr::Index { object, index, .. } => Ok(SymExpr::Index {
                base: Box::new(Self::from_expr(object)?),
                index: Box::new(Self::from_expr(index)?),
            }),

            Expr::Assign { .. } => Err(FoldError::eval(
                "assignment is not allowed in expression position",
            )),
        }
    }

    /// Lift a concrete [`eval::Value`] back into literal form.
    pub fn from_value(value: &eval::Value) -> SymExpr {
        match value {
            eval::Value::Number(n) => SymExpr::Literal(LiteralValue::Number(*n)),

            eval::Value::Bool(true) => SymExpr::Literal(LiteralValue::True),

            eval::Value::Bool(false) => SymExpr::Literal(LiteralValue::False),

            eval::Value::Str(s) => SymExpr::Literal(LiteralValue::Str(s.clone())),

            eval::Value::Array(elements) => {
                SymExpr::Array(elements.iter().map(Self::from_value).collect())
            }
        }
    }
}

impl fmt::Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymExpr::Literal(LiteralValue::Number(n)) => {
                if n.fract() == 0.0 {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();

                    write!(f, "{}", buf.format(*n as i64))
                } else {
                    write!(f, "{}", n)
                }
            }

            SymExpr::Literal(LiteralValue::Str(s)) => write!(f, "\"{}\"", s),

            SymExpr::Literal(LiteralValue::True) => write!(f, "true"),

            SymExpr::Literal(LiteralValue::False) => write!(f, "false"),

            SymExpr::VarRef(name) => write!(f, "{}", name),

            SymExpr::Unary { op, operand } => write!(f, "{}({})", op.as_str(), operand),

            SymExpr::Binary { left, op, right } => {
                let mut rendered_left: String = left.to_string();

                // `a + b * 2` and `(a + b) * 2` must stay distinct; the
                // right operand is never wrapped.
                if matches!(op, BinOp::Mul | BinOp::Div) && rendered_left.contains(' ') {
                    rendered_left = format!("({})", rendered_left);
                }

                write!(f, "{} {} {}", rendered_left, op.as_str(), right)
            }

            SymExpr::Array(elements) => {
                let rendered: Vec<String> = elements.iter().map(SymExpr::to_string).collect();

                write!(f, "[{}]", rendered.join(","))
            }

            SymExpr::Index { base, index } => write!(f, "{}[{}]", base, index),
        }
    }
}
