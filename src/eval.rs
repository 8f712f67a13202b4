//! Concrete evaluation over symbolic expressions.
//!
//! This is the engine's only route from symbolic to concrete: array
//! mutation during folding, input-vector values, and predicate verdicts all
//! come through [`evaluate`].  Text is never handed to a host evaluator and
//! never re-parsed.
//!
//! Identifier resolution order: fold-time bindings first (recursively
//! evaluating the bound symbolic value), then the input vector.  A name
//! resolvable by neither fails the run.  A self-referential fold binding
//! (`x = x + 1` retained against a vector entry for `x`) falls back to the
//! vector for the inner occurrence instead of recursing forever.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::error::{FoldError, Result};
use crate::folder::Predicate;
use crate::input::InputVector;
use crate::parser::LiteralValue;
use crate::sym::{BinOp, SymExpr, UnaryOp};

/// A concrete runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    Array(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::Bool(b) => write!(f, "{}", b),

            Value::Str(s) => write!(f, "{}", s),

            Value::Array(elements) => {
                let rendered: Vec<String> = elements.iter().map(Value::to_string).collect();

                write!(f, "[{}]", rendered.join(","))
            }
        }
    }
}

/// The merged name resolution sources for one evaluation.
pub struct Bindings<'a> {
    /// Every binding discovered during folding, flat, last write wins.
    /// Takes precedence over the vector on conflict.
    pub folded: &'a HashMap<String, SymExpr>,

    /// The caller-supplied input vector.
    pub vector: &'a InputVector,
}

/// Evaluate `expr` against `bindings` down to a concrete [`Value`].
pub fn evaluate(expr: &SymExpr, bindings: &Bindings<'_>) -> Result<Value> {
    eval_in(expr, bindings, &mut Vec::new())
}

/// Evaluate an expression that must not reference any name.
pub fn evaluate_closed(expr: &SymExpr) -> Result<Value> {
    let folded: HashMap<String, SymExpr> = HashMap::new();
    let vector: InputVector = InputVector::new();

    evaluate(
        expr,
        &Bindings {
            folded: &folded,
            vector: &vector,
        },
    )
}

/// Resolve an index expression (closed) to a position within `len`.
pub fn array_index(index: &SymExpr, len: usize) -> Result<usize> {
    match evaluate_closed(index)? {
        Value::Number(n) if n.fract() == 0.0 && n >= 0.0 && (n as usize) < len => Ok(n as usize),

        other => Err(FoldError::eval(format!(
            "invalid array index {} (array length {})",
            other, len
        ))),
    }
}

/// Truthiness: nonzero numbers, nonempty strings, and every array are true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Number(n) => *n != 0.0,
        Value::Bool(b) => *b,
        Value::Str(s) => !s.is_empty(),
        Value::Array(_) => true,
    }
}

fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| is_equal(x, y))
        }
        _ => false,
    }
}

fn eval_in(expr: &SymExpr, bindings: &Bindings<'_>, active: &mut Vec<String>) -> Result<Value> {
    debug!("Evaluating symbolic expression: {}", expr);

    match expr {
        SymExpr::Literal(LiteralValue::Number(n)) => Ok(Value::Number(*n)),

        SymExpr::Literal(LiteralValue::Str(s)) => Ok(Value::Str(s.clone())),

        SymExpr::Literal(LiteralValue::True) => Ok(Value::Bool(true)),

        SymExpr::Literal(LiteralValue::False) => Ok(Value::Bool(false)),

        SymExpr::VarRef(name) => {
            if !active.iter().any(|n| n == name) {
                if let Some(bound) = bindings.folded.get(name) {
                    active.push(name.clone());
                    let value: Result<Value> = eval_in(bound, bindings, active);
                    active.pop();

                    return value;
                }
            }

            if let Some(value) = bindings.vector.get(name) {
                return Ok(value.clone());
            }

            Err(FoldError::unresolved(name.clone()))
        }

        SymExpr::Unary { op, operand } => {
            let value: Value = eval_in(operand, bindings, active)?;

            match op {
                UnaryOp::Neg => {
                    if let Value::Number(n) = value {
                        Ok(Value::Number(-n))
                    } else {
                        Err(FoldError::eval("Operand must be a number"))
                    }
                }

                UnaryOp::Not => Ok(Value::Bool(!is_truthy(&value))),
            }
        }

        SymExpr::Binary { left, op, right } => {
            // Short-circuit forms return an operand, like the source
            // language they fold.
            if *op == BinOp::Or {
                let left_val: Value = eval_in(left, bindings, active)?;
                if is_truthy(&left_val) {
                    return Ok(left_val);
                }

                return eval_in(right, bindings, active);
            }

            if *op == BinOp::And {
                let left_val: Value = eval_in(left, bindings, active)?;
                if !is_truthy(&left_val) {
                    return Ok(left_val);
                }

                return eval_in(right, bindings, active);
            }

            let left_val: Value = eval_in(left, bindings, active)?;
            let right_val: Value = eval_in(right, bindings, active)?;

            debug!("Left operand: {}, Right operand: {}", left_val, right_val);

            match op {
                BinOp::Add => match (left_val, right_val) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                    _ => Err(FoldError::eval(
                        "Operands must be two numbers or two strings",
                    )),
                },

                BinOp::Sub => numeric(left_val, right_val, |a, b| Value::Number(a - b)),

                BinOp::Mul => numeric(left_val, right_val, |a, b| Value::Number(a * b)),

                BinOp::Div => match (left_val, right_val) {
                    (Value::Number(_), Value::Number(b)) if b == 0.0 => {
                        Err(FoldError::eval("Division by zero"))
                    }
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
                    _ => Err(FoldError::eval("Operands must be numbers")),
                },

                BinOp::EqEq => Ok(Value::Bool(is_equal(&left_val, &right_val))),

                BinOp::NotEq => Ok(Value::Bool(!is_equal(&left_val, &right_val))),

                BinOp::Less => numeric(left_val, right_val, |a, b| Value::Bool(a < b)),

                BinOp::LessEq => numeric(left_val, right_val, |a, b| Value::Bool(a <= b)),

                BinOp::Greater => numeric(left_val, right_val, |a, b| Value::Bool(a > b)),

                BinOp::GreaterEq => numeric(left_val, right_val, |a, b| Value::Bool(a >= b)),

                _ => Err(FoldError::eval("Invalid binary operator")),
            }
        }

        SymExpr::Array(elements) => {
            let mut values: Vec<Value> = Vec::with_capacity(elements.len());

            for element in elements {
                values.push(eval_in(element, bindings, active)?);
            }

            Ok(Value::Array(values))
        }

        SymExpr::Index { base, index } => {
            let base_val: Value = eval_in(base, bindings, active)?;
            let index_val: Value = eval_in(index, bindings, active)?;

            match (base_val, index_val) {
                (Value::Array(elements), Value::Number(n))
                    if n.fract() == 0.0 && n >= 0.0 && (n as usize) < elements.len() =>
                {
                    Ok(elements[n as usize].clone())
                }

                (Value::Array(elements), other) => Err(FoldError::eval(format!(
                    "invalid array index {} (array length {})",
                    other,
                    elements.len()
                ))),

                _ => Err(FoldError::eval("Only arrays can be indexed")),
            }
        }
    }
}

fn numeric(left: Value, right: Value, apply: fn(f64, f64) -> Value) -> Result<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(apply(a, b)),
        _ => Err(FoldError::eval("Operands must be numbers")),
    }
}

/// One evaluated ledger entry: the predicate's truth and its source line.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Verdict {
    pub truth: bool,
    pub line: usize,
}

/// Turn every ledger entry into a boolean verdict, preserving order.
/// Any single failure fails the whole run: no partial verdict list.
pub fn verdicts(ledger: &[Predicate], bindings: &Bindings<'_>) -> Result<Vec<Verdict>> {
    info!("Evaluating {} ledger predicates", ledger.len());

    let mut out: Vec<Verdict> = Vec::with_capacity(ledger.len());

    for predicate in ledger {
        let value: Value = evaluate(&predicate.expr, bindings)?;
        let truth: bool = is_truthy(&value);

        debug!(
            "Predicate '{}' (line {}) => {}",
            predicate.text(),
            predicate.line,
            truth
        );

        out.push(Verdict {
            truth,
            line: predicate.line,
        });
    }

    Ok(out)
}
