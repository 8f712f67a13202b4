//! Input-vector parsing: the caller-supplied concrete values for a
//! program's external parameters, written as a comma-separated list of
//! `name = value` pairs.
//!
//! A `value` may be a number, an arithmetic expression, or a bracketed
//! array literal; commas inside `[...]` belong to the array, so splitting
//! is boundary-aware.  Values are parsed with the ordinary scanner/parser
//! and evaluated with the closed evaluator - there is no separate value
//! grammar to maintain.

use std::collections::HashMap;

use log::{debug, info};

use crate::error::{FoldError, Result};
use crate::eval::{self, Value};
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::sym::SymExpr;
use crate::token::Token;

/// Immutable name → concrete value mapping for one run.
#[derive(Debug, Clone, Default)]
pub struct InputVector {
    values: HashMap<String, Value>,
}

impl InputVector {
    pub fn new() -> Self {
        InputVector {
            values: HashMap::new(),
        }
    }

    /// Parse `"x = 1, y = [4, 5, 6], z = 2 * 3"` style text.  Empty or
    /// all-whitespace text is an empty vector.
    pub fn parse(text: &str) -> Result<Self> {
        info!("Parsing input vector: {:?}", text);

        let mut vector: InputVector = InputVector::new();

        let trimmed: &str = text.trim();
        if trimmed.is_empty() {
            return Ok(vector);
        }

        for pair in split_pairs(trimmed) {
            let (name, value_text) = pair.split_once('=').ok_or_else(|| {
                FoldError::Vector(format!("expected 'name = value', got '{}'", pair.trim()))
            })?;

            let name: &str = name.trim();
            if !is_identifier(name) {
                return Err(FoldError::Vector(format!(
                    "invalid variable name '{}'",
                    name
                )));
            }

            let value: Value = parse_value(value_text.trim())?;

            debug!("Input vector entry: {} = {}", name, value);

            vector.values.insert(name.to_string(), value);
        }

        Ok(vector)
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Split on commas that sit outside `[...]`.
fn split_pairs(text: &str) -> Vec<&str> {
    let mut pairs: Vec<&str> = Vec::new();
    let mut depth: usize = 0;
    let mut start: usize = 0;

    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pairs.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    pairs.push(&text[start..]);
    pairs
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Evaluate one value expression down to a concrete [`Value`].
fn parse_value(text: &str) -> Result<Value> {
    let tokens: Vec<Token<'_>> = Scanner::new(text.as_bytes())
        .collect::<Result<Vec<Token<'_>>>>()
        .map_err(|e| FoldError::Vector(format!("in value '{}': {}", text, e)))?;

    let mut parser: Parser<'_> = Parser::new(&tokens);

    let expr = parser
        .parse_expression()
        .map_err(|e| FoldError::Vector(format!("in value '{}': {}", text, e)))?;

    let sym: SymExpr = SymExpr::from_expr(&expr)?;

    eval::evaluate_closed(&sym)
        .map_err(|e| FoldError::Vector(format!("in value '{}': {}", text, e)))
}
