use std::collections::HashMap;

use crate::sym::SymExpr;

/// Scoped substitution environment: variable name → symbolic value.
///
/// Scoping is call-by-value: entering any nested block takes a
/// [`snapshot`](Environment::snapshot) and mutations inside the block never
/// escape it.  There is no deletion and no enclosing chain; later writes
/// overwrite.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, SymExpr>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
        }
    }

    pub fn bind(&mut self, name: &str, value: SymExpr) {
        self.values.insert(name.to_string(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&SymExpr> {
        self.values.get(name)
    }

    /// Deep copy for block entry.
    pub fn snapshot(&self) -> Environment {
        self.clone()
    }
}
