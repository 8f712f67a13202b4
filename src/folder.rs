//! The fold-and-extract engine: recursive tree walker, statement folder,
//! and branch-predicate collector.
//!
//! Walking is top-down over the closed [`Stmt`] sum.  Each handler receives
//! the current [`Environment`]; the folder itself owns the input vector,
//! the predicate ledger, and the flat record of every binding discovered
//! during the fold (the evaluator's second resolution source).
//!
//! Statement policy:
//! - `let` declarations fold their initializers into the environment and
//!   are dropped unconditionally,
//! - assignments bind, then stay in the output only when their target's
//!   head names an input-vector variable (state the fold cannot resolve),
//! - other expression statements stay only when compound and headed by an
//!   input-vector name,
//! - control constructs are never dropped; `for` is outside the folded
//!   subset and passes through verbatim, its subtree unvisited.
//!
//! Every block entry (function body, branch, loop body, bare block) folds
//! under an environment snapshot, so inner rebindings never escape.

use std::collections::HashMap;

use log::{debug, info};

use crate::environment::Environment;
use crate::error::Result;
use crate::eval;
use crate::input::InputVector;
use crate::parser::{Declarator, Expr, Parser, Stmt};
use crate::scanner::Scanner;
use crate::sym::{BinOp, SymExpr, UnaryOp};
use crate::token::Token;

/// One ledger entry: a branch predicate and the source line of its
/// construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub expr: SymExpr,
    pub line: usize,
}

impl Predicate {
    /// Boundary rendering of the predicate.
    pub fn text(&self) -> String {
        self.expr.to_string()
    }
}

/// A statement of the folded output tree.  Expressions are symbolic; the
/// emitter serializes the tree back to source text.
#[derive(Debug, Clone, PartialEq)]
pub enum FoldedStmt {
    Function {
        name: String,
        params: Vec<String>,
        body: Vec<FoldedStmt>,
    },

    Block(Vec<FoldedStmt>),

    /// Only produced by the verbatim pass-through (`for` initializers):
    /// folded declarations are dropped, not kept.
    Var {
        declarators: Vec<(String, Option<SymExpr>)>,
    },

    Expression(SymExpr),

    Assign {
        target: SymExpr,
        value: SymExpr,
    },

    If {
        test: SymExpr,
        then: Box<FoldedStmt>,
        els: Option<Box<FoldedStmt>>,
    },

    While {
        test: SymExpr,
        body: Box<FoldedStmt>,
    },

    For {
        init: Option<Box<FoldedStmt>>,
        test: Option<SymExpr>,
        step: Option<Box<FoldedStmt>>,
        body: Box<FoldedStmt>,
    },

    Return(Option<SymExpr>),
}

/// Everything one fold produces.
#[derive(Debug, Clone)]
pub struct FoldOutcome {
    /// The folded statement tree, dropped statements omitted.
    pub program: Vec<FoldedStmt>,

    /// Ordered `(predicate, line)` ledger, one entry per conditional
    /// construct, in traversal order.
    pub ledger: Vec<Predicate>,

    /// Flat record of every binding made during the fold (inner scopes
    /// included, last write wins).
    pub bindings: HashMap<String, SymExpr>,
}

/// The walker.  One per invocation; holds no state across runs.
pub struct Folder<'v> {
    vector: &'v InputVector,
    ledger: Vec<Predicate>,
    bindings: HashMap<String, SymExpr>,
}

/// Scan, parse, and fold `source` in one step.
pub fn fold_source(source: &str, vector: &InputVector) -> Result<FoldOutcome> {
    let tokens: Vec<Token<'_>> = Scanner::new(source.as_bytes()).collect::<Result<Vec<_>>>()?;

    let mut parser: Parser<'_> = Parser::new(&tokens);
    let program: Vec<Stmt<'_>> = parser.parse()?;

    Folder::new(vector).fold(&program)
}

impl<'v> Folder<'v> {
    pub fn new(vector: &'v InputVector) -> Self {
        info!("Folder created ({} input-vector entries)", vector.len());

        Self {
            vector,
            ledger: Vec::new(),
            bindings: HashMap::new(),
        }
    }

    /// Fold a whole program under a fresh environment.
    pub fn fold(mut self, program: &[Stmt<'_>]) -> Result<FoldOutcome> {
        info!("Folding {} top-level statements", program.len());

        let mut env: Environment = Environment::new();
        let folded: Vec<FoldedStmt> = self.fold_list(program, &mut env)?;

        info!(
            "Fold complete: {} ledger entries, {} bindings",
            self.ledger.len(),
            self.bindings.len()
        );

        Ok(FoldOutcome {
            program: folded,
            ledger: self.ledger,
            bindings: self.bindings,
        })
    }

    // ───────────────────────── statement walking ────────────────────────

    fn fold_list(
        &mut self,
        statements: &[Stmt<'_>],
        env: &mut Environment,
    ) -> Result<Vec<FoldedStmt>> {
        let mut kept: Vec<FoldedStmt> = Vec::new();

        for stmt in statements {
            if let Some(folded) = self.fold_stmt(stmt, env)? {
                kept.push(folded);
            }
        }

        Ok(kept)
    }

    /// Dispatch one statement to its handler.  `None` means fully folded,
    /// omit from output.
    fn fold_stmt(&mut self, stmt: &Stmt<'_>, env: &mut Environment) -> Result<Option<FoldedStmt>> {
        match stmt {
            Stmt::Function { name, params, body } => {
                debug!("Folding function '{}'", name.lexeme);

                let mut scope: Environment = env.snapshot();
                let body: Vec<FoldedStmt> = self.fold_list(body, &mut scope)?;

                Ok(Some(FoldedStmt::Function {
                    name: name.lexeme.to_string(),
                    params: params.iter().map(|p| p.lexeme.to_string()).collect(),
                    body,
                }))
            }

            Stmt::Var { declarators, .. } => {
                self.fold_declarators(declarators, env)?;

                Ok(None)
            }

            Stmt::Expression { expr, .. } => self.fold_expr_stmt(expr, env),

            Stmt::Block { statements, .. } => {
                let mut scope: Environment = env.snapshot();

                Ok(Some(FoldedStmt::Block(
                    self.fold_list(statements, &mut scope)?,
                )))
            }

            Stmt::If { .. } => self.fold_if(stmt, env, &mut Vec::new()),

            Stmt::While {
                line,
                condition,
                body,
            } => {
                let test: SymExpr = self.fold_expr(condition, env)?;

                debug!("Ledger: while '{}' at line {}", test, line);

                self.ledger.push(Predicate {
                    expr: test.clone(),
                    line: *line,
                });

                let body: FoldedStmt = self
                    .fold_stmt(body, env)?
                    .unwrap_or_else(|| FoldedStmt::Block(Vec::new()));

                Ok(Some(FoldedStmt::While {
                    test,
                    body: Box::new(body),
                }))
            }

            Stmt::Return { value, .. } => {
                let value: Option<SymExpr> = value
                    .as_ref()
                    .map(|expr| self.fold_expr(expr, env))
                    .transpose()?;

                Ok(Some(FoldedStmt::Return(value)))
            }

            // Outside the folded subset: identity, subtree unvisited.
            Stmt::For { .. } => {
                debug!("Passing 'for' statement through untouched");

                Ok(Some(verbatim_stmt(stmt)?))
            }
        }
    }

    fn fold_declarators(
        &mut self,
        declarators: &[Declarator<'_>],
        env: &mut Environment,
    ) -> Result<()> {
        for declarator in declarators {
            if let Some(init) = &declarator.init {
                let value: SymExpr = self.fold_expr(init, env)?;

                self.bind(env, declarator.name.lexeme, value);
            }
        }

        Ok(())
    }

    /// `if` / `else if` chains share one precondition stack; a conditional
    /// nested inside a branch block starts a fresh one (it arrives here
    /// through [`fold_stmt`]).
    fn fold_if(
        &mut self,
        stmt: &Stmt<'_>,
        env: &mut Environment,
        preconditions: &mut Vec<SymExpr>,
    ) -> Result<Option<FoldedStmt>> {
        let Stmt::If {
            line,
            condition,
            then_branch,
            else_branch,
        } = stmt
        else {
            return self.fold_stmt(stmt, env);
        };

        let test: SymExpr = self.fold_expr(condition, env)?;

        // First arm: the test itself.  Later arms: the negated disjunction
        // of every sibling test seen so far, conjoined with this test.
        // Built raw: collector predicates never elide.
        let effective: SymExpr = if preconditions.is_empty() {
            test.clone()
        } else {
            SymExpr::Binary {
                left: Box::new(negated_disjunction(preconditions)),
                op: BinOp::And,
                right: Box::new(test.clone()),
            }
        };

        debug!("Ledger: if '{}' at line {}", effective, line);

        self.ledger.push(Predicate {
            expr: effective,
            line: *line,
        });

        preconditions.push(test.clone());

        let then: FoldedStmt = self
            .fold_stmt(then_branch, env)?
            .unwrap_or_else(|| FoldedStmt::Block(Vec::new()));

        let els: Option<Box<FoldedStmt>> = match else_branch {
            Some(alternate) => match alternate.as_ref() {
                chained @ Stmt::If { .. } => self
                    .fold_if(chained, env, preconditions)?
                    .map(Box::new),

                terminal => {
                    let folded: FoldedStmt = self
                        .fold_stmt(terminal, env)?
                        .unwrap_or_else(|| FoldedStmt::Block(Vec::new()));

                    // The implicit predicate of the bare `else`, keyed by
                    // the alternate's own first line.  Appended after the
                    // alternate's walk, so entries from conditionals nested
                    // inside it come first.
                    debug!(
                        "Ledger: else at line {} negates {} sibling tests",
                        terminal.line(),
                        preconditions.len()
                    );

                    self.ledger.push(Predicate {
                        expr: negated_disjunction(preconditions),
                        line: terminal.line(),
                    });

                    Some(Box::new(folded))
                }
            },

            None => None,
        };

        Ok(Some(FoldedStmt::If {
            test,
            then: Box::new(then),
            els,
        }))
    }

    // ───────────────────────── expression statements ─────────────────────

    /// Retention policy for expression statements.
    fn fold_expr_stmt(
        &mut self,
        expr: &Expr<'_>,
        env: &mut Environment,
    ) -> Result<Option<FoldedStmt>> {
        if let Expr::Assign { target, value } = expr {
            let (target_sym, value_sym) = self.apply_assignment(target, value, env)?;

            if self.names_vector_state(&target_sym.to_string()) {
                debug!("Retaining assignment to '{}'", target_sym);

                return Ok(Some(FoldedStmt::Assign {
                    target: target_sym,
                    value: value_sym,
                }));
            }

            debug!("Dropping assignment to '{}'", target_sym);

            return Ok(None);
        }

        let sym: SymExpr = self.fold_expr(expr, env)?;
        let text: String = sym.to_string();

        let mut tokens = text.split_whitespace();
        let first: &str = tokens.next().unwrap_or("");
        let compound: bool = tokens.next().is_some();

        if compound && self.names_vector_state(first) {
            debug!("Retaining expression statement '{}'", text);

            Ok(Some(FoldedStmt::Expression(sym)))
        } else {
            debug!("Dropping expression statement '{}'", text);

            Ok(None)
        }
    }

    /// Does `token` (or its text before the first `[`) name an input-vector
    /// variable?
    fn names_vector_state(&self, token: &str) -> bool {
        let head: &str = token.split('[').next().unwrap_or(token);

        self.vector.contains(token) || self.vector.contains(head)
    }

    /// Fold the RHS, update the environment, and return the rendered target
    /// plus folded value.  Retention is the caller's decision.
    fn apply_assignment(
        &mut self,
        target: &Expr<'_>,
        value: &Expr<'_>,
        env: &mut Environment,
    ) -> Result<(SymExpr, SymExpr)> {
        // The target renders under an empty environment: `a[i] = v` keeps
        // its own name even when `a` is bound.
        let target_sym: SymExpr = self.fold_expr(target, &mut Environment::new())?;
        let value_sym: SymExpr = self.fold_expr(value, env)?;

        match &target_sym {
            SymExpr::VarRef(name) => {
                self.bind(env, name, value_sym.clone());
            }

            SymExpr::Index { base, index } => {
                if let SymExpr::VarRef(base_name) = base.as_ref() {
                    if let Some(SymExpr::Array(elements)) = env.lookup(base_name).cloned() {
                        // A known literal array mutates in place: evaluate
                        // the index and the RHS, replace the element,
                        // rebind the base.
                        let idx: usize = eval::array_index(index, elements.len())?;
                        let concrete = eval::evaluate_closed(&value_sym)?;

                        let mut elements: Vec<SymExpr> = elements;
                        elements[idx] = SymExpr::from_value(&concrete);

                        self.bind(env, base_name, SymExpr::Array(elements));
                    }
                }

                // The rendered two-token key is bound as well; both
                // bindings persist.
                self.bind(env, &target_sym.to_string(), value_sym.clone());
            }

            other => {
                self.bind(env, &other.to_string(), value_sym.clone());
            }
        }

        Ok((target_sym, value_sym))
    }

    fn bind(&mut self, env: &mut Environment, name: &str, value: SymExpr) {
        debug!("Binding {} -> {}", name, value);

        env.bind(name, value.clone());
        self.bindings.insert(name.to_string(), value);
    }

    // ───────────────────────── expression folding ────────────────────────

    /// Fold an expression under `env` into its symbolic value.
    fn fold_expr(&mut self, expr: &Expr<'_>, env: &mut Environment) -> Result<SymExpr> {
        match expr {
            Expr::Literal(lit) => Ok(SymExpr::Literal(lit.clone())),

            Expr::Variable(token) => Ok(env
                .lookup(token.lexeme)
                .cloned()
                .unwrap_or_else(|| SymExpr::VarRef(token.lexeme.to_string()))),

            Expr::Grouping(inner) => self.fold_expr(inner, env),

            Expr::Unary { operator, right } => Ok(SymExpr::Unary {
                op: UnaryOp::from_token(operator)?,
                operand: Box::new(self.fold_expr(right, env)?),
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
            } => {
                let left: SymExpr = self.fold_expr(left, env)?;
                let right: SymExpr = self.fold_expr(right, env)?;

                Ok(SymExpr::binary(left, BinOp::from_token(operator)?, right))
            }

            Expr::Array(elements) => {
                let mut folded: Vec<SymExpr> = Vec::with_capacity(elements.len());

                for element in elements {
                    folded.push(self.fold_expr(element, env)?);
                }

                Ok(SymExpr::Array(folded))
            }

            Expr::Index { object, index, .. } => {
                let base: SymExpr = self.fold_expr(object, env)?;
                let index: SymExpr = self.fold_expr(index, env)?;

                SymExpr::index(base, index)
            }

            // A nested assignment binds and folds to its value.
            Expr::Assign { target, value } => {
                let (_, value_sym) = self.apply_assignment(target, value, env)?;

                Ok(value_sym)
            }
        }
    }
}

/// `!(c1 || c2 || ...)` over the precondition stack, built raw so nothing
/// elides.
fn negated_disjunction(conditions: &[SymExpr]) -> SymExpr {
    let mut iter = conditions.iter().cloned();

    let first: SymExpr = iter.next().unwrap_or(SymExpr::VarRef(String::new()));

    let disjunction: SymExpr = iter.fold(first, |acc, next| SymExpr::Binary {
        left: Box::new(acc),
        op: BinOp::Or,
        right: Box::new(next),
    });

    SymExpr::Unary {
        op: UnaryOp::Not,
        operand: Box::new(disjunction),
    }
}

// ───────────────────────── verbatim pass-through ─────────────────────────

/// Structural identity conversion for statements outside the folded
/// subset: no substitution, no elision, no ledger entries.  Also the
/// formatting path: parse-then-emit round-trips through it.
pub fn verbatim_stmt(stmt: &Stmt<'_>) -> Result<FoldedStmt> {
    match stmt {
        Stmt::Expression { expr, .. } => verbatim_expr_stmt(expr),

        Stmt::Var { declarators, .. } => {
            let mut converted: Vec<(String, Option<SymExpr>)> =
                Vec::with_capacity(declarators.len());

            for declarator in declarators {
                converted.push((
                    declarator.name.lexeme.to_string(),
                    declarator
                        .init
                        .as_ref()
                        .map(SymExpr::from_expr)
                        .transpose()?,
                ));
            }

            Ok(FoldedStmt::Var {
                declarators: converted,
            })
        }

        Stmt::Block { statements, .. } => {
            let converted: Result<Vec<FoldedStmt>> =
                statements.iter().map(verbatim_stmt).collect();

            Ok(FoldedStmt::Block(converted?))
        }

        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => Ok(FoldedStmt::If {
            test: SymExpr::from_expr(condition)?,
            then: Box::new(verbatim_stmt(then_branch)?),
            els: else_branch
                .as_ref()
                .map(|alt| verbatim_stmt(alt).map(Box::new))
                .transpose()?,
        }),

        Stmt::While {
            condition, body, ..
        } => Ok(FoldedStmt::While {
            test: SymExpr::from_expr(condition)?,
            body: Box::new(verbatim_stmt(body)?),
        }),

        Stmt::For {
            initializer,
            condition,
            increment,
            body,
            ..
        } => Ok(FoldedStmt::For {
            init: initializer
                .as_ref()
                .map(|init| verbatim_stmt(init).map(Box::new))
                .transpose()?,
            test: condition.as_ref().map(SymExpr::from_expr).transpose()?,
            step: increment
                .as_ref()
                .map(|step| verbatim_expr_stmt(step).map(Box::new))
                .transpose()?,
            body: Box::new(verbatim_stmt(body)?),
        }),

        Stmt::Function { name, params, body } => {
            let converted: Result<Vec<FoldedStmt>> = body.iter().map(verbatim_stmt).collect();

            Ok(FoldedStmt::Function {
                name: name.lexeme.to_string(),
                params: params.iter().map(|p| p.lexeme.to_string()).collect(),
                body: converted?,
            })
        }

        Stmt::Return { value, .. } => Ok(FoldedStmt::Return(
            value.as_ref().map(SymExpr::from_expr).transpose()?,
        )),
    }
}

fn verbatim_expr_stmt(expr: &Expr<'_>) -> Result<FoldedStmt> {
    match expr {
        Expr::Assign { target, value } => Ok(FoldedStmt::Assign {
            target: SymExpr::from_expr(target)?,
            value: SymExpr::from_expr(value)?,
        }),

        other => Ok(FoldedStmt::Expression(SymExpr::from_expr(other)?)),
    }
}
