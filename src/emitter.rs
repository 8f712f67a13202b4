//! Folded tree → formatted source text.
//!
//! Four-space indentation, one statement per line, and - load-bearing for
//! the highlighter - every conditional construct header on a line of its
//! own (`if (...) {`, `} else if (...) {`, `} else {`, `while (...) {`), so
//! the keyword scan consumes exactly one verdict per construct.

use crate::folder::FoldedStmt;
use crate::sym::SymExpr;

/// Render a folded program.  No trailing newline.
pub fn emit(program: &[FoldedStmt]) -> String {
    let mut out: String = String::new();

    for stmt in program {
        emit_stmt(stmt, 0, &mut out);
    }

    if out.ends_with('\n') {
        out.pop();
    }

    out
}

fn push_line(depth: usize, text: &str, out: &mut String) {
    for _ in 0..depth {
        out.push_str("    ");
    }

    out.push_str(text);
    out.push('\n');
}

fn emit_stmt(stmt: &FoldedStmt, depth: usize, out: &mut String) {
    match stmt {
        FoldedStmt::Function { name, params, body } => {
            push_line(
                depth,
                &format!("function {}({}) {{", name, params.join(", ")),
                out,
            );

            for inner in body {
                emit_stmt(inner, depth + 1, out);
            }

            push_line(depth, "}", out);
        }

        FoldedStmt::Block(statements) => {
            push_line(depth, "{", out);

            for inner in statements {
                emit_stmt(inner, depth + 1, out);
            }

            push_line(depth, "}", out);
        }

        FoldedStmt::Var { .. } => {
            push_line(depth, &format!("{};", inline_stmt(stmt)), out);
        }

        FoldedStmt::Expression(expr) => {
            push_line(depth, &format!("{};", expr), out);
        }

        FoldedStmt::Assign { target, value } => {
            push_line(depth, &format!("{} = {};", target, value), out);
        }

        FoldedStmt::If { test, then, els } => {
            push_line(depth, &format!("if ({}) {{", test), out);
            emit_branch(then, depth, out);

            let mut current: Option<&FoldedStmt> = els.as_deref();

            while let Some(alternate) = current {
                match alternate {
                    FoldedStmt::If {
                        test,
                        then,
                        els: nested,
                    } => {
                        push_line(depth, &format!("}} else if ({}) {{", test), out);
                        emit_branch(then, depth, out);

                        current = nested.as_deref();
                    }

                    terminal => {
                        push_line(depth, "} else {", out);
                        emit_branch(terminal, depth, out);

                        current = None;
                    }
                }
            }

            push_line(depth, "}", out);
        }

        FoldedStmt::While { test, body } => {
            push_line(depth, &format!("while ({}) {{", test), out);
            emit_branch(body, depth, out);
            push_line(depth, "}", out);
        }

        FoldedStmt::For {
            init,
            test,
            step,
            body,
        } => {
            let init_text: String = init.as_deref().map(inline_stmt).unwrap_or_default();
            let test_text: String = test.as_ref().map(SymExpr::to_string).unwrap_or_default();
            let step_text: String = step.as_deref().map(inline_stmt).unwrap_or_default();

            push_line(
                depth,
                &format!("for ({}; {}; {}) {{", init_text, test_text, step_text),
                out,
            );
            emit_branch(body, depth, out);
            push_line(depth, "}", out);
        }

        FoldedStmt::Return(value) => match value {
            Some(expr) => push_line(depth, &format!("return {};", expr), out),

            None => push_line(depth, "return;", out),
        },
    }
}

/// Branch bodies always render braced: a block inlines its statements, a
/// lone statement indents under the header.
fn emit_branch(stmt: &FoldedStmt, depth: usize, out: &mut String) {
    match stmt {
        FoldedStmt::Block(statements) => {
            for inner in statements {
                emit_stmt(inner, depth + 1, out);
            }
        }

        single => emit_stmt(single, depth + 1, out),
    }
}

/// Semicolon-free rendering for `for` headers and `let` lines.
fn inline_stmt(stmt: &FoldedStmt) -> String {
    match stmt {
        FoldedStmt::Var { declarators } => {
            let rendered: Vec<String> = declarators
                .iter()
                .map(|(name, init)| match init {
                    Some(expr) => format!("{} = {}", name, expr),
                    None => name.clone(),
                })
                .collect();

            format!("let {}", rendered.join(", "))
        }

        FoldedStmt::Assign { target, value } => format!("{} = {}", target, value),

        FoldedStmt::Expression(expr) => expr.to_string(),

        _ => String::new(),
    }
}
