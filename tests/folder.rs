#[cfg(test)]
mod folder_tests {
    use symfold::emitter;
    use symfold::eval::{self, Bindings, Verdict};
    use symfold::folder::{fold_source, FoldOutcome};
    use symfold::input::InputVector;

    /// Fold `source` against `vector_text` and return the emitted text
    /// along with the raw outcome and the parsed vector.
    fn fold(source: &str, vector_text: &str) -> (String, FoldOutcome, InputVector) {
        let vector = InputVector::parse(vector_text).expect("input vector should parse");
        let outcome = fold_source(source, &vector).expect("source should fold");
        let folded = emitter::emit(&outcome.program);

        (folded, outcome, vector)
    }

    fn ledger_texts(outcome: &FoldOutcome) -> Vec<(String, usize)> {
        outcome
            .ledger
            .iter()
            .map(|p| (p.text(), p.line))
            .collect()
    }

    fn verdicts_of(outcome: &FoldOutcome, vector: &InputVector) -> Vec<Verdict> {
        eval::verdicts(
            &outcome.ledger,
            &Bindings {
                folded: &outcome.bindings,
                vector,
            },
        )
        .expect("all predicates should evaluate")
    }

    #[test]
    fn declarations_fold_away_and_substitute() {
        let source = "\
function f(x) {
    let a = 10;
    return a + x;
}";

        let (folded, outcome, _) = fold(source, "");

        assert_eq!(
            folded,
            "\
function f(x) {
    return 10 + x;
}"
        );
        assert!(outcome.ledger.is_empty());
    }

    #[test]
    fn zero_elision_for_addition() {
        let source = "\
function f(a) {
    let b = 0 + a;
    let c = b + 0;
    return c;
}";

        let (folded, _, _) = fold(source, "");

        assert_eq!(
            folded,
            "\
function f(a) {
    return a;
}"
        );
    }

    #[test]
    fn zero_elision_is_operator_agnostic() {
        // The elision fires for comparisons too: `0 < x` folds to `x`.
        let source = "\
function f(x) {
    return 0 < x;
}";

        let (folded, _, _) = fold(source, "");

        assert_eq!(
            folded,
            "\
function f(x) {
    return x;
}"
        );

        // And for logical combinators: `x || 0` folds to `x`.
        let source = "\
function f(x) {
    return x || 0;
}";

        let (folded, _, _) = fold(source, "");

        assert_eq!(
            folded,
            "\
function f(x) {
    return x;
}"
        );
    }

    #[test]
    fn unary_renders_in_prefix_call_form() {
        let source = "\
function f(x) {
    return -5;
}";

        let (folded, _, _) = fold(source, "");

        assert_eq!(
            folded,
            "\
function f(x) {
    return -(5);
}"
        );
    }

    #[test]
    fn expression_statement_retention() {
        let source = "\
function f(x) {
    x + 1;
    x;
    y + 1;
}";

        let (folded, _, _) = fold(source, "x = 1");

        // Compound and headed by a vector name stays; a lone identifier and
        // an unknown-headed expression go.
        assert_eq!(
            folded,
            "\
function f(x) {
    x + 1;
}"
        );
    }

    #[test]
    fn retained_assignment_still_binds() {
        let source = "\
function f(x) {
    x = 5;
    return x + 1;
}";

        let (folded, _, _) = fold(source, "x = 1");

        assert_eq!(
            folded,
            "\
function f(x) {
    x = 5;
    return 5 + 1;
}"
        );
    }

    #[test]
    fn block_rebindings_do_not_escape() {
        let source = "\
function f(x) {
    let a = 1;
    if (x < 2) {
        a = 5;
    }
    return a;
}";

        let (folded, outcome, _) = fold(source, "");

        assert_eq!(
            folded,
            "\
function f(x) {
    if (x < 2) {
    }
    return 1;
}"
        );
        assert_eq!(ledger_texts(&outcome), vec![("x < 2".to_string(), 3)]);
    }

    #[test]
    fn local_array_mutation_folds_to_element() {
        let source = "\
function f(x) {
    let a = [1, 2, 3];
    a[1] = 2;
    return a[1];
}";

        let (folded, _, _) = fold(source, "");

        assert_eq!(
            folded,
            "\
function f(x) {
    return 2;
}"
        );
    }

    #[test]
    fn caller_supplied_array_is_never_folded() {
        let source = "\
function f(x) {
    x[1] = 3;
    return x[1];
}";

        let (folded, _, _) = fold(source, "x = [1]");

        assert_eq!(
            folded,
            "\
function f(x) {
    x[1] = 3;
    return x[1];
}"
        );
    }

    #[test]
    fn for_statements_pass_through_untouched() {
        let source = "\
function f(x) {
    for (let i = 0; i < x; i = i + 1) {
        x = x + 1;
    }
}";

        let (folded, outcome, _) = fold(source, "x = 1");

        assert_eq!(folded, source);
        assert!(outcome.ledger.is_empty());
    }

    #[test]
    fn while_loop_folds_and_evaluates() {
        let source = "\
function foo(x, y, z) {
    let a = x + 1;
    let b = a + y;
    let c = 0;
    let z;
    while (a < z) {
        c = a + b;
        z = c * 2;
    }
    return z;
}";

        let (folded, outcome, vector) = fold(source, "x = 1, y = 2, z = 3");

        assert_eq!(
            folded,
            "\
function foo(x, y, z) {
    while (x + 1 < z) {
        z = (x + 1 + x + 1 + y) * 2;
    }
    return z;
}"
        );

        assert_eq!(ledger_texts(&outcome), vec![("x + 1 < z".to_string(), 6)]);

        // The fold-time binding for `z` wins over the vector entry.
        assert_eq!(
            verdicts_of(&outcome, &vector),
            vec![Verdict {
                truth: true,
                line: 6
            }]
        );
    }

    #[test]
    fn if_chain_ledger_and_negation() {
        let source = "\
function foo(x, y, z) {
    let a = x + 1;
    let b = a + y;
    let c = 0;
    if (b < z) {
        c = c + 5;
        return x + y + z + c;
    } else if (b < z * 2) {
        c = c + x + 5;
        return x + y + z + c;
    } else {
        c = c + z + 5;
        return x + y + z + c;
    }
}";

        let (_, outcome, _) = fold(source, "x = 1, y = 2, z = 3");

        assert_eq!(
            ledger_texts(&outcome),
            vec![
                ("x + 1 + y < z".to_string(), 5),
                ("!(x + 1 + y < z) && x + 1 + y < z * 2".to_string(), 8),
                ("!(x + 1 + y < z || x + 1 + y < z * 2)".to_string(), 11),
            ]
        );
    }

    #[test]
    fn full_if_chain_end_to_end() {
        let source = "\
function foo(x, y, z) {
    let a = x + 1;
    let b = a + y;
    let c = 0;
    if (b < z) {
        c = c + 5;
        return x + y + z + c;
    } else if (b < z * 2) {
        c = c + x + 5;
        return x + y + z + c;
    } else {
        c = c + z + 5;
        return x + y + z + c;
    }
}";

        let (folded, outcome, vector) = fold(source, "x = 1, y = 2, z = 3");

        assert_eq!(
            folded,
            "\
function foo(x, y, z) {
    if (x + 1 + y < z) {
        return x + y + z + 5;
    } else if (x + 1 + y < z * 2) {
        return x + y + z + x + 5;
    } else {
        return x + y + z + z + 5;
    }
}"
        );

        assert_eq!(
            verdicts_of(&outcome, &vector),
            vec![
                Verdict {
                    truth: false,
                    line: 5
                },
                Verdict {
                    truth: true,
                    line: 8
                },
                Verdict {
                    truth: false,
                    line: 11
                },
            ]
        );
    }
}
