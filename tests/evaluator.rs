#[cfg(test)]
mod evaluator_tests {
    use symfold::error::FoldError;
    use symfold::eval::{self, Bindings, Value, Verdict};
    use symfold::folder::fold_source;
    use symfold::highlight;
    use symfold::input::InputVector;

    #[test]
    fn input_vector_parses_numbers_arrays_and_expressions() {
        let vector =
            InputVector::parse("x = 1, y = [4, 5, 6], z = 2 * 3").expect("vector should parse");

        assert_eq!(vector.len(), 3);
        assert_eq!(vector.get("x"), Some(&Value::Number(1.0)));
        assert_eq!(
            vector.get("y"),
            Some(&Value::Array(vec![
                Value::Number(4.0),
                Value::Number(5.0),
                Value::Number(6.0),
            ]))
        );
        assert_eq!(vector.get("z"), Some(&Value::Number(6.0)));
    }

    #[test]
    fn input_vector_empty_text_is_empty() {
        assert!(InputVector::parse("").expect("empty is fine").is_empty());
        assert!(InputVector::parse("   ").expect("blank is fine").is_empty());
    }

    #[test]
    fn input_vector_rejects_malformed_pairs() {
        assert!(matches!(
            InputVector::parse("x 1"),
            Err(FoldError::Vector(_))
        ));

        assert!(matches!(
            InputVector::parse("1x = 2"),
            Err(FoldError::Vector(_))
        ));

        // Value expressions evaluate eagerly; failures surface here.
        assert!(matches!(
            InputVector::parse("x = 1 / 0"),
            Err(FoldError::Vector(_))
        ));
    }

    #[test]
    fn unresolved_identifier_fails_the_whole_run() {
        let source = "\
function f(x) {
    if (x < 1) {
        return 1;
    }
    if (q < 1) {
        return 2;
    }
}";

        let vector = InputVector::parse("x = 1").expect("vector should parse");
        let outcome = fold_source(source, &vector).expect("source should fold");

        assert_eq!(outcome.ledger.len(), 2);

        let result = eval::verdicts(
            &outcome.ledger,
            &Bindings {
                folded: &outcome.bindings,
                vector: &vector,
            },
        );

        assert!(matches!(
            result,
            Err(FoldError::Unresolved { ref name }) if name == "q"
        ));
    }

    #[test]
    fn fold_time_bindings_win_over_the_vector() {
        let source = "\
function f(x) {
    if (x < 3) {
    }
    x = 10;
}";

        let vector = InputVector::parse("x = 1").expect("vector should parse");
        let outcome = fold_source(source, &vector).expect("source should fold");

        let verdicts = eval::verdicts(
            &outcome.ledger,
            &Bindings {
                folded: &outcome.bindings,
                vector: &vector,
            },
        )
        .expect("predicate should evaluate");

        // The vector alone would say 1 < 3; the later assignment wins.
        assert_eq!(
            verdicts,
            vec![Verdict {
                truth: false,
                line: 2
            }]
        );
    }

    #[test]
    fn self_referential_binding_falls_back_to_the_vector() {
        let source = "\
function f(x) {
    while (x < 3) {
        x = x + 1;
    }
}";

        let vector = InputVector::parse("x = 1").expect("vector should parse");
        let outcome = fold_source(source, &vector).expect("source should fold");

        let verdicts = eval::verdicts(
            &outcome.ledger,
            &Bindings {
                folded: &outcome.bindings,
                vector: &vector,
            },
        )
        .expect("predicate should evaluate");

        // x -> x + 1 resolves the inner x from the vector: 1 + 1 < 3.
        assert_eq!(
            verdicts,
            vec![Verdict {
                truth: true,
                line: 2
            }]
        );
    }

    #[test]
    fn annotate_colors_one_marker_line_per_verdict() {
        let folded = "if (x) {\n}\nwhile (y) {\n}";

        let verdicts = vec![
            Verdict {
                truth: true,
                line: 1,
            },
            Verdict {
                truth: false,
                line: 3,
            },
        ];

        let annotated = highlight::annotate(folded, &verdicts);
        let lines: Vec<&str> = annotated.lines().collect();

        assert!(lines[0].starts_with("\x1b[32m"), "true verdict is green");
        assert_eq!(lines[1], "}");
        assert!(lines[2].starts_with("\x1b[31m"), "false verdict is red");
        assert_eq!(lines[3], "}");
    }
}
