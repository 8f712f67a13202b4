#[cfg(test)]
mod scanner_tests {
    use symfold::scanner::*;
    use symfold::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "[{*(,+)}]",
            &[
                (TokenType::LEFT_BRACKET, "["),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_BRACKET, "]"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators() {
        assert_token_sequence(
            "a && b || !c == d != e <= f",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::AMP_AMP, "&&"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::PIPE_PIPE, "||"),
                (TokenType::BANG, "!"),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::IDENTIFIER, "d"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::IDENTIFIER, "e"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::IDENTIFIER, "f"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords() {
        assert_token_sequence(
            "function let if else while for return true false foo",
            &[
                (TokenType::FUNCTION, "function"),
                (TokenType::LET, "let"),
                (TokenType::IF, "if"),
                (TokenType::ELSE, "else"),
                (TokenType::WHILE, "while"),
                (TokenType::FOR, "for"),
                (TokenType::RETURN, "return"),
                (TokenType::TRUE, "true"),
                (TokenType::FALSE, "false"),
                (TokenType::IDENTIFIER, "foo"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_comments_and_lines() {
        let source = "1\n2.5\n// skipped entirely\n3";
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 4); // three numbers + EOF

        assert_eq!(tokens[0].token_type, TokenType::NUMBER(1.0));
        assert_eq!(tokens[0].line, 1);

        assert_eq!(tokens[1].lexeme, "2.5");
        assert_eq!(tokens[1].line, 2);

        assert_eq!(tokens[2].lexeme, "3");
        assert_eq!(tokens[2].line, 4);
    }

    #[test]
    fn test_scanner_05_unexpected_characters() {
        let source = ",$&";
        let scanner = Scanner::new(source.as_bytes());

        let results: Vec<_> = scanner.collect();

        // COMMA, error for '$', error for lone '&', EOF
        assert_eq!(results.len(), 4);

        assert!(results[0].is_ok());
        assert!(results[3].is_ok());

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                err
            );
        }
    }
}
