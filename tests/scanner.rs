mod scanner_tests {
    use fave::error::FaveError;
    use fave::scanner::*;
    use fave::token::*;

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
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class foo fun var min max maxx",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "foo"),
                (TokenType::FUN, "fun"),
                (TokenType::VAR, "var"),
                (TokenType::MIN, "min"),
                (TokenType::MAX, "max"),
                (TokenType::IDENTIFIER, "maxx"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_number_literals() {
        let tokens: Vec<_> = Scanner::new(b"12 3.14 0.5")
            .filter_map(Result::ok)
            .collect();

        let values: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t.token_type {
                TokenType::NUMBER(n) => Some(n),
                _ => None,
            })
            .collect();

        assert_eq!(values, vec![12.0, 3.14, 0.5]);
    }

    #[test]
    fn test_scanner_05_multiline_string_advances_line() {
        let tokens: Vec<_> = Scanner::new(b"\"one\ntwo\" x")
            .filter_map(Result::ok)
            .collect();

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "one\ntwo"),
            other => panic!("expected string token, got {:?}", other),
        }

        // The identifier after the literal sits on line 2.
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_scanner_06_comments_are_skipped() {
        assert_token_sequence(
            "a // rest of line\nb /* block\ncomment */ c",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_07_block_comment_tracks_lines() {
        let tokens: Vec<_> = Scanner::new(b"/* one\ntwo\nthree */ x")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].lexeme, "x");
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn test_scanner_08_block_comments_do_not_nest() {
        // The first `*/` closes the comment; the rest is real input.
        assert_token_sequence(
            "/* outer /* inner */ x",
            &[(TokenType::IDENTIFIER, "x"), (TokenType::EOF, "")],
        );
    }

    #[test]
    fn test_scanner_09_unterminated_block_comment_swallows_rest() {
        // No closing `*/`: the remainder of the input is silently consumed
        // and only EOF comes out.
        let results: Vec<_> = Scanner::new(b"a /* never closed\nb c").collect();

        assert!(results.iter().all(|r| r.is_ok()));

        let tokens: Vec<_> = results.into_iter().filter_map(Result::ok).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "a");
        assert_eq!(tokens[1].token_type, TokenType::EOF);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_scanner_10_unterminated_string() {
        let results: Vec<_> = Scanner::new(b"\"never closed").collect();

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err().map(|e| e.to_string()))
            .collect();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Unterminated string."));
    }

    #[test]
    fn test_scanner_11_errors_do_not_stop_the_stream() {
        let results: Vec<_> = Scanner::new(b",.$(#").collect();

        // 2 valid tokens, error, valid token, error, EOF
        assert_eq!(results.len(), 6);

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            match err {
                FaveError::Lex { message, line } => {
                    assert!(message.contains("Unexpected character"));
                    assert_eq!(*line, 1);
                }
                other => panic!("expected lex error, got {:?}", other),
            }
        }

        // Exactly one EOF, and it comes last.
        let eof_positions: Vec<usize> = results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| match r {
                Ok(t) if t.token_type == TokenType::EOF => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(eof_positions, vec![5]);
    }

    #[test]
    fn test_scanner_12_exactly_one_eof_then_fused() {
        let mut scanner = Scanner::new(b"1 + 2");

        let mut eof_seen = 0;
        for result in &mut scanner {
            if let Ok(token) = result {
                if token.token_type == TokenType::EOF {
                    eof_seen += 1;
                }
            }
        }

        assert_eq!(eof_seen, 1);
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_scanner_13_number_token_display() {
        let tokens: Vec<_> = Scanner::new(b"12 3.14 10000000000000000")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].to_string(), "NUMBER 12 12.0");
        assert_eq!(tokens[1].to_string(), "NUMBER 3.14 3.14");

        // Past i64-exact range the integral fast path must not saturate.
        assert_eq!(
            tokens[2].to_string(),
            "NUMBER 10000000000000000 10000000000000000"
        );
    }
}
