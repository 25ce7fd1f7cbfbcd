#[cfg(test)]
mod scanner_tests {
    use asp_expr as asp;

    use asp::scanner::*;
    use asp::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenKind, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_kind, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.kind, *expected_kind);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "( ) , . : + - * / \\ ^ & = <> < <= > >=",
            &[
                (TokenKind::LEFT_PAREN, "("),
                (TokenKind::RIGHT_PAREN, ")"),
                (TokenKind::COMMA, ","),
                (TokenKind::DOT, "."),
                (TokenKind::COLON, ":"),
                (TokenKind::PLUS, "+"),
                (TokenKind::MINUS, "-"),
                (TokenKind::STAR, "*"),
                (TokenKind::SLASH, "/"),
                (TokenKind::BACKSLASH, "\\"),
                (TokenKind::CARET, "^"),
                (TokenKind::AMPERSAND, "&"),
                (TokenKind::EQUAL, "="),
                (TokenKind::NOT_EQUAL, "<>"),
                (TokenKind::LESS, "<"),
                (TokenKind::LESS_EQUAL, "<="),
                (TokenKind::GREATER, ">"),
                (TokenKind::GREATER_EQUAL, ">="),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_keywords_ignore_case() {
        assert_token_sequence(
            "aNd OR not XOR eqv Imp mod True FALSE empty Null nothing",
            &[
                (TokenKind::AND, "aNd"),
                (TokenKind::OR, "OR"),
                (TokenKind::NOT, "not"),
                (TokenKind::XOR, "XOR"),
                (TokenKind::EQV, "eqv"),
                (TokenKind::IMP, "Imp"),
                (TokenKind::MOD, "mod"),
                (TokenKind::LITERAL(LiteralKind::BOOLEAN), "True"),
                (TokenKind::LITERAL(LiteralKind::BOOLEAN), "FALSE"),
                (TokenKind::LITERAL(LiteralKind::EMPTY), "empty"),
                (TokenKind::LITERAL(LiteralKind::NULL), "Null"),
                (TokenKind::IDENTIFIER, "nothing"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_numbers() {
        assert_token_sequence(
            "42 3.14 .5 1E+20 2e3 &HFF &O17& 7",
            &[
                (TokenKind::LITERAL(LiteralKind::INTEGER), "42"),
                (TokenKind::LITERAL(LiteralKind::FLOAT), "3.14"),
                (TokenKind::LITERAL(LiteralKind::FLOAT), ".5"),
                (TokenKind::LITERAL(LiteralKind::FLOAT), "1E+20"),
                (TokenKind::LITERAL(LiteralKind::FLOAT), "2e3"),
                (TokenKind::LITERAL(LiteralKind::HEX), "&HFF"),
                (TokenKind::LITERAL(LiteralKind::OCTAL), "&O17&"),
                (TokenKind::LITERAL(LiteralKind::INTEGER), "7"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_bad_hex_digits_stay_one_token() {
        assert_token_sequence(
            "a & &HFG",
            &[
                (TokenKind::IDENTIFIER, "a"),
                (TokenKind::AMPERSAND, "&"),
                (TokenKind::LITERAL(LiteralKind::HEX), "&HFG"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_strings_dates_and_bracketed_names() {
        assert_token_sequence(
            "\"say \"\"hi\"\"\" & #1/2/2003# & [my var]",
            &[
                (TokenKind::LITERAL(LiteralKind::STRING), "\"say \"\"hi\"\"\""),
                (TokenKind::AMPERSAND, "&"),
                (TokenKind::LITERAL(LiteralKind::DATE), "#1/2/2003#"),
                (TokenKind::AMPERSAND, "&"),
                (TokenKind::IDENTIFIER, "[my var]"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_06_comments_and_newlines() {
        assert_token_sequence(
            "1 ' trailing comment\r\n2 'last",
            &[
                (TokenKind::LITERAL(LiteralKind::INTEGER), "1"),
                (TokenKind::NEWLINE, "\r\n"),
                (TokenKind::LITERAL(LiteralKind::INTEGER), "2"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_07_line_continuation() {
        assert_token_sequence(
            "1 + _\n    2",
            &[
                (TokenKind::LITERAL(LiteralKind::INTEGER), "1"),
                (TokenKind::PLUS, "+"),
                (TokenKind::LITERAL(LiteralKind::INTEGER), "2"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_08_spans_are_byte_offsets() {
        let tokens: Vec<Token> = Scanner::new("ab + 12")
            .collect::<Result<_, _>>()
            .expect("scans");

        let spans: Vec<Span> = tokens.iter().map(|t| t.span).collect();

        assert_eq!(
            spans,
            vec![
                Span::new(0, 2),
                Span::new(3, 4),
                Span::new(5, 7),
                Span::new(7, 7),
            ]
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new("1 $ 2").collect();

        // INTEGER, error for '$', INTEGER, EOF
        assert_eq!(results.len(), 4, "Expected 4 items in result");

        assert!(results[0].is_ok());
        assert!(results[2].is_ok());
        assert_eq!(
            results[3].as_ref().map(|t| t.kind),
            Ok(TokenKind::EOF)
        );

        let err = results[1].as_ref().expect_err("'$' is not a token");

        assert!(
            err.to_string().contains("Unexpected character"),
            "Error message should contain 'Unexpected character', got: {}",
            err
        );
        assert_eq!(err.span(), Span::new(2, 3));
    }

    #[test]
    fn test_unterminated_string() {
        let results: Vec<_> = Scanner::new("\"abc").collect();

        assert_eq!(results.len(), 2);

        let err = results[0].as_ref().expect_err("string never closes");
        assert!(err.to_string().contains("Unterminated string"));
        assert_eq!(
            results[1].as_ref().map(|t| t.kind),
            Ok(TokenKind::EOF)
        );
    }

    #[test]
    fn test_unterminated_date() {
        let results: Vec<_> = Scanner::new("#1/2/2003").collect();

        assert!(results[0]
            .as_ref()
            .is_err_and(|e| e.to_string().contains("Unterminated date")));
    }

    #[test]
    fn test_scanner_is_fused() {
        let mut scanner = Scanner::new("x");

        assert!(scanner.next().is_some());
        assert!(scanner.next().is_some());
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
