mod parser_tests {
    use fave::ast::{Expr, Stmt};
    use fave::error::FaveError;
    use fave::parser::Parser;
    use fave::scanner::Scanner;
    use fave::token::Token;

    fn parse(source: &str) -> (Vec<Stmt>, Vec<FaveError>) {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        Parser::new(&tokens, 0).parse()
    }

    #[test]
    fn test_parser_01_error_batching() {
        // Two independent malformed statements must both be reported in one
        // pass thanks to panic-mode recovery at the ';' boundary.
        let (_, errors) = parse("var = 1; var = 2;");

        assert_eq!(errors.len(), 2);

        for e in &errors {
            assert!(e.to_string().contains("Expected variable name"));
        }
    }

    #[test]
    fn test_parser_02_recovers_and_keeps_good_statements() {
        let (statements, errors) = parse("print 1; @#; print 2;");

        assert_eq!(statements.len(), 2);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_parser_03_invalid_assignment_target() {
        let (_, errors) = parse("1 + 2 = 3;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Invalid assignment target"));
    }

    #[test]
    fn test_parser_04_for_desugars_to_while() {
        let (statements, errors) = parse("for (var i = 0; i < 3; i = i + 1) print i;");

        assert!(errors.is_empty());
        assert_eq!(statements.len(), 1);

        // { var i; while (cond) { print i; i = i + 1; } }
        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected desugared block, got {:?}", statements[0]);
        };

        assert!(matches!(outer[0], Stmt::Var { .. }));

        let Stmt::While { body, .. } = &outer[1] else {
            panic!("expected while loop, got {:?}", outer[1]);
        };

        let Stmt::Block(inner) = body.as_ref() else {
            panic!("expected body block, got {:?}", body);
        };

        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn test_parser_05_for_without_clauses() {
        // `for (;;) ...` keeps the body under a bare `while (true)`.
        let (statements, errors) = parse("for (;;) print 1;");

        assert!(errors.is_empty());
        assert!(matches!(statements[0], Stmt::While { .. }));
    }

    #[test]
    fn test_parser_06_class_with_superclass_and_methods() {
        let (statements, errors) = parse("class B < A { init(x) {} m() {} }");

        assert!(errors.is_empty());

        let Stmt::Class(decl) = &statements[0] else {
            panic!("expected class declaration, got {:?}", statements[0]);
        };

        assert_eq!(decl.name.lexeme, "B");
        assert!(matches!(decl.superclass, Some(Expr::Variable { .. })));
        assert_eq!(decl.methods.len(), 2);
        assert_eq!(decl.methods[0].name.lexeme, "init");
        assert_eq!(decl.methods[0].params.len(), 1);
    }

    #[test]
    fn test_parser_07_reserved_keywords_are_inert() {
        // `min` and `max` scan as keywords but have no grammar rule.
        let (_, errors) = parse("print min;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Expected expression"));
        assert!(errors[0].to_string().contains("at 'min'"));
    }

    #[test]
    fn test_parser_08_error_at_end_location() {
        let (_, errors) = parse("print 1");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("at end"));
    }

    #[test]
    fn test_parser_09_resolvable_nodes_get_distinct_ids() {
        let (statements, errors) = parse("a = b;");

        assert!(errors.is_empty());

        let Stmt::Expression(Expr::Assign { id, value, .. }) = &statements[0] else {
            panic!("expected assignment, got {:?}", statements[0]);
        };

        let Expr::Variable { id: value_id, .. } = value.as_ref() else {
            panic!("expected variable rhs, got {:?}", value);
        };

        assert_ne!(id, value_id);
    }
}
