mod interpreter_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use fave::error::FaveError;
    use fave::interpreter::Interpreter;
    use fave::parser::Parser;
    use fave::resolver::Resolver;
    use fave::scanner::Scanner;
    use fave::token::Token;

    /// Run `source` through the full pipeline with `print` captured,
    /// returning the output and the interpretation result.  Panics on lex,
    /// parse, or resolve errors — use [`resolve_errors`] for those.
    fn run(source: &str) -> (String, Result<(), FaveError>) {
        let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(sink.clone());

        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let mut parser = Parser::new(&tokens, 0);
        let (statements, parse_errors) = parser.parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

        let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);
        assert!(
            resolve_errors.is_empty(),
            "resolve errors: {:?}",
            resolve_errors
        );

        let result = interpreter.interpret(&statements);
        let output = String::from_utf8(sink.borrow().clone()).expect("print output is UTF-8");

        (output, result)
    }

    /// Like [`run`] but asserting success, returning only the output.
    fn run_ok(source: &str) -> String {
        let (output, result) = run(source);
        result.expect("program should run cleanly");

        output
    }

    /// Expect a runtime error; returns its rendered message.
    fn run_err(source: &str) -> String {
        let (_, result) = run(source);

        result.expect_err("program should fail at runtime").to_string()
    }

    /// Resolve `source` and return the static errors it produces.
    fn resolve_errors(source: &str) -> Vec<FaveError> {
        let mut interpreter = Interpreter::new();

        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let mut parser = Parser::new(&tokens, 0);
        let (statements, parse_errors) = parser.parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

        Resolver::new(&mut interpreter).resolve(&statements)
    }

    // ───────────────────────── scoping & closures ─────────────────────────

    #[test]
    fn test_shadowing_inside_block() {
        let out = run_ok("var a = 1; { var a = 2; print a; } print a;");

        assert_eq!(out, "2\n1\n");
    }

    #[test]
    fn test_counters_are_independent() {
        let out = run_ok(
            r#"
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    print i;
                }
                return count;
            }
            var c1 = makeCounter();
            var c2 = makeCounter();
            c1();
            c1();
            c2();
            "#,
        );

        assert_eq!(out, "1\n2\n1\n");
    }

    #[test]
    fn test_closures_capture_frames_by_reference() {
        let out = run_ok(
            r#"
            {
                var x = 1;
                fun get() { return x; }
                x = 2;
                print get();
            }
            "#,
        );

        assert_eq!(out, "2\n");
    }

    #[test]
    fn test_closure_sees_definition_scope_not_call_scope() {
        let out = run_ok(
            r#"
            var a = "global";
            {
                fun show() { print a; }
                show();
                var a = "block";
                show();
            }
            "#,
        );

        // `show` binds the global `a` at definition; the later block-local
        // must never leak into it.
        assert_eq!(out, "global\nglobal\n");
    }

    #[test]
    fn test_self_reference_in_initializer_is_illegal() {
        let errors = resolve_errors("var a = 1; { var a = a; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("Can't read local variable in its own initializer."));
    }

    #[test]
    fn test_duplicate_local_declaration() {
        let errors = resolve_errors("{ var a = 1; var a = 2; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("Already a variable with this name in this scope."));
    }

    // ───────────────────────── operators & coercions ──────────────────────

    #[test]
    fn test_arithmetic_and_grouping() {
        let out = run_ok("print (1 + 2) * 4 - 3; print 7 / 2;");

        assert_eq!(out, "9\n3.5\n");
    }

    #[test]
    fn test_string_number_concatenation() {
        let out = run_ok(r#"print "abc" + 3; print 3 + "abc"; print "n=" + 2.5;"#);

        assert_eq!(out, "abc3\n3abc\nn=2.5\n");
    }

    #[test]
    fn test_string_repetition() {
        let out = run_ok(r#"print "ab" * 3; print 2 * "xy"; print "ab" * 2.9; print "ab" * -1;"#);

        assert_eq!(out, "ababab\nxyxy\nabab\n\n");
    }

    #[test]
    fn test_division_by_zero_sentinel() {
        let out = run_ok("print 5 / 0; print 0 / 0;");

        assert_eq!(out, "42\n42\n");
    }

    #[test]
    fn test_equality_across_kinds() {
        let out = run_ok(
            r#"print nil == nil; print nil == false; print 1 == "1"; print "a" == "a";"#,
        );

        assert_eq!(out, "true\nfalse\nfalse\ntrue\n");
    }

    #[test]
    fn test_truthiness() {
        let out = run_ok(r#"print !nil; print !false; print !0; print !"";"#);

        assert_eq!(out, "true\ntrue\nfalse\nfalse\n");
    }

    #[test]
    fn test_logical_operators_short_circuit_to_operand() {
        let out = run_ok(r#"print "a" or "b"; print nil or "b"; print nil and "b"; print 1 and 2;"#);

        assert_eq!(out, "a\nb\nnil\n2\n");
    }

    #[test]
    fn test_comparison_requires_numbers() {
        let err = run_err(r#"print 1 < "2";"#);

        assert!(err.contains("Operands must be numbers."));
    }

    #[test]
    fn test_mixed_plus_is_rejected() {
        let err = run_err("print true + 1;");

        assert!(err.contains("Operands not supported."));
    }

    // ───────────────────────── control flow & functions ───────────────────

    #[test]
    fn test_for_loop_counts() {
        let out = run_ok("for (var i = 0; i < 3; i = i + 1) print i;");

        assert_eq!(out, "0\n1\n2\n");
    }

    #[test]
    fn test_return_unwinds_nested_blocks_and_loops() {
        let out = run_ok(
            r#"
            fun f() {
                while (true) {
                    { return 7; }
                }
            }
            print f();
            "#,
        );

        assert_eq!(out, "7\n");
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        let out = run_ok("fun f() {} print f();");

        assert_eq!(out, "nil\n");
    }

    #[test]
    fn test_recursion() {
        let out = run_ok(
            r#"
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
            "#,
        );

        assert_eq!(out, "55\n");
    }

    #[test]
    fn test_runaway_recursion_is_reported() {
        let err = run_err("fun f() { f(); } f();");

        assert!(err.contains("Stack overflow."));
    }

    #[test]
    fn test_arity_mismatch_names_counts() {
        let err = run_err("fun f(a, b) {} f(1);");

        assert!(err.contains("Expected 2 arguments but got 1."));
    }

    #[test]
    fn test_calling_a_non_callable() {
        let err = run_err("var x = 1; x();");

        assert!(err.contains("Can only call functions and classes."));
    }

    #[test]
    fn test_undefined_variable() {
        let err = run_err("print missing;");

        assert!(err.contains("Undefined variable 'missing'."));
    }

    #[test]
    fn test_return_outside_function_is_static_error() {
        let errors = resolve_errors("return 1;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("Can't return from top-level code."));
    }

    // ───────────────────────── classes & inheritance ──────────────────────

    #[test]
    fn test_fields_and_bound_methods() {
        let out = run_ok(
            r#"
            class Cake {
                taste() {
                    print "The " + this.flavor + " cake is delicious!";
                }
            }
            var cake = Cake();
            cake.flavor = "chocolate";
            cake.taste();
            var taste = cake.taste;
            taste();
            "#,
        );

        assert_eq!(
            out,
            "The chocolate cake is delicious!\nThe chocolate cake is delicious!\n"
        );
    }

    #[test]
    fn test_method_dispatch_walks_to_grandparent() {
        let out = run_ok(
            r#"
            class A { m() { return "A"; } }
            class B < A { }
            class C < B { }
            print C().m();
            "#,
        );

        assert_eq!(out, "A\n");
    }

    #[test]
    fn test_super_resolves_from_textual_class() {
        let out = run_ok(
            r#"
            class A { method() { print "A method"; } }
            class B < A {
                method() { print "B method"; }
                test() { super.method(); }
            }
            class C < B { }
            C().test();
            "#,
        );

        // `super` inside B::test starts at A, regardless of the receiver
        // being a C.
        assert_eq!(out, "A method\n");
    }

    #[test]
    fn test_init_arity_is_enforced() {
        let err = run_err("class P { init(a, b) {} } P(1);");

        assert!(err.contains("Expected 2 arguments but got 1."));
    }

    #[test]
    fn test_init_with_bare_return_yields_instance() {
        let out = run_ok(
            r#"
            class P {
                init() {
                    this.ready = true;
                    return;
                }
            }
            print P();
            "#,
        );

        assert_eq!(out, "P instance\n");
    }

    #[test]
    fn test_init_runs_on_instantiation() {
        let out = run_ok(
            r#"
            class Point {
                init(x, y) {
                    this.x = x;
                    this.y = y;
                }
            }
            var p = Point(3, 4);
            print p.x + p.y;
            "#,
        );

        assert_eq!(out, "7\n");
    }

    #[test]
    fn test_instances_compare_by_identity() {
        let out = run_ok(
            r#"
            class P {}
            var a = P();
            var b = P();
            var c = a;
            print a == b;
            print a == c;
            "#,
        );

        assert_eq!(out, "false\ntrue\n");
    }

    #[test]
    fn test_undefined_property() {
        let err = run_err("class P {} P().missing;");

        assert!(err.contains("Undefined property 'missing'."));
    }

    #[test]
    fn test_properties_require_an_instance() {
        let err = run_err("var x = 1; x.field;");

        assert!(err.contains("Only instances have properties."));
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        let err = run_err("var NotAClass = 1; class B < NotAClass {}");

        assert!(err.contains("Superclass must be a class."));
    }

    #[test]
    fn test_self_inheritance_is_static_error() {
        let errors = resolve_errors("class A < A {}");

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("A class can't inherit from itself."));
    }

    #[test]
    fn test_this_outside_class_is_static_error() {
        let errors = resolve_errors("print this;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("Can't use 'this' outside of a class."));
    }

    #[test]
    fn test_super_without_superclass_is_static_error() {
        let errors = resolve_errors("class A { m() { super.m(); } }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("Can't use 'super' in a class with no superclass."));
    }

    #[test]
    fn test_resolver_batches_multiple_errors() {
        let errors = resolve_errors("return 1; print this;");

        assert_eq!(errors.len(), 2);
    }

    // ───────────────────────── stringification ────────────────────────────

    #[test]
    fn test_print_formats() {
        let out = run_ok(
            r#"
            class P {}
            fun f() {}
            print nil;
            print 3;
            print 2.5;
            print true;
            print "text";
            print P;
            print P();
            print f;
            print clock == clock;
            "#,
        );

        assert_eq!(
            out,
            "nil\n3\n2.5\ntrue\ntext\nP\nP instance\n<fn f>\ntrue\n"
        );
    }

    #[test]
    fn test_clock_is_a_native_number() {
        let out = run_ok("print clock() > 0;");

        assert_eq!(out, "true\n");
    }
}
