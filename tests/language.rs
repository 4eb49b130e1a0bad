use lox_lang::{run, Interpreter, LoxError, Output};
use pretty_assertions::assert_eq;

fn output_of(src: &str) -> Vec<String> {
    let mut interpreter = Interpreter::with_output(Output::buffer());
    if let Err(e) = run(src, &mut interpreter) {
        panic!("Script failed: {e}");
    }
    interpreter.output().lines().to_vec()
}

fn failure_of(src: &str) -> (LoxError, Vec<String>) {
    let mut interpreter = Interpreter::with_output(Output::buffer());
    match run(src, &mut interpreter) {
        Ok(()) => panic!("Script succeeded but was expected to fail"),
        Err(e) => (e, interpreter.output().lines().to_vec()),
    }
}

#[test]
fn integral_sums_print_without_decimal_point() {
    assert_eq!(output_of("print 1 + 2;"), vec!["3"]);
    assert_eq!(output_of("print 0.1 + 0.2;"), vec!["0.30000000000000004"]);
}

#[test]
fn strings_concatenate_but_never_coerce() {
    assert_eq!(output_of("print \"a\" + \"b\";"), vec!["ab"]);

    let (error, printed) = failure_of("print 1 + \"b\";");
    assert_eq!(
        error.to_string(),
        "[line 1] Error: Operands must be two numbers or two strings."
    );
    assert!(printed.is_empty());
}

#[test]
fn block_scopes_shadow_without_mutating() {
    assert_eq!(
        output_of("var a = 1; { var a = 2; print a; } print a;"),
        vec!["2", "1"]
    );
}

#[test]
fn nested_blocks_resolve_outward() {
    let src = r#"
        var a = "global a";
        var b = "global b";
        var c = "global c";
        {
          var a = "outer a";
          var b = "outer b";
          {
            var a = "inner a";
            print a;
            print b;
            print c;
          }
          print a;
          print b;
          print c;
        }
        print a;
        print b;
        print c;
    "#;
    assert_eq!(
        output_of(src),
        vec![
            "inner a", "outer b", "global c", "outer a", "outer b", "global c", "global a",
            "global b", "global c",
        ]
    );
}

#[test]
fn undefined_variable_prints_nothing() {
    let (error, printed) = failure_of("print x;");
    let LoxError::Runtime(runtime) = &error else {
        panic!("expected a runtime error, got {error:?}");
    };
    assert_eq!(runtime.token.lexeme, "x");
    assert_eq!(runtime.message, "Undefined variable 'x'.");
    assert!(printed.is_empty());
}

#[test]
fn output_before_a_runtime_error_is_kept() {
    let (error, printed) = failure_of("print \"before\";\nprint -nil;\nprint \"after\";");
    assert_eq!(error.to_string(), "[line 2] Error: Operand must be a number.");
    assert_eq!(printed, vec!["before"]);
}

#[test]
fn every_broken_statement_is_reported() {
    let (error, printed) = failure_of("print 1;\nvar 1 = 2;\nprint (;\nprint 2;");
    assert_eq!(
        error.to_string(),
        "[line 2] Error at '1': Expect variable name.\n[line 3] Error at ';': Expect expression."
    );
    assert!(printed.is_empty(), "statements must not run after a parse error");
}

#[test]
fn scan_errors_stop_before_parsing() {
    let (error, _) = failure_of("print 1; $ print (;");
    assert_eq!(
        error,
        LoxError::Scan(vec![lox_lang::ScanError {
            line: 1,
            message: "Unexpected character.".into(),
        }])
    );
}

#[test]
fn bindings_persist_between_runs() {
    let mut interpreter = Interpreter::with_output(Output::buffer());
    run("var count = 1;", &mut interpreter).unwrap();
    assert!(run("print nope;", &mut interpreter).is_err());
    run("count = count + 1; print count;", &mut interpreter).unwrap();
    assert_eq!(interpreter.output().lines(), ["2"]);
}

#[test]
fn comments_and_multiline_programs() {
    let src = "// setup\nvar greeting = \"hello\"; // trailing\nprint greeting + \" world\";\n";
    assert_eq!(output_of(src), vec!["hello world"]);
}

#[test]
fn deeply_nested_programs_run() {
    let depth = 3_000;
    let grouped = format!("print {}1 + 2{};", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(output_of(&grouped), vec!["3"]);

    let chain = format!("print {};", vec!["1"; 60_000].join(" + "));
    assert_eq!(output_of(&chain), vec!["60000"]);

    let negated = format!("print {}2;", "-".repeat(200_001));
    assert_eq!(output_of(&negated), vec!["-2"]);

    let blocks = format!("var a = 1; {}var a = 2;{} print a;", "{".repeat(depth), "}".repeat(depth));
    assert_eq!(output_of(&blocks), vec!["1"]);
}

#[test]
fn numbers_print_like_python_floats() {
    assert_eq!(
        output_of("print 0 / 0; print 1000000 * 1000000 * 1000000000; print 10000000000000000; print 0.00001;"),
        vec!["nan", "1e+21", "1e+16", "1e-05"]
    );
}
