use tracing::{debug, trace};

use crate::{
    ast,
    common::RuntimeError,
    environment::Environment,
    output::Output,
    stack::ensure_sufficient_stack,
    token::{Token, TokenKind},
    value::Value,
};

/// Executes statements against a persistent global scope.
///
/// One interpreter is meant to be driven from a single thread; REPL sessions
/// reuse it so bindings survive between inputs.
#[derive(Debug, Default)]
pub struct Interpreter {
    namespace: Environment,
    output: Output,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(output: Output) -> Self {
        Interpreter {
            namespace: Environment::new(),
            output,
        }
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Runs `stmts` in order, stopping at the first runtime error.
    pub fn interpret(&mut self, stmts: &[ast::Stmt]) -> Result<(), RuntimeError> {
        debug!(statements = stmts.len(), "interpreting");

        for stmt in stmts {
            self.interpret_stmt(stmt)?;
        }

        Ok(())
    }

    fn interpret_stmt(&mut self, stmt: &ast::Stmt) -> Result<(), RuntimeError> {
        ensure_sufficient_stack(|| self.interpret_stmt_inner(stmt))
    }

    fn interpret_stmt_inner(&mut self, stmt: &ast::Stmt) -> Result<(), RuntimeError> {
        trace!(depth = self.namespace.depth(), "executing statement");

        match stmt {
            ast::Stmt::Expr(expr_stmt) => {
                self.interpret_expr(&expr_stmt.expr)?;
            }
            ast::Stmt::Print(print_stmt) => {
                let value = self.interpret_expr(&print_stmt.expr)?;
                self.output.println(&value.to_string()).map_err(|error| {
                    print_stmt
                        .keyword
                        .runtime_error(format!("Failed to write output: {error}."))
                })?;
            }
            ast::Stmt::VarDecl(var_decl) => {
                let init_value = match &var_decl.init {
                    Some(init) => self.interpret_expr(init)?,
                    None => Value::Nil,
                };
                self.namespace.define(&var_decl.ident.lexeme, init_value);
            }
            ast::Stmt::Block(block) => self.interpret_block(block)?,
        }

        Ok(())
    }

    fn interpret_block(&mut self, block: &ast::Block) -> Result<(), RuntimeError> {
        self.namespace.nest();

        let result = block
            .stmts
            .iter()
            .try_for_each(|stmt| self.interpret_stmt(stmt));

        // the scope goes away on the error path too
        self.namespace.unnest();
        result
    }

    fn interpret_expr(&mut self, expr: &ast::Expr) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| self.interpret_expr_inner(expr))
    }

    fn interpret_expr_inner(&mut self, expr: &ast::Expr) -> Result<Value, RuntimeError> {
        match expr {
            ast::Expr::Lit(lit) => Ok(lit.value.clone()),
            ast::Expr::Grouping(grouping) => self.interpret_expr(&grouping.expr),
            ast::Expr::Var(var_expr) => self.namespace.get(&var_expr.ident),
            ast::Expr::Assign(assign) => {
                let value = self.interpret_expr(&assign.value)?;
                self.namespace.assign(&assign.ident, value.clone())?;
                Ok(value)
            }
            ast::Expr::Unary(unary) => {
                let operand = self.interpret_expr(&unary.expr)?;
                interpret_unary(&unary.op, operand)
            }
            ast::Expr::Binary(binary) => {
                let left = self.interpret_expr(&binary.left)?;
                let right = self.interpret_expr(&binary.right)?;
                interpret_binary(&binary.op, left, right)
            }
        }
    }
}

fn interpret_unary(op: &Token, operand: Value) -> Result<Value, RuntimeError> {
    match op.kind {
        TokenKind::Bang => Ok(Value::Bool(!operand.is_truthy())),
        TokenKind::Minus => match operand {
            Value::Number(number) => Ok(Value::Number(-number)),
            _ => Err(op.runtime_error("Operand must be a number.")),
        },
        _ => Err(op.runtime_error(format!("Unknown unary operator '{}'.", op.lexeme))),
    }
}

fn interpret_binary(op: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op.kind {
        TokenKind::EqualEqual => return Ok(Value::Bool(left == right)),
        TokenKind::BangEqual => return Ok(Value::Bool(left != right)),
        TokenKind::Plus => {
            return match (left, right) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
                _ => Err(op.runtime_error("Operands must be two numbers or two strings.")),
            };
        }
        _ => {}
    }

    let (l, r) = match (left, right) {
        (Value::Number(l), Value::Number(r)) => (l, r),
        _ => return Err(op.runtime_error("Operands must be a numbers.")),
    };

    match op.kind {
        TokenKind::Minus => Ok(Value::Number(l - r)),
        TokenKind::Star => Ok(Value::Number(l * r)),
        TokenKind::Slash => Ok(Value::Number(l / r)),
        TokenKind::Greater => Ok(Value::Bool(l > r)),
        TokenKind::GreaterEqual => Ok(Value::Bool(l >= r)),
        TokenKind::Less => Ok(Value::Bool(l < r)),
        TokenKind::LessEqual => Ok(Value::Bool(l <= r)),
        _ => Err(op.runtime_error(format!("Unknown binary operator '{}'.", op.lexeme))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::scan, parser::parse};
    use pretty_assertions::assert_eq;

    fn run(interpreter: &mut Interpreter, source: &str) -> Result<(), RuntimeError> {
        let (tokens, scan_errors) = scan(source);
        assert!(scan_errors.is_empty(), "unexpected scan errors: {scan_errors:?}");
        let (stmts, parse_errors) = parse(&tokens);
        assert!(parse_errors.is_empty(), "unexpected parse errors: {parse_errors:?}");
        interpreter.interpret(&stmts)
    }

    fn output_of(source: &str) -> Vec<String> {
        let mut interpreter = Interpreter::with_output(Output::buffer());
        if let Err(error) = run(&mut interpreter, source) {
            panic!("unexpected runtime error: {error}");
        }
        interpreter.output().lines().to_vec()
    }

    fn error_of(source: &str) -> RuntimeError {
        let mut interpreter = Interpreter::with_output(Output::buffer());
        match run(&mut interpreter, source) {
            Ok(()) => panic!("expected a runtime error from {source:?}"),
            Err(error) => error,
        }
    }

    #[test]
    fn arithmetic_and_concatenation() {
        assert_eq!(
            output_of("print 1 + 2; print (1 + 2) * 3; print 7 / 2; print \"a\" + \"b\";"),
            vec!["3", "9", "3.5", "ab"]
        );
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        assert_eq!(
            output_of("print 1 / 0; print -1 / 0; print 0 / 0;"),
            vec!["inf", "-inf", "nan"]
        );
    }

    #[test]
    fn comparison_and_equality() {
        assert_eq!(
            output_of("print 1 < 2; print 2 <= 1; print 1 == 1; print nil == false; print \"a\" != \"a\"; print 1 == \"1\";"),
            vec!["true", "false", "true", "false", "false", "false"]
        );
    }

    #[test]
    fn truthiness() {
        assert_eq!(
            output_of("print !nil; print !false; print !0; print !\"\"; print !!true;"),
            vec!["true", "true", "false", "false", "true"]
        );
    }

    #[test]
    fn chained_assignment_yields_the_value() {
        assert_eq!(
            output_of("var a; var b; print a = b = 3; print a; print b;"),
            vec!["3", "3", "3"]
        );
    }

    #[test]
    fn uninitialized_var_is_nil() {
        assert_eq!(output_of("var a; print a;"), vec!["nil"]);
    }

    #[test]
    fn block_shadowing_does_not_leak() {
        assert_eq!(
            output_of("var a = 1; { var a = 2; print a; } print a;"),
            vec!["2", "1"]
        );
        assert_eq!(
            output_of("var a = 1; { a = 2; var b = a; } print a;"),
            vec!["2"]
        );
    }

    #[test]
    fn operand_type_errors() {
        let error = error_of("print 1 + \"b\";");
        assert_eq!(error.message, "Operands must be two numbers or two strings.");
        assert_eq!(error.token.kind, TokenKind::Plus);

        assert_eq!(error_of("-\"a\";").message, "Operand must be a number.");
        assert_eq!(error_of("1 < nil;").message, "Operands must be a numbers.");
        assert_eq!(error_of("\"a\" * 2;").message, "Operands must be a numbers.");
    }

    #[test]
    fn deeply_nested_expressions_evaluate() {
        let terms = 100_000;
        let sum = format!("print {};", vec!["1"; terms].join(" + "));
        assert_eq!(output_of(&sum), vec![terms.to_string()]);

        let depth = 50_000;
        let grouped = format!("print {}1{};", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(output_of(&grouped), vec!["1"]);

        let negated = format!("print {}1;", "-".repeat(200_000));
        assert_eq!(output_of(&negated), vec!["1"]);

        let blocks = format!("var a = 0; {}a = a + 1;{} print a;", "{".repeat(depth), "}".repeat(depth));
        assert_eq!(output_of(&blocks), vec!["1"]);
    }

    #[test]
    fn undefined_variable_stops_the_run() {
        let mut interpreter = Interpreter::with_output(Output::buffer());
        let error = run(&mut interpreter, "print x; print 1;").unwrap_err();
        assert_eq!(error.to_string(), "[line 1] Error: Undefined variable 'x'.");
        assert_eq!(error.token.lexeme, "x");
        assert!(interpreter.output().lines().is_empty());
    }

    #[test]
    fn assignment_does_not_create_globals() {
        let mut interpreter = Interpreter::with_output(Output::buffer());
        let error = run(&mut interpreter, "{ y = 1; }").unwrap_err();
        assert_eq!(error.message, "Undefined variable 'y'.");
        assert!(run(&mut interpreter, "print y;").is_err());
    }

    #[test]
    fn error_inside_block_restores_the_outer_scope() {
        let mut interpreter = Interpreter::with_output(Output::buffer());
        run(&mut interpreter, "var a = \"outer\";").unwrap();
        assert!(run(&mut interpreter, "{ var a = \"inner\"; -a; }").is_err());
        run(&mut interpreter, "print a;").unwrap();
        assert_eq!(interpreter.output().lines(), ["outer"]);
    }
}
