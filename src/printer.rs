//! Parenthesized prefix rendering of the AST, used by `--ast` and in tests.

use crate::{
    ast::{Expr, Stmt},
    stack::ensure_sufficient_stack,
};

pub fn print_expr(expr: &Expr) -> String {
    ensure_sufficient_stack(|| print_expr_inner(expr))
}

fn print_expr_inner(expr: &Expr) -> String {
    match expr {
        Expr::Lit(lit) => lit.value.to_string(),
        Expr::Grouping(grouping) => parenthesize("group", [&*grouping.expr]),
        Expr::Unary(unary) => parenthesize(&unary.op.lexeme, [&*unary.expr]),
        Expr::Binary(binary) => {
            parenthesize(&binary.op.lexeme, [&*binary.left, &*binary.right])
        }
        Expr::Var(var_expr) => var_expr.ident.lexeme.clone(),
        Expr::Assign(assign) => {
            format!("(= {} {})", assign.ident.lexeme, print_expr(&assign.value))
        }
    }
}

pub fn print_stmt(stmt: &Stmt) -> String {
    ensure_sufficient_stack(|| print_stmt_inner(stmt))
}

fn print_stmt_inner(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expr(expr_stmt) => parenthesize(";", [&expr_stmt.expr]),
        Stmt::Print(print_stmt) => parenthesize("print", [&print_stmt.expr]),
        Stmt::VarDecl(var_decl) => match &var_decl.init {
            Some(init) => format!("(var {} {})", var_decl.ident.lexeme, print_expr(init)),
            None => format!("(var {})", var_decl.ident.lexeme),
        },
        Stmt::Block(block) => {
            let mut out = String::from("(block");
            for stmt in &block.stmts {
                out.push(' ');
                out.push_str(&print_stmt(stmt));
            }
            out.push(')');
            out
        }
    }
}

fn parenthesize<'e>(name: &str, exprs: impl IntoIterator<Item = &'e Expr>) -> String {
    let mut out = format!("({name}");
    for expr in exprs {
        out.push(' ');
        out.push_str(&print_expr(expr));
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast,
        token::{Token, TokenKind},
        value::Value,
    };
    use pretty_assertions::assert_eq;

    fn lit(value: impl Into<Value>) -> Box<Expr> {
        Box::new(ast::Lit { value: value.into() }.into())
    }

    #[test]
    fn nested_expression() {
        let expr: Expr = ast::BinaryExpr {
            op: Token::new(TokenKind::Star, "*", 1),
            left: Box::new(
                ast::UnaryExpr {
                    op: Token::new(TokenKind::Minus, "-", 1),
                    expr: lit(123.0),
                }
                .into(),
            ),
            right: Box::new(ast::Grouping { expr: lit(45.67) }.into()),
        }
        .into();

        assert_eq!(print_expr(&expr), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn literals_use_display_text() {
        assert_eq!(print_expr(&lit(Value::Nil)), "nil");
        assert_eq!(print_expr(&lit(true)), "true");
        assert_eq!(print_expr(&lit("text")), "text");
    }

    #[test]
    fn empty_block() {
        let stmt: Stmt = ast::Block { stmts: vec![] }.into();
        assert_eq!(print_stmt(&stmt), "(block)");
    }

    #[test]
    fn deep_grouping() {
        let depth = 10_000;
        let mut expr = *lit(1.0);
        for _ in 0..depth {
            expr = ast::Grouping {
                expr: Box::new(expr),
            }
            .into();
        }

        let printed = print_expr(&expr);
        assert!(printed.starts_with("(group (group "));
        assert_eq!(printed.len(), depth * "(group )".len() + 1);
    }
}
