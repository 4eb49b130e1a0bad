use std::mem;

use derive_more::From;

use crate::{token::Token, value::Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Lit {
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: Token,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: Token,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarExpr {
    pub ident: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub ident: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, From)]
pub enum Expr {
    Lit(Lit),
    Grouping(Grouping),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Var(VarExpr),
    Assign(AssignExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub keyword: Token,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ident: Token,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, From)]
pub enum Stmt {
    Expr(ExprStmt),
    Print(PrintStmt),
    VarDecl(VarDecl),
    Block(Block),
}

// Trees can be as deep as the source is nested, so both enums tear down
// their children from an explicit worklist instead of recursive drop glue.

impl Expr {
    fn nil() -> Self {
        Lit { value: Value::Nil }.into()
    }

    fn take_children(&mut self, pending: &mut Vec<Expr>) {
        match self {
            Expr::Lit(_) | Expr::Var(_) => {}
            Expr::Grouping(Grouping { expr }) | Expr::Unary(UnaryExpr { expr, .. }) => {
                pending.push(mem::replace(&mut **expr, Expr::nil()));
            }
            Expr::Binary(binary) => {
                pending.push(mem::replace(&mut *binary.left, Expr::nil()));
                pending.push(mem::replace(&mut *binary.right, Expr::nil()));
            }
            Expr::Assign(assign) => pending.push(mem::replace(&mut *assign.value, Expr::nil())),
        }
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}

impl Drop for Stmt {
    fn drop(&mut self) {
        let Stmt::Block(block) = self else {
            return;
        };

        let mut pending = mem::take(&mut block.stmts);
        while let Some(mut stmt) = pending.pop() {
            if let Stmt::Block(inner) = &mut stmt {
                pending.append(&mut inner.stmts);
            }
        }
    }
}
