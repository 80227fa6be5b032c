//! The surface syntax tree.
//!
//! Deliberately close to the source shapes: method calls stay generic here
//! and are disambiguated into field access, swizzles, loops, or plain calls
//! during lowering.

use garnet_ir::{BinOp, UnOp};

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign { target: Expr, value: Expr },
    MultiAssign { targets: Vec<Expr>, value: Expr },
    If {
        arms: Vec<IfArm>,
        else_body: Option<Vec<Stmt>>,
    },
    Unless {
        condition: Expr,
        body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While { condition: Expr, body: Vec<Stmt> },
    For {
        var: String,
        start: Expr,
        end: Expr,
        body: Vec<Stmt>,
    },
    Break,
    Return(Option<Expr>),
    Def {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
}

/// One `if`/`elsif` condition with its body.
#[derive(Clone, Debug, PartialEq)]
pub struct IfArm {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Bool(bool),
    Ident(String),
    UpperIdent(String),
    GlobalVar(String),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary { op: UnOp, operand: Box<Expr> },
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Paren(Box<Expr>),
    Array(Vec<Expr>),
    Index { base: Box<Expr>, index: Box<Expr> },
    /// `name(args)`, `recv.name(args)`, `recv.name`, or `recv.name { |p| … }`.
    Call {
        receiver: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
        block: Option<BlockArg>,
    },
}

impl Expr {
    /// Whether this expression may appear on the left of an assignment.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Self::Ident(_) | Self::UpperIdent(_) | Self::GlobalVar(_) | Self::Index { .. }
        )
    }
}

/// A `do … end` or `{ … }` block attached to a call.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockArg {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}
