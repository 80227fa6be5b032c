//! Parser: tokens → surface AST.
//!
//! Recursive descent for statements, precedence climbing for expressions.

use garnet_ir::{BinOp, UnOp};

use crate::ast::{BlockArg, Expr, IfArm, Stmt};
use crate::token::{Token, TokenKind};
use crate::ParseError;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        static EOF: TokenKind = TokenKind::Eof;
        self.tokens.get(self.pos).map(|t| &t.kind).unwrap_or(&EOF)
    }

    fn line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ParseError> {
        if self.peek() == &kind {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {what}, found {}", self.peek().describe())))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.advance() {
            TokenKind::Ident(name) => Ok(name),
            other => Err(self.err(format!("expected {what}, found {}", other.describe()))),
        }
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line(), message)
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), TokenKind::Newline | TokenKind::Semi) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline) {
            self.advance();
        }
    }

    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let stmts = self.parse_body_until(&[])?;
        self.skip_separators();
        if self.peek() != &TokenKind::Eof {
            return Err(self.err(format!("unexpected {}", self.peek().describe())));
        }
        Ok(stmts)
    }

    fn parse_body_until(&mut self, terminators: &[TokenKind]) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            if self.peek() == &TokenKind::Eof || terminators.contains(self.peek()) {
                return Ok(stmts);
            }
            stmts.push(self.parse_stmt()?);
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            TokenKind::If => {
                self.advance();
                self.parse_if()
            }
            TokenKind::Unless => {
                self.advance();
                self.parse_unless()
            }
            TokenKind::While => {
                self.advance();
                self.parse_while()
            }
            TokenKind::For => {
                self.advance();
                self.parse_for()
            }
            TokenKind::Def => {
                self.advance();
                self.parse_def()
            }
            TokenKind::Break => {
                self.advance();
                Ok(Stmt::Break)
            }
            TokenKind::Return => {
                self.advance();
                let value = if matches!(
                    self.peek(),
                    TokenKind::Newline
                        | TokenKind::Semi
                        | TokenKind::Eof
                        | TokenKind::End
                        | TokenKind::Else
                        | TokenKind::Elsif
                        | TokenKind::RBrace
                ) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Ok(Stmt::Return(value))
            }
            _ => self.parse_expr_stmt(),
        }
    }

    /// Expression statements, plain/compound assignment, multiple assignment.
    fn parse_expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let first = self.parse_expr()?;
        match self.peek() {
            TokenKind::Assign => {
                self.advance();
                self.require_assignable(&first)?;
                let value = self.parse_expr()?;
                Ok(Stmt::Assign {
                    target: first,
                    value,
                })
            }
            TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::StarAssign
            | TokenKind::SlashAssign => {
                let op = match self.advance() {
                    TokenKind::PlusAssign => BinOp::Add,
                    TokenKind::MinusAssign => BinOp::Sub,
                    TokenKind::StarAssign => BinOp::Mul,
                    _ => BinOp::Div,
                };
                self.require_assignable(&first)?;
                let rhs = self.parse_expr()?;
                let value = Expr::Binary {
                    op,
                    left: Box::new(first.clone()),
                    right: Box::new(rhs),
                };
                Ok(Stmt::Assign {
                    target: first,
                    value,
                })
            }
            TokenKind::Comma if is_plain_name(&first) => {
                let mut targets = vec![first];
                while self.eat(&TokenKind::Comma) {
                    let target = self.parse_expr()?;
                    if !is_plain_name(&target) {
                        return Err(self.err("multiple assignment targets must be plain names"));
                    }
                    targets.push(target);
                }
                self.expect(TokenKind::Assign, "'=' after assignment targets")?;
                let value = self.parse_expr()?;
                Ok(Stmt::MultiAssign { targets, value })
            }
            _ => Ok(Stmt::Expr(first)),
        }
    }

    fn require_assignable(&self, expr: &Expr) -> Result<(), ParseError> {
        if expr.is_assignable() {
            Ok(())
        } else {
            Err(self.err("left-hand side is not assignable"))
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let mut arms = Vec::new();
        let condition = self.parse_expr()?;
        self.eat(&TokenKind::Then);
        let body = self.parse_body_until(&[TokenKind::Elsif, TokenKind::Else, TokenKind::End])?;
        arms.push(IfArm { condition, body });
        while self.eat(&TokenKind::Elsif) {
            let condition = self.parse_expr()?;
            self.eat(&TokenKind::Then);
            let body =
                self.parse_body_until(&[TokenKind::Elsif, TokenKind::Else, TokenKind::End])?;
            arms.push(IfArm { condition, body });
        }
        let else_body = if self.eat(&TokenKind::Else) {
            Some(self.parse_body_until(&[TokenKind::End])?)
        } else {
            None
        };
        self.expect(TokenKind::End, "'end' to close 'if'")?;
        Ok(Stmt::If { arms, else_body })
    }

    fn parse_unless(&mut self) -> Result<Stmt, ParseError> {
        let condition = self.parse_expr()?;
        self.eat(&TokenKind::Then);
        let body = self.parse_body_until(&[TokenKind::Else, TokenKind::End])?;
        let else_body = if self.eat(&TokenKind::Else) {
            Some(self.parse_body_until(&[TokenKind::End])?)
        } else {
            None
        };
        self.expect(TokenKind::End, "'end' to close 'unless'")?;
        Ok(Stmt::Unless {
            condition,
            body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let condition = self.parse_expr()?;
        self.eat(&TokenKind::Do);
        let body = self.parse_body_until(&[TokenKind::End])?;
        self.expect(TokenKind::End, "'end' to close 'while'")?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let var = self.expect_ident("loop variable")?;
        self.expect(TokenKind::In, "'in'")?;
        let start = self.parse_expr()?;
        self.expect(TokenKind::DotDot, "'..' in range")?;
        let end = self.parse_expr()?;
        self.eat(&TokenKind::Do);
        let body = self.parse_body_until(&[TokenKind::End])?;
        self.expect(TokenKind::End, "'end' to close 'for'")?;
        Ok(Stmt::For {
            var,
            start,
            end,
            body,
        })
    }

    fn parse_def(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect_ident("function name")?;
        let mut params = Vec::new();
        if self.eat(&TokenKind::LParen) {
            while !self.eat(&TokenKind::RParen) {
                params.push(self.expect_ident("parameter name")?);
                if self.peek() != &TokenKind::RParen {
                    self.expect(TokenKind::Comma, "',' between parameters")?;
                }
            }
        }
        let body = self.parse_body_until(&[TokenKind::End])?;
        self.expect(TokenKind::End, "'end' to close 'def'")?;
        Ok(Stmt::Def { name, params, body })
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_or()?;
        if self.eat(&TokenKind::Question) {
            self.skip_newlines();
            let then_expr = self.parse_expr()?;
            self.expect(TokenKind::Colon, "':' in conditional expression")?;
            self.skip_newlines();
            let else_expr = self.parse_expr()?;
            Ok(Expr::Ternary {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            })
        } else {
            Ok(condition)
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            left = binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::LtEq => BinOp::Le,
                TokenKind::GtEq => BinOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnOp::Negate,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident("method or field name")?;
                    let args = if self.eat(&TokenKind::LParen) {
                        self.parse_args()?
                    } else {
                        Vec::new()
                    };
                    let block = self.parse_block_arg()?;
                    expr = Expr::Call {
                        receiver: Some(Box::new(expr)),
                        name,
                        args,
                        block,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    self.skip_newlines();
                    let index = self.parse_expr()?;
                    self.skip_newlines();
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            TokenKind::Int(v) => Ok(Expr::Int(v)),
            TokenKind::Float(v) => Ok(Expr::Float(v)),
            TokenKind::True => Ok(Expr::Bool(true)),
            TokenKind::False => Ok(Expr::Bool(false)),
            TokenKind::Ident(name) => {
                if self.eat(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::Call {
                        receiver: None,
                        name,
                        args,
                        block: None,
                    })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            TokenKind::UpperIdent(name) => Ok(Expr::UpperIdent(name)),
            TokenKind::GlobalVar(name) => Ok(Expr::GlobalVar(name)),
            TokenKind::LParen => {
                self.skip_newlines();
                let inner = self.parse_expr()?;
                self.skip_newlines();
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::LBracket => {
                self.skip_newlines();
                let mut elements = Vec::new();
                if !self.eat(&TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expr()?);
                        self.skip_newlines();
                        if self.eat(&TokenKind::Comma) {
                            self.skip_newlines();
                        } else {
                            break;
                        }
                    }
                    self.expect(TokenKind::RBracket, "']'")?;
                }
                Ok(Expr::Array(elements))
            }
            other => Err(self.err(format!("unexpected {}", other.describe()))),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.skip_newlines();
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            self.skip_newlines();
            if self.eat(&TokenKind::Comma) {
                self.skip_newlines();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    /// A trailing `do |p| … end` or `{ |p| … }` block, if present.
    fn parse_block_arg(&mut self) -> Result<Option<BlockArg>, ParseError> {
        let brace = match self.peek() {
            TokenKind::Do => false,
            TokenKind::LBrace => true,
            _ => return Ok(None),
        };
        self.advance();
        let mut params = Vec::new();
        if self.eat(&TokenKind::Pipe) {
            while !self.eat(&TokenKind::Pipe) {
                params.push(self.expect_ident("block parameter")?);
                if self.peek() != &TokenKind::Pipe {
                    self.expect(TokenKind::Comma, "',' between block parameters")?;
                }
            }
        }
        let (terminator, what) = if brace {
            (TokenKind::RBrace, "'}' to close block")
        } else {
            (TokenKind::End, "'end' to close block")
        };
        let body = self.parse_body_until(std::slice::from_ref(&terminator))?;
        self.expect(terminator, what)?;
        Ok(Some(BlockArg { params, body }))
    }
}

fn is_plain_name(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Ident(_) | Expr::UpperIdent(_) | Expr::GlobalVar(_)
    )
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
