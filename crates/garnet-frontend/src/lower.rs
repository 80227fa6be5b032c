//! Lowering pass: surface AST → IR.
//!
//! The visitor tracks two name sets while walking: the block/function
//! parameters (fixed for the duration of a lowering) and the locally
//! declared variables (grown as `VarDecl`s are produced). A write to a name
//! in either set lowers to an assignment; any other write introduces a
//! declaration. Entering a branch or loop body snapshots the declared set
//! and restores it on exit, so names introduced inside one branch do not
//! leak into a later one.

use std::collections::HashSet;

use garnet_ir::{builtins, Constant, Node, NodeKind, Type, UnOp};

use crate::ast::{BlockArg, Expr, IfArm, Stmt};

struct LowerCtx {
    params: HashSet<String>,
    declared: HashSet<String>,
    functions: HashSet<String>,
}

/// Lowers a parsed program into a `Block` node.
///
/// `params` are the pre-declared parameter names (positional inline-block
/// parameters plus the well-known shader inputs); `known` holds names that
/// already exist outside the program, such as uniforms.
pub fn lower_program(stmts: &[Stmt], params: &[String], known: &[String]) -> Node {
    let mut ctx = LowerCtx {
        params: params.iter().cloned().collect(),
        declared: known.iter().cloned().collect(),
        functions: HashSet::new(),
    };
    let block = ctx.lower_block(stmts);
    log::debug!("lowered {} top-level statements", stmts.len());
    block
}

impl LowerCtx {
    fn lower_block(&mut self, stmts: &[Stmt]) -> Node {
        Node::new(NodeKind::Block(
            stmts.iter().map(|s| self.lower_stmt(s)).collect(),
        ))
    }

    /// Lowers a nested body with its own declaration scope.
    fn scoped_block(&mut self, stmts: &[Stmt]) -> Node {
        let saved = self.declared.clone();
        let block = self.lower_block(stmts);
        self.declared = saved;
        block
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Node {
        match stmt {
            Stmt::Expr(expr) => self.lower_expr(expr),
            Stmt::Assign { target, value } => self.lower_assign(target, value),
            Stmt::MultiAssign { targets, value } => {
                let value = self.lower_expr(value);
                let targets = targets
                    .iter()
                    .map(|t| {
                        let name = assign_target_name(t);
                        self.declared.insert(name.clone());
                        Node::new(NodeKind::VarRef(name))
                    })
                    .collect();
                Node::new(NodeKind::MultipleAssignment {
                    targets,
                    value: Box::new(value),
                })
            }
            Stmt::If { arms, else_body } => self.lower_if(arms, else_body.as_deref()),
            Stmt::Unless {
                condition,
                body,
                else_body,
            } => {
                let condition = Node::new(NodeKind::UnaryOp {
                    op: UnOp::Not,
                    operand: Box::new(self.lower_expr(condition)),
                });
                let then_branch = self.scoped_block(body);
                let else_branch = else_body
                    .as_deref()
                    .map(|b| Box::new(self.scoped_block(b)));
                Node::new(NodeKind::If {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch,
                })
            }
            Stmt::While { condition, body } => {
                let condition = self.lower_expr(condition);
                let body = self.scoped_block(body);
                Node::new(NodeKind::WhileLoop {
                    condition: Box::new(condition),
                    body: Box::new(body),
                })
            }
            Stmt::For {
                var,
                start,
                end,
                body,
            } => {
                let start = self.lower_int_context(start);
                let end = self.lower_int_context(end);
                let body = self.lower_loop_body(var, body);
                Node::new(NodeKind::ForLoop {
                    var: var.clone(),
                    start: Box::new(start),
                    end: Box::new(end),
                    body: Box::new(body),
                })
            }
            Stmt::Break => Node::new(NodeKind::Break),
            Stmt::Return(value) => {
                let value = value.as_ref().map(|e| Box::new(self.lower_expr(e)));
                Node::new(NodeKind::Return(value))
            }
            Stmt::Def { name, params, body } => {
                self.functions.insert(name.clone());
                let saved_params = std::mem::replace(
                    &mut self.params,
                    params.iter().cloned().collect(),
                );
                let saved_declared = std::mem::take(&mut self.declared);
                let body = self.lower_block(body);
                self.params = saved_params;
                self.declared = saved_declared;
                Node::new(NodeKind::FunctionDefinition {
                    name: name.clone(),
                    params: params.clone(),
                    body: Box::new(body),
                    return_type: None,
                    param_types: Default::default(),
                })
            }
        }
    }

    fn lower_assign(&mut self, target: &Expr, value: &Expr) -> Node {
        let value = self.lower_expr(value);
        match target {
            Expr::Ident(name) => {
                if self.params.contains(name) || self.declared.contains(name) {
                    Node::new(NodeKind::Assignment {
                        target: Box::new(Node::new(NodeKind::VarRef(name.clone()))),
                        value: Box::new(value),
                    })
                } else {
                    self.declared.insert(name.clone());
                    Node::new(NodeKind::VarDecl {
                        name: name.clone(),
                        init: Box::new(value),
                    })
                }
            }
            Expr::UpperIdent(name) => self.lower_global_write(name, value, true),
            Expr::GlobalVar(name) => self.lower_global_write(name, value, false),
            Expr::Index { base, index } => {
                let array = self.lower_expr(base);
                let index = self.lower_int_context(index);
                Node::new(NodeKind::Assignment {
                    target: Box::new(Node::new(NodeKind::ArrayIndex {
                        array: Box::new(array),
                        index: Box::new(index),
                    })),
                    value: Box::new(value),
                })
            }
            // The parser only lets assignable shapes through.
            other => unreachable!("non-assignable target {other:?}"),
        }
    }

    fn lower_global_write(&mut self, name: &str, value: Node, is_const: bool) -> Node {
        if self.declared.contains(name) {
            return Node::new(NodeKind::Assignment {
                target: Box::new(Node::new(NodeKind::VarRef(name.to_string()))),
                value: Box::new(value),
            });
        }
        self.declared.insert(name.to_string());
        Node::new(NodeKind::GlobalDecl {
            name: name.to_string(),
            init: Box::new(value),
            is_const,
            is_static: true,
            array_size: None,
            element_type: None,
        })
    }

    fn lower_if(&mut self, arms: &[IfArm], else_body: Option<&[Stmt]>) -> Node {
        // Right-linear nesting: the else slot of each arm holds the rest of
        // the chain, which the emitters flatten back into `else if` text.
        let mut else_branch = else_body.map(|b| Box::new(self.scoped_block(b)));
        for arm in arms.iter().rev() {
            let condition = self.lower_expr(&arm.condition);
            let then_branch = self.scoped_block(&arm.body);
            else_branch = Some(Box::new(Node::new(NodeKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            })));
        }
        *else_branch.expect("if statement has at least one arm")
    }

    fn lower_loop_body(&mut self, var: &str, body: &[Stmt]) -> Node {
        let saved = self.declared.clone();
        self.declared.insert(var.to_string());
        let block = self.lower_block(body);
        self.declared = saved;
        block
    }

    fn lower_expr(&mut self, expr: &Expr) -> Node {
        match expr {
            // Integer literals in expression position are promoted to float;
            // array indices and loop bounds go through `lower_int_context`.
            Expr::Int(v) => Node::typed(NodeKind::Literal(*v as f64), Type::Float),
            Expr::Float(v) => Node::typed(NodeKind::Literal(*v), Type::Float),
            Expr::Bool(v) => Node::new(NodeKind::BoolLiteral(*v)),
            Expr::Ident(name) => Node::new(NodeKind::VarRef(name.clone())),
            Expr::UpperIdent(name) => match Constant::from_name(name) {
                Some(constant) => Node::new(NodeKind::Constant(constant)),
                None => Node::new(NodeKind::VarRef(name.clone())),
            },
            Expr::GlobalVar(name) => Node::new(NodeKind::VarRef(name.clone())),
            Expr::Binary { op, left, right } => Node::new(NodeKind::BinaryOp {
                op: *op,
                left: Box::new(self.lower_expr(left)),
                right: Box::new(self.lower_expr(right)),
            }),
            Expr::Unary { op, operand } => Node::new(NodeKind::UnaryOp {
                op: *op,
                operand: Box::new(self.lower_expr(operand)),
            }),
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => Node::new(NodeKind::If {
                condition: Box::new(self.lower_expr(condition)),
                then_branch: Box::new(self.lower_expr(then_expr)),
                else_branch: Some(Box::new(self.lower_expr(else_expr))),
            }),
            Expr::Paren(inner) => {
                Node::new(NodeKind::Parenthesized(Box::new(self.lower_expr(inner))))
            }
            Expr::Array(elements) => Node::new(NodeKind::ArrayLiteral(
                elements.iter().map(|e| self.lower_expr(e)).collect(),
            )),
            Expr::Index { base, index } => Node::new(NodeKind::ArrayIndex {
                array: Box::new(self.lower_expr(base)),
                index: Box::new(self.lower_int_context(index)),
            }),
            Expr::Call {
                receiver,
                name,
                args,
                block,
            } => self.lower_call(receiver.as_deref(), name, args, block.as_ref()),
        }
    }

    /// Integer literals keep their `int` type here (array indices, range
    /// bounds, `times` receivers); everything else lowers normally.
    fn lower_int_context(&mut self, expr: &Expr) -> Node {
        match expr {
            Expr::Int(v) => Node::typed(NodeKind::Literal(*v as f64), Type::Int),
            other => self.lower_expr(other),
        }
    }

    /// A surface method call is one of several constructs. Resolution order:
    /// `times` loop, single-component field, swizzle, known function,
    /// uniform-object field, generic call.
    fn lower_call(
        &mut self,
        receiver: Option<&Expr>,
        name: &str,
        args: &[Expr],
        block: Option<&BlockArg>,
    ) -> Node {
        if name == "times" {
            if let (Some(recv), Some(block)) = (receiver, block) {
                let var = block
                    .params
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "i".to_string());
                let end = self.lower_int_context(recv);
                let body = self.lower_loop_body(&var, &block.body);
                return Node::new(NodeKind::ForLoop {
                    var,
                    start: Box::new(Node::typed(NodeKind::Literal(0.0), Type::Int)),
                    end: Box::new(end),
                    body: Box::new(body),
                });
            }
        }
        if let Some(recv) = receiver {
            if args.is_empty() && block.is_none() {
                if builtins::is_component(name) {
                    return Node::new(NodeKind::FieldAccess {
                        receiver: Box::new(self.lower_expr(recv)),
                        field: name.to_string(),
                    });
                }
                if builtins::is_swizzle(name) {
                    return Node::new(NodeKind::Swizzle {
                        receiver: Box::new(self.lower_expr(recv)),
                        components: name.to_string(),
                    });
                }
                if builtins::lookup(name).is_none() && !self.functions.contains(name) {
                    return Node::new(NodeKind::FieldAccess {
                        receiver: Box::new(self.lower_expr(recv)),
                        field: name.to_string(),
                    });
                }
            }
        }
        Node::new(NodeKind::FuncCall {
            name: name.to_string(),
            receiver: receiver.map(|r| Box::new(self.lower_expr(r))),
            args: args.iter().map(|a| self.lower_expr(a)).collect(),
        })
    }
}

fn assign_target_name(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) | Expr::UpperIdent(name) | Expr::GlobalVar(name) => name.clone(),
        other => unreachable!("non-name assignment target {other:?}"),
    }
}
