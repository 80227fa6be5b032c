//! The shared emitter.
//!
//! Owns everything the four targets have in common: indentation, block
//! layout, precedence-aware binary rendering, elsif-chain flattening,
//! return lifting, tuple-return lowering, and multiple-assignment
//! expansion. Each target supplies a [`Dialect`] that overrides exactly
//! what differs: type names, constructor spellings, declaration and loop
//! syntax, call rewriting, and the conditional-expression form.

use garnet_ir::{BinOp, Node, NodeKind, Type};

use crate::EmitError;

/// Struct name used when a top-level tail array literal is lifted into a
/// multi-value return.
const TOP_LEVEL_RESULT: &str = "shader_result";

/// Formats a float so the decimal point always survives.
pub fn format_float(value: f64) -> String {
    if value == value.trunc() && value.is_finite() && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Binary-operator precedence, from `||` (lowest) to `* / %` (highest).
pub fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        BinOp::Eq | BinOp::Ne => 3,
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 4,
        BinOp::Add | BinOp::Sub => 5,
        BinOp::Mul | BinOp::Div | BinOp::Mod => 6,
    }
}

/// Syntactic differences between target dialects. Defaults describe the
/// C-family shape; targets override what deviates.
pub trait Dialect {
    /// Rendered name of a semantic type.
    fn type_name(&self, ty: &Type) -> String;

    /// Constructor call for a vector or matrix type.
    fn constructor(&self, ty: &Type, args: &[String]) -> String {
        format!("{}({})", self.type_name(ty), args.join(", "))
    }

    /// Numeric literal. Integers keep their plain digits; floats keep the
    /// point.
    fn number(&self, value: f64, is_int: bool) -> String {
        if is_int {
            format!("{}", value as i64)
        } else {
            format_float(value)
        }
    }

    /// Boolean literal.
    fn bool_literal(&self, value: bool) -> String {
        (if value { "true" } else { "false" }).to_string()
    }

    /// Local declaration, without the terminating `;`.
    fn var_decl(&self, name: &str, ty_name: &str, value: &str) -> String {
        format!("{ty_name} {name} = {value}")
    }

    /// File-scope scalar/vector global, without the terminating `;`.
    fn global_decl(&self, name: &str, ty_name: &str, value: &str, is_const: bool) -> String;

    /// File-scope array global, without the terminating `;`.
    fn global_array_decl(
        &self,
        name: &str,
        elem_name: &str,
        size: usize,
        values: &[String],
        is_const: bool,
    ) -> String;

    /// Array literal in expression position.
    fn array_literal(&self, elem_name: &str, values: &[String]) -> String;

    /// Local array declaration, without the terminating `;`.
    fn array_decl(&self, name: &str, elem_name: &str, size: usize, values: &[String]) -> String {
        format!(
            "{elem_name} {name}[{size}] = {}",
            self.array_literal(elem_name, values)
        )
    }

    /// `for` header, without the opening brace.
    fn for_header(&self, var: &str, start: &str, end: &str) -> String {
        format!("for (int {var} = {start}; {var} < {end}; {var}++)")
    }

    /// `while` header, without the opening brace.
    fn while_header(&self, condition: &str) -> String {
        format!("while ({condition})")
    }

    /// Conditional expression.
    fn conditional(&self, condition: &str, then_value: &str, else_value: &str) -> String {
        format!("({condition} ? {then_value} : {else_value})")
    }

    /// Function signature, without the opening brace. Parameters arrive as
    /// `(name, rendered type)` pairs.
    fn function_signature(&self, name: &str, params: &[(String, String)], ret: &str) -> String {
        let params: Vec<String> = params
            .iter()
            .map(|(name, ty)| format!("{ty} {name}"))
            .collect();
        format!("{ret} {name}({})", params.join(", "))
    }

    /// Definition of the result struct backing a tuple return. Fields
    /// arrive as `(name, rendered type)` pairs.
    fn result_struct(&self, name: &str, fields: &[(String, String)]) -> String {
        let fields: Vec<String> = fields
            .iter()
            .map(|(name, ty)| format!("    {ty} {name};"))
            .collect();
        format!("struct {name} {{\n{}\n}};", fields.join("\n"))
    }

    /// Aggregate value of a result struct.
    fn struct_literal(&self, name: &str, values: &[String]) -> String {
        format!("{name}({})", values.join(", "))
    }

    /// Target-specific binary rendering. Returning `None` falls back to
    /// infix with the operator glyph.
    fn binary_op(
        &self,
        _op: BinOp,
        _left: &str,
        _right: &str,
        _left_ty: Option<&Type>,
        _right_ty: Option<&Type>,
    ) -> Option<String> {
        None
    }

    /// Call rewriting: renaming, suffixing, receiver-method forms. The
    /// receiver, when present, arrives as the leading argument.
    fn call(&self, name: &str, args: &[String], arg_types: &[Option<Type>]) -> String {
        let _ = arg_types;
        format!("{name}({})", args.join(", "))
    }

    /// Text prepended to the whole program (e.g. a `#version` line).
    fn prologue(&self) -> Option<String> {
        None
    }
}

/// The shared emitter, parameterized by a target dialect.
pub struct Emitter<'a, D: Dialect> {
    dialect: &'a D,
    indent: usize,
    tmp_counter: usize,
    /// Result-struct name of the function currently being emitted, when its
    /// return type is a tuple.
    result_struct: Option<String>,
}

impl<'a, D: Dialect> Emitter<'a, D> {
    /// A fresh emitter for one program.
    pub fn new(dialect: &'a D) -> Self {
        Self {
            dialect,
            indent: 0,
            tmp_counter: 0,
            result_struct: None,
        }
    }

    /// Renders a program block. With `needs_return`, the tail statement is
    /// lifted into a `return`.
    pub fn emit(&mut self, ir: &Node, needs_return: bool) -> Result<String, EmitError> {
        let mut out = String::new();
        if let Some(prologue) = self.dialect.prologue() {
            out.push_str(&prologue);
            out.push('\n');
        }
        match &ir.kind {
            NodeKind::Block(_) => self.block(&mut out, ir, needs_return)?,
            _ => self.stmt(&mut out, ir)?,
        }
        Ok(out)
    }

    fn pad(&self) -> String {
        "    ".repeat(self.indent)
    }

    fn next_tmp(&mut self) -> String {
        self.tmp_counter += 1;
        if self.tmp_counter == 1 {
            "_tmp".to_string()
        } else {
            format!("_tmp{}", self.tmp_counter)
        }
    }

    fn block(&mut self, out: &mut String, node: &Node, needs_return: bool) -> Result<(), EmitError> {
        let NodeKind::Block(stmts) = &node.kind else {
            return self.stmt_or_tail(out, node, needs_return);
        };
        for (i, stmt) in stmts.iter().enumerate() {
            let is_tail = i + 1 == stmts.len();
            self.stmt_or_tail(out, stmt, needs_return && is_tail)?;
        }
        Ok(())
    }

    fn stmt_or_tail(&mut self, out: &mut String, node: &Node, lift: bool) -> Result<(), EmitError> {
        if !lift {
            return self.stmt(out, node);
        }
        // Return lifting: a tail expression becomes `return <expr>;`, a
        // tail if-statement has its branches lifted, a tail array literal
        // becomes a multi-value return. Everything else passes through.
        match &node.kind {
            _ if node.is_expression() => {
                let value = self.expr(node)?;
                out.push_str(&format!("{}return {};\n", self.pad(), value));
                Ok(())
            }
            NodeKind::If { .. } => self.if_stmt(out, node, true),
            NodeKind::ArrayLiteral(values) => {
                let rendered = self.exprs(values)?;
                let name = self
                    .result_struct
                    .clone()
                    .unwrap_or_else(|| TOP_LEVEL_RESULT.to_string());
                let literal = self.dialect.struct_literal(&name, &rendered);
                out.push_str(&format!("{}return {};\n", self.pad(), literal));
                Ok(())
            }
            _ => self.stmt(out, node),
        }
    }

    fn stmt(&mut self, out: &mut String, node: &Node) -> Result<(), EmitError> {
        match &node.kind {
            NodeKind::Block(_) => self.block(out, node, false),
            NodeKind::VarDecl { name, init } => {
                let ty = node.ty.clone().or_else(|| init.ty.clone()).unwrap_or(Type::Float);
                let line = if let (Type::Array(elem), NodeKind::ArrayLiteral(values)) =
                    (&ty, &init.kind)
                {
                    let elem_name = self.dialect.type_name(elem);
                    let values = self.exprs(values)?;
                    self.dialect.array_decl(name, &elem_name, values.len(), &values)
                } else {
                    let value = self.expr(init)?;
                    self.dialect.var_decl(name, &self.dialect.type_name(&ty), &value)
                };
                out.push_str(&format!("{}{};\n", self.pad(), line));
                Ok(())
            }
            NodeKind::Assignment { target, value } => {
                let target = self.expr(target)?;
                let value = self.expr(value)?;
                out.push_str(&format!("{}{} = {};\n", self.pad(), target, value));
                Ok(())
            }
            NodeKind::MultipleAssignment { targets, value } => {
                self.multiple_assignment(out, targets, value)
            }
            NodeKind::If { .. } => self.if_stmt(out, node, false),
            NodeKind::ForLoop {
                var,
                start,
                end,
                body,
            } => {
                let start = self.expr(start)?;
                let end = self.expr(end)?;
                let header = self.dialect.for_header(var, &start, &end);
                out.push_str(&format!("{}{} {{\n", self.pad(), header));
                self.indent += 1;
                self.block(out, body, false)?;
                self.indent -= 1;
                out.push_str(&format!("{}}}\n", self.pad()));
                Ok(())
            }
            NodeKind::WhileLoop { condition, body } => {
                let condition = self.expr(condition)?;
                let header = self.dialect.while_header(&condition);
                out.push_str(&format!("{}{} {{\n", self.pad(), header));
                self.indent += 1;
                self.block(out, body, false)?;
                self.indent -= 1;
                out.push_str(&format!("{}}}\n", self.pad()));
                Ok(())
            }
            NodeKind::Break => {
                out.push_str(&format!("{}break;\n", self.pad()));
                Ok(())
            }
            NodeKind::Return(value) => self.return_stmt(out, value.as_deref()),
            NodeKind::GlobalDecl {
                name,
                init,
                is_const,
                array_size,
                element_type,
                ..
            } => {
                if let NodeKind::ArrayLiteral(values) = &init.kind {
                    let elem = element_type
                        .clone()
                        .or_else(|| values.first().and_then(|v| v.ty.clone()))
                        .unwrap_or(Type::Float);
                    let elem_name = self.dialect.type_name(&elem);
                    let size = array_size.unwrap_or(values.len());
                    let values = self.exprs(values)?;
                    let line = self
                        .dialect
                        .global_array_decl(name, &elem_name, size, &values, *is_const);
                    out.push_str(&format!("{}{};\n", self.pad(), line));
                } else {
                    let value = self.expr(init)?;
                    let ty = node.ty.clone().or_else(|| init.ty.clone()).unwrap_or(Type::Float);
                    let line = self.dialect.global_decl(
                        name,
                        &self.dialect.type_name(&ty),
                        &value,
                        *is_const,
                    );
                    out.push_str(&format!("{}{};\n", self.pad(), line));
                }
                Ok(())
            }
            NodeKind::FunctionDefinition {
                name,
                params,
                body,
                return_type,
                param_types,
            } => {
                let ret = return_type.clone().unwrap_or(Type::Float);
                let param_list: Vec<(String, String)> = params
                    .iter()
                    .map(|p| {
                        let ty = param_types.get(p).cloned().unwrap_or(Type::Float);
                        (p.clone(), self.dialect.type_name(&ty))
                    })
                    .collect();
                let ret_name = if let Type::Tuple(parts) = &ret {
                    let struct_name = format!("{name}_result");
                    let fields: Vec<(String, String)> = parts
                        .iter()
                        .enumerate()
                        .map(|(i, ty)| (format!("v{i}"), self.dialect.type_name(ty)))
                        .collect();
                    out.push_str(&format!(
                        "{}{}\n",
                        self.pad(),
                        self.dialect.result_struct(&struct_name, &fields)
                    ));
                    self.result_struct = Some(struct_name.clone());
                    struct_name
                } else {
                    self.dialect.type_name(&ret)
                };
                let signature = self.dialect.function_signature(name, &param_list, &ret_name);
                out.push_str(&format!("{}{} {{\n", self.pad(), signature));
                self.indent += 1;
                self.block(out, body, true)?;
                self.indent -= 1;
                out.push_str(&format!("{}}}\n", self.pad()));
                self.result_struct = None;
                Ok(())
            }
            _ if node.is_expression() || matches!(node.kind, NodeKind::ArrayLiteral(_)) => {
                let value = self.expr(node)?;
                out.push_str(&format!("{}{};\n", self.pad(), value));
                Ok(())
            }
            other => Err(EmitError::UnknownNode {
                kind: kind_name(other),
                context: "statement",
            }),
        }
    }

    fn return_stmt(&mut self, out: &mut String, value: Option<&Node>) -> Result<(), EmitError> {
        match value {
            None => {
                out.push_str(&format!("{}return;\n", self.pad()));
                Ok(())
            }
            Some(value) => {
                let rendered = if let NodeKind::ArrayLiteral(values) = &value.kind {
                    let values = self.exprs(values)?;
                    let name = self
                        .result_struct
                        .clone()
                        .unwrap_or_else(|| TOP_LEVEL_RESULT.to_string());
                    self.dialect.struct_literal(&name, &values)
                } else {
                    self.expr(value)?
                };
                out.push_str(&format!("{}return {};\n", self.pad(), rendered));
                Ok(())
            }
        }
    }

    /// Multiple assignment: a tuple-returning call unpacks through a
    /// temporary result struct, an array source indexes element-wise.
    fn multiple_assignment(
        &mut self,
        out: &mut String,
        targets: &[Node],
        value: &Node,
    ) -> Result<(), EmitError> {
        let target_name = |t: &Node| -> Result<String, EmitError> {
            match &t.kind {
                NodeKind::VarRef(name) => Ok(name.clone()),
                other => Err(EmitError::UnknownNode {
                    kind: kind_name(other),
                    context: "statement",
                }),
            }
        };

        if let (Some(Type::Tuple(parts)), NodeKind::FuncCall { name, .. }) =
            (&value.ty, &value.kind)
        {
            let struct_name = format!("{name}_result");
            let tmp = self.next_tmp();
            let call = self.expr(value)?;
            let line = self.dialect.var_decl(&tmp, &struct_name, &call);
            out.push_str(&format!("{}{};\n", self.pad(), line));
            for (i, target) in targets.iter().enumerate() {
                let ty = parts.get(i).cloned().unwrap_or(Type::Float);
                let line = self.dialect.var_decl(
                    &target_name(target)?,
                    &self.dialect.type_name(&ty),
                    &format!("{tmp}.v{i}"),
                );
                out.push_str(&format!("{}{};\n", self.pad(), line));
            }
            return Ok(());
        }

        let elem = match &value.ty {
            Some(Type::Array(elem)) => (**elem).clone(),
            _ => Type::Float,
        };
        let source = self.expr(value)?;
        for (i, target) in targets.iter().enumerate() {
            let ty = target.ty.clone().unwrap_or_else(|| elem.clone());
            let line = self.dialect.var_decl(
                &target_name(target)?,
                &self.dialect.type_name(&ty),
                &format!("{source}[{i}]"),
            );
            out.push_str(&format!("{}{};\n", self.pad(), line));
        }
        Ok(())
    }

    /// Statement-form `if`. Elsif chains (an `If` directly in the else
    /// slot, or a block holding exactly one `If`) are walked in a loop and
    /// rendered flat as `else if`.
    fn if_stmt(&mut self, out: &mut String, node: &Node, lift: bool) -> Result<(), EmitError> {
        let NodeKind::If {
            condition,
            then_branch,
            else_branch,
        } = &node.kind
        else {
            unreachable!("if_stmt called on non-if node");
        };

        if !matches!(then_branch.kind, NodeKind::Block(_)) {
            // Expression-shaped conditional in statement position.
            let value = self.expr(node)?;
            let line = if lift {
                format!("{}return {};\n", self.pad(), value)
            } else {
                format!("{}{};\n", self.pad(), value)
            };
            out.push_str(&line);
            return Ok(());
        }

        let condition = self.expr(condition)?;
        out.push_str(&format!("{}if ({}) {{\n", self.pad(), condition));
        self.indent += 1;
        self.block(out, then_branch, lift)?;
        self.indent -= 1;

        let mut cursor = else_branch.as_deref();
        while let Some(branch) = cursor {
            match as_if_chain(branch) {
                Some(chained) => {
                    let NodeKind::If {
                        condition,
                        then_branch,
                        else_branch,
                    } = &chained.kind
                    else {
                        unreachable!("as_if_chain returned a non-if node");
                    };
                    let condition = self.expr(condition)?;
                    out.push_str(&format!("{}}} else if ({}) {{\n", self.pad(), condition));
                    self.indent += 1;
                    self.block(out, then_branch, lift)?;
                    self.indent -= 1;
                    cursor = else_branch.as_deref();
                }
                None => {
                    out.push_str(&format!("{}}} else {{\n", self.pad()));
                    self.indent += 1;
                    self.block(out, branch, lift)?;
                    self.indent -= 1;
                    cursor = None;
                }
            }
        }
        out.push_str(&format!("{}}}\n", self.pad()));
        Ok(())
    }

    fn exprs(&mut self, nodes: &[Node]) -> Result<Vec<String>, EmitError> {
        nodes.iter().map(|n| self.expr(n)).collect()
    }

    /// Renders an expression node.
    pub fn expr(&mut self, node: &Node) -> Result<String, EmitError> {
        match &node.kind {
            NodeKind::Literal(value) => {
                Ok(self.dialect.number(*value, node.ty == Some(Type::Int)))
            }
            NodeKind::BoolLiteral(value) => Ok(self.dialect.bool_literal(*value)),
            NodeKind::VarRef(name) => Ok(name.clone()),
            NodeKind::Constant(constant) => Ok(self.dialect.number(constant.value(), false)),
            NodeKind::BinaryOp { op, left, right } => {
                let l = self.operand(*op, left)?;
                let r = self.operand(*op, right)?;
                match self
                    .dialect
                    .binary_op(*op, &l, &r, left.ty.as_ref(), right.ty.as_ref())
                {
                    Some(rendered) => Ok(rendered),
                    None => Ok(format!("{l} {} {r}", op.glyph())),
                }
            }
            NodeKind::UnaryOp { op, operand } => {
                let inner = self.expr(operand)?;
                if matches!(operand.kind, NodeKind::BinaryOp { .. }) {
                    Ok(format!("{}({inner})", op.glyph()))
                } else {
                    Ok(format!("{}{inner}", op.glyph()))
                }
            }
            NodeKind::FuncCall {
                name,
                receiver,
                args,
            } => {
                let mut rendered = Vec::new();
                let mut types = Vec::new();
                if let Some(receiver) = receiver {
                    rendered.push(self.expr(receiver)?);
                    types.push(receiver.ty.clone());
                }
                for arg in args {
                    rendered.push(self.expr(arg)?);
                    types.push(arg.ty.clone());
                }
                if let Some(ty) = constructor_type(name) {
                    Ok(self.dialect.constructor(&ty, &rendered))
                } else {
                    Ok(self.dialect.call(name, &rendered, &types))
                }
            }
            NodeKind::FieldAccess { receiver, field } => {
                Ok(format!("{}.{field}", self.receiver(receiver)?))
            }
            NodeKind::Swizzle {
                receiver,
                components,
            } => Ok(format!("{}.{components}", self.receiver(receiver)?)),
            NodeKind::Parenthesized(inner) => Ok(format!("({})", self.expr(inner)?)),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.expr(condition)?;
                let then_value = self.expr(then_branch)?;
                let else_value = match else_branch {
                    Some(else_branch) => self.expr(else_branch)?,
                    None => then_value.clone(),
                };
                Ok(self.dialect.conditional(&condition, &then_value, &else_value))
            }
            NodeKind::ArrayLiteral(values) => {
                let elem = values
                    .first()
                    .and_then(|v| v.ty.clone())
                    .unwrap_or(Type::Float);
                let values = self.exprs(values)?;
                Ok(self
                    .dialect
                    .array_literal(&self.dialect.type_name(&elem), &values))
            }
            NodeKind::ArrayIndex { array, index } => {
                Ok(format!("{}[{}]", self.expr(array)?, self.expr(index)?))
            }
            other => Err(EmitError::UnknownNode {
                kind: kind_name(other),
                context: "expression",
            }),
        }
    }

    /// Renders one side of a binary op, parenthesizing children of strictly
    /// lower precedence.
    fn operand(&mut self, parent: BinOp, node: &Node) -> Result<String, EmitError> {
        let rendered = self.expr(node)?;
        if let NodeKind::BinaryOp { op, .. } = &node.kind {
            if precedence(*op) < precedence(parent) {
                return Ok(format!("({rendered})"));
            }
        }
        Ok(rendered)
    }

    /// Renders a field/swizzle receiver, parenthesizing compound shapes.
    fn receiver(&mut self, node: &Node) -> Result<String, EmitError> {
        let rendered = self.expr(node)?;
        if matches!(
            node.kind,
            NodeKind::BinaryOp { .. } | NodeKind::UnaryOp { .. } | NodeKind::If { .. }
        ) {
            Ok(format!("({rendered})"))
        } else {
            Ok(rendered)
        }
    }
}

fn as_if_chain(node: &Node) -> Option<&Node> {
    match &node.kind {
        NodeKind::If { .. } => Some(node),
        NodeKind::Block(stmts) if stmts.len() == 1 => match &stmts[0].kind {
            NodeKind::If { .. } => Some(&stmts[0]),
            _ => None,
        },
        _ => None,
    }
}

fn constructor_type(name: &str) -> Option<Type> {
    Some(match name {
        "vec2" => Type::Vec2,
        "vec3" => Type::Vec3,
        "vec4" => Type::Vec4,
        "mat2" => Type::Mat2,
        "mat3" => Type::Mat3,
        "mat4" => Type::Mat4,
        _ => return None,
    })
}

fn kind_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Block(_) => "Block",
        NodeKind::Literal(_) => "Literal",
        NodeKind::BoolLiteral(_) => "BoolLiteral",
        NodeKind::VarRef(_) => "VarRef",
        NodeKind::VarDecl { .. } => "VarDecl",
        NodeKind::Assignment { .. } => "Assignment",
        NodeKind::MultipleAssignment { .. } => "MultipleAssignment",
        NodeKind::BinaryOp { .. } => "BinaryOp",
        NodeKind::UnaryOp { .. } => "UnaryOp",
        NodeKind::FuncCall { .. } => "FuncCall",
        NodeKind::FieldAccess { .. } => "FieldAccess",
        NodeKind::Swizzle { .. } => "Swizzle",
        NodeKind::Parenthesized(_) => "Parenthesized",
        NodeKind::If { .. } => "If",
        NodeKind::ForLoop { .. } => "ForLoop",
        NodeKind::WhileLoop { .. } => "WhileLoop",
        NodeKind::Break => "Break",
        NodeKind::Return(_) => "Return",
        NodeKind::Constant(_) => "Constant",
        NodeKind::ArrayLiteral(_) => "ArrayLiteral",
        NodeKind::ArrayIndex { .. } => "ArrayIndex",
        NodeKind::GlobalDecl { .. } => "GlobalDecl",
        NodeKind::FunctionDefinition { .. } => "FunctionDefinition",
    }
}
