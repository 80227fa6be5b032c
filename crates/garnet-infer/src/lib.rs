//! Type inference for the Garnet IR.
//!
//! One recursive bottom-up pass that fills every node's type slot: children
//! are inferred first, then the node's own tag is derived from theirs via
//! the builtins registry. The pass never fails; where a type cannot be
//! determined it defaults to `float`, matching shader-dialect defaults.
//! Running the pass twice over the same tree yields the same tags.

use std::collections::HashMap;

use garnet_ir::{builtins, CustomSignature, Node, NodeKind, Type};

/// The inference pass. One flat symbol table, seeded with the uniforms and
/// the well-known vector parameters `frag_coord` and `resolution`.
pub struct Inferencer {
    symbols: HashMap<String, Type>,
    uniforms: HashMap<String, Type>,
    functions: HashMap<String, CustomSignature>,
    array_elems: HashMap<String, Type>,
}

impl Inferencer {
    pub fn new(
        uniforms: HashMap<String, Type>,
        custom_functions: HashMap<String, CustomSignature>,
    ) -> Self {
        let mut symbols = uniforms.clone();
        symbols.insert("frag_coord".to_string(), Type::Vec2);
        symbols.insert("resolution".to_string(), Type::Vec2);
        Self {
            symbols,
            uniforms,
            functions: custom_functions,
            array_elems: HashMap::new(),
        }
    }

    /// Fills the type slot of every node in the tree.
    pub fn infer(&mut self, node: &mut Node) {
        self.visit(node);
        log::debug!("inference done, {} symbols", self.symbols.len());
    }

    fn visit(&mut self, node: &mut Node) {
        let ty = match &mut node.kind {
            NodeKind::Block(stmts) => {
                for stmt in stmts.iter_mut() {
                    self.visit(stmt);
                }
                stmts.last().and_then(|s| s.ty.clone())
            }
            NodeKind::Literal(value) => Some(node.ty.clone().unwrap_or(if value.fract() == 0.0 {
                Type::Int
            } else {
                Type::Float
            })),
            NodeKind::BoolLiteral(_) => Some(Type::Bool),
            NodeKind::VarRef(name) => {
                Some(self.symbols.get(name.as_str()).cloned().unwrap_or(Type::Float))
            }
            NodeKind::VarDecl { name, init } => {
                self.visit(init);
                let ty = init.ty.clone().unwrap_or(Type::Float);
                self.symbols.insert(name.clone(), ty.clone());
                Some(ty)
            }
            NodeKind::Assignment { target, value } => {
                self.visit(value);
                let ty = value.ty.clone().unwrap_or(Type::Float);
                if let NodeKind::VarRef(name) = &target.kind {
                    self.symbols.insert(name.clone(), ty.clone());
                    target.ty = Some(ty.clone());
                } else {
                    self.visit(target);
                }
                Some(ty)
            }
            NodeKind::MultipleAssignment { targets, value } => {
                self.visit(value);
                let parts = self.unpacked_types(value, targets.len());
                for (i, target) in targets.iter_mut().enumerate() {
                    let ty = parts
                        .as_ref()
                        .and_then(|p| p.get(i).cloned())
                        .unwrap_or(Type::Float);
                    target.ty = Some(ty.clone());
                    if let NodeKind::VarRef(name) = &target.kind {
                        self.symbols.insert(name.clone(), ty);
                    }
                }
                value.ty.clone()
            }
            NodeKind::BinaryOp { op, left, right } => {
                self.visit(left);
                self.visit(right);
                let lty = left.ty.clone().unwrap_or(Type::Float);
                let rty = right.ty.clone().unwrap_or(Type::Float);
                Some(builtins::binary_result_type(*op, &lty, &rty))
            }
            NodeKind::UnaryOp { op, operand } => {
                self.visit(operand);
                let oty = operand.ty.clone().unwrap_or(Type::Float);
                Some(builtins::unary_result_type(*op, &oty))
            }
            NodeKind::FuncCall {
                name,
                receiver,
                args,
            } => {
                if let Some(receiver) = receiver {
                    self.visit(receiver);
                }
                for arg in args.iter_mut() {
                    self.visit(arg);
                }
                // A receiver acts as the leading argument for return rules.
                let mut arg_types: Vec<Option<Type>> = Vec::new();
                if let Some(receiver) = receiver {
                    arg_types.push(receiver.ty.clone());
                }
                arg_types.extend(args.iter().map(|a| a.ty.clone()));

                if let Some(sig) = builtins::lookup(name) {
                    Some(sig.ret.resolve(&arg_types))
                } else if let Some(custom) = self.functions.get(name.as_str()) {
                    Some(custom.return_type())
                } else if let Some(receiver) = receiver {
                    Some(receiver.ty.clone().unwrap_or(Type::Float))
                } else {
                    Some(Type::Float)
                }
            }
            NodeKind::FieldAccess { receiver, field } => {
                self.visit(receiver);
                if builtins::is_component(field) {
                    Some(Type::Float)
                } else {
                    Some(self.uniforms.get(field.as_str()).cloned().unwrap_or(Type::Float))
                }
            }
            NodeKind::Swizzle {
                receiver,
                components,
            } => {
                self.visit(receiver);
                Some(builtins::swizzle_type(components.len()).unwrap_or(Type::Float))
            }
            NodeKind::Parenthesized(inner) => {
                self.visit(inner);
                inner.ty.clone()
            }
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit(condition);
                self.visit(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit(else_branch);
                }
                then_branch.ty.clone()
            }
            NodeKind::ForLoop {
                var,
                start,
                end,
                body,
            } => {
                self.visit(start);
                self.visit(end);
                self.symbols.insert(var.clone(), Type::Int);
                self.visit(body);
                None
            }
            NodeKind::WhileLoop { condition, body } => {
                self.visit(condition);
                self.visit(body);
                None
            }
            NodeKind::Break => None,
            NodeKind::Return(value) => match value {
                Some(value) => {
                    self.visit(value);
                    value.ty.clone()
                }
                None => None,
            },
            NodeKind::Constant(_) => Some(Type::Float),
            NodeKind::ArrayLiteral(elements) => {
                for element in elements.iter_mut() {
                    self.visit(element);
                }
                let elem = elements
                    .first()
                    .and_then(|e| e.ty.clone())
                    .unwrap_or(Type::Float);
                Some(Type::Array(Box::new(elem)))
            }
            NodeKind::ArrayIndex { array, index } => {
                self.visit(array);
                self.visit(index);
                let elem = match &array.ty {
                    Some(Type::Array(elem)) => Some((**elem).clone()),
                    _ => match &array.kind {
                        NodeKind::VarRef(name) => self.array_elems.get(name.as_str()).cloned(),
                        _ => None,
                    },
                };
                Some(elem.unwrap_or(Type::Float))
            }
            NodeKind::GlobalDecl {
                name,
                init,
                array_size,
                element_type,
                ..
            } => {
                self.visit(init);
                if let NodeKind::ArrayLiteral(elements) = &init.kind {
                    let elem = element_type.clone().unwrap_or_else(|| {
                        elements
                            .first()
                            .and_then(|e| e.ty.clone())
                            .unwrap_or(Type::Float)
                    });
                    if array_size.is_none() {
                        *array_size = Some(elements.len());
                    }
                    if element_type.is_none() {
                        *element_type = Some(elem.clone());
                    }
                    let ty = Type::Array(Box::new(elem.clone()));
                    self.symbols.insert(name.clone(), ty.clone());
                    self.array_elems.insert(name.clone(), elem);
                    Some(ty)
                } else {
                    let ty = init.ty.clone().unwrap_or(Type::Float);
                    self.symbols.insert(name.clone(), ty.clone());
                    Some(ty)
                }
            }
            NodeKind::FunctionDefinition {
                name,
                params,
                body,
                return_type,
                param_types,
            } => {
                for param in params.iter() {
                    let ty = param_types.get(param).cloned().unwrap_or(Type::Float);
                    self.symbols.insert(param.clone(), ty);
                }
                self.visit(body);
                if return_type.is_none() {
                    *return_type = Some(body.ty.clone().unwrap_or(Type::Float));
                }
                let returns = match return_type.clone() {
                    Some(Type::Tuple(parts)) => parts,
                    Some(ty) => vec![ty],
                    None => vec![Type::Float],
                };
                let ordered_params = params
                    .iter()
                    .map(|p| param_types.get(p).cloned().unwrap_or(Type::Float))
                    .collect();
                self.functions.insert(
                    name.clone(),
                    CustomSignature {
                        returns,
                        params: Some(ordered_params),
                    },
                );
                None
            }
        };
        node.ty = ty;
    }

    /// Component types a multiple assignment distributes to its targets.
    fn unpacked_types(&self, value: &Node, target_count: usize) -> Option<Vec<Type>> {
        match &value.ty {
            Some(Type::Tuple(parts)) => Some(parts.clone()),
            Some(Type::Array(elem)) => Some(vec![(**elem).clone(); target_count]),
            _ => {
                if let NodeKind::FuncCall { name, .. } = &value.kind {
                    let custom = self.functions.get(name.as_str())?;
                    if custom.returns.len() > 1 {
                        return Some(custom.returns.clone());
                    }
                }
                None
            }
        }
    }
}
