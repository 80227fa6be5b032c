use std::collections::HashMap;

use garnet::{Node, Transpiler, Type};

/// Transpile a shader body for one target, with the default configuration.
#[allow(dead_code)]
pub fn transpile(source: &str, target: &str) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut transpiler = Transpiler::new();
    transpiler.parse(source).expect("source should parse");
    transpiler.emit(target, true).expect("emission should succeed")
}

/// Transpile with a uniforms map.
#[allow(dead_code)]
pub fn transpile_with_uniforms(
    source: &str,
    target: &str,
    uniforms: HashMap<String, Type>,
) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut transpiler = Transpiler::new().with_uniforms(uniforms);
    transpiler.parse(source).expect("source should parse");
    transpiler.emit(target, true).expect("emission should succeed")
}

/// Parse and infer, returning the annotated IR.
#[allow(dead_code)]
pub fn annotated_ir(source: &str) -> Node {
    let mut transpiler = Transpiler::new();
    transpiler.parse(source).expect("source should parse");
    transpiler.ir().expect("ir present after parse").clone()
}

/// Walk every node in the tree, applying `f`.
#[allow(dead_code)]
pub fn walk<'a>(node: &'a Node, f: &mut dyn FnMut(&'a Node)) {
    use garnet::NodeKind;
    f(node);
    match &node.kind {
        NodeKind::Block(stmts) | NodeKind::ArrayLiteral(stmts) => {
            for stmt in stmts {
                walk(stmt, f);
            }
        }
        NodeKind::VarDecl { init, .. } => walk(init, f),
        NodeKind::Assignment { target, value } => {
            walk(target, f);
            walk(value, f);
        }
        NodeKind::MultipleAssignment { targets, value } => {
            for target in targets {
                walk(target, f);
            }
            walk(value, f);
        }
        NodeKind::BinaryOp { left, right, .. } => {
            walk(left, f);
            walk(right, f);
        }
        NodeKind::UnaryOp { operand, .. } => walk(operand, f),
        NodeKind::FuncCall { receiver, args, .. } => {
            if let Some(receiver) = receiver {
                walk(receiver, f);
            }
            for arg in args {
                walk(arg, f);
            }
        }
        NodeKind::FieldAccess { receiver, .. } | NodeKind::Swizzle { receiver, .. } => {
            walk(receiver, f)
        }
        NodeKind::Parenthesized(inner) => walk(inner, f),
        NodeKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            walk(condition, f);
            walk(then_branch, f);
            if let Some(else_branch) = else_branch {
                walk(else_branch, f);
            }
        }
        NodeKind::ForLoop {
            start, end, body, ..
        } => {
            walk(start, f);
            walk(end, f);
            walk(body, f);
        }
        NodeKind::WhileLoop { condition, body } => {
            walk(condition, f);
            walk(body, f);
        }
        NodeKind::Return(Some(value)) => walk(value, f),
        NodeKind::ArrayIndex { array, index } => {
            walk(array, f);
            walk(index, f);
        }
        NodeKind::GlobalDecl { init, .. } => walk(init, f),
        NodeKind::FunctionDefinition { body, .. } => walk(body, f),
        _ => {}
    }
}
