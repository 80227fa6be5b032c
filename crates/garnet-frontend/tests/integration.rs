//! Integration tests for the surface-language frontend.

use garnet_frontend::parse;
use garnet_ir::{NodeKind, Type};

fn block(node: &garnet_ir::Node) -> &[garnet_ir::Node] {
    match &node.kind {
        NodeKind::Block(stmts) => stmts,
        other => panic!("expected block, got {other:?}"),
    }
}

#[test]
fn parse_fragment_body() {
    let source = r#"
uv = frag_coord / resolution
color = vec3(uv.x, uv.y, 0.5)
return color
"#;
    let ir = parse(
        source,
        &["frag_coord".into(), "resolution".into()],
        &[],
    )
    .expect("fragment should parse");
    let stmts = block(&ir);
    assert_eq!(stmts.len(), 3);
    assert!(matches!(&stmts[0].kind, NodeKind::VarDecl { name, .. } if name == "uv"));
    assert!(matches!(&stmts[2].kind, NodeKind::Return(Some(_))));
}

#[test]
fn parse_raymarcher_shapes() {
    let source = r#"
def sdf(p)
  length(p) - 1.0
end

d = 0.0
100.times do |i|
  d = d + sdf(vec3(0.0, 0.0, d))
  if d > 50.0
    break
  end
end
return d
"#;
    let ir = parse(source, &[], &[]).expect("raymarcher should parse");
    let stmts = block(&ir);
    assert!(matches!(&stmts[0].kind, NodeKind::FunctionDefinition { name, params, .. }
        if name == "sdf" && params == &["p".to_string()]));
    match &stmts[2].kind {
        NodeKind::ForLoop { var, start, end, .. } => {
            assert_eq!(var, "i");
            assert_eq!(start.ty, Some(Type::Int));
            assert!(matches!(end.kind, NodeKind::Literal(v) if v == 100.0));
            assert_eq!(end.ty, Some(Type::Int));
        }
        other => panic!("expected for loop, got {other:?}"),
    }
}

#[test]
fn parse_elsif_chain_is_right_linear() {
    let source = "if x > 0 then y = 1.0 elsif x < 0 then y = -1.0 else y = 0.0 end";
    let ir = parse(source, &["x".into()], &[]).unwrap();
    let stmts = block(&ir);
    let NodeKind::If { else_branch, .. } = &stmts[0].kind else {
        panic!("expected if");
    };
    let inner = else_branch.as_ref().expect("chain continues");
    let NodeKind::If { else_branch, .. } = &inner.kind else {
        panic!("expected nested if for elsif");
    };
    assert!(else_branch.is_some(), "trailing else present");
}

#[test]
fn parse_multiple_assignment_from_helper() {
    let source = "radius, angle = polar(p)\nreturn radius";
    let ir = parse(source, &["p".into()], &[]).unwrap();
    let stmts = block(&ir);
    match &stmts[0].kind {
        NodeKind::MultipleAssignment { targets, value } => {
            assert_eq!(targets.len(), 2);
            assert!(matches!(&value.kind, NodeKind::FuncCall { name, .. } if name == "polar"));
        }
        other => panic!("expected multiple assignment, got {other:?}"),
    }
}

#[test]
fn parse_uniform_field_and_swizzle() {
    let source = "t = u.time\nv = vec4(1.0, 2.0, 3.0, 4.0)\nreturn v.rgb";
    let ir = parse(source, &["u".into()], &[]).unwrap();
    let stmts = block(&ir);
    assert!(matches!(&stmts[0].kind, NodeKind::VarDecl { init, .. }
        if matches!(&init.kind, NodeKind::FieldAccess { field, .. } if field == "time")));
    assert!(matches!(&stmts[2].kind, NodeKind::Return(Some(value))
        if matches!(&value.kind, NodeKind::Swizzle { components, .. } if components == "rgb")));
}

#[test]
fn parse_error_is_fatal_and_descriptive() {
    let err = parse("for i in 0..\n", &[], &[]).unwrap_err();
    assert!(err.to_string().starts_with("Parse error: line 1"));
}

#[test]
fn globals_and_constants() {
    let source = "MAX_STEPS = 64\n$accum = 0.0\n$accum = $accum + 1.0";
    let ir = parse(source, &[], &[]).unwrap();
    let stmts = block(&ir);
    assert!(matches!(
        &stmts[0].kind,
        NodeKind::GlobalDecl {
            is_const: true,
            is_static: true,
            ..
        }
    ));
    assert!(matches!(
        &stmts[1].kind,
        NodeKind::GlobalDecl {
            is_const: false,
            ..
        }
    ));
    assert!(matches!(&stmts[2].kind, NodeKind::Assignment { .. }));
}
