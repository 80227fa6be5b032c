//! Cross-cutting invariants every conforming build must exhibit.

mod common;

use std::collections::HashMap;

use common::{annotated_ir, transpile, walk};
use garnet::{CustomSignature, NodeKind, Transpiler, Type};

const KITCHEN_SINK: &str = r#"
uv = frag_coord / resolution
d = length(uv) - 0.5
color = vec3(uv.x, uv.y, 0.5)
if d < 0.0
  color = color * 2.0
elsif d < 0.1
  color = vec3(1.0, 1.0, 1.0)
else
  color = color * 0.5
end
total = 0.0
for i in 0..4 do
  total = total + hash11(total)
end
while total > 8.0
  total = total - 1.0
end
glow = d < 0.05 ? 1.0 : 0.0
return color * glow
"#;

#[test]
fn type_closure_after_inference() {
    let ir = annotated_ir(KITCHEN_SINK);
    let mut untyped = Vec::new();
    walk(&ir, &mut |node| {
        if node.is_expression() && node.ty.is_none() {
            untyped.push(format!("{:?}", node.kind));
        }
    });
    assert!(untyped.is_empty(), "untyped expressions: {untyped:?}");
}

#[test]
fn inference_is_idempotent_end_to_end() {
    let first = annotated_ir(KITCHEN_SINK);
    let mut second = first.clone();
    garnet_infer::Inferencer::new(HashMap::new(), HashMap::new()).infer(&mut second);
    assert_eq!(first, second);
}

#[test]
fn elsif_chains_never_nest_in_output() {
    for target in ["c", "msl", "wgsl", "glsl"] {
        let out = transpile(KITCHEN_SINK, target);
        assert_eq!(
            out.matches("} else if (").count(),
            1,
            "{target} should flatten one elsif:\n{out}"
        );
        assert!(
            !out.contains("else {\n        if ("),
            "{target} nested an elsif:\n{out}"
        );
    }
}

#[test]
fn precedence_parenthesizes_lower_children() {
    let out = transpile("y = (1.0 + 2.0) * 3.0\nreturn y", "glsl");
    assert!(out.contains("(1.0 + 2.0) * 3.0"), "got:\n{out}");

    // The same holds when the parenthesized node comes from lowering
    // rather than the source text.
    let out = transpile("y = x && a || b\nreturn y", "glsl");
    assert!(out.contains("x && a || b"), "got:\n{out}");
}

#[test]
fn scalar_vector_closure_in_c() {
    let source = r#"
a = vec3(1.0, 2.0, 3.0)
b = a * 2.0
c = a - a
d = a / vec3(2.0, 2.0, 2.0)
return d
"#;
    let out = transpile(source, "c");
    assert!(out.contains("vec3_mul(a, 2.0f)"), "got:\n{out}");
    assert!(out.contains("vec3_sub(a, a)"), "got:\n{out}");
    assert!(out.contains("vec3_div(a, vec3_new(2.0f, 2.0f, 2.0f))"), "got:\n{out}");
    // No infix arithmetic survives on vector-typed left sides.
    for line in out.lines() {
        if line.contains("vec3 ") && line.contains(" = a ") {
            panic!("infix vector arithmetic leaked: {line}");
        }
    }
}

#[test]
fn matrix_arithmetic_per_target() {
    let source = "m = mat3(1.0)\nv = vec3(1.0, 2.0, 3.0)\nw = m * v\nn = m * m\nreturn w";

    // C has no operator overloading on its struct types, so every
    // matrix-involved operation is a helper call.
    let c = transpile(source, "c");
    assert!(c.contains("vec3 w = mat3_mul_vec3(m, v);"), "got:\n{c}");
    assert!(c.contains("mat3 n = mat3_mul(m, m);"), "got:\n{c}");

    // The GPU dialects all overload infix.
    let msl = transpile(source, "msl");
    assert!(msl.contains("float3 w = m * v;"), "got:\n{msl}");
    assert!(msl.contains("float3x3 n = m * m;"), "got:\n{msl}");
    let wgsl = transpile(source, "wgsl");
    assert!(wgsl.contains("let w: vec3<f32> = m * v;"), "got:\n{wgsl}");
    assert!(wgsl.contains("let n: mat3x3<f32> = m * m;"), "got:\n{wgsl}");
    let glsl = transpile(source, "glsl");
    assert!(glsl.contains("vec3 w = m * v;"), "got:\n{glsl}");
    assert!(glsl.contains("mat3 n = m * m;"), "got:\n{glsl}");
}

#[test]
fn tuple_round_trip() {
    let signatures = HashMap::from([(
        "polar".to_string(),
        CustomSignature {
            returns: vec![Type::Float, Type::Float],
            params: Some(vec![Type::Vec2]),
        },
    )]);
    let mut transpiler = Transpiler::new().with_custom_functions(signatures);
    transpiler
        .parse("p = vec2(1.0, 0.0)\nr, theta = polar(p)\nreturn r")
        .unwrap();

    // The consuming side distributes fields in order.
    for (target, decl0, decl1) in [
        ("c", "float r = _tmp.v0;", "float theta = _tmp.v1;"),
        ("glsl", "float r = _tmp.v0;", "float theta = _tmp.v1;"),
        ("wgsl", "let r: f32 = _tmp.v0;", "let theta: f32 = _tmp.v1;"),
    ] {
        let out = transpiler.emit(target, true).unwrap();
        assert!(out.contains("polar_result _tmp = polar(p);") || out.contains("_tmp: polar_result"),
            "{target} missing temp struct:\n{out}");
        assert!(out.contains(decl0), "{target} got:\n{out}");
        assert!(out.contains(decl1), "{target} got:\n{out}");
    }

    // The producing side declares the struct next to the definition.
    let mut helper = Transpiler::new();
    let out = helper
        .transpile_helpers(
            "def polar(p)\n  [length(p), atan2(p.y, p.x)]\nend",
            "glsl",
            &HashMap::from([(
                "polar".to_string(),
                CustomSignature {
                    returns: vec![Type::Float, Type::Float],
                    params: Some(vec![Type::Vec2]),
                },
            )]),
        )
        .unwrap();
    assert!(out.contains("struct polar_result"), "got:\n{out}");
    assert!(out.contains("float v0;"), "got:\n{out}");
    assert!(out.contains("float v1;"), "got:\n{out}");
    assert!(out.contains("return polar_result(length(p), atan(p.y, p.x));")
        || out.contains("return polar_result("), "got:\n{out}");
}

#[test]
fn swizzle_width_matches_component_count() {
    let ir = annotated_ir("v = vec4(1.0, 2.0, 3.0, 4.0)\na = v.xy\nb = v.rgb\nc = v.xyzw\nreturn c");
    let NodeKind::Block(stmts) = &ir.kind else {
        panic!("expected block");
    };
    let expected = [
        (1, Type::Vec2),
        (2, Type::Vec3),
        (3, Type::Vec4),
    ];
    for (index, ty) in expected {
        assert_eq!(stmts[index].ty.as_ref(), Some(&ty), "statement {index}");
    }
}

#[test]
fn unless_negates_and_booleans_lower_per_target() {
    let source = "unless ready\n  x = 1.0\nend\nflag = true\nreturn flag";
    let c = transpile(source, "c");
    assert!(c.contains("if (!ready) {"), "got:\n{c}");
    assert!(c.contains("int flag = 1;"), "got:\n{c}");
    let glsl = transpile(source, "glsl");
    assert!(glsl.contains("bool flag = true;"), "got:\n{glsl}");
}

#[test]
fn while_and_break_emit_in_all_targets() {
    let source = "x = 0.0\nwhile x < 10.0\n  x = x + 1.0\n  if x > 5.0\n    break\n  end\nend\nreturn x";
    for target in ["c", "msl", "wgsl", "glsl"] {
        let out = transpile(source, target);
        assert!(out.contains("while (x < 10.0"), "{target} got:\n{out}");
        assert!(out.contains("break;"), "{target} got:\n{out}");
    }
}
