//! End-to-end scenarios: literal shader bodies in, expected substrings out,
//! across all four target dialects.

mod common;

use common::transpile;

/// Asserts that transpiling `$source` for `$target` yields every listed
/// substring.
macro_rules! scenario {
    ($name:ident, $target:expr, $source:expr, [$($expected:expr),+ $(,)?]) => {
        #[test]
        fn $name() {
            let out = transpile($source, $target);
            $(
                assert!(
                    out.contains($expected),
                    "{} output missing {:?}:\n{}",
                    $target,
                    $expected,
                    out
                );
            )+
        }
    };
}

const COLOR: &str = "color = vec3(1.0, 0.0, 0.0)\nreturn color";
scenario!(color_c, "c", COLOR, ["vec3_new(1.0f, 0.0f, 0.0f)", "return color"]);
scenario!(color_msl, "msl", COLOR, ["float3(1.0, 0.0, 0.0)", "return color"]);
scenario!(
    color_wgsl,
    "wgsl",
    COLOR,
    ["vec3<f32>(1.0, 0.0, 0.0)", "let color", "return color"]
);
scenario!(color_glsl, "glsl", COLOR, ["vec3(1.0, 0.0, 0.0)", "return color"]);

const VEC_ADD: &str = "a = vec2(1.0, 2.0)\nb = a + a\nreturn b";
scenario!(vec_add_c, "c", VEC_ADD, ["vec2_add(a, a)"]);
scenario!(vec_add_msl, "msl", VEC_ADD, ["a + a"]);
scenario!(vec_add_wgsl, "wgsl", VEC_ADD, ["let b: vec2<f32> = a + a;"]);
scenario!(vec_add_glsl, "glsl", VEC_ADD, ["vec2 b = a + a;"]);

const SINE: &str = "x = sin(0.5)\nreturn x";
scenario!(sine_c, "c", SINE, ["sinf(0.5f)"]);
scenario!(sine_msl, "msl", SINE, ["sin(0.5)"]);
scenario!(sine_wgsl, "wgsl", SINE, ["sin(0.5)"]);
scenario!(sine_glsl, "glsl", SINE, ["sin(0.5)"]);

const BRANCHES: &str =
    "if x > 0 then y = 1.0 elsif x < 0 then y = -1.0 else y = 0.0 end\nreturn y";
scenario!(branches_c, "c", BRANCHES, ["if (x > 0", "else if (x < 0", "else {"]);
scenario!(branches_msl, "msl", BRANCHES, ["if (x > 0", "else if (x < 0", "else {"]);
scenario!(branches_wgsl, "wgsl", BRANCHES, ["if (x > 0", "else if (x < 0", "else {"]);
scenario!(branches_glsl, "glsl", BRANCHES, ["if (x > 0", "else if (x < 0", "else {"]);

const SWIZZLE: &str = "v = vec3(1.0, 2.0, 3.0)\nreturn v.xy";
scenario!(swizzle_c, "c", SWIZZLE, ["v.xy"]);
scenario!(swizzle_msl, "msl", SWIZZLE, ["v.xy"]);
scenario!(swizzle_wgsl, "wgsl", SWIZZLE, ["v.xy"]);
scenario!(swizzle_glsl, "glsl", SWIZZLE, ["v.xy"]);

const LOOP: &str = "x = 0.0\nfor i in 0..10 do\n  x = i\nend\nreturn x";
scenario!(loop_c, "c", LOOP, ["for (int i = 0; i < 10; i++) {"]);
scenario!(loop_msl, "msl", LOOP, ["for (int i = 0; i < 10; i++) {"]);
scenario!(loop_wgsl, "wgsl", LOOP, ["for (var i: i32 = 0; i < 10; i++) {"]);
scenario!(loop_glsl, "glsl", LOOP, ["for (int i = 0; i < 10; i++) {"]);

#[test]
fn swizzle_type_is_vec2() {
    let ir = common::annotated_ir(SWIZZLE);
    let garnet::NodeKind::Block(stmts) = &ir.kind else {
        panic!("expected block");
    };
    let garnet::NodeKind::Return(Some(value)) = &stmts[1].kind else {
        panic!("expected return");
    };
    assert_eq!(value.ty, Some(garnet::Type::Vec2));
}

#[test]
fn vector_sum_type_is_vec2() {
    let ir = common::annotated_ir(VEC_ADD);
    let garnet::NodeKind::Block(stmts) = &ir.kind else {
        panic!("expected block");
    };
    assert_eq!(stmts[1].ty, Some(garnet::Type::Vec2));
}
