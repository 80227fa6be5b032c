//! Portable-C backend.
//!
//! Targets the CPU renderer's vector runtime: vector and matrix arithmetic
//! lowers to `vecN_add`/`matN_mul`-style helper calls, math functions take
//! their `f`-suffixed libm names, float literals carry an `f` suffix, and
//! booleans render as `1`/`0`.

use garnet_backend_core::{
    format_float, Backend, Dialect, EmitError, EmitOptions, Emitter,
};
use garnet_ir::{BinOp, Node, Type};

/// The portable-C dialect.
#[derive(Debug)]
pub struct CDialect;

/// Math functions that rewrite to their `f`-suffixed C names when applied
/// to scalars. Vector applications keep the overloaded helper name.
fn libm_name(name: &str) -> Option<&'static str> {
    Some(match name {
        "sin" => "sinf",
        "cos" => "cosf",
        "tan" => "tanf",
        "asin" => "asinf",
        "acos" => "acosf",
        "atan" => "atanf",
        "atan2" => "atan2f",
        "sinh" => "sinhf",
        "cosh" => "coshf",
        "tanh" => "tanhf",
        "sqrt" => "sqrtf",
        "pow" => "powf",
        "exp" => "expf",
        "exp2" => "exp2f",
        "log" => "logf",
        "log2" => "log2f",
        "floor" => "floorf",
        "ceil" => "ceilf",
        "round" => "roundf",
        "abs" => "fabsf",
        "min" => "fminf",
        "max" => "fmaxf",
        "mod" => "fmodf",
        _ => return None,
    })
}

fn is_vector(ty: Option<&Type>) -> bool {
    ty.is_some_and(Type::is_vector)
}

impl Dialect for CDialect {
    fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Float => "float".into(),
            Type::Int | Type::Bool => "int".into(),
            Type::Vec2 => "vec2".into(),
            Type::Vec3 => "vec3".into(),
            Type::Vec4 => "vec4".into(),
            Type::Mat2 => "mat2".into(),
            Type::Mat3 => "mat3".into(),
            Type::Mat4 => "mat4".into(),
            Type::Sampler2D => "sampler2D".into(),
            Type::Array(elem) => self.type_name(elem),
            Type::Tuple(_) => "void".into(),
        }
    }

    fn constructor(&self, ty: &Type, args: &[String]) -> String {
        format!("{}_new({})", self.type_name(ty), args.join(", "))
    }

    fn number(&self, value: f64, is_int: bool) -> String {
        if is_int {
            format!("{}", value as i64)
        } else {
            format!("{}f", format_float(value))
        }
    }

    fn bool_literal(&self, value: bool) -> String {
        (if value { "1" } else { "0" }).to_string()
    }

    fn global_decl(&self, name: &str, ty_name: &str, value: &str, is_const: bool) -> String {
        if is_const {
            format!("static const {ty_name} {name} = {value}")
        } else {
            format!("static {ty_name} {name} = {value}")
        }
    }

    fn global_array_decl(
        &self,
        name: &str,
        elem_name: &str,
        size: usize,
        values: &[String],
        is_const: bool,
    ) -> String {
        let qualifier = if is_const { "static const" } else { "static" };
        format!(
            "{qualifier} {elem_name} {name}[{size}] = {{ {} }}",
            values.join(", ")
        )
    }

    fn array_literal(&self, _elem_name: &str, values: &[String]) -> String {
        format!("{{ {} }}", values.join(", "))
    }

    fn result_struct(&self, name: &str, fields: &[(String, String)]) -> String {
        let fields: Vec<String> = fields
            .iter()
            .map(|(field, ty)| format!("{ty} {field};"))
            .collect();
        format!("typedef struct {{ {} }} {name};", fields.join(" "))
    }

    fn struct_literal(&self, name: &str, values: &[String]) -> String {
        format!("({name}){{ {} }}", values.join(", "))
    }

    fn binary_op(
        &self,
        op: BinOp,
        left: &str,
        right: &str,
        left_ty: Option<&Type>,
        right_ty: Option<&Type>,
    ) -> Option<String> {
        // Vector and matrix arithmetic on a vector- or matrix-typed left
        // side becomes a runtime helper call; scalar operations stay infix.
        // The C vec/mat types are structs with no overloaded operators.
        let lty = left_ty?;
        if !lty.is_vector() && !lty.is_matrix() {
            return None;
        }
        let helper = match op {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            _ => return None,
        };
        // Mixed vector/matrix operands carry the right side's type in the
        // helper name (mat3_mul_vec3, vec3_mul_mat3); matching or scalar
        // right sides use the plain form (mat3_mul, vec2_add).
        let mut name = format!("{}_{helper}", self.type_name(lty));
        if let Some(rty) = right_ty {
            let mixed = (lty.is_matrix() && rty.is_vector())
                || (lty.is_vector() && rty.is_matrix());
            if mixed {
                name = format!("{name}_{}", self.type_name(rty));
            }
        }
        Some(format!("{name}({left}, {right})"))
    }

    fn call(&self, name: &str, args: &[String], arg_types: &[Option<Type>]) -> String {
        let first = arg_types.first().and_then(|t| t.as_ref());
        if let Some(ty) = first.filter(|t| t.is_vector()) {
            if matches!(name, "length" | "normalize" | "dot") {
                return format!("{}_{name}({})", self.type_name(ty), args.join(", "));
            }
        }
        if name == "mix" && is_vector(first) {
            return format!("mix_v3({})", args.join(", "));
        }
        if matches!(name, "texture2D" | "texture" | "textureLod") {
            return format!("texture_sample({})", args.join(", "));
        }
        if !is_vector(first) && !first.is_some_and(Type::is_matrix) {
            if let Some(libm) = libm_name(name) {
                return format!("{libm}({})", args.join(", "));
            }
        }
        format!("{name}({})", args.join(", "))
    }
}

/// The portable-C backend.
#[derive(Debug)]
pub struct CBackend;

impl Backend for CBackend {
    fn name(&self) -> &str {
        "c"
    }

    fn targets(&self) -> &[&str] {
        &["c"]
    }

    fn emit(&self, ir: &Node, opts: &EmitOptions) -> Result<String, EmitError> {
        Emitter::new(&CDialect).emit(ir, opts.needs_return)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn transpile(source: &str) -> String {
        let mut ir = garnet_frontend::parse(
            source,
            &["frag_coord".into(), "resolution".into(), "u".into()],
            &[],
        )
        .unwrap();
        garnet_infer::Inferencer::new(HashMap::new(), HashMap::new()).infer(&mut ir);
        CBackend
            .emit(&ir, &EmitOptions { needs_return: true })
            .unwrap()
    }

    #[test]
    fn vector_constructor_and_float_suffix() {
        let out = transpile("color = vec3(1.0, 0.0, 0.0)\nreturn color");
        assert!(out.contains("vec3 color = vec3_new(1.0f, 0.0f, 0.0f);"), "got:\n{out}");
        assert!(out.contains("return color;"), "got:\n{out}");
    }

    #[test]
    fn vector_arithmetic_becomes_helper_calls() {
        let out = transpile("a = vec2(1.0, 2.0)\nb = a + a\nreturn b");
        assert!(out.contains("vec2_add(a, a)"), "got:\n{out}");
    }

    #[test]
    fn matrix_arithmetic_becomes_helper_calls() {
        let out = transpile(
            "m = mat3(1.0)\nn = mat3(2.0)\np = m * n\nv = vec3(1.0, 2.0, 3.0)\nw = m * v\nq = v * m\ns = m * 2.0\nreturn w",
        );
        assert!(out.contains("mat3 p = mat3_mul(m, n);"), "got:\n{out}");
        assert!(out.contains("vec3 w = mat3_mul_vec3(m, v);"), "got:\n{out}");
        assert!(out.contains("vec3 q = vec3_mul_mat3(v, m);"), "got:\n{out}");
        assert!(out.contains("mat3 s = mat3_mul(m, 2.0f);"), "got:\n{out}");
    }

    #[test]
    fn scalar_math_takes_libm_names() {
        let out = transpile("x = sin(0.5)\ny = max(x, 0.0)\nreturn y");
        assert!(out.contains("sinf(0.5f)"), "got:\n{out}");
        assert!(out.contains("fmaxf(x, 0.0f)"), "got:\n{out}");
    }

    #[test]
    fn vector_functions_specialize() {
        let out = transpile("v = vec3(1.0, 2.0, 3.0)\nl = length(v)\nn = normalize(v)\nreturn n");
        assert!(out.contains("vec3_length(v)"), "got:\n{out}");
        assert!(out.contains("vec3_normalize(v)"), "got:\n{out}");
    }

    #[test]
    fn vector_mix_specializes() {
        let out =
            transpile("a = vec3(0.0, 0.0, 0.0)\nb = vec3(1.0, 1.0, 1.0)\nc = mix(a, b, 0.5)\nreturn c");
        assert!(out.contains("mix_v3(a, b, 0.5f)"), "got:\n{out}");
    }

    #[test]
    fn texture_lowers_to_sample_helper() {
        let out = transpile("c = texture2D(tex, uv)\nreturn c");
        assert!(out.contains("texture_sample(tex, uv)"), "got:\n{out}");
    }

    #[test]
    fn booleans_are_integers() {
        let out = transpile("flag = true\nother = false\nreturn other");
        assert!(out.contains("int flag = 1;"), "got:\n{out}");
        assert!(out.contains("int other = 0;"), "got:\n{out}");
    }

    #[test]
    fn loop_bounds_stay_integers() {
        let out = transpile("x = 0.0\nfor i in 0..10\n  x = x + 1.0\nend\nreturn x");
        assert!(
            out.contains("for (int i = 0; i < 10; i++) {"),
            "got:\n{out}"
        );
    }

    #[test]
    fn tuple_function_emits_typedef() {
        let mut ir = garnet_frontend::parse(
            "def polar(p)\n  [length(p), 0.0]\nend\nr, a = polar(q)\nreturn r",
            &["q".into()],
            &[],
        )
        .unwrap();
        // Pin the helper signature the way the façade's helpers path does.
        if let garnet_ir::NodeKind::Block(stmts) = &mut ir.kind {
            if let garnet_ir::NodeKind::FunctionDefinition {
                return_type,
                param_types,
                ..
            } = &mut stmts[0].kind
            {
                *return_type = Some(Type::Tuple(vec![Type::Float, Type::Float]));
                param_types.insert("p".into(), Type::Vec2);
            }
        }
        garnet_infer::Inferencer::new(HashMap::new(), HashMap::new()).infer(&mut ir);
        let out = CBackend
            .emit(&ir, &EmitOptions { needs_return: true })
            .unwrap();
        assert!(
            out.contains("typedef struct { float v0; float v1; } polar_result;"),
            "got:\n{out}"
        );
        assert!(out.contains("polar_result _tmp = polar(q);"), "got:\n{out}");
        assert!(out.contains("float r = _tmp.v0;"), "got:\n{out}");
        assert!(
            out.contains("return (polar_result){ vec2_length(p), 0.0f };"),
            "got:\n{out}"
        );
    }
}
