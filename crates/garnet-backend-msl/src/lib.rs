//! Metal Shading Language backend.
//!
//! MSL keeps overloaded math names and infix vector arithmetic; the
//! differences are the `floatN`/`floatNxN` type spellings and the
//! method-call texture path through the well-known `textureSampler`
//! sampler object.

use garnet_backend_core::{Backend, Dialect, EmitError, EmitOptions, Emitter};
use garnet_ir::{Node, Type};

/// The MSL dialect.
#[derive(Debug)]
pub struct MslDialect;

impl Dialect for MslDialect {
    fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Float => "float".into(),
            Type::Int => "int".into(),
            Type::Bool => "bool".into(),
            Type::Vec2 => "float2".into(),
            Type::Vec3 => "float3".into(),
            Type::Vec4 => "float4".into(),
            Type::Mat2 => "float2x2".into(),
            Type::Mat3 => "float3x3".into(),
            Type::Mat4 => "float4x4".into(),
            Type::Sampler2D => "texture2d<float>".into(),
            Type::Array(elem) => self.type_name(elem),
            Type::Tuple(_) => "void".into(),
        }
    }

    fn global_decl(&self, name: &str, ty_name: &str, value: &str, is_const: bool) -> String {
        if is_const {
            format!("constant {ty_name} {name} = {value}")
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
        let qualifier = if is_const { "constant" } else { "static" };
        format!(
            "{qualifier} {elem_name} {name}[{size}] = {{ {} }}",
            values.join(", ")
        )
    }

    fn array_literal(&self, _elem_name: &str, values: &[String]) -> String {
        format!("{{ {} }}", values.join(", "))
    }

    fn struct_literal(&self, name: &str, values: &[String]) -> String {
        format!("{name}{{ {} }}", values.join(", "))
    }

    fn call(&self, name: &str, args: &[String], _arg_types: &[Option<Type>]) -> String {
        match name {
            // The sampler object name is fixed; see the design notes.
            "texture2D" | "texture" if args.len() >= 2 => {
                format!("{}.sample(textureSampler, {})", args[0], args[1..].join(", "))
            }
            "textureLod" if args.len() >= 3 => format!(
                "{}.sample(textureSampler, {}, level({}))",
                args[0], args[1], args[2]
            ),
            "inversesqrt" => format!("rsqrt({})", args.join(", ")),
            _ => format!("{name}({})", args.join(", ")),
        }
    }
}

/// The MSL backend.
#[derive(Debug)]
pub struct MslBackend;

impl Backend for MslBackend {
    fn name(&self) -> &str {
        "msl"
    }

    fn targets(&self) -> &[&str] {
        &["msl"]
    }

    fn emit(&self, ir: &Node, opts: &EmitOptions) -> Result<String, EmitError> {
        Emitter::new(&MslDialect).emit(ir, opts.needs_return)
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
        MslBackend
            .emit(&ir, &EmitOptions { needs_return: true })
            .unwrap()
    }

    #[test]
    fn float_vector_spellings() {
        let out = transpile("color = vec3(1.0, 0.0, 0.0)\nreturn color");
        assert!(
            out.contains("float3 color = float3(1.0, 0.0, 0.0);"),
            "got:\n{out}"
        );
    }

    #[test]
    fn matrix_spellings() {
        let out = transpile("m = mat3(1.0)\nreturn m");
        assert!(out.contains("float3x3 m = float3x3(1.0);"), "got:\n{out}");
    }

    #[test]
    fn math_names_stay_overloaded() {
        let out = transpile("x = sin(0.5)\nreturn x");
        assert!(out.contains("sin(0.5)"), "got:\n{out}");
        assert!(!out.contains("sinf"), "got:\n{out}");
    }

    #[test]
    fn vector_arithmetic_stays_infix() {
        let out = transpile("a = vec2(1.0, 2.0)\nb = a + a\nreturn b");
        assert!(out.contains("float2 b = a + a;"), "got:\n{out}");
    }

    #[test]
    fn texture_becomes_a_method_call() {
        let out = transpile("c = texture2D(tex, uv)\nreturn c");
        assert!(
            out.contains("tex.sample(textureSampler, uv)"),
            "got:\n{out}"
        );
    }

    #[test]
    fn texture_lod_threads_the_level() {
        let out = transpile("c = textureLod(tex, uv, 2.0)\nreturn c");
        assert!(
            out.contains("tex.sample(textureSampler, uv, level(2.0))"),
            "got:\n{out}"
        );
    }

    #[test]
    fn constants_inline_numerically() {
        let out = transpile("x = PI\nreturn x");
        assert!(out.contains("3.141592653589793"), "got:\n{out}");
    }
}
