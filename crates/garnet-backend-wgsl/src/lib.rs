//! WGSL backend.
//!
//! WGSL spells everything differently: parameterized type names
//! (`vec3<f32>`, `mat3x3<f32>`), `let` declarations with trailing type
//! annotations, `fn name(...) -> ret` signatures, `var`-style loop
//! headers, and `select` instead of the ternary operator.

use garnet_backend_core::{Backend, Dialect, EmitError, EmitOptions, Emitter};
use garnet_ir::{Node, Type};

/// The WGSL dialect.
#[derive(Debug)]
pub struct WgslDialect;

impl Dialect for WgslDialect {
    fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Float => "f32".into(),
            Type::Int => "i32".into(),
            Type::Bool => "bool".into(),
            Type::Vec2 => "vec2<f32>".into(),
            Type::Vec3 => "vec3<f32>".into(),
            Type::Vec4 => "vec4<f32>".into(),
            Type::Mat2 => "mat2x2<f32>".into(),
            Type::Mat3 => "mat3x3<f32>".into(),
            Type::Mat4 => "mat4x4<f32>".into(),
            Type::Sampler2D => "texture_2d<f32>".into(),
            Type::Array(elem) => format!("array<{}>", self.type_name(elem)),
            Type::Tuple(_) => "void".into(),
        }
    }

    fn var_decl(&self, name: &str, ty_name: &str, value: &str) -> String {
        format!("let {name}: {ty_name} = {value}")
    }

    fn global_decl(&self, name: &str, ty_name: &str, value: &str, is_const: bool) -> String {
        if is_const {
            format!("const {name}: {ty_name} = {value}")
        } else {
            format!("var<private> {name}: {ty_name} = {value}")
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
        let ty = format!("array<{elem_name}, {size}>");
        let value = format!("{ty}({})", values.join(", "));
        if is_const {
            format!("const {name}: {ty} = {value}")
        } else {
            format!("var<private> {name}: {ty} = {value}")
        }
    }

    fn array_literal(&self, elem_name: &str, values: &[String]) -> String {
        format!("array<{elem_name}, {}>({})", values.len(), values.join(", "))
    }

    fn array_decl(&self, name: &str, elem_name: &str, size: usize, values: &[String]) -> String {
        format!(
            "let {name}: array<{elem_name}, {size}> = {}",
            self.array_literal(elem_name, values)
        )
    }

    fn for_header(&self, var: &str, start: &str, end: &str) -> String {
        format!("for (var {var}: i32 = {start}; {var} < {end}; {var}++)")
    }

    fn conditional(&self, condition: &str, then_value: &str, else_value: &str) -> String {
        format!("select({else_value}, {then_value}, {condition})")
    }

    fn function_signature(&self, name: &str, params: &[(String, String)], ret: &str) -> String {
        let params: Vec<String> = params
            .iter()
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect();
        format!("fn {name}({}) -> {ret}", params.join(", "))
    }

    fn result_struct(&self, name: &str, fields: &[(String, String)]) -> String {
        let fields: Vec<String> = fields
            .iter()
            .map(|(field, ty)| format!("    {field}: {ty},"))
            .collect();
        format!("struct {name} {{\n{}\n}}", fields.join("\n"))
    }

    fn call(&self, name: &str, args: &[String], _arg_types: &[Option<Type>]) -> String {
        match name {
            "texture2D" | "texture" => format!("textureSample({})", args.join(", ")),
            "textureLod" => format!("textureSampleLevel({})", args.join(", ")),
            "inversesqrt" => format!("inverseSqrt({})", args.join(", ")),
            "mod" if args.len() == 2 => format!("({} % {})", args[0], args[1]),
            _ => format!("{name}({})", args.join(", ")),
        }
    }
}

/// The WGSL backend.
#[derive(Debug)]
pub struct WgslBackend;

impl Backend for WgslBackend {
    fn name(&self) -> &str {
        "wgsl"
    }

    fn targets(&self) -> &[&str] {
        &["wgsl"]
    }

    fn emit(&self, ir: &Node, opts: &EmitOptions) -> Result<String, EmitError> {
        Emitter::new(&WgslDialect).emit(ir, opts.needs_return)
    }
}
