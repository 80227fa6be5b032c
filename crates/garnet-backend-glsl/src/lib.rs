//! GLSL backend.
//!
//! The closest dialect to the IR's own vocabulary: type names and function
//! names pass straight through. The only additions are the `#version`
//! prologue, chosen at construction, and GLSL's typed array constructors.

use garnet_backend_core::{Backend, Dialect, EmitError, EmitOptions, Emitter};
use garnet_ir::{Node, Type};

/// The GLSL dialect, versioned via the prologue.
#[derive(Debug)]
pub struct GlslDialect {
    version: String,
}

impl GlslDialect {
    /// A dialect emitting `#version <version>`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl Dialect for GlslDialect {
    fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Array(elem) => self.type_name(elem),
            Type::Tuple(_) => "void".into(),
            other => other.to_string(),
        }
    }

    fn global_decl(&self, name: &str, ty_name: &str, value: &str, is_const: bool) -> String {
        if is_const {
            format!("const {ty_name} {name} = {value}")
        } else {
            format!("{ty_name} {name} = {value}")
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
        let qualifier = if is_const { "const " } else { "" };
        format!(
            "{qualifier}{elem_name} {name}[{size}] = {elem_name}[{size}]({})",
            values.join(", ")
        )
    }

    fn array_literal(&self, elem_name: &str, values: &[String]) -> String {
        format!("{elem_name}[{}]({})", values.len(), values.join(", "))
    }

    fn prologue(&self) -> Option<String> {
        Some(format!("#version {}", self.version))
    }
}

/// The GLSL backend.
#[derive(Debug)]
pub struct GlslBackend {
    dialect: GlslDialect,
}

impl GlslBackend {
    /// A backend emitting `#version <version>` programs.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            dialect: GlslDialect::new(version),
        }
    }
}

impl Default for GlslBackend {
    fn default() -> Self {
        Self::new("330")
    }
}

impl Backend for GlslBackend {
    fn name(&self) -> &str {
        "glsl"
    }

    fn targets(&self) -> &[&str] {
        &["glsl"]
    }

    fn emit(&self, ir: &Node, opts: &EmitOptions) -> Result<String, EmitError> {
        Emitter::new(&self.dialect).emit(ir, opts.needs_return)
    }
}
