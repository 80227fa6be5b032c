//! Garnet: a Ruby-flavored shader DSL transpiler.
//!
//! Composes the three pipeline stages behind one façade: the frontend
//! parses surface source into the shared IR, the inference pass fills every
//! type slot, and a per-target backend renders the annotated tree. Four
//! dialects are supported: portable C (for the CPU renderer), Metal Shading
//! Language, WGSL, and GLSL.
//!
//! ```
//! use garnet::Transpiler;
//!
//! let mut transpiler = Transpiler::new();
//! transpiler.parse("color = vec3(1.0, 0.0, 0.0)\nreturn color").unwrap();
//! let glsl = transpiler.emit("glsl", true).unwrap();
//! assert!(glsl.contains("vec3(1.0, 0.0, 0.0)"));
//! ```

use std::collections::HashMap;

use garnet_backend_c::CBackend;
use garnet_backend_core::{BackendRegistry, EmitError, EmitOptions};
use garnet_backend_glsl::GlslBackend;
use garnet_backend_msl::MslBackend;
use garnet_backend_wgsl::WgslBackend;
use garnet_frontend::ParseError;
use garnet_infer::Inferencer;

pub use garnet_ir::{CustomSignature, Node, NodeKind, Type};

/// Parameter names every inline shader body may use positionally.
const WELL_KNOWN_PARAMS: &[&str] = &["frag_coord", "resolution", "u"];

/// A transpilation failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The surface source is syntactically invalid.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// `emit` was called before a successful `parse`.
    #[error("no source has been parsed yet")]
    NothingParsed,
    /// The target selector is not one of the four dialects.
    #[error("unknown target '{0}', expected one of: c, msl, wgsl, glsl")]
    UnknownTarget(String),
    /// The emitter met an IR shape it cannot render.
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// The transpiler façade. One instance owns one parsed IR tree and the
/// configuration that shaped it; instances share nothing.
pub struct Transpiler {
    uniforms: HashMap<String, Type>,
    custom_functions: HashMap<String, CustomSignature>,
    glsl_version: String,
    ir: Option<Node>,
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Transpiler {
    /// A transpiler with no uniforms and the default GLSL version.
    pub fn new() -> Self {
        Self {
            uniforms: HashMap::new(),
            custom_functions: HashMap::new(),
            glsl_version: "330".to_string(),
            ir: None,
        }
    }

    /// Seeds the symbol table and the uniform-field table.
    pub fn with_uniforms(mut self, uniforms: HashMap<String, Type>) -> Self {
        self.uniforms = uniforms;
        self
    }

    /// Augments the builtins registry with user-defined helper signatures.
    pub fn with_custom_functions(
        mut self,
        custom_functions: HashMap<String, CustomSignature>,
    ) -> Self {
        self.custom_functions = custom_functions;
        self
    }

    /// Sets the `#version` line of GLSL output.
    pub fn with_glsl_version(mut self, version: impl Into<String>) -> Self {
        self.glsl_version = version.into();
        self
    }

    /// Parses surface source and runs type inference, keeping the annotated
    /// IR on the instance for subsequent [`emit`](Self::emit) calls.
    pub fn parse(&mut self, source: &str) -> Result<&Node, Error> {
        let params: Vec<String> = WELL_KNOWN_PARAMS.iter().map(|p| p.to_string()).collect();
        let known: Vec<String> = self.uniforms.keys().cloned().collect();
        let mut ir = garnet_frontend::parse(source, &params, &known)?;
        Inferencer::new(self.uniforms.clone(), self.custom_functions.clone()).infer(&mut ir);
        log::debug!("parsed and inferred shader body");
        Ok(&*self.ir.insert(ir))
    }

    /// The annotated IR of the last successful parse.
    pub fn ir(&self) -> Option<&Node> {
        self.ir.as_ref()
    }

    /// Renders the parsed IR in the given target dialect.
    pub fn emit(&self, target: &str, needs_return: bool) -> Result<String, Error> {
        let ir = self.ir.as_ref().ok_or(Error::NothingParsed)?;
        let registry = self.registry();
        let backend = registry
            .find(target)
            .ok_or_else(|| Error::UnknownTarget(target.to_string()))?;
        Ok(backend.emit(ir, &EmitOptions { needs_return })?)
    }

    /// Transpiles a block of helper function definitions.
    ///
    /// Each top-level function picks up its return and parameter types from
    /// `signatures` (unknown names are silently skipped), then the block is
    /// inferred and emitted without tail-return lifting.
    pub fn transpile_helpers(
        &mut self,
        source: &str,
        target: &str,
        signatures: &HashMap<String, CustomSignature>,
    ) -> Result<String, Error> {
        let params: Vec<String> = WELL_KNOWN_PARAMS.iter().map(|p| p.to_string()).collect();
        let known: Vec<String> = self.uniforms.keys().cloned().collect();
        let mut ir = garnet_frontend::parse(source, &params, &known)?;

        if let NodeKind::Block(stmts) = &mut ir.kind {
            for stmt in stmts.iter_mut() {
                let NodeKind::FunctionDefinition {
                    name,
                    params,
                    return_type,
                    param_types,
                    ..
                } = &mut stmt.kind
                else {
                    continue;
                };
                let Some(signature) = signatures.get(name.as_str()) else {
                    continue;
                };
                *return_type = Some(signature.return_type());
                if let Some(types) = &signature.params {
                    for (param, ty) in params.iter().zip(types) {
                        param_types.insert(param.clone(), ty.clone());
                    }
                }
            }
        }

        let mut custom = self.custom_functions.clone();
        custom.extend(signatures.iter().map(|(k, v)| (k.clone(), v.clone())));
        Inferencer::new(self.uniforms.clone(), custom).infer(&mut ir);
        self.ir = Some(ir);
        self.emit(target, false)
    }

    fn registry(&self) -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        registry.register(Box::new(CBackend));
        registry.register(Box::new(MslBackend));
        registry.register(Box::new(WgslBackend));
        registry.register(Box::new(GlslBackend::new(self.glsl_version.clone())));
        registry
    }
}
