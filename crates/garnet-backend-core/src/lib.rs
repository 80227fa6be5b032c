#![warn(missing_docs)]
//! Backend trait and shared emitter for the Garnet transpiler.
//!
//! Defines the [`Backend`] trait every target implements, the [`Dialect`]
//! trait capturing the syntactic differences between targets, the shared
//! [`Emitter`] that owns control-flow layout and precedence handling, and a
//! [`BackendRegistry`] for target-name dispatch.

mod emitter;

use std::fmt::Debug;

use garnet_ir::Node;

pub use emitter::{format_float, precedence, Dialect, Emitter};

/// Options passed to a backend during emission.
#[derive(Clone, Copy, Debug)]
pub struct EmitOptions {
    /// Whether the tail statement of the program block is lifted into a
    /// `return`.
    pub needs_return: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { needs_return: true }
    }
}

/// An error during emission. Emitting an IR node kind the emitter does not
/// know in the given position is fatal and signals a bug in the IR.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// A node kind appeared somewhere the emitter cannot render it.
    #[error("cannot emit {kind} node in {context} position")]
    UnknownNode {
        /// The offending node kind.
        kind: &'static str,
        /// Whether it appeared in statement or expression position.
        context: &'static str,
    },
}

/// A backend that renders annotated IR to one target dialect.
pub trait Backend: Debug + Send + Sync {
    /// Human-readable name (e.g. "msl").
    fn name(&self) -> &str;

    /// Target identifiers this backend handles.
    fn targets(&self) -> &[&str];

    /// Renders the IR tree to target source text.
    fn emit(&self, ir: &Node, opts: &EmitOptions) -> Result<String, EmitError>;
}

/// Registry of available backends, keyed by target identifier.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    backends: Vec<Box<dyn Backend>>,
}

impl BackendRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a backend.
    pub fn register(&mut self, backend: Box<dyn Backend>) {
        log::debug!("registered backend '{}'", backend.name());
        self.backends.push(backend);
    }

    /// Finds the backend handling the given target identifier.
    pub fn find(&self, target: &str) -> Option<&dyn Backend> {
        self.backends
            .iter()
            .find(|b| b.targets().contains(&target))
            .map(|b| b.as_ref())
    }

    /// All registered target identifiers.
    pub fn targets(&self) -> Vec<&str> {
        self.backends
            .iter()
            .flat_map(|b| b.targets().iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_ir::NodeKind;

    #[derive(Debug)]
    struct FakeBackend;

    impl Backend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }
        fn targets(&self) -> &[&str] {
            &["fake", "fk"]
        }
        fn emit(&self, _ir: &Node, _opts: &EmitOptions) -> Result<String, EmitError> {
            Ok(String::new())
        }
    }

    #[test]
    fn registry_dispatch() {
        let mut registry = BackendRegistry::new();
        registry.register(Box::new(FakeBackend));
        assert!(registry.find("fake").is_some());
        assert!(registry.find("fk").is_some());
        assert!(registry.find("hlsl").is_none());
        assert_eq!(registry.targets(), vec!["fake", "fk"]);
    }

    #[test]
    fn options_default_to_return_lifting() {
        assert!(EmitOptions::default().needs_return);
    }

    #[test]
    fn emit_error_formats() {
        let err = EmitError::UnknownNode {
            kind: "Break",
            context: "expression",
        };
        assert_eq!(
            err.to_string(),
            "cannot emit Break node in expression position"
        );
        let _ = Node::new(NodeKind::Break);
    }
}
