//! The builtins registry.
//!
//! Static, read-only tables shared by the inference pass and every emitter:
//! built-in function signatures, operator classification, the swizzle
//! alphabet, and binary-operator result resolution.

use std::sync::LazyLock;

use crate::node::{BinOp, UnOp};
use crate::types::Type;

/// Parameter type class of a built-in signature. `Any` defers to the
/// actual argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamClass {
    Any,
    Float,
    Vector,
    Matrix,
    Sampler,
}

/// How a built-in's return type is derived from its argument types.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReturnRule {
    /// The type of the first argument.
    Same,
    First,
    Second,
    Third,
    Concrete(Type),
}

impl ReturnRule {
    /// Resolves the rule against inferred argument types. Falls back to
    /// `float` when the indexed argument is missing or untyped.
    pub fn resolve(&self, args: &[Option<Type>]) -> Type {
        let arg = |i: usize| args.get(i).cloned().flatten().unwrap_or(Type::Float);
        match self {
            Self::Same | Self::First => arg(0),
            Self::Second => arg(1),
            Self::Third => arg(2),
            Self::Concrete(ty) => ty.clone(),
        }
    }
}

/// Signature of a built-in function.
#[derive(Clone, Debug)]
pub struct FunctionSig {
    pub name: &'static str,
    pub params: &'static [ParamClass],
    pub ret: ReturnRule,
    pub variadic: bool,
    pub min_args: usize,
}

use ParamClass as P;
use ReturnRule as R;

macro_rules! sig {
    ($name:literal, [$($p:expr),*], $ret:expr) => {
        FunctionSig {
            name: $name,
            params: &[$($p),*],
            ret: $ret,
            variadic: false,
            min_args: [$(($p)),*].len(),
        }
    };
    ($name:literal, [$($p:expr),*], $ret:expr, variadic) => {
        FunctionSig {
            name: $name,
            params: &[$($p),*],
            ret: $ret,
            variadic: true,
            min_args: 1,
        }
    };
}

/// The function table. Linear scan is fine: the registry is small and
/// lookups happen once per call node.
pub static FUNCTIONS: LazyLock<Vec<FunctionSig>> = LazyLock::new(|| {
    vec![
    // Constructors.
    sig!("vec2", [P::Any], R::Concrete(Type::Vec2), variadic),
    sig!("vec3", [P::Any], R::Concrete(Type::Vec3), variadic),
    sig!("vec4", [P::Any], R::Concrete(Type::Vec4), variadic),
    sig!("mat2", [P::Any], R::Concrete(Type::Mat2), variadic),
    sig!("mat3", [P::Any], R::Concrete(Type::Mat3), variadic),
    sig!("mat4", [P::Any], R::Concrete(Type::Mat4), variadic),
    // Trigonometry.
    sig!("sin", [P::Any], R::Same),
    sig!("cos", [P::Any], R::Same),
    sig!("tan", [P::Any], R::Same),
    sig!("asin", [P::Any], R::Same),
    sig!("acos", [P::Any], R::Same),
    sig!("atan", [P::Any], R::Same),
    sig!("atan2", [P::Any, P::Any], R::Same),
    sig!("sinh", [P::Any], R::Same),
    sig!("cosh", [P::Any], R::Same),
    sig!("tanh", [P::Any], R::Same),
    // Exponential and logarithmic.
    sig!("exp", [P::Any], R::Same),
    sig!("exp2", [P::Any], R::Same),
    sig!("log", [P::Any], R::Same),
    sig!("log2", [P::Any], R::Same),
    sig!("sqrt", [P::Any], R::Same),
    sig!("inversesqrt", [P::Any], R::Same),
    sig!("pow", [P::Any, P::Any], R::Same),
    // Common math.
    sig!("abs", [P::Any], R::Same),
    sig!("sign", [P::Any], R::Same),
    sig!("floor", [P::Any], R::Same),
    sig!("ceil", [P::Any], R::Same),
    sig!("round", [P::Any], R::Same),
    sig!("fract", [P::Any], R::Same),
    sig!("mod", [P::Any, P::Any], R::Same),
    sig!("min", [P::Any, P::Any], R::Same),
    sig!("max", [P::Any, P::Any], R::Same),
    sig!("clamp", [P::Any, P::Any, P::Any], R::Same),
    sig!("mix", [P::Any, P::Any, P::Any], R::First),
    sig!("step", [P::Any, P::Any], R::Second),
    sig!("smoothstep", [P::Any, P::Any, P::Any], R::Third),
    // Vector operations.
    sig!("length", [P::Vector], R::Concrete(Type::Float)),
    sig!("distance", [P::Vector, P::Vector], R::Concrete(Type::Float)),
    sig!("dot", [P::Vector, P::Vector], R::Concrete(Type::Float)),
    sig!("cross", [P::Vector, P::Vector], R::Concrete(Type::Vec3)),
    sig!("normalize", [P::Vector], R::Same),
    sig!("reflect", [P::Vector, P::Vector], R::First),
    sig!("refract", [P::Vector, P::Vector, P::Float], R::First),
    // Matrix operations.
    sig!("inverse", [P::Matrix], R::Same),
    sig!("transpose", [P::Matrix], R::Same),
    sig!("determinant", [P::Matrix], R::Concrete(Type::Float)),
    // Textures.
    sig!("texture2D", [P::Sampler, P::Vector], R::Concrete(Type::Vec4)),
    sig!("texture", [P::Sampler, P::Vector], R::Concrete(Type::Vec4)),
    sig!(
        "textureLod",
        [P::Sampler, P::Vector, P::Float],
        R::Concrete(Type::Vec4)
    ),
    // Hash helpers.
    sig!("hash11", [P::Float], R::Concrete(Type::Float)),
    sig!("hash21", [P::Vector], R::Concrete(Type::Float)),
    sig!("hash22", [P::Vector], R::Concrete(Type::Vec2)),
    sig!("hash33", [P::Vector], R::Concrete(Type::Vec3)),
    // Per-component comparisons.
    sig!("lessThan", [P::Vector, P::Vector], R::Same),
    sig!("lessThanEqual", [P::Vector, P::Vector], R::Same),
    sig!("greaterThan", [P::Vector, P::Vector], R::Same),
    sig!("greaterThanEqual", [P::Vector, P::Vector], R::Same),
    sig!("equal", [P::Vector, P::Vector], R::Same),
    sig!("notEqual", [P::Vector, P::Vector], R::Same),
    ]
});

/// Looks up a built-in signature by name.
pub fn lookup(name: &str) -> Option<&'static FunctionSig> {
    FUNCTIONS.iter().find(|sig| sig.name == name)
}

/// A user-supplied helper signature, augmenting the built-in table.
///
/// `returns` with more than one entry describes a multi-value return and
/// behaves as the corresponding tuple type.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomSignature {
    pub returns: Vec<Type>,
    pub params: Option<Vec<Type>>,
}

impl CustomSignature {
    /// A helper returning a single value.
    pub fn returning(ty: Type) -> Self {
        Self {
            returns: vec![ty],
            params: None,
        }
    }

    /// The signature's return type: the sole entry, or a tuple.
    pub fn return_type(&self) -> Type {
        match self.returns.as_slice() {
            [single] => single.clone(),
            many => Type::Tuple(many.to_vec()),
        }
    }
}

/// Classification of a binary operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpKind {
    Arithmetic,
    Comparison,
    Logical,
}

/// Partition of the binary operators.
pub fn op_kind(op: BinOp) -> OpKind {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => OpKind::Arithmetic,
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => OpKind::Comparison,
        BinOp::And | BinOp::Or => OpKind::Logical,
    }
}

/// Result type of a unary operator over its operand type.
pub fn unary_result_type(op: UnOp, operand: &Type) -> Type {
    match op {
        UnOp::Negate => operand.clone(),
        UnOp::Not => Type::Bool,
    }
}

/// Result type of a binary operator over the operand types.
///
/// Comparison and logical operators yield `bool`; arithmetic applies the
/// scalar/vector/matrix rules in order, defaulting to `float`.
pub fn binary_result_type(op: BinOp, left: &Type, right: &Type) -> Type {
    match op_kind(op) {
        OpKind::Comparison | OpKind::Logical => Type::Bool,
        OpKind::Arithmetic => arithmetic_result(left, right),
    }
}

fn arithmetic_result(left: &Type, right: &Type) -> Type {
    if left.is_matrix() && right.is_vector() {
        return right.clone();
    }
    if left.is_vector() && right.is_matrix() {
        return left.clone();
    }
    if left.is_matrix() && right.is_matrix() && left == right {
        return left.clone();
    }
    if left.is_matrix() && right.is_scalar() {
        return left.clone();
    }
    if left.is_scalar() && right.is_matrix() {
        return right.clone();
    }
    if left.is_vector() && right.is_vector() && left == right {
        return left.clone();
    }
    if left.is_vector() && right.is_scalar() {
        return left.clone();
    }
    if left.is_scalar() && right.is_vector() {
        return right.clone();
    }
    Type::Float
}

/// The swizzle component alphabet.
pub const SWIZZLE_COMPONENTS: &str = "xyzwrgbastpq";

/// Whether a name is a single swizzle component letter.
pub fn is_component(name: &str) -> bool {
    let mut chars = name.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if SWIZZLE_COMPONENTS.contains(c))
}

/// Whether a name is a 2-4 letter swizzle drawn from the alphabet.
pub fn is_swizzle(name: &str) -> bool {
    (2..=4).contains(&name.len()) && name.chars().all(|c| SWIZZLE_COMPONENTS.contains(c))
}

/// The vector type a swizzle of the given length projects to.
pub fn swizzle_type(len: usize) -> Option<Type> {
    Type::vector_of(len as u32)
}
