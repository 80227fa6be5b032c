//! Semantic type tags shared by inference and the emitters.

use std::fmt;

/// A semantic type tag.
///
/// Every IR node carries an `Option<Type>` that starts out `None` and is
/// filled in by the inference pass. The set is closed: shader dialects have
/// no user-defined scalar types, and composite shapes are limited to fixed
/// arrays and multi-value (tuple) returns.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Type {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    /// A fixed array of a single element type.
    Array(Box<Type>),
    /// A multi-value return, lowered to a result struct by the emitters.
    Tuple(Vec<Type>),
}

impl Type {
    /// Returns `true` for `float`, `int`, and `bool`.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Float | Self::Int | Self::Bool)
    }

    /// Returns `true` for `vec2`, `vec3`, and `vec4`.
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vec2 | Self::Vec3 | Self::Vec4)
    }

    /// Returns `true` for `mat2`, `mat3`, and `mat4`.
    pub fn is_matrix(&self) -> bool {
        matches!(self, Self::Mat2 | Self::Mat3 | Self::Mat4)
    }

    /// Component count of a vector type.
    pub fn vector_size(&self) -> Option<u32> {
        match self {
            Self::Vec2 => Some(2),
            Self::Vec3 => Some(3),
            Self::Vec4 => Some(4),
            _ => None,
        }
    }

    /// Rank of a square matrix type.
    pub fn matrix_size(&self) -> Option<u32> {
        match self {
            Self::Mat2 => Some(2),
            Self::Mat3 => Some(3),
            Self::Mat4 => Some(4),
            _ => None,
        }
    }

    /// The vector type with the given component count.
    pub fn vector_of(size: u32) -> Option<Type> {
        match size {
            2 => Some(Self::Vec2),
            3 => Some(Self::Vec3),
            4 => Some(Self::Vec4),
            _ => None,
        }
    }

    /// Element type of an array.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Self::Array(elem) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float => write!(f, "float"),
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Vec2 => write!(f, "vec2"),
            Self::Vec3 => write!(f, "vec3"),
            Self::Vec4 => write!(f, "vec4"),
            Self::Mat2 => write!(f, "mat2"),
            Self::Mat3 => write!(f, "mat3"),
            Self::Mat4 => write!(f, "mat4"),
            Self::Sampler2D => write!(f, "sampler2D"),
            Self::Array(elem) => write!(f, "array_{elem}"),
            Self::Tuple(parts) => {
                write!(f, "tuple")?;
                for part in parts {
                    write!(f, "_{part}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Type::Float.is_scalar());
        assert!(Type::Bool.is_scalar());
        assert!(Type::Vec3.is_vector());
        assert!(!Type::Vec3.is_scalar());
        assert!(Type::Mat4.is_matrix());
        assert!(!Type::Sampler2D.is_scalar());
    }

    #[test]
    fn vector_rank() {
        assert_eq!(Type::Vec2.vector_size(), Some(2));
        assert_eq!(Type::Vec4.vector_size(), Some(4));
        assert_eq!(Type::Mat3.vector_size(), None);
        assert_eq!(Type::vector_of(3), Some(Type::Vec3));
        assert_eq!(Type::vector_of(5), None);
    }

    #[test]
    fn display_tags() {
        assert_eq!(Type::Float.to_string(), "float");
        assert_eq!(Type::Sampler2D.to_string(), "sampler2D");
        assert_eq!(Type::Array(Box::new(Type::Vec3)).to_string(), "array_vec3");
        assert_eq!(
            Type::Tuple(vec![Type::Float, Type::Vec2]).to_string(),
            "tuple_float_vec2"
        );
    }
}
