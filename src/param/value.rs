//! Tagged parameter values.

use std::fmt;

use glam::DVec3;

use crate::util::{Error, Result};

/// Archive tag of the deprecated "curve" parameter type.
///
/// Only appears in old archives; it decodes to a [`ParamType::Float`] with
/// the curve stored in the value chunk.
pub const CURVE_OBSOLETE_TAG: i32 = 8;

/// Type tag of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ParamType {
    /// Signed integer
    Int = 1,
    /// Index into the parameter's enum names
    Choice = 2,
    /// Double precision scalar
    Float = 3,
    /// Boolean flag
    Bool = 4,
    /// Double precision 3-vector
    Vec3 = 5,
    /// Free text
    String = 6,
    /// Symbolic math expression, kept as text
    Math = 7,
}

impl ParamType {
    /// All parameter types, in tag order.
    pub const ALL: [ParamType; 7] = [
        Self::Int,
        Self::Choice,
        Self::Float,
        Self::Bool,
        Self::Vec3,
        Self::String,
        Self::Math,
    ];

    /// Tag written to archives.
    #[inline]
    pub const fn tag(self) -> i32 {
        self as i32
    }

    /// Parse an archive tag. The obsolete curve tag is not a live type.
    pub const fn from_tag(tag: i32) -> Option<Self> {
        Some(match tag {
            1 => Self::Int,
            2 => Self::Choice,
            3 => Self::Float,
            4 => Self::Bool,
            5 => Self::Vec3,
            6 => Self::String,
            7 => Self::Math,
            _ => return None,
        })
    }

    /// Zero value of this type.
    pub fn default_value(self) -> ParamValue {
        match self {
            Self::Int => ParamValue::Int(0),
            Self::Choice => ParamValue::Choice(0),
            Self::Float => ParamValue::Float(0.0),
            Self::Bool => ParamValue::Bool(false),
            Self::Vec3 => ParamValue::Vec3(DVec3::ZERO),
            Self::String => ParamValue::String(String::new()),
            Self::Math => ParamValue::Math(String::new()),
        }
    }

    /// Returns the name of this type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Choice => "choice",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Vec3 => "vec3",
            Self::String => "string",
            Self::Math => "math",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a parameter. The variant is the type tag.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Int(i32),
    Choice(i32),
    Float(f64),
    Bool(bool),
    Vec3(DVec3),
    String(String),
    Math(String),
}

impl ParamValue {
    /// Type tag of the stored value.
    pub const fn param_type(&self) -> ParamType {
        match self {
            Self::Int(_) => ParamType::Int,
            Self::Choice(_) => ParamType::Choice,
            Self::Float(_) => ParamType::Float,
            Self::Bool(_) => ParamType::Bool,
            Self::Vec3(_) => ParamType::Vec3,
            Self::String(_) => ParamType::String,
            Self::Math(_) => ParamType::Math,
        }
    }

    /// Integer payload of `Int` and `Choice` values.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) | Self::Choice(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<DVec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Text of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Expression text of a `Math` value.
    pub fn as_math(&self) -> Option<&str> {
        match self {
            Self::Math(s) => Some(s),
            _ => None,
        }
    }

    /// Replace this value with `other` if both carry the same type tag.
    pub fn assign(&mut self, other: ParamValue) -> Result<()> {
        if self.param_type() != other.param_type() {
            return Err(Error::TypeMismatch {
                expected: self.param_type().to_string(),
                actual: other.param_type().to_string(),
            });
        }
        *self = other;
        Ok(())
    }
}

impl Default for ParamValue {
    fn default() -> Self {
        Self::Float(0.0)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) | Self::Choice(n) => write!(f, "{}", n),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Vec3(v) => write!(f, "{},{},{}", v.x, v.y, v.z),
            Self::String(s) | Self::Math(s) => f.write_str(s),
        }
    }
}
