pub mod object;
pub mod primitive;
pub mod reference;
pub mod stream;

pub use object::*;
pub use primitive::*;
pub use reference::*;
pub use stream::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single PDF object.
///
/// `Reference` is a non-owning handle into the object table; it only ever
/// appears nested inside arrays, dictionaries and stream dictionaries.
/// `Indirect` wraps a named object and is produced by the resolver when a
/// reference is expanded; the structure parser never stores it inside the
/// object table values themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    Name(PdfName),
    Array(PdfArray),
    Dictionary(PdfDictionary),
    Stream(PdfStream),
    Reference(PdfReference),
    Indirect(Box<IndirectObject>),
}

/// Structural classification of a [`PdfValue`].
///
/// `Integer` and `Real` both classify as `Number`; callers that need the
/// exact representation use the accessors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Name,
    Array,
    Dictionary,
    Stream,
    Reference,
    IndirectObject,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Name => "name",
            ValueKind::Array => "array",
            ValueKind::Dictionary => "dictionary",
            ValueKind::Stream => "stream",
            ValueKind::Reference => "reference",
            ValueKind::IndirectObject => "indirect-object",
        };
        write!(f, "{}", name)
    }
}

impl PdfValue {
    /// Classifies the value by structural tag.
    pub fn kind(&self) -> ValueKind {
        match self {
            PdfValue::Null => ValueKind::Null,
            PdfValue::Boolean(_) => ValueKind::Boolean,
            PdfValue::Integer(_) | PdfValue::Real(_) => ValueKind::Number,
            PdfValue::String(_) => ValueKind::String,
            PdfValue::Name(_) => ValueKind::Name,
            PdfValue::Array(_) => ValueKind::Array,
            PdfValue::Dictionary(_) => ValueKind::Dictionary,
            PdfValue::Stream(_) => ValueKind::Stream,
            PdfValue::Reference(_) => ValueKind::Reference,
            PdfValue::Indirect(_) => ValueKind::IndirectObject,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PdfValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PdfValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PdfValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an `Integer` or `Real`.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            PdfValue::Real(r) => Some(*r),
            PdfValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&PdfString> {
        match self {
            PdfValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&PdfName> {
        match self {
            PdfValue::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&PdfArray> {
        match self {
            PdfValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&PdfDictionary> {
        match self {
            PdfValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&PdfStream> {
        match self {
            PdfValue::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&PdfReference> {
        match self {
            PdfValue::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_indirect(&self) -> Option<&IndirectObject> {
        match self {
            PdfValue::Indirect(obj) => Some(obj),
            _ => None,
        }
    }

    /// The wrapped value when this is an `Indirect`, the value itself
    /// otherwise. Lets callers look through resolver output uniformly.
    pub fn unwrap_indirect(&self) -> &PdfValue {
        match self {
            PdfValue::Indirect(obj) => &obj.value,
            other => other,
        }
    }
}

impl fmt::Display for PdfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfValue::Null => write!(f, "null"),
            PdfValue::Boolean(b) => write!(f, "{}", b),
            PdfValue::Integer(i) => write!(f, "{}", i),
            PdfValue::Real(r) => write!(f, "{}", r),
            PdfValue::String(s) => write!(f, "{}", s),
            PdfValue::Name(n) => write!(f, "{}", n),
            PdfValue::Array(a) => write!(f, "{}", a),
            PdfValue::Dictionary(d) => write!(f, "{}", d),
            PdfValue::Stream(s) => write!(f, "{}", s),
            PdfValue::Reference(r) => write!(f, "{}", r),
            PdfValue::Indirect(obj) => write!(f, "{}", obj),
        }
    }
}
