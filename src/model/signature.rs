//! Named, typed parameter / field / return / payload descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal carried by a signature as its default or constant value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    /// Tried before `Number` so whole JSON numbers stay integers.
    Int(i64),
    Number(f64),
    Str(String),
}

impl fmt::Display for Literal {
    /// Lua source form: strings quoted, numbers as written.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        }
    }
}

/// One parameter, return value, field, enum member or event payload entry.
///
/// Only `name`, `type` and `nilable` take part in structural identity; the
/// rest is documentation carried through to the emitters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSignature {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub nilable: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stride_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Literal>,
}

impl VariableSignature {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        VariableSignature {
            name: name.into(),
            ty: ty.into(),
            nilable: false,
            description: String::new(),
            mixin: None,
            default: None,
            stride_index: None,
            value: None,
        }
    }

    pub fn nilable(mut self, nilable: bool) -> Self {
        self.nilable = nilable;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_value(mut self, value: Literal) -> Self {
        self.value = Some(value);
        self
    }

    /// Field-wise match on name, type and nilability.
    pub fn same_shape(&self, other: &VariableSignature) -> bool {
        self.name == other.name && self.ty == other.ty && self.nilable == other.nilable
    }
}

/// Compare two signature lists as sets.
///
/// Lengths must agree and every entry of `a` needs a same-shaped entry in
/// `b`. Order is ignored.
pub fn same_signatures(a: &[VariableSignature], b: &[VariableSignature]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.same_shape(y)))
}
