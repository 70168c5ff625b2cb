//! The tagged value tree exchanged between codecs and the `Model` (§3.1, §3.2).

use std::fmt;

/// Identifies a node in the `Model`. `0` is reserved for the root.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub u32);

impl Id {
    pub const ROOT: Id = Id(0);
}

impl From<u32> for Id {
    fn from(raw: u32) -> Self {
        Id(raw)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single record exchanged in a batch: the node it replaces and its new value.
pub type Record = (Id, Value);

/// A tagged variant holding either a scalar or a reference to child `Id`s
/// (§3.1). Container children are never inlined — they're looked up in the
/// owning `Model`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I32(i32),
    U32(u32),
    F32(f32),
    F64(f64),
    Str(String),
    List(Vec<Id>),
    Dict(Vec<(String, Id)>),
}

impl Value {
    /// Child ids referenced by this value, in wire order. Empty for scalars.
    pub fn children(&self) -> Vec<Id> {
        match self {
            Value::List(ids) => ids.clone(),
            Value::Dict(entries) => entries.iter().map(|(_, id)| *id).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Dict(_))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::F64(f)
    }
}
