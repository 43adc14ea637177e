//! Resolved field values

use crate::error::{Result, ViewError};
use crate::table::Table;
use std::fmt;
use std::sync::Arc;

/// Result of resolving one field
///
/// `Absent` means the selector matched nothing. It is distinct from every
/// converted value, including empty text, zero and `false`.
#[derive(Clone)]
pub enum FieldValue {
    Absent,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Table(Arc<dyn Table>),
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(n) => Some(*n),
            FieldValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Arc<dyn Table>> {
        match self {
            FieldValue::Table(t) => Some(t),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Absent => "absent",
            FieldValue::Text(_) => "text",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Bool(_) => "bool",
            FieldValue::Table(_) => "table",
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Absent, FieldValue::Absent) => true,
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a == b,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Table(a), FieldValue::Table(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Absent => f.write_str("Absent"),
            FieldValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            FieldValue::Int(n) => f.debug_tuple("Int").field(n).finish(),
            FieldValue::Float(n) => f.debug_tuple("Float").field(n).finish(),
            FieldValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            FieldValue::Table(t) => f
                .debug_struct("Table")
                .field("item", &t.iteration_selector())
                .finish(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Absent => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Table(t) => write!(f, "<table {}>", t.iteration_selector()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Typed extraction of a resolved value
///
/// `Absent` becomes `None`; any other variant the target cannot hold is a
/// conversion error naming the field.
pub trait FromFieldValue: Sized {
    const TARGET: &'static str;

    fn from_value(value: &FieldValue) -> Option<Self>;

    fn from_field_value(field: &str, value: FieldValue) -> Result<Option<Self>> {
        if value.is_absent() {
            return Ok(None);
        }
        match Self::from_value(&value) {
            Some(v) => Ok(Some(v)),
            None => Err(ViewError::FieldConversion {
                field: field.to_string(),
                raw: value.to_string(),
                target: Self::TARGET.to_string(),
                reason: format!("field holds {}", value.kind_name()),
            }),
        }
    }
}

impl FromFieldValue for String {
    const TARGET: &'static str = "String";

    fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Table(_) | FieldValue::Absent => None,
            other => Some(other.to_string()),
        }
    }
}

impl FromFieldValue for i64 {
    const TARGET: &'static str = "i64";

    fn from_value(value: &FieldValue) -> Option<Self> {
        value.as_int()
    }
}

impl FromFieldValue for f64 {
    const TARGET: &'static str = "f64";

    fn from_value(value: &FieldValue) -> Option<Self> {
        value.as_float()
    }
}

impl FromFieldValue for bool {
    const TARGET: &'static str = "bool";

    fn from_value(value: &FieldValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromFieldValue for Arc<dyn Table> {
    const TARGET: &'static str = "table";

    fn from_value(value: &FieldValue) -> Option<Self> {
        value.as_table().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_none() {
        assert_eq!(i64::from_field_value("mtu", FieldValue::Absent).unwrap(), None);
        assert_eq!(String::from_field_value("x", FieldValue::Absent).unwrap(), None);
    }

    #[test]
    fn test_absent_differs_from_defaults() {
        assert_ne!(FieldValue::Absent, FieldValue::Text(String::new()));
        assert_ne!(FieldValue::Absent, FieldValue::Int(0));
        assert_ne!(FieldValue::Absent, FieldValue::Bool(false));
    }

    #[test]
    fn test_mismatch_is_error() {
        let err = i64::from_field_value("model", FieldValue::from("RE-S-1800x4")).unwrap_err();
        assert!(matches!(
            err,
            ViewError::FieldConversion { ref field, ref target, .. } if field == "model" && target == "i64"
        ));
    }

    #[test]
    fn test_string_accepts_scalars() {
        assert_eq!(
            String::from_field_value("mtu", FieldValue::Int(9192)).unwrap(),
            Some("9192".to_string())
        );
        assert_eq!(f64::from_field_value("load", FieldValue::Int(2)).unwrap(), Some(2.0));
    }
}
