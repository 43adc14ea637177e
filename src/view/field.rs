//! Field and group descriptors

use super::value::FieldValue;
use crate::table::TableFactory;
use std::fmt;
use std::sync::Arc;

type ConvertFn = dyn Fn(&str) -> Result<FieldValue, String> + Send + Sync;

/// Turns trimmed match text into a typed value
#[derive(Clone)]
pub struct Converter {
    target: Arc<str>,
    func: Arc<ConvertFn>,
}

impl Converter {
    /// Custom converter; `target` names the type in conversion errors
    pub fn new<F>(target: &str, func: F) -> Self
    where
        F: Fn(&str) -> Result<FieldValue, String> + Send + Sync + 'static,
    {
        Converter {
            target: Arc::from(target),
            func: Arc::new(func),
        }
    }

    /// Identity; the default
    pub fn text() -> Self {
        Converter::new("text", |raw| Ok(FieldValue::Text(raw.to_string())))
    }

    pub fn int() -> Self {
        Converter::new("int", |raw| {
            raw.parse::<i64>().map(FieldValue::Int).map_err(|e| e.to_string())
        })
    }

    pub fn float() -> Self {
        Converter::new("float", |raw| {
            raw.parse::<f64>().map(FieldValue::Float).map_err(|e| e.to_string())
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn convert(&self, raw: &str) -> Result<FieldValue, String> {
        (self.func)(raw)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Converter::text()
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({})", self.target)
    }
}

/// How a field's matches become a value
#[derive(Clone)]
pub enum FieldKind {
    /// First match's trimmed text through a converter
    Scalar(Converter),
    /// Whether anything matched
    Boolean,
    /// A table bound to the view's node
    NestedTable(TableFactory),
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(conv) => f.debug_tuple("Scalar").field(conv).finish(),
            FieldKind::Boolean => f.write_str("Boolean"),
            FieldKind::NestedTable(_) => f.write_str("NestedTable"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub selector: String,
    pub group: Option<String>,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, selector: impl Into<String>, kind: FieldKind) -> Self {
        FieldDescriptor {
            name: name.into(),
            selector: selector.into(),
            group: None,
            kind,
        }
    }

    pub fn text(name: impl Into<String>, selector: impl Into<String>) -> Self {
        FieldDescriptor::new(name, selector, FieldKind::Scalar(Converter::text()))
    }

    pub fn int(name: impl Into<String>, selector: impl Into<String>) -> Self {
        FieldDescriptor::new(name, selector, FieldKind::Scalar(Converter::int()))
    }

    pub fn float(name: impl Into<String>, selector: impl Into<String>) -> Self {
        FieldDescriptor::new(name, selector, FieldKind::Scalar(Converter::float()))
    }

    pub fn boolean(name: impl Into<String>, selector: impl Into<String>) -> Self {
        FieldDescriptor::new(name, selector, FieldKind::Boolean)
    }

    pub fn converted(
        name: impl Into<String>,
        selector: impl Into<String>,
        converter: Converter,
    ) -> Self {
        FieldDescriptor::new(name, selector, FieldKind::Scalar(converter))
    }

    /// Nested table over the view's own node; there is no selector
    pub fn table(name: impl Into<String>, factory: TableFactory) -> Self {
        FieldDescriptor::new(name, "", FieldKind::NestedTable(factory))
    }

    /// Resolve against a group's subtree instead of the bound node
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub name: String,
    pub selector: String,
}

impl GroupDescriptor {
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        GroupDescriptor {
            name: name.into(),
            selector: selector.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_converters() {
        assert_eq!(Converter::text().convert("up").unwrap(), FieldValue::Text("up".into()));
        assert_eq!(Converter::int().convert("1514").unwrap(), FieldValue::Int(1514));
        assert_eq!(Converter::float().convert("0.5").unwrap(), FieldValue::Float(0.5));
        assert!(Converter::int().convert("jumbo").is_err());
    }

    #[test]
    fn test_custom_converter_names_target() {
        let seconds = Converter::new("seconds", |raw| {
            raw.trim_end_matches('s')
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|e| e.to_string())
        });
        assert_eq!(seconds.target(), "seconds");
        assert_eq!(seconds.convert("30s").unwrap(), FieldValue::Int(30));
        assert_eq!(format!("{:?}", seconds), "Converter(seconds)");
    }

    #[test]
    fn test_descriptor_group() {
        let desc = FieldDescriptor::int("mtu", "mtu").in_group("phy");
        assert_eq!(desc.group.as_deref(), Some("phy"));
        assert!(matches!(desc.kind, FieldKind::Scalar(ref c) if c.target() == "int"));
    }
}
