//! Device facts
//!
//! Facts are a flat, ordered map filled in by gatherers such as
//! `routing_engines`. Values are text, lists of text, or nested maps.

mod routing_engines;

pub use routing_engines::{routing_engines, route_engine_class};

use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactValue {
    Text(String),
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

impl FactValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FactValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FactValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, String>> {
        match self {
            FactValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Text(s) => f.write_str(s),
            FactValue::List(items) => write!(f, "[{}]", items.join(", ")),
            FactValue::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

pub type Facts = IndexMap<String, FactValue>;
