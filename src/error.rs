//! Error types
//!
//! `ViewError` is what callers of the view engine see. Reader and selector
//! failures have their own types and convert into it.

use thiserror::Error;

/// Document reader failure (strict mode, or no root element at all)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} at byte {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

/// A selector that failed to lex, parse or evaluate
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid selector '{selector}': {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}

impl SelectorError {
    pub fn new(selector: impl Into<String>, message: impl Into<String>) -> Self {
        SelectorError {
            selector: selector.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewError {
    /// The input bound to a view was not exactly one element node
    #[error("view must be bound to exactly one element, got {found}")]
    Construction { found: String },

    #[error("unknown field: '{0}'")]
    UnknownField(String),

    /// Text was found but the converter rejected it
    #[error("unable to convert field '{field}' value {raw:?} to {target}: {reason}")]
    FieldConversion {
        field: String,
        raw: String,
        target: String,
        reason: String,
    },

    /// The owning table lacks the requested capability
    #[error("table does not support {0}")]
    Capability(&'static str),

    #[error("view '{0}' uses the shared type registry; instance extension needs a private registry")]
    SharedRegistry(String),

    #[error("name selector '{selector}' matched nothing")]
    NameNotFound { selector: String },

    #[error("refresh of {name} found no element for '{selector}'")]
    RefreshNotFound { name: String, selector: String },

    #[error("rpc '{rpc}' failed: {reason}")]
    Rpc { rpc: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<toml::de::Error> for ViewError {
    fn from(err: toml::de::Error) -> Self {
        ViewError::Config(err.to_string())
    }
}

pub type Result<T, E = ViewError> = std::result::Result<T, E>;
