//! XPath 1.0 Engine
//!
//! Subset used for view selectors:
//! - All axes except namespace (always empty)
//! - Core node-set, string, boolean and number functions
//! - Name tests compare local names; prefixes are ignored
//! - Compiled expressions cached process-wide

pub mod axes;
pub mod cache;
pub mod compiler;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod select;
pub mod value;

pub use select::{select, Match, Selection};
pub use value::XPathValue;
