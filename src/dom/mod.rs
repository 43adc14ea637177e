//! DOM Module - Arena-based XML Document
//!
//! - Arena allocation for nodes, NodeId (u32) indices
//! - String interning for names, values and text
//! - `NodeRef` handles that share ownership of the document

pub mod document;
pub mod handle;
pub mod node;
pub mod strings;

pub use document::XmlDocument;
pub use handle::NodeRef;
pub use node::{NodeId, NodeKind, XmlAttribute, XmlNode};
pub use strings::StringPool;
