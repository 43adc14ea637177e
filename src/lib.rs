//! RustyView - typed views over XML RPC replies
//!
//! Layers, leaf first:
//! - core/reader: memchr-accelerated tokenizer and pull reader
//! - dom: arena document with shareable node handles
//! - xpath: compiled, cached selectors evaluated against a node
//! - view: field registries, groups, extension and refresh
//! - table: the Device and Table collaborators a view consults
//! - facts: gatherers built on views (routing engines)
//!
//! ```ignore
//! let class = ViewClass::builder("RouteEngineView")
//!     .field(FieldDescriptor::text("mastership_state", "mastership-state"))
//!     .build();
//! let table = RpcTable::new(device, TableDef::new("get-route-engine-information", ".//route-engine", &class));
//! table.get()?;
//! for view in table.views()? {
//!     println!("{} {:?}", view, view.field::<String>("mastership_state")?);
//! }
//! ```

pub mod config;
pub mod core;
pub mod dom;
pub mod error;
pub mod facts;
pub mod reader;
pub mod table;
pub mod view;
pub mod xpath;

#[cfg(test)]
pub(crate) mod testing;

pub use config::EngineConfig;
pub use dom::{NodeRef, XmlDocument};
pub use error::{ParseError, Result, SelectorError, ViewError};
pub use facts::{FactValue, Facts};
pub use table::{Device, NameSelector, RpcRequest, RpcTable, Table, TableDef, TableFactory, ViewName};
pub use view::{
    Converter, Descriptors, ExtendScope, Extension, FieldDescriptor, FieldKind, FieldValue,
    FromFieldValue, View, ViewClass,
};
pub use xpath::{Match, Selection};
