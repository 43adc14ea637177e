//! XML Reader
//!
//! - SliceReader: pull reader over an in-memory reply
//! - Events: the event types it yields

pub mod events;
pub mod slice;

pub use events::{StartElement, XmlEvent};
pub use slice::SliceReader;
