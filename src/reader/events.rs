//! XML Event Types
//!
//! Event types for pull-parser style processing of RPC replies.

use crate::core::attributes::Attribute;
use std::borrow::Cow;

/// XML parsing event
#[derive(Debug, Clone)]
pub enum XmlEvent<'a> {
    /// Start of an element: <name attrs...>
    StartElement(StartElement<'a>),
    /// End of an element: </name>
    EndElement(&'a [u8]),
    /// Empty element: <name attrs.../>
    EmptyElement(StartElement<'a>),
    /// Text content between tags, entity-decoded
    Text(Cow<'a, [u8]>),
    /// CDATA section content
    CData(Cow<'a, [u8]>),
    Comment(Cow<'a, [u8]>),
    ProcessingInstruction {
        target: &'a [u8],
        data: Option<Cow<'a, [u8]>>,
    },
    XmlDeclaration,
    DocType,
}

/// Start element event data
#[derive(Debug, Clone)]
pub struct StartElement<'a> {
    /// Full element name (may include prefix)
    pub name: &'a [u8],
    pub attributes: Vec<Attribute<'a>>,
}

impl<'a> StartElement<'a> {
    pub fn new(name: &'a [u8], attributes: Vec<Attribute<'a>>) -> Self {
        StartElement { name, attributes }
    }

    /// Name after the prefix colon, or the whole name
    pub fn local_name(&self) -> &'a [u8] {
        local_part(self.name)
    }
}

/// Strip a `prefix:` from a qualified name
#[inline]
pub fn local_part(name: &[u8]) -> &[u8] {
    match memchr::memchr(b':', name) {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}
