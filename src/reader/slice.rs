//! Slice reader
//!
//! Turns tokenizer output into `XmlEvent`s, parsing attribute lists on the
//! way. Borrowed from the input wherever no entity decoding was needed.

use super::events::{StartElement, XmlEvent};
use crate::core::attributes::{parse_attributes, Attribute};
use crate::core::tokenizer::{Token, TokenKind, Tokenizer};
use crate::error::ParseError;

/// Pull reader over an in-memory XML reply
pub struct SliceReader<'a> {
    input: &'a [u8],
    tokenizer: Tokenizer<'a>,
    strict: bool,
    attr_error: Option<ParseError>,
}

impl<'a> SliceReader<'a> {
    /// Lenient reader
    pub fn new(input: &'a [u8]) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new(input),
            strict: false,
            attr_error: None,
        }
    }

    pub fn new_strict(input: &'a [u8]) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new_strict(input),
            strict: true,
            attr_error: None,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// First error hit in strict mode
    pub fn error(&self) -> Option<&ParseError> {
        self.attr_error.as_ref().or_else(|| self.tokenizer.error())
    }

    pub fn position(&self) -> usize {
        self.tokenizer.position()
    }

    pub fn next_event(&mut self) -> Option<XmlEvent<'a>> {
        if self.attr_error.is_some() {
            return None;
        }
        loop {
            let token = self.tokenizer.next_token()?;
            let event = match token.kind {
                TokenKind::StartTag => XmlEvent::StartElement(self.start_element(&token)?),
                TokenKind::EmptyTag => XmlEvent::EmptyElement(self.start_element(&token)?),
                TokenKind::EndTag => XmlEvent::EndElement(token.name?),
                TokenKind::Text => match token.content {
                    Some(content) if !content.is_empty() => XmlEvent::Text(content),
                    _ => continue,
                },
                TokenKind::CData => XmlEvent::CData(token.content?),
                TokenKind::Comment => XmlEvent::Comment(token.content?),
                TokenKind::ProcessingInstruction => XmlEvent::ProcessingInstruction {
                    target: token.name?,
                    data: token.content,
                },
                TokenKind::XmlDeclaration => XmlEvent::XmlDeclaration,
                TokenKind::DocType => XmlEvent::DocType,
            };
            return Some(event);
        }
    }

    fn start_element(&mut self, token: &Token<'a>) -> Option<StartElement<'a>> {
        let name = token.name?;
        let attrs = self.tag_attributes(token, name.len());
        Some(StartElement::new(name, attrs))
    }

    /// Attribute list between the element name and the closing '>'
    fn tag_attributes(&mut self, token: &Token<'a>, name_len: usize) -> Vec<Attribute<'a>> {
        let (start, end) = token.span;
        let attr_start = (start + 1 + name_len).min(end);
        let attr_end = end.saturating_sub(1).max(attr_start);
        let content = &self.input[attr_start..attr_end];

        match parse_attributes(content, self.strict) {
            Ok(attrs) => attrs,
            Err(message) => {
                self.attr_error = Some(ParseError::new(message, attr_start));
                Vec::new()
            }
        }
    }
}

impl<'a> Iterator for SliceReader<'a> {
    type Item = XmlEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_with_attributes() {
        let input = b"<item slot=\"1\"><name>RE0</name><flag/></item>";
        let events: Vec<_> = SliceReader::new(input).collect();
        assert_eq!(events.len(), 6);
        match &events[0] {
            XmlEvent::StartElement(e) => {
                assert_eq!(e.name, b"item");
                assert_eq!(e.attributes[0].value_str(), Some("1"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(events[4], XmlEvent::EmptyElement(_)));
        assert!(matches!(events[5], XmlEvent::EndElement(b"item")));
    }

    #[test]
    fn test_empty_element_attributes() {
        let events: Vec<_> = SliceReader::new(b"<up since=\"3\"/>").collect();
        match &events[0] {
            XmlEvent::EmptyElement(e) => {
                assert_eq!(e.attributes.len(), 1);
                assert_eq!(e.attributes[0].value_str(), Some("3"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_strict_attribute_error_stops_reader() {
        let mut reader = SliceReader::new_strict(b"<a x=1><b/></a>");
        assert!(reader.next_event().is_some());
        assert!(reader.error().is_some());
        assert!(reader.next_event().is_none());
    }
}
