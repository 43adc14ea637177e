//! XML Tokenizer - pull-style extraction of markup and text
//!
//! Produces tags, text, CDATA, comments, processing instructions, the XML
//! declaration and DOCTYPE. Lenient by default: a construct that never
//! terminates ends the stream. In strict mode the same condition is recorded
//! as a `ParseError`.

use super::entities::decode_text;
use super::scanner::Scanner;
use crate::error::ParseError;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    StartTag,
    EndTag,
    EmptyTag,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
    XmlDeclaration,
    DocType,
}

/// A token with its raw span in the input
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: (usize, usize),
    /// Element name or PI target
    pub name: Option<&'a [u8]>,
    /// Text, CDATA, comment or PI body (text is entity-decoded)
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    strict: bool,
    started: bool,
    done: bool,
    error: Option<ParseError>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            strict: false,
            started: false,
            done: false,
            error: None,
        }
    }

    pub fn new_strict(input: &'a [u8]) -> Self {
        Tokenizer {
            strict: true,
            ..Tokenizer::new(input)
        }
    }

    /// First error hit in strict mode
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    fn fail(&mut self, message: &str) -> Option<Token<'a>> {
        if self.strict && self.error.is_none() {
            self.error = Some(ParseError::new(message, self.scanner.position()));
        }
        self.done = true;
        None
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.scanner.skip_whitespace();
            self.started = true;
        }
        match self.scanner.peek() {
            None => {
                self.done = true;
                None
            }
            Some(b'<') => self.parse_markup(),
            Some(_) => self.parse_text(),
        }
    }

    fn parse_markup(&mut self) -> Option<Token<'a>> {
        let start = self.scanner.position();
        self.scanner.advance(1);
        if self.scanner.starts_with(b"/") {
            self.parse_end_tag(start)
        } else if self.scanner.starts_with(b"!--") {
            self.parse_delimited(start, 3, b"-->", TokenKind::Comment)
        } else if self.scanner.starts_with(b"![CDATA[") {
            self.parse_delimited(start, 8, b"]]>", TokenKind::CData)
        } else if self.scanner.starts_with(b"!DOCTYPE") {
            self.parse_doctype(start)
        } else if self.scanner.starts_with(b"?") {
            self.parse_pi(start)
        } else {
            self.parse_start_tag(start)
        }
    }

    fn parse_start_tag(&mut self, start: usize) -> Option<Token<'a>> {
        let Some(name) = self.scanner.read_name() else {
            return self.fail("Invalid element name");
        };
        let Some(end) = self.scanner.find_tag_end_quoted() else {
            return self.fail("Unterminated start tag");
        };
        let kind = if self.scanner.slice(start, end).ends_with(b"/") {
            TokenKind::EmptyTag
        } else {
            TokenKind::StartTag
        };
        self.scanner.set_position(end + 1);
        Some(Token::new(kind, (start, end + 1)).with_name(name))
    }

    fn parse_end_tag(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1);
        let Some(name) = self.scanner.read_name() else {
            return self.fail("Invalid element name in end tag");
        };
        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            return self.fail("Unterminated end tag");
        }
        self.scanner.advance(1);
        Some(Token::new(TokenKind::EndTag, (start, self.scanner.position())).with_name(name))
    }

    /// Comment or CDATA: skip `open` bytes, read up to `close`
    fn parse_delimited(
        &mut self,
        start: usize,
        open: usize,
        close: &[u8],
        kind: TokenKind,
    ) -> Option<Token<'a>> {
        self.scanner.advance(open);
        let content_start = self.scanner.position();
        let Some(end) = self.scanner.find(close) else {
            return self.fail("Unterminated comment or CDATA section");
        };
        let content = self.scanner.slice(content_start, end);
        self.scanner.set_position(end + close.len());
        Some(Token::new(kind, (start, self.scanner.position())).with_content(Cow::Borrowed(content)))
    }

    /// DOCTYPE, including a bracketed internal subset
    fn parse_doctype(&mut self, start: usize) -> Option<Token<'a>> {
        let mut depth = 0usize;
        let mut pos = self.scanner.position();
        let input = self.scanner.input();
        while pos < input.len() {
            match input[pos] {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => {
                    self.scanner.set_position(pos + 1);
                    return Some(Token::new(TokenKind::DocType, (start, pos + 1)));
                }
                _ => {}
            }
            pos += 1;
        }
        self.fail("Unterminated DOCTYPE")
    }

    fn parse_pi(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1);
        let Some(target) = self.scanner.read_name() else {
            return self.fail("Invalid processing instruction target");
        };
        self.scanner.skip_whitespace();
        let content_start = self.scanner.position();
        let Some(end) = self.scanner.find(b"?>") else {
            return self.fail("Unterminated processing instruction");
        };
        let content = self.scanner.slice(content_start, end);
        self.scanner.set_position(end + 2);

        let kind = if target == b"xml" {
            TokenKind::XmlDeclaration
        } else {
            TokenKind::ProcessingInstruction
        };
        Some(
            Token::new(kind, (start, self.scanner.position()))
                .with_name(target)
                .with_content(Cow::Borrowed(content)),
        )
    }

    fn parse_text(&mut self) -> Option<Token<'a>> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_start()
            .unwrap_or(start + self.scanner.remaining().len());
        let content = self.scanner.slice(start, end);
        self.scanner.set_position(end);
        Some(Token::new(TokenKind::Text, (start, end)).with_content(decode_text(content)))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_element_with_text() {
        let tokens: Vec<_> = Tokenizer::new(b"<status>OK</status>").collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].name, Some(b"status" as &[u8]));
        assert_eq!(tokens[1].content.as_deref(), Some(b"OK" as &[u8]));
        assert_eq!(tokens[2].kind, TokenKind::EndTag);
    }

    #[test]
    fn test_empty_tag() {
        assert_eq!(kinds(b"<up/>"), vec![TokenKind::EmptyTag]);
        assert_eq!(kinds(b"<up a=\"/\"/>"), vec![TokenKind::EmptyTag]);
    }

    #[test]
    fn test_declaration_comment_cdata() {
        let input = b"<?xml version=\"1.0\"?><!-- c --><a><![CDATA[<raw>]]></a>";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::XmlDeclaration,
                TokenKind::Comment,
                TokenKind::StartTag,
                TokenKind::CData,
                TokenKind::EndTag,
            ]
        );
    }

    #[test]
    fn test_doctype_with_subset() {
        let input = b"<!DOCTYPE r [<!ENTITY x \"y\">]><r/>";
        assert_eq!(kinds(input), vec![TokenKind::DocType, TokenKind::EmptyTag]);
    }

    #[test]
    fn test_unterminated_strict_records_error() {
        let mut tok = Tokenizer::new_strict(b"<a><!-- never closed");
        while tok.next_token().is_some() {}
        assert!(tok.error().is_some());

        let mut lenient = Tokenizer::new(b"<a><!-- never closed");
        while lenient.next_token().is_some() {}
        assert!(lenient.error().is_none());
    }
}
