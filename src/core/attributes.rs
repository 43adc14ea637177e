//! Attribute list parsing
//!
//! Parses the content between an element name and its closing '>' or '/>'.

use super::entities::decode_text;
use super::scanner::{is_name_char, is_name_start_char};
use std::borrow::Cow;

/// A parsed attribute, value entity-decoded
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    pub name: &'a [u8],
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(self.name).ok()
    }

    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(self.value.as_ref()).ok()
    }
}

/// Parse attributes leniently
///
/// Unquoted values run to the next whitespace; a name without '=' gets an
/// empty value. In strict mode both are rejected.
pub fn parse_attributes(input: &[u8], strict: bool) -> Result<Vec<Attribute<'_>>, &'static str> {
    let mut attrs = Vec::new();
    let mut pos = 0;
    let len = input.len();

    while pos < len {
        while pos < len && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= len || matches!(input[pos], b'/' | b'>' | b'?') {
            break;
        }

        if !is_name_start_char(input[pos]) {
            if strict {
                return Err("Attribute name must start with letter, underscore, or colon");
            }
            pos += 1;
            continue;
        }
        let name_start = pos;
        while pos < len && is_name_char(input[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        while pos < len && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= len || input[pos] != b'=' {
            if strict {
                return Err("Attribute value required");
            }
            attrs.push(Attribute { name, value: Cow::Borrowed(b"") });
            continue;
        }
        pos += 1;
        while pos < len && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= len {
            break;
        }

        let quote = input[pos];
        let value_bytes = if quote == b'"' || quote == b'\'' {
            pos += 1;
            let start = pos;
            while pos < len && input[pos] != quote {
                pos += 1;
            }
            if pos >= len && strict {
                return Err("Attribute value has mismatched quotes");
            }
            let value = &input[start..pos];
            pos += 1;
            value
        } else {
            if strict {
                return Err("Attribute value must be quoted");
            }
            let start = pos;
            while pos < len && !is_whitespace(input[pos]) && !matches!(input[pos], b'/' | b'>') {
                pos += 1;
            }
            &input[start..pos]
        };

        if strict && attrs.iter().any(|a: &Attribute<'_>| a.name == name) {
            return Err("Duplicate attribute");
        }
        attrs.push(Attribute { name, value: decode_text(value_bytes) });
    }

    Ok(attrs)
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_attributes() {
        let attrs = parse_attributes(b" junos:style=\"brief\" slot='1'", false).unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name_str(), Some("junos:style"));
        assert_eq!(attrs[0].value_str(), Some("brief"));
        assert_eq!(attrs[1].value_str(), Some("1"));
    }

    #[test]
    fn test_entity_in_value() {
        let attrs = parse_attributes(b" descr=\"a &amp; b\"", false).unwrap();
        assert_eq!(attrs[0].value_str(), Some("a & b"));
    }

    #[test]
    fn test_whitespace_around_equals() {
        let attrs = parse_attributes(b"  id  =  \"ge-0/0/0\"  ", false).unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value_str(), Some("ge-0/0/0"));
    }

    #[test]
    fn test_lenient_unquoted_and_bare() {
        let attrs = parse_attributes(b" checked mtu=1500", false).unwrap();
        assert_eq!(attrs[0].name_str(), Some("checked"));
        assert_eq!(attrs[0].value_str(), Some(""));
        assert_eq!(attrs[1].value_str(), Some("1500"));
    }

    #[test]
    fn test_strict_rejects() {
        assert!(parse_attributes(b" mtu=1500", true).is_err());
        assert!(parse_attributes(b" a=\"1\" a=\"2\"", true).is_err());
        assert!(parse_attributes(b" a=\"1", true).is_err());
    }
}
