//! Entity decoding
//!
//! Handles the five predefined entities and numeric character references.
//! Anything else is left in the text untouched.

use memchr::memchr;
use std::borrow::Cow;

/// Decode entity references in text or attribute content
///
/// Borrowed when the input contains no '&'.
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

fn decode_entities(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = memchr(b'&', rest) {
        out.extend_from_slice(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = memchr(b';', rest)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (semi, c)));

        match decoded {
            Some((semi, c)) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                rest = &rest[semi + 1..];
            }
            None => {
                out.push(b'&');
                rest = &rest[1..];
            }
        }
    }
    out.extend_from_slice(rest);
    out
}

/// Decode one entity body (between '&' and ';')
fn decode_entity(entity: &[u8]) -> Option<char> {
    match entity {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', b'x' | b'X', hex @ ..] => {
            let hex = std::str::from_utf8(hex).ok()?;
            char::from_u32(u32::from_str_radix(hex, 16).ok()?)
        }
        [b'#', dec @ ..] => {
            let dec = std::str::from_utf8(dec).ok()?;
            char::from_u32(dec.parse().ok()?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities_borrows() {
        let result = decode_text(b"RE-S-1800x4");
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_predefined_entities() {
        let result = decode_text(b"&lt;re0&gt; &amp; &quot;re1&quot; &apos;");
        assert_eq!(result.as_ref(), b"<re0> & \"re1\" '");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_text(b"&#82;&#x45;0").as_ref(), b"RE0");
        assert_eq!(std::str::from_utf8(&decode_text(b"&#xB0;C")).unwrap(), "\u{b0}C");
    }

    #[test]
    fn test_unknown_and_unterminated_kept() {
        assert_eq!(decode_text(b"&nbsp;").as_ref(), b"&nbsp;");
        assert_eq!(decode_text(b"a & b").as_ref(), b"a & b");
    }
}
