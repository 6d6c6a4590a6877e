//! Percent-encoding for path segments, template values and query strings.

use std::fmt::Write;

/// Characters left untouched when encoding a route path parameter.
///
/// This is the `encodeURIComponent` set: a value can never introduce a new
/// path segment or query delimiter.
const SEGMENT_SAFE: &[u8] = b"-_.!~*'()";

/// RFC 3986 reserved characters, allowed verbatim by `{+var}` and `{#var}`.
const RESERVED: &[u8] = b":/?#[]@!$&'()*+,;=";

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

fn push_encoded(out: &mut String, byte: u8) {
    // writing to a String cannot fail
    let _ = write!(out, "%{byte:02X}");
}

/// Encode a value for use as a single path segment.
///
/// ```rust
/// use halform::uri::encode::encode_segment;
///
/// assert_eq!(encode_segment("are/fire"), "are%2Ffire");
/// assert_eq!(encode_segment("Bob Smith"), "Bob%20Smith");
/// ```
#[must_use]
pub fn encode_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for &byte in value.as_bytes() {
        if byte.is_ascii_alphanumeric() || SEGMENT_SAFE.contains(&byte) {
            out.push(byte as char);
        } else {
            push_encoded(&mut out, byte);
        }
    }
    out
}

/// Encode a template value allowing only unreserved characters (RFC 6570 `U`).
#[must_use]
pub fn encode_unreserved(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for &byte in value.as_bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            push_encoded(&mut out, byte);
        }
    }
    out
}

/// Encode a template value allowing unreserved and reserved characters (RFC 6570 `U+R`).
///
/// Existing percent-encoded triplets are passed through unchanged.
#[must_use]
pub fn encode_reserved(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if byte == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            out.push_str(&value[i..i + 3]);
            i += 3;
            continue;
        }
        if is_unreserved(byte) || RESERVED.contains(&byte) {
            out.push(byte as char);
        } else {
            push_encoded(&mut out, byte);
        }
        i += 1;
    }
    out
}

/// Decode a percent-encoded query component, treating `+` as a space.
///
/// Malformed escapes are kept literally.
#[must_use]
pub fn decode_query_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                {
                    Some(decoded) => {
                        out.push(decoded);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
