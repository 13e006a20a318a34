// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Character-level validation shared by the header map, the URI and the
//! request-line values.
//!
//! # References
//! * [RFC 9110](https://www.rfc-editor.org/rfc/rfc9110.html)
//! * [RFC 9112](https://www.rfc-editor.org/rfc/rfc9112.html)

use crate::error::InvalidArgument;

/// Is the byte allowed in a header field name?
///
/// ```text
/// field-name     = 1*( ALPHA / DIGIT / "'" / "`" / "#" / "$" / "%" / "&"
///                / "*" / "+" / "." / "^" / "_" / "|" / "~" / "!" / "-" )
/// ```
#[inline]
pub fn is_header_name_character(byte: u8) -> bool {
    matches!(byte,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
        | b'\'' | b'`' | b'#' | b'$' | b'%' | b'&' | b'*' | b'+' | b'.'
        | b'^' | b'_' | b'|' | b'~' | b'!' | b'-')
}

/// Is the byte allowed in a header field value? Visible US-ASCII plus SP and
/// HTAB; CR, LF and every other control character are excluded.
///
/// ```text
/// field-value    = *( field-vchar / SP / HTAB )
/// field-vchar    = VCHAR
/// ```
#[inline]
pub fn is_field_value_character(byte: u8) -> bool {
    is_visible_character(byte) || byte == b' ' || byte == b'\t'
}

/// Is the byte a visible (printing) US-ASCII character?
///
/// ```text
/// VCHAR          =  %x21-7E
/// ```
#[inline]
pub fn is_visible_character(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7E)
}

/// Strips optional whitespace from both ends.
///
/// ```text
/// OWS            = *( SP / HTAB )
/// ```
pub fn trim_ows(value: &str) -> &str {
    value.trim_matches(|character| character == ' ' || character == '\t')
}

/// Validates a header field name, returning it with surrounding OWS removed.
pub fn validate_header_name(name: &str) -> Result<&str, InvalidArgument> {
    let name = trim_ows(name);

    if name.is_empty() {
        return Err(InvalidArgument::HeaderNameEmpty);
    }

    if name.bytes().all(is_header_name_character) {
        Ok(name)
    } else {
        Err(InvalidArgument::HeaderNameContainsInvalidCharacter)
    }
}

/// Validates a header field value, returning it with surrounding OWS removed.
/// Values that are empty after trimming are rejected.
pub fn validate_field_value(value: &str) -> Result<&str, InvalidArgument> {
    let value = trim_ows(value);

    if value.is_empty() {
        return Err(InvalidArgument::HeaderValueEmpty);
    }

    if value.bytes().all(is_field_value_character) {
        Ok(value)
    } else {
        Err(InvalidArgument::HeaderValueContainsInvalidCharacter)
    }
}

/// Validates an HTTP token, the grammar method names must follow.
///
/// ```text
/// token          = 1*tchar
/// ```
pub fn validate_token(value: &str) -> Result<(), InvalidArgument> {
    if value.is_empty() {
        return Err(InvalidArgument::TokenEmpty);
    }

    for byte in value.bytes() {
        validate_token_character(byte)?;
    }

    Ok(())
}

/// Validates a single token character.
///
/// ```text
/// tchar          = "!" / "#" / "$" / "%" / "&" / "'" / "*"
///                / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~"
///                / DIGIT / ALPHA
///                ; any VCHAR, except delimiters
/// ```
fn validate_token_character(byte: u8) -> Result<(), InvalidArgument> {
    match byte {
        b' ' | b'\t' => Err(InvalidArgument::TokenContainsWhitespace),

        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'|' | b'~' => Ok(()),

        b'0'..=b'9' => Ok(()),
        b'A'..=b'Z' => Ok(()),
        b'a'..=b'z' => Ok(()),

        b'"' | b'(' | b')' | b',' | b'/' | b':' | b';' | b'<' | b'=' | b'>' |
        b'?' | b'@' | b'[' | b'\\' | b']' | b'{' | b'}' => Err(InvalidArgument::TokenContainsDelimiter),

        _ => Err(InvalidArgument::TokenContainsNonVisibleAscii),
    }
}
