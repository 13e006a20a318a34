// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use strum_macros::AsRefStr;
use thiserror::Error;

/// An error raised by a validator when a caller-supplied value violates a
/// documented constraint.
///
/// Always raised before any state change: the value object an operation was
/// invoked on is left untouched, since every mutator builds its result from a
/// copy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error, AsRefStr)]
pub enum InvalidArgument {
    /// The header name was empty, or nothing but optional whitespace.
    #[error("header name is empty")]
    HeaderNameEmpty,

    #[error("header name contains a character outside the allowed set")]
    HeaderNameContainsInvalidCharacter,

    /// The header value was empty after trimming optional whitespace.
    #[error("header value is empty")]
    HeaderValueEmpty,

    /// The header value contains a character outside the field-value set.
    /// This notably rejects raw CR and LF, the header-injection vector.
    #[error("header value contains a character outside the field-value set")]
    HeaderValueContainsInvalidCharacter,

    /// Only `1.0` and `1.1` are representable.
    #[error("protocol version is not supported")]
    UnsupportedProtocolVersion,

    /// Only `http`, `https` and the empty scheme are representable.
    #[error("scheme is not supported")]
    UnsupportedScheme,

    /// The port component of a URI string was not an integer in `0..=65535`.
    #[error("port is outside the range 0-65535")]
    InvalidPort,

    #[error("token is empty")]
    TokenEmpty,

    #[error("token contains whitespace")]
    TokenContainsWhitespace,

    #[error("token contains a delimiter")]
    TokenContainsDelimiter,

    #[error("token contains a non-visible octet")]
    TokenContainsNonVisibleAscii,

    #[error("request target must not contain whitespace")]
    RequestTargetContainsWhitespace,

    #[error("status code must be between 100 and 599")]
    StatusCodeOutOfRange,

    /// A parsed body must be a JSON object, a JSON array, or absent.
    #[error("parsed body must be a structured value")]
    ParsedBodyNotStructured,
}
