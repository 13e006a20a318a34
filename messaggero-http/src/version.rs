// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidArgument;

/// The protocol version of a message, written as `major.minor`.
///
/// Only the HTTP/1.x line is representable, since these value objects carry
/// its textual header semantics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    Http10,

    #[default]
    Http11,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "1.0",
            Self::Http11 => "1.1",
        }
    }
}

impl FromStr for HttpVersion {
    type Err = InvalidArgument;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "1.0" => Ok(Self::Http10),
            "1.1" => Ok(Self::Http11),
            _ => Err(InvalidArgument::UnsupportedProtocolVersion),
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
