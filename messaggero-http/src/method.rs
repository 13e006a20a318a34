// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt;
use std::str::FromStr;

use phf::phf_map;

use crate::error::InvalidArgument;
use crate::syntax::validate_token;

/// The request method.
///
/// Methods are case-sensitive tokens. The well-known ones get their own
/// variant; anything else that is a valid token is carried verbatim in
/// [`Method::Other`], so extension methods never lose their exact spelling.
///
/// # References
/// * [RFC 9110 § 9](https://www.rfc-editor.org/rfc/rfc9110.html#section-9)
/// * [RFC 4918](https://www.rfc-editor.org/rfc/rfc4918.html)
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    Connect,
    Copy,
    Delete,

    #[default]
    Get,
    Head,
    Lock,
    Mkcol,
    Move,
    Options,
    Patch,
    Post,
    Propfind,
    Proppatch,
    Put,
    Trace,
    Unlock,

    Other(String),
}

static METHOD_MAP: phf::Map<&'static str, Method> = phf_map!(
    "CONNECT" => Method::Connect,
    "COPY" => Method::Copy,
    "DELETE" => Method::Delete,
    "GET" => Method::Get,
    "HEAD" => Method::Head,
    "LOCK" => Method::Lock,
    "MKCOL" => Method::Mkcol,
    "MOVE" => Method::Move,
    "OPTIONS" => Method::Options,
    "PATCH" => Method::Patch,
    "POST" => Method::Post,
    "PROPFIND" => Method::Propfind,
    "PROPPATCH" => Method::Proppatch,
    "PUT" => Method::Put,
    "TRACE" => Method::Trace,
    "UNLOCK" => Method::Unlock,
);

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connect => "CONNECT",
            Self::Copy => "COPY",
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Lock => "LOCK",
            Self::Mkcol => "MKCOL",
            Self::Move => "MOVE",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Propfind => "PROPFIND",
            Self::Proppatch => "PROPPATCH",
            Self::Put => "PUT",
            Self::Trace => "TRACE",
            Self::Unlock => "UNLOCK",

            Self::Other(method) => method,
        }
    }
}

impl FromStr for Method {
    type Err = InvalidArgument;

    /// Parses a method token. Case matters: `get` is not [`Method::Get`] but
    /// an extension method spelled `get`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if let Some(method) = METHOD_MAP.get(input) {
            return Ok(method.clone());
        }

        validate_token(input)?;
        Ok(Self::Other(input.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("GET", Method::Get)]
    #[case("POST", Method::Post)]
    #[case("DELETE", Method::Delete)]
    #[case("PROPFIND", Method::Propfind)]
    fn test_parse_well_known(#[case] input: &str, #[case] expected: Method) {
        assert_eq!(input.parse::<Method>().unwrap(), expected);
        assert_eq!(expected.as_str(), input);
    }

    #[rstest]
    #[case("get")]
    #[case("M-SEARCH")]
    #[case("PURGE")]
    fn test_parse_extension_method_preserves_spelling(#[case] input: &str) {
        let method = input.parse::<Method>().unwrap();
        assert_eq!(method, Method::Other(input.to_string()));
        assert_eq!(method.as_str(), input);
    }

    #[rstest]
    #[case("", InvalidArgument::TokenEmpty)]
    #[case("GE T", InvalidArgument::TokenContainsWhitespace)]
    #[case("GET\r\n", InvalidArgument::TokenContainsNonVisibleAscii)]
    #[case("GET/2", InvalidArgument::TokenContainsDelimiter)]
    fn test_parse_invalid_tokens(#[case] input: &str, #[case] expected: InvalidArgument) {
        assert_eq!(input.parse::<Method>().unwrap_err(), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(Method::Options.to_string(), "OPTIONS");
        assert_eq!(Method::Other("M-SEARCH".to_string()).to_string(), "M-SEARCH");
    }
}
