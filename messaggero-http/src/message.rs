// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The state every message kind shares: protocol version, headers and body.
//!
//! [`Message`] is embedded by [`Request`](crate::request::Request),
//! [`ServerRequest`](crate::server_request::ServerRequest) and
//! [`Response`](crate::response::Response), which forward these operations
//! next to their own.

use once_cell::sync::OnceCell;

use messaggero_streams::stream::{MemoryStream, SharedStream};

use crate::error::InvalidArgument;
use crate::header_map::{HeaderMap, IntoHeaderValues};
use crate::version::HttpVersion;

/// An immutable protocol message. Mutators return a new value; the body is
/// the one exception to value semantics, shared by handle across copies.
#[derive(Clone, Debug, Default)]
pub struct Message {
    version: HttpVersion,
    headers: HeaderMap,

    // Lazily initialized, so constructing a message never allocates a body
    // that nothing ever reads.
    body: OnceCell<SharedStream>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol_version(&self) -> HttpVersion {
        self.version
    }

    pub fn with_protocol_version(&self, version: HttpVersion) -> Self {
        let mut message = self.clone();
        message.version = version;
        message
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers.values(name)
    }

    pub fn header_line(&self, name: &str) -> String {
        self.headers.line(name)
    }

    pub fn with_header(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, InvalidArgument> {
        let mut message = self.clone();
        message.headers = self.headers.set(name, values)?;
        Ok(message)
    }

    pub fn with_added_header(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, InvalidArgument> {
        let mut message = self.clone();
        message.headers = self.headers.add(name, values)?;
        Ok(message)
    }

    pub fn without_header(&self, name: &str) -> Self {
        let mut message = self.clone();
        message.headers = self.headers.remove(name);
        message
    }

    /// Whether the header exists and holds every one of the given values,
    /// compared exactly. An absent header is `false` even for an empty list.
    pub fn in_header(&self, name: &str, values: &[&str]) -> bool {
        if !self.headers.contains(name) {
            return false;
        }

        let held = self.headers.values(name);
        values.iter().all(|value| held.iter().any(|h| h == value))
    }

    /// Whether the header holds at least one of the given values.
    pub fn in_header_any(&self, name: &str, values: &[&str]) -> bool {
        let held = self.headers.values(name);
        values.iter().any(|value| held.iter().any(|h| h == value))
    }

    /// The body handle. A message that was never given a body lazily creates
    /// an empty in-memory stream the first time someone asks.
    pub fn body(&self) -> SharedStream {
        self.body.get_or_init(|| MemoryStream::shared("")).clone()
    }

    pub fn with_body(&self, body: SharedStream) -> Self {
        Self {
            version: self.version,
            headers: self.headers.clone(),
            body: OnceCell::with_value(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use messaggero_streams::stream::lock;

    #[test]
    fn test_default_message() {
        let message = Message::new();
        assert_eq!(message.protocol_version(), HttpVersion::Http11);
        assert!(message.headers().is_empty());
    }

    #[test]
    fn test_with_protocol_version() {
        let message = Message::new();
        let downgraded = message.with_protocol_version(HttpVersion::Http10);

        assert_eq!(message.protocol_version(), HttpVersion::Http11);
        assert_eq!(downgraded.protocol_version(), HttpVersion::Http10);
    }

    #[test]
    fn test_header_mutators_forward_to_the_map() {
        let message = Message::new()
            .with_header("Accept", "text/html").unwrap()
            .with_added_header("accept", "application/json").unwrap();

        assert!(message.has_header("ACCEPT"));
        assert_eq!(message.header_line("accept"), "text/html, application/json");

        let message = message.without_header("Accept");
        assert!(!message.has_header("accept"));
        assert_eq!(message.header_line("accept"), "");
    }

    #[test]
    fn test_in_header_requires_all_values() {
        let message = Message::new()
            .with_header("Accept", ["text/html", "application/json"]).unwrap();

        assert!(message.in_header("accept", &["text/html"]));
        assert!(message.in_header("accept", &["text/html", "application/json"]));
        assert!(!message.in_header("accept", &["text/html", "text/plain"]));
        assert!(message.in_header("accept", &[]));
        assert!(!message.in_header("missing", &["text/html"]));
        assert!(!message.in_header("missing", &[]));
    }

    #[test]
    fn test_in_header_any_requires_one_value() {
        let message = Message::new()
            .with_header("Accept", ["text/html", "application/json"]).unwrap();

        assert!(message.in_header_any("accept", &["text/plain", "text/html"]));
        assert!(!message.in_header_any("accept", &["text/plain"]));
        assert!(!message.in_header_any("accept", &[]));
    }

    #[test]
    fn test_body_is_lazily_an_empty_stream() {
        let message = Message::new();
        let body = message.body();
        assert_eq!(lock(&body).size(), Some(0));

        // The same handle is handed out on every call.
        assert!(std::sync::Arc::ptr_eq(&body, &message.body()));
    }

    #[test]
    fn test_with_body_replaces_the_handle() {
        let message = Message::new().with_body(MemoryStream::shared("payload"));
        assert_eq!(lock(&message.body()).full_contents(), b"payload");
    }

    #[test]
    fn test_clones_share_the_body_handle() {
        let message = Message::new().with_body(MemoryStream::shared(""));
        let copy = message.with_header("Host", "example.com").unwrap();

        lock(&message.body()).write(b"written once").unwrap();
        assert_eq!(lock(&copy.body()).full_contents(), b"written once");
    }
}
