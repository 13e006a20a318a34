// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Outgoing, client-side requests.

use messaggero_streams::stream::SharedStream;

use crate::error::InvalidArgument;
use crate::header_map::{HeaderMap, IntoHeaderValues};
use crate::message::Message;
use crate::method::Method;
use crate::uri::Uri;
use crate::version::HttpVersion;

/// An immutable request: the shared [`Message`] state plus a method, a target
/// URI and an optional explicit request target.
#[derive(Clone, Debug)]
pub struct Request {
    message: Message,
    method: Method,
    uri: Uri,

    // When set, returned verbatim from `request_target` instead of the form
    // derived from the URI.
    request_target: Option<String>,
}

impl Request {
    /// Creates a request for the given method and URI. When the URI carries a
    /// host, the `Host` header is seeded from it.
    pub fn new(method: Method, uri: Uri) -> Result<Self, InvalidArgument> {
        let request = Self {
            message: Message::new(),
            method,
            uri,
            request_target: None,
        };
        request.with_host_from_uri()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn with_method(&self, method: Method) -> Self {
        let mut request = self.clone();
        request.method = method;
        request
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns a new request aimed at the given URI.
    ///
    /// The `Host` header follows the new URI's host, unless `preserve_host`
    /// is set and a `Host` header is already present. A URI without a host
    /// leaves the header alone either way.
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Result<Self, InvalidArgument> {
        let mut request = self.clone();
        request.uri = uri;

        if preserve_host && request.message.has_header("Host") {
            return Ok(request);
        }

        request.with_host_from_uri()
    }

    /// The request target: the explicit override when one was set, otherwise
    /// origin-form derived from the URI. A URI without a path yields `/`.
    pub fn request_target(&self) -> String {
        if let Some(target) = &self.request_target {
            return target.clone();
        }

        let mut target = match self.uri.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        };

        if !self.uri.query().is_empty() {
            target.push('?');
            target.push_str(self.uri.query());
        }

        target
    }

    /// Sets an explicit request target, e.g. absolute-form for proxies or
    /// asterisk-form for `OPTIONS`. Whitespace anywhere in it is rejected.
    pub fn with_request_target(&self, target: &str) -> Result<Self, InvalidArgument> {
        if target.contains(char::is_whitespace) {
            return Err(InvalidArgument::RequestTargetContainsWhitespace);
        }

        let mut request = self.clone();
        request.request_target = Some(target.to_string());
        Ok(request)
    }

    fn with_host_from_uri(&self) -> Result<Self, InvalidArgument> {
        let mut request = self.clone();
        if let Some(host) = host_header_value(&request.uri) {
            request.message = request.message.with_header("Host", host)?;
        }
        Ok(request)
    }

    pub fn protocol_version(&self) -> HttpVersion {
        self.message.protocol_version()
    }

    pub fn with_protocol_version(&self, version: HttpVersion) -> Self {
        let mut request = self.clone();
        request.message = self.message.with_protocol_version(version);
        request
    }

    pub fn headers(&self) -> &HeaderMap {
        self.message.headers()
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.message.has_header(name)
    }

    pub fn header_values(&self, name: &str) -> &[String] {
        self.message.header_values(name)
    }

    pub fn header_line(&self, name: &str) -> String {
        self.message.header_line(name)
    }

    pub fn with_header(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, InvalidArgument> {
        let mut request = self.clone();
        request.message = self.message.with_header(name, values)?;
        Ok(request)
    }

    pub fn with_added_header(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, InvalidArgument> {
        let mut request = self.clone();
        request.message = self.message.with_added_header(name, values)?;
        Ok(request)
    }

    pub fn without_header(&self, name: &str) -> Self {
        let mut request = self.clone();
        request.message = self.message.without_header(name);
        request
    }

    pub fn in_header(&self, name: &str, values: &[&str]) -> bool {
        self.message.in_header(name, values)
    }

    pub fn in_header_any(&self, name: &str, values: &[&str]) -> bool {
        self.message.in_header_any(name, values)
    }

    pub fn body(&self) -> SharedStream {
        self.message.body()
    }

    pub fn with_body(&self, body: SharedStream) -> Self {
        let mut request = self.clone();
        request.message = self.message.with_body(body);
        request
    }
}

/// The `Host` header value a URI implies: `host[:port]` with the default port
/// elided, or `None` for a URI without a host.
pub(crate) fn host_header_value(uri: &Uri) -> Option<String> {
    if uri.host().is_empty() {
        return None;
    }

    let mut host = uri.host().to_string();
    if let Some(port) = uri.port() {
        host.push(':');
        host.push_str(&port.to_string());
    }

    Some(host)
}
