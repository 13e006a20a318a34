// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Incoming, server-side requests.
//!
//! On top of the client-side [`Request`] state, a server request carries the
//! bags a server populates while accepting the connection: server parameters,
//! cookies, query parameters, form fields, upload descriptors and
//! routing/middleware attributes.

use hashbrown::HashMap;
use serde_json::Value;

use messaggero_streams::stream::{self, SharedStream};
use messaggero_streams::uploaded_file::SharedUpload;

use crate::error::InvalidArgument;
use crate::header_map::{HeaderMap, IntoHeaderValues};
use crate::method::Method;
use crate::request::Request;
use crate::uri::Uri;
use crate::version::HttpVersion;

/// An immutable server-side request.
///
/// The bags follow the same copy-on-write protocol as everything else; only
/// the body stream and the upload descriptors are shared by handle.
#[derive(Clone, Debug)]
pub struct ServerRequest {
    request: Request,
    server_params: HashMap<String, String>,
    cookie_params: HashMap<String, String>,

    // When set and non-empty, returned instead of the pairs decoded from the
    // URI query.
    query_params: Option<HashMap<String, String>>,

    form_params: HashMap<String, String>,
    uploaded_files: HashMap<String, SharedUpload>,
    attributes: HashMap<String, Value>,

    // When set, wins over body negotiation. Always an object or an array.
    parsed_body: Option<Value>,
}

impl ServerRequest {
    pub fn new(method: Method, uri: Uri) -> Result<Self, InvalidArgument> {
        Ok(Self {
            request: Request::new(method, uri)?,
            server_params: HashMap::new(),
            cookie_params: HashMap::new(),
            query_params: None,
            form_params: HashMap::new(),
            uploaded_files: HashMap::new(),
            attributes: HashMap::new(),
            parsed_body: None,
        })
    }

    /// The server-provided parameters, e.g. a CGI-style environment. There is
    /// deliberately no mutator: these describe how the request arrived.
    pub fn server_params(&self) -> &HashMap<String, String> {
        &self.server_params
    }

    pub(crate) fn with_server_params(&self, params: HashMap<String, String>) -> Self {
        let mut request = self.clone();
        request.server_params = params;
        request
    }

    pub fn cookie_params(&self) -> &HashMap<String, String> {
        &self.cookie_params
    }

    pub fn with_cookie_params(&self, cookies: HashMap<String, String>) -> Self {
        let mut request = self.clone();
        request.cookie_params = cookies;
        request
    }

    /// The query parameters: a non-empty map set via
    /// [`ServerRequest::with_query_params`], otherwise the pairs decoded from
    /// the URI's query string on each call. An empty override counts as
    /// unset.
    pub fn query_params(&self) -> HashMap<String, String> {
        match &self.query_params {
            Some(params) if !params.is_empty() => params.clone(),
            _ => parse_query(self.request.uri().query()),
        }
    }

    pub fn with_query_params(&self, params: HashMap<String, String>) -> Self {
        let mut request = self.clone();
        request.query_params = Some(params);
        request
    }

    /// The decoded form fields of a `POST` body, as provided by whoever
    /// parsed the body (see [`ServerRequest::with_form_params`]).
    pub fn form_params(&self) -> &HashMap<String, String> {
        &self.form_params
    }

    /// Injects decoded form fields. Body parsing happens upstream; this type
    /// only negotiates which representation [`ServerRequest::parsed_body`]
    /// hands out.
    pub fn with_form_params(&self, params: HashMap<String, String>) -> Self {
        let mut request = self.clone();
        request.form_params = params;
        request
    }

    pub fn uploaded_files(&self) -> &HashMap<String, SharedUpload> {
        &self.uploaded_files
    }

    pub fn with_uploaded_files(&self, files: HashMap<String, SharedUpload>) -> Self {
        let mut request = self.clone();
        request.uploaded_files = files;
        request
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn with_attribute(&self, name: &str, value: Value) -> Self {
        let mut request = self.clone();
        request.attributes.insert(name.to_string(), value);
        request
    }

    /// Removing an absent attribute is a no-op.
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut request = self.clone();
        request.attributes.remove(name);
        request
    }

    /// The structured representation of the body, negotiated by content type:
    ///
    /// 1. an explicit value set via [`ServerRequest::with_parsed_body`];
    /// 2. for form submissions (`application/x-www-form-urlencoded` and
    ///    `multipart/form-data`), the injected form fields as an object;
    /// 3. for `application/json`, the body decoded as JSON, when it decodes
    ///    to an object or an array;
    /// 4. otherwise `None`.
    pub fn parsed_body(&self) -> Option<Value> {
        if let Some(body) = &self.parsed_body {
            return Some(body.clone());
        }

        match self.content_media_type().as_str() {
            "application/x-www-form-urlencoded" | "multipart/form-data" => {
                let fields = self
                    .form_params
                    .iter()
                    .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                    .collect();
                Some(Value::Object(fields))
            }

            "application/json" => {
                let contents = stream::lock(&self.body()).full_contents();
                serde_json::from_slice::<Value>(&contents)
                    .ok()
                    .filter(|value| value.is_object() || value.is_array())
            }

            _ => None,
        }
    }

    /// Sets the explicit parsed body. Only structured values are accepted:
    /// an object, an array, or `None` to fall back to negotiation.
    pub fn with_parsed_body(&self, body: Option<Value>) -> Result<Self, InvalidArgument> {
        if let Some(value) = &body {
            if !value.is_object() && !value.is_array() {
                return Err(InvalidArgument::ParsedBodyNotStructured);
            }
        }

        let mut request = self.clone();
        request.parsed_body = body;
        Ok(request)
    }

    /// The media type of the body, lowercased and stripped of parameters.
    /// Empty when no `Content-Type` header is present.
    fn content_media_type(&self) -> String {
        let line = self.header_line("Content-Type");
        let media_type = match line.split_once(';') {
            Some((media_type, _)) => media_type,
            None => line.as_str(),
        };
        media_type.trim().to_ascii_lowercase()
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn with_method(&self, method: Method) -> Self {
        let mut request = self.clone();
        request.request = self.request.with_method(method);
        request
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Result<Self, InvalidArgument> {
        let mut request = self.clone();
        request.request = self.request.with_uri(uri, preserve_host)?;
        Ok(request)
    }

    pub fn request_target(&self) -> String {
        self.request.request_target()
    }

    pub fn with_request_target(&self, target: &str) -> Result<Self, InvalidArgument> {
        let mut request = self.clone();
        request.request = self.request.with_request_target(target)?;
        Ok(request)
    }

    pub fn protocol_version(&self) -> HttpVersion {
        self.request.protocol_version()
    }

    pub fn with_protocol_version(&self, version: HttpVersion) -> Self {
        let mut request = self.clone();
        request.request = self.request.with_protocol_version(version);
        request
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.request.has_header(name)
    }

    pub fn header_values(&self, name: &str) -> &[String] {
        self.request.header_values(name)
    }

    pub fn header_line(&self, name: &str) -> String {
        self.request.header_line(name)
    }

    pub fn with_header(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, InvalidArgument> {
        let mut request = self.clone();
        request.request = self.request.with_header(name, values)?;
        Ok(request)
    }

    pub fn with_added_header(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, InvalidArgument> {
        let mut request = self.clone();
        request.request = self.request.with_added_header(name, values)?;
        Ok(request)
    }

    pub fn without_header(&self, name: &str) -> Self {
        let mut request = self.clone();
        request.request = self.request.without_header(name);
        request
    }

    pub fn in_header(&self, name: &str, values: &[&str]) -> bool {
        self.request.in_header(name, values)
    }

    pub fn in_header_any(&self, name: &str, values: &[&str]) -> bool {
        self.request.in_header_any(name, values)
    }

    pub fn body(&self) -> SharedStream {
        self.request.body()
    }

    pub fn with_body(&self, body: SharedStream) -> Self {
        let mut request = self.clone();
        request.request = self.request.with_body(body);
        request
    }
}

/// Decodes an `application/x-www-form-urlencoded` query string into a flat
/// name/value map. Later repeats of a name overwrite earlier ones; a pair
/// without `=` decodes to an empty value.
pub(crate) fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name, value),
            None => (pair, ""),
        };

        params.insert(decode_form_component(name), decode_form_component(value));
    }

    params
}

/// Form decoding on top of percent-decoding: `+` means space. Invalid UTF-8
/// after decoding leaves the component as it came in.
fn decode_form_component(component: &str) -> String {
    let component = component.replace('+', " ");
    match urlencoding::decode(&component) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => component,
    }
}
