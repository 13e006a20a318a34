// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Building a [`ServerRequest`] from a CGI-style server environment.
//!
//! The environment maps are taken as data, not read from the process: the
//! host program collects them however its transport works and hands them in
//! through [`ServerEnv`].

use hashbrown::HashMap;

use messaggero_streams::uploaded_file::SharedUpload;

use crate::error::InvalidArgument;
use crate::method::Method;
use crate::server_request::ServerRequest;
use crate::uri::Uri;
use crate::version::HttpVersion;

/// Everything a transport hands over about one received request.
#[derive(Clone, Debug, Default)]
pub struct ServerEnv {
    /// CGI-style variables: `REQUEST_METHOD`, `HTTP_*`, `SERVER_NAME`, ...
    pub server: HashMap<String, String>,
    pub cookies: HashMap<String, String>,

    /// Pre-decoded query parameters. When empty, the request decodes its own
    /// from the URI.
    pub query: HashMap<String, String>,

    /// Decoded form fields of the body, when the transport parsed it.
    pub form: HashMap<String, String>,
    pub uploads: HashMap<String, SharedUpload>,
}

/// Builds a server request out of the environment: method, URI, protocol
/// version and headers come from the server variables, the bags are carried
/// over as-is. The body starts empty; attach one afterwards with
/// [`ServerRequest::with_body`].
pub fn server_request_from_env(env: &ServerEnv) -> Result<ServerRequest, InvalidArgument> {
    let method = match env.server.get("REQUEST_METHOD") {
        Some(method) => method.parse()?,
        None => Method::Get,
    };

    let mut request = ServerRequest::new(method, uri_from_server(&env.server)?)?
        .with_protocol_version(protocol_version_from_server(&env.server)?)
        .with_server_params(env.server.clone())
        .with_cookie_params(env.cookies.clone())
        .with_form_params(env.form.clone())
        .with_uploaded_files(env.uploads.clone());

    if !env.query.is_empty() {
        request = request.with_query_params(env.query.clone());
    }

    for (name, value) in headers_from_server(&env.server) {
        request = request.with_header(&name, value)?;
    }

    Ok(request)
}

/// Collects the header fields hidden in the server variables: every `HTTP_*`
/// variable, plus the `CONTENT_*` ones CGI strips the prefix from.
pub fn headers_from_server(server: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut headers = Vec::new();

    for (name, value) in server {
        if value.is_empty() {
            continue;
        }

        if let Some(name) = name.strip_prefix("HTTP_") {
            headers.push((header_name_from_env(name), value.clone()));
        } else if name.starts_with("CONTENT_") {
            headers.push((header_name_from_env(name), value.clone()));
        }
    }

    headers
}

/// `CONTENT_TYPE` becomes `Content-Type`, `HTTP_ACCEPT_LANGUAGE` (minus its
/// prefix) becomes `Accept-Language`.
fn header_name_from_env(name: &str) -> String {
    let mut header_name = String::with_capacity(name.len());

    for (index, segment) in name.split('_').enumerate() {
        if index != 0 {
            header_name.push('-');
        }

        let mut characters = segment.chars();
        if let Some(first) = characters.next() {
            header_name.push(first.to_ascii_uppercase());
        }
        for character in characters {
            header_name.push(character.to_ascii_lowercase());
        }
    }

    header_name
}

/// Reads `SERVER_PROTOCOL`, e.g. `HTTP/1.1`. Absent means HTTP/1.1; present
/// but outside the 1.x line is an error.
fn protocol_version_from_server(server: &HashMap<String, String>) -> Result<HttpVersion, InvalidArgument> {
    match server.get("SERVER_PROTOCOL") {
        Some(protocol) => protocol.strip_prefix("HTTP/").unwrap_or(protocol).parse(),
        None => Ok(HttpVersion::default()),
    }
}

/// Reconstructs the request URI.
///
/// The scheme follows the `HTTPS` flag. The authority prefers `HTTP_HOST`
/// (which may carry its own port), then `SERVER_NAME`/`SERVER_ADDR` with
/// `SERVER_PORT`. Path and query come from `REQUEST_URI`, with `QUERY_STRING`
/// as the query fallback.
fn uri_from_server(server: &HashMap<String, String>) -> Result<Uri, InvalidArgument> {
    let secure = server
        .get("HTTPS")
        .is_some_and(|flag| !flag.is_empty() && !flag.eq_ignore_ascii_case("off"));
    let scheme = if secure { "https" } else { "http" };

    let mut authority = String::new();
    if let Some(host) = server.get("HTTP_HOST") {
        authority = host.clone();
    } else if let Some(name) = server.get("SERVER_NAME").or_else(|| server.get("SERVER_ADDR")) {
        authority = name.clone();
        if let Some(port) = server.get("SERVER_PORT") {
            if !port.is_empty() {
                authority.push(':');
                authority.push_str(port);
            }
        }
    }

    let mut target = match server.get("REQUEST_URI") {
        Some(request_uri) => request_uri.clone(),
        None => String::from("/"),
    };
    if !target.contains('?') {
        if let Some(query) = server.get("QUERY_STRING") {
            if !query.is_empty() {
                target.push('?');
                target.push_str(query);
            }
        }
    }

    if authority.is_empty() {
        Uri::parse(&target)
    } else {
        Uri::parse(&format!("{scheme}://{authority}{target}"))
    }
}
