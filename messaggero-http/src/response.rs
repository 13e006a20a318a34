// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use messaggero_streams::stream::SharedStream;

use crate::error::InvalidArgument;
use crate::header_map::{HeaderMap, IntoHeaderValues};
use crate::message::Message;
use crate::status::{is_valid_code, reason_phrase};
use crate::version::HttpVersion;

/// An immutable response: the shared [`Message`] state plus a status code and
/// reason phrase.
#[derive(Clone, Debug)]
pub struct Response {
    message: Message,
    status: u16,
    reason: String,
}

impl Response {
    /// Creates a response with the given status and its registered reason
    /// phrase. Codes outside `100..=599` are rejected.
    pub fn new(status: u16) -> Result<Self, InvalidArgument> {
        if !is_valid_code(status) {
            return Err(InvalidArgument::StatusCodeOutOfRange);
        }

        Ok(Self {
            message: Message::new(),
            status,
            reason: reason_phrase(status).to_string(),
        })
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// The reason phrase. Possibly empty: unregistered codes without a
    /// caller-supplied phrase have none.
    pub fn reason_phrase(&self) -> &str {
        &self.reason
    }

    /// Returns a new response with the given status. A `None` or empty reason
    /// falls back to the registered phrase for the code.
    pub fn with_status(&self, status: u16, reason: Option<&str>) -> Result<Self, InvalidArgument> {
        if !is_valid_code(status) {
            return Err(InvalidArgument::StatusCodeOutOfRange);
        }

        let mut response = self.clone();
        response.status = status;
        response.reason = match reason {
            Some(reason) if !reason.is_empty() => reason.to_string(),
            _ => reason_phrase(status).to_string(),
        };
        Ok(response)
    }

    pub fn protocol_version(&self) -> HttpVersion {
        self.message.protocol_version()
    }

    pub fn with_protocol_version(&self, version: HttpVersion) -> Self {
        let mut response = self.clone();
        response.message = self.message.with_protocol_version(version);
        response
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
        let mut response = self.clone();
        response.message = self.message.with_header(name, values)?;
        Ok(response)
    }

    pub fn with_added_header(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, InvalidArgument> {
        let mut response = self.clone();
        response.message = self.message.with_added_header(name, values)?;
        Ok(response)
    }

    pub fn without_header(&self, name: &str) -> Self {
        let mut response = self.clone();
        response.message = self.message.without_header(name);
        response
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
        let mut response = self.clone();
        response.message = self.message.with_body(body);
        response
    }
}

impl Default for Response {
    /// A `200 OK` response.
    fn default() -> Self {
        Self {
            message: Message::new(),
            status: 200,
            reason: reason_phrase(200).to_string(),
        }
    }
}
