// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This crate contains the messaggero HTTP message value objects: immutable
//! requests, server requests and responses, with the URI, header, version,
//! method and status types they are made of. Every mutator validates its
//! input, then returns a new value; bodies and upload descriptors are the
//! only state shared between copies, by handle.

pub mod error;
pub mod factory;
pub mod header_map;
pub mod message;
pub mod method;
pub mod request;
pub mod response;
pub mod server_request;
pub mod status;
pub mod syntax;
pub mod uri;
pub mod version;

pub use error::*;
pub use header_map::*;
pub use message::*;
pub use method::*;
pub use request::*;
pub use response::*;
pub use server_request::*;
pub use status::*;
pub use uri::*;
pub use version::*;
