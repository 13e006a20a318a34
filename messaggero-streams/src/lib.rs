// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This crate contains the byte-stream and upload-descriptor capabilities the
//! messaggero HTTP value objects are built on. A message holds a
//! [`SharedStream`] body handle; a server request holds [`SharedUpload`]
//! descriptors. The values themselves are immutable; these handles are the
//! only mutable resources they point at, and each is owned by a single
//! request/response lifecycle at a time.

pub mod error;
pub mod stream;
pub mod uploaded_file;

pub use error::*;
pub use stream::*;
pub use uploaded_file::*;
