// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::io;

use strum_macros::AsRefStr;
use thiserror::Error;

use crate::uploaded_file::UploadError;

/// An error raised when a stream or upload descriptor is in the wrong state
/// for the requested operation, or when the underlying I/O fails.
///
/// Validation errors on message values are a separate family; this one only
/// covers the mutable resources a message points at.
#[derive(Debug, Error, AsRefStr)]
pub enum StreamError {
    /// The underlying handle was detached or the stream was closed.
    #[error("the stream is detached")]
    Detached,

    #[error("the stream is not readable")]
    NotReadable,

    #[error("the stream is not writable")]
    NotWritable,

    #[error("the stream is not seekable")]
    NotSeekable,

    /// `move_to` was called on an upload descriptor that was already moved.
    /// Moving is one-shot.
    #[error("the uploaded file has already been moved")]
    AlreadyMoved,

    /// The upload carries a non-OK error code; its contents are unavailable.
    #[error("the upload failed: {}", .0.message())]
    UploadFailed(UploadError),

    /// The parent directory of a move target is missing.
    #[error("the target directory does not exist: {0}")]
    TargetDirectoryMissing(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
