// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StreamError;
use crate::stream::{self, FileStream, SharedStream};

/// Shared handle to an upload descriptor. Server requests hold these; moving
/// the file mutates the descriptor behind the handle, so all clones observe
/// the one-shot move.
pub type SharedUpload = Arc<Mutex<dyn Upload + Send>>;

/// Result code a transport attaches to a received file upload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UploadError {
    Ok,
    IniSize,
    FormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    Extension,
}

impl UploadError {
    /// Maps a transport-supplied numeric code onto the known set. Code 5 has
    /// never been assigned and is rejected along with everything above 8.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::IniSize),
            2 => Some(Self::FormSize),
            3 => Some(Self::Partial),
            4 => Some(Self::NoFile),
            6 => Some(Self::NoTmpDir),
            7 => Some(Self::CantWrite),
            8 => Some(Self::Extension),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::IniSize => 1,
            Self::FormSize => 2,
            Self::Partial => 3,
            Self::NoFile => 4,
            Self::NoTmpDir => 6,
            Self::CantWrite => 7,
            Self::Extension => 8,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Ok => "the file was uploaded successfully",
            Self::IniSize => "the uploaded file exceeds the configured size limit",
            Self::FormSize => "the uploaded file exceeds the size limit specified in the form",
            Self::Partial => "the file was only partially uploaded",
            Self::NoFile => "no file was uploaded",
            Self::NoTmpDir => "the temporary upload directory is missing",
            Self::CantWrite => "the file could not be written to disk",
            Self::Extension => "an extension interrupted the file upload",
        }
    }
}

/// The upload-descriptor capability: metadata about a client-submitted file,
/// byte access through a stream, and a one-shot move to a target path.
pub trait Upload: Debug + Send {
    /// Returns a stream over the uploaded bytes. Fails once the file has been
    /// moved or when the upload carries a non-OK error code.
    fn stream(&mut self) -> Result<SharedStream, StreamError>;

    /// Moves the uploaded file to `target`. One-shot: a second call fails
    /// with [`StreamError::AlreadyMoved`].
    fn move_to(&mut self, target: &Path) -> Result<(), StreamError>;

    /// Size in bytes as reported by the transport, if known.
    fn size(&self) -> Option<u64>;

    fn error(&self) -> UploadError;

    fn error_message(&self) -> &'static str {
        self.error().message()
    }

    /// Filename as supplied by the client. Untrusted.
    fn client_filename(&self) -> Option<&str>;

    /// Media type as supplied by the client. Untrusted.
    fn client_media_type(&self) -> Option<&str>;

    fn has_been_moved(&self) -> bool;
}

/// Wraps an upload descriptor in the shared handle type server requests hold.
pub fn shared_upload(upload: impl Upload + 'static) -> SharedUpload {
    Arc::new(Mutex::new(upload))
}

/// Locks a shared upload handle, recovering the guard when a previous holder
/// panicked mid-operation.
pub fn lock_upload(upload: &SharedUpload) -> MutexGuard<'_, dyn Upload + Send + 'static> {
    match upload.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug)]
enum UploadSource {
    Stream(SharedStream),
    File(PathBuf),
}

/// A received file upload backed by either an already-open stream or a
/// temporary file on disk.
#[derive(Debug)]
pub struct UploadedFile {
    source: UploadSource,
    size: Option<u64>,
    error: UploadError,
    moved: bool,
    client_filename: Option<String>,
    client_media_type: Option<String>,
}

const MOVE_CHUNK_SIZE: usize = 1024 * 1024;

impl UploadedFile {
    pub fn from_stream(
        stream: SharedStream,
        size: Option<u64>,
        error: UploadError,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Self {
        Self {
            source: UploadSource::Stream(stream),
            size,
            error,
            moved: false,
            client_filename,
            client_media_type,
        }
    }

    pub fn from_path(
        path: impl Into<PathBuf>,
        size: Option<u64>,
        error: UploadError,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Self {
        Self {
            source: UploadSource::File(path.into()),
            size,
            error,
            moved: false,
            client_filename,
            client_media_type,
        }
    }

    pub fn shared(self) -> SharedUpload {
        shared_upload(self)
    }

    fn ensure_pending(&self) -> Result<(), StreamError> {
        if self.moved {
            return Err(StreamError::AlreadyMoved);
        }

        if self.error != UploadError::Ok {
            return Err(StreamError::UploadFailed(self.error));
        }

        Ok(())
    }
}

impl Upload for UploadedFile {
    fn stream(&mut self) -> Result<SharedStream, StreamError> {
        self.ensure_pending()?;

        match &self.source {
            UploadSource::Stream(handle) => Ok(handle.clone()),
            UploadSource::File(path) => {
                let handle = stream::shared(FileStream::open_read_write(path)?);
                self.source = UploadSource::Stream(handle.clone());
                Ok(handle)
            }
        }
    }

    fn move_to(&mut self, target: &Path) -> Result<(), StreamError> {
        self.ensure_pending()?;

        let directory = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !directory.is_dir() {
            return Err(StreamError::TargetDirectoryMissing(directory.display().to_string()));
        }

        match &self.source {
            UploadSource::File(path) => fs::rename(path, target)?,
            UploadSource::Stream(handle) => {
                let mut output = fs::File::create(target)?;
                let mut stream = stream::lock(handle);

                if stream.is_seekable() {
                    stream.rewind()?;
                }

                loop {
                    let chunk = stream.read(MOVE_CHUNK_SIZE)?;
                    if chunk.is_empty() {
                        break;
                    }
                    output.write_all(&chunk)?;
                }
            }
        }

        self.moved = true;
        Ok(())
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn error(&self) -> UploadError {
        self.error
    }

    fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    fn has_been_moved(&self) -> bool {
        self.moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;
    use rstest::rstest;

    fn upload_with_contents(contents: &str) -> UploadedFile {
        UploadedFile::from_stream(
            MemoryStream::shared(contents),
            Some(contents.len() as u64),
            UploadError::Ok,
            Some(String::from("report.txt")),
            Some(String::from("text/plain")),
        )
    }

    #[rstest]
    #[case(0, Some(UploadError::Ok))]
    #[case(1, Some(UploadError::IniSize))]
    #[case(4, Some(UploadError::NoFile))]
    #[case(5, None)]
    #[case(8, Some(UploadError::Extension))]
    #[case(9, None)]
    #[case(255, None)]
    fn test_upload_error_from_code(#[case] code: u8, #[case] expected: Option<UploadError>) {
        assert_eq!(UploadError::from_code(code), expected);
    }

    #[test]
    fn test_upload_error_codes_round_trip() {
        for code in 0..=8u8 {
            if let Some(error) = UploadError::from_code(code) {
                assert_eq!(error.code(), code);
                assert!(!error.message().is_empty());
            }
        }
    }

    #[test]
    fn test_metadata_accessors() {
        let upload = upload_with_contents("abc");
        assert_eq!(upload.size(), Some(3));
        assert_eq!(upload.error(), UploadError::Ok);
        assert_eq!(upload.client_filename(), Some("report.txt"));
        assert_eq!(upload.client_media_type(), Some("text/plain"));
        assert!(!upload.has_been_moved());
    }

    #[test]
    fn test_move_to_writes_stream_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("moved.txt");

        let mut upload = upload_with_contents("uploaded bytes");
        upload.move_to(&target).unwrap();

        assert!(upload.has_been_moved());
        assert_eq!(std::fs::read(&target).unwrap(), b"uploaded bytes");
    }

    #[test]
    fn test_move_is_one_shot() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("moved.txt");

        let mut upload = upload_with_contents("x");
        upload.move_to(&target).unwrap();

        assert!(matches!(upload.move_to(&target), Err(StreamError::AlreadyMoved)));
        assert!(matches!(upload.stream(), Err(StreamError::AlreadyMoved)));
    }

    #[test]
    fn test_move_rejects_missing_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nope").join("moved.txt");

        let mut upload = upload_with_contents("x");
        assert!(matches!(
            upload.move_to(&target),
            Err(StreamError::TargetDirectoryMissing(_))
        ));
        assert!(!upload.has_been_moved());
    }

    #[test]
    fn test_failed_upload_denies_stream_and_move() {
        let mut upload = UploadedFile::from_stream(
            MemoryStream::shared(""),
            None,
            UploadError::Partial,
            None,
            None,
        );

        assert!(matches!(
            upload.stream(),
            Err(StreamError::UploadFailed(UploadError::Partial))
        ));
        assert!(matches!(
            upload.move_to(Path::new("anywhere")),
            Err(StreamError::UploadFailed(UploadError::Partial))
        ));
        assert_eq!(upload.error_message(), UploadError::Partial.message());
    }

    #[test]
    fn test_shared_handle_observes_the_move() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("moved.txt");

        let handle = upload_with_contents("through the handle").shared();
        let other = handle.clone();

        lock_upload(&handle).move_to(&target).unwrap();

        assert!(lock_upload(&other).has_been_moved());
        assert_eq!(std::fs::read(&target).unwrap(), b"through the handle");
    }

    #[test]
    fn test_move_renames_path_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tmp_upload");
        let target = dir.path().join("final.bin");
        std::fs::write(&source, b"on disk").unwrap();

        let mut upload = UploadedFile::from_path(&source, Some(7), UploadError::Ok, None, None);
        upload.move_to(&target).unwrap();

        assert!(!source.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"on disk");
    }
}
