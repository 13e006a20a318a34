// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StreamError;

/// Shared handle to a body stream.
///
/// Cloning a message value clones the handle, not the bytes: all clones
/// observe the same cursor. A handle is owned by a single logical
/// request/response lifecycle at a time; it is not meant for concurrent
/// read/seek/write from multiple owners.
pub type SharedStream = Arc<Mutex<dyn Stream + Send>>;

/// The byte-stream capability message bodies are built on: a cursor over
/// bytes with explicit read/write/seek permissions and a detachable
/// underlying handle.
pub trait Stream: Debug + Send {
    /// Reads up to `n` bytes from the cursor. Shorter results near the end of
    /// the stream are not an error.
    fn read(&mut self, n: usize) -> Result<Vec<u8>, StreamError>;

    /// Writes the given bytes at the cursor, returning how many were written.
    fn write(&mut self, data: &[u8]) -> Result<usize, StreamError>;

    /// Moves the cursor, returning the new position from the start.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, StreamError>;

    /// Returns the current cursor position from the start.
    fn tell(&mut self) -> Result<u64, StreamError>;

    /// Whether the cursor is at the end of the stream. A detached or closed
    /// stream reports `true`.
    fn eof(&self) -> bool;

    /// Total size in bytes, `None` when detached or unknown.
    fn size(&self) -> Option<u64>;

    /// Reads the remainder of the stream from the current cursor position.
    fn contents(&mut self) -> Result<Vec<u8>, StreamError>;

    /// Closes the stream and releases the underlying handle. Idempotent.
    fn close(&mut self);

    fn is_readable(&self) -> bool;

    fn is_writable(&self) -> bool;

    fn is_seekable(&self) -> bool;

    /// Moves the cursor back to the start of the stream.
    fn rewind(&mut self) -> Result<(), StreamError> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Best-effort read of the whole stream: rewinds when seekable, then
    /// reads the remainder. Every failure is swallowed into an empty buffer.
    fn full_contents(&mut self) -> Vec<u8> {
        if self.is_seekable() && self.rewind().is_err() {
            return Vec::new();
        }

        self.contents().unwrap_or_default()
    }
}

/// Wraps a stream in the shared handle type message values hold.
pub fn shared(stream: impl Stream + 'static) -> SharedStream {
    Arc::new(Mutex::new(stream))
}

/// Locks a shared stream handle, recovering the guard when a previous holder
/// panicked mid-operation.
pub fn lock(stream: &SharedStream) -> MutexGuard<'_, dyn Stream + Send + 'static> {
    match stream.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// An in-memory stream over a growable byte buffer.
///
/// Constructing one from a string or byte slice pre-fills the buffer and
/// rewinds the cursor to position 0. Always readable, writable and seekable
/// until detached or closed.
#[derive(Debug, Default)]
pub struct MemoryStream {
    buffer: Option<Cursor<Vec<u8>>>,
}

impl MemoryStream {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: Some(Cursor::new(contents.into())),
        }
    }

    pub fn shared(contents: impl Into<Vec<u8>>) -> SharedStream {
        shared(Self::new(contents))
    }

    /// Releases ownership of the underlying buffer. Every subsequent
    /// operation on this stream fails with [`StreamError::Detached`].
    pub fn detach(&mut self) -> Option<Vec<u8>> {
        self.buffer.take().map(Cursor::into_inner)
    }

    fn buffer_mut(&mut self) -> Result<&mut Cursor<Vec<u8>>, StreamError> {
        self.buffer.as_mut().ok_or(StreamError::Detached)
    }
}

impl Stream for MemoryStream {
    fn read(&mut self, n: usize) -> Result<Vec<u8>, StreamError> {
        let cursor = self.buffer_mut()?;
        let mut data = vec![0; n];
        let count = cursor.read(&mut data)?;
        data.truncate(count);
        Ok(data)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, StreamError> {
        Ok(self.buffer_mut()?.write(data)?)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, StreamError> {
        Ok(self.buffer_mut()?.seek(pos)?)
    }

    fn tell(&mut self) -> Result<u64, StreamError> {
        Ok(self.buffer_mut()?.stream_position()?)
    }

    fn eof(&self) -> bool {
        match &self.buffer {
            Some(cursor) => cursor.position() >= cursor.get_ref().len() as u64,
            None => true,
        }
    }

    fn size(&self) -> Option<u64> {
        self.buffer.as_ref().map(|cursor| cursor.get_ref().len() as u64)
    }

    fn contents(&mut self) -> Result<Vec<u8>, StreamError> {
        let cursor = self.buffer_mut()?;
        let mut data = Vec::new();
        cursor.read_to_end(&mut data)?;
        Ok(data)
    }

    fn close(&mut self) {
        self.buffer = None;
    }

    fn is_readable(&self) -> bool {
        self.buffer.is_some()
    }

    fn is_writable(&self) -> bool {
        self.buffer.is_some()
    }

    fn is_seekable(&self) -> bool {
        self.buffer.is_some()
    }
}

/// A stream over an open file handle, with read/write capabilities fixed by
/// the mode it was opened with.
#[derive(Debug)]
pub struct FileStream {
    file: Option<File>,
    readable: bool,
    writable: bool,
    reached_eof: bool,
}

impl FileStream {
    pub fn open_read(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        Ok(Self::from_file(File::open(path)?, true, false))
    }

    pub fn open_read_write(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self::from_file(file, true, true))
    }

    /// Wraps a pre-opened handle. The caller states the capabilities, since
    /// they cannot be recovered from the handle itself.
    pub fn from_file(file: File, readable: bool, writable: bool) -> Self {
        Self {
            file: Some(file),
            readable,
            writable,
            reached_eof: false,
        }
    }

    /// Releases ownership of the underlying file handle. Every subsequent
    /// operation on this stream fails with [`StreamError::Detached`].
    pub fn detach(&mut self) -> Option<File> {
        self.readable = false;
        self.writable = false;
        self.file.take()
    }

    fn file_mut(&mut self) -> Result<&mut File, StreamError> {
        self.file.as_mut().ok_or(StreamError::Detached)
    }
}

impl Stream for FileStream {
    fn read(&mut self, n: usize) -> Result<Vec<u8>, StreamError> {
        if !self.readable {
            return Err(if self.file.is_some() { StreamError::NotReadable } else { StreamError::Detached });
        }

        let file = self.file_mut()?;
        let mut data = vec![0; n];
        let count = file.read(&mut data)?;
        data.truncate(count);

        if count == 0 && n > 0 {
            self.reached_eof = true;
        }

        Ok(data)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, StreamError> {
        if !self.writable {
            return Err(if self.file.is_some() { StreamError::NotWritable } else { StreamError::Detached });
        }

        Ok(self.file_mut()?.write(data)?)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, StreamError> {
        let position = self.file_mut()?.seek(pos)?;
        self.reached_eof = false;
        Ok(position)
    }

    fn tell(&mut self) -> Result<u64, StreamError> {
        Ok(self.file_mut()?.stream_position()?)
    }

    fn eof(&self) -> bool {
        self.file.is_none() || self.reached_eof
    }

    fn size(&self) -> Option<u64> {
        self.file
            .as_ref()
            .and_then(|file| file.metadata().ok())
            .map(|metadata| metadata.len())
    }

    fn contents(&mut self) -> Result<Vec<u8>, StreamError> {
        if !self.readable {
            return Err(if self.file.is_some() { StreamError::NotReadable } else { StreamError::Detached });
        }

        let file = self.file_mut()?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        self.reached_eof = true;
        Ok(data)
    }

    fn close(&mut self) {
        self.detach();
    }

    fn is_readable(&self) -> bool {
        self.file.is_some() && self.readable
    }

    fn is_writable(&self) -> bool {
        self.file.is_some() && self.writable
    }

    fn is_seekable(&self) -> bool {
        self.file.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_memory_stream_starts_rewound() {
        let mut stream = MemoryStream::new("hello");
        assert_eq!(stream.tell().unwrap(), 0);
        assert_eq!(stream.read(5).unwrap(), b"hello");
        assert!(stream.eof());
    }

    #[test]
    fn test_memory_stream_short_read_is_not_an_error() {
        let mut stream = MemoryStream::new("hi");
        assert_eq!(stream.read(16).unwrap(), b"hi");
        assert_eq!(stream.read(16).unwrap(), b"");
    }

    #[test]
    fn test_memory_stream_write_and_seek() {
        let mut stream = MemoryStream::new("");
        assert_eq!(stream.write(b"abcdef").unwrap(), 6);
        assert_eq!(stream.size(), Some(6));

        stream.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(stream.write(b"XY").unwrap(), 2);

        stream.rewind().unwrap();
        assert_eq!(stream.contents().unwrap(), b"abXYef");
    }

    #[test]
    fn test_memory_stream_detached_operations_fail() {
        let mut stream = MemoryStream::new("data");
        assert_eq!(stream.detach(), Some(b"data".to_vec()));
        assert_eq!(stream.detach(), None);

        assert!(matches!(stream.read(1), Err(StreamError::Detached)));
        assert!(matches!(stream.write(b"x"), Err(StreamError::Detached)));
        assert!(matches!(stream.tell(), Err(StreamError::Detached)));
        assert!(stream.eof());
        assert_eq!(stream.size(), None);
        assert!(!stream.is_readable());
        assert!(!stream.is_writable());
        assert!(!stream.is_seekable());
    }

    #[test]
    fn test_memory_stream_close_is_idempotent() {
        let mut stream = MemoryStream::new("data");
        stream.close();
        stream.close();
        assert!(matches!(stream.contents(), Err(StreamError::Detached)));
    }

    #[rstest]
    #[case("", b"")]
    #[case("payload", b"payload")]
    fn test_full_contents_reads_from_start(#[case] input: &str, #[case] expected: &[u8]) {
        let mut stream = MemoryStream::new(input);
        stream.seek(SeekFrom::End(0)).unwrap();
        assert_eq!(stream.full_contents(), expected);
    }

    #[test]
    fn test_full_contents_swallows_errors() {
        let mut stream = MemoryStream::new("data");
        stream.close();
        assert_eq!(stream.full_contents(), b"");
    }

    #[test]
    fn test_file_stream_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.bin");

        let mut stream = FileStream::open_read_write(&path).unwrap();
        stream.write(b"contents").unwrap();
        stream.rewind().unwrap();
        assert_eq!(stream.contents().unwrap(), b"contents");
        assert_eq!(stream.size(), Some(8));
        assert!(stream.eof());
    }

    #[test]
    fn test_file_stream_read_only_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.bin");
        std::fs::write(&path, b"fixed").unwrap();

        let mut stream = FileStream::open_read(&path).unwrap();
        assert!(matches!(stream.write(b"x"), Err(StreamError::NotWritable)));
        assert_eq!(stream.read(5).unwrap(), b"fixed");
    }

    #[test]
    fn test_file_stream_detach_releases_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.bin");

        let mut stream = FileStream::open_read_write(&path).unwrap();
        assert!(stream.detach().is_some());
        assert!(matches!(stream.read(1), Err(StreamError::Detached)));
        assert!(matches!(stream.seek(SeekFrom::Start(0)), Err(StreamError::Detached)));
    }

    #[test]
    fn test_shared_handle_is_shared_between_clones() {
        let handle = MemoryStream::shared("");
        let other = handle.clone();

        lock(&handle).write(b"once").unwrap();
        assert_eq!(lock(&other).full_contents(), b"once");
    }
}
