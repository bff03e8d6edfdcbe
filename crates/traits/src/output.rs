//! Output handle and the `OutputManager` trait.
//!
//! An [`OutputHandle`] owns exactly one open, writable file together with its
//! resolved path. Providers never see the handle itself: they receive an
//! [`OutputWriter`], a cloneable view onto the same file that stops accepting
//! bytes once the handle has been closed.

use log::error;
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Error type for output acquisition.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Failed to create directory '{}': {source}", .path.display())]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("Invalid output file name: '{0}'")]
    InvalidFileName(String),

    #[error("Failed to open output file '{}': {source}", .path.display())]
    OpenFile { path: PathBuf, source: io::Error },
}

type FileSlot = Arc<Mutex<Option<File>>>;

fn lock_slot(slot: &FileSlot) -> io::Result<MutexGuard<'_, Option<File>>> {
    slot.lock()
        .map_err(|_| io::Error::other("output file lock poisoned"))
}

fn released() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "output handle already released")
}

/// Owns one open output file and its absolute path.
///
/// The file is closed by [`OutputHandle::close`] or, failing that, on drop.
#[derive(Debug)]
pub struct OutputHandle {
    path: PathBuf,
    slot: FileSlot,
}

impl OutputHandle {
    pub fn new(file: File, path: PathBuf) -> Self {
        Self {
            path,
            slot: Arc::new(Mutex::new(Some(file))),
        }
    }

    /// The resolved absolute path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A writer onto the open file, for handing to a provider.
    pub fn writer(&self) -> OutputWriter {
        OutputWriter {
            slot: Arc::clone(&self.slot),
        }
    }

    pub fn is_open(&self) -> bool {
        lock_slot(&self.slot).map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Flushes and closes the file. Closing a closed handle is a no-op.
    ///
    /// Writers obtained from this handle fail with `BrokenPipe` afterwards.
    pub fn close(&mut self) -> io::Result<()> {
        let file = lock_slot(&self.slot)?.take();
        match file {
            Some(mut file) => {
                file.flush()?;
                file.sync_all()
            }
            None => Ok(()),
        }
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Failed to close output file '{}': {}", self.path.display(), e);
        }
    }
}

/// A cloneable `Write + Seek` view of an [`OutputHandle`]'s file.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    slot: FileSlot,
}

impl OutputWriter {
    fn with_file<T>(&self, f: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut slot = lock_slot(&self.slot)?;
        match slot.as_mut() {
            Some(file) => f(file),
            None => Err(released()),
        }
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.with_file(|file| file.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

impl Seek for OutputWriter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.with_file(|file| file.seek(pos))
    }
}

/// A trait for creating and releasing output files.
///
/// # Implementations
///
/// - `FilesystemOutputManager` (pdfprint-resource): creates the destination
///   directory and file on the local filesystem.
pub trait OutputManager: Send + Sync + Debug {
    /// Creates (or replaces) `directory/file_name` and opens it for writing.
    ///
    /// No partially initialised handle is ever returned.
    fn acquire(&self, directory: &Path, file_name: &str) -> Result<OutputHandle, AcquireError>;

    /// Closes a handle. Close errors are logged, never returned.
    fn release(&self, mut handle: OutputHandle) {
        if let Err(e) = handle.close() {
            error!("Failed to close output file '{}': {}", handle.path().display(), e);
        }
    }

    /// Returns a human-readable name for this manager (for logging/debugging).
    fn name(&self) -> &'static str;
}
