//! Filesystem-based output manager for native platforms.
//!
//! The manager creates the destination directory on demand, clears any stale
//! file at the destination and opens a fresh, truncated file for the provider
//! to write into.
//!
//! # Security
//!
//! File names must be a single normal path component with no separators.
//! Names such as `../escape.pdf`, `./out.pdf` or `nested/out.pdf` are
//! rejected, and symbolic links at the destination are never followed, so
//! the output can never land outside the requested directory.

use log::{debug, error, warn};
use pdfprint_traits::{AcquireError, OutputHandle, OutputManager};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

/// An output manager that writes to the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemOutputManager;

impl FilesystemOutputManager {
    pub fn new() -> Self {
        Self
    }

    fn acquire_with<R>(
        &self,
        directory: &Path,
        file_name: &str,
        remove_stale: R,
    ) -> Result<OutputHandle, AcquireError>
    where
        R: FnOnce(&Path) -> io::Result<()>,
    {
        validate_file_name(file_name)?;
        ensure_directory(directory)?;

        let target = directory.join(file_name);
        if fs::symlink_metadata(&target).is_ok() {
            // Not fatal: the open below truncates whatever is left behind.
            if let Err(e) = remove_stale(&target) {
                warn!("Failed to delete existing file '{}': {}", target.display(), e);
            }
        }

        let file = open_target(&target).map_err(|e| {
            error!("Failed to open output file '{}': {}", target.display(), e);
            AcquireError::OpenFile { path: target.clone(), source: e }
        })?;

        let path = std::path::absolute(&target).unwrap_or(target);
        debug!("Acquired output file '{}'", path.display());
        Ok(OutputHandle::new(file, path))
    }
}

impl OutputManager for FilesystemOutputManager {
    fn acquire(&self, directory: &Path, file_name: &str) -> Result<OutputHandle, AcquireError> {
        self.acquire_with(directory, file_name, |path| fs::remove_file(path))
    }

    fn name(&self) -> &'static str {
        "FilesystemOutputManager"
    }
}

/// Opens `target` without ever following a symbolic link out of its directory.
///
/// A fresh entry is created exclusively, which fails on any link left at the
/// path. An entry that survived deletion is truncated in place, unless it is
/// a link.
fn open_target(target: &Path) -> io::Result<File> {
    let mut options = File::options();
    options.read(true).write(true);
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.file_type().is_symlink() => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "refusing to write through a symbolic link",
            ));
        }
        Ok(_) => options.truncate(true),
        Err(_) => options.create_new(true),
    };
    options.open(target)
}

fn validate_file_name(file_name: &str) -> Result<(), AcquireError> {
    if file_name.chars().any(std::path::is_separator) {
        return Err(AcquireError::InvalidFileName(file_name.to_string()));
    }
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(AcquireError::InvalidFileName(file_name.to_string())),
    }
}

fn ensure_directory(directory: &Path) -> Result<(), AcquireError> {
    if directory.is_dir() {
        return Ok(());
    }
    match fs::create_dir_all(directory) {
        Ok(()) => Ok(()),
        // Another writer may have created it between the check and the call.
        Err(_) if directory.is_dir() => Ok(()),
        Err(e) => {
            error!("Failed to create directory '{}': {}", directory.display(), e);
            Err(AcquireError::CreateDirectory {
                path: PathBuf::from(directory),
                source: e,
            })
        }
    }
}
