use log::trace;
use pdfprint_traits::{AcquireError, OutputHandle, OutputManager, OutputWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A scoped acquisition of an output handle.
///
/// The lease keeps the handle together with the manager that produced it and
/// hands it back exactly once: through [`OutputLease::release`], or on drop
/// if the owner never got that far.
#[derive(Debug)]
pub struct OutputLease {
    handle: Option<OutputHandle>,
    writer: OutputWriter,
    path: PathBuf,
    manager: Arc<dyn OutputManager>,
}

impl OutputLease {
    pub fn acquire(
        manager: Arc<dyn OutputManager>,
        directory: &Path,
        file_name: &str,
    ) -> Result<Self, AcquireError> {
        let handle = manager.acquire(directory, file_name)?;
        Ok(Self {
            path: handle.path().to_path_buf(),
            writer: handle.writer(),
            handle: Some(handle),
            manager,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A writer onto the leased file. Stops accepting bytes once released.
    pub fn writer(&self) -> OutputWriter {
        self.writer.clone()
    }

    /// Returns the handle to its manager and yields the file's path.
    pub fn release(mut self) -> PathBuf {
        self.return_handle();
        std::mem::take(&mut self.path)
    }

    fn return_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!(
                "Releasing '{}' to {}",
                handle.path().display(),
                self.manager.name()
            );
            self.manager.release(handle);
        }
    }
}

impl Drop for OutputLease {
    fn drop(&mut self) {
        self.return_handle();
    }
}
