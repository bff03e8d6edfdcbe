// src/pipeline/api.rs
use crate::error::RenderFailure;
use pdfprint_traits::PrintAttributes;
use std::path::{Path, PathBuf};

/// Where and how a single document is rendered.
///
/// The request is moved into the orchestrator and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub destination_directory: PathBuf,
    pub file_name: String,
    pub attributes: PrintAttributes,
}

impl RenderRequest {
    pub fn new(destination_directory: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            destination_directory: destination_directory.into(),
            file_name: file_name.into(),
            attributes: PrintAttributes::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: PrintAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// `destination_directory/file_name`, before resolution to an absolute path.
    pub fn destination(&self) -> PathBuf {
        self.destination_directory.join(&self.file_name)
    }
}

/// The single terminal result of a render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The document was written to `path`, an absolute path.
    Success { path: PathBuf },
    Failure(RenderFailure),
}

impl RenderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RenderOutcome::Success { .. })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            RenderOutcome::Success { path } => Some(path),
            RenderOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&RenderFailure> {
        match self {
            RenderOutcome::Success { .. } => None,
            RenderOutcome::Failure(failure) => Some(failure),
        }
    }

    /// The failure message, if this outcome is a failure.
    pub fn message(&self) -> Option<String> {
        self.failure().map(ToString::to_string)
    }

    pub fn into_result(self) -> Result<PathBuf, RenderFailure> {
        match self {
            RenderOutcome::Success { path } => Ok(path),
            RenderOutcome::Failure(failure) => Err(failure),
        }
    }

    /// Reports this outcome to a string-based listener.
    pub fn notify(self, listener: &dyn PrintListener) {
        match self {
            RenderOutcome::Success { path } => listener.on_success(path.display().to_string()),
            RenderOutcome::Failure(failure) => listener.on_failure(failure.to_string()),
        }
    }
}

impl From<Result<PathBuf, RenderFailure>> for RenderOutcome {
    fn from(result: Result<PathBuf, RenderFailure>) -> Self {
        match result {
            Ok(path) => RenderOutcome::Success { path },
            Err(failure) => RenderOutcome::Failure(failure),
        }
    }
}

/// Receives the outcome of a render as plain strings.
///
/// Exactly one of the two methods is called per request.
pub trait PrintListener: Send + Sync {
    /// Called with the absolute path of the written document.
    fn on_success(&self, path: String);

    /// Called with a description of what went wrong.
    fn on_failure(&self, message: String);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl PrintListener for Recorder {
        fn on_success(&self, path: String) {
            self.calls.lock().unwrap().push(format!("ok:{}", path));
        }

        fn on_failure(&self, message: String) {
            self.calls.lock().unwrap().push(format!("err:{}", message));
        }
    }

    #[test]
    fn test_request_destination() {
        let request = RenderRequest::new("/tmp/reports", "out.pdf");
        assert_eq!(request.destination(), PathBuf::from("/tmp/reports/out.pdf"));
        assert_eq!(request.attributes, PrintAttributes::default());
    }

    #[test]
    fn test_outcome_accessors() {
        let success = RenderOutcome::Success { path: PathBuf::from("/tmp/out.pdf") };
        assert!(success.is_success());
        assert_eq!(success.path(), Some(Path::new("/tmp/out.pdf")));
        assert_eq!(success.message(), None);

        let failure = RenderOutcome::Failure(RenderFailure::WriteCancelled);
        assert!(!failure.is_success());
        assert_eq!(failure.message().as_deref(), Some("PDF write was cancelled"));
        assert_eq!(failure.into_result(), Err(RenderFailure::WriteCancelled));
    }

    #[test]
    fn test_notify_listener() {
        let recorder = Recorder::default();
        RenderOutcome::Success { path: PathBuf::from("/tmp/out.pdf") }.notify(&recorder);
        RenderOutcome::Failure(RenderFailure::NoPagesWritten).notify(&recorder);

        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![
                "ok:/tmp/out.pdf".to_string(),
                "err:No pages were written to PDF".to_string()
            ]
        );
    }
}
