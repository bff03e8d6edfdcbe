// src/error.rs
//! Error types for print orchestration and PDF jobs.

use thiserror::Error;

/// Which stage of a render a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The output file could not be created or opened.
    Acquire,
    /// The provider's layout phase failed or was cancelled.
    Layout,
    /// The provider's write phase failed, was cancelled, or wrote nothing.
    Write,
}

/// The terminal failure of a single render request.
///
/// The `Display` text is the human-readable message delivered to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderFailure {
    #[error("Failed to create output file. Check storage permissions and path.")]
    CreateOutput,
    #[error("PDF layout failed: {0}")]
    LayoutFailed(String),
    #[error("PDF layout was cancelled")]
    LayoutCancelled,
    #[error("PDF write failed: {0}")]
    WriteFailed(String),
    #[error("PDF write was cancelled")]
    WriteCancelled,
    #[error("No pages were written to PDF")]
    NoPagesWritten,
}

impl RenderFailure {
    pub(crate) const UNKNOWN_LAYOUT_ERROR: &'static str = "Unknown layout error";
    pub(crate) const UNKNOWN_WRITE_ERROR: &'static str = "Unknown write error";

    pub fn kind(&self) -> FailureKind {
        match self {
            RenderFailure::CreateOutput => FailureKind::Acquire,
            RenderFailure::LayoutFailed(_) | RenderFailure::LayoutCancelled => FailureKind::Layout,
            RenderFailure::WriteFailed(_)
            | RenderFailure::WriteCancelled
            | RenderFailure::NoPagesWritten => FailureKind::Write,
        }
    }

    pub(crate) fn layout_failed(reason: Option<String>) -> Self {
        RenderFailure::LayoutFailed(reason.unwrap_or_else(|| Self::UNKNOWN_LAYOUT_ERROR.to_string()))
    }

    pub(crate) fn write_failed(reason: Option<String>) -> Self {
        RenderFailure::WriteFailed(reason.unwrap_or_else(|| Self::UNKNOWN_WRITE_ERROR.to_string()))
    }
}

/// The main error enum for job-level operations.
#[derive(Error, Debug)]
pub enum PdfGenerationError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Render(#[from] RenderFailure),
    #[error("PDF generation timed out after {millis}ms")]
    Timeout { millis: u128 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            RenderFailure::CreateOutput.to_string(),
            "Failed to create output file. Check storage permissions and path."
        );
        assert_eq!(
            RenderFailure::LayoutFailed("bad attrs".into()).to_string(),
            "PDF layout failed: bad attrs"
        );
        assert_eq!(RenderFailure::LayoutCancelled.to_string(), "PDF layout was cancelled");
        assert_eq!(
            RenderFailure::WriteFailed("disk full".into()).to_string(),
            "PDF write failed: disk full"
        );
        assert_eq!(RenderFailure::WriteCancelled.to_string(), "PDF write was cancelled");
        assert_eq!(RenderFailure::NoPagesWritten.to_string(), "No pages were written to PDF");
    }

    #[test]
    fn test_missing_reasons_get_defaults() {
        assert_eq!(
            RenderFailure::layout_failed(None).to_string(),
            "PDF layout failed: Unknown layout error"
        );
        assert_eq!(
            RenderFailure::write_failed(None).to_string(),
            "PDF write failed: Unknown write error"
        );
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(RenderFailure::CreateOutput.kind(), FailureKind::Acquire);
        assert_eq!(RenderFailure::LayoutCancelled.kind(), FailureKind::Layout);
        assert_eq!(RenderFailure::NoPagesWritten.kind(), FailureKind::Write);
        assert_eq!(RenderFailure::WriteFailed(String::new()).kind(), FailureKind::Write);
    }

    #[test]
    fn test_generation_error_wraps_render_message() {
        let err: PdfGenerationError = RenderFailure::WriteCancelled.into();
        assert_eq!(err.to_string(), "PDF write was cancelled");

        let err = PdfGenerationError::Timeout { millis: 30_000 };
        assert_eq!(err.to_string(), "PDF generation timed out after 30000ms");
    }
}
