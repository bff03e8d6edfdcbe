//! Bridges a two-phase document provider (layout, then write) to a single
//! success-or-failure result, managing the output file along the way.
//!
//! The workspace is split the same way the protocol is:
//!
//! - `pdfprint-traits`: the provider protocol and output handle types
//! - `pdfprint-resource`: the filesystem output manager and scoped lease
//! - `pdfprint-source`: concrete providers
//! - `pdfprint` (this crate): orchestration, outcomes and job configuration

pub mod error;
pub mod pipeline;

pub use error::{FailureKind, PdfGenerationError, RenderFailure};
pub use pipeline::{
    DEFAULT_DPI, DEFAULT_SUBDIRECTORY, DEFAULT_TIMEOUT, JobConfig, Orchestrator, PdfJob,
    PdfJobBuilder, PendingRender, PrintListener, RenderOutcome, RenderRequest, default_save_path,
};

pub use pdfprint_resource::{FilesystemOutputManager, OutputLease};
pub use pdfprint_source::{PrerenderedPdfProvider, SourceError};
pub use pdfprint_traits::{
    AcquireError, CancellationToken, ContentType, DocumentInfo, DocumentProvider, LayoutCallback,
    LayoutResult, Margins, MediaSize, OutputHandle, OutputManager, OutputWriter, PageRange,
    PrintAttributes, Resolution, WriteCallback, WriteResult,
};
