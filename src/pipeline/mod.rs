//! Print orchestration.
//!
//! This module contains the components that turn a document provider into a
//! written PDF file:
//!
//! - [`Orchestrator`]: Sequences layout and write and reports one outcome
//! - [`PdfJobBuilder`]: Fluent builder for a configured [`PdfJob`]
//! - [`JobConfig`]: Serializable job settings
//!
//! # Example
//!
//! ```ignore
//! use pdfprint::PdfJobBuilder;
//! use std::sync::Arc;
//!
//! let path = PdfJobBuilder::new()
//!     .with_pdf_name("invoice")
//!     .with_directory("out")
//!     .with_provider(Arc::new(provider))
//!     .build()?
//!     .run()
//!     .await?;
//! ```

pub mod api;
mod builder;
pub mod config;
mod orchestrator;

pub use api::{PrintListener, RenderOutcome, RenderRequest};
pub use builder::{PdfJob, PdfJobBuilder};
pub use config::{DEFAULT_DPI, DEFAULT_SUBDIRECTORY, DEFAULT_TIMEOUT, JobConfig, default_save_path};
pub use orchestrator::{Orchestrator, PendingRender};
