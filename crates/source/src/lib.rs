//! Document providers for the pdfprint bridge.
//!
//! This crate provides concrete implementations of the `DocumentProvider`
//! protocol from pdfprint-traits.
//!
//! ## Available Providers
//!
//! - [`PrerenderedPdfProvider`]: Streams an already rendered PDF document
//!
//! ## Example
//!
//! ```ignore
//! use pdfprint_source::PrerenderedPdfProvider;
//!
//! let provider = PrerenderedPdfProvider::from_file("invoice", "build/invoice.pdf")?;
//! assert_eq!(provider.page_count(), 2);
//! ```

mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
mod prerendered;

pub use error::SourceError;
pub use prerendered::PrerenderedPdfProvider;
