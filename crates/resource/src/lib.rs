//! Output resource management for the pdfprint bridge.
//!
//! This crate provides the filesystem implementation of the
//! `OutputManager` trait from pdfprint-traits, plus the scoped
//! [`OutputLease`] the orchestrator uses to guarantee every acquired
//! handle is released exactly once.
//!
//! ## Available Managers
//!
//! - [`FilesystemOutputManager`]: Creates destination files on the local filesystem

mod filesystem;
mod lease;

pub use filesystem::FilesystemOutputManager;
pub use lease::OutputLease;

// Re-export the handle types for convenience
pub use pdfprint_traits::{AcquireError, OutputHandle, OutputManager, OutputWriter};
