//! A provider for documents that are already rendered to PDF.
//!
//! Layout only reports the page count learned when the document was loaded;
//! write copies the bytes into the destination on a worker thread, checking
//! for cancellation between chunks.

use crate::error::SourceError;
use log::{debug, error};
use lopdf::Document;
use pdfprint_traits::{
    CancellationToken, DocumentInfo, DocumentProvider, LayoutCallback, OutputWriter, PageRange,
    PrintAttributes, WriteCallback,
};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

const CHUNK_SIZE: usize = 64 * 1024;

/// Streams a pre-rendered PDF through the provider protocol.
#[derive(Debug)]
pub struct PrerenderedPdfProvider {
    name: String,
    bytes: Arc<Vec<u8>>,
    page_count: usize,
    last_layout: Mutex<Option<PrintAttributes>>,
}

impl PrerenderedPdfProvider {
    /// Loads a provider from raw PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Pdf` if the bytes are not a readable PDF.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SourceError> {
        let document = Document::load_mem(&bytes)?;
        let page_count = document.get_pages().len();
        Ok(Self::with_parts(name.into(), bytes, page_count))
    }

    /// Serializes an in-memory `lopdf` document.
    pub fn from_document(name: impl Into<String>, mut document: Document) -> Result<Self, SourceError> {
        let mut bytes = Vec::new();
        document.save_to(&mut bytes)?;
        let page_count = document.get_pages().len();
        Ok(Self::with_parts(name.into(), bytes, page_count))
    }

    pub fn from_file<P: AsRef<Path>>(name: impl Into<String>, path: P) -> Result<Self, SourceError> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_bytes(name, bytes)
    }

    fn with_parts(name: String, bytes: Vec<u8>, page_count: usize) -> Self {
        debug!("Loaded '{}': {} pages, {} bytes", name, page_count, bytes.len());
        Self {
            name,
            bytes: Arc::new(bytes),
            page_count,
            last_layout: Mutex::new(None),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn has_layout(&self) -> bool {
        self.last_layout
            .lock()
            .map(|last| last.is_some())
            .unwrap_or(false)
    }

    /// The pages a full write produces, or `None` when `requested` asks for
    /// a strict subset (a pre-rendered file cannot be split).
    fn pages_for(&self, requested: &[PageRange]) -> Option<Vec<PageRange>> {
        if self.page_count == 0 {
            return Some(Vec::new());
        }
        let last = u32::try_from(self.page_count - 1).unwrap_or(u32::MAX);
        requested
            .iter()
            .any(|range| range.start == 0 && range.end >= last)
            .then(|| vec![PageRange::new(0, last)])
    }
}

impl DocumentProvider for PrerenderedPdfProvider {
    fn layout(&self, attributes: &PrintAttributes, callback: LayoutCallback) {
        let changed = match self.last_layout.lock() {
            Ok(mut last) => {
                let changed = last.as_ref() != Some(attributes);
                *last = Some(attributes.clone());
                changed
            }
            Err(_) => {
                callback.failed(Some("provider state lock poisoned".to_string()));
                return;
            }
        };
        let info = DocumentInfo::new(self.name.clone()).with_page_count(self.page_count);
        callback.finished(Some(info), changed);
    }

    fn write(
        &self,
        pages: &[PageRange],
        destination: OutputWriter,
        cancellation: CancellationToken,
        callback: WriteCallback,
    ) {
        if !self.has_layout() {
            callback.failed(Some("write requested before layout".to_string()));
            return;
        }
        let Some(written) = self.pages_for(pages) else {
            callback.failed(Some(format!(
                "'{}' can only be written in full ({} pages)",
                self.name, self.page_count
            )));
            return;
        };

        let bytes = Arc::clone(&self.bytes);
        let name = self.name.clone();
        let spawned = thread::Builder::new()
            .name("pdfprint-write".to_string())
            .spawn(move || match copy_chunks(&bytes, destination, &cancellation) {
                Ok(true) => {
                    debug!("Wrote '{}' ({} bytes)", name, bytes.len());
                    callback.finished(Some(written));
                }
                Ok(false) => callback.cancelled(),
                Err(e) => callback.failed(Some(e.to_string())),
            });
        // A failed spawn drops the callback, which reports cancellation.
        if let Err(e) = spawned {
            error!("Failed to spawn write thread for '{}': {}", self.name, e);
        }
    }

    fn name(&self) -> &'static str {
        "PrerenderedPdfProvider"
    }
}

/// Returns `Ok(false)` if cancellation was observed before all bytes landed.
fn copy_chunks(
    bytes: &[u8],
    mut destination: OutputWriter,
    cancellation: &CancellationToken,
) -> io::Result<bool> {
    for chunk in bytes.chunks(CHUNK_SIZE) {
        if cancellation.is_cancelled() {
            return Ok(false);
        }
        destination.write_all(chunk)?;
    }
    destination.flush()?;
    Ok(true)
}
