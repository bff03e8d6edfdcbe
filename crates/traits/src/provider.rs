//! The two-phase document provider protocol.
//!
//! A provider is driven through `layout` and then `write`. Each phase reports
//! exactly one result through a single-shot callback, possibly from another
//! thread. Callbacks that are dropped without being completed report
//! cancellation, so a caller waiting on them is never left hanging.

use crate::attributes::PrintAttributes;
use crate::output::OutputWriter;
use log::warn;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// What kind of document a provider produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentType {
    #[default]
    Document,
    Photo,
    Unknown,
}

/// Metadata reported when layout finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub name: String,
    pub content_type: ContentType,
    /// `None` when the provider cannot tell ahead of writing.
    pub page_count: Option<usize>,
}

impl DocumentInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: ContentType::Document,
            page_count: None,
        }
    }

    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = Some(page_count);
        self
    }
}

/// An inclusive, zero-based range of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Every page the provider has.
    pub const ALL_PAGES: PageRange = PageRange { start: 0, end: u32::MAX };

    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn single(page: u32) -> Self {
        Self { start: page, end: page }
    }

    pub fn is_all_pages(&self) -> bool {
        *self == Self::ALL_PAGES
    }

    /// Number of pages covered (saturating for `ALL_PAGES`).
    pub fn len(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all_pages() {
            write!(f, "[all]")
        } else {
            write!(f, "[{}-{}]", self.start, self.end)
        }
    }
}

/// Terminal result of the layout phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutResult {
    /// Layout succeeded. `changed` is true when the content differs from the
    /// previous layout.
    Finished {
        info: Option<DocumentInfo>,
        changed: bool,
    },
    Failed(Option<String>),
    Cancelled,
}

/// Terminal result of the write phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// The provider finished writing. The list holds the pages actually
    /// written and may be empty or absent.
    Finished(Option<Vec<PageRange>>),
    Failed(Option<String>),
    Cancelled,
}

type Continuation<R> = Box<dyn FnOnce(R) + Send + 'static>;

/// Single-shot completion for [`DocumentProvider::layout`].
pub struct LayoutCallback {
    inner: Option<Continuation<LayoutResult>>,
}

impl LayoutCallback {
    pub fn new(f: impl FnOnce(LayoutResult) + Send + 'static) -> Self {
        Self { inner: Some(Box::new(f)) }
    }

    pub fn finished(self, info: Option<DocumentInfo>, changed: bool) {
        self.complete(LayoutResult::Finished { info, changed });
    }

    pub fn failed(self, reason: Option<String>) {
        self.complete(LayoutResult::Failed(reason));
    }

    pub fn cancelled(self) {
        self.complete(LayoutResult::Cancelled);
    }

    pub fn complete(mut self, result: LayoutResult) {
        if let Some(f) = self.inner.take() {
            f(result);
        }
    }
}

impl Drop for LayoutCallback {
    fn drop(&mut self) {
        if let Some(f) = self.inner.take() {
            warn!("Layout callback dropped without a result; reporting cancellation");
            f(LayoutResult::Cancelled);
        }
    }
}

impl fmt::Debug for LayoutCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutCallback")
            .field("pending", &self.inner.is_some())
            .finish()
    }
}

/// Single-shot completion for [`DocumentProvider::write`].
pub struct WriteCallback {
    inner: Option<Continuation<WriteResult>>,
}

impl WriteCallback {
    pub fn new(f: impl FnOnce(WriteResult) + Send + 'static) -> Self {
        Self { inner: Some(Box::new(f)) }
    }

    pub fn finished(self, pages: Option<Vec<PageRange>>) {
        self.complete(WriteResult::Finished(pages));
    }

    pub fn failed(self, reason: Option<String>) {
        self.complete(WriteResult::Failed(reason));
    }

    pub fn cancelled(self) {
        self.complete(WriteResult::Cancelled);
    }

    pub fn complete(mut self, result: WriteResult) {
        if let Some(f) = self.inner.take() {
            f(result);
        }
    }
}

impl Drop for WriteCallback {
    fn drop(&mut self) {
        if let Some(f) = self.inner.take() {
            warn!("Write callback dropped without a result; reporting cancellation");
            f(WriteResult::Cancelled);
        }
    }
}

impl fmt::Debug for WriteCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteCallback")
            .field("pending", &self.inner.is_some())
            .finish()
    }
}

/// An external document renderer driven through layout and write.
///
/// Implementations may complete either callback synchronously, from inside
/// the call, or later from a thread of their own.
pub trait DocumentProvider: Send + Sync {
    /// Computes the document's pagination for `attributes`.
    fn layout(&self, attributes: &PrintAttributes, callback: LayoutCallback);

    /// Streams the requested `pages` into `destination`.
    ///
    /// `cancellation` is cooperative: the provider checks it and reports
    /// [`WriteResult::Cancelled`] when it observes a request.
    fn write(
        &self,
        pages: &[PageRange],
        destination: OutputWriter,
        cancellation: CancellationToken,
        callback: WriteCallback,
    );

    /// Returns a human-readable name for this provider (for logging/debugging).
    fn name(&self) -> &'static str {
        "DocumentProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_layout_callback_delivers_result() {
        let (tx, rx) = mpsc::channel();
        let callback = LayoutCallback::new(move |result| tx.send(result).unwrap());
        callback.failed(Some("bad attrs".to_string()));

        assert_eq!(rx.recv().unwrap(), LayoutResult::Failed(Some("bad attrs".to_string())));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_layout_callback_reports_cancelled() {
        let (tx, rx) = mpsc::channel();
        drop(LayoutCallback::new(move |result| tx.send(result).unwrap()));

        assert_eq!(rx.recv().unwrap(), LayoutResult::Cancelled);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_write_callback_reports_cancelled() {
        let (tx, rx) = mpsc::channel();
        drop(WriteCallback::new(move |result| tx.send(result).unwrap()));

        assert_eq!(rx.recv().unwrap(), WriteResult::Cancelled);
    }

    #[test]
    fn test_write_callback_completes_once() {
        let (tx, rx) = mpsc::channel();
        let callback = WriteCallback::new(move |result| tx.send(result).unwrap());
        callback.finished(Some(vec![PageRange::new(0, 2)]));

        assert_eq!(rx.recv().unwrap(), WriteResult::Finished(Some(vec![PageRange::new(0, 2)])));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_page_range_len() {
        assert_eq!(PageRange::new(0, 2).len(), 3);
        assert_eq!(PageRange::single(4).len(), 1);
        assert_eq!(PageRange::new(3, 1).len(), 0);
        assert!(PageRange::new(3, 1).is_empty());
        assert_eq!(PageRange::ALL_PAGES.len(), u32::MAX);
    }

    #[test]
    fn test_page_range_display() {
        assert_eq!(PageRange::ALL_PAGES.to_string(), "[all]");
        assert_eq!(PageRange::new(0, 4).to_string(), "[0-4]");
    }

    #[test]
    fn test_document_info_builder() {
        let info = DocumentInfo::new("report.pdf").with_page_count(3);
        assert_eq!(info.page_count, Some(3));
        assert_eq!(info.content_type, ContentType::Document);
    }
}
