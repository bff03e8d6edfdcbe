// src/pipeline/orchestrator.rs
//! Drives a [`DocumentProvider`] through layout and write and turns its
//! callbacks into a single [`RenderOutcome`].
//!
//! Every request runs as a `RenderSession` that moves through
//! `Idle → LayoutPending → WritePending → Done`. The session is moved into
//! each provider callback and consumed when the outcome is delivered, so a
//! request can report at most once. The output file is held as an
//! [`OutputLease`] that the write continuation releases before reporting.

use super::api::{PrintListener, RenderOutcome, RenderRequest};
use crate::error::RenderFailure;
use log::{debug, error, info, trace, warn};
use pdfprint_resource::{FilesystemOutputManager, OutputLease};
use pdfprint_traits::{
    CancellationToken, DocumentProvider, LayoutCallback, LayoutResult, OutputManager, PageRange,
    WriteCallback, WriteResult,
};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

static NEXT_RENDER_ID: AtomicU64 = AtomicU64::new(1);

/// The phases a render request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderPhase {
    Idle,
    LayoutPending,
    WritePending,
    Done,
}

type OutcomeCallback = Box<dyn FnOnce(RenderOutcome) + Send + 'static>;

/// Sequences provider layout and write for render requests.
///
/// The orchestrator owns no threads. It reacts to whatever thread the
/// provider completes its callbacks on.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    outputs: Arc<dyn OutputManager>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Arc::new(FilesystemOutputManager::new()))
    }
}

impl Orchestrator {
    pub fn new(outputs: Arc<dyn OutputManager>) -> Self {
        Self { outputs }
    }

    /// Starts rendering `request` and reports the result to `on_outcome`
    /// exactly once.
    ///
    /// The returned token is the one handed to the provider's write phase;
    /// cancelling it asks the provider to stop.
    pub fn render<F>(
        &self,
        provider: Arc<dyn DocumentProvider>,
        request: RenderRequest,
        on_outcome: F,
    ) -> CancellationToken
    where
        F: FnOnce(RenderOutcome) + Send + 'static,
    {
        let cancellation = CancellationToken::new();
        let session = RenderSession {
            id: NEXT_RENDER_ID.fetch_add(1, Ordering::Relaxed),
            phase: RenderPhase::Idle,
            provider,
            outputs: Arc::clone(&self.outputs),
            request,
            cancellation: cancellation.clone(),
            on_outcome: Some(Box::new(on_outcome)),
        };
        session.start();
        cancellation
    }

    /// Like [`Orchestrator::render`], reporting to a string-based listener.
    pub fn render_with_listener<L>(
        &self,
        provider: Arc<dyn DocumentProvider>,
        request: RenderRequest,
        listener: L,
    ) -> CancellationToken
    where
        L: PrintListener + 'static,
    {
        self.render(provider, request, move |outcome| outcome.notify(&listener))
    }

    /// Starts rendering and returns a future resolving to the outcome.
    pub fn render_async(
        &self,
        provider: Arc<dyn DocumentProvider>,
        request: RenderRequest,
    ) -> PendingRender {
        let (tx, receiver) = oneshot::channel();
        let cancellation = self.render(provider, request, move |outcome| {
            // The receiver may be gone if the caller stopped waiting.
            let _ = tx.send(outcome);
        });
        PendingRender { cancellation, receiver }
    }
}

/// A render in flight, resolving to its [`RenderOutcome`].
#[derive(Debug)]
pub struct PendingRender {
    cancellation: CancellationToken,
    receiver: oneshot::Receiver<RenderOutcome>,
}

impl PendingRender {
    /// The token handed to the provider's write phase.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }
}

impl Future for PendingRender {
    type Output = RenderOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<RenderOutcome> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                // Only reachable if a continuation panicked mid-flight.
                error!("Render session ended without reporting an outcome");
                RenderOutcome::Failure(RenderFailure::WriteCancelled)
            })
        })
    }
}

struct RenderSession {
    id: u64,
    phase: RenderPhase,
    provider: Arc<dyn DocumentProvider>,
    outputs: Arc<dyn OutputManager>,
    request: RenderRequest,
    cancellation: CancellationToken,
    on_outcome: Option<OutcomeCallback>,
}

impl RenderSession {
    fn advance(&mut self, next: RenderPhase) {
        trace!("[RENDER-{}] {:?} -> {:?}", self.id, self.phase, next);
        self.phase = next;
    }

    /// Idle → LayoutPending. Nothing is acquired before layout succeeds.
    fn start(mut self) {
        self.advance(RenderPhase::LayoutPending);
        debug!(
            "[RENDER-{}] Starting layout of '{}' with {}.",
            self.id,
            self.request.file_name,
            self.provider.name()
        );
        let provider = Arc::clone(&self.provider);
        let attributes = self.request.attributes.clone();
        provider.layout(
            &attributes,
            LayoutCallback::new(move |result| self.on_layout(result)),
        );
    }

    fn on_layout(self, result: LayoutResult) {
        match result {
            LayoutResult::Finished { info, changed } => {
                let pages = info.as_ref().and_then(|info| info.page_count);
                debug!(
                    "[RENDER-{}] Layout finished (pages: {:?}, changed: {}).",
                    self.id, pages, changed
                );
                self.begin_write();
            }
            LayoutResult::Failed(reason) => self.finish(Err(RenderFailure::layout_failed(reason))),
            LayoutResult::Cancelled => self.finish(Err(RenderFailure::LayoutCancelled)),
        }
    }

    /// LayoutPending → WritePending, or Done if the output cannot be created.
    fn begin_write(mut self) {
        let acquired = OutputLease::acquire(
            Arc::clone(&self.outputs),
            &self.request.destination_directory,
            &self.request.file_name,
        );
        let lease = match acquired {
            Ok(lease) => lease,
            Err(e) => {
                error!("[RENDER-{}] {}", self.id, e);
                self.finish(Err(RenderFailure::CreateOutput));
                return;
            }
        };

        self.advance(RenderPhase::WritePending);
        debug!("[RENDER-{}] Writing to '{}'.", self.id, lease.path().display());
        let provider = Arc::clone(&self.provider);
        let writer = lease.writer();
        let cancellation = self.cancellation.clone();
        provider.write(
            &[PageRange::ALL_PAGES],
            writer,
            cancellation,
            WriteCallback::new(move |result| self.on_write(lease, result)),
        );
    }

    /// WritePending → Done. The lease is released before anything is reported.
    fn on_write(self, lease: OutputLease, result: WriteResult) {
        let path = lease.release();
        let outcome = match result {
            WriteResult::Finished(Some(pages)) if !pages.is_empty() => Ok(path),
            WriteResult::Finished(_) => Err(RenderFailure::NoPagesWritten),
            WriteResult::Failed(reason) => Err(RenderFailure::write_failed(reason)),
            WriteResult::Cancelled => Err(RenderFailure::WriteCancelled),
        };
        self.finish(outcome);
    }

    fn finish(mut self, result: Result<PathBuf, RenderFailure>) {
        self.advance(RenderPhase::Done);
        match &result {
            Ok(path) => info!("[RENDER-{}] PDF saved at {}.", self.id, path.display()),
            Err(failure) => warn!("[RENDER-{}] {}", self.id, failure),
        }
        if let Some(on_outcome) = self.on_outcome.take() {
            on_outcome(result.into());
        }
    }
}
