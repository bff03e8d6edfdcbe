#![allow(dead_code)]

use lopdf::Document;
use pdfprint::{
    AcquireError, CancellationToken, DocumentInfo, DocumentProvider, FilesystemOutputManager,
    LayoutCallback, Orchestrator, OutputHandle, OutputManager, OutputWriter, PageRange,
    PrintAttributes, RenderOutcome, RenderRequest, WriteCallback,
};
use pdfprint_source::fixtures;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(5);

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An ordered record of what the provider, the output manager and the
/// caller observed.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// How the scripted provider answers `layout`.
#[derive(Debug, Clone)]
pub enum LayoutStep {
    Finish(Option<usize>),
    Fail(Option<&'static str>),
    Cancel,
    /// Drops the callback without completing it.
    Abandon,
}

/// How the scripted provider answers `write`.
#[derive(Debug, Clone)]
pub enum WriteStep {
    Finish(Option<Vec<PageRange>>),
    /// Writes the bytes to the destination, then reports every page.
    WriteAll(Vec<u8>),
    Fail(Option<&'static str>),
    Cancel,
    /// Drops the callback without completing it.
    Abandon,
    /// Reports `Cancelled` once the token fires.
    AwaitCancellation,
}

/// A provider that answers each phase according to a fixed script.
pub struct ScriptedProvider {
    layout: LayoutStep,
    write: WriteStep,
    threaded: bool,
    events: EventLog,
    pub seen_attributes: Mutex<Option<PrintAttributes>>,
    pub seen_pages: Mutex<Vec<PageRange>>,
    pub seen_writer: Mutex<Option<OutputWriter>>,
}

impl ScriptedProvider {
    pub fn new(layout: LayoutStep, write: WriteStep, events: EventLog) -> Self {
        Self {
            layout,
            write,
            threaded: false,
            events,
            seen_attributes: Mutex::new(None),
            seen_pages: Mutex::new(Vec::new()),
            seen_writer: Mutex::new(None),
        }
    }

    /// Completes every callback from a freshly spawned thread.
    pub fn threaded(mut self) -> Self {
        self.threaded = true;
        self
    }

    fn dispatch(&self, job: impl FnOnce() + Send + 'static) {
        if self.threaded {
            thread::spawn(job);
        } else {
            job();
        }
    }
}

impl DocumentProvider for ScriptedProvider {
    fn layout(&self, attributes: &PrintAttributes, callback: LayoutCallback) {
        self.events.push("layout");
        *self.seen_attributes.lock().unwrap() = Some(attributes.clone());
        let step = self.layout.clone();
        self.dispatch(move || match step {
            LayoutStep::Finish(pages) => {
                let mut info = DocumentInfo::new("scripted");
                if let Some(pages) = pages {
                    info = info.with_page_count(pages);
                }
                callback.finished(Some(info), true);
            }
            LayoutStep::Fail(reason) => callback.failed(reason.map(str::to_string)),
            LayoutStep::Cancel => callback.cancelled(),
            LayoutStep::Abandon => drop(callback),
        });
    }

    fn write(
        &self,
        pages: &[PageRange],
        mut destination: OutputWriter,
        cancellation: CancellationToken,
        callback: WriteCallback,
    ) {
        self.events.push("write");
        *self.seen_pages.lock().unwrap() = pages.to_vec();
        *self.seen_writer.lock().unwrap() = Some(destination.clone());
        let step = self.write.clone();
        if let WriteStep::AwaitCancellation = step {
            thread::spawn(move || {
                while !cancellation.is_cancelled() {
                    thread::sleep(Duration::from_millis(5));
                }
                callback.cancelled();
            });
            return;
        }
        self.dispatch(move || match step {
            WriteStep::Finish(pages) => callback.finished(pages),
            WriteStep::WriteAll(bytes) => match destination.write_all(&bytes) {
                Ok(()) => callback.finished(Some(vec![PageRange::ALL_PAGES])),
                Err(e) => callback.failed(Some(e.to_string())),
            },
            WriteStep::Fail(reason) => callback.failed(reason.map(str::to_string)),
            WriteStep::Cancel => callback.cancelled(),
            WriteStep::Abandon => drop(callback),
            WriteStep::AwaitCancellation => callback.cancelled(),
        });
    }

    fn name(&self) -> &'static str {
        "ScriptedProvider"
    }
}

/// Wraps [`FilesystemOutputManager`] and records every acquire and release.
#[derive(Debug, Default)]
pub struct RecordingOutputManager {
    inner: FilesystemOutputManager,
    events: EventLog,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl RecordingOutputManager {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl OutputManager for RecordingOutputManager {
    fn acquire(&self, directory: &Path, file_name: &str) -> Result<OutputHandle, AcquireError> {
        self.events.push(format!("acquire:{}", file_name));
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.inner.acquire(directory, file_name)
    }

    fn release(&self, handle: OutputHandle) {
        self.events.push("release");
        self.released.fetch_add(1, Ordering::SeqCst);
        self.inner.release(handle);
    }

    fn name(&self) -> &'static str {
        "RecordingOutputManager"
    }
}

/// Renders `request` and waits for its outcome, recording `"outcome"` in
/// the event log. Fails the test if a second outcome ever arrives.
pub fn render_and_wait(
    orchestrator: &Orchestrator,
    provider: Arc<dyn DocumentProvider>,
    request: RenderRequest,
    events: &EventLog,
) -> RenderOutcome {
    let (tx, rx) = mpsc::channel();
    let events = events.clone();
    orchestrator.render(provider, request, move |outcome| {
        events.push("outcome");
        tx.send(outcome).unwrap();
    });
    let outcome = rx.recv_timeout(WAIT).expect("no outcome was reported");
    assert!(
        rx.recv_timeout(Duration::from_millis(50)).is_err(),
        "more than one outcome was reported"
    );
    outcome
}

/// Builds a minimal `num_pages`-page PDF.
pub fn dummy_pdf(num_pages: u32) -> Document {
    fixtures::sample_document(num_pages).unwrap()
}

pub fn dummy_pdf_bytes(num_pages: u32) -> Vec<u8> {
    fixtures::sample_pdf_bytes(num_pages).unwrap()
}
