// src/pipeline/builder.rs
use super::api::{PrintListener, RenderOutcome, RenderRequest};
use super::config::{DEFAULT_DPI, DEFAULT_TIMEOUT, JobConfig, normalize_pdf_name};
use super::orchestrator::Orchestrator;
use crate::error::PdfGenerationError;
use log::{debug, error, info, warn};
use pdfprint_resource::FilesystemOutputManager;
use pdfprint_traits::{
    CancellationToken, DocumentProvider, Margins, MediaSize, OutputManager, PrintAttributes,
    Resolution,
};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// A builder for creating a [`PdfJob`].
pub struct PdfJobBuilder {
    pdf_name: String,
    directory: Option<PathBuf>,
    media_size: MediaSize,
    landscape: bool,
    margins: Margins,
    resolution_dpi: u32,
    timeout: Duration,
    provider: Option<Arc<dyn DocumentProvider>>,
    outputs: Option<Arc<dyn OutputManager>>,
}

impl Default for PdfJobBuilder {
    fn default() -> Self {
        Self {
            pdf_name: String::new(),
            directory: None,
            media_size: MediaSize::ISO_A4,
            landscape: false,
            margins: Margins::NO_MARGINS,
            resolution_dpi: DEFAULT_DPI,
            timeout: DEFAULT_TIMEOUT,
            provider: None,
            outputs: None,
        }
    }
}

impl PdfJobBuilder {
    pub fn new() -> Self { Default::default() }

    /// Starts from serialized settings. The provider still has to be set.
    pub fn from_config(config: JobConfig) -> Result<Self, PdfGenerationError> {
        let media_size = MediaSize::from_name(&config.page_size).ok_or_else(|| {
            PdfGenerationError::Config(format!("Unknown page size: '{}'", config.page_size))
        })?;
        let [left, top, right, bottom] = config.margins_mm;
        let mut builder = Self::new()
            .with_pdf_name(&config.pdf_name)
            .with_page_size(media_size)
            .with_landscape(config.landscape)
            .with_margins_mm(left, top, right, bottom)
            .with_resolution(config.resolution_dpi)
            .with_timeout(Duration::from_millis(config.timeout_ms));
        if let Some(directory) = config.directory {
            builder = builder.with_directory(directory);
        }
        Ok(builder)
    }

    /// Sets the output file name. `.pdf` is appended if missing.
    pub fn with_pdf_name(mut self, name: &str) -> Self { self.pdf_name = normalize_pdf_name(name); self }

    /// Sets the output directory. Defaults to the system temp directory.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self { self.directory = Some(directory.into()); self }

    pub fn with_page_size(mut self, media_size: MediaSize) -> Self { self.media_size = media_size; self }

    /// Rotates the page size to landscape when the job is built.
    pub fn with_landscape(mut self, landscape: bool) -> Self { self.landscape = landscape; self }

    pub fn with_margins(mut self, margins: Margins) -> Self { self.margins = margins; self }

    /// Sets page margins in millimetres.
    pub fn with_margins_mm(self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        self.with_margins(Margins::from_millimeters(left, top, right, bottom))
    }

    pub fn with_resolution(mut self, dpi: u32) -> Self { self.resolution_dpi = dpi; self }

    /// Sets the deadline used by [`PdfJob::run`] and [`PdfJob::start`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self { self.timeout = timeout; self }

    pub fn with_provider(mut self, provider: Arc<dyn DocumentProvider>) -> Self { self.provider = Some(provider); self }

    /// Replaces the default [`FilesystemOutputManager`].
    pub fn with_output_manager(mut self, outputs: Arc<dyn OutputManager>) -> Self { self.outputs = Some(outputs); self }

    /// Consumes the builder and creates the `PdfJob`.
    pub fn build(self) -> Result<PdfJob, PdfGenerationError> {
        if self.pdf_name.is_empty() {
            return Err(PdfGenerationError::Config("PDF name must not be empty.".to_string()));
        }
        let provider = self.provider.ok_or_else(|| {
            PdfGenerationError::Config("A document provider must be set.".to_string())
        })?;
        if self.resolution_dpi == 0 {
            return Err(PdfGenerationError::Config("Resolution must be at least 1 DPI.".to_string()));
        }

        let media_size = if self.landscape {
            self.media_size.as_landscape()
        } else {
            self.media_size
        };
        let attributes = PrintAttributes::new(media_size, Resolution::pdf(self.resolution_dpi), self.margins);
        let directory = self.directory.unwrap_or_else(std::env::temp_dir);
        let outputs = self
            .outputs
            .unwrap_or_else(|| Arc::new(FilesystemOutputManager::new()));

        Ok(PdfJob {
            orchestrator: Orchestrator::new(outputs),
            provider,
            request: RenderRequest::new(directory, self.pdf_name).with_attributes(attributes),
            timeout: self.timeout,
        })
    }
}

fn take_listener<L>(slot: &Mutex<Option<L>>) -> Option<L> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// A fully configured render of one document.
pub struct PdfJob {
    orchestrator: Orchestrator,
    provider: Arc<dyn DocumentProvider>,
    request: RenderRequest,
    timeout: Duration,
}

impl PdfJob {
    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Starts the job and reports to `listener` exactly once.
    ///
    /// If the deadline passes before the provider finishes, the write phase
    /// is asked to cancel and the listener receives the timeout message;
    /// whatever the provider reports afterwards is discarded.
    pub fn start<L>(self, listener: L) -> CancellationToken
    where
        L: PrintListener + 'static,
    {
        let file_name = self.request.file_name.clone();
        let slot = Arc::new(Mutex::new(Some(listener)));
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let on_outcome = {
            let slot = Arc::clone(&slot);
            move |outcome: RenderOutcome| {
                drop(done_tx);
                match take_listener(&slot) {
                    Some(listener) => outcome.notify(&listener),
                    None => debug!("Discarding late outcome for '{}': {:?}", file_name, outcome),
                }
            }
        };
        let cancellation = self.orchestrator.render(self.provider, self.request, on_outcome);

        let timeout = self.timeout;
        let token = cancellation.clone();
        let armed = thread::Builder::new()
            .name("pdfprint-deadline".to_string())
            .spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(timeout) {
                    if let Some(listener) = take_listener(&slot) {
                        token.cancel();
                        let err = PdfGenerationError::Timeout { millis: timeout.as_millis() };
                        warn!("{}; cancelling.", err);
                        listener.on_failure(err.to_string());
                    }
                }
            });
        if let Err(e) = armed {
            error!("Failed to arm job deadline: {}", e);
        }
        cancellation
    }

    /// Runs the job to completion, returning the written file's path.
    ///
    /// If the deadline passes first, the write phase is asked to cancel and
    /// `PdfGenerationError::Timeout` is returned.
    pub async fn run(self) -> Result<PathBuf, PdfGenerationError> {
        let file_name = self.request.file_name.clone();
        let pending = self.orchestrator.render_async(self.provider, self.request);
        let cancellation = pending.cancellation();

        match tokio::time::timeout(self.timeout, pending).await {
            Ok(outcome) => {
                let path = outcome.into_result()?;
                info!("Generated '{}' at {}.", file_name, path.display());
                Ok(path)
            }
            Err(_) => {
                cancellation.cancel();
                warn!("Generating '{}' timed out; cancelling.", file_name);
                Err(PdfGenerationError::Timeout { millis: self.timeout.as_millis() })
            }
        }
    }
}
