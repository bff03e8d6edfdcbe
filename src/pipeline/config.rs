// src/pipeline/config.rs
use crate::error::PdfGenerationError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default output resolution in DPI.
pub const DEFAULT_DPI: u32 = 600;

/// Default deadline for [`PdfJob::run`](super::PdfJob::run).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default subdirectory used by [`default_save_path`].
pub const DEFAULT_SUBDIRECTORY: &str = "PDF";

/// Serializable job settings, e.g. loaded from a JSON file.
///
/// Every field is optional in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobConfig {
    /// Output file name; `.pdf` is appended when missing.
    pub pdf_name: String,
    /// Output directory. Falls back to the system temp directory.
    pub directory: Option<PathBuf>,
    /// A predefined page size, by id (`"ISO_A4"`) or label (`"Letter"`).
    pub page_size: String,
    pub landscape: bool,
    /// Left, top, right and bottom margins in millimetres.
    pub margins_mm: [f32; 4],
    pub resolution_dpi: u32,
    pub timeout_ms: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            pdf_name: String::new(),
            directory: None,
            page_size: "ISO_A4".to_string(),
            landscape: false,
            margins_mm: [0.0; 4],
            resolution_dpi: DEFAULT_DPI,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl JobConfig {
    pub fn from_json(json: &str) -> Result<Self, PdfGenerationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PdfGenerationError> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_json(&source)
    }
}

/// Appends `.pdf` to a non-empty name that lacks it. The name is
/// otherwise kept as given.
pub fn normalize_pdf_name(name: &str) -> String {
    if name.is_empty() || name.ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

/// Returns `base/subdirectory`, creating it if possible.
///
/// Creation failures are only logged; acquiring the output reports them
/// properly later.
pub fn default_save_path(base: &Path, subdirectory: &str) -> PathBuf {
    let dir = base.join(subdirectory);
    if let Err(e) = fs::create_dir_all(&dir) {
        warn!("Could not create default save path '{}': {}", dir.display(), e);
    }
    dir
}
