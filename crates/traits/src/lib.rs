pub mod attributes;
pub mod output;
pub mod provider;

pub use attributes::{Margins, MediaSize, PrintAttributes, Resolution};
pub use output::{AcquireError, OutputHandle, OutputManager, OutputWriter};
pub use provider::{
    ContentType, DocumentInfo, DocumentProvider, LayoutCallback, LayoutResult, PageRange,
    WriteCallback, WriteResult,
};

pub use tokio_util::sync::CancellationToken;
