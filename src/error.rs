use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Ingestion failures
// ---------------------------------------------------------------------------

/// Why a dataset could not be loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("cannot load {}: file not found", path.display())]
    NotFound { path: PathBuf },

    #[error("malformed dataset: {reason}")]
    Malformed { reason: String },

    #[error("unsupported file extension: .{extension}")]
    Unsupported { extension: String },

    #[error("dataset contains no rows")]
    Empty,
}

// ---------------------------------------------------------------------------
// Pipeline failures
// ---------------------------------------------------------------------------

/// Errors terminal to a single pipeline pass.  None of them touch the
/// record store or the previous display range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("no plottable points for the current filters and axes")]
    NoData,

    #[error("field '{field}' {reason}")]
    Schema { field: String, reason: String },

    #[error("data on the {axis} axis spans more than can be displayed")]
    RangeOverflow { axis: &'static str },

    #[error("zoom factor {factor} would produce an invalid range")]
    InvalidZoom { factor: f64 },
}

impl ViewError {
    pub fn schema(field: &str, reason: impl Into<String>) -> Self {
        ViewError::Schema {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
