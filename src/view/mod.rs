//! View layer: the pure pipeline from records to what the plot shows.
//!
//! ```text
//!   records + FilterConfig
//!        │  filter
//!        ▼
//!   filtered records + AxisSelection
//!        │  build_series
//!        ▼
//!   Vec<SeriesGroup>
//!        │  compute_full_range
//!        ▼
//!   full ViewRange ──► ViewState (zoom / reset) ──► RenderFrame
//! ```

pub mod range;
pub mod series;
pub mod zoom;

use crate::data::filter::{filter, FilterConfig};
use crate::data::model::Record;
use crate::data::schema::{pretty_label, Schema};
use crate::error::ViewError;

use range::{compute_full_range, RangePolicy, ViewRange};
use series::{build_series, AxisSelection, SeriesGroup};

/// One snapshot of every user-chosen parameter that feeds the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewParams {
    pub filter: FilterConfig,
    pub axes: AxisSelection,
}

/// Output of one pipeline pass, before zoom is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedView {
    pub groups: Vec<SeriesGroup>,
    pub full: ViewRange,
    /// Records that passed the filters (some may lack plottable values).
    pub filtered_count: usize,
}

impl ComputedView {
    pub fn point_count(&self) -> usize {
        series::point_count(&self.groups)
    }
}

/// Everything the render sink needs for one draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub groups: Vec<SeriesGroup>,
    pub display: ViewRange,
    pub x_label: String,
    pub y_label: String,
}

impl RenderFrame {
    pub fn new(groups: Vec<SeriesGroup>, display: ViewRange, axes: &AxisSelection) -> Self {
        Self {
            groups,
            display,
            x_label: pretty_label(&axes.x),
            y_label: pretty_label(&axes.y),
        }
    }
}

/// Filter → build series → full range, with no side effects.
pub fn compute_view(
    records: &[Record],
    schema: &Schema,
    params: &ViewParams,
    policy: &RangePolicy,
) -> Result<ComputedView, ViewError> {
    schema.check_axis(&params.axes.x)?;
    schema.check_axis(&params.axes.y)?;

    let kept = filter(records, &params.filter, schema);
    let groups = build_series(kept.iter().copied(), &params.axes, schema);
    let full = compute_full_range(&groups, policy)?;

    Ok(ComputedView {
        groups,
        full,
        filtered_count: kept.len(),
    })
}
