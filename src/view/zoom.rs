use super::range::ViewRange;
use super::series::AxisSelection;
use crate::error::ViewError;

/// Smallest span allowed relative to the magnitude of the range bounds.
/// Below this the two bounds stop being distinguishable in `f64`.
const MIN_RELATIVE_SPAN: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    /// Display window equals the full-data range.
    Full,
    Zoomed,
}

/// The displayed axis window and the full-data range it can be reset to.
///
/// This is the single source of truth for what the plot shows; the plot
/// widget never feeds its own bounds back in.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    full: ViewRange,
    display: ViewRange,
    axes: AxisSelection,
    mode: ZoomMode,
}

impl ViewState {
    /// Start in `Full` mode showing `full`.
    pub fn new(full: ViewRange, axes: AxisSelection) -> Self {
        Self {
            full,
            display: full,
            axes,
            mode: ZoomMode::Full,
        }
    }

    pub fn full(&self) -> ViewRange {
        self.full
    }

    pub fn display(&self) -> ViewRange {
        self.display
    }

    pub fn mode(&self) -> ZoomMode {
        self.mode
    }

    /// Scale the display window about its centre on both axes.
    ///
    /// The window is left untouched and `InvalidZoom` returned when the
    /// factor is not a positive finite number or the result would collapse
    /// or overflow.
    pub fn zoom(&mut self, factor: f64) -> Result<(), ViewError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ViewError::InvalidZoom { factor });
        }

        let next = self.display.scaled(factor);
        if !next.is_valid() || !has_resolvable_span(&next) {
            return Err(ViewError::InvalidZoom { factor });
        }

        self.display = next;
        self.mode = ZoomMode::Zoomed;
        Ok(())
    }

    /// Show the full-data range again.
    pub fn reset_zoom(&mut self) {
        self.display = self.full;
        self.mode = ZoomMode::Full;
    }

    /// Adopt a freshly computed full range after a filter or axis change.
    ///
    /// A change of axes, or a display window that is no longer valid, resets
    /// to the new full range.  Otherwise the current zoom window is kept.
    pub fn rebase(&mut self, full: ViewRange, axes: &AxisSelection) {
        self.full = full;
        if self.axes != *axes || !self.display.is_valid() {
            self.axes = axes.clone();
            self.reset_zoom();
            return;
        }
        self.mode = if self.display == self.full {
            ZoomMode::Full
        } else {
            ZoomMode::Zoomed
        };
    }
}

fn has_resolvable_span(range: &ViewRange) -> bool {
    [range.x, range.y].iter().all(|r| {
        let magnitude = r.min.abs().max(r.max.abs()).max(1.0);
        r.span() > magnitude * MIN_RELATIVE_SPAN
    })
}
