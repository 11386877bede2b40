use serde::Deserialize;

use super::series::SeriesGroup;
use crate::error::ViewError;

// ---------------------------------------------------------------------------
// Axis ranges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Finite and non-degenerate (`min < max`).
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    /// Scale about the centre.  `factor < 1` narrows, `factor > 1` widens.
    pub fn scaled(&self, factor: f64) -> AxisRange {
        let mid = self.mid();
        let half = self.span() / 2.0 * factor;
        AxisRange::new(mid - half, mid + half)
    }
}

/// Axis window on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRange {
    pub x: AxisRange,
    pub y: AxisRange,
}

impl ViewRange {
    pub fn is_valid(&self) -> bool {
        self.x.is_valid() && self.y.is_valid()
    }

    pub fn scaled(&self, factor: f64) -> ViewRange {
        ViewRange {
            x: self.x.scaled(factor),
            y: self.y.scaled(factor),
        }
    }
}

// ---------------------------------------------------------------------------
// Full-range computation
// ---------------------------------------------------------------------------

/// Presentation policy for the full-data range.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RangePolicy {
    /// Fraction of the data span added on each side.
    pub padding_fraction: f64,
    /// Start Y at zero when every Y value is non-negative.
    pub y_to_zero: bool,
}

impl Default for RangePolicy {
    fn default() -> Self {
        Self {
            padding_fraction: DEFAULT_PADDING_FRACTION,
            y_to_zero: false,
        }
    }
}

impl RangePolicy {
    /// Whether `padding_fraction` is a usable, non-negative finite number.
    pub fn is_valid(&self) -> bool {
        self.padding_fraction.is_finite() && self.padding_fraction >= 0.0
    }

    /// Padding fraction in effect; an unusable value reads as the default.
    pub fn padding(&self) -> f64 {
        if self.is_valid() {
            self.padding_fraction
        } else {
            DEFAULT_PADDING_FRACTION
        }
    }
}

const DEFAULT_PADDING_FRACTION: f64 = 0.05;

/// Lower bound on the padding, in machine epsilons of the bound magnitude.
/// Keeps the padded bounds distinct from the data bounds in `f64`.
const MIN_PAD_EPSILONS: f64 = 4.0;

/// `[min - pad, max + pad]`.  A zero span gets a padding of 1.
fn padded(min: f64, max: f64, fraction: f64) -> AxisRange {
    let pad = if max == min { 1.0 } else { (max - min) * fraction };
    let magnitude = min.abs().max(max.abs());
    let pad = pad.max(magnitude * MIN_PAD_EPSILONS * f64::EPSILON);
    AxisRange::new(min - pad, max + pad)
}

/// Full-data window over every point in `groups`, padded per `policy`.
///
/// Returns [`ViewError::NoData`] when there is no point to show and
/// [`ViewError::RangeOverflow`] when the padded window is not finite.
/// Every `Ok` range satisfies `min < max` on both axes.
pub fn compute_full_range(groups: &[SeriesGroup], policy: &RangePolicy) -> Result<ViewRange, ViewError> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for p in groups.iter().flat_map(|g| &g.points) {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || !y_min.is_finite() || !y_max.is_finite() {
        return Err(ViewError::NoData);
    }

    let x = padded(x_min, x_max, policy.padding());
    let mut y = padded(y_min, y_max, policy.padding());

    if policy.y_to_zero && y_min >= 0.0 {
        y.min = 0.0;
        if y.max <= 0.0 {
            y.max = 1.0;
        }
    }

    if !x.is_valid() {
        return Err(ViewError::RangeOverflow { axis: "x" });
    }
    if !y.is_valid() {
        return Err(ViewError::RangeOverflow { axis: "y" });
    }

    Ok(ViewRange { x, y })
}
