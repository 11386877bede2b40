use crate::data::model::{Outcome, Record, Sex};
use crate::data::schema::Schema;

// ---------------------------------------------------------------------------
// Axis selection
// ---------------------------------------------------------------------------

/// The two numeric columns currently placed on the axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSelection {
    pub x: String,
    pub y: String,
}

impl AxisSelection {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// What the plot shows when a point is hovered.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub outcome: Outcome,
    pub sex: Option<Sex>,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
    pub hover: HoverInfo,
}

/// One outcome category's plotted points.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesGroup {
    pub outcome: Outcome,
    pub points: Vec<SeriesPoint>,
}

impl SeriesGroup {
    pub fn label(&self) -> &'static str {
        self.outcome.label()
    }
}

/// Group records by outcome into per-category point series.
///
/// Groups appear in the order their category is first seen.  A record is
/// dropped when either axis value is absent or when its outcome is not
/// recognised; neither is an error.
pub fn build_series<'a, I>(records: I, axes: &AxisSelection, schema: &Schema) -> Vec<SeriesGroup>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: Vec<SeriesGroup> = Vec::new();

    for rec in records {
        let (Some(x), Some(y)) = (rec.number(&axes.x), rec.number(&axes.y)) else {
            continue;
        };
        let Some(outcome) = Outcome::normalize(rec.get(&schema.outcome_field)) else {
            continue;
        };

        let point = SeriesPoint {
            x,
            y,
            hover: HoverInfo {
                outcome,
                sex: Sex::normalize(rec.get(&schema.sex_field)),
                x,
                y,
            },
        };

        match groups.iter_mut().find(|g| g.outcome == outcome) {
            Some(group) => group.points.push(point),
            None => groups.push(SeriesGroup {
                outcome,
                points: vec![point],
            }),
        }
    }

    groups
}

/// Total number of points across all groups.
pub fn point_count(groups: &[SeriesGroup]) -> usize {
    groups.iter().map(|g| g.points.len()).sum()
}
