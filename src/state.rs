use std::fmt;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::data::filter::FilterConfig;
use crate::data::model::RecordStore;
use crate::error::{LoadError, ViewError};
use crate::view::series::AxisSelection;
use crate::view::zoom::ViewState;
use crate::view::{compute_view, RenderFrame, ViewParams};

// ---------------------------------------------------------------------------
// Status channel
// ---------------------------------------------------------------------------

/// What the status line currently reports.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Loading,
    Loaded { rows: usize },
    Displayed { points: usize },
    Exported { path: PathBuf },
    ExportFailed { reason: String },
    Error(ViewError),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_) | Status::ExportFailed { .. })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => Ok(()),
            Status::Loading => write!(f, "Loading dataset..."),
            Status::Loaded { rows } => write!(f, "Loaded {rows} rows."),
            Status::Displayed { points } => write!(f, "Displayed {points} points (filtered)."),
            Status::Exported { path } => write!(f, "Saved plot to {}.", path.display()),
            Status::ExportFailed { reason } => write!(f, "Error: export failed: {reason}"),
            Status::Error(e) => write!(f, "Error: {e}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomCommand {
    In,
    Out,
    Reset,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Only two things survive between pipeline passes: the record store and
/// the view state.  Everything the plot shows is rebuilt from them plus the
/// latest submitted [`ViewParams`].
pub struct AppState {
    pub config: AppConfig,

    /// Last successfully loaded dataset (None until a load succeeds).
    store: Option<RecordStore>,

    /// Parameters of the most recent pipeline pass.
    params: ViewParams,

    /// Parameters submitted since the last pass; only the newest is kept.
    pending: Option<ViewParams>,

    /// Display window and its full-data baseline.
    view: Option<ViewState>,

    /// What the plot draws; None when the last pass produced nothing.
    frame: Option<RenderFrame>,

    /// Status / error message shown in the UI.
    pub status: Status,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let schema = &config.schema;
        let x = schema.axis_or_first(&config.default_x).unwrap_or_default();
        let y = schema.axis_or_first(&config.default_y).unwrap_or_default();
        let params = ViewParams {
            filter: FilterConfig::allow_all(schema),
            axes: AxisSelection::new(x, y),
        };

        Self {
            config,
            store: None,
            params,
            pending: None,
            view: None,
            frame: None,
            status: Status::Idle,
            loading: false,
        }
    }

    pub fn store(&self) -> Option<&RecordStore> {
        self.store.as_ref()
    }

    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }

    pub fn frame(&self) -> Option<&RenderFrame> {
        self.frame.as_ref()
    }

    /// Newest parameters, whether or not they have been rendered yet.
    pub fn latest_params(&self) -> &ViewParams {
        self.pending.as_ref().unwrap_or(&self.params)
    }

    // -- Ingestion --

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.status = Status::Loading;
    }

    /// Accept the outcome of a load.  A failure keeps the previous store.
    pub fn finish_load(&mut self, result: Result<RecordStore, LoadError>) {
        self.loading = false;
        match result {
            Ok(store) => {
                log::info!(
                    "Loaded {} records with columns {:?}",
                    store.len(),
                    store.column_names
                );
                self.status = Status::Loaded { rows: store.len() };
                self.set_dataset(store);
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.status = Status::Error(e.into());
            }
        }
    }

    /// Ingest a newly loaded dataset and queue a fresh pass over it.
    pub fn set_dataset(&mut self, store: RecordStore) {
        self.store = Some(store);
        self.view = None;
        self.frame = None;
        self.pending = Some(self.latest_params().clone());
    }

    // -- Parameter changes --

    /// Record a parameter snapshot; it replaces any snapshot not yet rendered.
    pub fn submit(&mut self, params: ViewParams) {
        self.pending = Some(params);
    }

    /// Run the pipeline for the newest submitted snapshot, if any.
    /// Returns whether a pass ran.
    pub fn flush(&mut self) -> bool {
        let Some(params) = self.pending.take() else {
            return false;
        };
        self.params = params;
        self.refresh();
        true
    }

    /// Toggle the "Y starts at zero" policy and recompute.
    pub fn set_y_to_zero(&mut self, enabled: bool) {
        if self.config.range.y_to_zero != enabled {
            self.config.range.y_to_zero = enabled;
            self.pending = Some(self.latest_params().clone());
        }
    }

    fn refresh(&mut self) {
        let Some(store) = &self.store else {
            return;
        };

        let computed = compute_view(
            store.records(),
            &self.config.schema,
            &self.params,
            &self.config.range,
        );

        match computed {
            Ok(computed) => {
                let points = computed.point_count();
                log::debug!(
                    "{} records passed filters, {points} plottable",
                    computed.filtered_count
                );
                let view = match self.view.take() {
                    Some(mut view) => {
                        view.rebase(computed.full, &self.params.axes);
                        view
                    }
                    None => ViewState::new(computed.full, self.params.axes.clone()),
                };
                self.frame = Some(RenderFrame::new(
                    computed.groups,
                    view.display(),
                    &self.params.axes,
                ));
                self.view = Some(view);
                self.status = Status::Displayed { points };
            }
            Err(e) => {
                log::warn!("Nothing rendered: {e}");
                self.frame = None;
                self.status = Status::Error(e);
            }
        }
    }

    // -- Export --

    /// Report the outcome of writing a plot snapshot.  View state is untouched.
    pub fn finish_export(&mut self, path: PathBuf, result: anyhow::Result<()>) {
        self.status = match result {
            Ok(()) => Status::Exported { path },
            Err(e) => {
                log::error!("Failed to export plot: {e:#}");
                Status::ExportFailed {
                    reason: format!("{e:#}"),
                }
            }
        };
    }

    // -- Zoom --

    pub fn zoom(&mut self, command: ZoomCommand) {
        let Some(view) = self.view.as_mut() else {
            return;
        };

        let result = match command {
            ZoomCommand::In => view.zoom(self.config.zoom.in_factor),
            ZoomCommand::Out => view.zoom(self.config.zoom.out_factor),
            ZoomCommand::Reset => {
                view.reset_zoom();
                Ok(())
            }
        };

        match result {
            Ok(()) => {
                if let Some(frame) = self.frame.as_mut() {
                    frame.display = view.display();
                }
            }
            Err(e) => {
                log::warn!("Zoom rejected: {e}");
                self.status = Status::Error(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Outcome, Record, Sex, Value};
    use crate::view::zoom::ZoomMode;
    use std::collections::BTreeMap;

    fn rec(sex: &str, outcome: &str, age: f64, ef: f64) -> Record {
        let mut fields = BTreeMap::new();
        fields.insert("sex_label".to_string(), Value::Text(sex.into()));
        fields.insert("death_label".to_string(), Value::Text(outcome.into()));
        fields.insert("age".to_string(), Value::Number(age));
        fields.insert("ejection_fraction".to_string(), Value::Number(ef));
        Record::new(fields)
    }

    fn loaded_state() -> AppState {
        let config = AppConfig {
            default_x: "age".into(),
            default_y: "ejection_fraction".into(),
            data_file: None,
            ..Default::default()
        };
        let mut state = AppState::new(config);
        let store = RecordStore::from_records(
            vec![
                rec("Female", "Survived", 60.0, 38.0),
                rec("Male", "Died", 70.0, 20.0),
            ],
            &state.config.schema,
        );
        state.finish_load(Ok(store));
        assert!(state.flush());
        state
    }

    #[test]
    fn test_default_axes_from_config() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(state.latest_params().axes, AxisSelection::new("serum_sodium", "age"));
    }

    #[test]
    fn test_load_then_render() {
        let state = loaded_state();
        let frame = state.frame().unwrap();
        assert_eq!(frame.groups.len(), 2);
        assert_eq!(frame.x_label, "age");
        assert_eq!(frame.y_label, "ejection fraction");
        assert_eq!(state.status, Status::Displayed { points: 2 });
        assert_eq!(state.status.to_string(), "Displayed 2 points (filtered).");
        assert_eq!(state.view().unwrap().mode(), ZoomMode::Full);
    }

    #[test]
    fn test_no_data_skips_render_and_keeps_display() {
        let mut state = loaded_state();
        state.zoom(ZoomCommand::In);
        let before = state.view().unwrap().display();

        let mut params = state.latest_params().clone();
        params.filter.allowed_sex.clear();
        state.submit(params);
        state.flush();

        assert!(state.frame().is_none());
        assert_eq!(state.status, Status::Error(ViewError::NoData));
        assert_eq!(state.view().unwrap().display(), before);
    }

    #[test]
    fn test_error_pass_does_not_block_next_pass() {
        let mut state = loaded_state();
        let good = state.latest_params().clone();

        let mut bad = good.clone();
        bad.axes.x = "death_label".into();
        state.submit(bad);
        state.flush();
        assert!(matches!(state.status, Status::Error(ViewError::Schema { .. })));
        assert!(state.frame().is_none());

        state.submit(good);
        state.flush();
        assert!(state.frame().is_some());
    }

    #[test]
    fn test_zoom_twice_then_reset_restores_full_range() {
        let mut state = loaded_state();
        let full = state.view().unwrap().full();

        state.zoom(ZoomCommand::In);
        state.zoom(ZoomCommand::In);
        assert_ne!(state.frame().unwrap().display, full);

        state.zoom(ZoomCommand::Reset);
        assert_eq!(state.view().unwrap().display(), full);
        assert_eq!(state.frame().unwrap().display, full);
    }

    #[test]
    fn test_filter_change_keeps_zoom_axis_change_resets() {
        let mut state = loaded_state();
        state.zoom(ZoomCommand::In);
        let zoomed = state.view().unwrap().display();

        let params = state.latest_params().clone();
        let mut refiltered = params.clone();
        refiltered.filter = refiltered.filter.with_outcome(Outcome::Died, false);
        state.submit(refiltered);
        state.flush();
        assert_eq!(state.view().unwrap().display(), zoomed);

        let mut new_axes = params;
        new_axes.axes = AxisSelection::new("ejection_fraction", "age");
        state.submit(new_axes);
        state.flush();
        let view = state.view().unwrap();
        assert_eq!(view.mode(), ZoomMode::Full);
        assert_eq!(view.display(), view.full());
    }

    #[test]
    fn test_only_latest_submission_is_rendered() {
        let mut state = loaded_state();
        let base = state.latest_params().clone();

        let mut empty = base.clone();
        empty.filter.allowed_outcome.clear();
        state.submit(empty);

        let females = ViewParams {
            filter: base.filter.clone().with_sex(Sex::Male, false),
            axes: base.axes.clone(),
        };
        state.submit(females.clone());

        assert!(state.flush());
        assert!(!state.flush());
        let frame = state.frame().unwrap();
        assert_eq!(frame.groups.len(), 1);
        assert_eq!(frame.groups[0].outcome, Outcome::Survived);
        assert_eq!(state.latest_params(), &females);
    }

    #[test]
    fn test_failed_load_keeps_previous_store() {
        let mut state = loaded_state();
        state.begin_load();
        state.finish_load(Err(LoadError::Malformed {
            reason: "bad row".into(),
        }));

        assert!(!state.loading);
        assert_eq!(state.store().unwrap().len(), 2);
        assert!(state.frame().is_some());
        assert_eq!(
            state.status.to_string(),
            "Error: malformed dataset: bad row"
        );
    }

    #[test]
    fn test_failed_first_load_leaves_store_empty() {
        let mut state = AppState::new(AppConfig::default());
        state.finish_load(Err(LoadError::Empty));
        assert!(state.store().is_none());
        assert!(!state.flush());
        assert!(state.frame().is_none());
    }

    #[test]
    fn test_y_to_zero_toggle_recomputes() {
        let mut state = loaded_state();
        state.set_y_to_zero(true);
        state.flush();
        assert_eq!(state.view().unwrap().full().y.min, 0.0);
    }

    #[test]
    fn test_invalid_zoom_reports_error_and_keeps_frame() {
        let mut state = loaded_state();
        state.config.zoom.in_factor = 0.0;
        let before = state.frame().unwrap().display;
        state.zoom(ZoomCommand::In);
        assert!(state.status.is_error());
        assert_eq!(state.frame().unwrap().display, before);
    }

    #[test]
    fn test_export_outcome_reaches_status_line() {
        let mut state = loaded_state();
        let frame = state.frame().cloned();

        state.finish_export(
            PathBuf::from("/read-only/plot.png"),
            Err(anyhow::anyhow!("permission denied")),
        );
        assert!(state.status.is_error());
        assert_eq!(
            state.status.to_string(),
            "Error: export failed: permission denied"
        );
        assert_eq!(state.frame().cloned(), frame);

        state.finish_export(PathBuf::from("plot.png"), Ok(()));
        assert!(!state.status.is_error());
        assert_eq!(state.status.to_string(), "Saved plot to plot.png.");
    }
}
