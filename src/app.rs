use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;

use crate::color::OutcomeColors;
use crate::config::AppConfig;
use crate::data::loader::LoadTask;
use crate::export;
use crate::state::AppState;
use crate::ui::panels::{self, MenuAction};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HeartExplorerApp {
    pub state: AppState,
    colors: OutcomeColors,
    /// Background load in flight.
    pending_load: Option<LoadTask>,
    /// Set when a screenshot has been requested for PNG export.
    pending_export: bool,
    /// Plot area of the last frame, used to crop exports.
    plot_rect: Option<egui::Rect>,
}

impl HeartExplorerApp {
    pub fn new(config: AppConfig) -> Self {
        let data_file = config.data_file.clone();
        let mut app = Self {
            state: AppState::new(config),
            colors: OutcomeColors::default(),
            pending_load: None,
            pending_export: false,
            plot_rect: None,
        };
        if let Some(path) = data_file {
            app.load_file(path);
        }
        app
    }

    /// Parse a data file on a background thread so the UI stays responsive.
    fn load_file(&mut self, path: PathBuf) {
        if self.pending_load.is_some() {
            log::warn!("Ignoring load of {}: a load is already running", path.display());
            return;
        }
        log::info!("Loading {}", path.display());
        self.state.begin_load();

        let schema = self.state.config.schema.clone();
        self.pending_load = Some(LoadTask::load(path, schema));
    }

    fn poll_load(&mut self) {
        let Some(task) = self.pending_load.take() else {
            return;
        };
        match task.try_finish() {
            Ok(result) => self.state.finish_load(result),
            Err(task) => self.pending_load = Some(task),
        }
    }

    fn poll_export(&mut self, ctx: &egui::Context) {
        if !self.pending_export {
            return;
        }
        let screenshot = ctx.input(|i| {
            i.raw.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(Arc::clone(image)),
                _ => None,
            })
        });
        let Some(image) = screenshot else {
            return;
        };
        self.pending_export = false;

        let snapshot = export::crop_screenshot(&image, self.plot_rect, ctx.pixels_per_point());
        if let Some(path) = panels::save_png_dialog() {
            let saved = export::save_png(&snapshot, &path);
            self.state.finish_export(path, saved);
        }
    }
}

impl eframe::App for HeartExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_load();
        self.poll_export(ctx);

        // ---- Top panel: menu bar ----
        let action = egui::TopBottomPanel::top("top_bar")
            .show(ctx, |ui| panels::top_bar(ui, &self.state))
            .inner;

        match action {
            Some(MenuAction::Open(path)) => self.load_file(path),
            Some(MenuAction::ExportPng) => {
                self.pending_export = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
            }
            None => {}
        }

        // ---- Left side panel: axes, filters, zoom ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.colors);
            });

        // Only the newest parameter snapshot of this frame is rendered.
        self.state.flush();

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            self.plot_rect = plot::scatter_plot(ui, &self.state, &self.colors);
        });

        if self.pending_load.is_some() || self.pending_export {
            ctx.request_repaint();
        }
    }
}
