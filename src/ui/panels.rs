use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::OutcomeColors;
use crate::data::model::{Outcome, Sex};
use crate::data::schema::pretty_label;
use crate::state::{AppState, ZoomCommand};
use crate::view::zoom::ZoomMode;

// ---------------------------------------------------------------------------
// Left side panel – filter and axis widgets
// ---------------------------------------------------------------------------

/// Render the left panel.  Widget changes are collected into one fresh
/// parameter snapshot and submitted once.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, colors: &OutcomeColors) {
    let mut next = state.latest_params().clone();
    let mut changed = false;
    let schema = state.config.schema.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Axes ----
            ui.heading("Axes");
            ui.separator();
            changed |= axis_combo(ui, "x_axis", "X axis", &schema.numeric_fields, &mut next.axes.x);
            changed |= axis_combo(ui, "y_axis", "Y axis", &schema.numeric_fields, &mut next.axes.y);

            let mut y_to_zero = state.config.range.y_to_zero;
            if ui.checkbox(&mut y_to_zero, "Y axis starts at 0").changed() {
                state.set_y_to_zero(y_to_zero);
            }
            ui.add_space(8.0);

            // ---- Filters ----
            ui.heading("Filters");
            ui.separator();

            ui.strong("Sex");
            for sex in Sex::ALL {
                let mut checked = next.filter.allowed_sex.contains(&sex);
                if ui.checkbox(&mut checked, sex.label()).changed() {
                    next.filter = next.filter.clone().with_sex(sex, checked);
                    changed = true;
                }
            }

            ui.strong("Outcome");
            for outcome in Outcome::ALL {
                let mut checked = next.filter.allowed_outcome.contains(&outcome);
                let text = RichText::new(outcome.label()).color(colors.color_for(outcome));
                if ui.checkbox(&mut checked, text).changed() {
                    next.filter = next.filter.clone().with_outcome(outcome, checked);
                    changed = true;
                }
            }

            ui.strong("Require condition");
            for flag in &schema.condition_flags {
                let mut checked = next.filter.requires(flag);
                if ui.checkbox(&mut checked, pretty_label(flag)).changed() {
                    next.filter = next.filter.clone().with_required(flag, checked);
                    changed = true;
                }
            }
            ui.add_space(8.0);

            // ---- Zoom ----
            ui.heading("Zoom");
            ui.separator();
            ui.horizontal(|ui: &mut Ui| {
                let enabled = state.view().is_some();
                if ui.add_enabled(enabled, egui::Button::new("Zoom in")).clicked() {
                    state.zoom(ZoomCommand::In);
                }
                if ui.add_enabled(enabled, egui::Button::new("Zoom out")).clicked() {
                    state.zoom(ZoomCommand::Out);
                }
                if ui.add_enabled(enabled, egui::Button::new("Reset zoom")).clicked() {
                    state.zoom(ZoomCommand::Reset);
                }
            });
            if let Some(view) = state.view() {
                let text = match view.mode() {
                    ZoomMode::Full => "Showing full range".to_string(),
                    ZoomMode::Zoomed => format!(
                        "Zoomed to {:.0}% of full range",
                        100.0 * view.display().x.span() / view.full().x.span()
                    ),
                };
                ui.label(RichText::new(text).weak());
            }
        });

    if changed {
        state.submit(next);
    }
}

/// Single-choice dropdown over the numeric fields.  Returns whether the
/// selection changed.
fn axis_combo(ui: &mut Ui, id: &str, label: &str, fields: &[String], current: &mut String) -> bool {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(pretty_label(current.as_str()))
            .show_ui(ui, |ui: &mut Ui| {
                for field in fields {
                    let selected = current.as_str() == field.as_str();
                    if ui.selectable_label(selected, pretty_label(field)).clicked() && !selected {
                        *current = field.clone();
                        changed = true;
                    }
                }
            });
    });
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Requests from the menu bar that the app shell carries out.
pub enum MenuAction {
    Open(PathBuf),
    ExportPng,
}

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &AppState) -> Option<MenuAction> {
    let mut action = None;

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                action = open_file_dialog().map(MenuAction::Open);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.frame().is_some(), egui::Button::new("Export PNG…"))
                .clicked()
            {
                action = Some(MenuAction::ExportPng);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(store) = state.store() {
            ui.label(format!("{} records loaded", store.len()));
            ui.separator();
        }

        if state.loading {
            ui.spinner();
        }

        let status = state.status.to_string();
        if state.status.is_error() {
            ui.label(RichText::new(status).color(Color32::RED));
        } else {
            ui.label(status);
        }
    });

    action
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open clinical records")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

pub fn save_png_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export plot")
        .set_file_name("plot.png")
        .add_filter("PNG Image", &["png"])
        .save_file()
}
