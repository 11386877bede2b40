use std::collections::BTreeSet;

use eframe::egui::{Rect, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotBounds, PlotPoints, Points};

use crate::color::OutcomeColors;
use crate::state::AppState;
use crate::view::series::HoverInfo;
use crate::view::RenderFrame;

// ---------------------------------------------------------------------------
// Scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Draw the current frame.  Returns the plot area so exports can crop to it.
///
/// The widget's own zoom and pan are disabled: bounds always come from the
/// frame's display range.
pub fn scatter_plot(ui: &mut Ui, state: &AppState, colors: &OutcomeColors) -> Option<Rect> {
    let Some(frame) = state.frame() else {
        let message = if state.store().is_none() {
            "Open a file to explore records  (File → Open…)".to_string()
        } else {
            state.status.to_string()
        };
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(message);
        });
        return None;
    };

    let hover_text = hover_formatter(frame);
    let display = frame.display;

    let response = Plot::new("scatter_plot")
        .legend(Legend::default())
        .x_axis_label(frame.x_label.clone())
        .y_axis_label(frame.y_label.clone())
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_double_click_reset(false)
        .label_formatter(hover_text)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [display.x.min, display.y.min],
                [display.x.max, display.y.max],
            ));

            for group in &frame.groups {
                let points: PlotPoints = group.points.iter().map(|p| [p.x, p.y]).collect();
                plot_ui.points(
                    Points::new(points)
                        .name(group.label())
                        .color(colors.color_for(group.outcome))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(4.0),
                );
            }
        });

    Some(response.response.rect)
}

/// Build the hover label: outcome, sex and both axis values.
fn hover_formatter(frame: &RenderFrame) -> impl Fn(&str, &egui_plot::PlotPoint) -> String {
    let x_label = frame.x_label.clone();
    let y_label = frame.y_label.clone();
    let hovers: Vec<HoverInfo> = frame
        .groups
        .iter()
        .flat_map(|g| g.points.iter().map(|p| p.hover.clone()))
        .collect();

    move |name, value| {
        if name.is_empty() {
            return format!("{x_label}: {:.2}\n{y_label}: {:.2}", value.x, value.y);
        }
        format!(
            "{name}\n{x_label}: {}\n{y_label}: {}\n{}",
            value.x,
            value.y,
            describe_patients_at(&hovers, name, value.x, value.y)
        )
    }
}

/// Sex of every patient in series `name` plotted at exactly `(x, y)`.
/// Overlapping patients are all listed, with a count.
fn describe_patients_at(hovers: &[HoverInfo], name: &str, x: f64, y: f64) -> String {
    let here: Vec<&HoverInfo> = hovers
        .iter()
        .filter(|h| h.outcome.label() == name && h.x == x && h.y == y)
        .collect();

    let sexes: BTreeSet<&str> = here
        .iter()
        .map(|h| h.sex.map_or("?", |s| s.label()))
        .collect();
    let sexes = if sexes.is_empty() {
        "?".to_string()
    } else {
        sexes.into_iter().collect::<Vec<_>>().join(", ")
    };

    match here.len() {
        0 | 1 => format!("sex: {sexes}"),
        n => format!("sex: {sexes} ({n} patients)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Outcome, Sex};

    fn hover(outcome: Outcome, sex: Option<Sex>, x: f64, y: f64) -> HoverInfo {
        HoverInfo { outcome, sex, x, y }
    }

    #[test]
    fn test_single_patient_shows_its_sex() {
        let hovers = vec![
            hover(Outcome::Died, Some(Sex::Male), 70.0, 20.0),
            hover(Outcome::Survived, Some(Sex::Female), 70.0, 20.0),
        ];
        assert_eq!(describe_patients_at(&hovers, "Survived", 70.0, 20.0), "sex: Female");
    }

    #[test]
    fn test_overlapping_patients_list_every_sex() {
        let hovers = vec![
            hover(Outcome::Died, Some(Sex::Male), 70.0, 20.0),
            hover(Outcome::Died, Some(Sex::Female), 70.0, 20.0),
            hover(Outcome::Died, Some(Sex::Male), 70.0, 20.0),
        ];
        assert_eq!(
            describe_patients_at(&hovers, "Died", 70.0, 20.0),
            "sex: Female, Male (3 patients)"
        );
    }

    #[test]
    fn test_unknown_point_or_sex_shows_question_mark() {
        let hovers = vec![hover(Outcome::Died, None, 1.0, 2.0)];
        assert_eq!(describe_patients_at(&hovers, "Died", 1.0, 2.0), "sex: ?");
        assert_eq!(describe_patients_at(&hovers, "Died", 5.0, 5.0), "sex: ?");
    }
}
