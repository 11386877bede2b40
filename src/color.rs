use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Outcome;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting from `hue_offset` degrees.
pub fn generate_palette(n: usize, hue_offset: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (hue_offset + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: outcome category → Color32
// ---------------------------------------------------------------------------

/// Fixed colour per outcome so a category keeps its colour when the other
/// one is filtered out.
#[derive(Debug, Clone)]
pub struct OutcomeColors {
    mapping: BTreeMap<Outcome, Color32>,
}

impl Default for OutcomeColors {
    fn default() -> Self {
        // Survived starts at a blue-green hue, Died lands opposite in the red range.
        let palette = generate_palette(Outcome::ALL.len(), 180.0);
        OutcomeColors {
            mapping: Outcome::ALL.into_iter().zip(palette).collect(),
        }
    }
}

impl OutcomeColors {
    pub fn color_for(&self, outcome: Outcome) -> Color32 {
        self.mapping
            .get(&outcome)
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}
