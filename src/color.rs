use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use customer_dashboard::data::model::CellValue;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.6);
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
// Heatmap scale
// ---------------------------------------------------------------------------

/// Blue scale for a correlation in `[-1, 1]`: pale at -1, deep blue at 1.
pub fn heat_color(r: f64) -> Color32 {
    let t = ((r.clamp(-1.0, 1.0) + 1.0) / 2.0) as f32;
    let light = Srgb::new(0.97_f32, 0.98, 1.0);
    let dark = Srgb::new(0.03_f32, 0.19, 0.42);
    let mix = |a: f32, b: f32| a + (b - a) * t;
    Color32::from_rgb(
        (mix(light.red, dark.red) * 255.0) as u8,
        (mix(light.green, dark.green) * 255.0) as u8,
        (mix(light.blue, dark.blue) * 255.0) as u8,
    )
}

/// Text colour that stays readable on a [`heat_color`] cell.
pub fn heat_text_color(r: f64) -> Color32 {
    if r > 0.3 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}

// ---------------------------------------------------------------------------
// Color mapping: cell value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from a column's distinct values, in display order.
    pub fn new(values: &[CellValue]) -> Self {
        let palette = generate_palette(values.len());
        let mapping: BTreeMap<CellValue, Color32> = values
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}
