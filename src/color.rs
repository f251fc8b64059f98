use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::stats::CorrelationStrength;

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
            // Start at the teal the dashboard uses as its accent.
            let hue = (165.0 + (i as f32 / n as f32) * 360.0) % 360.0;
            hsl_to_color32(hue, 0.75, 0.55)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart themes
// ---------------------------------------------------------------------------

/// Named series colour schemes for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartTheme {
    #[default]
    Quantum,
    Neon,
    Ocean,
}

impl ChartTheme {
    pub const ALL: [ChartTheme; 3] = [ChartTheme::Quantum, ChartTheme::Neon, ChartTheme::Ocean];

    pub fn label(self) -> &'static str {
        match self {
            ChartTheme::Quantum => "Quantum",
            ChartTheme::Neon => "Neon",
            ChartTheme::Ocean => "Ocean",
        }
    }

    /// Primary, secondary and tertiary series colours.
    fn base_colors(self) -> [Color32; 3] {
        match self {
            ChartTheme::Quantum => [
                Color32::from_rgb(0x00, 0xff, 0xcc),
                Color32::from_rgb(0xff, 0x6b, 0x6b),
                Color32::from_rgb(0x4e, 0xcd, 0xc4),
            ],
            ChartTheme::Neon => [
                Color32::from_rgb(0xff, 0x00, 0x80),
                Color32::from_rgb(0x00, 0xff, 0x80),
                Color32::from_rgb(0x80, 0x00, 0xff),
            ],
            ChartTheme::Ocean => [
                Color32::from_rgb(0x00, 0x77, 0xbe),
                Color32::from_rgb(0x00, 0xa8, 0xcc),
                Color32::from_rgb(0x7f, 0xb3, 0xd3),
            ],
        }
    }

    /// `n` series colours: the theme's own three first, then generated hues.
    pub fn palette(self, n: usize) -> Vec<Color32> {
        let base = self.base_colors();
        let extra = generate_palette(n);
        (0..n)
            .map(|i| base.get(i).copied().unwrap_or(extra[i]))
            .collect()
    }
}

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Correlation badges
// ---------------------------------------------------------------------------

/// Badge colour for a correlation coefficient: green / yellow / gray.
pub fn correlation_color(r: f64) -> Color32 {
    match CorrelationStrength::classify(r) {
        CorrelationStrength::Strong => hsl_to_color32(142.0, 0.70, 0.50),
        CorrelationStrength::Moderate => hsl_to_color32(48.0, 0.90, 0.55),
        CorrelationStrength::Weak => Color32::GRAY,
    }
}
