use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Series colours: country → Color32
// ---------------------------------------------------------------------------

/// Maps the selected countries to distinct line colours.
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
}

impl SeriesColors {
    /// Assign colours in selection order so a country keeps its colour
    /// across both graph modes.
    pub fn new(countries: &[String]) -> Self {
        let palette = generate_palette(countries.len());
        let mapping = countries.iter().cloned().zip(palette).collect();
        SeriesColors { mapping }
    }

    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping
            .get(country)
            .copied()
            .unwrap_or(Color32::LIGHT_BLUE)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sequential scale for the map
// ---------------------------------------------------------------------------

/// ColorBrewer GnBu, light to dark.
const GNBU: [(u8, u8, u8); 9] = [
    (0xf7, 0xfc, 0xf0),
    (0xe0, 0xf3, 0xdb),
    (0xcc, 0xeb, 0xc5),
    (0xa8, 0xdd, 0xb5),
    (0x7b, 0xcc, 0xc4),
    (0x4e, 0xb3, 0xd3),
    (0x2b, 0x8c, 0xbe),
    (0x08, 0x68, 0xac),
    (0x08, 0x40, 0x81),
];

/// Continuous colour scale interpolated in linear RGB between fixed stops.
#[derive(Debug, Clone)]
pub struct SequentialScale {
    stops: Vec<LinSrgb>,
    no_data: Color32,
}

impl SequentialScale {
    pub fn gnbu() -> Self {
        let stops = GNBU
            .iter()
            .map(|&(r, g, b)| -> LinSrgb {
                let rgb: Srgb = Srgb::<u8>::new(r, g, b).into_format();
                rgb.into_linear()
            })
            .collect();
        Self {
            stops,
            no_data: Color32::GRAY,
        }
    }

    /// Colour for `t` in `[0, 1]`; values outside are clamped.
    pub fn at(&self, t: f32) -> Color32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.stops.len() - 1;
        let pos = t * last as f32;
        let lo = (pos.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        let mixed = self.stops[lo].mix(self.stops[hi], pos - lo as f32);
        to_color32(Srgb::from_linear(mixed))
    }

    /// Colour for `value` within `range`; grey when there is no value.
    pub fn color_for(&self, value: Option<f64>, range: Option<(f64, f64)>) -> Color32 {
        match (value, range) {
            (Some(v), Some((lo, hi))) if hi > lo => self.at(((v - lo) / (hi - lo)) as f32),
            (Some(_), Some(_)) => self.at(1.0),
            _ => self.no_data,
        }
    }

    pub fn no_data(&self) -> Color32 {
        self.no_data
    }
}
