//! Color palettes: ordered value → color stops.

use isoline_core::logging::targets;
use isoline_render::Color;
use tracing::debug;

use crate::parser::parse_stop;
use crate::{Error, Result};

/// How a palette is supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteSpec {
    /// One stop per line, `<value> <color>`. Blank lines and lines starting
    /// with `#` are ignored.
    Text(String),
    /// Stops given directly; order does not matter.
    Stops(Vec<(f32, Color)>),
}

impl From<&str> for PaletteSpec {
    fn from(text: &str) -> Self {
        PaletteSpec::Text(text.to_string())
    }
}

impl From<Vec<(f32, Color)>> for PaletteSpec {
    fn from(stops: Vec<(f32, Color)>) -> Self {
        PaletteSpec::Stops(stops)
    }
}

/// One palette entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteStop {
    pub value: f32,
    pub color: Color,
}

/// A parsed palette with stops sorted by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    stops: Vec<PaletteStop>,
}

impl Palette {
    /// Build a palette from unordered stops.
    pub fn new(stops: impl IntoIterator<Item = (f32, Color)>) -> Result<Self> {
        let mut stops: Vec<_> = stops
            .into_iter()
            .map(|(value, color)| PaletteStop { value, color })
            .collect();

        if stops.is_empty() {
            return Err(Error::EmptyPalette);
        }
        if let Some(stop) = stops.iter().find(|s| !s.value.is_finite()) {
            return Err(Error::NonFiniteStop(stop.value));
        }

        // Stable, so equal values keep their input order.
        stops.sort_by(|a, b| a.value.total_cmp(&b.value));
        Ok(Self { stops })
    }

    /// The stops in ascending value order.
    pub fn stops(&self) -> &[PaletteStop] {
        &self.stops
    }

    /// `(min, max)` of the stop values.
    pub fn bounds(&self) -> (f32, f32) {
        // non-empty by construction
        let first = self.stops.first().map_or(0.0, |s| s.value);
        let last = self.stops.last().map_or(0.0, |s| s.value);
        (first, last)
    }

    /// The color at `value`, interpolated between neighbouring stops and
    /// clamped to the end stops.
    pub fn color_at(&self, value: f32) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::TRANSPARENT;
        };
        if value <= first.value {
            return first.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if value <= b.value {
                let span = b.value - a.value;
                if span <= 0.0 {
                    return b.color;
                }
                return a.color.lerp(b.color, (value - a.value) / span);
            }
        }

        self.stops.last().map_or(first.color, |s| s.color)
    }
}

/// Parse a palette specification.
pub fn parse_palette(spec: &PaletteSpec) -> Result<Palette> {
    let palette = match spec {
        PaletteSpec::Stops(stops) => Palette::new(stops.iter().copied())?,
        PaletteSpec::Text(text) => {
            let mut stops = Vec::new();
            for (index, line) in text.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                stops.push(parse_stop(line, index as u32 + 1)?);
            }
            Palette::new(stops)?
        }
    };

    let (min, max) = palette.bounds();
    debug!(
        target: targets::PALETTE,
        stops = palette.stops().len(),
        min,
        max,
        "parsed palette"
    );
    Ok(palette)
}
