//! Color type shared by uniforms, palettes and textures.

/// An RGBA color, premultiplied, components in `0.0..=1.0`.
///
/// Premultiplied so palette ramps interpolate without dark fringes between a
/// transparent stop and an opaque one, and so the shader can composite the
/// transparent color with a single multiply-add.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::from_rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::from_rgb(1.0, 1.0, 1.0);
    pub const GRAY: Self = Self::from_rgb(0.5, 0.5, 0.5);
    pub const RED: Self = Self::from_rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::from_rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::from_rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::from_rgb(1.0, 1.0, 0.0);
    pub const CYAN: Self = Self::from_rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Self = Self::from_rgb(1.0, 0.0, 1.0);

    /// A color from already premultiplied components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// An opaque color.
    #[inline]
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// A color from straight (non-premultiplied) components.
    #[inline]
    pub fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::new(r * a, g * a, b * a, a)
    }

    /// An opaque color from 8-bit components.
    #[inline]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, u8::MAX)
    }

    /// A color from straight 8-bit components.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let unit = |v: u8| f32::from(v) / 255.0;
        Self::from_rgba(unit(r), unit(g), unit(b), unit(a))
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`; the `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let nibbles: Vec<u8> = digits
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;

        let channels: Vec<u8> = match nibbles.len() {
            3 | 4 => nibbles.iter().map(|n| n * 17).collect(),
            6 | 8 => nibbles.chunks_exact(2).map(|p| p[0] << 4 | p[1]).collect(),
            _ => return None,
        };
        let alpha = channels.get(3).copied().unwrap_or(u8::MAX);
        Some(Self::from_rgba8(channels[0], channels[1], channels[2], alpha))
    }

    /// Componentwise interpolation towards `other`.
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// `[r, g, b, a]`, as written into uniform blocks.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Quantized premultiplied texel, as written into palette ramps.
    pub fn to_rgba8(self) -> [u8; 4] {
        self.to_array()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_forms() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("#f00"), Some(Color::RED));
        assert_eq!(Color::from_hex("00ff00ff"), Some(Color::GREEN));
        assert_eq!(Color::from_hex("#12"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_premultiplied_rgba8() {
        let c = Color::from_rgba8(255, 0, 0, 128);
        assert_eq!(c.to_rgba8(), [128, 0, 0, 128]);
    }

    #[test]
    fn test_lerp_midpoint() {
        let c = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(c, Color::from_rgb(0.5, 0.5, 0.5));
    }
}
