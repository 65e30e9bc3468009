//! Layer props and their defaults.

use std::sync::Arc;

use isoline_core::{CoordinateSystem, GeoBounds};
use isoline_render::{Color, RenderParameterOverrides, Texture, TextureData};
use isoline_style::PaletteSpec;

/// How raster samples are reconstructed between texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageInterpolation {
    Nearest,
    Linear,
    /// Catmull-Rom over a 4×4 neighbourhood.
    #[default]
    Cubic,
}

impl ImageInterpolation {
    /// The tag written into the raster uniform block.
    pub const fn tag(self) -> u32 {
        match self {
            ImageInterpolation::Nearest => 0,
            ImageInterpolation::Linear => 1,
            ImageInterpolation::Cubic => 2,
        }
    }
}

/// What the raster channels hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageType {
    /// One value in the first channel.
    #[default]
    Scalar,
    /// `(u, v)` components in the first two channels.
    Vector,
}

impl ImageType {
    /// The tag written into the raster uniform block.
    pub const fn tag(self) -> u32 {
        match self {
            ImageType::Scalar => 0,
            ImageType::Vector => 1,
        }
    }
}

/// Props shared by the composite layer and its bitmap child.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourStyle {
    /// Map 8-bit samples from `[0, 1]` to `[min, max]`.
    pub image_unscale: Option<[f32; 2]>,
    /// Values below are treated as no data.
    pub image_min_value: Option<f32>,
    /// Values above are treated as no data.
    pub image_max_value: Option<f32>,
    pub image_interpolation: ImageInterpolation,
    /// Blend factor towards the secondary image, `0.0..=1.0`.
    pub image_weight: f32,
    /// Sampling blur radius in texels; 0 disables.
    pub image_smoothing: f32,
    pub image_type: ImageType,
    /// Lowest zoom the layer draws at; `None` is unbounded.
    pub min_zoom: Option<f64>,
    /// Highest zoom the layer draws at; `None` is unbounded.
    pub max_zoom: Option<f64>,
    pub palette: Option<Arc<PaletteSpec>>,
    /// Line color used when there is no palette.
    pub color: Color,
    /// Spacing between minor lines; 0 disables them.
    pub interval: f32,
    /// Spacing between major lines; 0 disables them.
    pub major_interval: f32,
    /// Minor line width in pixels. Major lines are twice as wide.
    pub width: f32,
    pub opacity: f32,
    /// Color composited under partially covered pixels.
    pub transparent_color: Color,
    /// Render state overrides applied after the layer's own.
    pub parameters: RenderParameterOverrides,
}

impl Default for ContourStyle {
    fn default() -> Self {
        Self {
            image_unscale: None,
            image_min_value: None,
            image_max_value: None,
            image_interpolation: ImageInterpolation::Cubic,
            image_weight: 0.0,
            image_smoothing: 0.0,
            image_type: ImageType::Scalar,
            min_zoom: Some(0.0),
            max_zoom: Some(10.0),
            palette: None,
            color: Color::WHITE,
            interval: 0.0,
            major_interval: 0.0,
            width: 1.0,
            opacity: 1.0,
            transparent_color: Color::TRANSPARENT,
            parameters: RenderParameterOverrides::NONE,
        }
    }
}

macro_rules! style_builders {
    () => {
        /// Unscale 8-bit samples to `[min, max]`.
        pub fn with_unscale(mut self, min: f32, max: f32) -> Self {
            self.style.image_unscale = Some([min, max]);
            self
        }

        /// Treat values outside `[min, max]` as no data.
        pub fn with_value_range(mut self, min: Option<f32>, max: Option<f32>) -> Self {
            self.style.image_min_value = min;
            self.style.image_max_value = max;
            self
        }

        pub fn with_interpolation(mut self, interpolation: ImageInterpolation) -> Self {
            self.style.image_interpolation = interpolation;
            self
        }

        pub fn with_weight(mut self, weight: f32) -> Self {
            self.style.image_weight = weight;
            self
        }

        pub fn with_smoothing(mut self, smoothing: f32) -> Self {
            self.style.image_smoothing = smoothing;
            self
        }

        pub fn with_image_type(mut self, image_type: ImageType) -> Self {
            self.style.image_type = image_type;
            self
        }

        /// Only draw within `[min, max]` zoom, inclusive.
        pub fn with_zoom_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
            self.style.min_zoom = min;
            self.style.max_zoom = max;
            self
        }

        /// Set the palette. Pass the same `Arc` on later updates to keep the
        /// uploaded palette.
        pub fn with_palette(mut self, palette: Option<Arc<PaletteSpec>>) -> Self {
            self.style.palette = palette;
            self
        }

        pub fn with_color(mut self, color: Color) -> Self {
            self.style.color = color;
            self
        }

        pub fn with_interval(mut self, interval: f32) -> Self {
            self.style.interval = interval;
            self
        }

        pub fn with_major_interval(mut self, major_interval: f32) -> Self {
            self.style.major_interval = major_interval;
            self
        }

        pub fn with_width(mut self, width: f32) -> Self {
            self.style.width = width;
            self
        }

        pub fn with_opacity(mut self, opacity: f32) -> Self {
            self.style.opacity = opacity;
            self
        }

        pub fn with_transparent_color(mut self, color: Color) -> Self {
            self.style.transparent_color = color;
            self
        }

        pub fn with_parameters(mut self, parameters: RenderParameterOverrides) -> Self {
            self.style.parameters = parameters;
            self
        }

        pub fn with_bounds(mut self, bounds: GeoBounds) -> Self {
            self.bounds = bounds;
            self
        }
    };
}

/// Props of [`ContourLayer`](crate::ContourLayer).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContourLayerProps {
    pub id: String,
    /// Primary raster.
    pub image: Option<Arc<TextureData>>,
    /// Secondary raster, blended in by `style.image_weight`.
    pub image2: Option<Arc<TextureData>>,
    pub bounds: GeoBounds,
    pub style: ContourStyle,
}

impl ContourLayerProps {
    /// Props with defaults and the given layer ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: Option<Arc<TextureData>>) -> Self {
        self.image = image;
        self
    }

    pub fn with_image2(mut self, image2: Option<Arc<TextureData>>) -> Self {
        self.image2 = image2;
        self
    }

    style_builders!();
}

/// Props of [`ContourBitmapLayer`](crate::ContourBitmapLayer).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContourBitmapLayerProps {
    pub id: String,
    /// Primary texture; the layer does not draw without it.
    pub image_texture: Option<Texture>,
    /// Secondary texture; the placeholder is bound when absent.
    pub image_texture2: Option<Texture>,
    pub bounds: GeoBounds,
    pub coordinate_system: CoordinateSystem,
    pub style: ContourStyle,
}

impl ContourBitmapLayerProps {
    /// Props with defaults and the given layer ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_textures(mut self, image: Option<Texture>, image2: Option<Texture>) -> Self {
        self.image_texture = image;
        self.image_texture2 = image2;
        self
    }

    pub fn with_coordinate_system(mut self, coordinate_system: CoordinateSystem) -> Self {
        self.coordinate_system = coordinate_system;
        self
    }

    style_builders!();
}
