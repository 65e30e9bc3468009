//! Common imports for hosts driving contour layers.
//!
//! ```
//! use isoline::prelude::*;
//! ```

pub use crate::{
    ContourBitmapLayer, ContourBitmapLayerProps, ContourLayer, ContourLayerProps, ContourStyle,
    DrawOutcome, ImageInterpolation, ImageType, Layer, LayerContext, LayerError, LayerInstance,
    LayerResult, RasterPointValue, SkipReason,
};
pub use isoline_core::{CoordinateSystem, FrameContext, GeoBounds, Projection, Viewport};
pub use isoline_render::{
    BlendMode, Color, CullMode, GpuDevice, HeadlessDevice, RenderParameterOverrides, TextureData,
};
pub use isoline_style::PaletteSpec;
