//! Contour-line layers over scalar and vector raster fields.
//!
//! Isoline draws isolines of a continuously varying field (temperature,
//! pressure, wind speed) on flat and globe maps. Lines are extracted on the
//! GPU per pixel, so raster updates never re-tessellate geometry.
//!
//! # Layers
//!
//! - [`ContourLayer`] takes raster buffers, uploads them when they change and
//!   renders through one child.
//! - [`ContourBitmapLayer`] is that child: it owns the palette texture, stacks
//!   the `bitmap`, `raster`, `palette` and `contour` shader modules over the
//!   projection module and issues the draw call.
//!
//! Both are driven through [`LayerInstance`], which keeps the props of the
//! last successful update so layers can diff by `Arc` identity:
//!
//! ```
//! use std::sync::Arc;
//! use isoline::prelude::*;
//!
//! let device = Arc::new(HeadlessDevice::new());
//! let ctx = LayerContext::new(device.clone());
//!
//! let field = Arc::new(TextureData::float32(2, 1, vec![0.0, 40.0])?);
//! let palette = Arc::new(PaletteSpec::from("0 blue\n20 white\n40 red"));
//!
//! let mut layer = LayerInstance::new(ContourLayer::new());
//! let props = ContourLayerProps::new("temperature")
//!     .with_image(Some(field.clone()))
//!     .with_palette(Some(palette.clone()))
//!     .with_interval(5.0)
//!     .with_major_interval(20.0);
//! layer.update(&ctx, props.clone())?;
//!
//! // Same buffers, new style: nothing is uploaded again.
//! let uploads = device.textures_created();
//! layer.update(&ctx, props.with_width(2.0))?;
//! assert_eq!(device.textures_created(), uploads);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Logging
//!
//! Texture and palette rebuilds are logged at `debug` under the
//! `isoline::contour_layer` and `isoline::bitmap_layer` targets; skipped
//! frames at `trace`.

mod bitmap_layer;
mod contour_layer;
mod error;
mod layer;
pub mod modules;
mod picking;
pub mod prelude;
mod props;

pub use bitmap_layer::ContourBitmapLayer;
pub use contour_layer::ContourLayer;
pub use error::{LayerError, LayerResult};
pub use layer::{DrawOutcome, Layer, LayerContext, LayerInstance, SkipReason};
pub use picking::{RasterPointValue, pick_raster_value};
pub use props::{
    ContourBitmapLayerProps, ContourLayerProps, ContourStyle, ImageInterpolation, ImageType,
};

static_assertions::assert_impl_all!(ContourLayer: Send, Sync);
static_assertions::assert_impl_all!(ContourBitmapLayer: Send, Sync);
static_assertions::assert_impl_all!(LayerContext: Send, Sync, Clone);
