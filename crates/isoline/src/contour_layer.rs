//! The composite layer: raster buffers in, one contour bitmap child out.

use std::sync::Arc;

use isoline_core::logging::{PerfSpan, span_names, targets};
use isoline_core::{CoordinateSystem, FrameContext, identity};
use isoline_render::{DataType, Texture, TextureData, WrapMode, create_texture};
use tracing::debug;

use crate::bitmap_layer::ContourBitmapLayer;
use crate::error::{LayerError, LayerResult};
use crate::layer::{DrawOutcome, Layer, LayerContext, LayerInstance, SkipReason};
use crate::picking::{RasterPointValue, pick_raster_value};
use crate::props::{ContourBitmapLayerProps, ContourLayerProps};

/// Contour lines over one or two raster inputs.
///
/// The layer uploads its raster inputs when their `Arc` identity changes and
/// renders through a single [`ContourBitmapLayer`] child. Until a primary
/// image is supplied it has no child and draws nothing.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use isoline::prelude::*;
///
/// let device = Arc::new(HeadlessDevice::new());
/// let ctx = LayerContext::new(device.clone());
///
/// let data = TextureData::float32(2, 2, vec![0.0, 10.0, 20.0, 30.0])?;
/// let props = ContourLayerProps::new("temperature")
///     .with_image(Some(Arc::new(data)))
///     .with_interval(5.0);
///
/// let mut layer = LayerInstance::new(ContourLayer::new());
/// layer.update(&ctx, props)?;
///
/// let outcome = layer.draw(&ctx, &FrameContext::new(Viewport::flat(3.0)))?;
/// assert!(outcome.is_drawn());
/// assert_eq!(device.draw_count(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct ContourLayer {
    image_texture: Option<Texture>,
    image_texture2: Option<Texture>,
    child: Option<LayerInstance<ContourBitmapLayer>>,
}

impl ContourLayer {
    /// Create a layer with no state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The uploaded primary raster.
    pub fn image_texture(&self) -> Option<&Texture> {
        self.image_texture.as_ref()
    }

    /// The uploaded secondary raster.
    pub fn image_texture2(&self) -> Option<&Texture> {
        self.image_texture2.as_ref()
    }

    /// The bitmap child, present once a primary raster has been uploaded.
    pub fn child(&self) -> Option<&LayerInstance<ContourBitmapLayer>> {
        self.child.as_ref()
    }

    /// Props of the child this layer renders with its current textures, or
    /// `None` when there is nothing to render.
    pub fn render_layers(&self, props: &ContourLayerProps) -> Option<ContourBitmapLayerProps> {
        bitmap_props(props, self.image_texture.as_ref(), self.image_texture2.as_ref())
    }

    /// The field value at `lon`/`lat`, sampled from the raster inputs in
    /// `props`.
    pub fn raster_value_at(
        props: &ContourLayerProps,
        lon: f64,
        lat: f64,
    ) -> Option<RasterPointValue> {
        pick_raster_value(props, lon, lat)
    }
}

fn bitmap_props(
    props: &ContourLayerProps,
    image_texture: Option<&Texture>,
    image_texture2: Option<&Texture>,
) -> Option<ContourBitmapLayerProps> {
    let image_texture = image_texture?;
    Some(ContourBitmapLayerProps {
        id: format!("{}-bitmap", props.id),
        image_texture: Some(image_texture.clone()),
        image_texture2: image_texture2.cloned(),
        bounds: props.bounds,
        coordinate_system: CoordinateSystem::LngLat,
        style: props.style.clone(),
    })
}

fn check_unscale(props: &ContourLayerProps) -> LayerResult<()> {
    if props.style.image_unscale.is_none() {
        return Ok(());
    }
    match props.image.as_deref().map(TextureData::data_type) {
        Some(DataType::Uint8) | None => Ok(()),
        Some(found) => Err(LayerError::UnscaleRequiresUint8 { found }),
    }
}

/// The texture for `data`, re-uploaded only when its identity changed.
fn sync_texture(
    ctx: &LayerContext,
    data: Option<&Arc<TextureData>>,
    previous: Option<Option<&Arc<TextureData>>>,
    current: Option<&Texture>,
    wrap: WrapMode,
    slot: &'static str,
) -> LayerResult<Option<Texture>> {
    if !identity::changed(data, previous) {
        return Ok(current.cloned());
    }

    let texture = match data {
        Some(data) => {
            let _span = PerfSpan::new(span_names::UPLOAD, slot);
            Some(create_texture(ctx.device(), data, wrap)?)
        }
        None => None,
    };
    debug!(
        target: targets::CONTOUR_LAYER,
        slot,
        texture = texture.as_ref().map(|t| t.id().get()),
        wrap = ?wrap,
        "raster texture rebuilt"
    );
    Ok(texture)
}

impl Layer for ContourLayer {
    type Props = ContourLayerProps;

    fn update_state(
        &mut self,
        ctx: &LayerContext,
        props: &ContourLayerProps,
        old_props: Option<&ContourLayerProps>,
    ) -> LayerResult<()> {
        let _span = PerfSpan::new(span_names::UPDATE, &props.id);
        props.bounds.validate()?;
        check_unscale(props)?;

        let wrap = WrapMode::for_repeat(props.bounds.is_repeat());
        let image_texture = sync_texture(
            ctx,
            props.image.as_ref(),
            old_props.map(|old| old.image.as_ref()),
            self.image_texture.as_ref(),
            wrap,
            "image",
        )?;
        let image_texture2 = sync_texture(
            ctx,
            props.image2.as_ref(),
            old_props.map(|old| old.image2.as_ref()),
            self.image_texture2.as_ref(),
            wrap,
            "image2",
        )?;

        match bitmap_props(props, image_texture.as_ref(), image_texture2.as_ref()) {
            Some(child_props) => match self.child.as_mut() {
                Some(child) => child.update(ctx, child_props)?,
                None => {
                    let mut child = LayerInstance::new(ContourBitmapLayer::new());
                    child.update(ctx, child_props)?;
                    debug!(target: targets::LAYER, layer = %props.id, "bitmap child created");
                    self.child = Some(child);
                }
            },
            None => {
                if self.child.take().is_some() {
                    debug!(target: targets::LAYER, layer = %props.id, "bitmap child dropped");
                }
            }
        }

        self.image_texture = image_texture;
        self.image_texture2 = image_texture2;
        Ok(())
    }

    fn draw(
        &mut self,
        ctx: &LayerContext,
        _props: &ContourLayerProps,
        frame: &FrameContext,
    ) -> LayerResult<DrawOutcome> {
        match self.child.as_mut() {
            Some(child) => child.draw(ctx, frame),
            None => Ok(DrawOutcome::Skipped(SkipReason::MissingTexture)),
        }
    }
}
