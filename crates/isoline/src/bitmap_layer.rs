//! The drawable leaf: samples raster textures and draws contour lines.

use isoline_core::logging::{PerfSpan, span_names, targets};
use isoline_core::{
    FrameContext, identity, is_globe_projection, is_within_zoom_bounds, validate_zoom_range,
};
use isoline_render::{
    CullMode, Model, ModuleUniforms, RenderParameterOverrides, RenderParameters, ShaderAssembly,
};
use isoline_style::{PaletteTexture, create_palette_texture, parse_palette};
use tracing::{debug, trace};

use crate::error::LayerResult;
use crate::layer::{DrawOutcome, Layer, LayerContext, SkipReason};
use crate::modules::{
    BitmapUniforms, CONTOUR_LAYER_SHADER, ContourUniforms, PaletteUniforms, RasterUniforms,
    contour_modules,
};
use crate::props::ContourBitmapLayerProps;

/// State the layer always forces before user overrides.
///
/// Rasters are drawn on a single-sided grid over the globe surface and must
/// not be hidden by the depth of the basemap.
const FORCED_PARAMETERS: RenderParameterOverrides = RenderParameterOverrides {
    cull_mode: Some(CullMode::Back),
    depth_test: Some(false),
    depth_write: None,
    blend: None,
};

/// Draws contour lines of raster textures in one pass.
///
/// The layer owns its palette texture and drawable; the raster textures are
/// owned by whoever supplies them in props (usually
/// [`ContourLayer`](crate::ContourLayer)).
#[derive(Debug, Default)]
pub struct ContourBitmapLayer {
    model: Option<Model>,
    palette: Option<PaletteTexture>,
}

impl ContourBitmapLayer {
    /// Create a layer with no state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The uploaded palette, if props carry one.
    pub fn palette_texture(&self) -> Option<&PaletteTexture> {
        self.palette.as_ref()
    }

    /// The drawable, once the layer has been updated.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn create_model(props: &ContourBitmapLayerProps) -> Model {
        let shader = ShaderAssembly::new("contour-bitmap", CONTOUR_LAYER_SHADER)
            .with_modules(&contour_modules());
        Model::new(props.id.clone(), shader, RenderParameters::default())
    }
}

impl Layer for ContourBitmapLayer {
    type Props = ContourBitmapLayerProps;

    fn update_state(
        &mut self,
        ctx: &LayerContext,
        props: &ContourBitmapLayerProps,
        old_props: Option<&ContourBitmapLayerProps>,
    ) -> LayerResult<()> {
        let _span = PerfSpan::new(span_names::UPDATE, &props.id);
        let style = &props.style;
        props.bounds.validate()?;
        validate_zoom_range(style.min_zoom, style.max_zoom)?;

        let palette_changed = identity::changed(
            style.palette.as_ref(),
            old_props.map(|old| old.style.palette.as_ref()),
        );
        if palette_changed {
            let palette = match &style.palette {
                Some(spec) => {
                    let palette = parse_palette(spec)?;
                    Some(create_palette_texture(ctx.device(), &palette)?)
                }
                None => None,
            };
            debug!(
                target: targets::BITMAP_LAYER,
                layer = %props.id,
                present = palette.is_some(),
                "palette rebuilt"
            );
            self.palette = palette;
        }

        if self.model.is_none() {
            self.model = Some(Self::create_model(props));
        }
        Ok(())
    }

    fn draw(
        &mut self,
        ctx: &LayerContext,
        props: &ContourBitmapLayerProps,
        frame: &FrameContext,
    ) -> LayerResult<DrawOutcome> {
        let _span = PerfSpan::new(span_names::DRAW, &props.id);
        let style = &props.style;
        let viewport = &frame.viewport;

        if !is_within_zoom_bounds(viewport, style.min_zoom, style.max_zoom) {
            trace!(
                target: targets::BITMAP_LAYER,
                layer = %props.id,
                zoom = viewport.zoom,
                "outside zoom bounds, skipping"
            );
            return Ok(DrawOutcome::Skipped(SkipReason::OutsideZoomBounds));
        }
        let Some(image) = &props.image_texture else {
            trace!(target: targets::BITMAP_LAYER, layer = %props.id, "no image texture, skipping");
            return Ok(DrawOutcome::Skipped(SkipReason::MissingTexture));
        };
        let Some(model) = self.model.as_mut() else {
            return Ok(DrawOutcome::Skipped(SkipReason::NotInitialized));
        };

        let placeholder = ctx.placeholder()?;
        let (image_texture2, image_weight) = match &props.image_texture2 {
            Some(texture) => (texture.clone(), style.image_weight),
            None => (placeholder.clone(), 0.0),
        };
        let (palette_texture, palette_bounds) = match &self.palette {
            Some(palette) => (palette.texture.clone(), Some(palette.bounds)),
            None => (placeholder, None),
        };

        let bitmap = BitmapUniforms {
            is_globe: is_globe_projection(viewport),
            bounds: props.bounds.to_array_f32(),
            coordinate_system: props.coordinate_system,
            transparent_color: style.transparent_color,
            opacity: style.opacity,
        };
        let raster = RasterUniforms {
            image_texture: image.clone(),
            image_texture2,
            image_smoothing: style.image_smoothing,
            image_interpolation: style.image_interpolation,
            image_weight,
            image_type: style.image_type,
            image_unscale: style.image_unscale,
            image_min_value: style.image_min_value,
            image_max_value: style.image_max_value,
        };
        let palette = PaletteUniforms {
            palette_texture,
            palette_bounds,
            palette_color: style.color,
        };
        let contour = ContourUniforms {
            interval: style.interval,
            major_interval: style.major_interval,
            width: style.width,
        };

        model.shader_inputs_mut().set_props([
            (BitmapUniforms::module().name, bitmap.to_block()),
            (RasterUniforms::module().name, raster.to_block()),
            (PaletteUniforms::module().name, palette.to_block()),
            (ContourUniforms::module().name, contour.to_block()),
        ])?;
        model.set_parameters(
            RenderParameters::default().with_overrides(&style.parameters.merge(FORCED_PARAMETERS)),
        );
        model.draw(ctx.device(), frame, image)?;

        Ok(DrawOutcome::Drawn)
    }
}
