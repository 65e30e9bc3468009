//! Layer lifecycle: the trait layers implement and the holder that drives it.
//!
//! A layer is updated with new props, then drawn once per frame. The holder,
//! [`LayerInstance`], keeps the last accepted props so layers can diff the
//! next update against them.

use std::sync::Arc;

use isoline_core::FrameContext;
use isoline_core::logging::targets;
use isoline_render::{GpuDevice, PlaceholderTextureCache, RenderResult, Texture};
use tracing::trace;

use crate::error::LayerResult;

/// Shared resources handed to layers on update and draw.
#[derive(Clone)]
pub struct LayerContext {
    device: Arc<dyn GpuDevice>,
    placeholders: Arc<PlaceholderTextureCache>,
}

impl LayerContext {
    /// A context on `device` using the process-wide placeholder cache.
    ///
    /// The device's entry in that cache is released when the device itself
    /// is dropped. A host that keeps the device alive but is done drawing
    /// with it can release earlier with [`LayerContext::release_device`].
    pub fn new(device: Arc<dyn GpuDevice>) -> Self {
        Self::with_placeholders(device, PlaceholderTextureCache::shared())
    }

    /// A context with its own placeholder cache.
    pub fn with_placeholders(
        device: Arc<dyn GpuDevice>,
        placeholders: Arc<PlaceholderTextureCache>,
    ) -> Self {
        Self {
            device,
            placeholders,
        }
    }

    /// The device layers render with.
    #[inline]
    pub fn device(&self) -> &dyn GpuDevice {
        self.device.as_ref()
    }

    /// The placeholder cache.
    #[inline]
    pub fn placeholders(&self) -> &Arc<PlaceholderTextureCache> {
        &self.placeholders
    }

    /// The placeholder texture for this context's device.
    pub fn placeholder(&self) -> RenderResult<Texture> {
        self.placeholders.get_or_create(self.device())
    }

    /// Release this device's placeholder from the context's cache.
    ///
    /// Call when tearing the device down. Layers drawn afterwards create a
    /// new placeholder. Returns whether a placeholder was cached.
    pub fn release_device(&self) -> bool {
        let released = self.placeholders.release(self.device.id()).is_some();
        trace!(
            target: targets::LAYER,
            device = self.device.id().get(),
            released,
            "device released"
        );
        released
    }
}

impl std::fmt::Debug for LayerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerContext")
            .field("device", &self.device.id())
            .field("placeholders", &self.placeholders.len())
            .finish()
    }
}

/// Why a frame was not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The viewport zoom is outside the layer's zoom range.
    OutsideZoomBounds,
    /// There is no primary raster texture yet.
    MissingTexture,
    /// The layer has not been updated yet.
    NotInitialized,
}

/// Result of drawing a layer for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawOutcome {
    /// At least one draw call was issued.
    Drawn,
    /// Nothing was drawn.
    Skipped(SkipReason),
}

impl DrawOutcome {
    /// Whether a draw call was issued.
    #[inline]
    pub fn is_drawn(self) -> bool {
        matches!(self, DrawOutcome::Drawn)
    }
}

/// A layer: derived GPU state driven by props.
///
/// Implementations must be `Send + Sync` so hosts can move them between
/// threads between frames.
pub trait Layer: Send + Sync {
    /// The props this layer is configured with.
    type Props: Clone + Send + Sync;

    /// Bring derived state in line with `props`.
    ///
    /// `old_props` are the props of the last successful update, `None` on the
    /// first. On error the layer must leave its committed state untouched.
    fn update_state(
        &mut self,
        ctx: &LayerContext,
        props: &Self::Props,
        old_props: Option<&Self::Props>,
    ) -> LayerResult<()>;

    /// Draw one frame.
    fn draw(
        &mut self,
        ctx: &LayerContext,
        props: &Self::Props,
        frame: &FrameContext,
    ) -> LayerResult<DrawOutcome>;
}

/// A layer together with its last accepted props.
#[derive(Debug)]
pub struct LayerInstance<L: Layer> {
    layer: L,
    props: Option<L::Props>,
}

impl<L: Layer> LayerInstance<L> {
    /// Wrap a layer that has not been updated yet.
    pub fn new(layer: L) -> Self {
        Self { layer, props: None }
    }

    /// Update the layer. The props are kept only if the update succeeds.
    pub fn update(&mut self, ctx: &LayerContext, props: L::Props) -> LayerResult<()> {
        self.layer.update_state(ctx, &props, self.props.as_ref())?;
        self.props = Some(props);
        Ok(())
    }

    /// Draw the layer with its current props.
    pub fn draw(&mut self, ctx: &LayerContext, frame: &FrameContext) -> LayerResult<DrawOutcome> {
        match &self.props {
            Some(props) => self.layer.draw(ctx, props, frame),
            None => {
                trace!(target: targets::LAYER, "draw before first update");
                Ok(DrawOutcome::Skipped(SkipReason::NotInitialized))
            }
        }
    }

    /// The last accepted props.
    pub fn props(&self) -> Option<&L::Props> {
        self.props.as_ref()
    }

    /// The layer.
    pub fn layer(&self) -> &L {
        &self.layer
    }

    /// Mutable access to the layer.
    pub fn layer_mut(&mut self) -> &mut L {
        &mut self.layer
    }
}
