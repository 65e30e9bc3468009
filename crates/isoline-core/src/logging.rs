//! Tracing targets and helpers shared by the Isoline crates.
//!
//! Isoline uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("isoline=debug,isoline_render=info")
//!     .init();
//! ```
//!
//! Texture and palette rebuilds are logged at `debug`, skipped frames at
//! `trace`, device creation at `info`.

/// Span names used throughout Isoline.
pub mod span_names {
    /// Layer prop update.
    pub const UPDATE: &str = "isoline::update";
    /// Layer draw.
    pub const DRAW: &str = "isoline::draw";
    /// Texture upload.
    pub const UPLOAD: &str = "isoline::upload";
}

/// Target names for log filtering.
pub mod targets {
    /// Layer lifecycle (prop diffing, sublayer sync).
    pub const LAYER: &str = "isoline::layer";
    /// Composite raster layer.
    pub const CONTOUR_LAYER: &str = "isoline::contour_layer";
    /// Bitmap draw layer.
    pub const BITMAP_LAYER: &str = "isoline::bitmap_layer";
    /// GPU texture creation.
    pub const TEXTURE: &str = "isoline_render::texture";
    /// Placeholder texture cache.
    pub const PLACEHOLDER: &str = "isoline_render::placeholder";
    /// Device backends.
    pub const DEVICE: &str = "isoline_render::device";
    /// Shader assembly and pipelines.
    pub const SHADER: &str = "isoline_render::shader";
    /// Palette parsing and palette textures.
    pub const PALETTE: &str = "isoline_style::palette";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for timing an update or draw with a subscriber that records span
/// durations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new span for `operation` on layer `layer_id`.
    pub fn new(name: &'static str, layer_id: &str) -> Self {
        let span = tracing::debug_span!(target: "isoline::perf", "perf", operation = name, layer = layer_id);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new(span_names::UPDATE, "contour");
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [
            targets::LAYER,
            targets::CONTOUR_LAYER,
            targets::BITMAP_LAYER,
            targets::TEXTURE,
            targets::PLACEHOLDER,
            targets::DEVICE,
            targets::SHADER,
            targets::PALETTE,
        ] {
            assert!(target.starts_with("isoline"));
        }
    }
}
