//! Per-frame context handed to layers when drawing.

use crate::viewport::Viewport;

/// Everything a layer may read while drawing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Camera state for this frame.
    pub viewport: Viewport,
    /// Monotonic frame counter supplied by the host.
    pub frame_index: u64,
}

impl FrameContext {
    /// Create a context for the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            frame_index: 0,
        }
    }

    /// Set the frame counter.
    pub fn with_frame_index(mut self, frame_index: u64) -> Self {
        self.frame_index = frame_index;
        self
    }
}
