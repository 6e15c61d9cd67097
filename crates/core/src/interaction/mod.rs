/// Size of the drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Converts a pixel position (origin top-left, y down) into normalised
    /// device coordinates (origin centre, y up).
    pub fn pixel_to_ndc(&self, x: f64, y: f64) -> [f32; 2] {
        let nx = 2.0 * x / f64::from(self.width) - 1.0;
        let ny = -2.0 * y / f64::from(self.height) + 1.0;
        [nx as f32, ny as f32]
    }
}

/// The quad's clip-space offset, replaced wholesale by each click.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    translation: [f32; 2],
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translation(&self) -> [f32; 2] {
        self.translation
    }

    /// Moves the quad under the pointer. No accumulation: the previous offset
    /// is discarded.
    pub fn pointer_down(&mut self, viewport: Viewport, x: f64, y: f64) {
        self.translation = viewport.pixel_to_ndc(x, y);
        tracing::trace!(x, y, translation = ?self.translation, "pointer down");
    }
}
