//! Rendering abstraction layer.
//!
//! *The rest of the engine never touches a pixel buffer directly.*
//! The hit resolver produces one [`WallStrip`] per screen column and
//! hands it to a type that implements [`Renderer`].
//!
//! * You can plug multiple back-ends (`renderer::software`, a GPU one,
//!   …) without changing the trace/resolve code — the per-column
//!   strip + [`ColumnHeightBuffer`] pair is the whole contract.
//! * [`ColumnHeightBuffer`] is also the boundary toward sprite/object
//!   rendering: anything needing per-column depth reads it after the
//!   wall pass.

use crate::world::texture::{TextureBank, TextureId};

/// Pixel format of the software frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

/// Shading policy for one strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lighting {
    /// Remap texels through the bank's shade table at this band.
    Lit(usize),
    /// Copy texels unshaded (maximally-lit / special-effect surfaces).
    Plain,
}

/// Resolved draw record for one vertical screen column.
#[derive(Clone, Copy, Debug)]
pub struct WallStrip {
    /// Destination screen column.
    pub x: usize,
    /// Full (unclipped) strip height in screen rows.
    pub height: f32,
    /// Perpendicular distance backing `height`; kept for consumers.
    pub perp: f32,
    pub tex: TextureId,
    /// Source texture column, already scaled to the texture width.
    pub tex_col: usize,
    pub lighting: Lighting,
}

/// Per-column resolved depth/height, one entry per screen column.
///
/// Written by the hit resolver during the wall pass, read by the
/// rasterizer and by downstream occlusion consumers.
#[derive(Clone, Debug, Default)]
pub struct ColumnHeightBuffer {
    perp: Vec<f32>,
    height: Vec<f32>,
}

impl ColumnHeightBuffer {
    pub fn new(width: usize) -> Self {
        ColumnHeightBuffer {
            perp: vec![f32::INFINITY; width],
            height: vec![0.0; width],
        }
    }

    pub fn reset(&mut self, width: usize) {
        self.perp.resize(width, f32::INFINITY);
        self.height.resize(width, 0.0);
        self.perp.fill(f32::INFINITY);
        self.height.fill(0.0);
    }

    #[inline]
    pub fn set(&mut self, x: usize, perp: f32, height: f32) {
        self.perp[x] = perp;
        self.height[x] = height;
    }

    #[inline]
    pub fn perp(&self, x: usize) -> f32 {
        self.perp[x]
    }

    #[inline]
    pub fn height(&self, x: usize) -> f32 {
        self.height[x]
    }

    pub fn len(&self) -> usize {
        self.perp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perp.is_empty()
    }
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager;
/// GPU back-ends can ignore the slice because they never allocate it.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Rasterise one textured wall strip into the internal buffer.
    fn draw_column(&mut self, strip: &WallStrip, bank: &TextureBank);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    /// * GPU back-end simply calls the closure with an empty slice:
    ///   `submit(&[], width, height)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

pub mod software;

pub use software::Software;
