//! Per-frame orchestration: one trace + resolve + rasterize pass per
//! screen column, left to right.
//!
//! Columns are independent of each other; the sequential loop is only
//! the simplest schedule. All shared inputs (level, bank, context) are
//! read-only for the duration of the pass.

use crate::{
    engine::projection::ColumnAngles,
    engine::types::Screen,
    engine::{raycast, walls},
    renderer::{ColumnHeightBuffer, Renderer},
    world::{camera::Camera, map::Level, map::SpotVis, texture::TextureBank},
};

/// Everything the per-column pipeline needs that depends only on
/// configuration: screen constants, focal scale, the angle table and
/// the lighting policy. Rebuild on resolution / fov change, reuse
/// across frames.
pub struct RenderContext {
    pub screen: Screen,
    /// Pixel-per-tile-unit scale; also the strip-height numerator.
    pub focal: f32,
    pub angles: ColumnAngles,
    /// Skip the shade table entirely (special-effect frames).
    pub fullbright: bool,
}

impl RenderContext {
    pub fn new(w: usize, h: usize, fov: f32) -> Self {
        RenderContext {
            screen: Screen::new(w, h),
            focal: w as f32 * 0.5 / (fov * 0.5).tan(),
            angles: ColumnAngles::build(w, fov),
            fullbright: false,
        }
    }
}

/// Render one frame of walls into `renderer` and fill `heights`.
///
/// The caller owns presentation: call `renderer.end_frame(..)` after
/// this returns (and after any sprite pass that reads `heights`).
pub fn render_frame<R: Renderer>(
    level: &Level,
    camera: &Camera,
    ctx: &RenderContext,
    bank: &TextureBank,
    heights: &mut ColumnHeightBuffer,
    vis: &mut SpotVis,
    renderer: &mut R,
) {
    renderer.begin_frame(ctx.screen.w, ctx.screen.h);
    heights.reset(ctx.screen.w);

    let origin = camera.pos();
    for x in 0..ctx.screen.w {
        let angle = camera.yaw() + ctx.angles.offset[x];
        let hit = raycast::trace(level, origin, angle, vis);
        let strip = walls::resolve(&hit, x, ctx, bank);
        heights.set(x, strip.perp, strip.height);
        renderer.draw_column(&strip, bank);
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
