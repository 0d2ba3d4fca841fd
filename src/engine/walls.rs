//! Hit resolution: raw trace results → rendering units.
//!
//! Pure arithmetic with clamping only; nothing here can fail at
//! runtime, which keeps the per-column hot path branch-light.

use crate::engine::engine::RenderContext;
use crate::engine::raycast::{Axis, HitKind, HitRecord};
use crate::renderer::{Lighting, WallStrip};
use crate::world::texture::{ShadeMap, TextureBank};

/// Floor for the perpendicular distance; keeps the height division
/// finite when a ray starts on a wall plane.
pub const MIN_PERP: f32 = 1.0 / 64.0;

/// Ceiling for the projected strip height, in rows. Far above any
/// sane frame height, so it only bites on degenerate distances.
pub const MAX_STRIP_H: f32 = 8192.0;

/// East/west faces render one band darker than north/south ones, the
/// classic contrast cue between the two grid-line families.
const VERTICAL_FACE_BIAS: usize = 1;

/// Convert a completed trace for screen column `x` into a draw record.
///
/// * Perpendicular distance: trace distance corrected by the cosine of
///   the column's angular offset (fish-eye removal).
/// * Texture column: the hit's unit fraction scaled to texture width.
/// * Strip height: `focal / perp`, clamped.
pub fn resolve(hit: &HitRecord, x: usize, ctx: &RenderContext, bank: &TextureBank) -> WallStrip {
    let perp = (hit.distance * ctx.angles.fisheye[x]).max(MIN_PERP);
    let height = (ctx.focal / perp).min(MAX_STRIP_H);

    let tex = bank.texture_or_missing(hit.texture);
    let tex_col = ((hit.u * tex.w as f32) as usize).min(tex.w - 1);

    let lighting = if ctx.fullbright {
        Lighting::Plain
    } else {
        let mut band = ShadeMap::level_for(perp);
        if hit.axis == Axis::Vertical && hit.kind == HitKind::Wall {
            band = (band + VERTICAL_FACE_BIAS).min(crate::world::texture::SHADE_LEVELS - 1);
        }
        Lighting::Lit(band)
    };

    WallStrip {
        x,
        height,
        perp,
        tex: hit.texture,
        tex_col,
        lighting,
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::raycast::{Axis, HitKind, HitRecord};
    use crate::world::texture::TextureBank;
    use std::f32::consts::FRAC_PI_2;

    fn hit(distance: f32, u: f32) -> HitRecord {
        HitRecord {
            kind: HitKind::Wall,
            texture: 0,
            distance,
            u,
            axis: Axis::Horizontal,
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::new(640, 400, FRAC_PI_2)
    }

    #[test]
    fn height_is_inverse_to_distance() {
        let ctx = ctx();
        let bank = TextureBank::default_with_checker();
        let near = resolve(&hit(1.0, 0.5), 320, &ctx, &bank);
        let far = resolve(&hit(4.0, 0.5), 320, &ctx, &bank);
        assert!((near.height / far.height - 4.0).abs() < 0.05);
    }

    #[test]
    fn degenerate_distance_clamps_instead_of_failing() {
        let ctx = ctx();
        let bank = TextureBank::default_with_checker();
        let s = resolve(&hit(0.0, 0.0), 0, &ctx, &bank);
        assert!(s.height <= MAX_STRIP_H);
        assert!(s.perp >= MIN_PERP);
        assert!(s.height.is_finite());
    }

    #[test]
    fn texture_column_addresses_valid_source() {
        let ctx = ctx();
        let bank = TextureBank::default_with_checker();
        let w = bank.texture_or_missing(0).w;
        for i in 0..=16 {
            let u = i as f32 / 16.0; // includes the closed upper edge
            let s = resolve(&hit(2.0, u), 100, &ctx, &bank);
            assert!(s.tex_col < w, "u = {u} produced column {}", s.tex_col);
        }
    }

    #[test]
    fn edge_columns_get_fisheye_corrected() {
        let ctx = ctx();
        let bank = TextureBank::default_with_checker();
        // same trace distance at centre and edge: the edge column is
        // angularly farther, so its perpendicular distance is shorter
        let centre = resolve(&hit(3.0, 0.5), 320, &ctx, &bank);
        let edge = resolve(&hit(3.0, 0.5), 0, &ctx, &bank);
        assert!(edge.perp < centre.perp);
    }

    #[test]
    fn fullbright_context_selects_plain_variant() {
        let mut ctx = ctx();
        let bank = TextureBank::default_with_checker();
        ctx.fullbright = true;
        let s = resolve(&hit(2.0, 0.5), 10, &ctx, &bank);
        assert_eq!(s.lighting, crate::renderer::Lighting::Plain);
    }
}
