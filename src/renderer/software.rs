//! ---------------------------------------------------------------------------
//! Classic software (CPU) column renderer
//!
//! * Fills an `&mut [u32]` frame-buffer in **0x00RRGGBB** format.
//! * One textured, shaded vertical strip per call; the flat ceiling /
//!   floor split is painted in `begin_frame`.
//! ---------------------------------------------------------------------------

use crate::{
    renderer::{Lighting, Renderer, Rgba, WallStrip},
    world::texture::TextureBank,
};

const CEILING_COLOR: Rgba = 0x00_383838;
const FLOOR_COLOR: Rgba = 0x00_70_70_70;

/// Wolfenstein-style column renderer.
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
}

impl Default for Software {
    fn default() -> Self {
        Self {
            scratch: Vec::new(),
            width: 0,
            height: 0,
        }
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }

        /* flat ceiling above the horizon, flat floor below */
        let split = (h / 2) * w;
        self.scratch[..split].fill(CEILING_COLOR);
        self.scratch[split..].fill(FLOOR_COLOR);
    }

    fn draw_column(&mut self, strip: &WallStrip, bank: &TextureBank) {
        let tex = bank.texture_or_missing(strip.tex);

        /* unclipped strip extents, centred on the horizon; a row is
        covered when it lies in [top, top + height) */
        let top = self.height as f32 * 0.5 - strip.height * 0.5;
        let y0 = (top.ceil().max(0.0)) as i32;
        let y1 = ((top + strip.height).ceil() as i32 - 1).min(self.height as i32 - 1);
        if y0 > y1 {
            return;
        }

        /* source rows per destination row */
        let v_step = tex.h as f32 / strip.height.max(1.0);
        let mut v_f = (y0 as f32 - top) * v_step;

        let col_base = strip.tex_col; // column index inside each source row
        for y in y0..=y1 {
            let v = (v_f as usize).min(tex.h - 1);
            let texel = tex.pixels[v * tex.w + col_base];
            let color = match strip.lighting {
                Lighting::Lit(band) => bank.get_color(band, texel),
                Lighting::Plain => bank.plain_color(texel),
            };
            self.scratch[y as usize * self.width + strip.x] = color;
            v_f += v_step;
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::texture::{Texture, TextureBank};

    /* tiny helpers ---------------------------------------------------*/
    fn tiny_bank() -> TextureBank {
        let mut bank = TextureBank::default_with_checker();
        bank.insert(
            "BRIGHT",
            Texture {
                name: "BRIGHT".into(),
                w: 4,
                h: 4,
                pixels: vec![0xFF; 16],
            },
        )
        .unwrap();
        bank
    }

    fn bright_strip(x: usize, height: f32, lighting: Lighting) -> WallStrip {
        WallStrip {
            x,
            height,
            perp: 1.0,
            tex: 1,
            tex_col: 2,
            lighting,
        }
    }

    fn frame_of(sw: &mut Software) -> Vec<Rgba> {
        let mut out = Vec::new();
        sw.end_frame(|fb, _, _| out = fb.to_vec());
        out
    }

    #[test]
    fn plain_column_writes_unshaded_texels() {
        let bank = tiny_bank();
        let mut sw = Software::default();
        sw.begin_frame(8, 8);
        sw.draw_column(&bright_strip(3, 4.0, Lighting::Plain), &bank);

        let fb = frame_of(&mut sw);
        let white = bank.plain_color(0xFF);
        let lit_rows = (0..8).filter(|y| fb[y * 8 + 3] == white).count();
        assert_eq!(lit_rows, 4, "strip should cover exactly its height");
        // neighbouring column untouched
        assert!(fb.iter().skip(4).step_by(8).all(|&px| px != white));
    }

    #[test]
    fn lit_column_is_darker_than_plain() {
        let bank = tiny_bank();
        let mut sw = Software::default();
        sw.begin_frame(8, 8);
        sw.draw_column(&bright_strip(1, 4.0, Lighting::Lit(20)), &bank);

        let fb = frame_of(&mut sw);
        let shaded = bank.get_color(20, 0xFF);
        assert!(fb.contains(&shaded));
        assert!(shaded < bank.plain_color(0xFF));
    }

    #[test]
    fn oversized_strip_clips_to_frame() {
        let bank = tiny_bank();
        let mut sw = Software::default();
        sw.begin_frame(8, 8);
        // a wall much taller than the frame (viewer nose against it)
        sw.draw_column(&bright_strip(0, 4096.0, Lighting::Plain), &bank);

        let fb = frame_of(&mut sw);
        let white = bank.plain_color(0xFF);
        assert!((0..8).all(|y| fb[y * 8] == white));
    }

    #[test]
    fn begin_frame_splits_ceiling_and_floor() {
        let mut sw = Software::default();
        sw.begin_frame(4, 4);
        let fb = frame_of(&mut sw);
        assert!(fb[..8].iter().all(|&px| px == CEILING_COLOR));
        assert!(fb[8..].iter().all(|&px| px == FLOOR_COLOR));
    }
}
