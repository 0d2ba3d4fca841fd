// Format-agnostic repository of wall textures.
// The tracer and rasterizer interact through `TextureId` only.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use once_cell::sync::Lazy;

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// CPU-side storage: palette indices in row-major order. The rasterizer
/// resolves them to RGB through the bank's palette + shade map.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<u8>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT_IDX: u8 = 200;
        const DARK_IDX: u8 = 64;
        let mut pix = vec![0u8; 8 * 8];
        for y in 0..8 {
            for x in 0..8 {
                pix[y * 8 + x] = if (x ^ y) & 1 == 0 { LIGHT_IDX } else { DARK_IDX };
            }
        }
        Texture {
            name: "CHECKER".to_string(),
            w: 8,
            h: 8,
            pixels: pix,
        }
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),
}

static GRAYSCALE: Lazy<[u32; 256]> = Lazy::new(|| {
    let mut pal = [0u32; 256];
    for (i, slot) in pal.iter_mut().enumerate() {
        let v = i as u32;
        *slot = (v << 16) | (v << 8) | v;
    }
    pal
});

/// 256-entry index → 0x00RRGGBB lookup.
pub struct Palette(pub [u32; 256]);
impl Default for Palette {
    fn default() -> Self {
        Palette(*GRAYSCALE)
    }
}
impl Index<usize> for Palette {
    type Output = u32;
    fn index(&self, idx: usize) -> &u32 {
        &self.0[idx]
    }
}
impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, idx: usize) -> &mut u32 {
        &mut self.0[idx]
    }
}

/// Number of brightness bands in a [`ShadeMap`].
pub const SHADE_LEVELS: usize = 32;

/// Tile units of perpendicular distance per brightness band.
const SHADE_DIST_SCALE: f32 = 2.0;

/// Precomputed light remap: `tables[level][texel] = darker texel`.
///
/// Level 0 is full bright. Rebuilt only when lighting parameters
/// change, never during a render pass.
pub struct ShadeMap(pub Vec<[u8; 256]>);

impl ShadeMap {
    /// Identity map in every band; pairs with any palette for an
    /// unshaded (fullbright) look.
    pub fn flat() -> Self {
        let mut ident = [0u8; 256];
        for (i, slot) in ident.iter_mut().enumerate() {
            *slot = i as u8;
        }
        ShadeMap(vec![ident; SHADE_LEVELS])
    }

    /// Linear falloff against the grayscale palette: band `k` scales
    /// every index by `(LEVELS - k) / LEVELS`.
    pub fn gray_falloff() -> Self {
        let mut tables = Vec::with_capacity(SHADE_LEVELS);
        for k in 0..SHADE_LEVELS {
            let mut t = [0u8; 256];
            for (i, slot) in t.iter_mut().enumerate() {
                *slot = (i * (SHADE_LEVELS - k) / SHADE_LEVELS) as u8;
            }
            tables.push(t);
        }
        ShadeMap(tables)
    }

    /// Brightness band for a perpendicular distance.
    #[inline]
    pub fn level_for(perp: f32) -> usize {
        ((perp * SHADE_DIST_SCALE) as usize).min(SHADE_LEVELS - 1)
    }
}

impl Default for ShadeMap {
    fn default() -> Self {
        ShadeMap::gray_falloff()
    }
}

impl Index<usize> for ShadeMap {
    type Output = [u8; 256];
    fn index(&self, idx: usize) -> &Self::Output {
        &self.0[idx]
    }
}

/// A palette-agnostic, format-agnostic cache of textures.
///
/// * Does **not** know about level formats or image files — that's the
///   loader's job.
/// * Stores exactly one copy of every name.
/// * ID **0** is always the “missing” checkerboard.
///
/// **Thread-safety:** access `TextureBank` from a single thread or wrap
/// it in `RwLock`; the struct itself is not `Sync`.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
    palette: Palette,
    shades: ShadeMap,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**.
    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![missing_tex],
            palette: Palette::default(),
            shades: ShadeMap::default(),
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Swap the light remap; the "lighting parameters changed" path.
    pub fn set_shades(&mut self, shades: ShadeMap) {
        self.shades = shades;
    }

    /// Texel through the shade table, then the palette.
    #[inline]
    pub fn get_color(&self, shade_level: usize, texel: u8) -> u32 {
        let pal_idx = self.shades[shade_level][texel as usize];
        self.palette[pal_idx as usize]
    }

    /// Texel straight through the palette, no shading.
    #[inline]
    pub fn plain_color(&self, texel: u8) -> u32 {
        self.palette[texel as usize]
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    /// Returns `None` if the name is unknown.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Bounds-safe borrow that falls back to the checkerboard.
    pub fn texture_or_missing(&self, id: TextureId) -> &Texture {
        self.data.get(id as usize).unwrap_or(&self.data[0])
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a texture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.data.len() as TextureId;
        self.data.push(tex);
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
