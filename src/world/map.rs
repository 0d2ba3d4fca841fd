//! Tile-coded map plus the dynamic overlays the ray tracer reads.
//!
//! The grid itself is immutable during a render pass; doors and
//! push-walls keep their animation state in side tables indexed by the
//! tile code, mutated by game logic *between* frames only.
//!
//! Everything that can be malformed is rejected here, at load time.
//! The tracer assumes a validated level and never re-checks per ray.

use bitflags::bitflags;
use thiserror::Error;

use crate::world::texture::TextureId;

bitflags! {
    /// Static classification bits carried by every tile code.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TileFlags: u8 {
        /// Blocks rays (and movement).
        const SOLID     = 0x01;
        /// Sliding door panel half a cell inside the tile.
        const DOOR      = 0x02;
        /// Wall that can slide off its home grid line.
        const PUSH_WALL = 0x04;
    }
}

/// One grid cell: flags + texture + (for specials) dynamic-state index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    pub flags: TileFlags,
    pub texture: TextureId,
    /// Index into `Level::doors` or `Level::push_walls`; unused otherwise.
    pub state: u16,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        flags: TileFlags::empty(),
        texture: 0,
        state: 0,
    };

    pub fn wall(texture: TextureId) -> Self {
        Tile {
            flags: TileFlags::SOLID,
            texture,
            state: 0,
        }
    }

    pub fn door(texture: TextureId, state: u16) -> Self {
        Tile {
            flags: TileFlags::SOLID | TileFlags::DOOR,
            texture,
            state,
        }
    }

    pub fn push_wall(texture: TextureId, state: u16) -> Self {
        Tile {
            flags: TileFlags::SOLID | TileFlags::PUSH_WALL,
            texture,
            state,
        }
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        self.flags.contains(TileFlags::SOLID)
    }
    #[inline]
    pub fn is_door(self) -> bool {
        self.flags.contains(TileFlags::DOOR)
    }
    #[inline]
    pub fn is_push_wall(self) -> bool {
        self.flags.contains(TileFlags::PUSH_WALL)
    }
}

/// How far a door panel has slid open. 0 = fully closed, 1 = fully open.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DoorState {
    open: f32,
}

impl DoorState {
    pub fn closed() -> Self {
        DoorState { open: 0.0 }
    }

    pub fn with_open(open: f32) -> Self {
        DoorState {
            open: open.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn open(self) -> f32 {
        self.open
    }

    /// Game-logic tick entry point; keeps the fraction in `[0, 1]`.
    pub fn set_open(&mut self, open: f32) {
        self.open = open.clamp(0.0, 1.0);
    }
}

/// Axis-aligned travel direction of a push-wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    North,
    South,
    East,
    West,
}

/// A wall slid `offset` cells off its home grid line towards `facing`.
///
/// The tracer only needs the offset (it shifts the hit plane along the
/// crossed axis); `facing` tells game logic which neighbour cell the
/// wall is travelling into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PushWall {
    offset: f32,
    pub facing: Facing,
}

impl PushWall {
    pub fn at_home(facing: Facing) -> Self {
        PushWall {
            offset: 0.0,
            facing,
        }
    }

    pub fn with_offset(offset: f32, facing: Facing) -> Self {
        PushWall {
            offset: offset.clamp(0.0, 1.0),
            facing,
        }
    }

    #[inline]
    pub fn offset(self) -> f32 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset.clamp(0.0, 1.0);
    }
}

/// Errors caught while assembling a [`Level`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("grid holds {got} tiles, expected {want} for {w}x{h}")]
    BadDimensions {
        w: usize,
        h: usize,
        want: usize,
        got: usize,
    },

    /// Rays are unbounded; a non-solid border cell would let one escape.
    #[error("border cell ({x},{y}) is not solid")]
    OpenBorder { x: usize, y: usize },

    #[error("cell ({x},{y}) sets both door and push-wall bits")]
    ConflictingSpecial { x: usize, y: usize },

    #[error("special cell ({x},{y}) is not solid-tagged")]
    WalkableSpecial { x: usize, y: usize },

    #[error("cell ({x},{y}) references door {idx}, only {len} exist")]
    DoorOutOfRange {
        x: usize,
        y: usize,
        idx: u16,
        len: usize,
    },

    #[error("cell ({x},{y}) references push-wall {idx}, only {len} exist")]
    PushWallOutOfRange {
        x: usize,
        y: usize,
        idx: u16,
        len: usize,
    },

    #[error("map row {row} is {got} cells wide, expected {want}")]
    RaggedRow { row: usize, want: usize, got: usize },

    #[error("unknown map character {0:?}")]
    UnknownGlyph(char),
}

/// Square grid of tile codes, row-major, read-only during a frame.
#[derive(Clone, Debug)]
pub struct TileGrid {
    w: usize,
    h: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(w: usize, h: usize, tiles: Vec<Tile>) -> Result<Self, MapError> {
        if tiles.len() != w * h {
            return Err(MapError::BadDimensions {
                w,
                h,
                want: w * h,
                got: tiles.len(),
            });
        }
        Ok(TileGrid { w, h, tiles })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }
    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    /// The validated solid border keeps every traced ray inside the
    /// grid, so plain indexing is safe here.
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> Tile {
        debug_assert!(x >= 0 && (x as usize) < self.w && y >= 0 && (y as usize) < self.h);
        self.tiles[y as usize * self.w + x as usize]
    }
}

/// A tile grid plus the dynamic state tables its specials reference.
#[derive(Clone, Debug)]
pub struct Level {
    grid: TileGrid,
    doors: Vec<DoorState>,
    push_walls: Vec<PushWall>,
}

impl Level {
    pub fn new(
        grid: TileGrid,
        doors: Vec<DoorState>,
        push_walls: Vec<PushWall>,
    ) -> Result<Self, MapError> {
        for y in 0..grid.h {
            for x in 0..grid.w {
                let t = grid.tiles[y * grid.w + x];
                let border = x == 0 || y == 0 || x == grid.w - 1 || y == grid.h - 1;
                if border && !t.is_solid() {
                    return Err(MapError::OpenBorder { x, y });
                }
                if t.is_door() && t.is_push_wall() {
                    return Err(MapError::ConflictingSpecial { x, y });
                }
                if (t.is_door() || t.is_push_wall()) && !t.is_solid() {
                    return Err(MapError::WalkableSpecial { x, y });
                }
                if t.is_door() && t.state as usize >= doors.len() {
                    return Err(MapError::DoorOutOfRange {
                        x,
                        y,
                        idx: t.state,
                        len: doors.len(),
                    });
                }
                if t.is_push_wall() && t.state as usize >= push_walls.len() {
                    return Err(MapError::PushWallOutOfRange {
                        x,
                        y,
                        idx: t.state,
                        len: push_walls.len(),
                    });
                }
            }
        }
        log::debug!(
            "level validated: {}x{} tiles, {} doors, {} push-walls",
            grid.w,
            grid.h,
            doors.len(),
            push_walls.len()
        );
        Ok(Level {
            grid,
            doors,
            push_walls,
        })
    }

    /// Build a level from ASCII art, one char per cell:
    ///
    /// * `#` wall (texture 1), `1`-`9` wall with that texture id
    /// * `D` closed door (texture 10), `P` push-wall at home (texture 1)
    /// * `.` or space: empty
    ///
    /// Handy for tests and the demo; real maps come from an external
    /// loader speaking [`Level::new`].
    pub fn from_ascii(rows: &[&str]) -> Result<Self, MapError> {
        let h = rows.len();
        let w = rows.first().map_or(0, |r| r.chars().count());
        let mut tiles = Vec::with_capacity(w * h);
        let mut doors = Vec::new();
        let mut push_walls = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let got = row.chars().count();
            if got != w {
                return Err(MapError::RaggedRow { row: y, want: w, got });
            }
            for ch in row.chars() {
                tiles.push(match ch {
                    '.' | ' ' => Tile::EMPTY,
                    '#' => Tile::wall(1),
                    '1'..='9' => Tile::wall((ch as u8 - b'0') as TextureId),
                    'D' => {
                        doors.push(DoorState::closed());
                        Tile::door(10, (doors.len() - 1) as u16)
                    }
                    'P' => {
                        push_walls.push(PushWall::at_home(Facing::East));
                        Tile::push_wall(1, (push_walls.len() - 1) as u16)
                    }
                    other => return Err(MapError::UnknownGlyph(other)),
                });
            }
        }
        Level::new(TileGrid::new(w, h, tiles)?, doors, push_walls)
    }

    #[inline]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    #[inline]
    pub fn door(&self, idx: u16) -> DoorState {
        self.doors[idx as usize]
    }

    #[inline]
    pub fn push_wall(&self, idx: u16) -> PushWall {
        self.push_walls[idx as usize]
    }

    /* between-frame mutation points for game logic */

    pub fn door_mut(&mut self, idx: u16) -> &mut DoorState {
        &mut self.doors[idx as usize]
    }

    pub fn push_wall_mut(&mut self, idx: u16) -> &mut PushWall {
        &mut self.push_walls[idx as usize]
    }

    pub fn doors(&self) -> &[DoorState] {
        &self.doors
    }
}

/// Cells the tracer has looked into this level, for minimap / AI
/// line-of-sight consumers. Rendering itself never reads it.
#[derive(Clone, Debug, Default)]
pub struct SpotVis {
    w: usize,
    cells: Vec<bool>,
}

impl SpotVis {
    pub fn new(w: usize, h: usize) -> Self {
        SpotVis {
            w,
            cells: vec![false; w * h],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    #[inline]
    pub fn mark(&mut self, x: i32, y: i32) {
        self.cells[y as usize * self.w + x as usize] = true;
    }

    #[inline]
    pub fn seen(&self, x: i32, y: i32) -> bool {
        self.cells[y as usize * self.w + x as usize]
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
