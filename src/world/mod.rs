pub mod camera;
pub mod map;
pub mod texture;

pub use map::{DoorState, Facing, Level, MapError, PushWall, SpotVis, Tile, TileFlags, TileGrid};

pub use camera::Camera;

pub use texture::{NO_TEXTURE, Palette, ShadeMap, Texture, TextureBank, TextureError, TextureId};
