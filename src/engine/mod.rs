pub mod projection;
pub mod raycast;
pub mod types;
pub mod walls;

mod engine;

pub use engine::{RenderContext, render_frame};
pub use raycast::{Axis, HitKind, HitRecord, trace, trace_dir};
pub use types::Screen;
