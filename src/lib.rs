//! Wolfenstein-style tile-grid raycasting core.
//!
//! The pipeline is one pure pass per frame:
//!
//! 1. [`engine::RenderContext`] precomputes the per-column ray angles
//!    for the current screen size / field of view.
//! 2. [`engine::raycast::trace`] walks the tile grid per screen column
//!    (DDA) until it hits a wall, a door panel or a sliding push-wall.
//! 3. [`engine::walls::resolve`] turns the hit into screen units:
//!    perpendicular (fish-eye-corrected) distance, texture column and
//!    clamped strip height.
//! 4. A [`renderer::Renderer`] backend paints the strip; the software
//!    one lives in [`renderer::software`].
//!
//! The per-column depth results land in [`renderer::ColumnHeightBuffer`],
//! the interface any sprite/occlusion pass downstream consumes.

pub mod engine;
pub mod renderer;
pub mod world;

pub use engine::{RenderContext, render_frame};
pub use renderer::{ColumnHeightBuffer, Renderer, Software};
pub use world::{Camera, Level, TextureBank};
