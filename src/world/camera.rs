use glam::{Vec2, vec2};

/// Player view-point in fractional grid coordinates.
///
/// Only yaw is simulated; the renderer never tilts up/down.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pos: Vec2, // fractional tile units
    yaw: f32,  // radians (0 = +X east, counter-clockwise)
    fov: f32,  // horizontal FoV (radians, typical 60-90°)
}

impl Camera {
    /// Create a new camera at `pos`, facing `yaw`, with horizontal FoV `fov`.
    pub fn new(pos: Vec2, yaw: f32, fov: f32) -> Self {
        Self { pos, yaw, fov }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks.
    #[inline(always)]
    pub fn forward(self) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        vec2(c, s)
    }

    /// Unit vector pointing to the camera's right.
    #[inline(always)]
    pub fn right(self) -> Vec2 {
        self.forward().perp()
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Where a move by `forward` / `side` (strafe) units would land.
    /// Collision against the grid is the caller's business.
    pub fn step_target(&self, forward: f32, side: f32) -> Vec2 {
        self.pos + self.forward() * forward + self.right() * side
    }

    pub fn move_to(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    /// Rotate around the vertical axis (positive = turn left).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
    }

    /*───────────────── projection helpers ─────────────────*/

    /// Pixel-per-tile-unit focal scale for viewport width `w`.
    ///
    /// ```text
    /// focal = w / (2 * tan(fov/2))
    /// ```
    #[inline]
    pub fn screen_scale(self, w: usize) -> f32 {
        (w as f32) * 0.5 / (self.fov * 0.5).tan()
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
