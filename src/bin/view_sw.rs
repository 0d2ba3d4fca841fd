//! Interactive software-rendered walkthrough of a built-in level.
//!
//! ```bash
//! cargo run --release            # defaults
//! cargo run --release -- --width 1280 --height 800 --fov 75
//! ```
//!
//! Controls: W/S or ↑/↓ move, A/D strafe, ←/→ turn, Space toggles the
//! doors, P starts the push-wall, Esc quits.

use clap::Parser;
use glam::vec2;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

use wolfray_rs::{
    Camera, ColumnHeightBuffer, Level, RenderContext, Renderer, Software, TextureBank,
    render_frame,
    world::{SpotVis, Texture},
};

#[derive(Parser)]
#[command(about = "Wolfenstein-style raycaster demo")]
struct Args {
    #[arg(long, default_value_t = 960)]
    width: usize,
    #[arg(long, default_value_t = 600)]
    height: usize,
    /// Horizontal field of view in degrees.
    #[arg(long, default_value_t = 66.0)]
    fov: f32,
}

static DEMO_MAP: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "################",
        "#..............#",
        "#..22..........#",
        "#..2...........#",
        "#......####D####",
        "#......#.......#",
        "#..3...#...5...#",
        "#..3...P.......#",
        "#......#.......#",
        "################",
    ]
});

const MOVE_SPEED: f32 = 3.0; // tiles per second
const TURN_SPEED: f32 = 2.2; // radians per second
const DOOR_SPEED: f32 = 1.5; // open-fraction per second
const PUSH_SPEED: f32 = 0.8; // cells per second

/// Procedural brick-ish texture so the demo needs no asset files.
fn brick(base: u8) -> Texture {
    let (w, h) = (64, 64);
    let mut pixels = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let row = y / 16;
            let shifted = (x + if row % 2 == 0 { 0 } else { 8 }) % 16;
            let mortar = y % 16 == 0 || shifted == 0;
            pixels[y * w + x] = if mortar {
                60
            } else {
                base.wrapping_add(((x * 7 + y * 13) % 23) as u8)
            };
        }
    }
    Texture {
        name: String::new(),
        w,
        h,
        pixels,
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut level = Level::from_ascii(&DEMO_MAP)?;
    let grid_w = level.grid().width();
    let grid_h = level.grid().height();
    log::info!("demo level: {grid_w}x{grid_h} tiles");

    // Insertion order fixes the ids the map glyphs reference:
    // '#'/'P' → 1, digits → their value, 'D' → 10.
    let mut bank = TextureBank::default_with_checker();
    let bases: [u8; 10] = [150, 120, 180, 140, 100, 90, 90, 90, 90, 220];
    for (i, base) in bases.into_iter().enumerate() {
        bank.insert(format!("WALL{}", i + 1), brick(base))?;
    }

    let mut camera = Camera::new(vec2(1.5, 1.5), 0.9, args.fov.to_radians());
    let ctx = RenderContext::new(args.width, args.height, args.fov.to_radians());
    let mut renderer = Software::default();
    let mut heights = ColumnHeightBuffer::new(args.width);
    let mut vis = SpotVis::new(grid_w, grid_h);

    let mut win = Window::new(
        "wolfray software render",
        args.width,
        args.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(60);

    let mut doors_opening = false;
    let mut push_started = false;

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();
    let mut last_tick = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let dt = last_tick.elapsed().as_secs_f32().min(0.1);
        last_tick = Instant::now();

        /* ------------- game-logic tick (between frames only) ---------- */
        if win.is_key_pressed(Key::Space, KeyRepeat::No) {
            doors_opening = !doors_opening;
            log::info!("doors {}", if doors_opening { "opening" } else { "closing" });
        }
        if win.is_key_pressed(Key::P, KeyRepeat::No) {
            push_started = true;
        }
        let door_target = if doors_opening { 1.0 } else { 0.0 };
        for i in 0..level.doors().len() {
            let d = level.door_mut(i as u16);
            let step = DOOR_SPEED * dt;
            let cur = d.open();
            d.set_open(cur + (door_target - cur).clamp(-step, step));
        }
        if push_started {
            let pw = level.push_wall_mut(0);
            pw.set_offset(pw.offset() + PUSH_SPEED * dt);
        }

        /* movement --------------------------------------------------------- */
        let mut forward = 0.0;
        let mut side = 0.0;
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            forward += MOVE_SPEED * dt;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            forward -= MOVE_SPEED * dt;
        }
        if win.is_key_down(Key::A) {
            side -= MOVE_SPEED * dt;
        }
        if win.is_key_down(Key::D) {
            side += MOVE_SPEED * dt;
        }
        if win.is_key_down(Key::Left) {
            camera.turn(TURN_SPEED * dt);
        }
        if win.is_key_down(Key::Right) {
            camera.turn(-TURN_SPEED * dt);
        }

        /* slide along solid cells instead of sticking to them */
        let target = camera.step_target(forward, side);
        let pos = camera.pos();
        let passable = |x: f32, y: f32| {
            let t = level.grid().tile(x.floor() as i32, y.floor() as i32);
            !t.is_solid() || (t.is_door() && level.door(t.state).open() >= 1.0)
        };
        let nx = if passable(target.x, pos.y) { target.x } else { pos.x };
        let ny = if passable(nx, target.y) { target.y } else { pos.y };
        camera.move_to(vec2(nx, ny));

        /* draw */
        let t0 = Instant::now();
        render_frame(
            &level,
            &camera,
            &ctx,
            &bank,
            &mut heights,
            &mut vis,
            &mut renderer,
        );
        renderer.end_frame(|fb, w, h| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            win.update_with_buffer(fb, w, h).unwrap()
        });

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            log::info!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
