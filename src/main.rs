// What you SEE:
// • Live camera feed where each row is shown as it was `row` frames ago:
//   the top row is live, the bottom row lags the most, motion shears diagonally.
// • SPACE toggles the effect (raw feed), C clears the row history,
//   S saves the current frame as PNG. ESC quits.
// • No camera? The window still opens, black, with "NO SENSOR".

mod camera;
mod config;
mod delay;
mod draw;
mod error;
mod pipeline;
mod types;

use camera::CameraCapture;
use clap::Parser;
use config::Config;
use draw::{Drawer, draw_text_5x7, hud_line};
use error::Error;
use pipeline::{FrameGuard, Pipeline};
use std::time::{Duration, Instant};
use types::Bgr32Frame;

fn main() -> Result<(), Error> {
    let cfg = Config::parse();
    config::init_logging(&cfg);

    /* --- Camera ---
       A failed start turns the feature off; we keep the window. */
    let mut cam = match CameraCapture::new(cfg.camera, cfg.width, cfg.height, cfg.fps) {
        Ok(cam) => Some(cam),
        Err(e) => {
            log::warn!("{e}; running without a sensor");
            None
        }
    };
    let (w, h) = cam.as_ref().map_or((cfg.width, cfg.height), |c| c.resolution());
    let (w, h) = (w as usize, h as usize);

    let mut drawer = Drawer::new(&cfg.title, w, h)?;
    let mut pipeline = Pipeline::new(w, h, cfg.bypass)?;
    let mut guard = FrameGuard::new(cfg.max_missed_frames);

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Inputs */
        if drawer.space_pressed_once() {
            let bypass = pipeline.toggle_bypass();
            log::info!("delay effect {}", if bypass { "off" } else { "on" });
        }
        if drawer.c_pressed_once() {
            pipeline.clear();
            log::info!("row history cleared");
        }

        /* 2) Grab a frame (or a black one without a sensor).
           A bad frame keeps the previous picture up. */
        let fetched = match cam.as_mut() {
            Some(cam) => guard.check(cam.next_frame())?,
            None => {
                let screen = pipeline.screen();
                Some(Bgr32Frame::blank(screen.width, screen.height))
            }
        };
        let Some(mut frame) = fetched else {
            drawer.present(pipeline.screen())?;
            continue;
        };

        /* 3) Shear it and copy to the screen. */
        pipeline.step(&mut frame, cam.is_some())?;

        if drawer.s_pressed_once() {
            save_snapshot(&frame, pipeline.ticks());
        }

        /* 4) HUD on top, present. */
        let mode = match (&cam, pipeline.bypass()) {
            (None, _) => "NO SENSOR",
            (Some(_), true) => "BYPASS",
            (Some(_), false) => "SHEAR",
        };
        let hud = hud_line(mode, pipeline.ticks(), &hud_fps_text);
        draw_text_5x7(pipeline.screen_mut(), 8, 8, &hud, 0x00_FF_FF_FF);
        drawer.present(pipeline.screen())?;

        /* 5) FPS counter (log + HUD once per second) */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            log::debug!("FPS: {:.1}", fps);
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    // Dropping the camera stops the stream.
    drop(cam);
    log::info!("bye after {} frames", pipeline.ticks());
    Ok(())
}

/// Write the frame as `row-shear-<tick>.png` in the working directory.
/// A failed save is logged, not fatal.
fn save_snapshot(frame: &Bgr32Frame, tick: u64) {
    let path = format!("row-shear-{tick:06}.png");
    match frame.to_rgb_image().save(&path) {
        Ok(()) => log::info!("saved {path}"),
        Err(e) => log::warn!("saving {path}: {e}"),
    }
}
