//! patch-raster viewer
//!
//! ```text
//! patch-raster [scene.ron] [--headless FRAMES OUT_DIR]
//! ```
//!
//! Without `--headless`, opens a window at the scene's `width` x `height` and renders the
//! orbiting scene every frame, following later window resizes (F12 saves a screenshot,
//! Escape quits). With it, renders `FRAMES` frames at 30 fps steps into numbered PNGs of
//! the scene's size.

use std::path::{Path, PathBuf};
use log::{error, info};
use macroquad::prelude::{
    clear_background, draw_texture_ex, get_frame_time, is_key_pressed, next_frame, screen_height,
    screen_width, vec2, Conf, DrawTextureParams, FilterMode, KeyCode, Texture2D, BLACK, WHITE,
};
use patch_raster::capture;
use patch_raster::frame::{FrameRenderer, Scene};
use patch_raster::rasterizer::{LANE_BACKEND, MAX_FB_HEIGHT, MAX_FB_WIDTH};
use patch_raster::scene::{load_scene, SceneConfig};
use patch_raster::VERSION;

/// Seconds between headless frames
const HEADLESS_STEP: f32 = 1.0 / 30.0;

struct Args {
    scene_path: Option<PathBuf>,
    headless: Option<(usize, PathBuf)>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args { scene_path: None, headless: None };
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        if arg == "--headless" {
            let frames = iter
                .next()
                .ok_or("--headless needs a frame count")?
                .parse::<usize>()
                .map_err(|e| format!("bad frame count: {}", e))?;
            let out_dir = iter.next().ok_or("--headless needs an output directory")?;
            args.headless = Some((frames, PathBuf::from(out_dir)));
        } else if arg.starts_with("--") {
            return Err(format!("unknown option {}", arg));
        } else if args.scene_path.is_none() {
            args.scene_path = Some(PathBuf::from(arg));
        } else {
            return Err(format!("unexpected argument {}", arg));
        }
    }

    Ok(args)
}

fn load(scene_path: Option<&Path>) -> Result<Scene, String> {
    let (config, base_dir) = match scene_path {
        Some(path) => {
            let config = load_scene(path).map_err(|e| format!("{}: {}", path.display(), e))?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (config, base)
        }
        None => {
            info!("No scene file given, using the built-in scene");
            (SceneConfig::default(), PathBuf::from("."))
        }
    };
    Scene::load(config, &base_dir).map_err(|e| e.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn run_headless(scene: &Scene, frames: usize, out_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    use indicatif::{ProgressBar, ProgressStyle};

    std::fs::create_dir_all(out_dir)?;
    let config = &scene.config;
    let mut renderer = FrameRenderer::with_capacity(config.width, config.height, config.shadow.map_size);

    let bar = ProgressBar::new(frames as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} frames ({eta})")?
            .progress_chars("=> "),
    );

    let mut draw_ms = 0.0;
    for i in 0..frames {
        let time = config.camera.start_time + i as f32 * HEADLESS_STEP;
        draw_ms += renderer.render(scene, time).draw_ms;
        capture::save_png(renderer.color_buffer(), out_dir.join(format!("frame_{:04}.png", i)))?;
        bar.inc(1);
    }
    bar.finish();

    if frames > 0 {
        info!("Rendered {} frames, {:.3}ms average draw", frames, draw_ms / frames as f32);
    }
    Ok(())
}

fn window_conf(config: &SceneConfig) -> Conf {
    // validate() keeps both within MAX_FB_*, far below i32::MAX
    Conf {
        window_title: format!("patch-raster v{}", VERSION),
        window_width: config.width as i32,
        window_height: config.height as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn save_screenshot(renderer: &FrameRenderer) {
    let dialog = rfd::FileDialog::new()
        .add_filter("PNG Image", &["png"])
        .set_file_name("screenshot.png");

    if let Some(path) = dialog.save_file() {
        if let Err(e) = capture::save_png(renderer.color_buffer(), &path) {
            error!("Screenshot failed: {}", e);
        }
    }
}

async fn run_window(scene: Scene) {
    let config = &scene.config;
    let mut renderer = FrameRenderer::new(config.width, config.height, config.shadow.map_size);
    let mut time = config.camera.start_time;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        time += get_frame_time();

        // Track the window size, within the buffers' capacity
        let target = (
            (screen_width() as usize).clamp(1, MAX_FB_WIDTH),
            (screen_height() as usize).clamp(1, MAX_FB_HEIGHT),
        );
        if target != renderer.size() {
            renderer.resize(target.0, target.1);
        }

        renderer.render(&scene, time);

        #[cfg(not(target_arch = "wasm32"))]
        if is_key_pressed(KeyCode::F12) {
            save_screenshot(&renderer);
        }

        let fb = renderer.color_buffer();
        let (fb_w, fb_h) = (fb.width() as f32, fb.height() as f32);
        let texture = Texture2D::from_rgba8(fb.width() as u16, fb.height() as u16, &capture::to_rgba8(fb));
        texture.set_filter(FilterMode::Nearest);

        // Letterbox to the window, keeping the framebuffer's aspect
        let (sw, sh) = (screen_width(), screen_height());
        let scale = (sw / fb_w).min(sh / fb_h);
        let (draw_w, draw_h) = (fb_w * scale, fb_h * scale);

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            (sw - draw_w) * 0.5,
            (sh - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("patch-raster v{} ({} lanes)", VERSION, LANE_BACKEND);

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            error!("{}", e);
            eprintln!("usage: patch-raster [scene.ron] [--headless FRAMES OUT_DIR]");
            std::process::exit(2);
        }
    };

    let scene = match load(args.scene_path.as_deref()) {
        Ok(scene) => scene,
        Err(e) => {
            error!("Failed to load scene: {}", e);
            std::process::exit(1);
        }
    };

    if let Some((frames, out_dir)) = args.headless {
        #[cfg(not(target_arch = "wasm32"))]
        if let Err(e) = run_headless(&scene, frames, &out_dir) {
            error!("Headless render failed: {}", e);
            std::process::exit(1);
        }
        #[cfg(target_arch = "wasm32")]
        error!("Headless mode is unavailable on this target ({} frames to {} skipped)", frames, out_dir.display());
        return;
    }

    macroquad::Window::from_config(window_conf(&scene.config), run_window(scene));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_opens_at_scene_size() {
        let config = SceneConfig { width: 320, height: 200, ..SceneConfig::default() };
        let conf = window_conf(&config);
        assert_eq!((conf.window_width, conf.window_height), (320, 200));
        assert!(conf.window_resizable);
    }
}
