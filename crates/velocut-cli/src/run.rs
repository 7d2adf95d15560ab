// crates/velocut-cli/src/run.rs
//
// Engine assembly: load a timeline, wire up the I/O plugin, Player, and
// Renderer, apply the CLI's startup options, then run a bounded tick loop
// composing frames the way a real windowed host's paint loop would (§4.1,
// §4.3). No winit/window-surface crate appears anywhere in the example
// pack this workspace was built from, so "windowSize"/"fullscreen" size the
// offscreen render target and "hud" gates per-frame log lines rather than
// opening a real window — see DESIGN.md.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use velocut_core::config::{ItemOptions, WindowOptions};
use velocut_core::io_contract::IoPlugin;
use velocut_core::options::CompareMode;
use velocut_core::state::{AspectRatio, Playback};
use velocut_core::timeline::Timeline;
use velocut_io::FfmpegIoPlugin;
use velocut_player::Player;
use velocut_render::{BackgroundOptions, DisplayOptions, ImageOptions, Renderer};

use crate::args::{parse_in_out_range, parse_rational_time, parse_window_size, Cli};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    ffmpeg_the_third::init().context("FFmpeg init failed")?;

    let (width, height) = parse_window_size(&cli.window_size)?;
    let window = WindowOptions {
        width,
        height,
        aspect_ratio: AspectRatio::SixteenNine,
        full_screen: cli.fullscreen,
    };

    let mut item = ItemOptions::default();
    item.ocio.config_path = cli.color_config.as_ref().map(|p| p.display().to_string());
    item.ocio.input_name = cli.color_input.clone();
    item.ocio.display_name = cli.color_display.clone();
    item.ocio.view_name = cli.color_view.clone();
    item.lut.file_name = cli.lut.as_ref().map(|p| p.display().to_string());
    item.lut.order = cli.lut_order.map(Into::into);

    let timeline = load_timeline(&cli.input_timeline)?;
    let io: Arc<dyn IoPlugin> = Arc::new(FfmpegIoPlugin::new());
    let player = Player::new(timeline.clone(), io.clone());

    let compare_player = match &cli.compare {
        Some(path) => {
            let other = load_timeline(path)?;
            item.compare.mode = CompareMode::Wipe;
            Some(Player::new(other, io.clone()))
        }
        None => None,
    };

    if let Some(seek) = &cli.seek {
        player.seek(parse_rational_time(seek, timeline.rate.max(1.0))?);
    }
    if let Some(range) = &cli.in_out_range {
        player.set_in_out_range(parse_in_out_range(range, timeline.rate.max(1.0))?);
    }
    player.set_playback(cli.playback.into());
    if let Some(other) = &compare_player {
        other.set_playback(cli.playback.into());
    }

    let mut renderer = Renderer::new().context("GPU renderer init failed")?;
    let render_size = velocut_core::image::Size::new(window.width, window.height);

    let frame_dt = 1.0 / timeline.rate.max(1.0);
    let max_frames = (timeline.duration().seconds() * timeline.rate.max(1.0)).ceil() as u64 + 1;

    for frame_index in 0..max_frames {
        player.tick(frame_dt);
        player.refresh_current();
        if let Some(other) = &compare_player {
            other.tick(frame_dt);
            other.refresh_current();
        }

        let video = player.current_video();
        let Some(layer) = video.layers.first() else { continue };

        let mut videos = vec![Arc::new(layer.image.clone())];
        if let Some(other) = &compare_player {
            if let Some(other_layer) = other.current_video().layers.first() {
                videos.push(Arc::new(other_layer.image.clone()));
            }
        }

        let mut frame = renderer.begin(render_size)?;
        frame.clear_viewport(velocut_render::Color::BLACK);
        let image_opts: Vec<ImageOptions> = videos.iter().map(|_| ImageOptions::default()).collect();
        let display_opts = DisplayOptions { ocio: item.ocio.clone(), lut: item.lut.clone(), hdr: item.hdr, yuv_coefficients: None };
        frame.draw_video(videos, None, image_opts, display_opts, item.compare, BackgroundOptions::default());
        let _target = frame.end(&mut renderer)?;

        if cli.hud != 0 {
            let info = player.cache_info();
            log::info!(
                "frame {frame_index}: t={:.3}s playback={:?} cache={:.0}%",
                player.current_time().seconds(),
                player.playback(),
                info.video_percent
            );
        }

        if player.playback() == Playback::Stop {
            break;
        }
        std::thread::sleep(Duration::from_secs_f64(frame_dt.min(1.0 / 240.0)));
    }

    Ok(())
}

fn load_timeline(path: &Path) -> anyhow::Result<Timeline> {
    let file = File::open(path).with_context(|| format!("opening timeline {}", path.display()))?;
    let timeline: Timeline = serde_json::from_reader(file).with_context(|| format!("parsing timeline {}", path.display()))?;
    Ok(timeline)
}
