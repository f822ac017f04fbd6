//! Edge Finder CLI
//!
//! Drives the live edge view from a synthetic camera: a producer thread
//! delivers preview frames, the main thread plays the display, and each
//! line typed on stdin acts as the shutter.

use clap::Parser;
use edge_finder::{
    capture::{Camera, FileConfig, MockCamera},
    detector::{Bitmap, EdgeDetector},
    metrics::{MetricsRegistry, MetricsSnapshot},
    view::{DrawOutcome, EdgeView, PngDirectoryStore},
};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "edge-finder", version, about = "Live edge view with still capture")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Edge threshold (0-255).
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Preview width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Preview height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Number of camera frames to deliver.
    #[arg(short = 'n', long)]
    frames: Option<u32>,

    /// Directory captures are written to.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Press the shutter when this camera frame is delivered (repeatable).
    #[arg(long)]
    capture_at: Vec<u32>,

    /// Run until interrupted.
    #[arg(long)]
    continuous: bool,
}

fn load_config(cli: &Cli) -> Result<FileConfig, edge_finder::capture::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    if let Some(threshold) = cli.threshold {
        config.detector.threshold = threshold;
    }
    if let Some(width) = cli.width {
        config.capture.width = width;
    }
    if let Some(height) = cli.height {
        config.capture.height = height;
    }
    if let Some(frames) = cli.frames {
        config.output.frame_count = frames;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    config.output.continuous |= cli.continuous;

    config.validate()?;
    Ok(config)
}

/// Whether this refresh should draw: a redraw was requested, or the camera
/// has stopped and one last frame may be waiting.
fn redraw_due(redraw_rx: &mpsc::Receiver<()>, camera_done: bool) -> bool {
    redraw_rx.try_recv().is_ok() || camera_done
}

#[cfg(feature = "metrics")]
fn spawn_metrics_server(port: u16, view: Arc<EdgeView>) {
    use edge_finder::metrics::{MetricsServer, MetricsServerConfig};

    if port == 0 {
        return;
    }
    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            return;
        }
    };
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Metrics runtime failed to start: {}", e);
                return;
            }
        };
        let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry, view);
        if let Err(e) = runtime.block_on(server.run()) {
            warn!("Metrics server stopped: {}", e);
        }
    });
}

fn main() {
    edge_finder::logging::init(tracing::Level::INFO);
    let cli = Cli::parse();

    info!("Edge Finder v{}", edge_finder::VERSION);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Could not install Ctrl-C handler: {}", e);
        }
    }

    // Display side: redraw requests collapse into at most one pending token.
    let (redraw_tx, redraw_rx) = mpsc::sync_channel::<()>(1);
    let view = Arc::new(
        EdgeView::new(
            EdgeDetector::new(config.detector.threshold),
            PngDirectoryStore::new(&config.output.directory),
        )
        .with_redraw(move || {
            let _ = redraw_tx.try_send(());
        }),
    );

    #[cfg(feature = "metrics")]
    spawn_metrics_server(config.output.metrics_port, Arc::clone(&view));

    // Shutter: every line on stdin arms a capture.
    {
        let view = Arc::clone(&view);
        thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if line.is_err() {
                    break;
                }
                if view.request_capture() {
                    info!("Shutter pressed");
                }
            }
        });
    }

    let mut camera = MockCamera::new();
    if let Err(e) = camera.open(&config.capture) {
        eprintln!("Failed to open camera: {}", e);
        std::process::exit(1);
    }

    info!(
        width = config.capture.width,
        height = config.capture.height,
        threshold = config.detector.threshold,
        "Streaming preview (press Enter to capture)"
    );

    let producer = {
        let view = Arc::clone(&view);
        let running = Arc::clone(&running);
        let capture_at = cli.capture_at.clone();
        let frame_period = Duration::from_secs(1) / config.capture.fps;
        let frame_count = config.output.frame_count;
        let continuous = config.output.continuous;

        thread::spawn(move || {
            let mut delivered = 0u32;
            while running.load(Ordering::SeqCst) && (continuous || delivered < frame_count) {
                let started = Instant::now();
                let frame = match camera.capture() {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Frame capture failed: {}", e);
                        break;
                    }
                };
                delivered += 1;

                if capture_at.contains(&delivered) {
                    view.request_capture();
                }
                if let Err(e) = view.on_preview_frame(frame.pixels(), frame.width(), frame.height()) {
                    warn!("Frame {} rejected: {}", delivered, e);
                }

                if let Some(rest) = frame_period.checked_sub(started.elapsed()) {
                    thread::sleep(rest);
                }
            }
            camera.close();
            delivered
        })
    };

    let refresh = Duration::from_secs(1) / config.output.display_hz;
    let mut display = Bitmap::new(config.capture.width, config.capture.height);

    loop {
        let vsync = Instant::now();
        let camera_done = producer.is_finished();

        if !redraw_due(&redraw_rx, camera_done) {
            thread::sleep(refresh);
            continue;
        }

        match view.on_draw(&mut display) {
            DrawOutcome::Captured { edges, location } => {
                info!(edges, "Captured {}", location);
            }
            DrawOutcome::CaptureFailed { error, .. } => {
                warn!("Capture failed: {}", error);
            }
            DrawOutcome::Skipped(e) => warn!("Frame skipped: {}", e),
            DrawOutcome::Rendered { .. } | DrawOutcome::Idle => {}
        }

        if camera_done {
            break;
        }
        if let Some(rest) = refresh.checked_sub(vsync.elapsed()) {
            thread::sleep(rest);
        }
    }

    let delivered = producer.join().unwrap_or(0);
    let snapshot = MetricsSnapshot::from_view(&view);
    info!(
        delivered,
        published = snapshot.buffer.published,
        dropped = snapshot.buffer.dropped_busy + snapshot.buffer.dropped_unconsumed,
        rendered = snapshot.view.rendered,
        captures = snapshot.view.captures_saved,
        "Done"
    );

    match MetricsRegistry::new() {
        Ok(registry) => {
            registry.update(&snapshot);
            if let Ok(text) = registry.encode() {
                tracing::debug!("Final metrics:\n{}", text);
            }
        }
        Err(e) => warn!("Metrics unavailable: {}", e),
    }
}
