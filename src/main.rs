use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use driver_tracker_rs::camera::{camera_for_two_points, follow_camera, ZoomLevel};
use driver_tracker_rs::geodesy::distance_meters;
use driver_tracker_rs::interpolation::interpolate_segment;
use driver_tracker_rs::{ConfigOverrides, EngineConfig, Fix, FixOutcome, GeoPoint, LiveMapEngine, Route};
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(name = "driver_tracker")]
#[command(about = "Simulated live driver tracking - marker animation and route progress", long_about = None)]
struct Args {
    /// Duration in seconds (0 = until the simulated trip ends)
    #[arg(value_name = "SECONDS", default_value = "0")]
    duration: u64,

    /// Render frames per second
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Milliseconds between simulated GPS fixes
    #[arg(long, default_value = "1000")]
    fix_interval_ms: u64,

    /// Simulated driver speed (m/s)
    #[arg(long, default_value = "10.0")]
    speed: f64,

    /// Peak GPS noise added to each fix (m)
    #[arg(long, default_value = "3.0")]
    noise_m: f64,

    /// Engine config JSON (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the jitter threshold (m)
    #[arg(long)]
    jitter_threshold_m: Option<f64>,

    /// Override the route look-ahead (vertices)
    #[arg(long)]
    look_ahead: Option<usize>,

    /// Override the minimum animation duration (ms)
    #[arg(long)]
    min_duration_ms: Option<u64>,

    /// Override the maximum animation duration (ms)
    #[arg(long)]
    max_duration_ms: Option<u64>,

    /// Override the marker throttle window (ms, 0 disables)
    #[arg(long)]
    marker_throttle_ms: Option<u64>,

    /// Override the progress throttle window (ms, 0 disables)
    #[arg(long)]
    progress_throttle_ms: Option<u64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            jitter_threshold_m: self.jitter_threshold_m,
            look_ahead: self.look_ahead,
            min_duration_ms: self.min_duration_ms,
            max_duration_ms: self.max_duration_ms,
            marker_throttle_ms: self.marker_throttle_ms,
            progress_throttle_ms: self.progress_throttle_ms,
        }
    }
}

/// Rough meters per degree of latitude
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Densify a few waypoints into a ~10 m spaced trip polyline
fn synthetic_route() -> Route {
    let waypoints = [
        GeoPoint::new(12.9716, 77.5946),
        GeoPoint::new(12.9760, 77.5950),
        GeoPoint::new(12.9765, 77.6010),
        GeoPoint::new(12.9820, 77.6045),
    ];
    let mut points = vec![waypoints[0]];
    for pair in waypoints.windows(2) {
        let steps = (distance_meters(pair[0], pair[1]) / 10.0).ceil() as usize;
        points.extend(interpolate_segment(pair[0], pair[1], steps).into_iter().skip(1));
    }
    Route::new(points)
}

/// Feed fixes walking the route, with deterministic wobble standing in for GPS noise
async fn fix_loop(route: Route, tx: mpsc::Sender<Fix>, every: Duration, speed: f64, noise_m: f64) {
    let mut ticker = interval(every);
    let step_m = speed * every.as_secs_f64();
    let mut travelled_m = 0.0;
    let mut index = 0usize;
    let mut count = 0u64;
    let started = Instant::now();

    while index < route.len() {
        ticker.tick().await;

        let p = route[index];
        let wobble = (count as f64 * 1.7).sin() * noise_m / METERS_PER_DEGREE;
        let fix = Fix::new(
            started.elapsed().as_secs_f64(),
            p.latitude + wobble,
            p.longitude - wobble,
            Some(speed),
        );
        if tx.send(fix).await.is_err() {
            log::info!("[gps] Channel closed after {} fixes", count);
            return;
        }
        count += 1;

        // Advance to the vertex reached after another step along the route
        let mut walked = 0.0;
        let mut next = index;
        while next + 1 < route.len() && walked < step_m {
            walked += distance_meters(route[next], route[next + 1]);
            next += 1;
        }
        travelled_m += walked;
        index = if next == index { route.len() } else { next };
    }
    log::info!("[gps] Trip finished: {} fixes, {:.0} m", count, travelled_m);
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S%.3f").to_string()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    }
    .with_overrides(&args.overrides())
    .context("applying config overrides")?;
    let route = synthetic_route();
    let destination = route.last().copied();

    println!("[{}] Driver Tracker RS Starting", ts_now());
    println!("  Duration: {} seconds (0=until trip ends)", args.duration);
    println!("  Frame rate: {} fps", args.fps);
    println!("  Fix interval: {} ms", args.fix_interval_ms);
    println!("  Route: {} vertices, {:.0} m", route.len(), route.length_m());

    let mut engine = LiveMapEngine::new(config, route.clone())?;

    let (fix_tx, mut fix_rx) = mpsc::channel::<Fix>(100);
    let _gps_handle = tokio::spawn(fix_loop(
        route,
        fix_tx,
        Duration::from_millis(args.fix_interval_ms.max(1)),
        args.speed,
        args.noise_m,
    ));

    let mut frames = interval(Duration::from_secs_f64(1.0 / f64::from(args.fps.max(1))));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = Instant::now();
    let deadline = (args.duration > 0).then(|| started + Duration::from_secs(args.duration));

    let mut frame_count = 0u64;
    let mut accepted = 0u64;
    let mut filtered = 0u64;
    let mut feed_open = true;

    loop {
        tokio::select! {
            maybe_fix = fix_rx.recv(), if feed_open => {
                let Some(fix) = maybe_fix else {
                    feed_open = false;
                    continue;
                };
                let update = engine.on_fix(&fix, Instant::now());
                match update.marker {
                    FixOutcome::Filtered { distance_m } => {
                        filtered += 1;
                        log::debug!("Fix filtered ({:.1} m)", distance_m);
                    }
                    outcome if outcome.accepted() => accepted += 1,
                    _ => {}
                }
                if let Some(progress) = update.progress {
                    println!(
                        "[{}] Progress {:5.1}% | {:.0} m to go | off-route {:.1} m",
                        ts_now(),
                        progress.progress_percent,
                        progress.remaining_distance_m(),
                        progress.distance_to_route_m.unwrap_or(0.0)
                    );
                }
            }
            _ = frames.tick() => {
                let now = Instant::now();
                if let Some(frame) = engine.tick(now) {
                    frame_count += 1;
                    let camera = follow_camera(frame.state.position, frame.state.bearing_degrees, ZoomLevel::Close);
                    log::trace!("Camera {:?}", camera);
                    for generation in &frame.completed {
                        log::debug!("Transition {} complete", generation);
                    }
                }
                if let Some(settled) = engine.poll_settled(now) {
                    if let Some(dest) = destination {
                        let overview = camera_for_two_points(settled.point(), dest);
                        println!(
                            "[{}] Fixes settled - overview zoom {:.0} centered {:.5},{:.5}",
                            ts_now(),
                            overview.zoom,
                            overview.center.latitude,
                            overview.center.longitude
                        );
                    }
                }
                if !feed_open && engine.animator().transition().is_none() {
                    break;
                }
                if deadline.map_or(false, |d| now >= d) {
                    break;
                }
            }
        }
    }

    println!("[{}] Done", ts_now());
    println!("  Frames: {}", frame_count);
    println!("  Fixes accepted: {} | filtered: {}", accepted, filtered);
    println!("  Final progress: {:.1}%", engine.progress().progress_percent);
    Ok(())
}
