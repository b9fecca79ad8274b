use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use driver_tracker_rs::{ConfigOverrides, EngineConfig, Fix, FixOutcome, GeoPoint, LiveMapEngine, Route};
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::json;

#[derive(Parser, Debug)]
struct Args {
    /// Path to trip_*.json[.gz] log
    #[arg(long, conflicts_with = "trip_dir")]
    log: Option<PathBuf>,

    /// Directory of trip logs to batch replay (processes trip_*.json[.gz])
    #[arg(long)]
    trip_dir: Option<PathBuf>,

    /// Frames rendered per second of trip time
    #[arg(long, default_value = "60")]
    fps: u32,

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

    /// Write the summary here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
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

#[derive(Deserialize)]
struct TripLog {
    #[serde(default)]
    route: Vec<GeoPoint>,
    fixes: Vec<Fix>,
}

fn load_log(path: &Path) -> anyhow::Result<TripLog> {
    let file = File::open(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let gz = GzDecoder::new(file);
        let reader = BufReader::new(gz);
        Ok(serde_json::from_reader(reader)?)
    } else {
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Replay one trip on a virtual clock anchored at the first fix timestamp
fn run_once(path: &Path, config: &EngineConfig, fps: u32) -> anyhow::Result<serde_json::Value> {
    let trip = load_log(path).with_context(|| format!("reading {}", path.display()))?;
    let route = Route::sanitized(trip.route);
    let route_len_m = route.length_m();
    let mut engine = LiveMapEngine::new(config.clone(), route)?;

    let frame_step = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let base = Instant::now();
    let first_ts = trip.fixes.first().map(|f| f.timestamp).unwrap_or(0.0);
    let mut clock = base;

    let mut frames = 0u64;
    let mut initialized = 0u64;
    let mut started = 0u64;
    let mut superseded = 0u64;
    let mut filtered = 0u64;
    let mut rejected = 0u64;
    let mut throttled = 0u64;
    let mut completed = 0u64;
    let mut settled = 0u64;
    let mut out_of_order = 0u64;
    let mut max_off_route_m = 0.0_f64;
    let mut progress_log = Vec::new();
    let mut last_ts = f64::NEG_INFINITY;

    let mut render_until = |engine: &mut LiveMapEngine, clock: &mut Instant, until: Instant| {
        while *clock + frame_step <= until {
            *clock += frame_step;
            if let Some(frame) = engine.tick(*clock) {
                frames += 1;
                completed += frame.completed.len() as u64;
            }
            if engine.poll_settled(*clock).is_some() {
                settled += 1;
            }
        }
    };

    for fix in &trip.fixes {
        if fix.timestamp < last_ts {
            out_of_order += 1;
        }
        last_ts = last_ts.max(fix.timestamp);

        // Late fixes are applied at the current clock; time never runs backwards
        let offset = (fix.timestamp - first_ts).max(0.0);
        let at = Duration::try_from_secs_f64(offset)
            .ok()
            .and_then(|d| base.checked_add(d))
            .map_or(clock, |t| t.max(clock));
        render_until(&mut engine, &mut clock, at);
        clock = at;

        let update = engine.on_fix(fix, clock);
        match update.marker {
            FixOutcome::Initialized => initialized += 1,
            FixOutcome::Started { .. } => started += 1,
            FixOutcome::Superseded { .. } => superseded += 1,
            FixOutcome::Filtered { .. } => filtered += 1,
            FixOutcome::Rejected => rejected += 1,
            FixOutcome::Throttled => throttled += 1,
        }
        if let Some(progress) = update.progress {
            if let Some(d) = progress.distance_to_route_m {
                max_off_route_m = max_off_route_m.max(d);
            }
            progress_log.push(json!({
                "timestamp": fix.timestamp,
                "percent": progress.progress_percent,
                "matched_index": progress.matched_index,
                "nearest_index": progress.nearest_index,
                "remaining_m": progress.remaining_distance_m(),
            }));
        }
    }

    // Let the last transition and settle timer run out
    let drain = clock + Duration::from_millis(config.max_duration_ms + config.settle_debounce_ms);
    render_until(&mut engine, &mut clock, drain);

    let final_state = engine.snapshot();
    if rejected > 0 {
        log::warn!("{}: {} fixes rejected", path.display(), rejected);
    }

    Ok(json!({
        "log": path.display().to_string(),
        "route_vertices": engine.route().len(),
        "route_length_m": route_len_m,
        "fixes": trip.fixes.len(),
        "out_of_order": out_of_order,
        "initialized": initialized,
        "started": started,
        "superseded": superseded,
        "filtered": filtered,
        "rejected": rejected,
        "throttled": throttled,
        "completed": completed,
        "settled": settled,
        "frames": frames,
        "max_off_route_m": max_off_route_m,
        "final_progress_percent": engine.progress().progress_percent,
        "final_state": final_state,
        "progress": progress_log,
    }))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    }
    .with_overrides(&args.overrides())
    .context("applying config overrides")?;

    let mut results = Vec::new();
    if let Some(dir) = args.trip_dir.as_ref() {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !(name.starts_with("trip_") && (name.ends_with(".json") || name.ends_with(".json.gz"))) {
                continue;
            }
            match run_once(&path, &config, args.fps) {
                Ok(res) => results.push(res),
                Err(e) => eprintln!("Failed {}: {:#}", path.display(), e),
            }
        }
    } else if let Some(log) = args.log.as_ref() {
        results.push(run_once(log, &config, args.fps)?);
    } else {
        anyhow::bail!("Provide --log or --trip-dir");
    }

    let summary = serde_json::to_string_pretty(&results)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, summary).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Summary written to {}", path.display());
        }
        None => println!("{}", summary),
    }
    Ok(())
}
