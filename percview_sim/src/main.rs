//! PercView Scenario CLI
//!
//! Run the perception overlay against synthetic detection scenarios and
//! check what it draws.

use clap::Parser;
use percview_core::{TracingRenderer, VisualizerConfig};
use percview_env::{MapOrigin, OverlayRenderer};
use percview_sim::scenarios::ScenarioId;
use percview_sim::{run_scenario, RunConfig, ScenarioResult};
use std::ops::Range;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// PercView overlay scenario runner
#[derive(Parser, Debug)]
#[command(name = "percview-sim")]
#[command(
    about = "Run the perception overlay against synthetic detection scenarios",
    long_about = None
)]
struct Args {
    /// Seed for the detection feed (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (intersection, crowd, unknown_classes, sparse, origin_dropout, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Simulated duration in seconds
    #[arg(short, long, default_value = "5")]
    duration: f64,

    /// Visualizer config file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Map origin file (JSON)
    #[arg(long)]
    origin: Option<String>,

    /// Override the detection topic
    #[arg(long)]
    topic: Option<String>,

    /// Override the frame rate in Hz
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Frames with no map origin, as START:END (end exclusive)
    #[arg(long, value_parser = parse_dropout)]
    origin_dropout: Option<Range<u64>>,

    /// Pace frames at the tick rate instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export drawn boxes per frame to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Stream boxes to a Rerun viewer (needs the `visualization` feature)
    #[arg(long)]
    rerun: bool,
}

fn parse_dropout(s: &str) -> Result<Range<u64>, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got {}", s))?;
    let start: u64 = start.trim().parse().map_err(|e| format!("bad start frame: {}", e))?;
    let end: u64 = end.trim().parse().map_err(|e| format!("bad end frame: {}", e))?;
    if end < start {
        return Err(format!("end frame {} is before start frame {}", end, start));
    }
    Ok(start..end)
}

/// Every frame the harness checks is also drawn here: into Rerun when asked
/// for and available, otherwise into the TRACE log.
#[cfg(feature = "visualization")]
fn make_mirror(rerun: bool) -> Box<dyn OverlayRenderer> {
    if rerun {
        match percview_core::visualization::RerunRenderer::new("percview") {
            Ok(renderer) => {
                info!("Rerun visualization enabled - open Rerun Viewer to see the overlay");
                return Box::new(renderer);
            }
            Err(e) => tracing::warn!("Failed to initialize Rerun: {:?}", e),
        }
    }
    Box::new(TracingRenderer::new())
}

#[cfg(not(feature = "visualization"))]
fn make_mirror(rerun: bool) -> Box<dyn OverlayRenderer> {
    if rerun {
        info!("Rerun visualization not available (compile with --features visualization)");
    }
    Box::new(TracingRenderer::new())
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("PercView Overlay Simulator v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(scenario) => vec![scenario],
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!(
                    "Available scenarios: intersection, crowd, unknown_classes, sparse, \
                     origin_dropout, all"
                );
                std::process::exit(1);
            }
        }
    };

    if args.export.is_some() && scenarios.len() > 1 {
        eprintln!("Error: --export only supports a single scenario, not 'all'");
        std::process::exit(1);
    }

    let mut visualizer = match &args.config {
        Some(path) => VisualizerConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error: failed to load config {}: {}", path, e);
            std::process::exit(1);
        }),
        None => VisualizerConfig::default(),
    };
    if let Some(topic) = &args.topic {
        visualizer.topic = topic.clone();
    }
    if let Some(rate) = args.tick_rate {
        visualizer.tick_rate_hz = rate;
    }

    let origin = args.origin.as_ref().map(|path| {
        MapOrigin::load(path).unwrap_or_else(|e| {
            eprintln!("Error: failed to load origin {}: {}", path, e);
            std::process::exit(1);
        })
    });

    // Determine seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for scenario in &scenarios {
        let mut config = RunConfig::new(*scenario, seed).with_duration(args.duration);
        config.visualizer = visualizer.clone();
        if let Some(origin) = &origin {
            config.origin = origin.clone();
        }
        if let Some(window) = &args.origin_dropout {
            config.dropout = Some(window.clone());
        }
        config.realtime = args.realtime;
        config.export = args.export.is_some();

        let result = match runtime.block_on(run_scenario(config, Some(make_mirror(args.rerun)))) {
            Ok(result) => result,
            Err(e) => {
                error!("✗ {} (seed={}) ERROR: {}", scenario.name(), seed, e);
                std::process::exit(2);
            }
        };

        if !args.json {
            if result.passed {
                info!(
                    "✓ {} (seed={}) PASSED | peak={} drawn={} aborted={}",
                    scenario.name(),
                    seed,
                    result.metrics.peak_tracked.unwrap_or(0),
                    result.metrics.boxes_drawn,
                    result.metrics.frames_aborted
                );
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    scenario.name(),
                    seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        if let (Some(path), Some(export)) = (&args.export, &result.export) {
            if let Err(e) = export.write_to_file(path) {
                error!("Failed to write export: {:?}", e);
            } else {
                info!("Exported {} frames to {}", export.frames.len(), path);
            }
        }

        if !result.passed {
            failed_count += 1;
        }
        all_results.push(result);
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "frames": r.total_frames,
                    "metrics": r.metrics,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: failed to encode summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
