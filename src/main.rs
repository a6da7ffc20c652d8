//! PostureGuard CLI
//!
//! Usage:
//!   postureguard                                  # Desktop monitor, camera 0 (fallback 1)
//!   postureguard --serve                          # Web dashboard on 0.0.0.0:5000
//!   postureguard --source synthetic --landmarks trace.jsonl
//!   postureguard --json                           # JSON-lines frame reports

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use postureguard::core::mjpeg::encode_jpeg;
use postureguard::core::{
    open_source, open_with_fallback, run_server, Annotator, Beeper, FrameSource, LandmarkProvider,
    Monitor, NullProvider, ReplayProvider, SilentBeeper, SourceSpec, TerminalBell,
};
use postureguard::types::{cooldown_from_secs, PosturePolicy, Profile};
use postureguard::{Result, DEFAULT_ADDR, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "postureguard",
    version = VERSION,
    about = "PostureGuard - real-time slouch and lean alerts from webcam pose landmarks",
    long_about = "PostureGuard watches a camera, classifies posture from the shoulder-to-ear\n\
                  angle and shoulder tilt, and beeps (at most every 2s) while posture is bad.\n\n\
                  Modes:\n  \
                  (default)  Desktop monitor: status line in the terminal, 70-140° window\n  \
                  --serve    Web dashboard: MJPEG feed + /stats, 75-135° window + lean check\n\n\
                  Type q and Enter to quit the desktop monitor."
)]
struct Args {
    /// Run the web dashboard instead of the desktop monitor
    #[arg(short, long)]
    serve: bool,

    /// Dashboard bind address
    #[arg(long, default_value = DEFAULT_ADDR)]
    addr: String,

    /// Frame source: camera:<index>, synthetic[:WxH] or dir:<path>
    #[arg(long, default_value = "camera:0")]
    source: SourceSpec,

    /// Tried once if the primary source fails to open
    #[arg(long, default_value = "camera:1")]
    fallback_source: SourceSpec,

    /// Landmark trace to replay (JSON lines, 33 landmarks or null per frame)
    #[arg(short, long)]
    landmarks: Option<PathBuf>,

    /// Restart the landmark trace when it runs out
    #[arg(long)]
    loop_trace: bool,

    /// Frame rate for synthetic and directory sources
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Disable the alert tone
    #[arg(long)]
    mute: bool,

    /// Desktop monitor: write the annotated frame to this JPEG after every frame
    #[arg(long)]
    preview: Option<PathBuf>,

    /// TrueType font for the frame overlay text (default: first system font found)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Override the lower angle bound (degrees)
    #[arg(long, value_parser = parse_angle)]
    angle_low: Option<f64>,

    /// Override the upper angle bound (degrees)
    #[arg(long, value_parser = parse_angle)]
    angle_high: Option<f64>,

    /// Override the lean bound (fraction of shoulder width)
    #[arg(long, conflicts_with = "no_lean", value_parser = parse_lean_ratio)]
    lean_ratio: Option<f64>,

    /// Disable the lean check
    #[arg(long)]
    no_lean: bool,

    /// Override the minimum gap between beeps (seconds)
    #[arg(long, value_parser = parse_cooldown)]
    cooldown_secs: Option<Duration>,

    /// Output JSON lines instead of status text
    #[arg(long)]
    json: bool,

    /// Print every frame, not only status changes
    #[arg(long)]
    verbose: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Log filter (tracing EnvFilter syntax)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    let result = if args.serve {
        run_serve(&args).await
    } else {
        run_desktop(&args)
    };

    if let Err(e) = result {
        error!(error = %e, "postureguard stopped");
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn parse_number(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{s} is not a finite number"))
    }
}

fn parse_angle(s: &str) -> std::result::Result<f64, String> {
    let angle = parse_number(s)?;
    if (0.0..=180.0).contains(&angle) {
        Ok(angle)
    } else {
        Err(format!("{angle} is outside 0-180 degrees"))
    }
}

fn parse_lean_ratio(s: &str) -> std::result::Result<f64, String> {
    let ratio = parse_number(s)?;
    if ratio >= 0.0 {
        Ok(ratio)
    } else {
        Err(format!("{ratio} is negative"))
    }
}

fn parse_cooldown(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{e}"))?;
    cooldown_from_secs(secs).map_err(|e| e.to_string())
}

/// Base profile for the mode, with command-line overrides applied
fn build_profile(args: &Args) -> Result<Profile> {
    let base = if args.serve { Profile::web() } else { Profile::desktop() };

    let mut policy: PosturePolicy = base.policy;
    if let Some(low) = args.angle_low {
        policy.angle_low = low;
    }
    if let Some(high) = args.angle_high {
        policy.angle_high = high;
    }
    if let Some(ratio) = args.lean_ratio {
        policy.lean_ratio = Some(ratio);
    }
    if args.no_lean {
        policy.lean_ratio = None;
    }
    policy.validate()?;

    let mut profile = base.with_policy(policy);
    if let Some(cooldown) = args.cooldown_secs {
        profile = profile.with_cooldown(cooldown);
    }
    Ok(profile)
}

type BoxedMonitor = Monitor<
    Box<dyn FrameSource + Send>,
    Box<dyn LandmarkProvider + Send>,
    Box<dyn Beeper + Send>,
>;

fn build_monitor(args: &Args, profile: Profile) -> Result<BoxedMonitor> {
    let source = open_with_fallback(&args.source, &args.fallback_source, |spec| open_source(spec, args.fps))?;

    let provider: Box<dyn LandmarkProvider + Send> = match &args.landmarks {
        Some(path) => Box::new(ReplayProvider::open(path)?.looping(args.loop_trace)),
        None => {
            warn!("no landmark provider configured (--landmarks); every frame will report no person");
            Box::new(NullProvider)
        }
    };

    let beeper: Box<dyn Beeper + Send> = if args.mute {
        Box::new(SilentBeeper)
    } else if let Some(tone) = tone_beeper() {
        tone
    } else if args.json {
        // keep stdout clean JSON lines
        Box::new(TerminalBell::new(io::stderr()))
    } else {
        Box::new(TerminalBell::stdout())
    };

    let annotator = match &args.font {
        Some(path) => Annotator::load(path)?,
        None => Annotator::discover(),
    };

    info!(
        profile = profile.name,
        angle_low = profile.policy.angle_low,
        angle_high = profile.policy.angle_high,
        lean_ratio = ?profile.policy.lean_ratio,
        cooldown_ms = profile.cooldown.as_millis() as u64,
        "posture policy"
    );
    Ok(Monitor::new(source, provider, beeper, profile).with_annotator(annotator))
}

#[cfg(feature = "audio")]
fn tone_beeper() -> Option<Box<dyn Beeper + Send>> {
    match postureguard::core::ToneBeeper::open() {
        Ok(beeper) => Some(Box::new(beeper)),
        Err(e) => {
            warn!(error = %e, "no audio output, falling back to terminal bell");
            None
        }
    }
}

#[cfg(not(feature = "audio"))]
fn tone_beeper() -> Option<Box<dyn Beeper + Send>> {
    None
}

/// Desktop monitor: terminal status line, optional JPEG preview
fn run_desktop(args: &Args) -> Result<()> {
    let profile = build_profile(args)?;
    let style = profile.style;
    let mut monitor = build_monitor(args, profile)?;

    if !args.json {
        print_header("Desktop Monitor", args.no_color);
        println!("Type q and press Enter to quit.");
        println!();
    }

    let stop = Arc::new(AtomicBool::new(false));
    spawn_quit_listener(stop.clone());

    let mut last_status = String::new();
    monitor.run(&stop, args.max_frames, |frame| {
        if let (Some(path), Some(image)) = (&args.preview, &frame.image) {
            std::fs::write(path, encode_jpeg(image)?)?;
        }

        let report = &frame.report;
        if args.json {
            println!("{}", serde_json::to_string(report).unwrap_or_default());
        } else if args.verbose || report.stats.status != last_status {
            if args.no_color {
                println!("{}", report.to_parseable_string(style));
            } else {
                println!("{}", report.to_terminal_string(style));
            }
        }
        last_status.clone_from(&report.stats.status);
        Ok(())
    })?;

    if !args.json {
        println!();
        println!("Session ended. Frames: {}", monitor.session().frames());
    }
    Ok(())
}

/// Set `stop` when the user types q / quit / exit
fn spawn_quit_listener(stop: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.eq_ignore_ascii_case("q")
                || line.eq_ignore_ascii_case("quit")
                || line.eq_ignore_ascii_case("exit")
            {
                stop.store(true, Ordering::SeqCst);
                break;
            }
        }
    });
}

/// Web dashboard
async fn run_serve(args: &Args) -> Result<()> {
    let profile = build_profile(args)?;
    let monitor = build_monitor(args, profile)?;

    print_header("Web Dashboard", args.no_color);
    println!("Open http://{} in a browser. Ctrl-C to stop.", args.addr);
    println!();

    run_server(&args.addr, monitor, args.max_frames).await
}

fn print_header(mode: &str, no_color: bool) {
    let title = format!("PostureGuard v{} - {}", VERSION, mode);
    let rule = "=".repeat(title.len() + 4);
    if no_color {
        println!("{}", rule);
        println!("  {}", title);
        println!("{}", rule);
    } else {
        println!("{}", rule.cyan());
        println!("  {}", title.bold());
        println!("{}", rule.cyan());
    }
    println!();
}
