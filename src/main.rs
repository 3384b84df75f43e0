//! HandBridge CLI
//!
//! Hand-gesture control for the desktop, driven by a hand-landmark stream.

use chrono::Local;
use clap::{Parser, Subcommand};
use handbridge::{
    config::{Config, FALLBACK_SCREEN_SIZE},
    core::{GestureEvent, GestureRecognizer, ScreenMapper},
    dispatch::{
        native_app_detector, native_sink, DispatchOutcome, Dispatcher, InputSink, LogSink,
        ProfileResolver, ProfileSelector, ProfileTable,
    },
    record::SessionRecorder,
    source::{ReplayConfig, ReplayInput, ReplaySource},
    stats::create_shared_stats_with_persistence,
    GESTURE_GUIDE, VERSION,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "handbridge")]
#[command(version = VERSION)]
#[command(about = "Hand-gesture control for the desktop", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start recognizing gestures from a landmark stream
    Start {
        /// JSON-lines landmark stream, or `-` for stdin
        #[arg(long, default_value = "-")]
        input: String,

        /// Use this profile instead of following the foreground application
        #[arg(long)]
        profile: Option<String>,

        /// Log actions instead of injecting input
        #[arg(long)]
        dry_run: bool,

        /// Record dispatched gestures to the export directory
        #[arg(long)]
        record: bool,

        /// Replay recorded frames at their original pace
        #[arg(long)]
        realtime: bool,
    },

    /// Pause gesture recognition
    Pause,

    /// Resume gesture recognition
    Resume,

    /// Show current status
    Status,

    /// List gesture profiles and their mappings
    Profiles,

    /// Show the gesture guide
    Gestures,

    /// Show configuration
    Config,

    /// Serve the recognizer over HTTP for an out-of-process tracker
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on (0 for random)
        #[arg(long, default_value = "8787")]
        port: u16,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            input,
            profile,
            dry_run,
            record,
            realtime,
        } => {
            cmd_start(&input, profile, dry_run, record, realtime);
        }
        Commands::Pause => {
            cmd_pause();
        }
        Commands::Resume => {
            cmd_resume();
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Profiles => {
            cmd_profiles();
        }
        Commands::Gestures => {
            println!("{GESTURE_GUIDE}");
        }
        Commands::Config => {
            cmd_config();
        }
        #[cfg(feature = "server")]
        Commands::Serve { port } => {
            cmd_serve(port);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handbridge=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load the configuration or exit; invalid thresholds are fatal.
fn load_config_or_exit() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Fix or remove {:?}", Config::config_path());
            std::process::exit(1);
        }
    }
}

fn load_profiles_or_exit(config: &Config) -> ProfileTable {
    match ProfileTable::load_or_builtin(&config.mappings_path) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error loading {:?}: {e}", config.mappings_path);
            std::process::exit(1);
        }
    }
}

fn cmd_start(input: &str, profile: Option<String>, dry_run: bool, record: bool, realtime: bool) {
    println!("HandBridge v{VERSION}");
    println!();

    let config = load_config_or_exit();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }
    let table = load_profiles_or_exit(&config);

    let sink: Box<dyn InputSink> = if dry_run {
        Box::new(LogSink::new())
    } else {
        match native_sink() {
            Some(sink) => sink,
            None => {
                eprintln!("Warning: Input injection is not supported on this platform.");
                eprintln!("Running as a dry run.");
                Box::new(LogSink::new())
            }
        }
    };

    let (width, height) = config
        .screen_size
        .or_else(|| sink.screen_size())
        .unwrap_or(FALLBACK_SCREEN_SIZE);
    let mapper = ScreenMapper::new(config.mapping_region, width, height, config.clamp_to_screen);
    let mut recognizer = GestureRecognizer::new(config.gesture.clone(), mapper);

    let selector = match profile {
        Some(ref id) => {
            if !table.contains(id) {
                eprintln!("Warning: Unknown profile '{id}', actions fall back to 'default'");
            }
            ProfileSelector::fixed(id)
        }
        None => ProfileSelector::auto(
            native_app_detector(),
            config.app_profiles.clone(),
            config.profile_refresh_interval,
        ),
    };

    println!("Starting recognition...");
    println!(
        "  Input: {}",
        if input == "-" { "stdin" } else { input }
    );
    println!("  Screen: {width}x{height}");
    println!("  Output: {}", sink.name());
    println!(
        "  Profile: {}",
        profile.as_deref().unwrap_or("automatic (foreground application)")
    );
    println!("  Recording: {}", if record { "enabled" } else { "disabled" });
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let stats = create_shared_stats_with_persistence(config.data_path.join("stats.json"));
    let mut dispatcher = Dispatcher::new(
        ProfileResolver::new(table),
        selector,
        sink,
        config.major_event_cooldown,
        stats.clone(),
    );
    let mut recorder = record.then(SessionRecorder::new);

    let mut source = ReplaySource::new(ReplayConfig {
        input: ReplayInput::from_arg(input),
        realtime,
        queue_capacity: config.frame_queue_capacity,
        ..ReplayConfig::default()
    });
    if let Err(e) = source.start() {
        eprintln!("Error starting landmark source: {e}");
        std::process::exit(1);
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    // Support pause/resume from another process by polling the config file.
    let mut paused = config.paused;
    let mut last_config_check = Instant::now();
    if paused {
        println!("Recognition is currently paused.");
        println!("Run `handbridge resume` to continue.");
        println!();
    }

    let mut handle_event = |event: GestureEvent, at: Instant| {
        if event.kind.is_actionable() {
            stats.record_event();
        }
        let outcome = dispatcher.dispatch(&event, at);
        if event.kind.is_actionable() {
            print_event(&event, &outcome);
        }
        if let Some(ref mut recorder) = recorder {
            recorder.record(&event, &outcome);
        }
    };

    let receiver = source.receiver().clone();

    while running.load(Ordering::SeqCst) {
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            if let Ok(cfg) = Config::load() {
                if cfg.paused != paused {
                    paused = cfg.paused;
                    println!();
                    if paused {
                        println!("Pausing recognition...");
                        // Release anything held, such as a drag.
                        let (event, at) = recognizer.release_hand(Instant::now());
                        handle_event(event, at);
                    } else {
                        println!("Resuming recognition...");
                    }
                }
            }
            last_config_check = Instant::now();
        }

        if paused {
            // Frames that arrive while paused are discarded.
            while receiver.try_recv().is_ok() {}
            if !source.is_running() && receiver.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(sample) => {
                stats.record_frame(sample.frame.is_some());
                let event = recognizer.step(sample.frame.as_ref(), sample.captured_at);
                handle_event(event, sample.captured_at);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                println!();
                println!("Landmark stream ended.");
                break;
            }
        }
    }

    println!();
    println!("Stopping recognition...");
    source.stop();
    stats.record_frames_dropped(source.dropped_frames());

    let (event, at) = recognizer.release_hand(Instant::now());
    handle_event(event, at);

    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save session stats: {e}");
    }

    if let Some(recorder) = recorder {
        if recorder.is_empty() {
            println!("No gestures recorded.");
        } else {
            let export = recorder.finish();
            match export.write_to(&config.export_path) {
                Ok(path) => println!("Recorded {} gestures to {:?}", export.events.len(), path),
                Err(e) => eprintln!("Error writing recording: {e}"),
            }
        }
    }

    // Final stats
    println!();
    println!("{}", stats.summary());
}

fn print_event(event: &GestureEvent, outcome: &DispatchOutcome) {
    let detail = match outcome {
        DispatchOutcome::Performed { profile, action } => format!("{action} [{profile}]"),
        DispatchOutcome::Unmapped { profile } => format!("unmapped [{profile}]"),
        DispatchOutcome::Suppressed => "suppressed (cooldown)".to_string(),
        DispatchOutcome::Failed { error, .. } => format!("failed: {error}"),
        DispatchOutcome::Ignored => return,
    };
    println!("[{}] {event} -> {detail}", Local::now().format("%H:%M:%S"));
}

fn cmd_pause() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = true;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Recognition paused. Use 'handbridge resume' to continue.");
}

fn cmd_resume() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = false;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Recognition resumed.");
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("HandBridge Status");
    println!("=================");
    println!();

    println!(
        "Input injection: {}",
        match native_sink() {
            Some(sink) => format!("available ({})", sink.name()),
            None => "not supported on this platform".to_string(),
        }
    );
    println!();

    println!("Configuration:");
    println!("  Paused: {}", config.paused);
    println!(
        "  Mapping file: {:?}{}",
        config.mappings_path,
        if config.mappings_path.exists() {
            ""
        } else {
            " (missing, using built-in profiles)"
        }
    );
    match config.screen_size {
        Some((w, h)) => println!("  Screen size: {w}x{h}"),
        None => println!("  Screen size: detected"),
    }
    println!();

    let stats_path = config.data_path.join("stats.json");
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                for (key, label) in [
                    ("frames_processed", "Frames processed"),
                    ("events_recognized", "Gestures recognized"),
                    ("actions_performed", "Actions performed"),
                    ("dispatch_failures", "Dispatch failures"),
                ] {
                    if let Some(value) = stats.get(key) {
                        println!("  {label}: {value}");
                    }
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_profiles() {
    let config = load_config_or_exit();
    let table = load_profiles_or_exit(&config);

    for profile in table.profiles() {
        println!("{} ({})", profile.display_name, profile.id);
        for (kind, action) in &profile.mappings {
            println!("  {:<22} {}", kind.as_str(), action);
        }
        println!();
    }

    println!("Applications:");
    let mut apps: Vec<_> = config.app_profiles.iter().collect();
    apps.sort();
    for (app, profile) in apps {
        println!("  {app:<22} {profile}");
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

#[cfg(feature = "server")]
fn cmd_serve(port: u16) {
    use handbridge::server::{run, ServerConfig};

    let config = load_config_or_exit();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        let (addr, shutdown_tx) = match run(ServerConfig::new(port, config)).await {
            Ok(started) => started,
            Err(e) => {
                eprintln!("Error starting server: {e}");
                std::process::exit(1);
            }
        };
        println!("Listening on http://{addr}");
        println!("Press Ctrl+C to stop");

        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Warning: Could not set Ctrl+C handler: {e}");
    }
}
