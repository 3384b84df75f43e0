//! Demonstration of HandBridge gesture recognition without a camera.
//!
//! This example shows how to:
//! 1. Build a recognizer and a dispatcher with a logging sink
//! 2. Drive them with synthetic hand poses
//! 3. Inspect the input commands each gesture produces
//!
//! Run with: cargo run --example synthetic_demo [-- frames.jsonl]
//!
//! When a path is given, the generated landmark stream is also written
//! there as JSON lines, ready for `handbridge start --input frames.jsonl`.

use std::time::{Duration, Instant};

use handbridge::{
    config::GestureConfig,
    core::{GestureRecognizer, HandPose, MappingRegion, ScreenMapper, SyntheticHand},
    dispatch::{DispatchOutcome, Dispatcher, LogSink, ProfileResolver, ProfileSelector, ProfileTable},
    source::FrameRecord,
    stats::create_shared_stats,
    GESTURE_GUIDE,
};

const TICK: Duration = Duration::from_millis(33);

/// One scripted segment: a pose held at a position for a number of ticks,
/// optionally drifting every tick.
struct Segment {
    pose: Option<HandPose>,
    ticks: u32,
    drift: (f64, f64),
}

fn hold(pose: HandPose, ticks: u32) -> Segment {
    Segment {
        pose: Some(pose),
        ticks,
        drift: (0.0, 0.0),
    }
}

fn drift(pose: HandPose, ticks: u32, dx: f64, dy: f64) -> Segment {
    Segment {
        pose: Some(pose),
        ticks,
        drift: (dx, dy),
    }
}

fn absent(ticks: u32) -> Segment {
    Segment {
        pose: None,
        ticks,
        drift: (0.0, 0.0),
    }
}

fn script() -> Vec<(&'static str, Vec<Segment>)> {
    vec![
        (
            "Point and move",
            vec![drift(HandPose::Pointing, 15, 0.01, 0.005), absent(10)],
        ),
        (
            "Click",
            vec![
                hold(HandPose::PinchReleased, 3),
                hold(HandPose::PinchClosed, 2),
                hold(HandPose::PinchReleased, 16),
                absent(10),
            ],
        ),
        (
            "Click from an open hand",
            vec![
                hold(HandPose::Open, 12),
                hold(HandPose::OkSign, 2),
                hold(HandPose::Open, 16),
                absent(10),
            ],
        ),
        (
            "Double click",
            vec![
                hold(HandPose::PinchReleased, 3),
                hold(HandPose::PinchClosed, 2),
                hold(HandPose::PinchReleased, 3),
                hold(HandPose::PinchClosed, 2),
                hold(HandPose::PinchReleased, 3),
                absent(10),
            ],
        ),
        (
            "Drag",
            vec![
                hold(HandPose::PinchReleased, 3),
                hold(HandPose::PinchClosed, 9),
                drift(HandPose::PinchClosed, 10, 0.01, 0.0),
                hold(HandPose::PinchReleased, 3),
                absent(10),
            ],
        ),
        (
            "Scroll",
            vec![
                hold(HandPose::MiddleOnly, 12),
                drift(HandPose::MiddleOnly, 5, 0.0, -0.01),
                drift(HandPose::MiddleOnly, 5, 0.0, 0.01),
                absent(10),
            ],
        ),
        (
            "Swipe right",
            vec![
                hold(HandPose::Open, 12),
                drift(HandPose::Open, 6, 0.03, 0.0),
                absent(10),
            ],
        ),
        (
            "Fist to open",
            vec![hold(HandPose::Fist, 12), hold(HandPose::Open, 3), absent(10)],
        ),
    ]
}

fn main() {
    println!("HandBridge - Synthetic Demo");
    println!("===========================");
    println!("{GESTURE_GUIDE}");

    let mapper = ScreenMapper::new(MappingRegion::default(), 1920, 1080, true);
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), mapper);
    let stats = create_shared_stats();
    let mut dispatcher = Dispatcher::new(
        ProfileResolver::new(ProfileTable::builtin()),
        ProfileSelector::fixed("default"),
        LogSink::with_screen_size(1920, 1080),
        Duration::from_millis(500),
        stats.clone(),
    );

    let start = Instant::now();
    let mut now = start;
    let mut stream = Vec::new();

    for (label, segments) in script() {
        println!("--- {label} ---");
        let mut hand = SyntheticHand::at(0.45, 0.6);

        for segment in segments {
            for _ in 0..segment.ticks {
                now += TICK;
                hand = hand.moved(segment.drift.0, segment.drift.1);
                let frame = segment.pose.map(|pose| hand.pose(pose));

                let t = now.duration_since(start).as_secs_f64();
                stream.push(match &frame {
                    Some(frame) => FrameRecord::from_frame(t, frame),
                    None => FrameRecord::absent(t),
                });

                stats.record_frame(frame.is_some());
                let event = recognizer.step(frame.as_ref(), now);
                if !event.kind.is_actionable() {
                    continue;
                }
                stats.record_event();
                let shown = event.to_string();

                match dispatcher.dispatch(&event, now) {
                    DispatchOutcome::Performed { action, .. } => {
                        let commands = dispatcher.sink_mut().take_performed();
                        println!("  {shown:<28} -> {action} {commands:?}");
                    }
                    DispatchOutcome::Unmapped { profile } => {
                        println!("  {shown:<28} -> (unmapped in {profile})");
                    }
                    other => println!("  {shown:<28} -> {other:?}"),
                }
            }
        }
        println!();
    }

    println!("{}", stats.summary());

    if let Some(path) = std::env::args().nth(1) {
        let lines: Vec<String> = stream
            .iter()
            .filter_map(|record| serde_json::to_string(record).ok())
            .collect();
        match std::fs::write(&path, lines.join("\n") + "\n") {
            Ok(()) => println!("Landmark stream written to {path}"),
            Err(e) => eprintln!("Error writing {path}: {e}"),
        }
    }
}
