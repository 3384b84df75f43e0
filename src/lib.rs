//! HandBridge - hand-landmark gesture recognition and input dispatch.
//!
//! This library turns a stream of hand-landmark frames (21 normalized points
//! per frame, as produced by common hand trackers) into discrete input
//! events such as click, drag, scroll and swipe, and dispatches them to the
//! operating system according to a per-application profile.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            HandBridge                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐             │
//! │  │  Landmark   │──▶│  Geometry   │──▶│   Gesture   │             │
//! │  │   Source    │   │  + Posture  │   │ Recognizer  │             │
//! │  └─────────────┘   └─────────────┘   └─────────────┘             │
//! │         │                                    │ (event, payload)  │
//! │         ▼                                    ▼                   │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐             │
//! │  │  Session    │◀──│  Profile    │◀──│ Dispatcher  │──▶ Input    │
//! │  │   Stats     │   │  Resolver   │   │             │    Sink     │
//! │  └─────────────┘   └─────────────┘   └─────────────┘             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The recognizer is a pure function of landmark geometry and time; it never
//! touches the OS. Everything side-effecting lives behind the dispatcher.
//!
//! # Example
//!
//! ```no_run
//! use handbridge::config::GestureConfig;
//! use handbridge::core::{GestureRecognizer, HandPose, MappingRegion, ScreenMapper, SyntheticHand};
//! use std::time::Instant;
//!
//! let mapper = ScreenMapper::new(MappingRegion::default(), 1920, 1080, true);
//! let mut recognizer = GestureRecognizer::new(GestureConfig::default(), mapper);
//!
//! let frame = SyntheticHand::at(0.5, 0.5).pose(HandPose::Pointing);
//! let event = recognizer.step(Some(&frame), Instant::now());
//! println!("{event}");
//! ```

pub mod config;
pub mod core;
pub mod dispatch;
pub mod record;
pub mod source;
pub mod stats;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, GestureConfig};
pub use core::{
    GestureEvent, GestureKind, GestureRecognizer, GestureState, Landmark, LandmarkFrame, Payload,
    ScreenMapper,
};
pub use dispatch::{
    Action, DispatchOutcome, Dispatcher, InputCommand, InputSink, LogSink, ProfileResolver,
    ProfileSelector, ProfileTable,
};
pub use record::{EventRecord, SessionExport, SessionRecorder};
pub use source::{FrameRecord, FrameSample, ReplayConfig, ReplayInput, ReplaySource};
pub use stats::{SessionStats, SharedSessionStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quick reference of the recognized gestures.
pub const GESTURE_GUIDE: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                    HANDBRIDGE - GESTURE GUIDE                    ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  POINTER                                                         ║
║    • Point with the index finger         → MOUSE_MOVE            ║
║                                                                  ║
║  PINCH (thumb tip to index tip)                                  ║
║    • Pinch and release quickly           → LEFT_CLICK            ║
║    • Two quick pinches                   → DOUBLE_CLICK          ║
║    • Pinch and hold, then move           → DRAG_START, DRAGGING  ║
║    • Release the pinch                   → DRAG_DROP             ║
║                                                                  ║
║  SCROLL                                                          ║
║    • Middle finger only, or thumbs up,                           ║
║      then move the hand up or down       → SCROLL_UP/DOWN        ║
║                                                                  ║
║  SWIPE                                                           ║
║    • Open hand, flick left/right/up/down → SWIPE_*               ║
║                                                                  ║
║  POSTURE                                                         ║
║    • Hold a fist, then open the hand     → FIST_TO_OPEN          ║
║    • Hold an open hand, then close it    → OPEN_TO_FIST          ║
║                                                                  ║
║  What each gesture does depends on the active profile:           ║
║    handbridge profiles                                           ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
