//! Action dispatch for HandBridge.
//!
//! This module maps gesture events to actions through per-application
//! profiles and performs them on a platform input sink.

pub mod action;
pub mod app;
pub mod dispatcher;
pub mod profile;
pub mod sink;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

// Re-export commonly used types
pub use action::{Action, ActionError, ActionParseError, InputCommand, Key, MouseButton};
pub use app::{AppDetector, NoopAppDetector, ProfileSelector};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use profile::{Profile, ProfileError, ProfileResolver, ProfileTable, DEFAULT_PROFILE};
pub use sink::{InputSink, LogSink, SinkError};

#[cfg(target_os = "macos")]
pub use macos::MacSink;

#[cfg(target_os = "windows")]
pub use windows::{WindowsAppDetector, WindowsSink};

/// The input sink for this platform, or `None` where injection is unsupported.
#[cfg(target_os = "macos")]
pub fn native_sink() -> Option<Box<dyn InputSink>> {
    Some(Box::new(MacSink::new()))
}

#[cfg(target_os = "windows")]
pub fn native_sink() -> Option<Box<dyn InputSink>> {
    Some(Box::new(WindowsSink::new()))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn native_sink() -> Option<Box<dyn InputSink>> {
    None
}

/// The foreground application detector for this platform.
#[cfg(target_os = "windows")]
pub fn native_app_detector() -> Box<dyn AppDetector> {
    Box::new(WindowsAppDetector)
}

#[cfg(not(target_os = "windows"))]
pub fn native_app_detector() -> Box<dyn AppDetector> {
    Box::new(NoopAppDetector)
}
