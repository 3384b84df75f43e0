//! Landmark sources for HandBridge.
//!
//! Camera capture and hand-landmark extraction happen outside this crate.
//! This module receives their output as JSON-lines [`FrameRecord`]s, stamps
//! each frame on the monotonic clock, and hands it to the recognizer through
//! a small drop-oldest queue.

pub mod queue;
pub mod replay;
pub mod types;

// Re-export commonly used types
pub use queue::FrameQueue;
pub use replay::{ReplayConfig, ReplayInput, ReplaySource};
pub use types::{FrameRecord, FrameSample, SourceError};
