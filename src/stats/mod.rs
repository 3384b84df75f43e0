//! Session statistics for HandBridge.

pub mod session;

// Re-export commonly used types
pub use session::{
    create_shared_stats, create_shared_stats_with_persistence, SessionStats, SharedSessionStats,
    StatsSnapshot,
};
