//! Turns recognized gesture events into input actions.
//!
//! The dispatcher is the boundary layer between recognition and the OS:
//! failures of the input sink are logged and counted here and never reach
//! the recognizer.

use crate::core::events::GestureEvent;
use crate::dispatch::action::Action;
use crate::dispatch::app::ProfileSelector;
use crate::dispatch::profile::ProfileResolver;
use crate::dispatch::sink::InputSink;
use crate::stats::SharedSessionStats;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not an actionable event.
    Ignored,
    /// A major event inside the cooldown window of the previous one.
    Suppressed,
    /// The active profile has no action for the event.
    Unmapped { profile: String },
    Performed { profile: String, action: Action },
    Failed {
        profile: String,
        action: Action,
        error: String,
    },
}

impl DispatchOutcome {
    pub fn action(&self) -> Option<&Action> {
        match self {
            DispatchOutcome::Performed { action, .. } | DispatchOutcome::Failed { action, .. } => {
                Some(action)
            }
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Unmapped { profile }
            | DispatchOutcome::Performed { profile, .. }
            | DispatchOutcome::Failed { profile, .. } => Some(profile),
            _ => None,
        }
    }
}

/// Resolves events under the active profile and performs them on a sink.
pub struct Dispatcher<S: InputSink> {
    resolver: ProfileResolver,
    selector: ProfileSelector,
    sink: S,
    major_cooldown: Duration,
    last_major: Option<Instant>,
    stats: SharedSessionStats,
}

impl<S: InputSink> Dispatcher<S> {
    pub fn new(
        resolver: ProfileResolver,
        selector: ProfileSelector,
        sink: S,
        major_cooldown: Duration,
        stats: SharedSessionStats,
    ) -> Self {
        info!(sink = sink.name(), "Dispatcher ready");
        Self {
            resolver,
            selector,
            sink,
            major_cooldown,
            last_major: None,
            stats,
        }
    }

    pub fn dispatch(&mut self, event: &GestureEvent, now: Instant) -> DispatchOutcome {
        if !event.kind.is_actionable() {
            return DispatchOutcome::Ignored;
        }

        let is_major = event.kind.is_major();
        if is_major && self.in_cooldown(now) {
            debug!(kind = %event.kind, "suppressed by cooldown");
            self.stats.record_action_suppressed();
            return DispatchOutcome::Suppressed;
        }

        let requested = self.selector.current(now).to_string();
        let profile = self.resolver.effective_profile(&requested).to_string();
        let Some(action) = self.resolver.resolve(&profile, event.kind).cloned() else {
            debug!(kind = %event.kind, %profile, "unmapped");
            return DispatchOutcome::Unmapped { profile };
        };

        if is_major {
            self.last_major = Some(now);
        }

        match self.perform(&action, event) {
            Ok(()) => {
                debug!(kind = %event.kind, %action, %profile, "performed");
                self.stats.record_action_performed();
                DispatchOutcome::Performed { profile, action }
            }
            Err(error) => {
                warn!(kind = %event.kind, %action, "Dispatch failed: {error}");
                self.stats.record_dispatch_failure();
                DispatchOutcome::Failed {
                    profile,
                    action,
                    error,
                }
            }
        }
    }

    fn in_cooldown(&self, now: Instant) -> bool {
        self.last_major
            .is_some_and(|at| now.saturating_duration_since(at) < self.major_cooldown)
    }

    fn perform(&mut self, action: &Action, event: &GestureEvent) -> Result<(), String> {
        let commands = action.commands(&event.payload).map_err(|e| e.to_string())?;
        for command in &commands {
            self.sink.perform(command).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn resolver(&self) -> &ProfileResolver {
        &self.resolver
    }
}
