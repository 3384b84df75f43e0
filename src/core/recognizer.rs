//! The gesture state machine.
//!
//! One [`GestureRecognizer::step`] per landmark frame. Each tick runs the
//! handlers below in priority order; the first one that claims the tick
//! produces its event and suppresses everything beneath it:
//!
//! ```text
//!   hand absent ─▶ DRAG_DROP | NONE, full reset
//!   posture     ─▶ FIST_STEADY / OPEN_HAND_STEADY, FIST_TO_OPEN, OPEN_TO_FIST
//!   swipe       ─▶ SWIPE_PENDING, SWIPE_{LEFT,RIGHT,UP,DOWN}
//!   pointer     ─▶ MOUSE_MOVING, MOUSE_MOVE
//!   pinch       ─▶ PINCH_DETECTED, POSSIBLE_DOUBLE_CLICK, DRAGGING,
//!                  LEFT_CLICK, DOUBLE_CLICK, DRAG_START, DRAGGING, DRAG_DROP
//!   scroll      ─▶ SCROLL_MODE / THUMBS_UP_SCROLL, SCROLL_UP/DOWN, SCROLL_MODE_ENGAGED
//! ```
//!
//! Every handler matches on the current state exhaustively. The recognizer
//! never blocks and never talks to the OS; timestamps come from the caller
//! and must be non-decreasing.

use crate::config::GestureConfig;
use crate::core::events::{GestureEvent, GestureKind, SwipeDirection};
use crate::core::filters::{ExponentialSmoother, MotionHistory};
use crate::core::geometry::{
    hand_scale, pinch_distance_2d, pinch_midpoint, wrist_delta, ScreenMapper, ScreenPoint,
    MIN_HAND_SCALE,
};
use crate::core::landmarks::{Landmark, LandmarkFrame, INDEX_TIP, MIDDLE_TIP};
use crate::core::posture::{HandPosture, ScrollVariant, SteadyPosture};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Averaged swipe components closer than this are a tie and never fire.
const SWIPE_TIE_EPSILON: f64 = 1e-3;

/// The recognizer's current mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureState {
    Idle,
    PinchDetected,
    PossibleDoubleClick,
    Dragging,
    FistSteady,
    OpenHandSteady,
    MouseMoving,
    ScrollMode,
    ThumbsUpScroll,
    SwipePending,
}

impl GestureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureState::Idle => "IDLE",
            GestureState::PinchDetected => "PINCH_DETECTED",
            GestureState::PossibleDoubleClick => "POSSIBLE_DOUBLE_CLICK",
            GestureState::Dragging => "DRAGGING",
            GestureState::FistSteady => "FIST_STEADY",
            GestureState::OpenHandSteady => "OPEN_HAND_STEADY",
            GestureState::MouseMoving => "MOUSE_MOVING",
            GestureState::ScrollMode => "SCROLL_MODE",
            GestureState::ThumbsUpScroll => "THUMBS_UP_SCROLL",
            GestureState::SwipePending => "SWIPE_PENDING",
        }
    }

    fn for_steady(posture: SteadyPosture) -> Self {
        match posture {
            SteadyPosture::Fist => GestureState::FistSteady,
            SteadyPosture::Open => GestureState::OpenHandSteady,
        }
    }

    fn for_scroll(variant: ScrollVariant) -> Self {
        match variant {
            ScrollVariant::MiddleFinger => GestureState::ScrollMode,
            ScrollVariant::ThumbsUp => GestureState::ThumbsUpScroll,
        }
    }
}

impl std::fmt::Display for GestureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pinch measurements for one frame, present only when the hand scale is usable.
#[derive(Debug, Clone, Copy)]
struct PinchReading {
    distance: f64,
    close_threshold: f64,
    open_threshold: f64,
    midpoint: (f64, f64),
}

impl PinchReading {
    fn physically_closed(&self) -> bool {
        self.distance < self.close_threshold
    }

    fn clearly_open(&self) -> bool {
        self.distance > self.open_threshold
    }
}

/// Everything the handlers need from the current frame.
#[derive(Debug, Clone, Copy)]
struct Observation {
    posture: HandPosture,
    pinch: Option<PinchReading>,
    index_tip: (f64, f64),
    middle_tip_y: f64,
    wrist_y: f64,
    /// Wrist movement since the previous tick's frame.
    wrist_delta: Option<(f64, f64)>,
}

impl Observation {
    fn new(frame: &LandmarkFrame, previous: Option<&LandmarkFrame>, config: &GestureConfig) -> Self {
        let scale = hand_scale(frame);
        let reliable = scale.is_finite() && scale >= MIN_HAND_SCALE;

        // A collapsed hand says nothing about posture either.
        let posture = if reliable {
            HandPosture::classify(frame, config.finger_curl_tolerance, config.fist_radius)
        } else {
            HandPosture::default()
        };

        let pinch = reliable.then(|| PinchReading {
            distance: pinch_distance_2d(frame),
            close_threshold: scale * config.pinch_close_ratio,
            open_threshold: scale * config.pinch_open_ratio,
            midpoint: pinch_midpoint(frame),
        });

        Self {
            posture,
            pinch,
            index_tip: frame.point(INDEX_TIP).xy(),
            middle_tip_y: frame.point(MIDDLE_TIP).y,
            wrist_y: frame.wrist().y,
            wrist_delta: previous.map(|prev| wrist_delta(prev, frame)),
        }
    }

    fn steady_posture(&self) -> Option<SteadyPosture> {
        let pinch_closed = self.pinch.is_some_and(|p| p.physically_closed());
        self.posture.steady(pinch_closed)
    }

    fn scroll_axis(&self, variant: ScrollVariant) -> f64 {
        match variant {
            ScrollVariant::MiddleFinger => self.middle_tip_y,
            ScrollVariant::ThumbsUp => self.wrist_y,
        }
    }
}

/// Converts a stream of landmark frames into discrete gesture events.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    mapper: ScreenMapper,

    state: GestureState,
    state_entered_at: Option<Instant>,
    last_click_time: Option<Instant>,
    last_gesture_time: Option<Instant>,
    last_reset_at: Option<Instant>,

    // Steady-posture bookkeeping: when it was entered and last observed.
    posture_since: Option<Instant>,
    posture_seen_at: Option<Instant>,

    pointer: ExponentialSmoother,
    drag: ExponentialSmoother,
    velocity: MotionHistory,

    scroll_reference: Option<f64>,
    scroll_candidate: Option<(ScrollVariant, Instant)>,

    pinch_closed: bool,
    pinch_armed: bool,
    pinch_origin: Option<ScreenPoint>,

    previous: Option<LandmarkFrame>,
    last_step_at: Option<Instant>,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig, mapper: ScreenMapper) -> Self {
        Self {
            pointer: ExponentialSmoother::new(config.mouse_smoothing),
            drag: ExponentialSmoother::new(config.drag_smoothing),
            velocity: MotionHistory::new(config.swipe_buffer_len),
            config,
            mapper,
            state: GestureState::Idle,
            state_entered_at: None,
            last_click_time: None,
            last_gesture_time: None,
            last_reset_at: None,
            posture_since: None,
            posture_seen_at: None,
            scroll_reference: None,
            scroll_candidate: None,
            pinch_closed: false,
            pinch_armed: false,
            pinch_origin: None,
            previous: None,
            last_step_at: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn mapper(&self) -> &ScreenMapper {
        &self.mapper
    }

    /// Latched pinch state after hysteresis.
    pub fn is_pinch_closed(&self) -> bool {
        self.pinch_closed
    }

    /// Current smoothed pointer position in normalized image space.
    pub fn smoothed_pointer(&self) -> Option<(f64, f64)> {
        self.pointer.value()
    }

    /// Advance by one tick. `None` means no hand was detected.
    pub fn step(&mut self, frame: Option<&LandmarkFrame>, now: Instant) -> GestureEvent {
        let before = self.state;
        let event = match frame {
            None => self.on_hand_absent(now),
            Some(frame) => self.on_frame(frame, now),
        };

        // The only place history is updated.
        self.previous = frame.cloned();
        self.last_step_at = Some(self.last_step_at.map_or(now, |last| last.max(now)));

        if self.state != before {
            debug!(from = %before, to = %self.state, "gesture state changed");
        }
        if !event.is_none() {
            debug!(event = %event, "gesture recognized");
        }
        event
    }

    /// Like [`step`](Self::step) for unvalidated tracker output; a malformed
    /// point list counts as a tick without a hand.
    pub fn step_points(&mut self, points: Option<&[Landmark]>, now: Instant) -> GestureEvent {
        let frame = match points.map(LandmarkFrame::from_slice) {
            None => None,
            Some(Ok(frame)) => Some(frame),
            Some(Err(e)) => {
                debug!("treating malformed frame as hand absent: {e}");
                None
            }
        };
        self.step(frame.as_ref(), now)
    }

    /// Feed a tick without a hand, stamped `now` or the latest step time if
    /// the stream ran ahead of it. Returns the event and its timestamp.
    pub fn release_hand(&mut self, now: Instant) -> (GestureEvent, Instant) {
        let at = self.last_step_at.map_or(now, |last| last.max(now));
        (self.step(None, at), at)
    }

    fn on_hand_absent(&mut self, now: Instant) -> GestureEvent {
        let event = match self.state {
            GestureState::Dragging => GestureEvent::new(GestureKind::DragDrop),
            _ => GestureEvent::NONE,
        };
        self.reset(now);
        self.pointer.reset();
        event
    }

    fn on_frame(&mut self, frame: &LandmarkFrame, now: Instant) -> GestureEvent {
        let obs = Observation::new(frame, self.previous.as_ref(), &self.config);
        self.update_pinch_latch(&obs);

        let claimed = self
            .handle_posture(&obs, now)
            .or_else(|| self.handle_swipe(&obs, now))
            .or_else(|| self.handle_pointer(&obs, now))
            .or_else(|| self.handle_pinch(&obs, now));

        match claimed {
            Some(event) => {
                self.scroll_candidate = None;
                event
            }
            None => self.handle_scroll(&obs, now),
        }
    }

    fn update_pinch_latch(&mut self, obs: &Observation) {
        let Some(pinch) = obs.pinch else {
            return;
        };
        if pinch.physically_closed() {
            self.pinch_closed = true;
        } else if pinch.clearly_open() {
            self.pinch_closed = false;
            self.pinch_armed = true;
        }
    }

    fn handle_posture(&mut self, obs: &Observation, now: Instant) -> Option<GestureEvent> {
        let observed = obs.steady_posture();

        match (self.state, observed) {
            (GestureState::FistSteady, Some(SteadyPosture::Fist)) => {
                self.posture_seen_at = Some(now);
                Some(GestureEvent::NONE)
            }
            (GestureState::OpenHandSteady | GestureState::SwipePending, Some(SteadyPosture::Open)) => {
                self.posture_seen_at = Some(now);
                None
            }
            (
                GestureState::FistSteady | GestureState::OpenHandSteady | GestureState::SwipePending,
                Some(next),
            ) => Some(self.flip_posture(next, now)),
            (
                GestureState::FistSteady | GestureState::OpenHandSteady | GestureState::SwipePending,
                None,
            ) if self.pinch_closed && self.pinch_armed => {
                // A pinch made from a steady hand starts the click lifecycle.
                self.leave_steady(now);
                None
            }
            (
                GestureState::FistSteady | GestureState::OpenHandSteady | GestureState::SwipePending,
                None,
            ) => {
                let within_grace = self
                    .posture_seen_at
                    .is_some_and(|seen| now.saturating_duration_since(seen) <= self.config.posture_grace);
                if within_grace {
                    Some(GestureEvent::NONE)
                } else {
                    self.reset(now);
                    None
                }
            }
            (GestureState::Dragging, Some(next)) => {
                self.reset(now);
                self.enter_steady(next, now);
                Some(GestureEvent::new(GestureKind::DragDrop))
            }
            // A pending click resolves before the hand settles into a posture.
            (GestureState::PinchDetected | GestureState::PossibleDoubleClick, Some(_)) => None,
            (
                GestureState::Idle
                | GestureState::MouseMoving
                | GestureState::ScrollMode
                | GestureState::ThumbsUpScroll,
                Some(next),
            ) => {
                self.reset(now);
                self.enter_steady(next, now);
                Some(GestureEvent::NONE)
            }
            (
                GestureState::Idle
                | GestureState::PinchDetected
                | GestureState::PossibleDoubleClick
                | GestureState::Dragging
                | GestureState::MouseMoving
                | GestureState::ScrollMode
                | GestureState::ThumbsUpScroll,
                None,
            ) => None,
        }
    }

    /// Fist became open or open became fist.
    fn flip_posture(&mut self, next: SteadyPosture, now: Instant) -> GestureEvent {
        let held = match (self.posture_since, self.posture_seen_at) {
            (Some(since), Some(seen)) => seen.saturating_duration_since(since),
            _ => Duration::ZERO,
        };

        self.reset(now);
        self.enter_steady(next, now);

        if held < self.config.posture_transition_time {
            return GestureEvent::NONE;
        }

        self.last_gesture_time = Some(now);
        GestureEvent::new(match next {
            SteadyPosture::Open => GestureKind::FistToOpen,
            SteadyPosture::Fist => GestureKind::OpenToFist,
        })
    }

    fn enter_steady(&mut self, posture: SteadyPosture, now: Instant) {
        self.set_state(GestureState::for_steady(posture), now);
        self.posture_since = Some(now);
        self.posture_seen_at = Some(now);
    }

    /// Back to IDLE keeping the pinch latch and the debounce clock.
    fn leave_steady(&mut self, now: Instant) {
        self.set_state(GestureState::Idle, now);
        self.posture_since = None;
        self.posture_seen_at = None;
        self.velocity.clear();
    }

    fn handle_swipe(&mut self, obs: &Observation, now: Instant) -> Option<GestureEvent> {
        match self.state {
            GestureState::OpenHandSteady => {
                let cooldown = self.config.swipe_cooldown;
                let settled = self.time_in_state(now) >= cooldown
                    && self
                        .last_gesture_time
                        .map_or(true, |t| now.saturating_duration_since(t) >= cooldown);
                if settled {
                    self.velocity.clear();
                    self.set_state(GestureState::SwipePending, now);
                }
                Some(GestureEvent::NONE)
            }
            GestureState::SwipePending => {
                if let Some(delta) = obs.wrist_delta {
                    self.velocity.push(delta);
                }
                if !self.velocity.is_full() {
                    return Some(GestureEvent::NONE);
                }

                let Some((ax, ay)) = self.velocity.mean() else {
                    return Some(GestureEvent::NONE);
                };
                match swipe_direction(ax, ay, self.config.swipe_velocity_threshold) {
                    Some(direction) => {
                        self.reset(now);
                        self.last_gesture_time = Some(now);
                        Some(GestureEvent::new(direction.kind()))
                    }
                    None => Some(GestureEvent::NONE),
                }
            }
            GestureState::Idle
            | GestureState::PinchDetected
            | GestureState::PossibleDoubleClick
            | GestureState::Dragging
            | GestureState::FistSteady
            | GestureState::MouseMoving
            | GestureState::ScrollMode
            | GestureState::ThumbsUpScroll => None,
        }
    }

    fn handle_pointer(&mut self, obs: &Observation, now: Instant) -> Option<GestureEvent> {
        let pointing = obs.posture.is_pointing();

        match self.state {
            GestureState::MouseMoving if pointing => Some(self.pointer_event(obs)),
            GestureState::MouseMoving => {
                // No debounce: the next tick's positional feedback covers dropouts.
                self.set_state(GestureState::Idle, now);
                None
            }
            _ if !pointing => None,
            GestureState::Idle => {
                self.set_state(GestureState::MouseMoving, now);
                Some(self.pointer_event(obs))
            }
            GestureState::Dragging => {
                self.reset(now);
                self.set_state(GestureState::MouseMoving, now);
                Some(GestureEvent::new(GestureKind::DragDrop))
            }
            GestureState::PinchDetected
            | GestureState::PossibleDoubleClick
            | GestureState::FistSteady
            | GestureState::OpenHandSteady
            | GestureState::SwipePending
            | GestureState::ScrollMode
            | GestureState::ThumbsUpScroll => {
                self.reset(now);
                self.set_state(GestureState::MouseMoving, now);
                Some(self.pointer_event(obs))
            }
        }
    }

    fn pointer_event(&mut self, obs: &Observation) -> GestureEvent {
        let smoothed = self.pointer.update(obs.index_tip);
        GestureEvent::at(GestureKind::MouseMove, self.mapper.map(smoothed))
    }

    fn handle_pinch(&mut self, obs: &Observation, now: Instant) -> Option<GestureEvent> {
        let Some(pinch) = obs.pinch else {
            // No usable pinch signal this tick. A pending click still times out.
            return match self.state {
                GestureState::PossibleDoubleClick if self.click_expired(now) => {
                    self.reset(now);
                    Some(GestureEvent::new(GestureKind::LeftClick))
                }
                GestureState::PinchDetected
                | GestureState::PossibleDoubleClick
                | GestureState::Dragging => Some(GestureEvent::NONE),
                GestureState::Idle
                | GestureState::FistSteady
                | GestureState::OpenHandSteady
                | GestureState::MouseMoving
                | GestureState::ScrollMode
                | GestureState::ThumbsUpScroll
                | GestureState::SwipePending => None,
            };
        };

        match self.state {
            GestureState::Idle => {
                if self.pinch_closed && self.pinch_armed && self.debounce_elapsed(now) {
                    self.set_state(GestureState::PinchDetected, now);
                    self.pinch_origin = Some(self.mapper.map(pinch.midpoint));
                    Some(GestureEvent::NONE)
                } else {
                    None
                }
            }
            GestureState::PinchDetected => {
                if !self.pinch_closed {
                    self.last_click_time = Some(now);
                    self.set_state(GestureState::PossibleDoubleClick, now);
                    return Some(GestureEvent::NONE);
                }

                let point = self.mapper.map(pinch.midpoint);
                let travelled = self
                    .pinch_origin
                    .map_or(0.0, |origin| origin.distance(&point));
                let confirmed = self.time_in_state(now) >= self.config.drag_confirm_duration
                    || travelled > self.config.drag_confirm_movement;

                if confirmed {
                    self.set_state(GestureState::Dragging, now);
                    self.drag.reset();
                    self.drag.update(pinch.midpoint);
                    Some(GestureEvent::at(GestureKind::DragStart, point))
                } else {
                    Some(GestureEvent::NONE)
                }
            }
            GestureState::PossibleDoubleClick => {
                if self.pinch_closed {
                    self.reset(now);
                    Some(GestureEvent::new(GestureKind::DoubleClick))
                } else if self.click_expired(now) {
                    self.reset(now);
                    Some(GestureEvent::new(GestureKind::LeftClick))
                } else {
                    Some(GestureEvent::NONE)
                }
            }
            GestureState::Dragging => {
                if self.pinch_closed {
                    let smoothed = self.drag.update(pinch.midpoint);
                    Some(GestureEvent::at(GestureKind::Dragging, self.mapper.map(smoothed)))
                } else {
                    self.reset(now);
                    Some(GestureEvent::new(GestureKind::DragDrop))
                }
            }
            GestureState::FistSteady
            | GestureState::OpenHandSteady
            | GestureState::MouseMoving
            | GestureState::ScrollMode
            | GestureState::ThumbsUpScroll
            | GestureState::SwipePending => None,
        }
    }

    fn handle_scroll(&mut self, obs: &Observation, now: Instant) -> GestureEvent {
        let observed = obs.posture.scroll_variant();

        match self.state {
            GestureState::ScrollMode | GestureState::ThumbsUpScroll => {
                let active = match self.state {
                    GestureState::ScrollMode => ScrollVariant::MiddleFinger,
                    _ => ScrollVariant::ThumbsUp,
                };
                if observed != Some(active) {
                    self.reset(now);
                    return GestureEvent::NONE;
                }

                let value = obs.scroll_axis(active);
                let delta = value - self.scroll_reference.unwrap_or(value);
                self.scroll_reference = Some(value);

                if delta.abs() <= self.config.scroll_movement_threshold {
                    return GestureEvent::new(GestureKind::ScrollModeEngaged);
                }
                let amount = scroll_amount(delta, self.config.scroll_sensitivity);
                match amount.signum() {
                    1 => GestureEvent::scroll(GestureKind::ScrollUp, amount),
                    -1 => GestureEvent::scroll(GestureKind::ScrollDown, amount),
                    _ => GestureEvent::new(GestureKind::ScrollModeEngaged),
                }
            }
            GestureState::Idle => {
                let Some(variant) = observed else {
                    self.scroll_candidate = None;
                    return GestureEvent::NONE;
                };
                let since = match self.scroll_candidate {
                    Some((candidate, since)) if candidate == variant => since,
                    _ => {
                        self.scroll_candidate = Some((variant, now));
                        now
                    }
                };
                if now.saturating_duration_since(since) < self.config.scroll_engage_hold {
                    return GestureEvent::NONE;
                }

                self.scroll_candidate = None;
                self.set_state(GestureState::for_scroll(variant), now);
                self.scroll_reference = Some(obs.scroll_axis(variant));
                GestureEvent::new(GestureKind::ScrollModeEngaged)
            }
            GestureState::PinchDetected
            | GestureState::PossibleDoubleClick
            | GestureState::Dragging
            | GestureState::FistSteady
            | GestureState::OpenHandSteady
            | GestureState::MouseMoving
            | GestureState::SwipePending => GestureEvent::NONE,
        }
    }

    fn set_state(&mut self, state: GestureState, now: Instant) {
        self.state = state;
        self.state_entered_at = Some(now);
    }

    /// Back to IDLE with all per-gesture memory cleared. The pointer smoother
    /// and the swipe debounce timestamp survive.
    fn reset(&mut self, now: Instant) {
        self.set_state(GestureState::Idle, now);
        self.last_click_time = None;
        self.last_reset_at = Some(now);
        self.posture_since = None;
        self.posture_seen_at = None;
        self.drag.reset();
        self.velocity.clear();
        self.scroll_reference = None;
        self.scroll_candidate = None;
        self.pinch_closed = false;
        self.pinch_armed = false;
        self.pinch_origin = None;
    }

    fn time_in_state(&self, now: Instant) -> Duration {
        self.state_entered_at
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t))
    }

    fn click_expired(&self, now: Instant) -> bool {
        self.last_click_time
            .is_some_and(|t| now.saturating_duration_since(t) > self.config.double_click_interval)
    }

    fn debounce_elapsed(&self, now: Instant) -> bool {
        self.last_reset_at
            .map_or(true, |t| now.saturating_duration_since(t) >= self.config.gesture_debounce)
    }
}

/// Dominant axis of the averaged wrist motion, if it is fast enough and not a tie.
pub fn swipe_direction(ax: f64, ay: f64, threshold: f64) -> Option<SwipeDirection> {
    let (mx, my) = (ax.abs(), ay.abs());
    if mx.max(my) <= threshold || (mx - my).abs() <= SWIPE_TIE_EPSILON {
        return None;
    }
    Some(if mx > my {
        if ax > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if ay > 0.0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    })
}

/// Signed scroll steps for an axis change: moving up (negative delta)
/// scrolls up (positive amount).
pub fn scroll_amount(delta: f64, sensitivity: f64) -> i32 {
    (-delta * sensitivity) as i32
}
