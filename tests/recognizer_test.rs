//! Scenario tests for the gesture recognizer, driven by synthetic hands.

use handbridge::config::GestureConfig;
use handbridge::core::{
    GestureEvent, GestureKind, GestureRecognizer, GestureState, HandPose, LandmarkFrame,
    MappingRegion, Payload, ScreenMapper, SyntheticHand,
};
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(33);

/// Feeds frames one tick apart and keeps every event.
struct Session {
    recognizer: GestureRecognizer,
    now: Instant,
    events: Vec<GestureEvent>,
}

impl Session {
    fn new() -> Self {
        let mapper = ScreenMapper::new(MappingRegion::default(), 1920, 1080, true);
        Self {
            recognizer: GestureRecognizer::new(GestureConfig::default(), mapper),
            now: Instant::now(),
            events: Vec::new(),
        }
    }

    fn feed(&mut self, frame: Option<&LandmarkFrame>) -> GestureEvent {
        self.now += TICK;
        let event = self.recognizer.step(frame, self.now);
        self.events.push(event);
        event
    }

    fn hold(&mut self, hand: SyntheticHand, pose: HandPose, duration: Duration) {
        let frame = hand.pose(pose);
        let end = self.now + duration;
        while self.now < end {
            self.feed(Some(&frame));
        }
    }

    fn count(&self, kind: GestureKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    fn kinds(&self) -> Vec<GestureKind> {
        self.events
            .iter()
            .map(|e| e.kind)
            .filter(|k| *k != GestureKind::None)
            .collect()
    }
}

fn hand() -> SyntheticHand {
    SyntheticHand::at(0.5, 0.6)
}

#[test]
fn test_no_hand_only_ever_yields_none() {
    let mut session = Session::new();
    for _ in 0..50 {
        session.feed(None);
    }
    assert!(session.events.iter().all(GestureEvent::is_none));
    assert_eq!(session.recognizer.state(), GestureState::Idle);
}

#[test]
fn test_hand_loss_during_drag_drops_exactly_once() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::PinchReleased, TICK);
    session.hold(hand(), HandPose::PinchClosed, Duration::from_millis(400));
    assert_eq!(session.recognizer.state(), GestureState::Dragging);

    let before = session.events.len();
    for _ in 0..20 {
        session.feed(None);
    }
    let after: Vec<GestureKind> = session.events[before..].iter().map(|e| e.kind).collect();
    assert_eq!(after[0], GestureKind::DragDrop);
    assert!(after[1..].iter().all(|k| *k == GestureKind::None));
}

#[test]
fn test_quick_pinch_is_one_left_click() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::PinchReleased, TICK);
    session.feed(Some(&hand().pose(HandPose::PinchClosed)));
    session.hold(hand(), HandPose::PinchReleased, Duration::from_millis(600));

    assert_eq!(session.kinds(), vec![GestureKind::LeftClick]);
    assert_eq!(session.recognizer.state(), GestureState::Idle);
}

#[test]
fn test_left_click_waits_for_double_click_window() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::PinchReleased, TICK);
    session.feed(Some(&hand().pose(HandPose::PinchClosed)));
    session.feed(Some(&hand().pose(HandPose::PinchReleased)));
    assert_eq!(
        session.recognizer.state(),
        GestureState::PossibleDoubleClick
    );

    // Still inside the 400 ms window.
    session.hold(hand(), HandPose::PinchReleased, Duration::from_millis(300));
    assert_eq!(session.count(GestureKind::LeftClick), 0);
}

#[test]
fn test_two_quick_pinches_are_one_double_click() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::PinchReleased, TICK);
    session.feed(Some(&hand().pose(HandPose::PinchClosed)));
    session.hold(hand(), HandPose::PinchReleased, Duration::from_millis(100));
    session.feed(Some(&hand().pose(HandPose::PinchClosed)));

    // Holding the second pinch must not turn into a drag.
    session.hold(hand(), HandPose::PinchClosed, Duration::from_millis(500));
    session.hold(hand(), HandPose::PinchReleased, Duration::from_millis(600));

    assert_eq!(session.kinds(), vec![GestureKind::DoubleClick]);
}

fn click_released_into(release: HandPose) -> Session {
    let mut session = Session::new();
    session.hold(hand(), HandPose::PinchReleased, TICK);
    session.feed(Some(&hand().pose(HandPose::PinchClosed)));
    session.hold(hand(), release, Duration::from_millis(700));
    session
}

#[test]
fn test_click_released_into_open_hand() {
    let session = click_released_into(HandPose::Open);
    assert_eq!(session.kinds(), vec![GestureKind::LeftClick]);
    // The open hand settles into its steady posture after the click.
    assert_eq!(session.recognizer.state(), GestureState::OpenHandSteady);
}

#[test]
fn test_click_released_into_relaxed_hand() {
    let session = click_released_into(HandPose::Neutral);
    assert_eq!(session.kinds(), vec![GestureKind::LeftClick]);
}

#[test]
fn test_click_released_into_fist() {
    let session = click_released_into(HandPose::Fist);
    assert_eq!(session.kinds(), vec![GestureKind::LeftClick]);
    assert_eq!(session.recognizer.state(), GestureState::FistSteady);
}

#[test]
fn test_double_click_released_into_open_hand() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::PinchReleased, TICK);
    session.feed(Some(&hand().pose(HandPose::PinchClosed)));
    session.hold(hand(), HandPose::Open, Duration::from_millis(100));
    assert_eq!(
        session.recognizer.state(),
        GestureState::PossibleDoubleClick
    );
    session.feed(Some(&hand().pose(HandPose::PinchClosed)));
    session.hold(hand(), HandPose::Open, Duration::from_millis(600));

    assert_eq!(session.kinds(), vec![GestureKind::DoubleClick]);
}

#[test]
fn test_ok_sign_from_open_hand_clicks() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::Open, Duration::from_millis(400));
    assert_eq!(session.recognizer.state(), GestureState::SwipePending);

    session.hold(hand(), HandPose::OkSign, TICK * 2);
    assert_eq!(session.recognizer.state(), GestureState::PinchDetected);

    session.hold(hand(), HandPose::Open, Duration::from_millis(700));
    assert_eq!(session.kinds(), vec![GestureKind::LeftClick]);
}

#[test]
fn test_two_ok_signs_from_open_hand_double_click() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::Open, Duration::from_millis(400));
    session.hold(hand(), HandPose::OkSign, TICK * 2);
    session.hold(hand(), HandPose::Open, TICK * 3);
    session.hold(hand(), HandPose::OkSign, TICK * 2);
    session.hold(hand(), HandPose::Open, Duration::from_millis(600));

    assert_eq!(session.kinds(), vec![GestureKind::DoubleClick]);
}

#[test]
fn test_held_ok_sign_drags_and_drops_on_open() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::Open, Duration::from_millis(400));
    session.hold(hand(), HandPose::OkSign, Duration::from_millis(400));
    assert_eq!(session.recognizer.state(), GestureState::Dragging);

    session.hold(hand(), HandPose::Open, TICK);
    let kinds = session.kinds();
    assert_eq!(kinds.first(), Some(&GestureKind::DragStart));
    assert_eq!(kinds.last(), Some(&GestureKind::DragDrop));
    assert_eq!(session.count(GestureKind::DragDrop), 1);
    assert_eq!(session.count(GestureKind::LeftClick), 0);
}

#[test]
fn test_held_pinch_drags_until_release() {
    let mut session = Session::new();
    let start = hand();
    session.hold(start, HandPose::PinchReleased, TICK);
    session.hold(start, HandPose::PinchClosed, Duration::from_millis(300));
    assert_eq!(session.recognizer.state(), GestureState::Dragging);
    assert_eq!(session.count(GestureKind::DragStart), 1);

    let before = session.events.len();
    for step in 1..=10 {
        let moved = start.moved(0.005 * step as f64, 0.0);
        let event = session.feed(Some(&moved.pose(HandPose::PinchClosed)));
        assert_eq!(event.kind, GestureKind::Dragging);
        assert!(event.payload.position().is_some());
    }

    // Positions follow the hand to the right.
    let xs: Vec<i32> = session.events[before..]
        .iter()
        .filter_map(|e| e.payload.position())
        .map(|p| p.x)
        .collect();
    assert!(xs.windows(2).all(|w| w[1] >= w[0]));
    assert!(xs[xs.len() - 1] > xs[0]);

    let end = start.moved(0.05, 0.0);
    session.hold(end, HandPose::PinchReleased, Duration::from_millis(300));
    assert_eq!(session.count(GestureKind::DragDrop), 1);
    assert_eq!(session.count(GestureKind::LeftClick), 0);
    assert_eq!(session.recognizer.state(), GestureState::Idle);
}

#[test]
fn test_drag_start_carries_pinch_position() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::PinchReleased, TICK);
    session.hold(hand(), HandPose::PinchClosed, Duration::from_millis(300));

    let start = session
        .events
        .iter()
        .find(|e| e.kind == GestureKind::DragStart)
        .copied();
    assert!(matches!(start, Some(GestureEvent { payload: Payload::Position(_), .. })));
}

#[test]
fn test_pinch_moved_far_starts_drag_early() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::PinchReleased, TICK);
    session.feed(Some(&hand().pose(HandPose::PinchClosed)));
    assert_eq!(session.recognizer.state(), GestureState::PinchDetected);

    // 0.05 of the 0.6-wide mapping region is 160 px, well past 40 px.
    let event = session.feed(Some(&hand().moved(0.05, 0.0).pose(HandPose::PinchClosed)));
    assert_eq!(event.kind, GestureKind::DragStart);
}

#[test]
fn test_fist_to_open_after_dwell() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::Fist, Duration::from_millis(400));
    assert_eq!(session.recognizer.state(), GestureState::FistSteady);

    session.hold(hand(), HandPose::Open, Duration::from_millis(800));
    assert_eq!(session.kinds(), vec![GestureKind::FistToOpen]);
}

#[test]
fn test_open_to_fist_after_dwell() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::Open, Duration::from_millis(500));
    session.hold(hand(), HandPose::Fist, Duration::from_millis(500));
    assert_eq!(session.kinds(), vec![GestureKind::OpenToFist]);
}

#[test]
fn test_short_posture_never_transitions() {
    let mut session = Session::new();
    for _ in 0..4 {
        session.hold(hand(), HandPose::Fist, Duration::from_millis(150));
        session.hold(hand(), HandPose::Open, Duration::from_millis(150));
    }
    assert_eq!(session.count(GestureKind::FistToOpen), 0);
    assert_eq!(session.count(GestureKind::OpenToFist), 0);
}

#[test]
fn test_posture_survives_brief_ambiguity() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::Fist, Duration::from_millis(400));
    // One ambiguous frame inside the grace period.
    session.feed(Some(&hand().pose(HandPose::Neutral)));
    assert_eq!(session.recognizer.state(), GestureState::FistSteady);

    session.hold(hand(), HandPose::Open, TICK);
    assert_eq!(session.count(GestureKind::FistToOpen), 1);
}

fn engage_scroll(session: &mut Session, pose: HandPose) {
    session.hold(hand(), pose, Duration::from_millis(400));
    assert!(session.count(GestureKind::ScrollModeEngaged) > 0);
}

#[test]
fn test_middle_finger_scroll_direction() {
    let mut session = Session::new();
    engage_scroll(&mut session, HandPose::MiddleOnly);
    assert_eq!(session.recognizer.state(), GestureState::ScrollMode);

    // Moving up scrolls up.
    let up = session.feed(Some(&hand().moved(0.0, -0.01234).pose(HandPose::MiddleOnly)));
    assert_eq!(up.kind, GestureKind::ScrollUp);
    assert_eq!(up.payload, Payload::Scroll { amount: 24 });

    // And back down scrolls down.
    let down = session.feed(Some(&hand().pose(HandPose::MiddleOnly)));
    assert_eq!(down.kind, GestureKind::ScrollDown);
    assert_eq!(down.payload, Payload::Scroll { amount: -24 });

    // Holding still keeps the mode engaged without scrolling.
    let idle = session.feed(Some(&hand().pose(HandPose::MiddleOnly)));
    assert_eq!(idle.kind, GestureKind::ScrollModeEngaged);
    assert!(!idle.kind.is_actionable());
}

#[test]
fn test_thumbs_up_scroll_uses_wrist() {
    let mut session = Session::new();
    engage_scroll(&mut session, HandPose::ThumbsUp);
    assert_eq!(session.recognizer.state(), GestureState::ThumbsUpScroll);

    let down = session.feed(Some(&hand().moved(0.0, 0.02).pose(HandPose::ThumbsUp)));
    assert_eq!(down.kind, GestureKind::ScrollDown);
    assert!(down.payload.scroll_amount().is_some_and(|a| a < 0));
}

#[test]
fn test_small_movement_does_not_scroll() {
    let mut session = Session::new();
    engage_scroll(&mut session, HandPose::MiddleOnly);
    let event = session.feed(Some(&hand().moved(0.0, -0.003).pose(HandPose::MiddleOnly)));
    assert_eq!(event.kind, GestureKind::ScrollModeEngaged);
}

fn swipe(session: &mut Session, dx: f64, dy: f64) {
    let start = hand();
    session.hold(start, HandPose::Open, Duration::from_millis(400));
    assert_eq!(session.recognizer.state(), GestureState::SwipePending);

    let mut current = start;
    for _ in 0..6 {
        current = current.moved(dx, dy);
        session.feed(Some(&current.pose(HandPose::Open)));
    }
    session.hold(current, HandPose::Open, Duration::from_millis(200));
}

#[test]
fn test_swipe_right() {
    let mut session = Session::new();
    swipe(&mut session, 0.03, 0.005);
    assert_eq!(session.kinds(), vec![GestureKind::SwipeRight]);
}

#[test]
fn test_swipe_up() {
    let mut session = Session::new();
    swipe(&mut session, -0.004, -0.03);
    assert_eq!(session.kinds(), vec![GestureKind::SwipeUp]);
}

#[test]
fn test_diagonal_tie_never_swipes() {
    let mut session = Session::new();
    swipe(&mut session, 0.03, 0.03);
    assert!(session.kinds().is_empty());
}

#[test]
fn test_slow_motion_never_swipes() {
    let mut session = Session::new();
    swipe(&mut session, 0.01, 0.0);
    assert!(session.kinds().is_empty());
}

#[test]
fn test_static_pointer_converges_without_other_events() {
    let mut session = Session::new();
    let frame = hand().pose(HandPose::Pointing);
    for _ in 0..60 {
        session.feed(Some(&frame));
    }

    assert!(session
        .events
        .iter()
        .all(|e| e.kind == GestureKind::MouseMove));

    let target = frame.point(handbridge::core::landmarks::INDEX_TIP).xy();
    let smoothed = session.recognizer.smoothed_pointer().unwrap();
    assert!((smoothed.0 - target.0).abs() < 1e-6);
    assert!((smoothed.1 - target.1).abs() < 1e-6);

    let expected = session.recognizer.mapper().map(target);
    let positions: Vec<_> = session
        .events
        .iter()
        .filter_map(|e| e.payload.position())
        .collect();
    assert_eq!(positions.last(), Some(&expected));
}

#[test]
fn test_pointer_follows_moving_finger() {
    let mut session = Session::new();
    let mut current = SyntheticHand::at(0.4, 0.6);
    let first = session.feed(Some(&current.pose(HandPose::Pointing)));
    for _ in 0..10 {
        current = current.moved(0.01, 0.0);
        session.feed(Some(&current.pose(HandPose::Pointing)));
    }
    let last = session.events.last().copied().unwrap();
    assert!(last.payload.position().unwrap().x > first.payload.position().unwrap().x);
}

#[test]
fn test_pointing_interrupts_drag_with_drop() {
    let mut session = Session::new();
    session.hold(hand(), HandPose::PinchReleased, TICK);
    session.hold(hand(), HandPose::PinchClosed, Duration::from_millis(300));
    assert_eq!(session.recognizer.state(), GestureState::Dragging);

    let event = session.feed(Some(&hand().pose(HandPose::Pointing)));
    assert_eq!(event.kind, GestureKind::DragDrop);
    assert_eq!(session.recognizer.state(), GestureState::MouseMoving);
}
