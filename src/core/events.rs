//! The recognizer's output vocabulary.

use crate::core::geometry::ScreenPoint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Every event name the recognizer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureKind {
    None,
    MouseMove,
    LeftClick,
    DoubleClick,
    DragStart,
    Dragging,
    DragDrop,
    ScrollUp,
    ScrollDown,
    ScrollModeEngaged,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    FistToOpen,
    OpenToFist,
}

impl GestureKind {
    pub const ALL: [GestureKind; 16] = [
        GestureKind::None,
        GestureKind::MouseMove,
        GestureKind::LeftClick,
        GestureKind::DoubleClick,
        GestureKind::DragStart,
        GestureKind::Dragging,
        GestureKind::DragDrop,
        GestureKind::ScrollUp,
        GestureKind::ScrollDown,
        GestureKind::ScrollModeEngaged,
        GestureKind::SwipeLeft,
        GestureKind::SwipeRight,
        GestureKind::SwipeUp,
        GestureKind::SwipeDown,
        GestureKind::FistToOpen,
        GestureKind::OpenToFist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureKind::None => "NONE",
            GestureKind::MouseMove => "MOUSE_MOVE",
            GestureKind::LeftClick => "LEFT_CLICK",
            GestureKind::DoubleClick => "DOUBLE_CLICK",
            GestureKind::DragStart => "DRAG_START",
            GestureKind::Dragging => "DRAGGING",
            GestureKind::DragDrop => "DRAG_DROP",
            GestureKind::ScrollUp => "SCROLL_UP",
            GestureKind::ScrollDown => "SCROLL_DOWN",
            GestureKind::ScrollModeEngaged => "SCROLL_MODE_ENGAGED",
            GestureKind::SwipeLeft => "SWIPE_LEFT",
            GestureKind::SwipeRight => "SWIPE_RIGHT",
            GestureKind::SwipeUp => "SWIPE_UP",
            GestureKind::SwipeDown => "SWIPE_DOWN",
            GestureKind::FistToOpen => "FIST_TO_OPEN",
            GestureKind::OpenToFist => "OPEN_TO_FIST",
        }
    }

    /// Whether a consumer should act on this event at all.
    /// `NONE` and the informational `SCROLL_MODE_ENGAGED` are not actionable.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, GestureKind::None | GestureKind::ScrollModeEngaged)
    }

    /// Swipes and posture transitions, which trigger discrete and often
    /// irreversible actions.
    pub fn is_major(&self) -> bool {
        matches!(
            self,
            GestureKind::SwipeLeft
                | GestureKind::SwipeRight
                | GestureKind::SwipeUp
                | GestureKind::SwipeDown
                | GestureKind::FistToOpen
                | GestureKind::OpenToFist
        )
    }
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        GestureKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown gesture: {s}"))
    }
}

/// Direction of a detected swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    pub fn kind(self) -> GestureKind {
        match self {
            SwipeDirection::Left => GestureKind::SwipeLeft,
            SwipeDirection::Right => GestureKind::SwipeRight,
            SwipeDirection::Up => GestureKind::SwipeUp,
            SwipeDirection::Down => GestureKind::SwipeDown,
        }
    }
}

/// Event-specific data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    #[default]
    None,
    /// Screen position for pointer and drag events.
    Position(ScreenPoint),
    /// Signed scroll magnitude; positive scrolls up.
    Scroll { amount: i32 },
}

impl Payload {
    pub fn position(&self) -> Option<ScreenPoint> {
        match self {
            Payload::Position(point) => Some(*point),
            _ => None,
        }
    }

    pub fn scroll_amount(&self) -> Option<i32> {
        match self {
            Payload::Scroll { amount } => Some(*amount),
            _ => None,
        }
    }
}

/// One recognizer output: at most one per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub kind: GestureKind,
    #[serde(default)]
    pub payload: Payload,
}

impl GestureEvent {
    pub const NONE: GestureEvent = GestureEvent {
        kind: GestureKind::None,
        payload: Payload::None,
    };

    pub fn new(kind: GestureKind) -> Self {
        Self {
            kind,
            payload: Payload::None,
        }
    }

    pub fn at(kind: GestureKind, point: ScreenPoint) -> Self {
        Self {
            kind,
            payload: Payload::Position(point),
        }
    }

    pub fn scroll(kind: GestureKind, amount: i32) -> Self {
        Self {
            kind,
            payload: Payload::Scroll { amount },
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == GestureKind::None
    }
}

impl std::fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.payload {
            Payload::None => write!(f, "{}", self.kind),
            Payload::Position(p) => write!(f, "{} ({}, {})", self.kind, p.x, p.y),
            Payload::Scroll { amount } => write!(f, "{} ({amount})", self.kind),
        }
    }
}
