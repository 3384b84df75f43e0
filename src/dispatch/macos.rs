//! macOS input injection by posting CGEvents.
//!
//! Posting synthetic events requires the Accessibility permission; without
//! it the events are silently discarded by the window server.

use crate::core::geometry::ScreenPoint;
use crate::dispatch::action::{InputCommand, Key, MouseButton};
use crate::dispatch::sink::{InputSink, SinkError};
use core_graphics::display::CGDisplay;
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTapLocation, CGEventType, CGKeyCode, CGMouseButton, EventField,
    KeyCode, ScrollEventUnit,
};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

/// Input sink that posts events to the HID event stream.
pub struct MacSink {
    last_position: Option<ScreenPoint>,
    button_down: bool,
}

impl MacSink {
    pub fn new() -> Self {
        Self {
            last_position: None,
            button_down: false,
        }
    }

    fn source() -> Result<CGEventSource, SinkError> {
        CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| SinkError::Rejected("failed to create event source".to_string()))
    }

    /// The last position we moved to, or the live cursor location.
    fn cursor(&self) -> Result<CGPoint, SinkError> {
        if let Some(point) = self.last_position {
            return Ok(CGPoint::new(point.x as f64, point.y as f64));
        }
        CGEvent::new(Self::source()?)
            .map(|event| event.location())
            .map_err(|_| SinkError::Rejected("failed to read cursor location".to_string()))
    }

    fn post_mouse(
        &self,
        event_type: CGEventType,
        at: CGPoint,
        click_state: Option<i64>,
    ) -> Result<(), SinkError> {
        let event = CGEvent::new_mouse_event(Self::source()?, event_type, at, CGMouseButton::Left)
            .map_err(|_| SinkError::Rejected("failed to create mouse event".to_string()))?;
        if let Some(state) = click_state {
            event.set_integer_value_field(EventField::MOUSE_EVENT_CLICK_STATE, state);
        }
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn post_key(&self, code: CGKeyCode, down: bool, flags: CGEventFlags) -> Result<(), SinkError> {
        let event = CGEvent::new_keyboard_event(Self::source()?, code, down)
            .map_err(|_| SinkError::Rejected(format!("failed to create key event {code}")))?;
        event.set_flags(flags);
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn chord(&self, keys: &[Key]) -> Result<(), SinkError> {
        let codes = keys
            .iter()
            .map(|key| key_code(*key).map(|code| (*key, code)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut flags = CGEventFlags::CGEventFlagNull;
        for (key, code) in &codes {
            flags |= modifier_flag(*key);
            self.post_key(*code, true, flags)?;
        }
        for (key, code) in codes.iter().rev() {
            self.post_key(*code, false, flags)?;
            flags.remove(modifier_flag(*key));
        }
        Ok(())
    }
}

impl Default for MacSink {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSink for MacSink {
    fn perform(&mut self, command: &InputCommand) -> Result<(), SinkError> {
        match command {
            InputCommand::MoveTo(point) => {
                let event_type = if self.button_down {
                    CGEventType::LeftMouseDragged
                } else {
                    CGEventType::MouseMoved
                };
                self.post_mouse(
                    event_type,
                    CGPoint::new(point.x as f64, point.y as f64),
                    None,
                )?;
                self.last_position = Some(*point);
            }
            InputCommand::Click {
                button: MouseButton::Left,
                count,
            } => {
                let at = self.cursor()?;
                for state in 1..=i64::from(*count) {
                    self.post_mouse(CGEventType::LeftMouseDown, at, Some(state))?;
                    self.post_mouse(CGEventType::LeftMouseUp, at, Some(state))?;
                }
            }
            InputCommand::ButtonDown(MouseButton::Left) => {
                self.post_mouse(CGEventType::LeftMouseDown, self.cursor()?, None)?;
                self.button_down = true;
            }
            InputCommand::ButtonUp(MouseButton::Left) => {
                self.post_mouse(CGEventType::LeftMouseUp, self.cursor()?, None)?;
                self.button_down = false;
            }
            InputCommand::Scroll { amount } => {
                let event =
                    CGEvent::new_scroll_event(Self::source()?, ScrollEventUnit::LINE, 1, *amount, 0, 0)
                        .map_err(|_| SinkError::Rejected("failed to create scroll event".to_string()))?;
                event.post(CGEventTapLocation::HID);
            }
            InputCommand::KeyChord(keys) => self.chord(keys)?,
        }
        Ok(())
    }

    fn screen_size(&self) -> Option<(u32, u32)> {
        let display = CGDisplay::main();
        let (w, h) = (display.pixels_wide(), display.pixels_high());
        if w == 0 || h == 0 {
            return None;
        }
        Some((w as u32, h as u32))
    }

    fn name(&self) -> &'static str {
        "macos"
    }
}

fn modifier_flag(key: Key) -> CGEventFlags {
    match key {
        Key::Alt => CGEventFlags::CGEventFlagAlternate,
        Key::Ctrl => CGEventFlags::CGEventFlagControl,
        Key::Shift => CGEventFlags::CGEventFlagShift,
        Key::Meta => CGEventFlags::CGEventFlagCommand,
        _ => CGEventFlags::CGEventFlagNull,
    }
}

fn key_code(key: Key) -> Result<CGKeyCode, SinkError> {
    let code = match key {
        Key::Left => KeyCode::LEFT_ARROW,
        Key::Right => KeyCode::RIGHT_ARROW,
        Key::Up => KeyCode::UP_ARROW,
        Key::Down => KeyCode::DOWN_ARROW,
        Key::PageUp => KeyCode::PAGE_UP,
        Key::PageDown => KeyCode::PAGE_DOWN,
        Key::Home => KeyCode::HOME,
        Key::End => KeyCode::END,
        Key::Tab => KeyCode::TAB,
        Key::Enter => KeyCode::RETURN,
        Key::Escape => KeyCode::ESCAPE,
        Key::Space => KeyCode::SPACE,
        Key::Backspace => KeyCode::DELETE,
        Key::Delete => KeyCode::FORWARD_DELETE,
        Key::Alt => KeyCode::OPTION,
        Key::Ctrl => KeyCode::CONTROL,
        Key::Shift => KeyCode::SHIFT,
        Key::Meta => KeyCode::COMMAND,
        Key::Char(c) => return ansi_code(c),
    };
    Ok(code)
}

/// Virtual key codes of the ANSI layout.
fn ansi_code(c: char) -> Result<CGKeyCode, SinkError> {
    let code = match c {
        'a' => 0x00,
        's' => 0x01,
        'd' => 0x02,
        'f' => 0x03,
        'h' => 0x04,
        'g' => 0x05,
        'z' => 0x06,
        'x' => 0x07,
        'c' => 0x08,
        'v' => 0x09,
        'b' => 0x0B,
        'q' => 0x0C,
        'w' => 0x0D,
        'e' => 0x0E,
        'r' => 0x0F,
        'y' => 0x10,
        't' => 0x11,
        '1' => 0x12,
        '2' => 0x13,
        '3' => 0x14,
        '4' => 0x15,
        '6' => 0x16,
        '5' => 0x17,
        '9' => 0x19,
        '7' => 0x1A,
        '8' => 0x1C,
        '0' => 0x1D,
        'o' => 0x1F,
        'u' => 0x20,
        'i' => 0x22,
        'p' => 0x23,
        'l' => 0x25,
        'j' => 0x26,
        'k' => 0x28,
        'n' => 0x2D,
        'm' => 0x2E,
        other => return Err(SinkError::Unsupported(format!("key {other}"))),
    };
    Ok(code)
}
