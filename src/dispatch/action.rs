//! Action identifiers and the input primitives they expand to.

use crate::core::events::Payload;
use crate::core::geometry::ScreenPoint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Keys that can appear in a hotkey chord. Serialized by [`Key::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Tab,
    Enter,
    Escape,
    Space,
    Backspace,
    Delete,
    Alt,
    Ctrl,
    Shift,
    Meta,
    /// A lowercase ASCII letter or digit.
    Char(char),
}

impl Key {
    pub fn is_modifier(&self) -> bool {
        matches!(self, Key::Alt | Key::Ctrl | Key::Shift | Key::Meta)
    }

    pub fn name(&self) -> String {
        let name = match self {
            Key::Left => "left",
            Key::Right => "right",
            Key::Up => "up",
            Key::Down => "down",
            Key::PageUp => "pageup",
            Key::PageDown => "pagedown",
            Key::Home => "home",
            Key::End => "end",
            Key::Tab => "tab",
            Key::Enter => "enter",
            Key::Escape => "escape",
            Key::Space => "space",
            Key::Backspace => "backspace",
            Key::Delete => "delete",
            Key::Alt => "alt",
            Key::Ctrl => "ctrl",
            Key::Shift => "shift",
            Key::Meta => "meta",
            Key::Char(c) => return c.to_string(),
        };
        name.to_string()
    }
}

impl FromStr for Key {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "home" => Key::Home,
            "end" => Key::End,
            "tab" => Key::Tab,
            "enter" | "return" => Key::Enter,
            "escape" | "esc" => Key::Escape,
            "space" => Key::Space,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "alt" | "option" => Key::Alt,
            "ctrl" | "control" => Key::Ctrl,
            "shift" => Key::Shift,
            "meta" | "cmd" | "command" | "win" | "super" => Key::Meta,
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => Key::Char(c),
                    _ => return Err(ActionParseError::UnknownKey(s.to_string())),
                }
            }
        };
        Ok(key)
    }
}

impl TryFrom<String> for Key {
    type Error = ActionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
}

/// What a gesture does in a profile.
///
/// Written in mapping files as `mouse_move`, `left_click`, `hotkey:ctrl+z`
/// and so on. The older `hotkey_ctrl_z` spelling is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Action {
    None,
    MouseMove,
    MouseDrag,
    LeftClick,
    DoubleClick,
    MouseDownLeft,
    MouseUpLeft,
    Scroll,
    Hotkey(Vec<Key>),
}

impl Action {
    pub fn hotkey(keys: &[Key]) -> Self {
        Action::Hotkey(keys.to_vec())
    }

    /// Expand into input primitives for the sink.
    pub fn commands(&self, payload: &Payload) -> Result<Vec<InputCommand>, ActionError> {
        let position = || payload.position().ok_or(ActionError::MissingPosition(self.to_string()));

        let commands = match self {
            Action::None => Vec::new(),
            Action::MouseMove | Action::MouseDrag => vec![InputCommand::MoveTo(position()?)],
            Action::LeftClick => vec![InputCommand::Click {
                button: MouseButton::Left,
                count: 1,
            }],
            Action::DoubleClick => vec![InputCommand::Click {
                button: MouseButton::Left,
                count: 2,
            }],
            Action::MouseDownLeft => {
                let mut commands = Vec::with_capacity(2);
                if let Some(point) = payload.position() {
                    commands.push(InputCommand::MoveTo(point));
                }
                commands.push(InputCommand::ButtonDown(MouseButton::Left));
                commands
            }
            Action::MouseUpLeft => vec![InputCommand::ButtonUp(MouseButton::Left)],
            Action::Scroll => {
                let amount = payload
                    .scroll_amount()
                    .ok_or(ActionError::MissingAmount(self.to_string()))?;
                vec![InputCommand::Scroll { amount }]
            }
            Action::Hotkey(keys) => vec![InputCommand::KeyChord(keys.clone())],
        };
        Ok(commands)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::None => f.write_str("none"),
            Action::MouseMove => f.write_str("mouse_move"),
            Action::MouseDrag => f.write_str("mouse_drag"),
            Action::LeftClick => f.write_str("left_click"),
            Action::DoubleClick => f.write_str("double_click"),
            Action::MouseDownLeft => f.write_str("mouse_down_left"),
            Action::MouseUpLeft => f.write_str("mouse_up_left"),
            Action::Scroll => f.write_str("scroll"),
            Action::Hotkey(keys) => {
                let names: Vec<String> = keys.iter().map(Key::name).collect();
                write!(f, "hotkey:{}", names.join("+"))
            }
        }
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(chord) = s.strip_prefix("hotkey:") {
            return parse_chord(chord.split('+'), s);
        }
        if let Some(chord) = s.strip_prefix("hotkey_") {
            return parse_chord(chord.split('_'), s);
        }

        match s {
            "none" | "do_nothing" => Ok(Action::None),
            "mouse_move" => Ok(Action::MouseMove),
            "mouse_drag" => Ok(Action::MouseDrag),
            "left_click" => Ok(Action::LeftClick),
            "double_click" => Ok(Action::DoubleClick),
            "mouse_down_left" => Ok(Action::MouseDownLeft),
            "mouse_up_left" => Ok(Action::MouseUpLeft),
            "scroll" => Ok(Action::Scroll),
            _ => Err(ActionParseError::UnknownAction(s.to_string())),
        }
    }
}

fn parse_chord<'a>(
    parts: impl Iterator<Item = &'a str>,
    original: &str,
) -> Result<Action, ActionParseError> {
    let keys = parts.map(str::parse).collect::<Result<Vec<Key>, _>>()?;
    if keys.is_empty() || keys.iter().all(Key::is_modifier) {
        return Err(ActionParseError::EmptyChord(original.to_string()));
    }
    Ok(Action::Hotkey(keys))
}

impl TryFrom<String> for Action {
    type Error = ActionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.to_string()
    }
}

/// A primitive the input sink knows how to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputCommand {
    MoveTo(ScreenPoint),
    Click { button: MouseButton, count: u8 },
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    /// Press the keys in order, release in reverse.
    KeyChord(Vec<Key>),
    /// Positive scrolls up.
    Scroll { amount: i32 },
}

/// Errors parsing an action or key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionParseError {
    UnknownAction(String),
    UnknownKey(String),
    EmptyChord(String),
}

impl std::fmt::Display for ActionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionParseError::UnknownAction(a) => write!(f, "unknown action: {a}"),
            ActionParseError::UnknownKey(k) => write!(f, "unknown key: {k}"),
            ActionParseError::EmptyChord(c) => write!(f, "hotkey needs a non-modifier key: {c}"),
        }
    }
}

impl std::error::Error for ActionParseError {}

/// An action mapped to an event that lacks the data it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    MissingPosition(String),
    MissingAmount(String),
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::MissingPosition(a) => write!(f, "{a} needs a screen position"),
            ActionError::MissingAmount(a) => write!(f, "{a} needs a scroll amount"),
        }
    }
}

impl std::error::Error for ActionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_and_legacy_hotkeys() {
        let redo: Action = "hotkey:ctrl+shift+z".parse().unwrap();
        assert_eq!(redo, Action::hotkey(&[Key::Ctrl, Key::Shift, Key::Char('z')]));
        assert_eq!("hotkey_ctrl_shift_z".parse::<Action>(), Ok(redo.clone()));
        assert_eq!(redo.to_string(), "hotkey:ctrl+shift+z");

        assert_eq!("do_nothing".parse::<Action>(), Ok(Action::None));
    }

    #[test]
    fn test_reject_bad_actions() {
        assert_eq!(
            "teleport".parse::<Action>(),
            Err(ActionParseError::UnknownAction("teleport".to_string()))
        );
        assert!(matches!(
            "hotkey:ctrl+banana".parse::<Action>(),
            Err(ActionParseError::UnknownKey(_))
        ));
        assert!(matches!(
            "hotkey:ctrl+shift".parse::<Action>(),
            Err(ActionParseError::EmptyChord(_))
        ));
    }

    #[test]
    fn test_action_serde_uses_string_form() {
        let json = serde_json::to_string(&Action::hotkey(&[Key::Alt, Key::Left])).unwrap();
        assert_eq!(json, "\"hotkey:alt+left\"");
        let parsed: Action = serde_json::from_str("\"mouse_drag\"").unwrap();
        assert_eq!(parsed, Action::MouseDrag);
    }

    #[test]
    fn test_key_chord_command_serde() {
        let chord = InputCommand::KeyChord(vec![Key::Ctrl, Key::Shift, Key::Char('z')]);
        let json = serde_json::to_string(&chord).unwrap();
        assert_eq!(json, r#"{"key_chord":["ctrl","shift","z"]}"#);

        let parsed: InputCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, chord);

        let alias: Key = serde_json::from_str("\"cmd\"").unwrap();
        assert_eq!(alias, Key::Meta);
        assert!(serde_json::from_str::<Key>("\"hyper\"").is_err());
    }

    #[test]
    fn test_commands_from_payload() {
        let point = ScreenPoint::new(5, 6);
        assert_eq!(
            Action::MouseMove.commands(&Payload::Position(point)),
            Ok(vec![InputCommand::MoveTo(point)])
        );
        assert_eq!(
            Action::MouseDownLeft.commands(&Payload::Position(point)),
            Ok(vec![
                InputCommand::MoveTo(point),
                InputCommand::ButtonDown(MouseButton::Left)
            ])
        );
        assert_eq!(
            Action::Scroll.commands(&Payload::Scroll { amount: -20 }),
            Ok(vec![InputCommand::Scroll { amount: -20 }])
        );
        assert!(matches!(
            Action::MouseMove.commands(&Payload::None),
            Err(ActionError::MissingPosition(_))
        ));
        assert_eq!(Action::None.commands(&Payload::None), Ok(Vec::new()));
    }
}
