//! Windows input injection via `SendInput`, and foreground application
//! detection via the foreground window's process image.

use crate::core::geometry::ScreenPoint;
use crate::dispatch::action::{InputCommand, Key, MouseButton};
use crate::dispatch::app::AppDetector;
use crate::dispatch::sink::{InputSink, SinkError};
use windows::core::PWSTR;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_KEYUP, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MOVE, MOUSEEVENTF_WHEEL, MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY, VK_BACK,
    VK_CONTROL, VK_DELETE, VK_DOWN, VK_END, VK_ESCAPE, VK_HOME, VK_LEFT, VK_LWIN, VK_MENU, VK_NEXT,
    VK_PRIOR, VK_RETURN, VK_RIGHT, VK_SHIFT, VK_SPACE, VK_TAB, VK_UP,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetSystemMetrics, GetWindowThreadProcessId, SM_CXSCREEN, SM_CYSCREEN,
};

/// One notch of the mouse wheel.
const WHEEL_DELTA: i32 = 120;

/// Input sink backed by `SendInput`.
#[derive(Debug, Default)]
pub struct WindowsSink;

impl WindowsSink {
    pub fn new() -> Self {
        Self
    }

    fn send(inputs: &[INPUT]) -> Result<(), SinkError> {
        let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            return Err(SinkError::Rejected(format!(
                "SendInput accepted {sent} of {} events",
                inputs.len()
            )));
        }
        Ok(())
    }

    /// Absolute coordinates are normalized to 0..=65535 across the primary display.
    fn absolute(&self, point: ScreenPoint) -> (i32, i32) {
        let (w, h) = self.screen_size().unwrap_or((1, 1));
        let scale = |v: i32, extent: u32| -> i32 {
            let max = extent.saturating_sub(1).max(1) as i64;
            ((v.max(0) as i64 * 65535) / max).min(65535) as i32
        };
        (scale(point.x, w), scale(point.y, h))
    }
}

fn mouse_input(dx: i32, dy: i32, data: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: data,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn key_input(vk: VIRTUAL_KEY, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn virtual_key(key: Key) -> VIRTUAL_KEY {
    match key {
        Key::Left => VK_LEFT,
        Key::Right => VK_RIGHT,
        Key::Up => VK_UP,
        Key::Down => VK_DOWN,
        Key::PageUp => VK_PRIOR,
        Key::PageDown => VK_NEXT,
        Key::Home => VK_HOME,
        Key::End => VK_END,
        Key::Tab => VK_TAB,
        Key::Enter => VK_RETURN,
        Key::Escape => VK_ESCAPE,
        Key::Space => VK_SPACE,
        Key::Backspace => VK_BACK,
        Key::Delete => VK_DELETE,
        Key::Alt => VK_MENU,
        Key::Ctrl => VK_CONTROL,
        Key::Shift => VK_SHIFT,
        Key::Meta => VK_LWIN,
        // Letter and digit virtual keys are their uppercase ASCII codes.
        Key::Char(c) => VIRTUAL_KEY(c.to_ascii_uppercase() as u16),
    }
}

impl InputSink for WindowsSink {
    fn perform(&mut self, command: &InputCommand) -> Result<(), SinkError> {
        match command {
            InputCommand::MoveTo(point) => {
                let (dx, dy) = self.absolute(*point);
                Self::send(&[mouse_input(
                    dx,
                    dy,
                    0,
                    MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE,
                )])
            }
            InputCommand::Click {
                button: MouseButton::Left,
                count,
            } => {
                let mut inputs = Vec::with_capacity(*count as usize * 2);
                for _ in 0..*count {
                    inputs.push(mouse_input(0, 0, 0, MOUSEEVENTF_LEFTDOWN));
                    inputs.push(mouse_input(0, 0, 0, MOUSEEVENTF_LEFTUP));
                }
                Self::send(&inputs)
            }
            InputCommand::ButtonDown(MouseButton::Left) => {
                Self::send(&[mouse_input(0, 0, 0, MOUSEEVENTF_LEFTDOWN)])
            }
            InputCommand::ButtonUp(MouseButton::Left) => {
                Self::send(&[mouse_input(0, 0, 0, MOUSEEVENTF_LEFTUP)])
            }
            InputCommand::Scroll { amount } => Self::send(&[mouse_input(
                0,
                0,
                amount.saturating_mul(WHEEL_DELTA),
                MOUSEEVENTF_WHEEL,
            )]),
            InputCommand::KeyChord(keys) => {
                let mut inputs: Vec<INPUT> = keys
                    .iter()
                    .map(|k| key_input(virtual_key(*k), KEYBD_EVENT_FLAGS(0)))
                    .collect();
                inputs.extend(
                    keys.iter()
                        .rev()
                        .map(|k| key_input(virtual_key(*k), KEYEVENTF_KEYUP)),
                );
                Self::send(&inputs)
            }
        }
    }

    fn screen_size(&self) -> Option<(u32, u32)> {
        let (w, h) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if w <= 0 || h <= 0 {
            return None;
        }
        Some((w as u32, h as u32))
    }

    fn name(&self) -> &'static str {
        "windows"
    }
}

/// Reports the executable name of the process owning the foreground window.
#[derive(Debug, Default)]
pub struct WindowsAppDetector;

impl AppDetector for WindowsAppDetector {
    fn foreground_app(&self) -> Option<String> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                return None;
            }

            let mut pid = 0u32;
            GetWindowThreadProcessId(hwnd, Some(&mut pid));
            if pid == 0 {
                return None;
            }

            let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;
            let mut buffer = [0u16; 260];
            let mut len = buffer.len() as u32;
            let queried = QueryFullProcessImageNameW(
                process,
                PROCESS_NAME_WIN32,
                PWSTR(buffer.as_mut_ptr()),
                &mut len,
            );
            let _ = CloseHandle(process);
            queried.ok()?;

            let path = String::from_utf16_lossy(&buffer[..len as usize]);
            path.rsplit(['\\', '/'])
                .next()
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_virtual_keys() {
        assert_eq!(virtual_key(Key::Char('z')), VIRTUAL_KEY(0x5A));
        assert_eq!(virtual_key(Key::Char('1')), VIRTUAL_KEY(0x31));
    }
}
