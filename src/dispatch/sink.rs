//! The input sink boundary: where input primitives meet the OS.

use crate::dispatch::action::InputCommand;
use tracing::info;

/// Performs input primitives against the OS (or pretends to).
pub trait InputSink: Send {
    fn perform(&mut self, command: &InputCommand) -> Result<(), SinkError>;

    /// Size of the main display in pixels, if the sink can tell.
    fn screen_size(&self) -> Option<(u32, u32)>;

    fn name(&self) -> &'static str;
}

/// Errors from an input sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The platform refused to create or post the event.
    Rejected(String),
    /// The command cannot be expressed on this platform.
    Unsupported(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Rejected(e) => write!(f, "Input rejected: {e}"),
            SinkError::Unsupported(e) => write!(f, "Unsupported input: {e}"),
        }
    }
}

impl std::error::Error for SinkError {}

impl InputSink for Box<dyn InputSink> {
    fn perform(&mut self, command: &InputCommand) -> Result<(), SinkError> {
        (**self).perform(command)
    }

    fn screen_size(&self) -> Option<(u32, u32)> {
        (**self).screen_size()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Dry-run sink: logs every command and keeps a copy.
#[derive(Debug, Default)]
pub struct LogSink {
    screen_size: Option<(u32, u32)>,
    performed: Vec<InputCommand>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_screen_size(width: u32, height: u32) -> Self {
        Self {
            screen_size: Some((width, height)),
            performed: Vec::new(),
        }
    }

    pub fn performed(&self) -> &[InputCommand] {
        &self.performed
    }

    pub fn take_performed(&mut self) -> Vec<InputCommand> {
        std::mem::take(&mut self.performed)
    }
}

impl InputSink for LogSink {
    fn perform(&mut self, command: &InputCommand) -> Result<(), SinkError> {
        info!(?command, "dry run");
        self.performed.push(command.clone());
        Ok(())
    }

    fn screen_size(&self) -> Option<(u32, u32)> {
        self.screen_size
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::ScreenPoint;

    #[test]
    fn test_log_sink_records_commands() {
        let mut sink = LogSink::with_screen_size(800, 600);
        sink.perform(&InputCommand::MoveTo(ScreenPoint::new(1, 2)))
            .unwrap();
        sink.perform(&InputCommand::Scroll { amount: 3 }).unwrap();

        assert_eq!(sink.screen_size(), Some((800, 600)));
        assert_eq!(sink.performed().len(), 2);
        assert_eq!(sink.take_performed().len(), 2);
        assert!(sink.performed().is_empty());
    }
}
