//! Landmark source that replays a JSON-lines stream.
//!
//! Each line is a [`FrameRecord`]. The stream may come from a file written
//! by an external hand tracker or be piped in live on stdin. Lines are read
//! on a background thread and delivered through a [`FrameQueue`].

use crate::source::queue::FrameQueue;
use crate::source::types::{FrameRecord, FrameSample, SourceError};
use crossbeam_channel::Receiver;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Where the stream comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayInput {
    Stdin,
    File(PathBuf),
}

impl ReplayInput {
    /// `-` means stdin, anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            ReplayInput::Stdin
        } else {
            ReplayInput::File(PathBuf::from(arg))
        }
    }
}

/// Configuration for a replay.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub input: ReplayInput,
    /// Sleep to reproduce recorded timing; frames that fall behind are dropped.
    /// Without pacing every frame is delivered, as fast as it is consumed.
    pub realtime: bool,
    pub queue_capacity: usize,
    /// Spacing assumed for records without a `t` field.
    pub frame_interval: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input: ReplayInput::Stdin,
            realtime: false,
            queue_capacity: 2,
            frame_interval: Duration::from_millis(33),
        }
    }
}

/// Replays recorded landmark frames into the pipeline.
pub struct ReplaySource {
    config: ReplayConfig,
    queue: Option<FrameQueue>,
    receiver: Receiver<FrameSample>,
    dropped: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(config: ReplayConfig) -> Self {
        let (queue, receiver) = FrameQueue::bounded(config.queue_capacity);
        Self {
            dropped: queue.dropped_counter(),
            queue: Some(queue),
            receiver,
            config,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Open the input and start reading in a background thread.
    ///
    /// The receiver disconnects once the stream is exhausted.
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        if self.queue.is_none() {
            return Err(SourceError::Exhausted);
        }

        let reader: Box<dyn BufRead + Send> = match &self.config.input {
            ReplayInput::Stdin => Box::new(BufReader::new(std::io::stdin())),
            ReplayInput::File(path) => {
                let file = std::fs::File::open(path)
                    .map_err(|e| SourceError::Io(format!("{}: {e}", path.display())))?;
                Box::new(BufReader::new(file))
            }
        };

        let queue = self.queue.take().ok_or(SourceError::Exhausted)?;
        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let config = self.config.clone();

        let handle = thread::spawn(move || {
            let delivered = run_replay(reader, &queue, &running, &config);
            debug!(delivered, dropped = queue.dropped(), "replay finished");
            running.store(false, Ordering::SeqCst);
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop reading. A thread blocked on stdin is detached rather than joined.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            if self.config.input != ReplayInput::Stdin || handle.is_finished() {
                let _ = handle.join();
            }
        }
    }

    /// Check if the reader thread is still producing frames.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for frame samples.
    pub fn receiver(&self) -> &Receiver<FrameSample> {
        &self.receiver
    }

    /// Try to receive a sample without blocking.
    pub fn try_recv(&self) -> Option<FrameSample> {
        self.receiver.try_recv().ok()
    }

    /// Frames evicted because the consumer fell behind.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read the stream to the end (or until stopped). Returns the number of
/// samples handed to the queue.
fn run_replay(
    reader: Box<dyn BufRead + Send>,
    queue: &FrameQueue,
    running: &AtomicBool,
    config: &ReplayConfig,
) -> u64 {
    let base = Instant::now();
    let mut last_offset = Duration::ZERO;
    let mut last_at = base;
    let mut delivered = 0u64;

    for (index, line) in reader.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("stopping replay after read error: {e}");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let record = match serde_json::from_str::<FrameRecord>(trimmed) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(line = index + 1, "unparseable frame, treating as no hand: {e}");
                None
            }
        };

        // Offsets must not run backwards on the monotonic clock. Records with
        // an unusable `t` are spaced like records without one.
        let next = if delivered == 0 {
            Duration::ZERO
        } else {
            last_offset.saturating_add(config.frame_interval)
        };
        let offset = record
            .as_ref()
            .and_then(|r| r.offset_from(base))
            .unwrap_or(next)
            .max(last_offset);
        let captured_at = match base.checked_add(offset) {
            Some(at) => {
                last_offset = offset;
                last_at = at;
                at
            }
            None => last_at,
        };

        let frame = match record.as_ref().map(FrameRecord::to_frame) {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                debug!(line = index + 1, "malformed landmarks, treating as no hand: {e}");
                None
            }
            None => None,
        };

        let sample = FrameSample { captured_at, frame };

        if config.realtime {
            let wait = captured_at.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                thread::sleep(wait);
            }
            queue.push(sample);
        } else if !queue.push_blocking(sample, running) {
            break;
        }
        delivered += 1;
    }

    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synthetic::{HandPose, SyntheticHand};
    use std::io::Write;

    fn write_stream(name: &str, lines: &[String]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "handbridge-replay-{}-{name}.jsonl",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    fn collect(source: &ReplaySource) -> Vec<FrameSample> {
        let receiver = source.receiver().clone();
        receiver.iter().collect()
    }

    #[test]
    fn test_replay_delivers_every_frame_in_order() {
        let hand = SyntheticHand::at(0.5, 0.6);
        let lines: Vec<String> = (0..10)
            .map(|i| {
                let record = if i % 3 == 0 {
                    FrameRecord::absent(i as f64 * 0.033)
                } else {
                    FrameRecord::from_frame(i as f64 * 0.033, &hand.pose(HandPose::Open))
                };
                serde_json::to_string(&record).unwrap()
            })
            .collect();
        let path = write_stream("order", &lines);

        let mut source = ReplaySource::new(ReplayConfig {
            input: ReplayInput::File(path.clone()),
            ..ReplayConfig::default()
        });
        source.start().unwrap();
        let samples = collect(&source);
        source.stop();
        let _ = std::fs::remove_file(path);

        assert_eq!(samples.len(), 10);
        assert_eq!(source.dropped_frames(), 0);
        assert!(samples[0].frame.is_none());
        assert!(samples[1].frame.is_some());
        for pair in samples.windows(2) {
            assert!(pair[1].captured_at >= pair[0].captured_at);
        }
    }

    #[test]
    fn test_garbage_lines_become_absent_frames() {
        let lines = vec![
            "# recorded by a test".to_string(),
            "not json".to_string(),
            String::new(),
            r#"{"t": 0.1, "landmarks": [[0.5, 0.5, 0.0]]}"#.to_string(),
        ];
        let path = write_stream("garbage", &lines);

        let mut source = ReplaySource::new(ReplayConfig {
            input: ReplayInput::File(path.clone()),
            ..ReplayConfig::default()
        });
        source.start().unwrap();
        let samples = collect(&source);
        let _ = std::fs::remove_file(path);

        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.frame.is_none()));
    }

    #[test]
    fn test_out_of_range_timestamps_are_spaced_evenly() {
        let lines = vec![
            r#"{"t": 0.5, "landmarks": null}"#.to_string(),
            r#"{"t": 1e20, "landmarks": null}"#.to_string(),
            r#"{"t": 1.7976931348623157e308}"#.to_string(),
            r#"{"t": 0.6}"#.to_string(),
        ];
        let path = write_stream("huge-t", &lines);

        let mut source = ReplaySource::new(ReplayConfig {
            input: ReplayInput::File(path.clone()),
            ..ReplayConfig::default()
        });
        source.start().unwrap();
        let samples = collect(&source);
        source.stop();
        let _ = std::fs::remove_file(path);

        assert_eq!(samples.len(), 4);
        let gaps: Vec<Duration> = samples
            .windows(2)
            .map(|pair| pair[1].captured_at - pair[0].captured_at)
            .collect();
        assert_eq!(gaps[0], Duration::from_millis(33));
        assert_eq!(gaps[1], Duration::from_millis(33));
        assert!(samples[3].captured_at >= samples[2].captured_at);
    }

    #[test]
    fn test_replay_plays_once() {
        let path = write_stream("once", &["{}".to_string()]);
        let mut source = ReplaySource::new(ReplayConfig {
            input: ReplayInput::File(path.clone()),
            ..ReplayConfig::default()
        });
        source.start().unwrap();
        let _ = collect(&source);
        source.stop();
        let _ = std::fs::remove_file(path);

        assert!(matches!(source.start(), Err(SourceError::Exhausted)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let mut source = ReplaySource::new(ReplayConfig {
            input: ReplayInput::File(PathBuf::from("/definitely/not/here.jsonl")),
            ..ReplayConfig::default()
        });
        assert!(matches!(source.start(), Err(SourceError::Io(_))));
    }

    #[test]
    fn test_input_from_arg() {
        assert_eq!(ReplayInput::from_arg("-"), ReplayInput::Stdin);
        assert_eq!(
            ReplayInput::from_arg("frames.jsonl"),
            ReplayInput::File(PathBuf::from("frames.jsonl"))
        );
    }
}
