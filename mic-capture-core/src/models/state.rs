use chrono::{DateTime, Duration, Utc};

/// Connection state of a capture device.
///
/// State transitions:
/// ```text
/// Disconnected → connect → Connected → disconnect → Disconnected
/// ```
/// Recording is a sub-state of `Connected`, tracked by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Timestamps for one recording session.
///
/// `duration` reflects the wall-clock span between `start_recording`
/// and `stop_recording`, not the time spent draining the writer.
/// All fields are overwritten when a new session starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLog {
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
}

impl SessionLog {
    pub(crate) fn begin(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.stopped_at = None;
        self.duration = None;
    }

    pub(crate) fn finish(&mut self, now: DateTime<Utc>) {
        self.stopped_at = Some(now);
        self.duration = self.started_at.map(|start| now - start);
    }
}
