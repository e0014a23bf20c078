use chrono::{NaiveDateTime, TimeDelta};

/// Common zero point for frames coming from several log files.
///
/// The start time of the first log seen becomes the origin; every timestamp is
/// then expressed in seconds from it, so frames of different files share one
/// time axis. Timestamps are **naive** (no timezone): all logs of a session
/// must use the same reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionClock {
    origin: Option<NaiveDateTime>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Option<NaiveDateTime> {
        self.origin
    }

    /// Seconds from the origin to `absolute`. The first call sets the origin.
    pub fn offset_of(&mut self, absolute: NaiveDateTime) -> f64 {
        let origin: NaiveDateTime = *self.origin.get_or_insert(absolute);
        seconds(absolute - origin)
    }

    /// Converts a timestamp relative to `log_start` into seconds from the origin.
    ///
    /// The first log start seen sets the origin.
    pub fn relative(&mut self, log_start: NaiveDateTime, offset: f64) -> f64 {
        self.offset_of(log_start) + offset
    }

    /// Forgets the origin.
    pub fn clear(&mut self) {
        self.origin = None;
    }
}

fn seconds(delta: TimeDelta) -> f64 {
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
