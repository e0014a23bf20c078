use serde::{Deserialize, Serialize};

use crate::types::{msglog::Frame, signal::Signal};

/// Address keys picked at each ambiguous level of a trace query.
///
/// `None` means the level had a single key and needed no choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceSelection {
    pub source: Option<u8>,
    pub destination: Option<u8>,
    pub channel: Option<u8>,
}

/// Frames of one message for one source/destination/channel selection.
///
/// Built on each query, never stored by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceData {
    pub message: String,
    pub selection: TraceSelection,
    /// Frames in arrival order (see [`TraceData::sort_by_time`]).
    pub frames: Vec<Frame>,
}

/// Decoded values of one signal over a trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
    /// Frames the signal could not be decoded from.
    pub skipped: usize,
}

impl TraceData {
    /// Plot-style suffix such as `"(SA:3 CAN:2)"`; empty when nothing was selected.
    pub fn to_title(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(sa) = self.selection.source {
            parts.push(format!("SA:{sa:X}"));
        }
        if let Some(da) = self.selection.destination {
            parts.push(format!("DA:{da:X}"));
        }
        if let Some(can) = self.selection.channel {
            parts.push(format!("CAN:{can}"));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("({})", parts.join(" "))
        }
    }

    /// Stable sort by timestamp.
    pub fn sort_by_time(&mut self) {
        self.frames
            .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Decodes `signal` from every frame; frames that fail to decode are counted
    /// in `skipped` and left out.
    pub fn signal_series(&self, signal: &Signal) -> SignalSeries {
        let mut series = SignalSeries::default();
        for frame in &self.frames {
            match signal.decode(&frame.data) {
                Ok(value) => {
                    series.times.push(frame.timestamp);
                    series.values.push(value);
                }
                Err(_) => series.skipped += 1,
            }
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::number::Number;

    fn build_test_trace() -> TraceData {
        TraceData {
            message: "EEC1".into(),
            selection: TraceSelection::default(),
            frames: vec![
                Frame {
                    timestamp: 0.2,
                    data: vec![0x10, 0x00],
                },
                Frame {
                    timestamp: 0.1,
                    data: vec![0x20],
                },
                Frame {
                    timestamp: 0.3,
                    data: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_to_title() {
        let mut trace: TraceData = build_test_trace();
        assert_eq!(trace.to_title(), "");

        trace.selection = TraceSelection {
            source: Some(0x0B),
            destination: Some(0xFF),
            channel: Some(2),
        };
        assert_eq!(trace.to_title(), "(SA:B DA:FF CAN:2)");

        trace.selection.destination = None;
        assert_eq!(trace.to_title(), "(SA:B CAN:2)");
    }

    #[test]
    fn test_sort_by_time() {
        let mut trace: TraceData = build_test_trace();
        trace.sort_by_time();
        let times: Vec<f64> = trace.frames.iter().map(|f| f.timestamp).collect();
        assert_eq!(times, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_signal_series_skips_short_frames() {
        let trace: TraceData = build_test_trace();
        let sig = Signal {
            name: "Load".into(),
            length: 8,
            factor: Number::Int(2),
            ..Default::default()
        };
        let series = trace.signal_series(&sig);
        assert_eq!(series.times, vec![0.2, 0.1]);
        assert_eq!(series.values, vec![32.0, 64.0]);
        assert_eq!(series.skipped, 1);
    }
}
