//! Frame storage of the trace aggregator.
//!
//! Frames of one message are partitioned by address and channel:
//! - [`MessageLog::Broadcast`]: source address → [`MsgSource`]
//! - [`MessageLog::DestinationSpecific`]: destination → [`MsgDestination`] → source → [`MsgSource`]
//!
//! [`MsgSource`] splits its frames by channel, in arrival order. Frames are only
//! appended; callers that need time order sort a [`TraceData`](crate::types::trace_data::TraceData).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Destination used when a frame for a destination-specific message has none.
pub const GLOBAL_ADDRESS: u8 = 0xFF;

/// One recorded payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds from the session zero point.
    pub timestamp: f64,
    pub data: Vec<u8>,
}

/// Frames sent by one source address, per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsgSource {
    pub address: u8,
    channels: BTreeMap<u8, Vec<Frame>>,
}

impl MsgSource {
    pub fn new(address: u8) -> Self {
        MsgSource {
            address,
            channels: BTreeMap::new(),
        }
    }

    pub fn add_frame(&mut self, frame: Frame, channel: u8) {
        self.channels.entry(channel).or_default().push(frame);
    }

    /// Channels with at least one frame, ascending.
    pub fn channels(&self) -> impl Iterator<Item = u8> + '_ {
        self.channels.keys().copied()
    }

    pub fn frames(&self, channel: u8) -> Option<&[Frame]> {
        self.channels.get(&channel).map(Vec::as_slice)
    }

    pub(crate) fn channel_map(&self) -> &BTreeMap<u8, Vec<Frame>> {
        &self.channels
    }

    pub fn frame_count(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }
}

/// Sources that addressed one destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsgDestination {
    pub address: u8,
    sources: BTreeMap<u8, MsgSource>,
}

impl MsgDestination {
    pub fn new(address: u8) -> Self {
        MsgDestination {
            address,
            sources: BTreeMap::new(),
        }
    }

    pub fn add_frame(&mut self, frame: Frame, source: u8, channel: u8) {
        self.sources
            .entry(source)
            .or_insert_with(|| MsgSource::new(source))
            .add_frame(frame, channel);
    }

    pub fn has_source(&self, source: u8) -> bool {
        self.sources.contains_key(&source)
    }

    pub fn sources(&self) -> impl Iterator<Item = &MsgSource> + '_ {
        self.sources.values()
    }

    pub(crate) fn source_map(&self) -> &BTreeMap<u8, MsgSource> {
        &self.sources
    }
}

/// Recorded frames of one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageLog {
    Broadcast(BTreeMap<u8, MsgSource>),
    DestinationSpecific(BTreeMap<u8, MsgDestination>),
}

impl MessageLog {
    /// Empty log with the partitioning of a PDU1 (`destination_specific`) or broadcast message.
    pub fn new(destination_specific: bool) -> Self {
        if destination_specific {
            MessageLog::DestinationSpecific(BTreeMap::new())
        } else {
            MessageLog::Broadcast(BTreeMap::new())
        }
    }

    /// Routes a frame through destination (if applicable), source and channel.
    ///
    /// A broadcast log ignores `destination`; a destination-specific log files a
    /// frame without destination under [`GLOBAL_ADDRESS`].
    pub fn add_frame(&mut self, frame: Frame, destination: Option<u8>, source: u8, channel: u8) {
        match self {
            MessageLog::Broadcast(sources) => sources
                .entry(source)
                .or_insert_with(|| MsgSource::new(source))
                .add_frame(frame, channel),
            MessageLog::DestinationSpecific(destinations) => {
                let da: u8 = destination.unwrap_or(GLOBAL_ADDRESS);
                destinations
                    .entry(da)
                    .or_insert_with(|| MsgDestination::new(da))
                    .add_frame(frame, source, channel)
            }
        }
    }

    pub fn is_destination_specific(&self) -> bool {
        matches!(self, MessageLog::DestinationSpecific(_))
    }

    /// `true` when `source` sent at least one frame of this message.
    pub fn has_source(&self, source: u8) -> bool {
        match self {
            MessageLog::Broadcast(sources) => sources.contains_key(&source),
            MessageLog::DestinationSpecific(destinations) => {
                destinations.values().any(|d| d.has_source(source))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageLog::Broadcast(sources) => sources.is_empty(),
            MessageLog::DestinationSpecific(destinations) => destinations.is_empty(),
        }
    }

    pub fn frame_count(&self) -> usize {
        match self {
            MessageLog::Broadcast(sources) => sources.values().map(MsgSource::frame_count).sum(),
            MessageLog::DestinationSpecific(destinations) => destinations
                .values()
                .flat_map(MsgDestination::sources)
                .map(MsgSource::frame_count)
                .sum(),
        }
    }
}
