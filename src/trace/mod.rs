//! # trace
//!
//! Address-based aggregation of CAN frames per message definition.
//!
//! Frames arrive from an external log reader as [`RawFrame`]s inside an
//! [`IngestSession`]. Each frame is classified (PGN, source, destination),
//! matched against the message catalogue by canonical PGN and appended to that
//! message's [`MessageLog`]. Queries ([`TraceAggregator::get_trace`]) flatten
//! one source/destination/channel partition into a [`TraceData`], asking a
//! [`KeyResolver`] whenever a level holds more than one key.

pub mod resolver;

use log::{debug, trace, warn};
use std::collections::{BTreeMap, HashSet};

use crate::config::AggregatorConfig;
use crate::j1939::{self, CanId, Classification};
use crate::types::{
    database::Database,
    errors::{ResolveError, TraceError},
    message::Message,
    msglog::{Frame, MessageLog},
    trace_data::{TraceData, TraceSelection},
};

pub use resolver::{FirstCandidate, KeyKind, KeyResolver, NoResolver, PreferredKeys};

/// Identifier of an incoming frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameId {
    /// Arbitration identifier, classified with [`j1939::classify`].
    Can(CanId),
    /// Addresses already decoded by the log reader.
    Addressed {
        pgn: u32,
        source: u8,
        destination: Option<u8>,
    },
}

/// One record handed over by the log reader.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Seconds from the session zero point (see [`SessionClock`](crate::types::abs_time::SessionClock)).
    pub timestamp: f64,
    pub data: Vec<u8>,
    pub id: FrameId,
    pub channel: u8,
}

/// Ingestion counters, cumulative over all sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Frames appended to a message log.
    pub accepted: usize,
    /// Frames whose PGN matched no message.
    pub unknown: usize,
    /// Frames dropped by the channel filter.
    pub filtered: usize,
    /// Linear scans of the message catalogue.
    pub catalogue_scans: usize,
}

#[derive(Debug, Clone)]
struct MessageEntry {
    message: Message,
    /// Canonical PGN frames are matched against.
    pgn: u32,
    log: MessageLog,
}

/// Frame index over a message catalogue.
#[derive(Debug, Clone)]
pub struct TraceAggregator {
    config: AggregatorConfig,
    entries: Vec<MessageEntry>,
    stats: IngestStats,
}

impl TraceAggregator {
    /// Aggregator over the messages of `db`, with empty logs.
    pub fn new(db: &Database, config: AggregatorConfig) -> Self {
        let mut aggregator = TraceAggregator {
            config,
            entries: Vec::new(),
            stats: IngestStats::default(),
        };
        aggregator.extend_catalogue(db);
        aggregator
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Adds the messages of `db` to the catalogue. Existing logs are kept;
    /// when two messages share a PGN the one added first receives the frames.
    pub fn extend_catalogue(&mut self, db: &Database) {
        for message in db.iter_messages() {
            let class: Classification = j1939::classify(message.can_id(), self.config.pgn_with_priority);
            self.entries.push(MessageEntry {
                message: message.clone(),
                pgn: class.pgn,
                log: MessageLog::new(class.is_pdu1),
            });
        }
    }

    /// Opens an ingestion session with an empty unknown-PGN cache.
    pub fn begin_session(&mut self) -> IngestSession<'_> {
        IngestSession {
            aggregator: self,
            unknown_pgns: HashSet::new(),
            filtered_channels: HashSet::new(),
        }
    }

    /// Ingests every frame of `frames` in one session.
    pub fn ingest_all(&mut self, frames: impl IntoIterator<Item = RawFrame>) {
        let mut session: IngestSession<'_> = self.begin_session();
        for frame in frames {
            session.ingest(frame);
        }
    }

    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.find_entry(name).map(|entry| &entry.message)
    }

    /// Recorded frames of the message named `name`.
    pub fn message_log(&self, name: &str) -> Option<&MessageLog> {
        self.find_entry(name).map(|entry| &entry.log)
    }

    /// Messages with at least one recorded frame, in catalogue order.
    pub fn non_empty_messages(&self) -> Vec<&Message> {
        self.entries
            .iter()
            .filter(|entry| !entry.log.is_empty())
            .map(|entry| &entry.message)
            .collect()
    }

    /// Messages for which `source` sent at least one frame.
    pub fn messages_touching(&self, source: u8) -> Vec<&Message> {
        self.entries
            .iter()
            .filter(|entry| entry.log.has_source(source))
            .map(|entry| &entry.message)
            .collect()
    }

    /// Flattens the frames of `name` for one destination/source/channel.
    ///
    /// At each level with a single key that key is used and left unset in the
    /// result's selection. With several keys the key comes from `prior` when it
    /// sets that level, otherwise from `resolver`.
    ///
    /// # Errors
    /// - [`TraceError::NotFound`] for an unknown message name.
    /// - [`TraceError::NoFrames`] when the message was never recorded.
    /// - [`TraceError::UnknownKey`] when `prior` names a key that was not recorded.
    /// - [`TraceError::Resolve`] when the resolver fails or picks a non-candidate.
    pub fn get_trace(
        &self,
        name: &str,
        prior: Option<&TraceSelection>,
        resolver: &mut dyn KeyResolver,
    ) -> Result<TraceData, TraceError> {
        let entry: &MessageEntry = self.find_entry(name).ok_or_else(|| TraceError::NotFound {
            message: name.to_string(),
        })?;
        if entry.log.is_empty() {
            return Err(TraceError::NoFrames {
                message: name.to_string(),
            });
        }

        let prior: TraceSelection = prior.copied().unwrap_or_default();
        let mut selection = TraceSelection::default();

        let sources = match &entry.log {
            MessageLog::Broadcast(sources) => sources,
            MessageLog::DestinationSpecific(destinations) => {
                let (da, chosen) = select_key(destinations, KeyKind::Destination, name, prior.destination, resolver)?;
                selection.destination = chosen;
                destinations
                    .get(&da)
                    .map(|d| d.source_map())
                    .ok_or_else(|| no_frames(name))?
            }
        };

        let (sa, chosen) = select_key(sources, KeyKind::Source, name, prior.source, resolver)?;
        selection.source = chosen;
        let channels = sources.get(&sa).map(|s| s.channel_map()).ok_or_else(|| no_frames(name))?;

        let (can, chosen) = select_key(channels, KeyKind::Channel, name, prior.channel, resolver)?;
        selection.channel = chosen;
        let frames: Vec<Frame> = channels.get(&can).cloned().unwrap_or_default();

        Ok(TraceData {
            message: name.to_string(),
            selection,
            frames,
        })
    }

    fn find_entry(&self, name: &str) -> Option<&MessageEntry> {
        self.entries.iter().find(|entry| entry.message.name == name)
    }
}

fn no_frames(name: &str) -> TraceError {
    TraceError::NoFrames {
        message: name.to_string(),
    }
}

/// Picks the key of one partition level.
///
/// Returns the key and, when the level was ambiguous, the key again for the selection.
fn select_key<V>(
    map: &BTreeMap<u8, V>,
    kind: KeyKind,
    message: &str,
    prior: Option<u8>,
    resolver: &mut dyn KeyResolver,
) -> Result<(u8, Option<u8>), TraceError> {
    let keys: Vec<u8> = map.keys().copied().collect();
    match keys.as_slice() {
        [] => Err(no_frames(message)),
        [only] => Ok((*only, None)),
        _ => {
            if let Some(key) = prior {
                if !map.contains_key(&key) {
                    return Err(TraceError::UnknownKey {
                        kind: kind.to_string(),
                        key,
                    });
                }
                return Ok((key, Some(key)));
            }
            let key: u8 = resolver.choose(kind, message, &keys)?;
            if !map.contains_key(&key) {
                return Err(ResolveError::NotACandidate {
                    kind: kind.to_string(),
                    key,
                }
                .into());
            }
            Ok((key, Some(key)))
        }
    }
}

/// One pass of frames from a log reader.
///
/// PGNs that matched no message are remembered for the lifetime of the
/// session, so later frames with the same PGN skip the catalogue scan.
pub struct IngestSession<'a> {
    aggregator: &'a mut TraceAggregator,
    unknown_pgns: HashSet<u32>,
    filtered_channels: HashSet<u8>,
}

impl IngestSession<'_> {
    pub fn ingest(&mut self, frame: RawFrame) {
        let agg: &mut TraceAggregator = &mut *self.aggregator;

        if !agg.config.accepts_channel(frame.channel) {
            agg.stats.filtered += 1;
            if self.filtered_channels.insert(frame.channel) {
                warn!("Ignoring frames from channel {} (not in channel filter)", frame.channel);
            }
            return;
        }

        let class: Classification = match frame.id {
            FrameId::Can(id) => j1939::classify(id, agg.config.pgn_with_priority),
            FrameId::Addressed {
                pgn,
                source,
                destination,
            } => Classification::from_addresses(pgn, source, destination),
        };

        if self.unknown_pgns.contains(&class.pgn) {
            agg.stats.unknown += 1;
            return;
        }

        agg.stats.catalogue_scans += 1;
        let Some(index) = agg.entries.iter().position(|e| e.pgn == class.pgn) else {
            debug!("Unknown PGN 0x{:X} (SA 0x{:02X})", class.pgn, class.source_address);
            self.unknown_pgns.insert(class.pgn);
            agg.stats.unknown += 1;
            return;
        };
        let entry: &mut MessageEntry = &mut agg.entries[index];

        trace!(
            "{} t={:.6} SA 0x{:02X} DA {:?} CAN {}",
            entry.message.name, frame.timestamp, class.source_address, class.destination_address, frame.channel
        );
        entry.log.add_frame(
            Frame {
                timestamp: frame.timestamp,
                data: frame.data,
            },
            class.destination_address,
            class.source_address,
            frame.channel,
        );
        agg.stats.accepted += 1;
    }

    /// PGNs seen in this session that matched no message.
    pub fn unknown_pgns(&self) -> impl Iterator<Item = u32> + '_ {
        self.unknown_pgns.iter().copied()
    }
}
