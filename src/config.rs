//! Options for schema parsing and trace aggregation.
//!
//! Both structs deserialize from partial documents: missing fields take their
//! defaults.

use serde::{Deserialize, Serialize};

/// Schema parser options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Fail with `UnresolvedReference` on a `BA_DEF_DEF_`/`BA_` line whose
    /// attribute has no preceding `BA_DEF_`, instead of dropping the line.
    #[serde(default)]
    pub strict_attribute_owners: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: reject attribute records without a definition
    pub fn with_strict_attribute_owners(mut self, strict: bool) -> Self {
        self.strict_attribute_owners = strict;
        self
    }
}

/// Trace aggregator options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Keep the three priority bits in PGN keys (messages and frames alike)
    #[serde(default = "default_true")]
    pub pgn_with_priority: bool,

    /// Optional: only ingest frames from these channels
    #[serde(default)]
    pub channel_filter: Option<Vec<u8>>,
}

fn default_true() -> bool {
    true
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfig {
            pgn_with_priority: true,
            channel_filter: None,
        }
    }
}

impl AggregatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: include or strip priority bits in PGN keys
    pub fn with_pgn_priority(mut self, enabled: bool) -> Self {
        self.pgn_with_priority = enabled;
        self
    }

    /// Builder method: restrict ingestion to the given channels
    pub fn with_channel_filter(mut self, channels: Vec<u8>) -> Self {
        self.channel_filter = Some(channels);
        self
    }

    /// `true` when frames from `channel` should be ingested.
    pub fn accepts_channel(&self, channel: u8) -> bool {
        self.channel_filter
            .as_ref()
            .is_none_or(|channels| channels.contains(&channel))
    }
}
