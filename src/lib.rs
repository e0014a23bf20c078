//! # can_trace
//!
//! Rust utilities for **DBC** schemas and **J1939** CAN traces.
//!
//! ## Highlights
//! - **DBC parser**: load a schema from text, a `.dbc` file or a directory of them
//!   into an ordered, SlotMap-backed [`Database`] ([`from_dbc_str`], [`from_dbc_file`], [`from_dbc_dir`]).
//! - **DBC writer**: [`to_dbc_string`] / [`save_to_file`] produce text that parses back to the same database.
//! - **Signal codec**: little-endian extraction with sign extension and `factor`/`offset` scaling ([`codec`]).
//! - **J1939 addressing**: PGN, source and destination of an identifier ([`j1939`]).
//! - **Trace aggregation** (feature `trace`): frames indexed by message, destination,
//!   source and channel, queried through a caller-supplied [`KeyResolver`].
//! - **DM01**: lamp states of one active trouble code over time ([`dtc`]).
//!

pub mod codec;
pub mod config;
pub(crate) mod core;
pub mod j1939;
pub mod parse;
pub mod save;
#[doc(hidden)]
pub mod types;

#[cfg(feature = "trace")]
pub mod dtc;
#[cfg(feature = "trace")]
pub mod trace;

// Top-level re-exports (appear under Crate Items)
#[doc(inline)]
pub use crate::types::{
    attributes::{AttrTarget, AttrValueType, Attribute, AttributeValue},
    comment::Comment,
    database::{Database, MessageKey},
    errors::{CodecError, DbcParseError, DbcSaveError},
    message::Message,
    number::Number,
    signal::{ByteOrder, Signal, ValueTable},
};

#[cfg(feature = "trace")]
#[doc(inline)]
pub use crate::types::{
    abs_time::SessionClock,
    errors::{DtcError, ResolveError, TraceError},
    msglog::{Frame, MessageLog},
    trace_data::{SignalSeries, TraceData, TraceSelection},
};

pub use crate::config::{AggregatorConfig, ParseOptions};
pub use crate::parse::{from_dbc_dir, from_dbc_file, from_dbc_str};
pub use crate::save::{save_to_file, to_dbc_string};

#[cfg(feature = "trace")]
pub use crate::trace::{FrameId, IngestSession, KeyResolver, RawFrame, TraceAggregator};
