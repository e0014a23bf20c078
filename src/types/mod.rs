//! # types
//!
//! `types` holds the public value types of the crate: the schema model
//! ([`database::Database`] and what it owns), the errors, and the frame
//! storage of the trace aggregator.

pub mod attributes;
pub mod comment;
pub mod database;
pub mod errors;
pub mod message;
pub mod namespace;
pub mod number;
pub mod signal;

#[cfg(feature = "trace")]
pub mod abs_time;
#[cfg(feature = "trace")]
pub mod msglog;
#[cfg(feature = "trace")]
pub mod trace_data;
