//! Per-record decoders of the DBC grammar.
//!
//! Each `xx_` module decodes one record keyword from a [`lines::LogicalLine`].

pub(crate) mod attributes;
pub(crate) mod bo_;
pub(crate) mod lines;
pub(crate) mod sg_;
pub(crate) mod strings;
pub(crate) mod val_;
