use std::io;
use thiserror::Error;

/// Errors produced while parsing DBC text or loading `.dbc` files.
///
/// Any of these aborts the whole parse; no partial database is returned.
/// `line` is the 1-based physical line where the offending logical line starts.
#[derive(Debug, Error)]
pub enum DbcParseError {
    #[error("Not a valid .dbc file: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to list directory '{path}'. \nError: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Malformed schema at line {line}: {reason}")]
    MalformedSchema { line: usize, reason: String },
    #[error("Unresolved reference at line {line}: {reference}")]
    UnresolvedReference { line: usize, reference: String },
    #[error("Attribute '{attribute}' already has a default value (line {line})")]
    DuplicateDefault { line: usize, attribute: String },
}

impl DbcParseError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        DbcParseError::MalformedSchema {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors produced while saving a `Database` into a `.dbc` file.
#[derive(Debug, Error)]
pub enum DbcSaveError {
    #[error("Output path must end in .dbc: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to create '{path}'. \nError: {source}")]
    CreateFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create directories for '{path}'. \nError: {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while writing '{path}'. \nError: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Errors produced while decoding one signal out of one payload.
///
/// These are local to the call: the database and any aggregated trace stay valid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Signal '{signal}' needs {needed} bytes, payload has {available}")]
    InsufficientData {
        signal: String,
        needed: usize,
        available: usize,
    },
    #[error("Signal '{signal}' uses big-endian (Motorola) bit order, which is not supported")]
    UnsupportedBitOrder { signal: String },
    #[error(
        "Out of bounds! \nSignal '{signal}' end bit = {end_bit} \nMessage total bits = {total_bits}"
    )]
    SignalOutOfBounds {
        signal: String,
        end_bit: usize,
        total_bits: usize,
    },
    #[error("Signal '{signal}' not found in message '{message}'")]
    SignalNotFound { message: String, signal: String },
}

/// Errors returned by a key resolver asked to pick one address or channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No candidates to choose from")]
    NoCandidates,
    #[error("Cannot decide which {kind} to use")]
    Undecided { kind: String },
    #[error("{kind} {key} is not one of the candidates")]
    NotACandidate { kind: String, key: u8 },
}

/// Errors returned by trace queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("Message '{message}' not found")]
    NotFound { message: String },
    #[error("Message '{message}' has no recorded frames")]
    NoFrames { message: String },
    #[error("{kind} {key} was never recorded for this message")]
    UnknownKey { kind: String, key: u8 },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors returned while extracting DM01 trouble-code lamp traces.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DtcError {
    #[error("No '{message}' message definition found")]
    NotFound { message: String },
    #[error("Unsupported DTC frame format, missing signals: {missing:?}")]
    MissingSignals { missing: Vec<String> },
    #[error(transparent)]
    Trace(#[from] TraceError),
}
