use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::codec;
use crate::types::{errors::CodecError, number::Number};

/// Placeholder node token written where a DBC record needs a node name.
pub const DUMMY_NODE: &str = "Vector__XXX";

/// Bit numbering convention of a signal (`@1` / `@0` in a `SG_` line).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    /// `@1`, little-endian.
    #[default]
    Intel,
    /// `@0`, big-endian.
    Motorola,
}

impl ByteOrder {
    /// Maps the DBC order character; anything but `0`/`1` is rejected.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(ByteOrder::Intel),
            '0' => Some(ByteOrder::Motorola),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            ByteOrder::Intel => '1',
            ByteOrder::Motorola => '0',
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ByteOrder::Intel => "Intel",
            ByteOrder::Motorola => "Motorola",
        })
    }
}

/// Raw value to label mapping attached to one signal by a `VAL_` line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTable {
    entries: BTreeMap<i64, String>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a label, returning the label it replaced (if any).
    pub fn insert(&mut self, raw: i64, label: impl Into<String>) -> Option<String> {
        self.entries.insert(raw, label.into())
    }

    pub fn get(&self, raw: i64) -> Option<&str> {
        self.entries.get(&raw).map(String::as_str)
    }

    /// Entries in ascending raw-value order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(i64, String)> for ValueTable {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        ValueTable {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Signal definition parsed from a `SG_` line.
///
/// Immutable once parsed. `length` is always within `1..=64`. The multiplexer
/// tag is kept as the raw token (`M`, `m3`, ...) and is not interpreted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub multiplexer: Option<String>,
    /// Bit start in the payload (bit 0 = LSB of the first byte).
    pub start_bit: u16,
    /// Bit length.
    pub length: u16,
    pub byte_order: ByteOrder,
    pub signed: bool,
    pub factor: Number,
    pub offset: Number,
    /// Descriptive bounds only, the codec never clamps.
    pub min: Number,
    pub max: Number,
    pub unit: String,
    /// Receiver node tokens (`Vector__XXX` when nobody is named).
    pub receivers: Vec<String>,
    pub value_table: Option<ValueTable>,
}

impl Signal {
    /// Index of the last bit covered by the signal (little-endian numbering).
    pub fn end_bit(&self) -> usize {
        self.start_bit as usize + self.length.max(1) as usize - 1
    }

    /// Inclusive byte range `[start_bit/8, end_bit/8]` touched by the signal.
    pub fn byte_range(&self) -> (usize, usize) {
        (self.start_bit as usize / 8, self.end_bit() / 8)
    }

    /// Decodes and scales this signal out of `bytes`. See [`codec::decode`].
    pub fn decode(&self, bytes: &[u8]) -> Result<f64, CodecError> {
        codec::decode(bytes, self)
    }

    /// Label of the raw value in `bytes`, if the value table has one.
    pub fn decode_label(&self, bytes: &[u8]) -> Result<Option<&str>, CodecError> {
        codec::decode_label(bytes, self)
    }

    /// Label for an already extracted raw value.
    pub fn label_for(&self, raw: i64) -> Option<&str> {
        self.value_table.as_ref().and_then(|table| table.get(raw))
    }
}
