//! # j1939
//!
//! Address model for 29-bit (extended) CAN identifiers following SAE J1939.
//!
//! An extended identifier is laid out as
//! `priority(3) | EDP(1) | DP(1) | PF(8) | PS(8) | SA(8)`.
//! When the PDU Format byte (`PF`) is below 240 the message is *PDU1*:
//! `PS` carries the destination address and is not part of the message identity.
//! Otherwise (*PDU2*) the message is broadcast and `PS` is a group extension.
//!
//! Standard (11-bit) identifiers have no addressing; they are used as their own PGN
//! with the synthetic source address [`STANDARD_SOURCE_ADDRESS`].

use serde::{Deserialize, Serialize};

/// Bit set on DBC message ids that denote a 29-bit identifier.
pub const EXTENDED_ID_FLAG: u32 = 0x8000_0000;
/// Source address reported for standard identifiers.
pub const STANDARD_SOURCE_ADDRESS: u8 = 0xFE;
/// First PDU Format value of the broadcast (PDU2) range.
pub const PDU2_FORMAT_START: u8 = 240;

const EXTENDED_ID_MASK: u32 = 0x1FFF_FFFF;
const PGN_WITH_PRIORITY_MASK: u32 = 0x1F_FFFF;
const PGN_MASK: u32 = 0x3_FFFF;
const PDU1_CANONICAL_MASK: u32 = 0x1F_FF00;

/// CAN arbitration identifier with its format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanId {
    Standard(u32),
    Extended(u32),
}

impl CanId {
    /// Interprets a DBC `BO_` identifier, where bit 31 flags the extended format.
    pub fn from_dbc(raw: u32) -> Self {
        if raw & EXTENDED_ID_FLAG != 0 {
            CanId::Extended(raw & EXTENDED_ID_MASK)
        } else {
            CanId::Standard(raw)
        }
    }

    /// Identifier as seen on the bus (no format flag).
    pub fn raw(&self) -> u32 {
        match *self {
            CanId::Standard(id) | CanId::Extended(id) => id,
        }
    }

    /// Identifier as written in a DBC file.
    pub fn to_dbc(&self) -> u32 {
        match *self {
            CanId::Standard(id) => id,
            CanId::Extended(id) => id | EXTENDED_ID_FLAG,
        }
    }
}

/// Source address: the low byte of the identifier.
pub fn source_address(id: u32) -> u8 {
    (id & 0xFF) as u8
}

/// Parameter Group Number of an extended identifier.
///
/// With `with_priority` the three priority bits are kept above the 18-bit PGN.
pub fn pgn(id: u32, with_priority: bool) -> u32 {
    if with_priority {
        (id >> 8) & PGN_WITH_PRIORITY_MASK
    } else {
        (id >> 8) & PGN_MASK
    }
}

/// PDU Format byte.
pub fn pdu_format(id: u32) -> u8 {
    ((id >> 16) & 0xFF) as u8
}

/// `true` when the identifier is destination specific (PF < 240).
pub fn is_pdu1(id: u32) -> bool {
    pdu_format(id) < PDU2_FORMAT_START
}

/// PGN stored on a parsed message: priority-inclusive PGN for extended ids,
/// the identifier itself for standard ones.
pub fn dbc_pgn(raw_dbc_id: u32) -> u32 {
    match CanId::from_dbc(raw_dbc_id) {
        CanId::Extended(id) => pgn(id, true),
        CanId::Standard(id) => id,
    }
}

/// Addressing fields of one identifier.
///
/// `pgn` is canonical: for PDU1 messages the destination byte is cleared so every
/// destination variant of a message maps to the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    pub pgn: u32,
    pub source_address: u8,
    pub destination_address: Option<u8>,
    pub is_pdu1: bool,
}

impl Classification {
    /// Builds a classification from addresses decoded upstream.
    ///
    /// A destination marks the PGN as PDU1 and is cleared from it.
    pub fn from_addresses(pgn: u32, source_address: u8, destination_address: Option<u8>) -> Self {
        match destination_address {
            Some(da) => Classification {
                pgn: pgn & PDU1_CANONICAL_MASK,
                source_address,
                destination_address: Some(da),
                is_pdu1: true,
            },
            None => Classification {
                pgn,
                source_address,
                destination_address: None,
                is_pdu1: false,
            },
        }
    }
}

/// Splits an identifier into canonical PGN, source and destination.
pub fn classify(id: CanId, with_priority: bool) -> Classification {
    match id {
        CanId::Standard(id) => Classification {
            pgn: id,
            source_address: STANDARD_SOURCE_ADDRESS,
            destination_address: None,
            is_pdu1: false,
        },
        CanId::Extended(id) => {
            let group: u32 = pgn(id, with_priority);
            let sa: u8 = source_address(id);
            if is_pdu1(id) {
                Classification::from_addresses(group, sa, Some((group & 0xFF) as u8))
            } else {
                Classification::from_addresses(group, sa, None)
            }
        }
    }
}
