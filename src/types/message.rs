use serde::{Deserialize, Serialize};

use crate::j1939::{self, CanId};
use crate::types::{errors::CodecError, signal::Signal};

/// CAN message defined by a `BO_` block.
///
/// `id` is the raw identifier exactly as written in the DBC, including the
/// bit-31 flag that marks a 29-bit identifier. `pgn` is derived from it once at
/// parse time (see [`j1939::dbc_pgn`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u32,
    pub name: String,
    /// Payload length in bytes.
    pub dlc: u16,
    pub pgn: u32,
    /// Transmitter token of the `BO_` line (`Vector__XXX` when unknown).
    pub transmitter: String,
    pub signals: Vec<Signal>,
}

impl Message {
    pub fn new(id: u32, name: impl Into<String>, dlc: u16, transmitter: impl Into<String>) -> Self {
        Message {
            id,
            name: name.into(),
            dlc,
            pgn: j1939::dbc_pgn(id),
            transmitter: transmitter.into(),
            signals: Vec::new(),
        }
    }

    /// Identifier with the extended flag interpreted.
    pub fn can_id(&self) -> CanId {
        CanId::from_dbc(self.id)
    }

    pub fn is_pdu1(&self) -> bool {
        match self.can_id() {
            CanId::Extended(id) => j1939::is_pdu1(id),
            CanId::Standard(_) => false,
        }
    }

    /// Normalized hexadecimal identifier without the extended flag (`"0x18FEF100"`).
    pub fn id_hex(&self) -> String {
        format!("0x{:X}", self.can_id().raw())
    }

    /// Finds a signal by exact name.
    pub fn get_signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|sig| sig.name == name)
    }

    pub(crate) fn get_signal_mut(&mut self, name: &str) -> Option<&mut Signal> {
        self.signals.iter_mut().find(|sig| sig.name == name)
    }

    /// Checks that every signal fits into `8 * dlc` bits.
    ///
    /// The parser does not enforce this because the DLC may be revised after parsing.
    pub fn validate_layout(&self) -> Result<(), CodecError> {
        self.signals.iter().try_for_each(|sig| self.check_fits(sig))
    }

    fn check_fits(&self, sig: &Signal) -> Result<(), CodecError> {
        let total_bits: usize = self.dlc as usize * 8;
        let end: usize = sig.start_bit as usize + sig.length as usize;
        if end > total_bits {
            return Err(CodecError::SignalOutOfBounds {
                signal: sig.name.clone(),
                end_bit: end,
                total_bits,
            });
        }
        Ok(())
    }

    /// Looks up `signal` by name, checks it against the DLC and decodes it from `bytes`.
    pub fn decode_signal(&self, signal: &str, bytes: &[u8]) -> Result<f64, CodecError> {
        let sig: &Signal = self
            .get_signal(signal)
            .ok_or_else(|| CodecError::SignalNotFound {
                message: self.name.clone(),
                signal: signal.to_string(),
            })?;
        self.check_fits(sig)?;
        sig.decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::number::Number;

    fn build_test_message() -> Message {
        let mut msg = Message::new(0x98FEF100, "CCVS", 8, "Vector__XXX");
        msg.signals.push(Signal {
            name: "WheelSpeed".into(),
            start_bit: 8,
            length: 16,
            factor: Number::Float(0.00390625),
            ..Default::default()
        });
        msg.signals.push(Signal {
            name: "Brake".into(),
            start_bit: 60,
            length: 2,
            factor: Number::Int(1),
            ..Default::default()
        });
        msg
    }

    #[test]
    fn test_new_derives_pgn() {
        let msg: Message = build_test_message();
        assert_eq!(msg.can_id(), CanId::Extended(0x18FEF100));
        assert_eq!(msg.pgn, 0x18FEF1);
        assert_eq!(msg.id_hex(), "0x18FEF100");
        assert!(!msg.is_pdu1());
    }

    #[test]
    fn test_get_signal() {
        let msg: Message = build_test_message();
        assert!(msg.get_signal("Brake").is_some());
        assert!(msg.get_signal("brake").is_none());
    }

    #[test]
    fn test_validate_layout() {
        let mut msg: Message = build_test_message();
        assert!(msg.validate_layout().is_ok());

        msg.dlc = 4;
        let err = msg.validate_layout().unwrap_err();
        assert_eq!(
            err,
            CodecError::SignalOutOfBounds {
                signal: "Brake".into(),
                end_bit: 62,
                total_bits: 32
            }
        );
    }

    #[test]
    fn test_decode_signal() {
        let msg: Message = build_test_message();
        let payload = [0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x20];
        assert_eq!(msg.decode_signal("WheelSpeed", &payload).unwrap(), 1.0);
        assert_eq!(msg.decode_signal("Brake", &payload).unwrap(), 2.0);
        assert!(matches!(
            msg.decode_signal("Missing", &payload),
            Err(CodecError::SignalNotFound { .. })
        ));
    }

    #[test]
    fn test_decode_signal_checks_layout_against_dlc() {
        let mut msg: Message = build_test_message();
        msg.dlc = 4;
        let payload = [0u8; 8];
        // payload is long enough, the declared DLC is not
        assert_eq!(
            msg.decode_signal("Brake", &payload),
            Err(CodecError::SignalOutOfBounds {
                signal: "Brake".into(),
                end_bit: 62,
                total_bits: 32,
            })
        );
        assert_eq!(msg.decode_signal("Brake", &payload), msg.validate_layout().map(|()| 0.0));
        assert_eq!(msg.decode_signal("WheelSpeed", &payload).unwrap(), 0.0);
    }
}
