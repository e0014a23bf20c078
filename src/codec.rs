//! # codec
//!
//! Bit-level extraction of signal values out of a frame payload.
//!
//! Only little-endian ("Intel", `@1`) signals are decoded. A big-endian signal
//! fails with [`CodecError::UnsupportedBitOrder`] instead of yielding a guess.
//! Min/max bounds on the signal are metadata only and are never applied here.

use crate::types::{
    errors::CodecError,
    signal::{ByteOrder, Signal},
};

/// Extracts the raw integer of `signal` from `bytes`.
///
/// The inclusive byte range `[start_bit/8, (start_bit+length-1)/8]` is read as an
/// unsigned little-endian integer, shifted right by `start_bit % 8` and masked to
/// `length` bits. Signed signals are then sign-extended (two's complement on
/// `length` bits).
pub fn extract_raw(bytes: &[u8], signal: &Signal) -> Result<i128, CodecError> {
    let (first, last) = signal.byte_range();
    if last >= bytes.len() {
        return Err(CodecError::InsufficientData {
            signal: signal.name.clone(),
            needed: last + 1,
            available: bytes.len(),
        });
    }
    if signal.byte_order == ByteOrder::Motorola {
        return Err(CodecError::UnsupportedBitOrder {
            signal: signal.name.clone(),
        });
    }

    // At most 9 bytes (7 bits of shift + 64 bits of signal), fits in u128.
    let mut acc: u128 = 0;
    for (i, &b) in bytes[first..=last].iter().enumerate() {
        acc |= (b as u128) << (8 * i);
    }

    let length: u32 = signal.length.clamp(1, 64) as u32;
    let mask: u128 = (1u128 << length) - 1;
    let value: u128 = (acc >> (signal.start_bit % 8)) & mask;

    if signal.signed && value & (1u128 << (length - 1)) != 0 {
        Ok(value as i128 - (1i128 << length))
    } else {
        Ok(value as i128)
    }
}

/// Decodes `signal` from `bytes` and applies `raw * factor + offset`.
pub fn decode(bytes: &[u8], signal: &Signal) -> Result<f64, CodecError> {
    let raw: i128 = extract_raw(bytes, signal)?;
    Ok(raw as f64 * signal.factor.as_f64() + signal.offset.as_f64())
}

/// Value-table label of the raw value of `signal` in `bytes`.
pub fn decode_label<'s>(bytes: &[u8], signal: &'s Signal) -> Result<Option<&'s str>, CodecError> {
    let raw: i128 = extract_raw(bytes, signal)?;
    Ok(i64::try_from(raw).ok().and_then(|r| signal.label_for(r)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{number::Number, signal::ValueTable};

    fn sig(start_bit: u16, length: u16, signed: bool) -> Signal {
        Signal {
            name: "Test".into(),
            start_bit,
            length,
            signed,
            factor: Number::Int(1),
            offset: Number::Int(0),
            ..Default::default()
        }
    }

    #[test]
    fn unsigned_byte() {
        assert_eq!(decode(&[0x05, 0x00], &sig(0, 8, false)).unwrap(), 5.0);
    }

    #[test]
    fn signed_all_ones_is_minus_one() {
        assert_eq!(decode(&[0xFF], &sig(0, 8, true)).unwrap(), -1.0);
        assert_eq!(decode(&[0xFF], &sig(0, 8, false)).unwrap(), 255.0);
    }

    #[test]
    fn signed_positive_stays_positive() {
        assert_eq!(decode(&[0x7F], &sig(0, 8, true)).unwrap(), 127.0);
        assert_eq!(decode(&[0x80], &sig(0, 8, true)).unwrap(), -128.0);
    }

    #[test]
    fn unaligned_cross_byte() {
        // bits 4..15 = 0xFFF
        assert_eq!(extract_raw(&[0xF0, 0xFF], &sig(4, 12, false)).unwrap(), 0xFFF);
        assert_eq!(extract_raw(&[0xF0, 0xFF], &sig(4, 12, true)).unwrap(), -1);
        // bits 6..9 = 0b1001
        assert_eq!(extract_raw(&[0b0100_0000, 0b0000_0010], &sig(6, 4, false)).unwrap(), 0b1001);
    }

    #[test]
    fn full_width_signal() {
        let payload = [0xFF; 8];
        assert_eq!(extract_raw(&payload, &sig(0, 64, false)).unwrap(), u64::MAX as i128);
        assert_eq!(extract_raw(&payload, &sig(0, 64, true)).unwrap(), -1);
    }

    #[test]
    fn scaling() {
        let mut s: Signal = sig(0, 8, false);
        s.factor = Number::Float(0.5);
        s.offset = Number::Int(10);
        assert_eq!(decode(&[20], &s).unwrap(), 20.0);
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        let mut s: Signal = sig(0, 8, false);
        s.max = Number::Int(100);
        assert_eq!(decode(&[200], &s).unwrap(), 200.0);
    }

    #[test]
    fn insufficient_data() {
        let err = decode(&[0, 1, 2, 3], &sig(56, 8, false)).unwrap_err();
        assert_eq!(
            err,
            CodecError::InsufficientData {
                signal: "Test".into(),
                needed: 8,
                available: 4
            }
        );
    }

    #[test]
    fn motorola_is_rejected() {
        let mut s: Signal = sig(0, 8, false);
        s.byte_order = ByteOrder::Motorola;
        assert_eq!(
            decode(&[0x01], &s).unwrap_err(),
            CodecError::UnsupportedBitOrder {
                signal: "Test".into()
            }
        );
    }

    #[test]
    fn label_lookup() {
        let mut s: Signal = sig(0, 2, false);
        s.value_table = Some(ValueTable::from_iter([
            (0, "Off".to_string()),
            (1, "On".to_string()),
        ]));
        assert_eq!(decode_label(&[0x01], &s).unwrap(), Some("On"));
        assert_eq!(decode_label(&[0x03], &s).unwrap(), None);
    }
}
