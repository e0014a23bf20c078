use crate::core::lines::LogicalLine;
use crate::types::{errors::DbcParseError, message::Message, signal::DUMMY_NODE};

/// Decodes a `BO_` line using `:` as separator between name and length.
/// Accepts both `BO_ 123 NAME: 8 Node` and `BO_ 123 NAME : 8 Node`.
pub(crate) fn decode(line: &LogicalLine) -> Result<Message, DbcParseError> {
    let err = |reason: &str| DbcParseError::malformed(line.number, reason);

    let after: &str = line
        .text
        .strip_prefix("BO_")
        .ok_or_else(|| err("expected BO_"))?
        .trim();

    let (id_str, rest) = after
        .split_once(char::is_whitespace)
        .ok_or_else(|| err("missing message name"))?;
    let id: u32 = id_str
        .parse()
        .map_err(|_| err("message id is not a decimal integer"))?;

    let (name, tail) = rest.split_once(':').ok_or_else(|| err("missing ':' after message name"))?;
    let name: &str = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(err("message name must be a single token"));
    }

    let mut it = tail.split_ascii_whitespace();
    let dlc: u16 = it
        .next()
        .ok_or_else(|| err("missing message length"))?
        .parse()
        .map_err(|_| err("message length is not a decimal integer"))?;
    let transmitter: &str = it.next().unwrap_or(DUMMY_NODE);

    Ok(Message::new(id, name, dlc, transmitter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> LogicalLine {
        LogicalLine {
            number: 7,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_decode_message() {
        let msg = decode(&line("BO_ 2566844926 CCVS1: 8 Vector__XXX")).unwrap();
        assert_eq!(msg.id, 2566844926);
        assert_eq!(msg.name, "CCVS1");
        assert_eq!(msg.dlc, 8);
        assert_eq!(msg.pgn, 0x18FEF1);
        assert_eq!(msg.transmitter, "Vector__XXX");

        let msg = decode(&line("BO_ 100 EngineData : 4 ECU1")).unwrap();
        assert_eq!(msg.name, "EngineData");
        assert_eq!(msg.transmitter, "ECU1");
    }

    #[test]
    fn test_decode_rejects_bad_records() {
        for text in [
            "BO_ 0x64 Name: 8 X",
            "BO_ 100 Name 8 X",
            "BO_ 100 Name: eight X",
            "BO_ 100 Two Words: 8 X",
        ] {
            assert!(
                matches!(decode(&line(text)), Err(DbcParseError::MalformedSchema { line: 7, .. })),
                "{text}"
            );
        }
    }
}
