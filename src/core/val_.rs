use log::warn;

use crate::core::{lines::LogicalLine, strings};
use crate::types::{database::Database, errors::DbcParseError, signal::ValueTable};

/// Parses a `VAL_` line and attaches the table to its signal:
/// `VAL_ <MessageID> <SignalName> <value> "<desc>" ... ;`
///
/// The message and signal must already be parsed. Returns `Ok(false)` for a
/// `VAL_` record that does not target a message signal (environment variables),
/// which the caller keeps verbatim.
pub(crate) fn decode(db: &mut Database, line: &LogicalLine) -> Result<bool, DbcParseError> {
    let err = |reason: String| DbcParseError::malformed(line.number, reason);

    let body: &str = line.text.trim_end();
    if !body.ends_with(';') {
        return Err(err("VAL_ record must end with ';'".into()));
    }
    let tokens: Vec<&str> = strings::split_tokens(strings::strip_terminator(body));
    let mut it = tokens.into_iter().skip(1);

    let Some(id_tok) = it.next() else {
        return Err(err("missing message id".into()));
    };
    let Ok(message_id) = id_tok.parse::<u32>() else {
        return Ok(false);
    };
    let signal_name: &str = it.next().ok_or_else(|| err("missing signal name".into()))?;

    let mut table = ValueTable::new();
    while let Some(val_tok) = it.next() {
        let raw: i64 = val_tok
            .parse()
            .map_err(|_| err(format!("invalid raw value '{val_tok}'")))?;
        let label: &str = it
            .next()
            .and_then(|t| t.strip_prefix('"'))
            .and_then(|t| t.strip_suffix('"'))
            .ok_or_else(|| err(format!("missing quoted label for value {raw}")))?;
        if let Some(previous) = table.insert(raw, label) {
            warn!(
                "line {}: value {} of '{}' redefined ('{}' -> '{}')",
                line.number, raw, signal_name, previous, label
            );
        }
    }

    let unresolved = |reference: String| DbcParseError::UnresolvedReference {
        line: line.number,
        reference,
    };
    let msg = db
        .get_message_by_id_mut(message_id)
        .ok_or_else(|| unresolved(format!("message {message_id}")))?;
    let msg_name: String = msg.name.clone();
    let sig = msg
        .get_signal_mut(signal_name)
        .ok_or_else(|| unresolved(format!("signal {signal_name} in message {msg_name}")))?;
    sig.value_table = Some(table);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{message::Message, signal::Signal};

    fn line(text: &str) -> LogicalLine {
        LogicalLine {
            number: 40,
            text: text.to_string(),
        }
    }

    fn build_test_db() -> Database {
        let mut db = Database::default();
        let mut msg = Message::new(100, "Status", 8, "ECU1");
        msg.signals.push(Signal {
            name: "Mode".into(),
            length: 2,
            ..Default::default()
        });
        db.add_message(msg);
        db
    }

    #[test]
    fn test_attach_value_table() {
        let mut db = build_test_db();
        let attached = decode(&mut db, &line(r#"VAL_ 100 Mode 0 "Off" 1 "On" 2 "Not available" ;"#)).unwrap();
        assert!(attached);

        let sig = db.get_message_by_id(100).unwrap().get_signal("Mode").unwrap();
        let table = sig.value_table.as_ref().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2), Some("Not available"));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let mut db = build_test_db();
        decode(&mut db, &line(r#"VAL_ 100 Mode 1 "On" 1 "Active";"#)).unwrap();
        let sig = db.get_message_by_id(100).unwrap().get_signal("Mode").unwrap();
        assert_eq!(sig.label_for(1), Some("Active"));
    }

    #[test]
    fn test_unresolved_references() {
        let mut db = build_test_db();
        assert!(matches!(
            decode(&mut db, &line(r#"VAL_ 101 Mode 0 "Off" ;"#)),
            Err(DbcParseError::UnresolvedReference { line: 40, .. })
        ));
        assert!(matches!(
            decode(&mut db, &line(r#"VAL_ 100 Gear 0 "Off" ;"#)),
            Err(DbcParseError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_malformed_records() {
        let mut db = build_test_db();
        assert!(matches!(
            decode(&mut db, &line(r#"VAL_ 100 Mode 0 "Off""#)),
            Err(DbcParseError::MalformedSchema { .. })
        ));
        assert!(matches!(
            decode(&mut db, &line(r#"VAL_ 100 Mode 0 Off ;"#)),
            Err(DbcParseError::MalformedSchema { .. })
        ));
    }

    #[test]
    fn test_environment_variable_table_is_not_attached() {
        let mut db = build_test_db();
        assert!(!decode(&mut db, &line(r#"VAL_ EnvMode 0 "Off" ;"#)).unwrap());
    }
}
