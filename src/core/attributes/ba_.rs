use crate::core::{lines::LogicalLine, strings};
use crate::types::{
    attributes::{AttrTarget, ValueSetter},
    errors::DbcParseError,
};

/// Decodes an attribute value line. Expected formats:
/// - `BA_ "DBName" "TestCAN";`
/// - `BA_ "NmStationAddress" BU_ ECU1 5;`
/// - `BA_ "GenMsgCycleTime" BO_ 2566844926 100;`
/// - `BA_ "GenSigStartValue" SG_ 2566844926 Speed 0;`
/// - `BA_ "EnvVarScope" EV_ Ignition 1;`
pub(crate) fn decode(line: &LogicalLine) -> Result<ValueSetter, DbcParseError> {
    let err = |reason: String| DbcParseError::malformed(line.number, reason);

    let rest: &str = line
        .text
        .strip_prefix("BA_")
        .ok_or_else(|| err("expected BA_".into()))?;
    let (name, tail) = strings::take_quoted(rest).ok_or_else(|| err("missing quoted attribute name".into()))?;
    let tokens: Vec<&str> = strings::split_tokens(strings::strip_terminator(tail));

    let parse_id = |tok: Option<&&str>| -> Result<u32, DbcParseError> {
        tok.and_then(|t| t.parse().ok())
            .ok_or_else(|| err("message id is not a decimal integer".into()))
    };
    let missing = |what: &str| err(format!("missing {what}"));

    let (target, used): (AttrTarget, usize) = match tokens.first().copied() {
        Some("BU_") => (
            AttrTarget::Node(tokens.get(1).ok_or_else(|| missing("node name"))?.to_string()),
            2,
        ),
        Some("BO_") => (AttrTarget::Message(parse_id(tokens.get(1))?), 2),
        Some("SG_") => (
            AttrTarget::Signal(
                parse_id(tokens.get(1))?,
                tokens.get(2).ok_or_else(|| missing("signal name"))?.to_string(),
            ),
            3,
        ),
        Some("EV_") => (
            AttrTarget::EnvVar(tokens.get(1).ok_or_else(|| missing("variable name"))?.to_string()),
            2,
        ),
        _ => (AttrTarget::Network, 0),
    };

    let value: String = tokens.get(used..).unwrap_or_default().join(" ");
    if value.is_empty() {
        return Err(missing("attribute value"));
    }

    Ok(ValueSetter {
        name: name.to_string(),
        target,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> LogicalLine {
        LogicalLine {
            number: 21,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_decode_network_value() {
        let v = decode(&line(r#"BA_ "BusType" "CAN FD";"#)).unwrap();
        assert_eq!(v.name, "BusType");
        assert_eq!(v.target, AttrTarget::Network);
        assert_eq!(v.value, "\"CAN FD\"");
    }

    #[test]
    fn test_decode_object_values() {
        let v = decode(&line(r#"BA_ "GenMsgCycleTime" BO_ 2566844926 100;"#)).unwrap();
        assert_eq!(v.target, AttrTarget::Message(2566844926));
        assert_eq!(v.value, "100");

        let v = decode(&line(r#"BA_ "GenSigStartValue" SG_ 100 Speed 0;"#)).unwrap();
        assert_eq!(v.target, AttrTarget::Signal(100, "Speed".into()));

        let v = decode(&line(r#"BA_ "NodeLayer" BU_ ECU1 "Application layer";"#)).unwrap();
        assert_eq!(v.target, AttrTarget::Node("ECU1".into()));
        assert_eq!(v.value, "\"Application layer\"");

        let v = decode(&line(r#"BA_ "Scope" EV_ Ignition 1;"#)).unwrap();
        assert_eq!(v.target, AttrTarget::EnvVar("Ignition".into()));
    }

    #[test]
    fn test_decode_rejects_bad_values() {
        for text in [
            r#"BA_ "GenMsgCycleTime" BO_ x 100;"#,
            r#"BA_ "GenMsgCycleTime" BO_ 100;"#,
            r#"BA_ GenMsgCycleTime 100;"#,
        ] {
            assert!(matches!(decode(&line(text)), Err(DbcParseError::MalformedSchema { line: 21, .. })), "{text}");
        }
    }
}
