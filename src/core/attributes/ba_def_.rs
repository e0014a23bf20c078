use crate::core::{lines::LogicalLine, strings};
use crate::types::{
    attributes::{AttrValueType, Attribute},
    errors::DbcParseError,
};

/// Object kind tokens accepted in front of the attribute name.
const OWNER_TYPES: [&str; 4] = ["BU_", "BO_", "SG_", "EV_"];

/// `BA_DEF_ [BU_|BO_|SG_|EV_] "<name>" <value-type>;`
pub(crate) fn decode(line: &LogicalLine) -> Result<Attribute, DbcParseError> {
    let err = |reason: String| DbcParseError::malformed(line.number, reason);

    let rest: &str = line
        .text
        .strip_prefix("BA_DEF_")
        .ok_or_else(|| err("expected BA_DEF_".into()))?
        .trim_start();

    let (owner_type, rest) = if rest.starts_with('"') {
        (None, rest)
    } else {
        let (owner, tail) = rest
            .split_once(char::is_whitespace)
            .ok_or_else(|| err("missing attribute name".into()))?;
        if !OWNER_TYPES.contains(&owner) {
            return Err(err(format!("unknown attribute owner '{owner}'")));
        }
        (Some(owner.to_string()), tail)
    };

    let (name, descriptor) = strings::take_quoted(rest).ok_or_else(|| err("missing quoted attribute name".into()))?;
    let descriptor: &str = strings::strip_terminator(descriptor);
    let value_type: AttrValueType = AttrValueType::parse(descriptor)
        .ok_or_else(|| err(format!("invalid value type '{descriptor}'")))?;

    Ok(Attribute {
        owner_type,
        ..Attribute::new(name, value_type)
    })
}
