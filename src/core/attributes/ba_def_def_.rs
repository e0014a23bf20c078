use crate::core::{lines::LogicalLine, strings};
use crate::types::{attributes::DefaultValue, errors::DbcParseError};

// BA_DEF_DEF_ "AttrName" <value>;
pub(crate) fn decode(line: &LogicalLine) -> Result<DefaultValue, DbcParseError> {
    let err = |reason: &str| DbcParseError::malformed(line.number, reason);

    let rest: &str = line
        .text
        .strip_prefix("BA_DEF_DEF_")
        .ok_or_else(|| err("expected BA_DEF_DEF_"))?;
    let (name, value) = strings::take_quoted(rest).ok_or_else(|| err("missing quoted attribute name"))?;
    let value: &str = strings::strip_terminator(value).trim_start();
    if value.is_empty() {
        return Err(err("missing default value"));
    }

    Ok(DefaultValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}
