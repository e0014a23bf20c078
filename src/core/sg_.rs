use crate::core::{lines::LogicalLine, strings};
use crate::types::{
    errors::DbcParseError,
    number::Number,
    signal::{ByteOrder, DUMMY_NODE, Signal},
};

/// Decodes a `SG_` line of the message block being parsed.
///
/// `SG_ <name> [M|mX] : <start>|<length>@<order><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers>`
pub(crate) fn decode(line: &LogicalLine) -> Result<Signal, DbcParseError> {
    let err = |reason: String| DbcParseError::malformed(line.number, reason);

    let (left, right) = line
        .text
        .split_once(':')
        .ok_or_else(|| err("missing ':' in signal record".into()))?;

    // SG_ NAME [M|mX]
    let mut left_it = left.split_ascii_whitespace();
    if left_it.next() != Some("SG_") {
        return Err(err("expected SG_".into()));
    }
    let name: &str = left_it.next().ok_or_else(|| err("missing signal name".into()))?;
    let multiplexer: Option<String> = match left_it.next() {
        None => None,
        Some(tag) if tag.starts_with(['m', 'M']) => Some(tag.to_string()),
        Some(tag) => return Err(err(format!("unexpected token '{tag}' after signal name"))),
    };
    if left_it.next().is_some() {
        return Err(err("too many tokens before ':'".into()));
    }

    // <start>|<length>@<order><sign>
    let right: &str = right.trim();
    let (bits, rest) = right
        .split_once(char::is_whitespace)
        .ok_or_else(|| err("truncated signal record".into()))?;
    let (pos_len, order_sign) = bits
        .split_once('@')
        .ok_or_else(|| err(format!("missing '@' in '{bits}'")))?;
    let (start, len) = pos_len
        .split_once('|')
        .ok_or_else(|| err(format!("missing '|' in '{bits}'")))?;
    let start_bit: u16 = start
        .parse()
        .map_err(|_| err(format!("invalid start bit '{start}'")))?;
    let length: u16 = len
        .parse()
        .map_err(|_| err(format!("invalid bit length '{len}'")))?;
    if !(1..=64).contains(&length) {
        return Err(err(format!("bit length {length} outside 1..=64")));
    }

    let mut flags = order_sign.chars();
    let byte_order: ByteOrder = flags
        .next()
        .and_then(ByteOrder::from_char)
        .ok_or_else(|| err(format!("invalid bit order in '{bits}'")))?;
    let signed: bool = match (flags.next(), flags.next()) {
        (Some('+'), None) => false,
        (Some('-'), None) => true,
        _ => return Err(err(format!("invalid sign in '{bits}'"))),
    };

    // (<factor>,<offset>)
    let (scaling, rest) = delimited(rest, '(', ')').ok_or_else(|| err("missing (factor,offset)".into()))?;
    let (factor, offset) = number_pair(scaling, ',').ok_or_else(|| err(format!("invalid scaling '({scaling})'")))?;

    // [<min>|<max>]
    let (range, rest) = delimited(rest, '[', ']').ok_or_else(|| err("missing [min|max]".into()))?;
    let (min, max) = number_pair(range, '|').ok_or_else(|| err(format!("invalid range '[{range}]'")))?;

    // "<unit>"
    let (unit, rest) = strings::take_quoted(rest).ok_or_else(|| err("missing quoted unit".into()))?;

    let mut receivers: Vec<String> = rest
        .split([',', ' '])
        .map(|r| r.trim_end_matches(';'))
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    if receivers.is_empty() {
        receivers.push(DUMMY_NODE.to_string());
    }

    Ok(Signal {
        name: name.to_string(),
        multiplexer,
        start_bit,
        length,
        byte_order,
        signed,
        factor,
        offset,
        min,
        max,
        unit: unit.to_string(),
        receivers,
        value_table: None,
    })
}

/// Content between `open` and `close` at the start of `s`, and the remainder.
fn delimited(s: &str, open: char, close: char) -> Option<(&str, &str)> {
    let s: &str = s.trim_start().strip_prefix(open)?;
    let end: usize = s.find(close)?;
    Some((&s[..end], &s[end + 1..]))
}

fn number_pair(s: &str, sep: char) -> Option<(Number, Number)> {
    let (a, b) = s.split_once(sep)?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}
