//! Quote-aware helpers shared by the record decoders.
//!
//! The DBC dialect handled here has no escape sequences: every `"` opens or
//! closes a string.

/// Number of `"` characters in `s`.
pub(crate) fn count_quotes(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'"').count()
}

/// Collects every quoted segment (`"..."`) of `s`, without the quotes.
///
/// Stops at an unclosed quote.
pub(crate) fn collect_all_quoted(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut rest: &str = s;
    while let Some(open) = rest.find('"') {
        let after: &str = &rest[open + 1..];
        let Some(close) = after.find('"') else {
            break;
        };
        out.push(after[..close].to_string());
        rest = &after[close + 1..];
    }
    out
}

/// Splits a leading quoted string off `s`.
///
/// Returns the unquoted content and the remainder after the closing quote.
pub(crate) fn take_quoted(s: &str) -> Option<(&str, &str)> {
    let s: &str = s.trim_start().strip_prefix('"')?;
    let close: usize = s.find('"')?;
    Some((&s[..close], &s[close + 1..]))
}

/// Whitespace tokenizer that keeps quoted segments (quotes included) as one token.
pub(crate) fn split_tokens(s: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quotes: bool = false;

    for (i, ch) in s.char_indices() {
        match ch {
            '"' => {
                if start.is_none() {
                    start = Some(i);
                }
                in_quotes = !in_quotes;
            }
            c if c.is_whitespace() && !in_quotes => {
                if let Some(st) = start.take() {
                    tokens.push(&s[st..i]);
                }
            }
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
    }
    if let Some(st) = start {
        tokens.push(&s[st..]);
    }
    tokens
}

/// Removes the trailing `;` of a record, if any.
pub(crate) fn strip_terminator(s: &str) -> &str {
    let s: &str = s.trim_end();
    s.strip_suffix(';').unwrap_or(s).trim_end()
}
