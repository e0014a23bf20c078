use serde::{Deserialize, Serialize};

use crate::core::strings;
use crate::types::attributes::AttrTarget;

/// Typed view of one `CM_` line.
///
/// The database keeps comment lines verbatim; this is built on demand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub target: AttrTarget,
    pub text: String,
}

impl Comment {
    /// Parses `CM_ [BU_ <node>|BO_ <id>|SG_ <id> <signal>|EV_ <var>] "<text>";`.
    pub fn parse(raw: &str) -> Option<Comment> {
        let rest: &str = raw.trim().strip_prefix("CM_")?;
        let quote: usize = rest.find('"')?;
        let (head, body) = rest.split_at(quote);
        let (text, _) = strings::take_quoted(body)?;

        let head: Vec<&str> = head.split_ascii_whitespace().collect();
        let target: AttrTarget = match head.as_slice() {
            [] => AttrTarget::Network,
            ["BU_", node] => AttrTarget::Node(node.to_string()),
            ["BO_", id] => AttrTarget::Message(id.parse().ok()?),
            ["SG_", id, signal] => AttrTarget::Signal(id.parse().ok()?, signal.to_string()),
            ["EV_", var] => AttrTarget::EnvVar(var.to_string()),
            _ => return None,
        };

        Some(Comment {
            target,
            text: text.to_string(),
        })
    }
}
