//! Database model (SlotMap-backed).
//!
//! Messages live in a [`SlotMap`] arena with stable [`MessageKey`]s; public
//! iteration follows the `messages_order` vector, i.e. schema order.
//! Records the model does not interpret (`BU_`, `VAL_TABLE_`, `CM_`, unknown
//! keywords) are kept verbatim so serialization does not lose them.

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::types::{
    attributes::{AttrValueType, Attribute, DefaultValue},
    comment::Comment,
    message::Message,
    namespace::NameSpace,
};

new_key_type! { pub struct MessageKey; }

/// In-memory representation of one or more merged DBC files.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct Database {
    // --- General information ---
    /// `VERSION "<text>"`, without quotes.
    pub version: Option<String>,
    pub namespace: NameSpace,
    /// `BU_` line, verbatim.
    pub nodes: Option<String>,
    /// `VAL_TABLE_` lines, verbatim.
    pub value_tables: Vec<String>,

    // --- Main storage (stable-key map) + order view ---
    pub(crate) messages: SlotMap<MessageKey, Message>,
    pub(crate) messages_order: Vec<MessageKey>,

    /// `CM_` lines, verbatim (see [`Database::comments`]).
    pub comment_lines: Vec<String>,
    pub attributes: Vec<Attribute>,
    /// Lines with an unrecognized keyword, in source order.
    pub other_content: Vec<String>,
}

impl Database {
    // --------- Messages --------
    pub fn add_message(&mut self, msg: Message) -> MessageKey {
        let key: MessageKey = self.messages.insert(msg);
        self.messages_order.push(key);
        key
    }

    /// Messages in schema order.
    pub fn iter_messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.messages_order
            .iter()
            .filter_map(|key| self.messages.get(*key))
    }

    pub fn message_count(&self) -> usize {
        self.messages_order.len()
    }

    pub fn get_message_by_key(&self, key: MessageKey) -> Option<&Message> {
        self.messages.get(key)
    }

    /// First message named exactly `name`.
    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.iter_messages().find(|m| m.name == name)
    }

    /// First message whose raw DBC id (extended flag included) is `id`.
    pub fn get_message_by_id(&self, id: u32) -> Option<&Message> {
        self.iter_messages().find(|m| m.id == id)
    }

    pub(crate) fn get_message_by_id_mut(&mut self, id: u32) -> Option<&mut Message> {
        let key: MessageKey = *self
            .messages_order
            .iter()
            .find(|key| self.messages.get(**key).is_some_and(|m| m.id == id))?;
        self.messages.get_mut(key)
    }

    // --------- Attributes --------
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Defines a network attribute with an optional raw default value.
    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        value_type: AttrValueType,
        default: Option<&str>,
    ) -> &mut Attribute {
        let mut attr = Attribute::new(name, value_type);
        attr.default = default.map(|value| DefaultValue {
            name: attr.name.clone(),
            value: value.to_string(),
        });
        let idx: usize = self.attributes.len();
        self.attributes.push(attr);
        &mut self.attributes[idx]
    }

    // --------- Nodes / comments --------
    /// Node names listed on the `BU_` line.
    pub fn node_names(&self) -> Vec<&str> {
        let Some(line) = self.nodes.as_deref() else {
            return Vec::new();
        };
        let list: &str = line.split_once(':').map_or("", |(_, rest)| rest);
        list.split_ascii_whitespace().collect()
    }

    /// Comment lines that parse into a known shape.
    pub fn comments(&self) -> Vec<Comment> {
        self.comment_lines
            .iter()
            .filter_map(|raw| Comment::parse(raw))
            .collect()
    }

    // --------- Merge --------
    /// Appends the content of `other`; `self` keeps its version and node list
    /// when it has them. The namespace merge drops duplicates.
    pub fn merge(&mut self, other: &Database) {
        if self.version.is_none() {
            self.version.clone_from(&other.version);
        }
        if self.nodes.is_none() {
            self.nodes.clone_from(&other.nodes);
        }
        self.namespace.merge(&other.namespace);
        self.value_tables.extend(other.value_tables.iter().cloned());
        for msg in other.iter_messages() {
            self.add_message(msg.clone());
        }
        self.comment_lines.extend(other.comment_lines.iter().cloned());
        self.attributes.extend(other.attributes.iter().cloned());
        self.other_content.extend(other.other_content.iter().cloned());
    }
}

/// Field-wise equality; messages are compared in iteration order, keys are ignored.
impl PartialEq for Database {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.namespace == other.namespace
            && self.nodes == other.nodes
            && self.value_tables == other.value_tables
            && self.iter_messages().eq(other.iter_messages())
            && self.comment_lines == other.comment_lines
            && self.attributes == other.attributes
            && self.other_content == other.other_content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attributes::AttributeValue;

    fn build_test_db() -> Database {
        let mut db = Database {
            version: Some("1.0".into()),
            nodes: Some("BU_: ECU1 ECU2".into()),
            ..Default::default()
        };
        db.namespace.insert("CM_");
        db.add_message(Message::new(100, "Status", 8, "ECU1"));
        db.add_message(Message::new(0x98FEF100, "CCVS", 8, "ECU2"));
        db.comment_lines.push(r#"CM_ BO_ 100 "Status frame";"#.into());
        db
    }

    #[test]
    fn test_lookups() {
        let db: Database = build_test_db();
        assert_eq!(db.message_count(), 2);
        assert_eq!(db.get_message("CCVS").map(|m| m.id), Some(0x98FEF100));
        assert_eq!(db.get_message_by_id(100).map(|m| m.name.as_str()), Some("Status"));
        assert!(db.get_message("ccvs").is_none());
        assert_eq!(db.node_names(), vec!["ECU1", "ECU2"]);
        assert_eq!(db.comments().len(), 1);
    }

    #[test]
    fn test_add_attribute() {
        let mut db: Database = build_test_db();
        db.add_attribute("ProtocolType", AttrValueType::String, Some("\"J1939\""));
        let attr = db.get_attribute("ProtocolType").unwrap();
        assert_eq!(attr.typed_default(), Some(AttributeValue::Str("J1939".into())));
    }

    #[test]
    fn test_merge_is_append_only() {
        let mut a: Database = build_test_db();
        let mut b = Database {
            version: Some("2.0".into()),
            ..Default::default()
        };
        b.namespace.insert("CM_");
        b.namespace.insert("VAL_");
        b.add_message(Message::new(200, "Extra", 2, "ECU3"));
        let b_before: Database = b.clone();

        a.merge(&b);
        assert_eq!(b, b_before);
        assert_eq!(a.version.as_deref(), Some("1.0"));
        assert_eq!(a.namespace.len(), 2);
        let names: Vec<&str> = a.iter_messages().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Status", "CCVS", "Extra"]);
    }

    #[test]
    fn test_equality_ignores_keys() {
        let a: Database = build_test_db();
        let mut b: Database = Database::default();
        b.merge(&a);
        assert_eq!(a, b);
    }
}
