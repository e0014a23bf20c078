use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::strings;

/// Attribute defined by a `BA_DEF_` line, with the default and per-object values
/// that were attached to it while parsing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name (without quotes).
    pub name: String,
    /// Object kind token (`BU_`, `BO_`, `SG_`, `EV_`), `None` for network attributes.
    pub owner_type: Option<String>,
    pub value_type: AttrValueType,
    /// From `BA_DEF_DEF_`, at most one.
    pub default: Option<DefaultValue>,
    /// From `BA_`, in source order.
    pub values: Vec<ValueSetter>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value_type: AttrValueType) -> Self {
        Attribute {
            name: name.into(),
            value_type,
            ..Default::default()
        }
    }

    /// Default value typed according to `value_type`.
    pub fn typed_default(&self) -> Option<AttributeValue> {
        self.default
            .as_ref()
            .and_then(|d| AttributeValue::parse(&d.value, &self.value_type))
    }

    /// Value set on `target`, falling back to the default.
    pub fn value_for(&self, target: &AttrTarget) -> Option<AttributeValue> {
        self.values
            .iter()
            .rev()
            .find(|v| &v.target == target)
            .and_then(|v| AttributeValue::parse(&v.value, &self.value_type))
            .or_else(|| self.typed_default())
    }
}

/// `BA_DEF_DEF_ "<name>" <value>;`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultValue {
    pub name: String,
    /// Raw value text, quotes included for string values.
    pub value: String,
}

/// `BA_ "<name>" [<target>] <value>;`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSetter {
    pub name: String,
    pub target: AttrTarget,
    /// Raw value text, quotes included for string values.
    pub value: String,
}

/// Object a `BA_` value applies to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrTarget {
    #[default]
    Network,
    Node(String),
    Message(u32),
    Signal(u32, String),
    EnvVar(String),
}

impl fmt::Display for AttrTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrTarget::Network => Ok(()),
            AttrTarget::Node(name) => write!(f, "BU_ {name}"),
            AttrTarget::Message(id) => write!(f, "BO_ {id}"),
            AttrTarget::Signal(id, name) => write!(f, "SG_ {id} {name}"),
            AttrTarget::EnvVar(name) => write!(f, "EV_ {name}"),
        }
    }
}

/// Value type descriptor of a `BA_DEF_` line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum AttrValueType {
    #[default]
    String,
    Int { min: i64, max: i64 },
    Hex { min: u64, max: u64 },
    Float { min: f64, max: f64 },
    Enum(Vec<String>),
}

impl AttrValueType {
    /// Parses `INT 0 10`, `HEX 0 255`, `FLOAT 0 1.5`, `STRING` or `ENUM "A","B"`.
    pub fn parse(descriptor: &str) -> Option<Self> {
        let descriptor: &str = descriptor.trim();
        let (kind, rest) = match descriptor.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (descriptor, ""),
        };
        let mut bounds = rest.split_ascii_whitespace();
        match kind {
            "STRING" => Some(AttrValueType::String),
            "INT" => Some(AttrValueType::Int {
                min: bounds.next()?.parse().ok()?,
                max: bounds.next()?.parse().ok()?,
            }),
            "HEX" => Some(AttrValueType::Hex {
                min: bounds.next()?.parse().ok()?,
                max: bounds.next()?.parse().ok()?,
            }),
            "FLOAT" => Some(AttrValueType::Float {
                min: bounds.next()?.parse().ok()?,
                max: bounds.next()?.parse().ok()?,
            }),
            "ENUM" => Some(AttrValueType::Enum(strings::collect_all_quoted(rest))),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValueType::String => f.write_str("STRING"),
            AttrValueType::Int { min, max } => write!(f, "INT {min} {max}"),
            AttrValueType::Hex { min, max } => write!(f, "HEX {min} {max}"),
            AttrValueType::Float { min, max } => write!(f, "FLOAT {min} {max}"),
            AttrValueType::Enum(labels) => {
                f.write_str("ENUM ")?;
                for (i, label) in labels.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "\"{label}\"")?;
                }
                Ok(())
            }
        }
    }
}

/// Typed attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Hex(u64),
    Float(f64),
    Enum(String),
}

impl AttributeValue {
    /// Types a raw value according to its definition.
    ///
    /// Enum values may be written as the label or as the label index.
    pub fn parse(raw: &str, value_type: &AttrValueType) -> Option<Self> {
        let raw: &str = raw.trim();
        let unquoted: &str = raw.trim_matches('"');
        match value_type {
            AttrValueType::String => Some(AttributeValue::Str(unquoted.to_string())),
            AttrValueType::Int { .. } => unquoted.parse().ok().map(AttributeValue::Int),
            AttrValueType::Hex { .. } => {
                let parsed = match unquoted.strip_prefix("0x").or(unquoted.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16).ok(),
                    None => unquoted.parse().ok(),
                };
                parsed.map(AttributeValue::Hex)
            }
            AttrValueType::Float { .. } => unquoted.parse().ok().map(AttributeValue::Float),
            AttrValueType::Enum(labels) => {
                if let Some(label) = labels.iter().find(|l| l.as_str() == unquoted) {
                    return Some(AttributeValue::Enum(label.clone()));
                }
                let idx: usize = unquoted.parse().ok()?;
                labels.get(idx).cloned().map(AttributeValue::Enum)
            }
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Str(s) => write!(f, "{}", s),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Hex(h) => write!(f, "0x{:X}", h),
            AttributeValue::Float(x) => write!(f, "{}", x),
            AttributeValue::Enum(s) => write!(f, "{}", s),
        }
    }
}
