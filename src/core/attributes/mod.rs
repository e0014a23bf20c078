//! Attribute records (`BA_DEF_`, `BA_DEF_DEF_`, `BA_`).
//!
//! Records are collected in source order while the schema is read and
//! resolved afterwards in one pass: a default or value attaches to the most
//! recent `BA_DEF_` of the same name that precedes it.

pub(crate) mod ba_;
pub(crate) mod ba_def_;
pub(crate) mod ba_def_def_;

use log::debug;
use std::collections::HashMap;

use crate::config::ParseOptions;
use crate::types::{
    attributes::{Attribute, DefaultValue, ValueSetter},
    errors::DbcParseError,
};

/// One parsed attribute record and the line it came from.
#[derive(Clone, Debug)]
pub(crate) enum AttrRecord {
    Define(usize, Attribute),
    Default(usize, DefaultValue),
    Value(usize, ValueSetter),
}

/// Builds the attribute list from the collected records.
///
/// Defaults and values without a preceding definition are dropped, or fail
/// with `UnresolvedReference` when `strict_attribute_owners` is set. A second
/// default for the same attribute fails with `DuplicateDefault`.
pub(crate) fn resolve(records: Vec<AttrRecord>, options: &ParseOptions) -> Result<Vec<Attribute>, DbcParseError> {
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    let unresolved = |line: usize, name: &str, kind: &str| -> Result<(), DbcParseError> {
        if options.strict_attribute_owners {
            Err(DbcParseError::UnresolvedReference {
                line,
                reference: format!("attribute {name}"),
            })
        } else {
            debug!("line {line}: dropping {kind} for undefined attribute '{name}'");
            Ok(())
        }
    };

    for record in records {
        match record {
            AttrRecord::Define(_, attr) => {
                by_name.insert(attr.name.clone(), attributes.len());
                attributes.push(attr);
            }
            AttrRecord::Default(line, default) => {
                let Some(&idx) = by_name.get(&default.name) else {
                    unresolved(line, &default.name, "default value")?;
                    continue;
                };
                let attr: &mut Attribute = &mut attributes[idx];
                if attr.default.is_some() {
                    return Err(DbcParseError::DuplicateDefault {
                        line,
                        attribute: default.name,
                    });
                }
                attr.default = Some(default);
            }
            AttrRecord::Value(line, value) => {
                let Some(&idx) = by_name.get(&value.name) else {
                    unresolved(line, &value.name, "value")?;
                    continue;
                };
                attributes[idx].values.push(value);
            }
        }
    }

    Ok(attributes)
}
