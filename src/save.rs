use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::parse::has_dbc_extension;
use crate::types::{
    attributes::{AttrTarget, Attribute},
    database::Database,
    errors::DbcSaveError,
    message::Message,
    signal::Signal,
};

/// Serializes a [`Database`] into DBC text.
///
/// The output is not byte-identical to the parsed source, but parsing it again
/// yields an equal database.
pub fn to_dbc_string(db: &Database) -> String {
    let mut out = DbcText::default();
    write_database(db, &mut out);
    out.text
}

/// Serializes a [`Database`] into DBC text and writes it to `path`.
///
/// Missing parent directories are created.
///
/// # Errors
/// [`DbcSaveError::InvalidExtension`] unless `path` ends in `.dbc`; the other
/// variants wrap the failing I/O step.
pub fn save_to_file(path: impl AsRef<Path>, db: &Database) -> Result<(), DbcSaveError> {
    let path: &Path = path.as_ref();
    let shown: String = path.display().to_string();
    if !has_dbc_extension(path) {
        return Err(DbcSaveError::InvalidExtension { path: shown });
    }

    let text: String = to_dbc_string(db);

    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| DbcSaveError::CreateDirectory {
                path: dir.display().to_string(),
                source,
            })?
        }
        _ => {}
    }

    let mut writer = File::create(path).map(BufWriter::new).map_err(|source| DbcSaveError::CreateFile {
        path: shown.clone(),
        source,
    })?;
    writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|source| DbcSaveError::Write { path: shown, source })
}

/// Output buffer; every record is one line.
#[derive(Default)]
struct DbcText {
    text: String,
}

impl DbcText {
    fn line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    fn blank(&mut self) {
        self.text.push('\n');
    }
}

/// Record order: header, messages, comments, attributes (each definition
/// followed by its default and values), value descriptions, then
/// unrecognized lines.
fn write_database(db: &Database, out: &mut DbcText) {
    if let Some(version) = &db.version {
        out.line(format!("VERSION \"{version}\""));
        out.blank();
    }

    out.line("NS_ :");
    for symbol in db.namespace.iter() {
        out.line(format!("\t{symbol}"));
    }
    out.blank();
    out.line("BS_:");
    out.blank();

    if let Some(nodes) = &db.nodes {
        out.line(nodes);
        out.blank();
    }
    for table in &db.value_tables {
        out.line(table);
    }
    out.blank();

    for message in db.iter_messages() {
        write_message(message, out);
        out.blank();
    }

    for comment in &db.comment_lines {
        out.line(comment);
    }
    for attr in &db.attributes {
        write_attribute(attr, out);
    }
    write_value_descriptions(db, out);

    if !db.other_content.is_empty() {
        out.blank();
        for line in &db.other_content {
            out.line(line);
        }
    }
}

fn write_message(message: &Message, out: &mut DbcText) {
    out.line(format!(
        "BO_ {} {}: {} {}",
        message.id, message.name, message.dlc, message.transmitter
    ));
    for signal in &message.signals {
        write_signal(signal, out);
    }
}

fn write_signal(signal: &Signal, out: &mut DbcText) {
    let mux_tag: String = signal
        .multiplexer
        .as_ref()
        .map(|tag| format!(" {tag}"))
        .unwrap_or_default();
    let sign_char: char = if signal.signed { '-' } else { '+' };

    out.line(format!(
        " SG_ {}{} : {}|{}@{}{} ({},{}) [{}|{}] \"{}\" {}",
        signal.name,
        mux_tag,
        signal.start_bit,
        signal.length,
        signal.byte_order.as_char(),
        sign_char,
        signal.factor,
        signal.offset,
        signal.min,
        signal.max,
        signal.unit,
        signal.receivers.join(",")
    ));
}

/// `BA_DEF_`, then its `BA_DEF_DEF_` and `BA_` lines.
///
/// Defaults and values attach to the most recent definition of their name on
/// reparse, so they must not be moved past a later same-name definition.
fn write_attribute(attr: &Attribute, out: &mut DbcText) {
    match &attr.owner_type {
        Some(owner) => out.line(format!("BA_DEF_ {owner} \"{}\" {};", attr.name, attr.value_type)),
        None => out.line(format!("BA_DEF_  \"{}\" {};", attr.name, attr.value_type)),
    }
    if let Some(default) = &attr.default {
        out.line(format!("BA_DEF_DEF_ \"{}\" {};", default.name, default.value));
    }
    for value in &attr.values {
        match &value.target {
            AttrTarget::Network => out.line(format!("BA_ \"{}\" {};", value.name, value.value)),
            target => out.line(format!("BA_ \"{}\" {target} {};", value.name, value.value)),
        }
    }
}

/// One `VAL_` line per signal that carries a value table.
fn write_value_descriptions(db: &Database, out: &mut DbcText) {
    for message in db.iter_messages() {
        for signal in &message.signals {
            let Some(table) = &signal.value_table else {
                continue;
            };
            let mut line: String = format!("VAL_ {} {}", message.id, signal.name);
            for (raw, label) in table.iter() {
                line.push_str(&format!(" {raw} \"{label}\""));
            }
            line.push_str(" ;");
            out.line(line);
        }
    }
}
