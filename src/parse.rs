use log::info;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;

use crate::config::ParseOptions;
use crate::core::{
    self,
    attributes::{self, AttrRecord},
    lines::{LineCursor, LogicalLine},
};
use crate::types::{database::Database, errors::DbcParseError};

/// Parses DBC text into a [`Database`] with default [`ParseOptions`].
///
/// Logical lines are dispatched on their first token:
/// - **Version** (`VERSION`), **namespace** block (`NS_`), **nodes** (`BU_`, verbatim)
/// - **Messages** (`BO_`) with their **signals** (`SG_`) up to the next blank line
/// - **Value tables** (`VAL_`), resolved against the messages parsed so far
/// - **Attributes** (`BA_DEF_`, `BA_DEF_DEF_`, `BA_`), resolved after the last line
/// - **Comments** (`CM_`) and unused tables (`VAL_TABLE_`), verbatim
///
/// `BS_` is ignored; any other non-empty line is kept in `other_content`.
///
/// # Errors
/// The first grammar violation, unresolved `VAL_` target or duplicate attribute
/// default aborts the parse; no partial database is returned.
pub fn from_dbc_str(text: &str) -> Result<Database, DbcParseError> {
    from_dbc_str_with(text, &ParseOptions::default())
}

/// Same as [`from_dbc_str`] with explicit options.
pub fn from_dbc_str_with(text: &str, options: &ParseOptions) -> Result<Database, DbcParseError> {
    let mut cursor = LineCursor::new(core::lines::join_logical_lines(text)?);
    let mut db: Database = Database::default();
    let mut attr_records: Vec<AttrRecord> = Vec::new();

    while let Some(line) = cursor.next() {
        if line.is_blank() {
            continue;
        }
        let first: &str = line.text.split_ascii_whitespace().next().unwrap_or("");

        match first.trim_end_matches(':') {
            "VERSION" => db.version = Some(decode_version(&line)?),
            "NS_" => {
                let inline: &str = line.text.split_once(':').map_or("", |(_, rest)| rest);
                for symbol in inline.split_ascii_whitespace() {
                    db.namespace.insert(symbol);
                }
                for entry in cursor.take_block() {
                    for symbol in entry.text.split_ascii_whitespace() {
                        db.namespace.insert(symbol);
                    }
                }
            }
            "BS_" => {}
            "BU_" => db.nodes = Some(line.text),
            "VAL_TABLE_" => db.value_tables.push(line.text),
            "BO_" => {
                let mut msg = core::bo_::decode(&line)?;
                while let Some(sg) = cursor.next_if(|l| l.text.starts_with("SG_ ")) {
                    msg.signals.push(core::sg_::decode(&sg)?);
                }
                db.add_message(msg);
            }
            "CM_" => db.comment_lines.push(line.text),
            "BA_DEF_" => attr_records.push(AttrRecord::Define(
                line.number,
                attributes::ba_def_::decode(&line)?,
            )),
            "BA_DEF_DEF_" => attr_records.push(AttrRecord::Default(
                line.number,
                attributes::ba_def_def_::decode(&line)?,
            )),
            "BA_" => attr_records.push(AttrRecord::Value(line.number, attributes::ba_::decode(&line)?)),
            "VAL_" => {
                if !core::val_::decode(&mut db, &line)? {
                    db.other_content.push(line.text);
                }
            }
            _ => db.other_content.push(line.text),
        }
    }

    db.attributes = attributes::resolve(attr_records, options)?;
    Ok(db)
}

/// `VERSION "<text>"`
fn decode_version(line: &LogicalLine) -> Result<String, DbcParseError> {
    let rest: &str = line.text.strip_prefix("VERSION").unwrap_or_default();
    core::strings::take_quoted(rest)
        .map(|(version, _)| version.to_string())
        .ok_or_else(|| DbcParseError::malformed(line.number, "VERSION needs a quoted string"))
}

/// Parses a `.dbc` file and returns a populated [`Database`].
///
/// The file is read in full and closed before parsing. Content is decoded as
/// UTF-8, falling back to Windows-1252 for legacy files.
///
/// # Errors
/// - [`DbcParseError::InvalidExtension`] if the path does not end in `.dbc`.
/// - [`DbcParseError::OpenFile`] / [`DbcParseError::Read`] on I/O failures.
/// - Any parse error of [`from_dbc_str`].
pub fn from_dbc_file(path: impl AsRef<Path>) -> Result<Database, DbcParseError> {
    from_dbc_file_with(path, &ParseOptions::default())
}

/// Same as [`from_dbc_file`] with explicit options.
pub fn from_dbc_file_with(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Database, DbcParseError> {
    let path: &Path = path.as_ref();
    let text: String = read_schema_text(path)?;
    let db: Database = from_dbc_str_with(&text, options)?;
    info!(
        "Loaded '{}': {} messages, {} attributes",
        path.display(),
        db.message_count(),
        db.attributes.len()
    );
    Ok(db)
}

/// Parses every `.dbc` file of `dir` (sorted by file name) and merges them in order.
pub fn from_dbc_dir(dir: impl AsRef<Path>) -> Result<Database, DbcParseError> {
    from_dbc_dir_with(dir, &ParseOptions::default())
}

/// Same as [`from_dbc_dir`] with explicit options.
pub fn from_dbc_dir_with(dir: impl AsRef<Path>, options: &ParseOptions) -> Result<Database, DbcParseError> {
    let dir: &Path = dir.as_ref();
    let read_dir_err = |source: std::io::Error| DbcParseError::ReadDir {
        path: dir.display().to_string(),
        source,
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let path: PathBuf = entry.map_err(read_dir_err)?.path();
        if path.is_file() && has_dbc_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut db: Database = Database::default();
    for path in &files {
        db.merge(&from_dbc_file_with(path, options)?);
    }
    info!(
        "Loaded {} DBC files from '{}': {} messages",
        files.len(),
        dir.display(),
        db.message_count()
    );
    Ok(db)
}

pub(crate) fn has_dbc_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dbc"))
}

fn read_schema_text(path: &Path) -> Result<String, DbcParseError> {
    let path_owned: String = path.display().to_string();
    if !has_dbc_extension(path) {
        return Err(DbcParseError::InvalidExtension { path: path_owned });
    }

    let mut bytes: Vec<u8> = Vec::new();
    {
        let mut file: File = File::open(path).map_err(|source| DbcParseError::OpenFile {
            path: path_owned.clone(),
            source,
        })?;
        file.read_to_end(&mut bytes)
            .map_err(|source| DbcParseError::Read {
                path: path_owned.clone(),
                source,
            })?;
    }

    let text: String = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let (decoded, _, _) = WINDOWS_1252.decode(err.as_bytes());
            decoded.into_owned()
        }
    };
    Ok(text.trim_start_matches('\u{feff}').to_string())
}
