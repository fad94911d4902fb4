//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline on a DOCX path and returns the
//! document in memory; [`convert_to_file`] additionally writes it as pretty
//! JSON. Conversion is synchronous: it is a single pass over one file with
//! no I/O beyond reading it.

use crate::config::ConversionConfig;
use crate::error::PaperError;
use crate::output::PaperDocument;
use crate::pipeline::extract::{self, RawTable};
use crate::pipeline::{assemble, input, metadata, questions};
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a DOCX file into a [`PaperDocument`].
///
/// The first table is read as key/value metadata; every later table is a
/// candidate question table.
///
/// # Errors
/// - File not found / permission denied / not a zip container
/// - Corrupt archive or missing `word/document.xml`
/// - [`PaperError::NoTables`] when the document has no tables at all
pub fn convert(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PaperDocument, PaperError> {
    let start = Instant::now();
    let path = input::resolve_input(input_path)?;
    info!("Starting conversion: {}", path.display());

    let tables = extract::read_tables_from_path(&path)?;
    let doc = convert_tables(&tables, config)?;

    info!(
        "Conversion complete: '{}' with {} questions in {} sections, {}ms",
        doc.paper.slug,
        doc.questions.len(),
        doc.paper.sections.len(),
        start.elapsed().as_millis()
    );
    Ok(doc)
}

/// Convert DOCX bytes held in memory.
pub fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<PaperDocument, PaperError> {
    if !input::has_zip_magic(bytes) {
        return Err(PaperError::CorruptDocument {
            detail: "input bytes are not a zip container".into(),
        });
    }
    let tables = extract::read_tables(Cursor::new(bytes))?;
    convert_tables(&tables, config)
}

/// Run the mapping stages on already-extracted tables.
pub fn convert_tables(
    tables: &[RawTable],
    config: &ConversionConfig,
) -> Result<PaperDocument, PaperError> {
    let (meta_table, candidates) = tables.split_first().ok_or(PaperError::NoTables)?;

    let meta = metadata::parse_metadata(meta_table);
    debug!("Metadata table has {} keys", meta.len());

    let questions = questions::parse_questions(candidates);
    Ok(assemble::build_document(&meta, questions, config))
}

/// Convert a DOCX file and write the result as pretty JSON.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// half-written document behind.
pub fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PaperDocument, PaperError> {
    let doc = convert(input_path, config)?;
    write_document(&doc, output_path)?;
    Ok(doc)
}

/// Serialise `doc` as pretty-printed UTF-8 JSON at `path`.
///
/// Parent directories are created as needed.
pub fn write_document(doc: &PaperDocument, path: impl AsRef<Path>) -> Result<(), PaperError> {
    let path = path.as_ref();
    let write_err = |source| PaperError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)?;

    debug!("Wrote {}", path.display());
    Ok(())
}

/// Read a document previously written by [`write_document`].
pub fn load_document(path: impl AsRef<Path>) -> Result<PaperDocument, PaperError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| PaperError::DocumentReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}
