//! Table extraction: DOCX container → ordered tables of cell text.
//!
//! Only `word/document.xml` is read. The XML is streamed with `quick-xml`
//! and every top-level `w:tbl` becomes one [`RawTable`] in document order.
//! Everything outside tables (headings, body paragraphs, images) is ignored.
//!
//! Cell text is the concatenation of all `w:t` runs inside a `w:tc`,
//! paragraphs separated by a newline, then whitespace-collapsed by
//! [`clean_text`]. Text of a table nested inside a cell is folded into that
//! cell; nested tables never surface as tables of their own.
//!
//! Merged cells are expanded so every row has one entry per grid column:
//! a cell spanning `w:gridSpan` columns repeats its text that many times,
//! and a `w:vMerge` continuation repeats the text of the cell above it.

use crate::error::PaperError;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Archive member holding the main document body.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound for the buffer pre-allocated from the archive's declared size.
const MAX_PREALLOC: usize = 16 << 20;

/// Word tables have at most 63 grid columns.
const MAX_GRID_SPAN: usize = 63;

/// One table row: cell strings in column order.
pub type RawRow = Vec<String>;

/// One table: rows in document order. Row 0 is the header when there is one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Build a table from anything that yields rows of string-likes.
    pub fn from_rows<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// The header row, if the table has any rows at all.
    pub fn header(&self) -> Option<&RawRow> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run to a single space and trim.
pub fn clean_text(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Read every top-level table from a DOCX file on disk.
pub fn read_tables_from_path(path: &Path) -> Result<Vec<RawTable>, PaperError> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            PaperError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            PaperError::FileNotFound {
                path: path.to_path_buf(),
            }
        }
    })?;
    read_tables(file)
}

/// Read every top-level table from a DOCX container.
pub fn read_tables<R: Read + Seek>(reader: R) -> Result<Vec<RawTable>, PaperError> {
    let mut archive = ZipArchive::new(reader).map_err(|e| PaperError::CorruptDocument {
        detail: format!("not a readable zip archive: {e}"),
    })?;
    let mut entry = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| PaperError::CorruptDocument {
            detail: format!("missing {DOCUMENT_PART}: {e}"),
        })?;
    let mut xml = Vec::with_capacity((entry.size() as usize).min(MAX_PREALLOC));
    entry
        .read_to_end(&mut xml)
        .map_err(|e| PaperError::CorruptDocument {
            detail: format!("cannot decompress {DOCUMENT_PART}: {e}"),
        })?;

    let tables = parse_document_xml(&xml)?;
    debug!("Extracted {} tables from {}", tables.len(), DOCUMENT_PART);
    Ok(tables)
}

/// Parse WordprocessingML body XML into its top-level tables.
pub fn parse_document_xml(xml: &[u8]) -> Result<Vec<RawTable>, PaperError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut tables = Vec::new();
    let mut rows: Vec<RawRow> = Vec::new();
    let mut row: Option<RawRow> = None;
    let mut cell: Option<String> = None;
    let mut layout = CellLayout::default();
    // 1 while inside a top-level table, >1 inside a nested one.
    let mut depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"tbl" => {
                    depth += 1;
                    if depth == 1 {
                        rows.clear();
                    }
                }
                b"tr" if depth == 1 => row = Some(Vec::new()),
                b"tc" if depth == 1 => {
                    cell = Some(String::new());
                    layout = CellLayout::default();
                }
                b"gridSpan" | b"vMerge" if depth == 1 && cell.is_some() => layout.read(e),
                b"t" => in_text = true,
                b"tab" | b"br" | b"cr" => push_cell_text(&mut cell, " "),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tc" if depth == 1 => {
                    if let Some(r) = row.as_mut() {
                        r.push(String::new());
                    }
                }
                b"gridSpan" | b"vMerge" if depth == 1 && cell.is_some() => layout.read(e),
                b"tab" | b"br" | b"cr" => push_cell_text(&mut cell, " "),
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_text && cell.is_some() {
                    let text = e.unescape().map_err(|err| PaperError::CorruptDocument {
                        detail: format!("bad text in {DOCUMENT_PART}: {err}"),
                    })?;
                    push_cell_text(&mut cell, &text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => push_cell_text(&mut cell, "\n"),
                b"tc" if depth == 1 => {
                    if let (Some(text), Some(r)) = (cell.take(), row.as_mut()) {
                        let text = if layout.continues_merge {
                            rows.last()
                                .and_then(|above| above.get(r.len()))
                                .cloned()
                                .unwrap_or_default()
                        } else {
                            clean_text(&text)
                        };
                        r.extend(std::iter::repeat(text).take(layout.span));
                    }
                }
                b"tr" if depth == 1 => {
                    if let Some(r) = row.take() {
                        if !r.is_empty() {
                            rows.push(r);
                        }
                    }
                }
                b"tbl" => {
                    if depth == 1 {
                        tables.push(RawTable {
                            rows: std::mem::take(&mut rows),
                        });
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PaperError::CorruptDocument {
                    detail: format!(
                        "malformed XML in {DOCUMENT_PART} at byte {}: {e}",
                        reader.buffer_position()
                    ),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(tables)
}

/// Merge layout of the top-level cell being read, from its `w:tcPr`.
#[derive(Debug)]
struct CellLayout {
    /// Grid columns covered by the cell.
    span: usize,
    /// `w:vMerge` without `restart`: the cell continues the one above.
    continues_merge: bool,
}

impl Default for CellLayout {
    fn default() -> Self {
        Self {
            span: 1,
            continues_merge: false,
        }
    }
}

impl CellLayout {
    fn read(&mut self, e: &BytesStart<'_>) {
        let val = e
            .attributes()
            .flatten()
            .find(|a| a.key.local_name().as_ref() == b"val")
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
        match e.local_name().as_ref() {
            b"gridSpan" => {
                self.span = val
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, MAX_GRID_SPAN);
            }
            b"vMerge" => self.continues_merge = val.as_deref() != Some("restart"),
            _ => {}
        }
    }
}

fn push_cell_text(cell: &mut Option<String>, text: &str) {
    if let Some(c) = cell.as_mut() {
        c.push_str(text);
    }
}
