//! Helpers for building DOCX fixtures on the fly.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Route library logs through the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;
const DOCUMENT_TAIL: &str = "<w:sectPr/></w:body></w:document>";

/// A Word document made of paragraphs and tables, in insertion order.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&paragraph(text));
        self
    }

    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        self.body.push_str("<w:tbl><w:tblPr/>");
        for row in rows {
            self.body.push_str("<w:tr>");
            for cell in row.iter() {
                self.body.push_str("<w:tc><w:tcPr/>");
                for line in cell.split('\n') {
                    self.body.push_str(&paragraph(line));
                }
                self.body.push_str("</w:tc>");
            }
            self.body.push_str("</w:tr>");
        }
        self.body.push_str("</w:tbl>");
        self
    }

    /// Append body XML as is, for layouts `table` cannot express.
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn document_xml(&self) -> String {
        format!("{DOCUMENT_HEAD}{}{DOCUMENT_TAIL}", self.body)
    }

    /// The packaged `.docx` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let opts = zip::write::FileOptions::default();
            zip.start_file("[Content_Types].xml", opts).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types/>"#).unwrap();
            zip.start_file("word/document.xml", opts).unwrap();
            zip.write_all(self.document_xml().as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

fn paragraph(text: &str) -> String {
    if text.is_empty() {
        return "<w:p/>".to_string();
    }
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The metadata + two question tables used by most tests.
pub fn sample_paper() -> DocxBuilder {
    DocxBuilder::new()
        .paragraph("CAT 2024 paper metadata")
        .table(&[
            &["Slug", "cat-2024-slot-1"],
            &["Title", "CAT 2024 Slot 1"],
            &["Description", "Morning slot"],
            &["Year", "2024.0"],
            &["Total Questions", "4"],
            &["Total Marks", "198"],
            &["Duration Minutes", "120"],
            &["Sections", "VARC | 24 | 40 | 72; DILR | 22 | 40 | 66; QA | 22 | 40 | 66"],
        ])
        .paragraph("Instructions")
        .table(&[&["Note"], &["Read every question twice"]])
        .table(&[
            &["Section", "QNo", "Question", "Type", "OptionA", "OptionB", "OptionC", "OptionD", "Answer", "Topic"],
            &["varc", "1", "Main idea of the passage?", "MCQ", "Alpha", "Beta", "Gamma", "Delta", "B", "RC"],
            &["VARC", "", "Odd sentence out", "TITA", "", "", "", "", "3", "Para"],
            &["", "", "", "", "", "", "", "", "", ""],
        ])
        .table(&[
            &["Section", "Question", "Question Type", "A", "B", "C", "D", "Correct Answer", "Solution"],
            &["QA", "If x + 2 = 5, x = ?", "MCQ", "1", "2", "3", "4", "3", "Subtract 2"],
            &["DILR", "Count the <valid> arrangements", "TITA", "", "", "", "", "12", ""],
        ])
}
