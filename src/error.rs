//! Error types for the paper-docx2json library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`PaperError`]: **Fatal**: the run cannot proceed (bad input file, no
//!   tables in the document, remote store not configured, a remote call
//!   failed). Returned as `Err(PaperError)` from every public entry point.
//!
//! * [`ValidationIssue`]: **Non-fatal**: the converted document is
//!   structurally complete but something looks off (an MCQ without options,
//!   an unknown section name). Collected by
//!   [`crate::validate::validate_document`] so callers decide whether to warn
//!   or abort.
//!
//! Numeric fields that fail to parse are neither: they degrade to a default
//! inside the mapper and never surface here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the paper-docx2json library.
#[derive(Debug, Error)]
pub enum PaperError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("DOCX file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a zip container.
    #[error("File is not a valid DOCX: '{path}'\nFirst bytes: {magic:?}")]
    NotADocx { path: PathBuf, magic: [u8; 4] },

    // ── Document errors ───────────────────────────────────────────────────
    /// The zip container or its `word/document.xml` part cannot be read.
    #[error("DOCX is corrupt: {detail}")]
    CorruptDocument { detail: String },

    /// The document parsed but contains no tables at all.
    #[error("DOCX contains no tables to parse")]
    NoTables,

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read a previously written JSON document.
    #[error("Failed to read document '{path}': {source}")]
    DocumentReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON serialisation failed: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// A required environment variable for the remote store is not set.
    #[error("Missing environment variable {var}\nSet it in the environment before running with --upload.")]
    MissingEnv { var: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Remote store errors ───────────────────────────────────────────────
    /// The HTTP request could not be sent or its body could not be read.
    #[error("Remote {operation} on '{table}' failed: {source}")]
    RemoteRequest {
        operation: &'static str,
        table: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote store answered with a non-success status.
    #[error("Remote {operation} on '{table}' returned HTTP {status}: {body}")]
    RemoteStatus {
        operation: &'static str,
        table: String,
        status: u16,
        body: String,
    },

    /// The remote store answered 2xx but the body was not what we expected.
    #[error("Unexpected response from remote {operation} on '{table}': {detail}")]
    UnexpectedResponse {
        operation: &'static str,
        table: String,
        detail: String,
    },

    // ── Validation ────────────────────────────────────────────────────────
    /// Strict mode refused a document that has validation issues.
    #[error("Document failed validation with {count} issue(s); first: {first}")]
    ValidationFailed { count: usize, first: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal problem found in a converted document.
///
/// `question` is the 1-based position in the question list, not the
/// question number printed on the paper.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationIssue {
    /// A required paper-level field is empty.
    #[error("Paper is missing required field '{field}'")]
    PaperFieldMissing { field: String },

    /// The paper has no sections, neither declared nor derived.
    #[error("Paper has no sections")]
    NoSections,

    /// The declared question total disagrees with the questions found.
    #[error("Paper declares {declared} questions but {found} were parsed")]
    QuestionCountMismatch { declared: i64, found: usize },

    /// A required question field is empty.
    #[error("Question {question} is missing required field '{field}'")]
    QuestionFieldMissing { question: usize, field: String },

    /// The question's section is not one of the known exam sections.
    #[error("Question {question} has unknown section '{section}'")]
    UnknownSection { question: usize, section: String },

    /// An MCQ question carries no options.
    #[error("Question {question} is MCQ but has no options")]
    McqWithoutOptions { question: usize },

    /// Two questions share the same section and number.
    #[error("Question {question} duplicates {section} #{number}")]
    DuplicateQuestion {
        question: usize,
        section: String,
        number: i64,
    },
}
