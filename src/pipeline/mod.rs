//! Pipeline stages for DOCX-to-JSON conversion.
//!
//! Each submodule implements exactly one transformation step and is a pure
//! function of its input, so every heuristic can be tested on hand-built
//! tables without a DOCX file.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ metadata ──▶ sections ──┐
//! (path)    (tables)    (table 0)    (breakup)  ├──▶ assemble
//!                   └─▶ questions ──────────────┘   (PaperDocument)
//!                       (tables 1..)
//! ```
//!
//! 1. [`input`]: validate the user-supplied path (exists, readable, zip magic)
//! 2. [`extract`]: unzip `word/document.xml` and recover every top-level
//!    table as rows of whitespace-collapsed cell text
//! 3. [`metadata`]: turn the first table's key/value rows into a
//!    [`metadata::MetadataMap`] with normalised keys
//! 4. [`sections`]: split the section-breakup field into [`crate::output::Section`]s
//! 5. [`questions`]: detect question tables by their headers and map each row
//! 6. [`assemble`]: apply fallback chains and fixed defaults to build the
//!    final [`crate::output::PaperDocument`]

pub mod assemble;
pub mod extract;
pub mod input;
pub mod metadata;
pub mod questions;
pub mod sections;
