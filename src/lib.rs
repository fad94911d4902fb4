//! # paper-docx2json
//!
//! Convert an exam "paper metadata" DOCX into the JSON document the practice
//! app imports, and optionally push it into a Supabase (PostgREST) backend.
//!
//! ## Input layout
//!
//! The DOCX carries tables only as far as this crate is concerned:
//!
//! * the **first table** is a two-column key/value list (`Slug`, `Title`,
//!   `Year`, `Sections`, ...);
//! * every **later table** whose header row names a question column is a
//!   question table, one question per row. Other tables are ignored.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DOCX
//!  │
//!  ├─ 1. Input     resolve path, check zip magic
//!  ├─ 2. Extract   word/document.xml → top-level tables of cell text
//!  ├─ 3. Metadata  first table → normalised key/value map
//!  ├─ 4. Questions later tables → Question records
//!  ├─ 5. Assemble  fallbacks + defaults → PaperDocument
//!  ├─ 6. Output    pretty JSON, atomic write
//!  └─ 7. Upload    (optional) upsert paper, replace questions, publish
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paper_docx2json::{convert_to_file, validate_document, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let doc = convert_to_file("paper.docx", "data/cat-2024.json", &ConversionConfig::default())?;
//!     for issue in validate_document(&doc) {
//!         eprintln!("warning: {issue}");
//!     }
//!     println!("{} questions", doc.questions.len());
//!     Ok(())
//! }
//! ```
//!
//! Uploading needs a tokio runtime:
//!
//! ```rust,no_run
//! use paper_docx2json::{convert, upload_document, ConversionConfig, SupabaseStore, UploadConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // NEXT_PUBLIC_SUPABASE_URL / SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY
//!     let upload = UploadConfig::from_env()?.publish(true).build()?;
//!     let doc = convert("paper.docx", &ConversionConfig::default())?;
//!     let store = SupabaseStore::new(&upload)?;
//!     let report = upload_document(&store, &doc, &upload).await?;
//!     println!("paper id={}", report.paper_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `paper2json` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! paper-docx2json = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod store;
pub mod upload;
pub mod validate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, ProgressCallback, UploadConfig,
    UploadConfigBuilder,
};
pub use convert::{
    convert, convert_from_bytes, convert_tables, convert_to_file, load_document, write_document,
};
pub use error::{PaperError, ValidationIssue};
pub use output::{Paper, PaperDocument, Question, QuestionType, Section};
pub use progress::{NoopProgressCallback, UploadProgressCallback};
pub use store::{Record, RecordId, RemoteStore, SupabaseStore};
pub use upload::{upload_document, UploadReport};
pub use validate::{ensure_valid, validate_document};
