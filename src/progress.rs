//! Progress-callback trait for remote upload events.
//!
//! Inject an [`Arc<dyn UploadProgressCallback>`] via
//! [`crate::config::UploadConfigBuilder::progress_callback`] to receive events
//! as the upload sequence runs: the paper upsert, each question batch, and
//! the final report.
//!
//! # Example
//!
//! ```rust
//! use paper_docx2json::{UploadConfig, UploadProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct BatchCounter {
//!     batches: AtomicUsize,
//! }
//!
//! impl UploadProgressCallback for BatchCounter {
//!     fn on_batch_complete(&self, inserted: usize, total: usize) {
//!         self.batches.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{inserted}/{total} questions inserted");
//!     }
//! }
//!
//! let counter = Arc::new(BatchCounter { batches: AtomicUsize::new(0) });
//! let config = UploadConfig::builder("https://example.supabase.co", "service-key")
//!     .progress_callback(counter as Arc<dyn UploadProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::store::RecordId;
use crate::upload::UploadReport;

/// Called by [`crate::upload::upload_document`] as it works through the
/// upload sequence.
///
/// All methods default to no-ops so callers only override what they care
/// about. Events fire strictly in order since the sequence never overlaps
/// calls, but the trait is `Send + Sync` so a callback can be shared with
/// other tasks.
pub trait UploadProgressCallback: Send + Sync {
    /// Called once before the paper upsert, with the number of questions
    /// that will be inserted.
    fn on_upload_start(&self, total_questions: usize) {
        let _ = total_questions;
    }

    /// Called after the paper record was updated (`created == false`) or
    /// inserted (`created == true`).
    fn on_paper_upserted(&self, paper_id: &RecordId, created: bool) {
        let _ = (paper_id, created);
    }

    /// Called after each question batch lands.
    ///
    /// # Arguments
    /// * `inserted`: questions inserted so far, including this batch
    /// * `total`: questions that will be inserted overall
    fn on_batch_complete(&self, inserted: usize, total: usize) {
        let _ = (inserted, total);
    }

    /// Called once after the whole sequence succeeded.
    fn on_upload_complete(&self, report: &UploadReport) {
        let _ = report;
    }
}

/// A callback that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressCallback;

impl UploadProgressCallback for NoopProgressCallback {}
