//! Upload sequence: push a converted document into the remote store.
//!
//! The sequence is strictly sequential and never retried:
//!
//! ```text
//! find paper by slug ──▶ update it, or insert it   (upsert, not atomic)
//!        │
//!        ▼
//! delete questions where paper_id = id
//!        │
//!        ▼
//! insert questions, batch_size rows per call
//!        │
//!        ▼
//! update paper { published: true }                 (only when publishing)
//! ```
//!
//! Any failing call aborts the rest. A paper upserted without its questions
//! is a possible end state; the next successful run repairs it since every
//! step replaces rather than appends.

use crate::config::UploadConfig;
use crate::error::PaperError;
use crate::output::{Paper, PaperDocument, Question, DEFAULT_DURATION_MINUTES};
use crate::store::{RecordId, RemoteStore};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Table holding paper records.
pub const PAPERS_TABLE: &str = "papers";

/// Table holding question records.
pub const QUESTIONS_TABLE: &str = "questions";

/// Total marks written for papers that do not declare any.
pub const DEFAULT_TOTAL_MARKS: i64 = 198;

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReport {
    /// Primary key of the paper record.
    pub paper_id: RecordId,
    /// True when the paper was inserted rather than updated.
    pub created: bool,
    pub questions_inserted: usize,
    pub published: bool,
}

/// Run the full upload sequence for `doc` against `store`.
pub async fn upload_document<S: RemoteStore>(
    store: &S,
    doc: &PaperDocument,
    config: &UploadConfig,
) -> Result<UploadReport, PaperError> {
    let progress = config.progress_callback.as_deref();
    let total = doc.questions.len();
    info!("Uploading '{}' with {} questions", doc.paper.slug, total);
    if let Some(cb) = progress {
        cb.on_upload_start(total);
    }

    let (paper_id, created) = upsert_paper(store, &doc.paper, total).await?;
    info!(
        "Paper '{}' {} with id {}",
        doc.paper.slug,
        if created { "created" } else { "updated" },
        paper_id
    );
    if let Some(cb) = progress {
        cb.on_paper_upserted(&paper_id, created);
    }

    store
        .delete_where(QUESTIONS_TABLE, "paper_id", &paper_id)
        .await?;
    debug!("Deleted existing questions for paper {}", paper_id);

    let mut inserted = 0;
    for batch in doc.questions.chunks(config.batch_size.max(1)) {
        let rows: Vec<Value> = batch.iter().map(|q| question_row(&paper_id, q)).collect();
        store.insert(QUESTIONS_TABLE, Value::Array(rows)).await?;
        inserted += batch.len();
        debug!("Inserted {}/{} questions", inserted, total);
        if let Some(cb) = progress {
            cb.on_batch_complete(inserted, total);
        }
    }

    if config.publish {
        store
            .update(PAPERS_TABLE, &paper_id, json!({ "published": true }))
            .await?;
        info!("Published paper {}", paper_id);
    }

    let report = UploadReport {
        paper_id,
        created,
        questions_inserted: inserted,
        published: config.publish,
    };
    if let Some(cb) = progress {
        cb.on_upload_complete(&report);
    }
    Ok(report)
}

/// Update the paper with the same slug, or insert a new one.
///
/// Returns the paper id and whether it was newly created.
async fn upsert_paper<S: RemoteStore>(
    store: &S,
    paper: &Paper,
    question_count: usize,
) -> Result<(RecordId, bool), PaperError> {
    let payload = paper_payload(paper, question_count);

    if let Some(existing) = store.find_by_slug(PAPERS_TABLE, &paper.slug).await? {
        let id = RecordId::from_record(&existing).ok_or_else(|| missing_id("select"))?;
        store.update(PAPERS_TABLE, &id, payload).await?;
        return Ok((id, false));
    }

    let created = store.insert(PAPERS_TABLE, payload).await?;
    let id = created
        .first()
        .and_then(RecordId::from_record)
        .ok_or_else(|| missing_id("insert"))?;
    Ok((id, true))
}

fn missing_id(operation: &'static str) -> PaperError {
    PaperError::UnexpectedResponse {
        operation,
        table: PAPERS_TABLE.to_string(),
        detail: "row has no usable 'id' column".into(),
    }
}

/// The paper record as written to the store.
///
/// Applies the importer's own defaults on top of the converted paper:
/// zero or missing marks become 198, a zero duration becomes 120 and a
/// zero question total becomes the number of questions. Other values,
/// negative ones included, are written as they are.
pub fn paper_payload(paper: &Paper, question_count: usize) -> Value {
    let total_questions = if paper.total_questions != 0 {
        paper.total_questions
    } else {
        question_count as i64
    };
    let duration = if paper.duration_minutes != 0 {
        paper.duration_minutes
    } else {
        DEFAULT_DURATION_MINUTES
    };
    json!({
        "slug": paper.slug,
        "title": paper.title,
        "description": paper.description,
        "year": paper.year,
        "total_questions": total_questions,
        "total_marks": paper.total_marks.filter(|m| *m != 0).unwrap_or(DEFAULT_TOTAL_MARKS),
        "duration_minutes": duration,
        "sections": paper.sections,
        "default_positive_marks": paper.default_positive_marks,
        "default_negative_marks": paper.default_negative_marks,
        "difficulty_level": paper.difficulty_level,
        "is_free": paper.is_free,
        "published": paper.published,
        "available_from": paper.available_from,
        "available_until": paper.available_until,
    })
}

/// One question record as written to the store.
pub fn question_row(paper_id: &RecordId, q: &Question) -> Value {
    json!({
        "paper_id": paper_id.as_json(),
        "section": q.section,
        "question_number": q.question_number,
        "question_text": q.question_text,
        "question_type": q.question_type,
        "options": q.options,
        "correct_answer": q.correct_answer,
        "positive_marks": q.positive_marks,
        "negative_marks": q.negative_marks,
        "difficulty": q.difficulty,
        "topic": q.topic,
        "subtopic": q.subtopic,
        "solution_text": q.solution_text,
        "solution_image_url": null,
        "video_solution_url": null,
        "is_active": true,
    })
}
