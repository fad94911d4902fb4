//! Question tables: detect them by their header row and map each data row
//! into a [`Question`].
//!
//! Any table after the metadata table may hold questions. A table qualifies
//! when its normalised header row has a question column (`question`,
//! `question_text`, `question_number`, `qno` or `sno`) *and* some column
//! whose name contains `answer`. Tables failing either test are skipped
//! whole.

use crate::output::{Question, QuestionType, POSITIVE_MARKS};
use crate::pipeline::extract::RawTable;
use crate::pipeline::metadata::{normalize_key, parse_int};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Normalised headers that mark a question column.
pub const QUESTION_HEADERS: [&str; 5] = ["question", "question_text", "question_number", "qno", "sno"];

/// Section assigned to rows that leave the section cell empty.
pub const DEFAULT_SECTION: &str = "VARC";

/// Bare option columns used when an MCQ has no `option<x>` columns.
const BARE_OPTION_KEYS: [&str; 4] = ["a", "b", "c", "d"];

static RE_OPTION_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^option[a-d]").unwrap());

/// Returns true when `table` looks like a question table.
pub fn is_question_table(table: &RawTable) -> bool {
    let Some(header) = table.header() else {
        return false;
    };
    let headers: Vec<String> = header.iter().map(|h| normalize_key(h)).collect();
    let has_question = headers.iter().any(|h| QUESTION_HEADERS.contains(&h.as_str()));
    let has_answer = headers.iter().any(|h| h.contains("answer"));
    has_question && has_answer
}

/// Map every qualifying table's data rows to questions.
///
/// Order is table order, then row order. Rows without question text are
/// skipped and do not consume a running question number.
pub fn parse_questions(tables: &[RawTable]) -> Vec<Question> {
    let mut questions = Vec::new();
    for (idx, table) in tables.iter().enumerate() {
        if !is_question_table(table) {
            debug!("Table {} is not a question table, skipping", idx + 1);
            continue;
        }
        let headers: Vec<String> = table.rows[0].iter().map(|h| normalize_key(h)).collect();
        let before = questions.len();
        for cells in &table.rows[1..] {
            let row = RowMap::new(&headers, cells);
            if let Some(q) = map_row(&headers, &row, questions.len() as i64 + 1) {
                questions.push(q);
            }
        }
        info!(
            "Table {}: {} questions from {} data rows",
            idx + 1,
            questions.len() - before,
            table.rows.len() - 1
        );
    }
    questions
}

/// One data row keyed by normalised header.
///
/// Built by zipping headers and cells, so extra cells are dropped and
/// missing trailing cells leave their key absent. A repeated header keeps
/// the last cell.
#[derive(Debug)]
struct RowMap<'a> {
    cells: HashMap<&'a str, &'a str>,
}

impl<'a> RowMap<'a> {
    fn new(headers: &'a [String], cells: &'a [String]) -> Self {
        Self {
            cells: headers
                .iter()
                .zip(cells)
                .map(|(h, c)| (h.as_str(), c.as_str()))
                .collect(),
        }
    }

    /// Non-empty value of the first present key.
    fn first_of(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter()
            .filter_map(|k| self.cells.get(*k).copied())
            .find(|v| !v.is_empty())
    }

    fn owned(&self, keys: &[&str]) -> Option<String> {
        self.first_of(keys).map(str::to_string)
    }
}

fn map_row(headers: &[String], row: &RowMap<'_>, next_number: i64) -> Option<Question> {
    let question_text = row.owned(&["question_text", "question"])?;

    let section = row
        .first_of(&["section"])
        .map(str::to_uppercase)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SECTION.to_string());

    let raw_type = row
        .first_of(&["type", "question_type"])
        .map(str::to_uppercase)
        .unwrap_or_else(|| "MCQ".to_string());
    let question_type = QuestionType::from_raw(&raw_type);

    let question_number = row
        .first_of(&["question_number", "qno", "sno"])
        .and_then(parse_int)
        .unwrap_or(next_number);

    let mut options: Vec<String> = headers
        .iter()
        .filter(|h| RE_OPTION_HEADER.is_match(h))
        .filter_map(|h| row.owned(&[h.as_str()]))
        .collect();
    if raw_type == "MCQ" && options.is_empty() {
        options = BARE_OPTION_KEYS
            .iter()
            .filter_map(|k| row.owned(&[*k]))
            .collect();
    }

    Some(Question {
        section,
        question_number,
        question_text,
        question_type,
        options: (!options.is_empty()).then_some(options),
        correct_answer: row
            .owned(&["answer", "correct_answer"])
            .unwrap_or_default(),
        positive_marks: POSITIVE_MARKS,
        negative_marks: question_type.negative_marks(),
        difficulty: row.owned(&["difficulty"]),
        topic: row.owned(&["topic"]),
        subtopic: row.owned(&["subtopic"]),
        solution_text: row.owned(&["solution", "solution_text"]),
    })
}
