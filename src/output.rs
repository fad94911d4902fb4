//! Output types: the fixed-shape JSON document produced by a conversion.
//!
//! Field names and nullability match the importer schema exactly, so these
//! structs serialise straight to the file written by
//! [`crate::convert::convert_to_file`] and deserialise it back again.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marks awarded for a correct answer. Fixed for every question.
pub const POSITIVE_MARKS: f64 = 3.0;

/// Marks deducted for a wrong MCQ answer. TITA questions deduct nothing.
pub const NEGATIVE_MARKS: f64 = 1.0;

/// Difficulty label used when the metadata table has none.
pub const DEFAULT_DIFFICULTY_LEVEL: &str = "cat-level";

/// Exam duration used when the metadata table has none.
pub const DEFAULT_DURATION_MINUTES: i64 = 120;

/// The JSON root: one paper and its questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperDocument {
    pub paper: Paper,
    pub questions: Vec<Question>,
}

/// Paper-level metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub year: i32,
    pub total_questions: i64,
    pub total_marks: Option<i64>,
    pub duration_minutes: i64,
    pub sections: Vec<Section>,
    pub default_positive_marks: f64,
    pub default_negative_marks: f64,
    pub difficulty_level: String,
    pub is_free: bool,
    pub published: bool,
    pub available_from: Option<String>,
    pub available_until: Option<String>,
}

/// A named sub-part of a paper with its own allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Upper-cased section name, e.g. `VARC`.
    pub name: String,
    pub questions: Option<i64>,
    /// Minutes allotted to the section.
    pub time: Option<i64>,
    pub marks: Option<i64>,
}

/// One exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub section: String,
    pub question_number: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub positive_marks: f64,
    pub negative_marks: f64,
    pub difficulty: Option<String>,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
    pub solution_text: Option<String>,
}

/// The two question kinds the importer accepts.
///
/// Raw table values are collapsed onto these with [`QuestionType::from_raw`];
/// anything that is not literally `TITA` becomes `MCQ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestionType {
    /// Multiple-choice question.
    #[default]
    #[serde(rename = "MCQ")]
    Mcq,
    /// "Type In The Answer": free-text answer, no options, no negative marks.
    #[serde(rename = "TITA")]
    Tita,
}

impl QuestionType {
    /// Collapse an upper-cased raw type cell onto the closed set.
    pub fn from_raw(raw_upper: &str) -> Self {
        if raw_upper == "TITA" {
            QuestionType::Tita
        } else {
            QuestionType::Mcq
        }
    }

    /// Marks deducted for a wrong answer of this type.
    pub fn negative_marks(self) -> f64 {
        match self {
            QuestionType::Mcq => NEGATIVE_MARKS,
            QuestionType::Tita => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Tita => "TITA",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
