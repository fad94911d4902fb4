//! Schema assembly: metadata + questions → [`PaperDocument`].
//!
//! Every paper field has a fallback chain of metadata keys and a default.
//! Numeric fields are parsed leniently and fall back to their default
//! rather than failing the run.

use crate::config::ConversionConfig;
use crate::output::{
    Paper, PaperDocument, Question, DEFAULT_DIFFICULTY_LEVEL, DEFAULT_DURATION_MINUTES,
    NEGATIVE_MARKS, POSITIVE_MARKS,
};
use crate::pipeline::metadata::{parse_int, MetadataMap};
use crate::pipeline::sections::{derive_sections, parse_sections};
use tracing::{debug, warn};

/// Build the final document from the metadata map and parsed questions.
pub fn build_document(
    meta: &MetadataMap,
    questions: Vec<Question>,
    config: &ConversionConfig,
) -> PaperDocument {
    let slug = meta
        .first_of(&["slug", "paper_slug"])
        .unwrap_or(&config.fallback_slug)
        .to_string();
    let title = meta
        .first_of(&["title", "paper_title"])
        .unwrap_or(&config.fallback_title)
        .to_string();
    let description = meta.first_of(&["description", "desc"]).map(str::to_string);

    let year = int_field(meta, &["year", "exam_year"], "year")
        .and_then(|y| i32::try_from(y).ok())
        .unwrap_or_else(|| config.current_year());
    let total_questions = int_field(meta, &["total_questions"], "total_questions")
        .unwrap_or(questions.len() as i64);
    let total_marks = int_field(meta, &["total_marks"], "total_marks");
    let duration_minutes = int_field(meta, &["duration_minutes", "duration"], "duration")
        .unwrap_or(DEFAULT_DURATION_MINUTES);

    let mut sections = parse_sections(meta);
    if sections.is_empty() && !questions.is_empty() {
        sections = derive_sections(&questions);
        debug!("Derived {} sections from questions", sections.len());
    }

    let paper = Paper {
        slug,
        title,
        description,
        year,
        total_questions,
        total_marks,
        duration_minutes,
        sections,
        default_positive_marks: POSITIVE_MARKS,
        default_negative_marks: NEGATIVE_MARKS,
        difficulty_level: meta
            .first_of(&["difficulty_level"])
            .unwrap_or(DEFAULT_DIFFICULTY_LEVEL)
            .to_string(),
        is_free: true,
        published: false,
        available_from: None,
        available_until: None,
    };

    PaperDocument { paper, questions }
}

/// Parse the first non-empty value among `keys`; warn when it is not numeric.
fn int_field(meta: &MetadataMap, keys: &[&str], label: &str) -> Option<i64> {
    let raw = meta.first_of(keys)?;
    let parsed = parse_int(raw);
    if parsed.is_none() {
        warn!("Ignoring non-numeric {}: {:?}", label, raw);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{QuestionType, Section};

    fn config() -> ConversionConfig {
        ConversionConfig::builder().reference_year(2031).build().unwrap()
    }

    fn question(section: &str, n: i64) -> Question {
        Question {
            section: section.into(),
            question_number: n,
            question_text: format!("Q{n}"),
            question_type: QuestionType::Mcq,
            options: Some(vec!["a".into(), "b".into()]),
            correct_answer: "a".into(),
            positive_marks: POSITIVE_MARKS,
            negative_marks: NEGATIVE_MARKS,
            difficulty: None,
            topic: None,
            subtopic: None,
            solution_text: None,
        }
    }

    #[test]
    fn test_defaults_on_empty_metadata() {
        let doc = build_document(&MetadataMap::new(), Vec::new(), &config());
        let p = &doc.paper;
        assert_eq!(p.slug, "cat-2024");
        assert_eq!(p.title, "CAT 2024");
        assert_eq!(p.description, None);
        assert_eq!(p.year, 2031);
        assert_eq!(p.total_questions, 0);
        assert_eq!(p.total_marks, None);
        assert_eq!(p.duration_minutes, 120);
        assert!(p.sections.is_empty());
        assert_eq!(p.default_positive_marks, 3.0);
        assert_eq!(p.default_negative_marks, 1.0);
        assert_eq!(p.difficulty_level, "cat-level");
        assert!(p.is_free);
        assert!(!p.published);
        assert_eq!(p.available_from, None);
        assert_eq!(p.available_until, None);
    }

    #[test]
    fn test_year_from_decimal_string() {
        let meta: MetadataMap = [("Year", "2024.0")].into_iter().collect();
        let doc = build_document(&meta, Vec::new(), &config());
        assert_eq!(doc.paper.year, 2024);
    }

    #[test]
    fn test_fallback_chains() {
        let meta: MetadataMap = [
            ("Paper Slug", "cat-2023-slot-2"),
            ("Paper Title", "CAT 2023 Slot 2"),
            ("Desc", "Second slot"),
            ("Exam Year", "2023"),
            ("Total Marks", "198"),
            ("Duration", "120.0"),
            ("Difficulty Level", "hard"),
        ]
        .into_iter()
        .collect();
        let doc = build_document(&meta, vec![question("QA", 1)], &config());
        let p = &doc.paper;
        assert_eq!(p.slug, "cat-2023-slot-2");
        assert_eq!(p.title, "CAT 2023 Slot 2");
        assert_eq!(p.description.as_deref(), Some("Second slot"));
        assert_eq!(p.year, 2023);
        assert_eq!(p.total_questions, 1);
        assert_eq!(p.total_marks, Some(198));
        assert_eq!(p.duration_minutes, 120);
        assert_eq!(p.difficulty_level, "hard");
    }

    #[test]
    fn test_unparseable_numbers_degrade() {
        let meta: MetadataMap = [
            ("Year", "twenty"),
            ("Total Questions", "many"),
            ("Total Marks", "?"),
            ("Duration Minutes", "two hours"),
        ]
        .into_iter()
        .collect();
        let doc = build_document(&meta, vec![question("VARC", 1), question("VARC", 2)], &config());
        let p = &doc.paper;
        assert_eq!(p.year, 2031);
        assert_eq!(p.total_questions, 2);
        assert_eq!(p.total_marks, None);
        assert_eq!(p.duration_minutes, 120);
    }

    #[test]
    fn test_declared_sections_win_over_derived() {
        let meta: MetadataMap = [("Sections", "VARC | 24 | 40 | 72")].into_iter().collect();
        let doc = build_document(&meta, vec![question("QA", 1)], &config());
        assert_eq!(
            doc.paper.sections,
            vec![Section {
                name: "VARC".into(),
                questions: Some(24),
                time: Some(40),
                marks: Some(72),
            }]
        );
    }

    #[test]
    fn test_sections_derived_when_breakup_unusable() {
        let meta: MetadataMap = [("Sections", "VARC | abc")].into_iter().collect();
        let qs = vec![question("DILR", 1), question("DILR", 2), question("QA", 3)];
        let doc = build_document(&meta, qs, &config());
        let names: Vec<(&str, Option<i64>)> = doc
            .paper
            .sections
            .iter()
            .map(|s| (s.name.as_str(), s.questions))
            .collect();
        assert_eq!(names, [("DILR", Some(2)), ("QA", Some(1))]);
    }
}
