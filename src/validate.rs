//! Structural checks on a converted document.
//!
//! Conversion never fails on odd content; it produces the best document it
//! can. These checks report what the importer on the other side would
//! reject or what is probably a typo in the source table.

use crate::error::{PaperError, ValidationIssue};
use crate::output::{PaperDocument, QuestionType};
use std::collections::HashSet;

/// Section names the exam actually has.
pub const KNOWN_SECTIONS: [&str; 3] = ["VARC", "DILR", "QA"];

/// Collect every issue in `doc`, in document order.
pub fn validate_document(doc: &PaperDocument) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let paper = &doc.paper;

    for (field, value) in [("slug", &paper.slug), ("title", &paper.title)] {
        if value.trim().is_empty() {
            issues.push(ValidationIssue::PaperFieldMissing {
                field: field.to_string(),
            });
        }
    }
    for (field, value) in [
        ("year", i64::from(paper.year)),
        ("total_questions", paper.total_questions),
    ] {
        if value == 0 {
            issues.push(ValidationIssue::PaperFieldMissing {
                field: field.to_string(),
            });
        }
    }
    if paper.sections.is_empty() {
        issues.push(ValidationIssue::NoSections);
    }
    if paper.total_questions != doc.questions.len() as i64 {
        issues.push(ValidationIssue::QuestionCountMismatch {
            declared: paper.total_questions,
            found: doc.questions.len(),
        });
    }

    let mut seen = HashSet::new();
    for (idx, q) in doc.questions.iter().enumerate() {
        let position = idx + 1;

        for (field, value) in [
            ("section", &q.section),
            ("question_text", &q.question_text),
            ("correct_answer", &q.correct_answer),
        ] {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::QuestionFieldMissing {
                    question: position,
                    field: field.to_string(),
                });
            }
        }

        if q.question_number == 0 {
            issues.push(ValidationIssue::QuestionFieldMissing {
                question: position,
                field: "question_number".to_string(),
            });
        }

        if !q.section.is_empty() && !KNOWN_SECTIONS.contains(&q.section.as_str()) {
            issues.push(ValidationIssue::UnknownSection {
                question: position,
                section: q.section.clone(),
            });
        }

        let has_options = q.options.as_ref().is_some_and(|o| !o.is_empty());
        if q.question_type == QuestionType::Mcq && !has_options {
            issues.push(ValidationIssue::McqWithoutOptions { question: position });
        }

        if !seen.insert((q.section.as_str(), q.question_number)) {
            issues.push(ValidationIssue::DuplicateQuestion {
                question: position,
                section: q.section.clone(),
                number: q.question_number,
            });
        }
    }

    issues
}

/// Fail with [`PaperError::ValidationFailed`] when `doc` has any issue.
pub fn ensure_valid(doc: &PaperDocument) -> Result<(), PaperError> {
    let issues = validate_document(doc);
    match issues.first() {
        None => Ok(()),
        Some(first) => Err(PaperError::ValidationFailed {
            count: issues.len(),
            first: first.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use crate::convert::convert_tables;
    use crate::pipeline::extract::RawTable;

    fn sample() -> PaperDocument {
        let tables = [
            RawTable::from_rows([vec!["Slug", "cat-2024"], vec!["Title", "CAT 2024"]]),
            RawTable::from_rows([
                vec!["Section", "Question", "Type", "OptionA", "OptionB", "Answer"],
                vec!["VARC", "Pick one", "MCQ", "x", "y", "x"],
                vec!["QA", "Type it", "TITA", "", "", "12"],
            ]),
        ];
        convert_tables(&tables, &ConversionConfig::default()).unwrap()
    }

    #[test]
    fn test_clean_document_has_no_issues() {
        let doc = sample();
        assert_eq!(validate_document(&doc), Vec::new());
        assert!(ensure_valid(&doc).is_ok());
    }

    #[test]
    fn test_question_issues_reported_by_position() {
        let mut doc = sample();
        doc.questions[0].options = None;
        doc.questions[1].section = "GK".into();
        doc.questions[1].correct_answer = " ".into();

        assert_eq!(
            validate_document(&doc),
            vec![
                ValidationIssue::McqWithoutOptions { question: 1 },
                ValidationIssue::QuestionFieldMissing {
                    question: 2,
                    field: "correct_answer".into()
                },
                ValidationIssue::UnknownSection {
                    question: 2,
                    section: "GK".into()
                },
            ]
        );
    }

    #[test]
    fn test_duplicates_and_count_mismatch() {
        let mut doc = sample();
        let mut dup = doc.questions[0].clone();
        dup.question_text = "Again".into();
        doc.questions.push(dup);

        let issues = validate_document(&doc);
        assert!(issues.contains(&ValidationIssue::QuestionCountMismatch {
            declared: 2,
            found: 3
        }));
        assert!(issues.contains(&ValidationIssue::DuplicateQuestion {
            question: 3,
            section: "VARC".into(),
            number: 1
        }));
    }

    #[test]
    fn test_paper_level_issues() {
        let mut doc = sample();
        doc.paper.slug = String::new();
        doc.paper.sections.clear();
        let issues = validate_document(&doc);
        assert_eq!(
            &issues[..2],
            [
                ValidationIssue::PaperFieldMissing {
                    field: "slug".into()
                },
                ValidationIssue::NoSections,
            ]
        );
    }

    #[test]
    fn test_zero_numbers_count_as_missing() {
        let tables = [
            RawTable::from_rows([
                vec!["Slug", "cat-2024"],
                vec!["Title", "CAT 2024"],
                vec!["Year", "0"],
                vec!["Total Questions", "0"],
            ]),
            RawTable::from_rows([
                vec!["QNo", "Section", "Question", "Type", "Answer"],
                vec!["0", "QA", "Type it", "TITA", "12"],
            ]),
        ];
        let doc = convert_tables(&tables, &ConversionConfig::default()).unwrap();
        assert_eq!(doc.questions[0].question_number, 0);

        let issues = validate_document(&doc);
        for field in ["year", "total_questions"] {
            assert!(
                issues.contains(&ValidationIssue::PaperFieldMissing {
                    field: field.into()
                }),
                "{field} not flagged: {issues:?}"
            );
        }
        assert!(issues.contains(&ValidationIssue::QuestionFieldMissing {
            question: 1,
            field: "question_number".into()
        }));
    }

    #[test]
    fn test_ensure_valid_reports_count_and_first() {
        let mut doc = sample();
        doc.questions[0].options = Some(Vec::new());
        doc.questions[1].section = "GK".into();
        match ensure_valid(&doc).unwrap_err() {
            PaperError::ValidationFailed { count, first } => {
                assert_eq!(count, 2);
                assert_eq!(first, "Question 1 is MCQ but has no options");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
