//! Section breakdown: parse the free-text breakup field, or derive one
//! from the questions actually found.
//!
//! The breakup field is human-authored, e.g.
//!
//! ```text
//! VARC | 24 | 40 | 72; DILR | 20 | 40 | 60; QA : 22 : 40 : 66
//! ```
//!
//! Lines are separated by newlines or `;`, fields by `|`, `,` or `:`.
//! The question count is mandatory: a line whose second field is not a
//! number is dropped whole. Time and marks are optional and degrade to
//! `None` individually.

use crate::output::{Question, Section};
use crate::pipeline::metadata::{parse_int, MetadataMap};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Metadata keys that may hold the section breakup, in lookup order.
pub const SECTION_KEYS: [&str; 3] = ["sections", "section_breakup", "sectionwise_breakup"];

static RE_FIELD_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[|,:]").unwrap());

/// Parse sections from the first breakup field present in `meta`.
///
/// Returns an empty list when no breakup field is present; the assembler
/// then derives sections from the questions instead.
pub fn parse_sections(meta: &MetadataMap) -> Vec<Section> {
    let Some(raw) = meta.first_of(&SECTION_KEYS) else {
        return Vec::new();
    };

    raw.split('\n')
        .flat_map(|chunk| chunk.split(';'))
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_section_line)
        .collect()
}

/// Parse one breakup line such as `"VARC | 24 | 40 | 72"`.
pub fn parse_section_line(line: &str) -> Option<Section> {
    let parts: Vec<&str> = RE_FIELD_SEP
        .split(line)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 2 {
        return None;
    }

    let Some(questions) = parse_int(parts[1]) else {
        debug!("Dropping section line with non-numeric count: {:?}", line);
        return None;
    };

    Some(Section {
        name: parts[0].to_uppercase(),
        questions: Some(questions),
        time: parts.get(2).and_then(|p| parse_int(p)),
        marks: parts.get(3).and_then(|p| parse_int(p)),
    })
}

/// One section per distinct question section, in first-seen order.
pub fn derive_sections(questions: &[Question]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    for q in questions {
        match sections.iter_mut().find(|s| s.name == q.section) {
            Some(s) => {
                s.questions = Some(s.questions.unwrap_or(0) + 1);
            }
            None => sections.push(Section {
                name: q.section.clone(),
                questions: Some(1),
                time: None,
                marks: None,
            }),
        }
    }
    sections
}
