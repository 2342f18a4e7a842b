//! Question pool provider
//!
//! Questions come either from the built-in list or from a JSON payload
//! (a generated session). Both paths end in the same validated
//! `Vec<Question>`; the simulation never sees raw JSON.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::OPTION_COUNT;

/// A multiple-choice question, one option per lane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(rename = "question")]
    pub text: String,
    pub options: [String; OPTION_COUNT],
    /// Index of the correct option (and therefore the correct lane)
    #[serde(rename = "answer")]
    pub correct_option: u8,
}

impl Question {
    pub fn new(id: u32, text: &str, options: [&str; OPTION_COUNT], correct_option: u8) -> Self {
        Self {
            id,
            text: text.to_string(),
            options: options.map(str::to_string),
            correct_option,
        }
    }
}

/// Why a question payload was rejected
#[derive(Debug, Error, PartialEq)]
pub enum PoolError {
    #[error("question payload is not valid JSON: {0}")]
    Json(String),
    #[error("expected {expected} questions, got {actual}")]
    Count { expected: usize, actual: usize },
    #[error("question pool is empty")]
    Empty,
    #[error("invalid question format at index {index}: {reason}")]
    Invalid { index: usize, reason: &'static str },
    #[error("duplicate question id {0}")]
    DuplicateId(u32),
}

/// Loosely-typed record as it arrives on the wire
#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: Option<u32>,
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    answer: Option<i64>,
}

impl RawQuestion {
    fn validate(self, index: usize) -> Result<Question, PoolError> {
        let invalid = |reason| PoolError::Invalid { index, reason };

        if self.question.trim().is_empty() {
            return Err(invalid("missing question text"));
        }
        let options: [String; OPTION_COUNT] = self
            .options
            .try_into()
            .map_err(|_| invalid("expected exactly 4 options"))?;
        if options.iter().any(|o| o.trim().is_empty()) {
            return Err(invalid("empty option"));
        }
        let answer = self.answer.ok_or_else(|| invalid("missing answer index"))?;
        if !(0..OPTION_COUNT as i64).contains(&answer) {
            return Err(invalid("answer index out of range"));
        }

        Ok(Question {
            // Records without an id are numbered by position (1-based)
            id: self.id.unwrap_or(index as u32 + 1),
            text: self.question,
            options,
            correct_option: answer as u8,
        })
    }
}

fn validate_records(raw: Vec<RawQuestion>) -> Result<Vec<Question>, PoolError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect()
}

fn first_duplicate_id(questions: &[Question]) -> Option<u32> {
    let mut seen = HashSet::with_capacity(questions.len());
    questions.iter().map(|q| q.id).find(|id| !seen.insert(*id))
}

/// Parse a non-empty question list (e.g. a session's stored questions)
pub fn parse_pool(json: &str) -> Result<Vec<Question>, PoolError> {
    let raw: Vec<RawQuestion> =
        serde_json::from_str(json).map_err(|e| PoolError::Json(e.to_string()))?;
    if raw.is_empty() {
        return Err(PoolError::Empty);
    }
    let questions = validate_records(raw)?;
    match first_duplicate_id(&questions) {
        Some(id) => Err(PoolError::DuplicateId(id)),
        None => Ok(questions),
    }
}

/// Parse language-model output, which may wrap the JSON array in a Markdown
/// code fence, and require exactly `expected` questions
pub fn parse_generated(text: &str, expected: usize) -> Result<Vec<Question>, PoolError> {
    let json = strip_code_fence(text);
    let raw: Vec<RawQuestion> =
        serde_json::from_str(json).map_err(|e| PoolError::Json(e.to_string()))?;
    if raw.len() != expected {
        return Err(PoolError::Count {
            expected,
            actual: raw.len(),
        });
    }
    let mut questions = validate_records(raw)?;
    // Model ids are advisory; on a clash renumber the whole set by position
    if let Some(id) = first_duplicate_id(&questions) {
        log::warn!("Generated questions reuse id {}; renumbering by position", id);
        for (index, question) in questions.iter_mut().enumerate() {
            question.id = index as u32 + 1;
        }
    }
    Ok(questions)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// The fallback pool used when no session questions were loaded
pub fn builtin() -> Vec<Question> {
    vec![
        Question::new(
            1,
            "Who discovered gravity?",
            ["T. Edison", "Isaac Newton", "A. Einstein", "Tesla"],
            1,
        ),
        Question::new(
            2,
            "Fastest land animal?",
            ["Lion", "Cheetah", "Horse", "Tiger"],
            1,
        ),
        Question::new(
            3,
            "Capital of Japan?",
            ["Seoul", "Beijing", "Tokyo", "Bangkok"],
            2,
        ),
        Question::new(
            4,
            "Chemical symbol for Water?",
            ["H2O", "O2", "CO2", "HO"],
            0,
        ),
        Question::new(
            5,
            "Planet known as the Red Planet?",
            ["Venus", "Jupiter", "Saturn", "Mars"],
            3,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, answer: u8) -> String {
        format!(
            r#"{{"id": {id}, "question": "Q{id}?", "options": ["a", "b", "c", "d"], "answer": {answer}}}"#
        )
    }

    fn records(n: u32) -> String {
        let items: Vec<String> = (1..=n).map(|i| record(i, (i % 4) as u8)).collect();
        format!("[{}]", items.join(","))
    }

    #[test]
    fn builtin_pool_is_well_formed() {
        let pool = builtin();
        assert_eq!(pool.len(), 5);
        let json = serde_json::to_string(&pool).unwrap();
        assert_eq!(parse_pool(&json).unwrap(), pool);
    }

    #[test]
    fn wire_names_match_session_payload() {
        let json = serde_json::to_value(&builtin()[0]).unwrap();
        assert_eq!(json["question"], "Who discovered gravity?");
        assert_eq!(json["answer"], 1);
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn parse_generated_strips_fences() {
        let fenced = format!("```json\n{}\n```", records(3));
        assert_eq!(parse_generated(&fenced, 3).unwrap().len(), 3);

        let bare_fence = format!("```\n{}\n```", records(3));
        assert_eq!(parse_generated(&bare_fence, 3).unwrap().len(), 3);

        assert_eq!(parse_generated(&records(3), 3).unwrap().len(), 3);
    }

    #[test]
    fn parse_generated_requires_exact_count() {
        assert_eq!(
            parse_generated(&records(29), 30),
            Err(PoolError::Count {
                expected: 30,
                actual: 29
            })
        );
    }

    #[test]
    fn parse_generated_renumbers_clashing_ids() {
        let clashing = format!("[{}, {}, {}]", record(7, 0), record(7, 1), record(2, 2));
        let questions = parse_generated(&clashing, 3).unwrap();
        let ids: Vec<u32> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(questions[1].correct_option, 1);

        // Distinct model ids are kept as sent
        let distinct = format!("[{}, {}]", record(9, 0), record(4, 1));
        let ids: Vec<u32> = parse_generated(&distinct, 2)
            .unwrap()
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![9, 4]);
    }

    #[test]
    fn rejects_malformed_records() {
        let three_options = r#"[{"id": 1, "question": "Q?", "options": ["a", "b", "c"], "answer": 0}]"#;
        assert_eq!(
            parse_pool(three_options),
            Err(PoolError::Invalid {
                index: 0,
                reason: "expected exactly 4 options"
            })
        );

        let bad_answer = format!("[{}, {}]", record(1, 0), record(2, 7));
        assert_eq!(
            parse_pool(&bad_answer),
            Err(PoolError::Invalid {
                index: 1,
                reason: "answer index out of range"
            })
        );

        let no_text = r#"[{"id": 1, "question": "  ", "options": ["a", "b", "c", "d"], "answer": 0}]"#;
        assert!(matches!(parse_pool(no_text), Err(PoolError::Invalid { .. })));

        let dup = format!("[{}, {}]", record(4, 0), record(4, 1));
        assert_eq!(parse_pool(&dup), Err(PoolError::DuplicateId(4)));

        assert_eq!(parse_pool("[]"), Err(PoolError::Empty));
        assert!(matches!(parse_pool("{"), Err(PoolError::Json(_))));
    }

    #[test]
    fn missing_ids_are_numbered_by_position() {
        let json = r#"[{"question": "Q?", "options": ["a", "b", "c", "d"], "answer": 2}]"#;
        let pool = parse_pool(json).unwrap();
        assert_eq!(pool[0].id, 1);
        assert_eq!(pool[0].correct_option, 2);
    }
}
