//! Option-encoding normalization.
//!
//! The question endpoints disagree on how choices are encoded: classroom
//! tests use a letter-keyed mapping with a letter-key correct answer, while
//! the placement and practice flows use a positional array with a
//! literal-text correct answer. This module reconciles both into the
//! canonical [`Question`] shape in a single pass at the source boundary, so
//! nothing downstream ever re-discovers the encoding.

use crate::error::ApiError;
use crate::model::{Question, RawOptions, RawQuestion};

/// The letter keys used by the keyed encoding, in presentation order.
const LETTER_KEYS: [&str; 4] = ["A", "B", "C", "D"];

fn letter_index(key: &str) -> Option<usize> {
    LETTER_KEYS.iter().position(|k| *k == key)
}

/// Normalize one raw question.
///
/// `position` is the zero-based index in the fetched list; it supplies a
/// stable fallback id for sources that omit one.
pub fn normalize_question(raw: RawQuestion, position: usize) -> Result<Question, ApiError> {
    let id = raw.id.unwrap_or(position as i64 + 1);

    let options: Vec<String> = match &raw.options {
        RawOptions::Keyed(map) => LETTER_KEYS
            .iter()
            .filter_map(|key| map.get(*key).cloned())
            .collect(),
        RawOptions::Listed(list) => list.clone(),
    };
    if options.is_empty() {
        return Err(ApiError::Malformed(format!("question {id} has no options")));
    }

    let correct_key = raw.correct_answer.trim();
    let correct_answer = match letter_index(correct_key) {
        Some(index) => match &raw.options {
            RawOptions::Keyed(map) => map.get(correct_key).cloned().ok_or_else(|| {
                ApiError::Malformed(format!(
                    "question {id}: correct answer key {correct_key:?} is not among the options"
                ))
            })?,
            RawOptions::Listed(list) => list.get(index).cloned().ok_or_else(|| {
                ApiError::Malformed(format!(
                    "question {id}: correct answer key {correct_key:?} is out of range"
                ))
            })?,
        },
        None => raw.correct_answer.clone(),
    };

    // Exactly one option must carry the resolved correct text.
    let matching = options.iter().filter(|o| **o == correct_answer).count();
    if matching != 1 {
        return Err(ApiError::Malformed(format!(
            "question {id}: correct answer {correct_answer:?} matches {matching} options"
        )));
    }

    Ok(Question {
        id,
        text: raw.text,
        category: raw.category,
        options,
        correct_answer,
        narration_text: raw.narration_text,
    })
}

/// Normalize a fetched question list, failing the whole load on the first
/// malformed record.
pub fn normalize_questions(raw: Vec<RawQuestion>) -> Result<Vec<Question>, ApiError> {
    raw.into_iter()
        .enumerate()
        .map(|(position, question)| normalize_question(question, position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionCategory;

    fn keyed_raw(correct: &str) -> RawQuestion {
        serde_json::from_str(&format!(
            r#"{{
                "id": 1,
                "question_text": "She ___ to the store every morning.",
                "question_type": "vocabulary",
                "options": {{"A": "goes", "B": "go", "C": "going", "D": "gone"}},
                "correct_answer": "{correct}"
            }}"#
        ))
        .unwrap()
    }

    fn listed_raw(correct: &str) -> RawQuestion {
        serde_json::from_str(&format!(
            r#"{{
                "type": "vocabulary",
                "question": "She ___ to the store every morning.",
                "options": ["goes", "go", "going", "gone"],
                "answer": "{correct}"
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn keyed_letter_resolves_through_mapping() {
        let question = normalize_question(keyed_raw("A"), 0).unwrap();
        assert_eq!(question.correct_answer, "goes");
        assert_eq!(question.options, vec!["goes", "go", "going", "gone"]);
    }

    #[test]
    fn listed_letter_resolves_through_index() {
        let question = normalize_question(listed_raw("A"), 0).unwrap();
        assert_eq!(question.correct_answer, "goes");
    }

    #[test]
    fn listed_literal_text_passes_through() {
        let question = normalize_question(listed_raw("goes"), 0).unwrap();
        assert_eq!(question.correct_answer, "goes");
    }

    #[test]
    fn both_encodings_produce_the_same_canonical_question() {
        let keyed = normalize_question(keyed_raw("A"), 0).unwrap();
        let listed = normalize_question(listed_raw("A"), 0).unwrap();
        assert_eq!(keyed.correct_answer, listed.correct_answer);
        assert_eq!(keyed.options, listed.options);
        assert_eq!(keyed.category, QuestionCategory::Vocabulary);
    }

    #[test]
    fn keyed_options_ordered_by_letter_regardless_of_wire_order() {
        let raw: RawQuestion = serde_json::from_str(
            r#"{
                "question_type": "grammar",
                "options": {"D": "gone", "B": "go", "A": "goes", "C": "going"},
                "correct_answer": "B"
            }"#,
        )
        .unwrap();
        let question = normalize_question(raw, 0).unwrap();
        assert_eq!(question.options, vec!["goes", "go", "going", "gone"]);
        assert_eq!(question.correct_answer, "go");
    }

    #[test]
    fn missing_id_falls_back_to_position() {
        let question = normalize_question(listed_raw("goes"), 4).unwrap();
        assert_eq!(question.id, 5);
    }

    #[test]
    fn keyed_letter_missing_from_mapping_is_malformed() {
        let raw: RawQuestion = serde_json::from_str(
            r#"{
                "question_type": "grammar",
                "options": {"A": "go", "B": "goes"},
                "correct_answer": "C"
            }"#,
        )
        .unwrap();
        let err = normalize_question(raw, 0).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn listed_letter_out_of_range_is_malformed() {
        let raw: RawQuestion = serde_json::from_str(
            r#"{
                "type": "grammar",
                "options": ["go", "goes"],
                "answer": "D"
            }"#,
        )
        .unwrap();
        let err = normalize_question(raw, 0).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn literal_answer_absent_from_options_is_malformed() {
        let err = normalize_question(listed_raw("went"), 0).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn duplicate_correct_text_is_malformed() {
        let raw: RawQuestion = serde_json::from_str(
            r#"{
                "type": "reading",
                "options": ["Tom", "Tom", "Jim", "Neither"],
                "answer": "Tom"
            }"#,
        )
        .unwrap();
        let err = normalize_question(raw, 0).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn empty_options_is_malformed() {
        let raw: RawQuestion = serde_json::from_str(
            r#"{
                "type": "reading",
                "options": [],
                "answer": "Tom"
            }"#,
        )
        .unwrap();
        let err = normalize_question(raw, 0).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn normalize_list_fails_on_first_bad_record() {
        let good = listed_raw("goes");
        let bad = listed_raw("went");
        assert!(normalize_questions(vec![good.clone()]).is_ok());
        assert!(normalize_questions(vec![good, bad]).is_err());
    }
}
