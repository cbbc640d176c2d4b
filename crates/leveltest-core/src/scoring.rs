//! Score aggregation and proficiency classification.
//!
//! Pure functions over normalized questions and recorded answers.
//! Correctness is always a literal-text comparison against the canonical
//! correct answer — the encoding ambiguity is gone before scoring runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Answer, Question, QuestionCategory};

/// Check one learner pick against a question's canonical correct text.
pub fn is_correct(question: &Question, selected_text: &str) -> bool {
    question.correct_answer == selected_text
}

/// Mistake count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMistakes {
    pub category: QuestionCategory,
    pub count: usize,
}

/// Aggregate results for one finished session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub correct_count: usize,
    /// Correct answers as a percentage of the question count. 0 when there
    /// are no questions.
    pub percentage: f64,
    /// Incorrect answers grouped by category, in first-seen order.
    pub per_category_mistakes: Vec<CategoryMistakes>,
    /// Arithmetic mean of per-question response times. 0 when there are no
    /// answers.
    pub avg_response_time: f64,
}

/// Compute the aggregate score for a question/answer sequence.
///
/// Answers are matched to questions by position; a shorter answer list
/// simply scores the answered prefix.
pub fn score(questions: &[Question], answers: &[Answer]) -> ScoreSummary {
    let mut correct_count = 0usize;
    let mut mistakes: Vec<CategoryMistakes> = Vec::new();

    for (question, answer) in questions.iter().zip(answers) {
        if is_correct(question, &answer.selected_text) {
            correct_count += 1;
        } else if let Some(entry) = mistakes
            .iter_mut()
            .find(|m| m.category == question.category)
        {
            entry.count += 1;
        } else {
            mistakes.push(CategoryMistakes {
                category: question.category,
                count: 1,
            });
        }
    }

    let percentage = if questions.is_empty() {
        0.0
    } else {
        correct_count as f64 / questions.len() as f64 * 100.0
    };

    let avg_response_time = if answers.is_empty() {
        0.0
    } else {
        answers
            .iter()
            .map(|a| a.response_time_seconds)
            .sum::<f64>()
            / answers.len() as f64
    };

    ScoreSummary {
        correct_count,
        percentage,
        per_category_mistakes: mistakes,
        avg_response_time,
    }
}

/// The four placement tiers, lowest to highest.
///
/// Used as a fallback classification when the backend does not supply a
/// level with the submission ack; the server-computed level is
/// authoritative when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProficiencyLevel {
    MetGoDigital,
    MetDigital,
    Ecce,
    Ecpe,
}

impl ProficiencyLevel {
    /// Classify a percentage score into a tier.
    pub fn classify(percentage: f64) -> Self {
        if percentage >= 80.0 {
            ProficiencyLevel::Ecpe
        } else if percentage >= 60.0 {
            ProficiencyLevel::Ecce
        } else if percentage >= 40.0 {
            ProficiencyLevel::MetDigital
        } else {
            ProficiencyLevel::MetGoDigital
        }
    }

    /// The learner-facing tier label.
    pub fn label(&self) -> &'static str {
        match self {
            ProficiencyLevel::Ecpe => "ECPE (C2)",
            ProficiencyLevel::Ecce => "ECCE (B2)",
            ProficiencyLevel::MetDigital => "MET Digital (A2-C1)",
            ProficiencyLevel::MetGoDigital => "MET Go! Digital (A1-B2)",
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
