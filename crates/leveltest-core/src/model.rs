//! Core data model types for leveltest.
//!
//! These are the fundamental types the entire leveltest system uses to
//! represent questions, answers, identities, and session variants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The fixed set of question categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Vocabulary,
    Grammar,
    Reading,
    Listening,
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionCategory::Vocabulary => write!(f, "vocabulary"),
            QuestionCategory::Grammar => write!(f, "grammar"),
            QuestionCategory::Reading => write!(f, "reading"),
            QuestionCategory::Listening => write!(f, "listening"),
        }
    }
}

impl FromStr for QuestionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vocabulary" => Ok(QuestionCategory::Vocabulary),
            "grammar" => Ok(QuestionCategory::Grammar),
            "reading" => Ok(QuestionCategory::Reading),
            "listening" => Ok(QuestionCategory::Listening),
            other => Err(format!("unknown question category: {other}")),
        }
    }
}

/// A normalized assessment question.
///
/// Always produced by [`crate::normalize`]; downstream code never sees the
/// wire encodings. `correct_answer` is the literal display text of the
/// correct option — letters are a labelling concern only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier within the session.
    pub id: i64,
    /// The prompt. May be empty when the prompt is audio-only.
    #[serde(default)]
    pub text: String,
    /// Which skill the question exercises.
    pub category: QuestionCategory,
    /// Display texts of the choices, in presentation order.
    pub options: Vec<String>,
    /// Literal display text of the correct option.
    pub correct_answer: String,
    /// Text to speak aloud for listening questions.
    #[serde(default)]
    pub narration_text: Option<String>,
}

impl Question {
    /// Presentation label for an option position ("A" for 0, "B" for 1, ...).
    pub fn option_label(index: usize) -> char {
        (b'A' + index as u8) as char
    }
}

/// The two option encodings the backends produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOptions {
    /// Letter-keyed mapping, addressed by "A".."D".
    Keyed(BTreeMap<String, String>),
    /// Ordered sequence of display texts.
    Listed(Vec<String>),
}

/// A question as returned by the backends, before normalization.
///
/// Field aliases absorb the naming differences between the question
/// endpoints; unknown fields (difficulty, points, order hints) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "question", alias = "question_text")]
    pub text: String,
    #[serde(alias = "type", alias = "question_type")]
    pub category: QuestionCategory,
    pub options: RawOptions,
    /// Either a letter key ("A".."D") or the literal correct display text.
    #[serde(alias = "answer")]
    pub correct_answer: String,
    #[serde(default, alias = "tts")]
    pub narration_text: Option<String>,
}

/// One recorded learner response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: i64,
    /// The literal text the learner picked, never a letter key.
    pub selected_text: String,
    /// Derived at record time, never learner-supplied.
    pub is_correct: bool,
    /// Elapsed seconds since the question was presented.
    pub response_time_seconds: f64,
}

/// Which question source feeds a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionVariant {
    /// The standard placement flow.
    Placement,
    /// Personalized practice questions.
    Practice,
    /// A classroom-assigned test.
    Classroom { test_id: i64 },
}

impl SessionVariant {
    /// The `test_type` discriminator used in submission payloads.
    pub fn test_type(&self) -> &'static str {
        match self {
            SessionVariant::Placement => "placement",
            SessionVariant::Practice => "practice",
            SessionVariant::Classroom { .. } => "classroom",
        }
    }
}

impl fmt::Display for SessionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.test_type())
    }
}

/// The two learner roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Teacher => write!(f, "teacher"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// An authenticated identity.
///
/// Created by the auth crate from a decodable bearer token; read-only to
/// every other component.
///
/// Note: custom Debug impl masks the token to prevent accidental exposure
/// in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque bearer token.
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("token", &"***")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish()
    }
}
