//! PHQ-9 instrument definition and scoring.
//!
//! This crate holds everything about the questionnaire that does not touch the network:
//! - the fixed question and response-option tables
//! - the answer set and its completeness validation
//! - the total score and the five severity bands
//!
//! FHIR rendering lives in the `fhir` crate; the page/session flow lives in `phq9-core`.

pub mod answers;
pub mod questions;
pub mod scoring;

use thiserror::Error;

pub use answers::{AnswerSet, CompletedAnswers, MissingAnswers};
pub use phq9_types::ResponseValue;
pub use questions::{
    Question, QuestionIndex, ResponseOption, INSTRUCTION, OPTIONS, QUESTIONS, QUESTION_COUNT,
    TITLE,
};
pub use scoring::{severity, Score, Severity};

/// Errors returned by the `phq9` instrument crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Phq9Error {
    #[error("question index {0} is out of range (expected 0-8)")]
    InvalidQuestion(usize),

    #[error("invalid response: {0}")]
    InvalidResponse(#[from] phq9_types::TypeError),

    #[error("score {0} is out of range (expected 0-27)")]
    ScoreOutOfRange(u32),

    #[error("expected {expected} answers, got {actual}")]
    WrongAnswerCount { expected: usize, actual: usize },

    #[error("{0}")]
    Incomplete(MissingAnswers),
}

/// Type alias for Results that can fail with a [`Phq9Error`].
pub type Phq9Result<T> = Result<T, Phq9Error>;
