//! Answer set and completeness validation.

use crate::questions::{QuestionIndex, QUESTION_COUNT};
use crate::scoring::{Score, Severity};
use crate::{Phq9Error, Phq9Result};
use phq9_types::ResponseValue;

/// Answers entered so far, keyed by question index.
///
/// Unanswered questions are `None`. The set places no ordering requirement on how answers are
/// entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    values: [Option<ResponseValue>; QUESTION_COUNT],
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the answer for one question.
    pub fn set(&mut self, index: QuestionIndex, value: ResponseValue) {
        self.values[index.get()] = Some(value);
    }

    pub fn get(&self, index: QuestionIndex) -> Option<ResponseValue> {
        self.values[index.get()]
    }

    /// Remove every answer.
    pub fn clear(&mut self) {
        self.values = [None; QUESTION_COUNT];
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    pub fn answered_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Indices without an answer, in question order.
    pub fn missing(&self) -> Vec<QuestionIndex> {
        QuestionIndex::all()
            .filter(|idx| self.values[idx.get()].is_none())
            .collect()
    }

    /// Check that all nine questions are answered.
    ///
    /// # Errors
    ///
    /// Returns [`MissingAnswers`] listing every unanswered question.
    pub fn complete(&self) -> Result<CompletedAnswers, MissingAnswers> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(MissingAnswers { indices: missing });
        }

        let mut values = [ResponseValue::ALL[0]; QUESTION_COUNT];
        for (slot, value) in values.iter_mut().zip(self.values.iter()) {
            if let Some(v) = value {
                *slot = *v;
            }
        }
        Ok(CompletedAnswers { values })
    }
}

/// The list of questions left unanswered when a submission was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAnswers {
    indices: Vec<QuestionIndex>,
}

impl MissingAnswers {
    pub fn indices(&self) -> &[QuestionIndex] {
        &self.indices
    }

    /// The first unanswered question; the page scrolls to it.
    pub fn first(&self) -> Option<QuestionIndex> {
        self.indices.first().copied()
    }

    /// One-based question numbers, as shown to the user.
    pub fn numbers(&self) -> Vec<usize> {
        self.indices.iter().map(|i| i.number()).collect()
    }
}

impl std::fmt::Display for MissingAnswers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let numbers = self
            .numbers()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "Please answer all questions before submitting.\nUnanswered question(s): {numbers}"
        )
    }
}

/// A fully answered questionnaire. Only obtainable through [`AnswerSet::complete`] or
/// [`CompletedAnswers::from_values`], so scoring never sees a partial set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedAnswers {
    values: [ResponseValue; QUESTION_COUNT],
}

impl CompletedAnswers {
    /// Build from nine raw integers, in question order.
    ///
    /// # Errors
    ///
    /// Returns [`Phq9Error::WrongAnswerCount`] if `raw` does not hold exactly nine values, or
    /// [`Phq9Error::InvalidResponse`] if any value is outside `0..=3`.
    pub fn from_values(raw: &[i64]) -> Phq9Result<Self> {
        if raw.len() != QUESTION_COUNT {
            return Err(Phq9Error::WrongAnswerCount {
                expected: QUESTION_COUNT,
                actual: raw.len(),
            });
        }

        let mut set = AnswerSet::new();
        for (idx, value) in QuestionIndex::all().zip(raw.iter()) {
            set.set(idx, ResponseValue::new(*value)?);
        }
        set.complete().map_err(Phq9Error::Incomplete)
    }

    /// Answer for each question, in order.
    pub fn values(&self) -> &[ResponseValue; QUESTION_COUNT] {
        &self.values
    }

    pub fn get(&self, index: QuestionIndex) -> ResponseValue {
        self.values[index.get()]
    }

    /// Sum of all nine answers.
    pub fn score(&self) -> Score {
        let total: u32 = self.values.iter().map(|v| v.get() as u32).sum();
        // Nine answers of at most 3 cannot exceed 27.
        Score::saturating(total)
    }

    pub fn severity(&self) -> Severity {
        self.score().severity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: usize) -> QuestionIndex {
        QuestionIndex::new(i).expect("valid index")
    }

    fn value(v: i64) -> ResponseValue {
        ResponseValue::new(v).expect("valid value")
    }

    #[test]
    fn mixed_answers_score_moderate() {
        let answers = CompletedAnswers::from_values(&[0, 1, 2, 3, 0, 1, 2, 3, 1]).expect("valid");
        assert_eq!(answers.score().value(), 13);
        assert_eq!(answers.severity(), Severity::Moderate);
    }

    #[test]
    fn all_zero_is_minimal_and_all_three_is_severe() {
        let zeros = CompletedAnswers::from_values(&[0; 9]).expect("valid");
        assert_eq!(zeros.score().value(), 0);
        assert_eq!(zeros.severity(), Severity::Minimal);

        let threes = CompletedAnswers::from_values(&[3; 9]).expect("valid");
        assert_eq!(threes.score().value(), 27);
        assert_eq!(threes.severity(), Severity::Severe);
    }

    #[test]
    fn incomplete_set_reports_every_missing_question() {
        let mut set = AnswerSet::new();
        set.set(idx(1), value(2));
        set.set(idx(3), value(0));

        let missing = set.complete().expect_err("should be incomplete");
        assert_eq!(missing.numbers(), vec![1, 3, 5, 6, 7, 8, 9]);
        assert_eq!(missing.first(), Some(idx(0)));
        assert_eq!(
            missing.to_string(),
            "Please answer all questions before submitting.\nUnanswered question(s): 1, 3, 5, 6, 7, 8, 9"
        );

        // Rejection leaves the entered answers alone.
        assert_eq!(set.get(idx(1)), Some(value(2)));
        assert_eq!(set.answered_count(), 2);
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut set = AnswerSet::new();
        for i in QuestionIndex::all() {
            set.set(i, value(1));
        }
        assert!(set.complete().is_ok());
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn from_values_checks_count_and_range() {
        assert_eq!(
            CompletedAnswers::from_values(&[0; 8]).unwrap_err(),
            Phq9Error::WrongAnswerCount {
                expected: 9,
                actual: 8
            }
        );
        assert!(matches!(
            CompletedAnswers::from_values(&[0, 0, 0, 0, 4, 0, 0, 0, 0]),
            Err(Phq9Error::InvalidResponse(_))
        ));
    }
}
