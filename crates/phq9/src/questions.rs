//! Fixed PHQ-9 question and response-option tables.

use crate::{Phq9Error, Phq9Result};
use phq9_types::ResponseValue;

/// Number of questions in the instrument.
pub const QUESTION_COUNT: usize = 9;

/// Page heading.
pub const TITLE: &str = "PHQ-9 Depression Questionnaire";

/// Instruction shown above the questions.
pub const INSTRUCTION: &str =
    "Over the last 2 weeks, how often have you been bothered by the following problems?";

/// Zero-based position of a question, guaranteed to be in `0..9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestionIndex(u8);

impl QuestionIndex {
    /// # Errors
    ///
    /// Returns [`Phq9Error::InvalidQuestion`] if `index >= 9`.
    pub fn new(index: usize) -> Phq9Result<Self> {
        if index < QUESTION_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(Phq9Error::InvalidQuestion(index))
        }
    }

    /// All question indices in instrument order.
    pub fn all() -> impl Iterator<Item = QuestionIndex> {
        (0..QUESTION_COUNT as u8).map(QuestionIndex)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// One-based question number, as shown to the user.
    pub fn number(self) -> usize {
        self.get() + 1
    }

    /// The question at this index.
    pub fn question(self) -> &'static Question {
        &QUESTIONS[self.get()]
    }
}

/// A single PHQ-9 question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub index: QuestionIndex,
    pub text: &'static str,
}

impl Question {
    /// FHIR `linkId` for this question: the one-based number as a string.
    pub fn link_id(&self) -> String {
        self.index.number().to_string()
    }
}

/// The nine PHQ-9 questions, in order.
pub const QUESTIONS: [Question; QUESTION_COUNT] = [
    Question {
        index: QuestionIndex(0),
        text: "Little interest or pleasure in doing things",
    },
    Question {
        index: QuestionIndex(1),
        text: "Feeling down, depressed, or hopeless",
    },
    Question {
        index: QuestionIndex(2),
        text: "Trouble falling or staying asleep, or sleeping too much",
    },
    Question {
        index: QuestionIndex(3),
        text: "Feeling tired or having little energy",
    },
    Question {
        index: QuestionIndex(4),
        text: "Poor appetite or overeating",
    },
    Question {
        index: QuestionIndex(5),
        text: "Feeling bad about yourself — or that you are a failure",
    },
    Question {
        index: QuestionIndex(6),
        text: "Trouble concentrating on things",
    },
    Question {
        index: QuestionIndex(7),
        text: "Moving or speaking slowly or being fidgety/restless",
    },
    Question {
        index: QuestionIndex(8),
        text: "Thoughts that you would be better off dead or of hurting yourself",
    },
];

/// A selectable answer for any question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseOption {
    pub value: ResponseValue,
    pub label: &'static str,
}

/// The four frequency options, in ascending score order.
pub const OPTIONS: [ResponseOption; 4] = [
    ResponseOption {
        value: ResponseValue::ALL[0],
        label: "Not at all",
    },
    ResponseOption {
        value: ResponseValue::ALL[1],
        label: "Several days",
    },
    ResponseOption {
        value: ResponseValue::ALL[2],
        label: "More than half the days",
    },
    ResponseOption {
        value: ResponseValue::ALL[3],
        label: "Nearly every day",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_table_is_in_index_order() {
        for (i, q) in QUESTIONS.iter().enumerate() {
            assert_eq!(q.index.get(), i);
            assert_eq!(q.link_id(), (i + 1).to_string());
        }
    }

    #[test]
    fn question_index_rejects_out_of_range() {
        assert!(QuestionIndex::new(8).is_ok());
        assert_eq!(
            QuestionIndex::new(9).unwrap_err(),
            Phq9Error::InvalidQuestion(9)
        );
    }

    #[test]
    fn options_cover_zero_to_three() {
        let values: Vec<u8> = OPTIONS.iter().map(|o| o.value.get()).collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
        assert_eq!(OPTIONS[3].label, "Nearly every day");
    }
}
