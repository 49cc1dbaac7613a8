//! Questionnaire component state.
//!
//! [`Questionnaire`] owns everything one page session shows: the answers entered so far, the
//! per-question error flags, the patient banner, the notice from the last action and the
//! local submission history. It performs no I/O; the submission saga drives it.

use crate::history::{History, SubmissionRecord};
use fhir::PatientData;
use phq9::{AnswerSet, CompletedAnswers, MissingAnswers, QuestionIndex, ResponseValue};
use std::collections::BTreeSet;

/// Kind of message shown after an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message shown to the user after an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Questionnaire {
    answers: AnswerSet,
    errors: BTreeSet<QuestionIndex>,
    focus: Option<QuestionIndex>,
    patient: Option<PatientData>,
    history: History,
    notice: Option<Notice>,
}

impl Questionnaire {
    pub fn new(patient: Option<PatientData>) -> Self {
        Self {
            patient,
            ..Self::default()
        }
    }

    // ========================================================================
    // Answers
    // ========================================================================

    /// Record an answer. Clears the error flag for this question only.
    pub fn set_answer(&mut self, index: QuestionIndex, value: ResponseValue) {
        self.answers.set(index, value);
        self.errors.remove(&index);
        if self.focus == Some(index) {
            self.focus = None;
        }
    }

    pub fn answer(&self, index: QuestionIndex) -> Option<ResponseValue> {
        self.answers.get(index)
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn has_error(&self, index: QuestionIndex) -> bool {
        self.errors.contains(&index)
    }

    pub fn error_indices(&self) -> impl Iterator<Item = QuestionIndex> + '_ {
        self.errors.iter().copied()
    }

    /// First unanswered question from the last failed validation, for scrolling into view.
    pub fn focus(&self) -> Option<QuestionIndex> {
        self.focus
    }

    /// Check every question is answered.
    ///
    /// On failure each missing question is flagged and the first becomes the focus; answers
    /// already entered are kept. On success all flags are cleared.
    pub fn validate(&mut self) -> Result<CompletedAnswers, MissingAnswers> {
        match self.answers.complete() {
            Ok(completed) => {
                self.errors.clear();
                self.focus = None;
                Ok(completed)
            }
            Err(missing) => {
                self.errors.extend(missing.indices().iter().copied());
                self.focus = missing.first();
                Err(missing)
            }
        }
    }

    // ========================================================================
    // Patient, notice and history
    // ========================================================================

    pub fn patient(&self) -> Option<&PatientData> {
        self.patient.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Remove and return the current notice, so it is shown once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Apply a successful submission: append to history, reset the form, announce the result.
    pub fn record_success(&mut self, record: SubmissionRecord) {
        self.notice = Some(Notice::success(format!(
            "Saved to server!\nScore: {}\nSeverity: {}",
            record.score,
            record.severity.label()
        )));
        self.history.push(record);
        self.answers.clear();
        self.errors.clear();
        self.focus = None;
    }

    /// Apply a failed save. Answers and history are left as they are.
    pub fn record_failure(&mut self, error: &impl std::fmt::Display) {
        self.notice = Some(Notice::error(format!(
            "Failed to save response to server: {error}"
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use phq9::Score;

    fn q(i: usize) -> QuestionIndex {
        QuestionIndex::new(i).expect("valid index")
    }

    fn v(x: i64) -> ResponseValue {
        ResponseValue::new(x).expect("valid value")
    }

    #[test]
    fn validation_flags_every_missing_question_and_keeps_answers() {
        let mut form = Questionnaire::new(None);
        form.set_answer(q(1), v(2));
        form.set_answer(q(3), v(1));

        let missing = form.validate().expect_err("incomplete");
        assert_eq!(missing.numbers(), vec![1, 3, 5, 6, 7, 8, 9]);
        assert_eq!(form.focus(), Some(q(0)));
        assert!(form.has_error(q(0)));
        assert!(!form.has_error(q(1)));
        assert_eq!(form.answer(q(1)), Some(v(2)));
        assert_eq!(form.answer(q(3)), Some(v(1)));
    }

    #[test]
    fn answering_clears_only_that_flag() {
        let mut form = Questionnaire::new(None);
        let _ = form.validate();
        assert_eq!(form.error_indices().count(), 9);

        form.set_answer(q(4), v(0));
        assert!(!form.has_error(q(4)));
        assert!(form.has_error(q(5)));
        assert_eq!(form.error_indices().count(), 8);
    }

    #[test]
    fn passing_validation_clears_all_flags() {
        let mut form = Questionnaire::new(None);
        let _ = form.validate();
        for index in QuestionIndex::all() {
            form.set_answer(index, v(1));
        }
        let completed = form.validate().expect("complete");
        assert_eq!(completed.score().value(), 9);
        assert_eq!(form.error_indices().count(), 0);
        assert_eq!(form.focus(), None);
    }

    #[test]
    fn success_resets_form_and_appends_history() {
        let mut form = Questionnaire::new(None);
        for index in QuestionIndex::all() {
            form.set_answer(index, v(2));
        }
        let record = SubmissionRecord::new(Utc::now(), Score::new(18).expect("score"));
        form.record_success(record);

        assert!(form.answers().is_empty());
        assert_eq!(form.history().len(), 1);
        let notice = form.take_notice().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(
            notice.message,
            "Saved to server!\nScore: 18\nSeverity: Moderately Severe"
        );
        assert!(form.notice().is_none());
    }

    #[test]
    fn failure_keeps_answers_and_history() {
        let mut form = Questionnaire::new(None);
        form.set_answer(q(0), v(3));
        form.record_failure(&"server returned 500: boom");

        assert_eq!(form.answer(q(0)), Some(v(3)));
        assert!(form.history().is_empty());
        assert_eq!(
            form.notice().map(|n| n.message.as_str()),
            Some("Failed to save response to server: server returned 500: boom")
        );
    }
}
