//! Session-local submission history.
//!
//! History lives only as long as the page session. Nothing here is read back from the server.

use chrono::{DateTime, Utc};
use phq9::{Score, Severity};
use serde::Serialize;

/// One successful submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    pub submitted_at: DateTime<Utc>,
    pub score: Score,
    pub severity: Severity,
}

impl SubmissionRecord {
    pub fn new(submitted_at: DateTime<Utc>, score: Score) -> Self {
        Self {
            submitted_at,
            score,
            severity: score.severity(),
        }
    }
}

/// Submission records in the order they were made.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<SubmissionRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: SubmissionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[SubmissionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn records_keep_submission_order_and_derive_severity() {
        let mut history = History::new();
        let first = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).single().expect("ts");
        let second = Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).single().expect("ts");

        history.push(SubmissionRecord::new(first, Score::new(21).expect("score")));
        history.push(SubmissionRecord::new(second, Score::new(7).expect("score")));

        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].severity, Severity::Severe);
        assert_eq!(history.records()[1].submitted_at, second);
        assert_eq!(history.records()[1].severity, Severity::Mild);
    }

    #[test]
    fn serialises_as_plain_array() {
        let mut history = History::new();
        let at = Utc.with_ymd_and_hms(2026, 5, 6, 7, 8, 9).single().expect("ts");
        history.push(SubmissionRecord::new(at, Score::new(15).expect("score")));

        let json = serde_json::to_value(&history).expect("serialise");
        assert_eq!(json[0]["score"], 15);
        assert_eq!(json[0]["severity"], "Moderately Severe");
        assert_eq!(json[0]["submitted_at"], "2026-05-06T07:08:09Z");
    }
}
