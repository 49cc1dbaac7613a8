use crate::types::{ScoreReq, ScoreRes};
use phq9::{CompletedAnswers, Phq9Result};

/// Stateless scoring for callers that hold raw answer values.
#[derive(Clone, Default)]
pub struct ScoreService;

impl ScoreService {
    /// Score a full set of raw answers.
    ///
    /// # Errors
    ///
    /// Returns a [`phq9::Phq9Error`] if there are not exactly nine answers or any answer is
    /// outside `0..=3`.
    pub fn score(req: &ScoreReq) -> Phq9Result<ScoreRes> {
        let answers = CompletedAnswers::from_values(&req.answers)?;
        let severity = answers.severity();
        Ok(ScoreRes {
            score: answers.score().value(),
            severity: severity.label().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phq9::Phq9Error;

    #[test]
    fn scores_mixed_answers() {
        let res = ScoreService::score(&ScoreReq {
            answers: vec![0, 1, 2, 3, 0, 1, 2, 3, 1],
        })
        .expect("score");
        assert_eq!(
            res,
            ScoreRes {
                score: 13,
                severity: "Moderate".into()
            }
        );
    }

    #[test]
    fn rejects_short_answer_list() {
        let err = ScoreService::score(&ScoreReq {
            answers: vec![1, 2, 3],
        })
        .expect_err("needs nine answers");
        assert_eq!(
            err,
            Phq9Error::WrongAnswerCount {
                expected: 9,
                actual: 3
            }
        );
    }

    #[test]
    fn response_shape_uses_severity_label() {
        let res = ScoreService::score(&ScoreReq {
            answers: vec![2, 2, 2, 2, 2, 2, 2, 2, 0],
        })
        .expect("score");
        let json = serde_json::to_value(&res).expect("serialise");
        assert_eq!(json["score"], 16);
        assert_eq!(json["severity"], "Moderately Severe");
    }
}
