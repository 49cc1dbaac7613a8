//! HTML views.
//!
//! Pages are rendered server-side with `maud`. The questionnaire page works without script;
//! a short inline script posts each radio change to `/answer` so error flags clear as the
//! user goes.

use chrono::{DateTime, Datelike, Utc};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use phq9::{QuestionIndex, Severity, INSTRUCTION, OPTIONS, TITLE};
use phq9_core::constants::{LOADING_PLACEHOLDER, SHORT_PLACEHOLDER};
use phq9_core::{History, Notice, NoticeKind, Questionnaire, SessionId};

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #f5f7fa; }
.app-container { max-width: 860px; margin: 0 auto; padding: 1rem; }
.header { font-size: 1.6rem; font-weight: bold; margin-bottom: 0.5rem; }
.patient-info { background: #fff; padding: 0.6rem; border-radius: 6px; margin-bottom: 1rem; }
.patient-info span { margin-right: 1.5rem; }
.instruction { font-style: italic; margin-bottom: 1rem; }
.question-card { background: #fff; padding: 0.8rem; border-radius: 6px; margin-bottom: 0.6rem; }
.question-card.has-error { border: 1px solid #d33; }
.question-text { font-weight: bold; margin-bottom: 0.4rem; }
.option-label { margin-right: 1rem; white-space: nowrap; }
.error-message { color: #d33; margin-top: 0.4rem; }
.notice { padding: 0.6rem; border-radius: 6px; margin-bottom: 1rem; }
.notice-success { background: #e3f6e5; }
.notice-error { background: #fde4e4; }
.button-row { margin: 1rem 0; }
table { border-collapse: collapse; width: 100%; background: #fff; }
th, td { padding: 0.4rem; border-bottom: 1px solid #ddd; text-align: left; }
.row-minimal { background: #e8f5e9; }
.row-mild { background: #fffde7; }
.row-moderate { background: #fff3e0; }
.row-moderately-severe { background: #ffe0b2; }
.row-severe { background: #ffcdd2; }
.chart-container { margin-top: 1rem; background: #fff; padding: 0.6rem; border-radius: 6px; }
"#;

const ANSWER_SCRIPT: &str = r#"
document.querySelectorAll('input[type=radio][data-question]').forEach(function (input) {
  input.addEventListener('change', function () {
    var body = new URLSearchParams({ question: input.dataset.question, value: input.value });
    fetch(input.form.dataset.answerUrl, { method: 'POST', body: body, redirect: 'manual' });
    var card = document.getElementById('question-' + input.dataset.question);
    card.classList.remove('has-error');
    var error = card.querySelector('.error-message');
    if (error) { error.remove(); }
  });
});
"#;

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 240.0;
const CHART_PADDING: f64 = 28.0;

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                div.app-container { (body) }
            }
        }
    }
}

/// Terminal view for a failed launch. There is no retry from here.
pub fn launch_error_page(reason: &str) -> Markup {
    layout(
        TITLE,
        html! {
            div.header { (TITLE) }
            h2 { "Failed to connect to FHIR server" }
            pre.launch-error { (reason) }
        },
    )
}

pub fn not_found_page() -> Markup {
    layout(
        TITLE,
        html! {
            div.header { (TITLE) }
            p { "This questionnaire session does not exist or has ended. Launch the app again from your EHR." }
        },
    )
}

fn patient_banner(form: &Questionnaire, now: DateTime<Utc>) -> Markup {
    let (name, gender, age) = match form.patient() {
        Some(patient) => (
            patient.display_name(),
            patient
                .gender
                .map(|g| g.to_string())
                .unwrap_or_default(),
            patient
                .age_in_year(now.year())
                .map(|a| a.to_string())
                .unwrap_or_default(),
        ),
        None => (
            LOADING_PLACEHOLDER.to_string(),
            SHORT_PLACEHOLDER.to_string(),
            SHORT_PLACEHOLDER.to_string(),
        ),
    };

    html! {
        div.patient-info {
            span { "Patient: " strong #patient-name { (name) } }
            span { "Gender: " (gender) }
            span { "Age: " (age) }
            span { "Date: " (now.format("%Y-%m-%d %H:%M").to_string()) " UTC" }
        }
    }
}

fn notice_box(notice: &Notice) -> Markup {
    let class = match notice.kind {
        NoticeKind::Success => "notice notice-success",
        NoticeKind::Error => "notice notice-error",
    };
    html! {
        div class=(class) role="alert" {
            @for (i, line) in notice.message.lines().enumerate() {
                @if i > 0 { br; }
                (line)
            }
        }
    }
}

fn question_card(form: &Questionnaire, index: QuestionIndex) -> Markup {
    let question = index.question();
    let has_error = form.has_error(index);
    let selected = form.answer(index);
    let focus = form.focus() == Some(index);

    html! {
        div id=(format!("question-{}", index.get()))
            class=(if has_error { "question-card has-error" } else { "question-card" }) {
            div.question-text { (index.number()) ". " (question.text) }
            div.options-row {
                @for (i, option) in OPTIONS.iter().enumerate() {
                    label.option-label {
                        input type="radio"
                            name=(format!("q{}", index.get()))
                            value=(option.value.get())
                            data-question=(index.get())
                            checked[selected == Some(option.value)]
                            autofocus[focus && i == 0];
                        " " (option.label)
                    }
                }
            }
            @if has_error {
                div.error-message { "⚠️ Please answer this question." }
            }
        }
    }
}

fn history_table(history: &History) -> Markup {
    html! {
        div.past-responses {
            h3 { "Past Responses" }
            table {
                thead {
                    tr { th { "Date" } th { "Score" } th { "Severity" } }
                }
                tbody {
                    @for record in history.records() {
                        tr class=(record.severity.row_class()) {
                            td { (record.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string()) " UTC" }
                            td { (record.score.value()) }
                            td { (record.severity.label()) }
                        }
                    }
                }
            }
        }
    }
}

/// Plot coordinates for `scores`, left to right, in a `CHART_WIDTH` x `CHART_HEIGHT` box.
/// Score 0 sits on the bottom padding line and 27 on the top one.
pub(crate) fn chart_points(scores: &[u8]) -> Vec<(f64, f64)> {
    let inner_w = CHART_WIDTH - 2.0 * CHART_PADDING;
    let inner_h = CHART_HEIGHT - 2.0 * CHART_PADDING;
    let step = if scores.len() > 1 {
        inner_w / (scores.len() - 1) as f64
    } else {
        0.0
    };
    scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            let x = CHART_PADDING + step * i as f64;
            let y = CHART_PADDING + inner_h * (1.0 - f64::from(*score) / 27.0);
            (x, y)
        })
        .collect()
}

fn score_chart(history: &History) -> Markup {
    let scores: Vec<u8> = history.records().iter().map(|r| r.score.value()).collect();
    let points = chart_points(&scores);
    let polyline = points
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ");
    let band_lines: Vec<(u8, f64)> = Severity::ALL
        .iter()
        .map(|s| *s.range().start())
        .chain(std::iter::once(27))
        .map(|score| {
            let y = CHART_PADDING
                + (CHART_HEIGHT - 2.0 * CHART_PADDING) * (1.0 - f64::from(score) / 27.0);
            (score, y)
        })
        .collect();

    html! {
        div.chart-container {
            h3 { "PHQ-9 Scores Over Time" }
            svg #score-chart width=(CHART_WIDTH) height=(CHART_HEIGHT)
                viewBox=(format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}"))
                xmlns="http://www.w3.org/2000/svg" {
                @for (score, y) in &band_lines {
                    line x1=(CHART_PADDING) x2=(CHART_WIDTH - CHART_PADDING)
                        y1=(format!("{y:.1}")) y2=(format!("{y:.1}"))
                        stroke="#ccc" stroke-dasharray="3 3" {}
                    text x="4" y=(format!("{:.1}", y + 4.0)) font-size="10" { (score) }
                }
                polyline points=(polyline) fill="none" stroke="#8884d8" stroke-width="2" {}
                @for (record, (x, y)) in history.records().iter().zip(&points) {
                    circle cx=(format!("{x:.1}")) cy=(format!("{y:.1}")) r="4" fill="#8884d8" {
                        title {
                            (record.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string()) ": " (record.score.value())
                        }
                    }
                }
            }
        }
    }
}

/// The questionnaire page for one page session.
pub fn questionnaire_page(
    session_id: SessionId,
    form: &Questionnaire,
    notice: Option<&Notice>,
    now: DateTime<Utc>,
) -> Markup {
    layout(
        TITLE,
        html! {
            div.header { (TITLE) }
            (patient_banner(form, now))
            @if let Some(notice) = notice {
                (notice_box(notice))
            }
            div.instruction { (INSTRUCTION) }
            form method="post" action=(format!("/session/{session_id}/submit"))
                data-answer-url=(format!("/session/{session_id}/answer")) {
                @for index in QuestionIndex::all() {
                    (question_card(form, index))
                }
                div.button-row {
                    button.no-wrap type="submit" { "Submit Response" }
                }
            }
            @if !form.history().is_empty() {
                (history_table(form.history()))
                (score_chart(form.history()))
            }
            script { (PreEscaped(ANSWER_SCRIPT)) }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_spans_full_range() {
        let points = chart_points(&[0, 27]);
        assert_eq!(points[0], (CHART_PADDING, CHART_HEIGHT - CHART_PADDING));
        assert_eq!(points[1], (CHART_WIDTH - CHART_PADDING, CHART_PADDING));
    }

    #[test]
    fn single_point_sits_on_left_edge() {
        let points = chart_points(&[13]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].0, CHART_PADDING);
    }

    #[test]
    fn error_page_shows_raw_reason() {
        let html = launch_error_page("token exchange failed: 400 <bad>").into_string();
        assert!(html.contains("Failed to connect to FHIR server"));
        assert!(html.contains("token exchange failed: 400 &lt;bad&gt;"));
    }

    #[test]
    fn page_without_patient_shows_placeholders() {
        let form = Questionnaire::new(None);
        let html = questionnaire_page(uuid::Uuid::nil(), &form, None, Utc::now()).into_string();
        assert!(html.contains("Loading..."));
        assert!(html.contains("Gender: ..."));
        assert_eq!(html.matches("class=\"question-card\"").count(), 9);
        assert!(!html.contains("Past Responses"));
    }
}
