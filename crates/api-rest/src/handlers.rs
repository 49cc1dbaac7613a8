//! Request handlers.

use crate::state::AppState;
use crate::views;
use api_shared::{
    ErrorRes, HealthRes, HealthService, HistoryEntry, HistoryRes, ScoreReq, ScoreRes, ScoreService,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use phq9::{QuestionIndex, ResponseValue};
use phq9_core::{
    bootstrap, submit, AuthError, BootstrapOutcome, CallbackParams, LaunchRequest, SessionId,
    SubmitError,
};
use serde::Deserialize;
use std::collections::HashMap;

// ============================================================================
// SMART launch
// ============================================================================

/// Start a SMART launch and send the browser to the authorization server.
///
/// # Errors
///
/// Renders the terminal error view if no usable issuer is available (`400`) or discovery
/// fails (`502`).
pub async fn launch(State(state): State<AppState>, Query(req): Query<LaunchRequest>) -> Response {
    match state.launcher().initiate(&req).await {
        Ok(redirect) => {
            state.sessions().add_pending(redirect.pending).await;
            Redirect::to(redirect.authorize_url.as_str()).into_response()
        }
        Err(e) => {
            tracing::error!("SMART launch could not start: {}", e);
            let status = match &e {
                AuthError::MissingIssuer | AuthError::InvalidIssuer(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, views::launch_error_page(&e.to_string())).into_response()
        }
    }
}

/// Authorization callback: complete the launch and mount the questionnaire.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match bootstrap(state.launcher(), state.sessions(), &params).await {
        BootstrapOutcome::Ready(id) => Redirect::to(&format!("/session/{id}")).into_response(),
        BootstrapOutcome::Failed(reason) => {
            (StatusCode::UNAUTHORIZED, views::launch_error_page(&reason)).into_response()
        }
    }
}

// ============================================================================
// Questionnaire page
// ============================================================================

fn session_not_found() -> Response {
    (StatusCode::NOT_FOUND, views::not_found_page()).into_response()
}

/// Render the questionnaire page. A pending notice is shown once and then dropped.
pub async fn session_page(State(state): State<AppState>, Path(id): Path<SessionId>) -> Response {
    let Some(session) = state.sessions().get(&id).await else {
        return session_not_found();
    };
    let mut session = session.lock().await;
    let notice = session.questionnaire.take_notice();
    views::questionnaire_page(id, &session.questionnaire, notice.as_ref(), Utc::now())
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    pub question: usize,
    pub value: i64,
}

fn parse_answer(question: usize, value: i64) -> Result<(QuestionIndex, ResponseValue), String> {
    let index = QuestionIndex::new(question).map_err(|e| e.to_string())?;
    let value = ResponseValue::new(value).map_err(|e| e.to_string())?;
    Ok((index, value))
}

/// Set a single answer.
pub async fn set_answer(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Form(form): Form<AnswerForm>,
) -> Response {
    let (index, value) = match parse_answer(form.question, form.value) {
        Ok(parsed) => parsed,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };
    let Some(session) = state.sessions().get(&id).await else {
        return session_not_found();
    };
    session.lock().await.questionnaire.set_answer(index, value);
    Redirect::to(&format!("/session/{id}#question-{}", index.get())).into_response()
}

/// Apply the posted answers (`q0`..`q8`) and run one submission attempt.
///
/// The page session stays locked for the whole attempt, so a second submit for the same page
/// waits for the first to finish.
pub async fn submit_answers(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let mut answers = Vec::new();
    for index in QuestionIndex::all() {
        let Some(raw) = fields.get(&format!("q{}", index.get())) else {
            continue;
        };
        let parsed = raw
            .trim()
            .parse::<ResponseValue>()
            .map_err(|e| e.to_string());
        match parsed {
            Ok(value) => answers.push((index, value)),
            Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }

    let Some(session) = state.sessions().get(&id).await else {
        return session_not_found();
    };
    let mut guard = session.lock().await;
    let page = &mut *guard;
    for (index, value) in answers {
        page.questionnaire.set_answer(index, value);
    }

    let target = match submit(&mut page.questionnaire, &page.client, Utc::now()).await {
        Err(SubmitError::Incomplete(missing)) => match missing.first() {
            Some(first) => format!("/session/{id}#question-{}", first.get()),
            None => format!("/session/{id}"),
        },
        _ => format!("/session/{id}"),
    };
    Redirect::to(&target).into_response()
}

// ============================================================================
// JSON API
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/score",
    request_body = ScoreReq,
    responses(
        (status = 200, description = "Score and severity band", body = ScoreRes),
        (status = 422, description = "Wrong number of answers or an answer out of range", body = ErrorRes)
    )
)]
/// Score nine answers without a session.
///
/// # Errors
///
/// Returns `422 Unprocessable Entity` if there are not exactly nine answers or any is outside
/// `0..=3`.
pub async fn score(
    Json(req): Json<ScoreReq>,
) -> Result<Json<ScoreRes>, (StatusCode, Json<ErrorRes>)> {
    ScoreService::score(&req).map(Json).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorRes {
                message: e.to_string(),
            }),
        )
    })
}

#[utoipa::path(
    get,
    path = "/session/{id}/history",
    params(
        ("id" = String, Path, description = "Page session id")
    ),
    responses(
        (status = 200, description = "Submissions made in this page session", body = HistoryRes),
        (status = 404, description = "Unknown page session", body = ErrorRes)
    )
)]
/// Submission history of one page session, oldest first.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<HistoryRes>, (StatusCode, Json<ErrorRes>)> {
    let session = state.sessions().get(&id).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorRes {
                message: format!("unknown session {id}"),
            }),
        )
    })?;
    let session = session.lock().await;
    let entries = session
        .questionnaire
        .history()
        .records()
        .iter()
        .map(|record| HistoryEntry {
            submitted_at: record.submitted_at.to_rfc3339(),
            score: record.score.value(),
            severity: record.severity.label().to_string(),
        })
        .collect();
    Ok(Json(HistoryRes { entries }))
}
