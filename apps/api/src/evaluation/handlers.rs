use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::evaluation::pipeline::{AnswerSubmission, EvaluationPipeline, InterviewPlan};
use crate::models::resume::ResumeSnapshot;
use crate::models::scorecard::ScorecardView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PrepareInterviewRequest {
    pub resume: ResumeSnapshot,
    /// Reviewer-written questions appended after the generated ones.
    #[serde(default)]
    pub manual_questions: Vec<String>,
}

/// POST /api/v1/evaluations/interview
pub async fn handle_prepare_interview(
    State(state): State<AppState>,
    Json(req): Json<PrepareInterviewRequest>,
) -> Result<Json<InterviewPlan>, AppError> {
    if req.resume.name.trim().is_empty() {
        return Err(AppError::Validation("resume.name cannot be empty".to_string()));
    }

    let plan = EvaluationPipeline::new(
        state.llm.as_ref(),
        state.store.as_ref(),
        &state.config.target_role,
    )
    .prepare_interview(&req.resume, &req.manual_questions)
    .await;

    Ok(Json(plan))
}

/// POST /api/v1/scorecards
pub async fn handle_submit_answers(
    State(state): State<AppState>,
    Json(submission): Json<AnswerSubmission>,
) -> Result<(StatusCode, Json<ScorecardView>), AppError> {
    let scorecard = EvaluationPipeline::new(
        state.llm.as_ref(),
        state.store.as_ref(),
        &state.config.target_role,
    )
    .complete_evaluation(submission)
    .await?;

    Ok((StatusCode::CREATED, Json(scorecard.into())))
}
