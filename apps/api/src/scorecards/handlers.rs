use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::scorecard::{ScorecardFilter, ScorecardView};
use crate::scorecards::reviewer::Reviewer;
use crate::scorecards::workflow::ScorecardWorkflow;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusActionKind {
    Screen,
    Shortlist,
    Reject,
    Approve,
}

/// Body of `PATCH /api/v1/scorecards/:id`. At least one of `action` / `note` is required.
#[derive(Debug, Deserialize)]
pub struct UpdateScorecardRequest {
    pub action: Option<StatusActionKind>,
    /// Rejection reason or approval feedback, depending on `action`.
    pub feedback: Option<String>,
    pub note: Option<String>,
}

fn workflow(state: &AppState) -> ScorecardWorkflow<'_> {
    ScorecardWorkflow::new(state.store.as_ref(), state.notifier.as_ref())
}

/// GET /api/v1/scorecards
pub async fn handle_list_scorecards(
    State(state): State<AppState>,
    Query(filter): Query<ScorecardFilter>,
) -> Result<Json<Vec<ScorecardView>>, AppError> {
    let scorecards = state.store.find(&filter).await?;
    Ok(Json(scorecards.into_iter().map(ScorecardView::from).collect()))
}

/// GET /api/v1/scorecards/:id
pub async fn handle_get_scorecard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScorecardView>, AppError> {
    let scorecard = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Scorecard {id} not found")))?;
    Ok(Json(scorecard.into()))
}

/// PATCH /api/v1/scorecards/:id
///
/// The status action runs first, so a rejected transition leaves the note untouched.
pub async fn handle_update_scorecard(
    State(state): State<AppState>,
    reviewer: Reviewer,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateScorecardRequest>,
) -> Result<Json<ScorecardView>, AppError> {
    if req.action.is_none() && req.note.is_none() {
        return Err(AppError::Validation(
            "request must include an action or a note".to_string(),
        ));
    }

    let workflow = workflow(&state);
    let mut scorecard = None;

    if let Some(action) = req.action {
        scorecard = Some(match action {
            StatusActionKind::Screen => workflow.start_screening(&reviewer, id).await?,
            StatusActionKind::Shortlist => workflow.shortlist(&reviewer, id).await?,
            StatusActionKind::Reject => workflow.reject(&reviewer, id, req.feedback).await?,
            StatusActionKind::Approve => {
                workflow
                    .approve(&reviewer, id, req.feedback.as_deref().unwrap_or_default())
                    .await?
            }
        });
    }

    if let Some(note) = req.note {
        scorecard = Some(workflow.add_note(&reviewer, id, &note).await?);
    }

    let scorecard =
        scorecard.ok_or_else(|| AppError::Validation("nothing to update".to_string()))?;
    Ok(Json(scorecard.into()))
}

/// POST /api/v1/scorecards/:id/request-another-round
pub async fn handle_request_another_round(
    State(state): State<AppState>,
    reviewer: Reviewer,
    Path(id): Path<Uuid>,
) -> Result<Json<ScorecardView>, AppError> {
    let scorecard = workflow(&state).request_another_round(&reviewer, id).await?;
    Ok(Json(scorecard.into()))
}
