pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::scorecards::handlers as scorecards;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Evaluation
        .route(
            "/api/v1/evaluations/interview",
            post(evaluation::handle_prepare_interview),
        )
        .route(
            "/api/v1/scorecards",
            post(evaluation::handle_submit_answers).get(scorecards::handle_list_scorecards),
        )
        // Review workflow
        .route(
            "/api/v1/scorecards/:id",
            get(scorecards::handle_get_scorecard).patch(scorecards::handle_update_scorecard),
        )
        .route(
            "/api/v1/scorecards/:id/request-another-round",
            post(scorecards::handle_request_another_round),
        )
        .with_state(state)
}
