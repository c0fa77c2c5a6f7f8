//! Question answering endpoint

use axum::extract::State;
use tracing::{info, warn};

use super::state::AppState;
use super::types::{ApiError, AskRequest, AskResponse, Json};

/// `POST /ask`
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let result = state.answer_service.answer(&request.question).await;

    let pipeline_state = match result {
        Ok(pipeline_state) => pipeline_state,
        Err(e) => {
            warn!(error = %e, kind = e.kind(), "Question could not be answered");
            return Err(e.into());
        }
    };

    let response = AskResponse::from_state(&pipeline_state, state.relevance_threshold);

    info!(
        similarity = response.similarity,
        passages = response.passages_used,
        relevant = response.relevant,
        "Question answered"
    );

    Ok(Json(response))
}
