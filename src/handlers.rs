// handlers.rs
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    models::{Choice, CreateChoiceRequest, CreatePollRequest, Poll, PollResult, Vote},
    AppState,
};

/// GET /poll
pub async fn list_polls(State(state): State<AppState>) -> Result<Json<Vec<Poll>>, AppError> {
    Ok(Json(state.polls.list_polls().await?))
}

/// GET /poll/{id}/choice
pub async fn list_choices(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Choice>>, AppError> {
    Ok(Json(state.polls.list_choices(&id).await?))
}

/// GET /poll/{id}/result
pub async fn poll_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PollResult>, AppError> {
    Ok(Json(state.polls.poll_result(&id).await?))
}

/// POST /poll
pub async fn create_poll(
    State(state): State<AppState>,
    payload: Result<Json<CreatePollRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Poll>), AppError> {
    let Json(request) = payload?;
    let poll = state.polls.create_poll(request).await?;

    Ok((StatusCode::CREATED, Json(poll)))
}

/// POST /choice
pub async fn create_choice(
    State(state): State<AppState>,
    payload: Result<Json<CreateChoiceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Choice>), AppError> {
    let Json(request) = payload?;
    let choice = state.polls.create_choice(request).await?;

    Ok((StatusCode::CREATED, Json(choice)))
}

/// POST /choice/{id}/vote
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Vote>), AppError> {
    let vote = state.polls.cast_vote(&id).await?;

    Ok((StatusCode::CREATED, Json(vote)))
}
