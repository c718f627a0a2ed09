use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::extractors::CurrentUser, error::ApiError, state::AppState};

use super::dto::{CreateNoteRequest, ListQuery, NoteOut, UpdateNoteRequest};
use super::repo;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/notes", get(list_notes))
        .route("/notes/:id", get(get_note))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/notes", post(create_note))
        .route("/notes/:id", put(update_note).delete(delete_note))
}

#[instrument(skip_all)]
pub async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteOut>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title must not be empty".into()));
    }

    let note = repo::create(&state.db, user.id, &payload.title, &payload.content).await?;
    info!(note_id = %note.id, owner_id = %user.id, "note created");
    Ok((StatusCode::CREATED, Json(note.into())))
}

#[instrument(skip_all)]
pub async fn list_notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<NoteOut>>, ApiError> {
    let notes =
        repo::list_by_owner(&state.db, user.id, q.limit, q.offset, q.search.as_deref()).await?;
    Ok(Json(notes.into_iter().map(NoteOut::from).collect()))
}

#[instrument(skip_all)]
pub async fn get_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NoteOut>, ApiError> {
    // Foreign notes answer like missing ones: no existence leak across owners
    let note = repo::find_for_owner(&state.db, user.id, id)
        .await?
        .ok_or(ApiError::NotFound("Note not found"))?;
    Ok(Json(note.into()))
}

#[instrument(skip_all)]
pub async fn update_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<Json<NoteOut>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title must not be empty".into()));
    }

    let note = repo::update_for_owner(&state.db, user.id, id, &payload.title, &payload.content)
        .await?
        .ok_or(ApiError::NotFound("Note not found"))?;
    info!(note_id = %note.id, owner_id = %user.id, "note updated");
    Ok(Json(note.into()))
}

#[instrument(skip_all)]
pub async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !repo::delete_for_owner(&state.db, user.id, id).await? {
        return Err(ApiError::NotFound("Note not found"));
    }
    info!(note_id = %id, owner_id = %user.id, "note deleted");
    Ok(StatusCode::NO_CONTENT)
}
