//! Note routes: create, list, search, get, update, delete.
//!
//! All of these sit behind the auth gate.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use notes_store::{NewNote, NoteChanges, NoteRow, Page, StoreError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validate::Validator;

pub const MSG_NOTE_NOT_FOUND: &str = "No note with that ID exists";
pub const MSG_DUPLICATE_TITLE: &str = "Title already exists!";

const MAX_TITLE_CHARS: usize = 255;
const MAX_CATEGORY_CHARS: usize = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl CreateNoteRequest {
    fn validate(&self) -> ApiResult<()> {
        Validator::new()
            .required("title", &self.title)
            .max_length("title", Some(&self.title), MAX_TITLE_CHARS)
            .required("content", &self.content)
            .max_length("category", self.category.as_deref(), MAX_CATEGORY_CHARS)
            .finish()
    }

    fn into_new_note(self) -> NewNote {
        NewNote::new(
            self.title,
            self.content,
            self.category.filter(|c| !c.is_empty()),
            self.published,
        )
    }
}

/// Partial update. Empty strings count as "not supplied".
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

impl UpdateNoteRequest {
    fn into_changes(self) -> ApiResult<NoteChanges> {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        let changes = NoteChanges {
            title: non_empty(self.title),
            content: non_empty(self.content),
            category: non_empty(self.category),
            published: self.published,
        };

        Validator::new()
            .max_length("title", changes.title.as_deref(), MAX_TITLE_CHARS)
            .max_length("category", changes.category.as_deref(), MAX_CATEGORY_CHARS)
            .finish()?;

        Ok(changes)
    }
}

/// Raw pagination parameters, parsed by hand so bad values get a clear message.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    fn page(&self) -> ApiResult<Page> {
        let page = Page::new(
            parse_positive("page", self.page.as_deref(), Page::DEFAULT_PAGE)?,
            parse_positive("limit", self.limit.as_deref(), Page::DEFAULT_LIMIT)?,
        );
        // The row offset must fit the database's BIGINT.
        if page.checked_offset().is_none() {
            return Err(ApiError::BadRequest("Invalid page parameter".to_string()));
        }
        Ok(page)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoteData {
    pub note: NoteRow,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub status: &'static str,
    pub data: NoteData,
}

impl NoteResponse {
    fn success(note: NoteRow) -> Json<Self> {
        Json(Self {
            status: "success",
            data: NoteData { note },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListResponse {
    pub status: &'static str,
    pub results: usize,
    pub notes: Vec<NoteRow>,
}

impl NoteListResponse {
    fn success(notes: Vec<NoteRow>) -> Json<Self> {
        Json(Self {
            status: "success",
            results: notes.len(),
            notes,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteNoteResponse {
    pub status: &'static str,
    pub message: &'static str,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a pagination value; absent or empty means `default`.
fn parse_positive(name: &str, raw: Option<&str>, default: u32) -> ApiResult<u32> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => match s.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(ApiError::BadRequest(format!("Invalid {name} parameter"))),
        },
    }
}

/// A malformed identifier cannot name an existing note.
fn parse_note_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(MSG_NOTE_NOT_FOUND.to_string()))
}

/// Map store failures onto the note API's messages.
fn note_error(err: StoreError) -> ApiError {
    if err.is_not_found() {
        ApiError::NotFound(MSG_NOTE_NOT_FOUND.to_string())
    } else if err.is_conflict() {
        ApiError::Conflict(MSG_DUPLICATE_TITLE.to_string())
    } else {
        ApiError::Store(err)
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/notes
async fn create_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<NoteResponse>)> {
    let Json(request) = payload?;
    request.validate()?;

    let note = state
        .store()
        .insert_note(&request.into_new_note())
        .await
        .map_err(note_error)?;

    tracing::info!(note_id = %note.id, user_id = %user.user_id, "Note created");

    Ok((StatusCode::CREATED, NoteResponse::success(note)))
}

/// GET /api/notes?page=&limit=
async fn list_notes(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<NoteListResponse>> {
    let Query(query) = query?;
    let page = query.page()?;

    let notes = state.store().list_notes(page).await.map_err(note_error)?;
    Ok(NoteListResponse::success(notes))
}

/// GET /api/notes/search?query=
async fn search_notes(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<NoteListResponse>> {
    let Query(query) = query?;

    let notes = state
        .store()
        .search_notes(query.query.as_deref())
        .await
        .map_err(note_error)?;

    tracing::debug!(results = notes.len(), "Note search");
    Ok(NoteListResponse::success(notes))
}

/// GET /api/notes/{id}
async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<NoteResponse>> {
    let id = parse_note_id(&id)?;
    let note = state.store().get_note(id).await.map_err(note_error)?;
    Ok(NoteResponse::success(note))
}

/// PATCH /api/notes/{id}
async fn update_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> ApiResult<Json<NoteResponse>> {
    let id = parse_note_id(&id)?;
    let Json(request) = payload?;
    let changes = request.into_changes()?;

    let note = state
        .store()
        .update_note(id, &changes, Utc::now())
        .await
        .map_err(note_error)?;

    tracing::info!(note_id = %note.id, user_id = %user.user_id, "Note updated");

    Ok(NoteResponse::success(note))
}

/// DELETE /api/notes/{id}
async fn delete_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteNoteResponse>> {
    let id = parse_note_id(&id)?;
    state.store().delete_note(id).await.map_err(note_error)?;

    tracing::info!(note_id = %id, user_id = %user.user_id, "Note deleted");

    Ok(Json(DeleteNoteResponse {
        status: "success",
        message: "Note deleted successfully",
    }))
}

/// Build note routes. `/api/notes` and `/api/notes/` are equivalent.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/", get(list_notes).post(create_note))
        .route("/api/notes/search", get(search_notes))
        .route(
            "/api/notes/{id}",
            get(get_note).patch(update_note).delete(delete_note),
        )
}
