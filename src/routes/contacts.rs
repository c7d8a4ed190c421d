use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ClubResult;
use crate::models::contact::{ContactStatus, ContactSubmission, NewContactSubmission};
use crate::models::StatusUpdate;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/contact-submissions",
            get(list_submissions).post(create_submission),
        )
        .route("/contact-submissions/:id/status", put(set_status))
        .route("/contact-submissions/:id", delete(delete_submission))
}

async fn list_submissions(
    State(state): State<AppState>,
) -> ClubResult<Json<Vec<ContactSubmission>>> {
    Ok(Json(ContactSubmission::all(&state.pool).await?))
}

async fn create_submission(
    State(state): State<AppState>,
    body: Result<Json<NewContactSubmission>, JsonRejection>,
) -> ClubResult<Json<Value>> {
    let Json(submission) = body?;
    submission.validate()?;

    let id = ContactSubmission::create(&submission, &state.pool).await?;
    info!(id, "received contact submission");

    Ok(Json(json!({
        "id": id,
        "message": "Contact submission received successfully"
    })))
}

async fn set_status(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<StatusUpdate<ContactStatus>>, JsonRejection>,
) -> ClubResult<Json<Value>> {
    let Path(id) = id?;
    let Json(StatusUpdate { status }) = body?;
    ContactSubmission::set_status(id, status, &state.pool).await?;

    Ok(Json(json!({ "message": "Status updated successfully" })))
}

async fn delete_submission(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ClubResult<Json<Value>> {
    let Path(id) = id?;
    ContactSubmission::delete(id, &state.pool).await?;
    info!(id, "deleted contact submission");

    Ok(Json(json!({ "message": "Contact submission deleted successfully" })))
}
