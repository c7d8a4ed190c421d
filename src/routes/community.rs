use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ClubResult;
use crate::export::{self, DateRange, XLSX_CONTENT_TYPE};
use crate::models::community::{CommunityStatus, CommunitySubmission, NewCommunitySubmission};
use crate::models::StatusUpdate;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/community-submissions",
            get(list_submissions).post(create_submission),
        )
        .route("/community-submissions/export", get(export_submissions))
        .route("/community-submissions/:id/status", put(set_status))
        .route("/community-submissions/:id", delete(delete_submission))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

async fn list_submissions(
    State(state): State<AppState>,
) -> ClubResult<Json<Vec<CommunitySubmission>>> {
    Ok(Json(CommunitySubmission::all(&state.pool).await?))
}

async fn create_submission(
    State(state): State<AppState>,
    body: Result<Json<NewCommunitySubmission>, JsonRejection>,
) -> ClubResult<Json<Value>> {
    let Json(submission) = body?;
    submission.validate()?;

    let id = CommunitySubmission::create(&submission, &state.pool).await?;
    info!(id, "received community submission");

    Ok(Json(json!({
        "id": id,
        "message": "Community submission received successfully"
    })))
}

async fn set_status(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<StatusUpdate<CommunityStatus>>, JsonRejection>,
) -> ClubResult<Json<Value>> {
    let Path(id) = id?;
    let Json(StatusUpdate { status }) = body?;
    CommunitySubmission::set_status(id, status, &state.pool).await?;

    Ok(Json(json!({
        "message": "Community submission status updated successfully"
    })))
}

async fn delete_submission(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ClubResult<Json<Value>> {
    let Path(id) = id?;
    CommunitySubmission::delete(id, &state.pool).await?;
    info!(id, "deleted community submission");

    Ok(Json(json!({ "message": "Community submission deleted successfully" })))
}

async fn export_submissions(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> ClubResult<Response> {
    let Query(query) = query?;
    let range = DateRange::from_query(query.from_date.as_deref(), query.to_date.as_deref())?;
    let spreadsheet = export::export_community_submissions(range, &state.pool).await?;

    Ok((
        [
            (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", spreadsheet.file_name),
            ),
        ],
        spreadsheet.content,
    )
        .into_response())
}
