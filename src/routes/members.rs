use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ClubResult;
use crate::file::{self, StagedImage};
use crate::models::member::{Member, NewMember};
use crate::routes::form::FormData;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(create_member))
        .route("/members/session-years", get(session_years))
        .route(
            "/members/:id",
            get(get_member).put(update_member).delete(delete_member),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct MemberFilter {
    pub session_year: Option<String>,
}

impl From<&FormData> for NewMember {
    fn from(form: &FormData) -> Self {
        NewMember {
            name: form.text("name"),
            role: form.text("role"),
            year: form.text("year"),
            session_year: form.text("session_year"),
            description: form.optional("description"),
            expertise: form.optional("expertise"),
            linkedin: form.optional("linkedin"),
            github: form.optional("github"),
            instagram: form.optional("instagram"),
        }
    }
}

async fn list_members(
    State(state): State<AppState>,
    filter: Result<Query<MemberFilter>, QueryRejection>,
) -> ClubResult<Json<Vec<Member>>> {
    let Query(filter) = filter?;

    let members = match filter.session_year.filter(|label| !label.trim().is_empty()) {
        Some(session_year) => Member::for_session_year(&session_year, &state.pool).await?,
        None => Member::all(&state.pool).await?,
    };

    Ok(Json(members))
}

async fn session_years(State(state): State<AppState>) -> ClubResult<Json<Vec<String>>> {
    Ok(Json(Member::session_years(&state.pool).await?))
}

async fn get_member(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ClubResult<Json<Member>> {
    let Path(id) = id?;

    Ok(Json(Member::with_id(id, &state.pool).await?))
}

async fn create_member(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ClubResult<Json<Value>> {
    let mut form = FormData::read(multipart?, state.config.max_upload_bytes).await?;
    let new_member = NewMember::from(&form);
    new_member.validate()?;

    let image = file::stage(form.image.take(), &state.config.upload_dir).await?;
    let id = Member::create(
        &new_member,
        image.as_ref().map(StagedImage::public_path),
        &state.pool,
    )
    .await?;
    file::keep(image);
    info!(id, name = %new_member.name, "added member");

    Ok(Json(json!({ "id": id, "message": "Member added successfully" })))
}

async fn update_member(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ClubResult<Json<Value>> {
    let Path(id) = id?;
    let mut form = FormData::read(multipart?, state.config.max_upload_bytes).await?;
    let update = NewMember::from(&form);
    update.validate()?;

    let image = file::stage(form.image.take(), &state.config.upload_dir).await?;
    Member::update(
        id,
        &update,
        image.as_ref().map(StagedImage::public_path),
        &state.pool,
    )
    .await?;
    file::keep(image);
    info!(id, "updated member");

    Ok(Json(json!({ "message": "Member updated successfully" })))
}

async fn delete_member(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ClubResult<Json<Value>> {
    let Path(id) = id?;
    Member::delete(id, &state.pool).await?;
    info!(id, "deleted member");

    Ok(Json(json!({ "message": "Member deleted successfully" })))
}
