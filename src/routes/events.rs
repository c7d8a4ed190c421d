use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Multipart, Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ClubResult;
use crate::file::{self, StagedImage};
use crate::models::event::{Event, EventGroup, EventStatus, NewEvent};
use crate::models::{parse_date, require, StatusUpdate};
use crate::routes::form::FormData;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/upcoming", get(upcoming_events))
        .route("/events/completed", get(completed_events))
        .route("/events/grouped", get(grouped_events))
        .route("/events/session-years", get(session_years))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/:id/status", put(set_event_status))
}

impl TryFrom<&FormData> for NewEvent {
    type Error = crate::error::ClubError;

    /// The dashboard has sent the session year as both `session_year`
    /// and `year`; either is accepted.
    fn try_from(form: &FormData) -> ClubResult<Self> {
        let status = form.text("status");
        require("status", &status)?;
        let event_date = form.text("event_date");
        require("event_date", &event_date)?;

        Ok(NewEvent {
            title: form.text("title"),
            description: form.optional("description"),
            category: form.text("category"),
            status: status.parse()?,
            event_date: parse_date("event_date", &event_date)?,
            event_time: form.optional("event_time"),
            location: form.optional("location"),
            duration: form.optional("duration"),
            event_page_url: form.optional("event_page_url"),
            session_year: form.first_of(&["session_year", "year"]),
        })
    }
}

async fn list_events(State(state): State<AppState>) -> ClubResult<Json<Vec<Event>>> {
    Ok(Json(Event::all(&state.pool).await?))
}

async fn upcoming_events(State(state): State<AppState>) -> ClubResult<Json<Vec<Event>>> {
    Ok(Json(Event::upcoming(&state.pool).await?))
}

async fn completed_events(State(state): State<AppState>) -> ClubResult<Json<Vec<Event>>> {
    Ok(Json(Event::completed(&state.pool).await?))
}

async fn grouped_events(State(state): State<AppState>) -> ClubResult<Json<Vec<EventGroup>>> {
    let events = Event::all(&state.pool).await?;

    Ok(Json(Event::grouped_by_session(events)))
}

async fn session_years(State(state): State<AppState>) -> ClubResult<Json<Vec<String>>> {
    Ok(Json(Event::session_years(&state.pool).await?))
}

async fn get_event(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ClubResult<Json<Event>> {
    let Path(id) = id?;

    Ok(Json(Event::with_id(id, &state.pool).await?))
}

async fn create_event(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ClubResult<Json<Value>> {
    let mut form = FormData::read(multipart?, state.config.max_upload_bytes).await?;
    let new_event = NewEvent::try_from(&form)?;
    new_event.validate()?;

    let image = file::stage(form.image.take(), &state.config.upload_dir).await?;
    let id = Event::create(
        &new_event,
        image.as_ref().map(StagedImage::public_path),
        &state.pool,
    )
    .await?;
    file::keep(image);
    info!(id, title = %new_event.title, "added event");

    Ok(Json(json!({ "id": id, "message": "Event added successfully" })))
}

async fn update_event(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ClubResult<Json<Value>> {
    let Path(id) = id?;
    let mut form = FormData::read(multipart?, state.config.max_upload_bytes).await?;
    let update = NewEvent::try_from(&form)?;
    update.validate()?;

    let image = file::stage(form.image.take(), &state.config.upload_dir).await?;
    Event::update(
        id,
        &update,
        image.as_ref().map(StagedImage::public_path),
        &state.pool,
    )
    .await?;
    file::keep(image);
    info!(id, "updated event");

    Ok(Json(json!({ "message": "Event updated successfully" })))
}

async fn set_event_status(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<StatusUpdate<EventStatus>>, JsonRejection>,
) -> ClubResult<Json<Value>> {
    let Path(id) = id?;
    let Json(StatusUpdate { status }) = body?;
    Event::set_status(id, status, &state.pool).await?;
    info!(id, %status, "changed event status");

    Ok(Json(json!({ "message": "Event status updated successfully" })))
}

async fn delete_event(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ClubResult<Json<Value>> {
    let Path(id) = id?;
    Event::delete(id, &state.pool).await?;
    info!(id, "deleted event");

    Ok(Json(json!({ "message": "Event deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn the_legacy_year_field_is_accepted() {
        let form = FormData::with_fields(&[
            ("title", "Hackathon"),
            ("category", "Competition"),
            ("status", "upcoming"),
            ("event_date", "2026-01-20"),
            ("year", "2025-26"),
        ]);
        let event = NewEvent::try_from(&form).unwrap();

        assert_eq!(event.session_year, "2025-26");
        assert_eq!(event.event_date, date!(2026 - 01 - 20));
        assert_eq!(event.status, EventStatus::Upcoming);
        assert!(event.validate().is_ok());
    }

    #[test]
    fn bad_statuses_and_dates_are_rejected() {
        let form = FormData::with_fields(&[
            ("title", "Hackathon"),
            ("category", "Competition"),
            ("status", "postponed"),
            ("event_date", "2026-01-20"),
            ("session_year", "2025-26"),
        ]);
        assert!(NewEvent::try_from(&form).is_err());

        let form = FormData::with_fields(&[
            ("title", "Hackathon"),
            ("category", "Competition"),
            ("status", "upcoming"),
            ("event_date", "20 Jan"),
            ("session_year", "2025-26"),
        ]);
        assert!(NewEvent::try_from(&form).is_err());
    }
}
