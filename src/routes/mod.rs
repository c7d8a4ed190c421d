//! All routes for the API, mounted under `/api`.
//!
//! | Route | Methods |
//! |---|---|
//! | `/members` | `GET` (`?session_year=`), `POST` (multipart) |
//! | `/members/session-years` | `GET` |
//! | `/members/:id` | `GET`, `PUT` (multipart), `DELETE` |
//! | `/events` | `GET`, `POST` (multipart) |
//! | `/events/upcoming`, `/events/completed`, `/events/grouped`, `/events/session-years` | `GET` |
//! | `/events/:id` | `GET`, `PUT` (multipart), `DELETE` |
//! | `/events/:id/status` | `PUT` |
//! | `/contact-submissions` | `GET`, `POST` |
//! | `/contact-submissions/:id/status` | `PUT` |
//! | `/contact-submissions/:id` | `DELETE` |
//! | `/community-submissions` | `GET`, `POST` |
//! | `/community-submissions/export` | `GET` (`?fromDate=&toDate=`) |
//! | `/community-submissions/:id/status` | `PUT` |
//! | `/community-submissions/:id` | `DELETE` |
//! | `/dashboard/stats` | `GET` |

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ClubResult;
use crate::models::stats::DashboardStats;
use crate::AppState;

pub mod community;
pub mod contacts;
pub mod events;
pub mod form;
pub mod members;

pub fn api() -> Router<AppState> {
    Router::new()
        .merge(members::routes())
        .merge(events::routes())
        .merge(contacts::routes())
        .merge(community::routes())
        .route("/dashboard/stats", get(dashboard_stats))
}

async fn dashboard_stats(State(state): State<AppState>) -> ClubResult<Json<DashboardStats>> {
    Ok(Json(DashboardStats::load(&state.pool).await?))
}
