use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::DbPool;
use crate::error::{ClubError, ClubResult};
use crate::models::{check_session_year, require, serialize_date, serialize_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ClubError;

    fn from_str(value: &str) -> ClubResult<Self> {
        match value.trim() {
            "upcoming" => Ok(EventStatus::Upcoming),
            "completed" => Ok(EventStatus::Completed),
            other => Err(ClubError::BadRequest(format!(
                "status must be \"upcoming\" or \"completed\", got {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    /// The ID of the event
    pub id: i64,
    /// The name of the event
    pub title: String,
    /// General information or details about this event
    pub description: Option<String>,
    /// Workshop, hackathon, talk, ...
    pub category: String,
    pub status: EventStatus,
    /// The day the event is held
    #[serde(serialize_with = "serialize_date")]
    pub event_date: Date,
    /// Free-form start time, e.g. "10:00 AM"
    pub event_time: Option<String>,
    /// Where this event will be held
    pub location: Option<String>,
    /// Free-form length, e.g. "3 hours"
    pub duration: Option<String>,
    pub image_path: String,
    /// An external page with more details
    pub event_page_url: Option<String>,
    /// The session year this event belongs to, e.g. `2025-26`
    pub session_year: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: PrimitiveDateTime,
}

/// All events of one session year.
#[derive(Debug, Clone, Serialize)]
pub struct EventGroup {
    pub session_year: String,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub status: EventStatus,
    pub event_date: Date,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub event_page_url: Option<String>,
    pub session_year: String,
}

impl NewEvent {
    pub fn validate(&self) -> ClubResult<()> {
        require("title", &self.title)?;
        require("category", &self.category)?;
        require("session_year", &self.session_year)?;
        check_session_year(&self.session_year)
    }
}

impl Event {
    pub const DEFAULT_IMAGE: &'static str = "/images/events/default.jpg";

    pub async fn with_id(id: i64, pool: &DbPool) -> ClubResult<Self> {
        Self::with_id_opt(id, pool).await?.ok_or(ClubError::NotFound)
    }

    pub async fn with_id_opt(id: i64, pool: &DbPool) -> ClubResult<Option<Self>> {
        sqlx::query_as("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// All events, latest date first.
    pub async fn all(pool: &DbPool) -> ClubResult<Vec<Self>> {
        sqlx::query_as("SELECT * FROM events ORDER BY event_date DESC, id DESC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Upcoming events, soonest first.
    pub async fn upcoming(pool: &DbPool) -> ClubResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT * FROM events WHERE status = ? ORDER BY event_date ASC, id ASC",
        )
        .bind(EventStatus::Upcoming)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Completed events, most recent first.
    pub async fn completed(pool: &DbPool) -> ClubResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT * FROM events WHERE status = ? ORDER BY event_date DESC, id DESC",
        )
        .bind(EventStatus::Completed)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn session_years(pool: &DbPool) -> ClubResult<Vec<String>> {
        sqlx::query_scalar("SELECT DISTINCT session_year FROM events ORDER BY session_year DESC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn count(pool: &DbPool) -> ClubResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn count_with_status(status: EventStatus, pool: &DbPool) -> ClubResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE status = ?")
            .bind(status)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Groups events by session year, latest session first. Within a
    /// session, events are ordered by date, latest first.
    pub fn grouped_by_session(events: Vec<Event>) -> Vec<EventGroup> {
        let mut sessions: BTreeMap<String, Vec<Event>> = BTreeMap::new();
        for event in events {
            sessions
                .entry(event.session_year.clone())
                .or_default()
                .push(event);
        }

        sessions
            .into_iter()
            .rev()
            .map(|(session_year, mut events)| {
                events.sort_by(|a, b| b.event_date.cmp(&a.event_date));
                EventGroup {
                    session_year,
                    events,
                }
            })
            .collect()
    }

    pub async fn create(
        new_event: &NewEvent,
        image_path: Option<&str>,
        pool: &DbPool,
    ) -> ClubResult<i64> {
        let result = sqlx::query(
            "INSERT INTO events
                 (title, description, category, status, event_date, event_time,
                  location, duration, image_path, event_page_url, session_year)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_event.title)
        .bind(&new_event.description)
        .bind(&new_event.category)
        .bind(new_event.status)
        .bind(new_event.event_date)
        .bind(&new_event.event_time)
        .bind(&new_event.location)
        .bind(&new_event.duration)
        .bind(image_path.unwrap_or(Self::DEFAULT_IMAGE))
        .bind(&new_event.event_page_url)
        .bind(&new_event.session_year)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(
        id: i64,
        update: &NewEvent,
        image_path: Option<&str>,
        pool: &DbPool,
    ) -> ClubResult<()> {
        let result = sqlx::query(
            "UPDATE events SET
                 title = ?, description = ?, category = ?, status = ?, event_date = ?,
                 event_time = ?, location = ?, duration = ?,
                 image_path = COALESCE(?, image_path),
                 event_page_url = ?, session_year = ?
             WHERE id = ?",
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.category)
        .bind(update.status)
        .bind(update.event_date)
        .bind(&update.event_time)
        .bind(&update.location)
        .bind(&update.duration)
        .bind(image_path)
        .bind(&update.event_page_url)
        .bind(&update.session_year)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ClubError::NotFound);
        }

        Ok(())
    }

    pub async fn set_status(id: i64, status: EventStatus, pool: &DbPool) -> ClubResult<()> {
        let result = sqlx::query("UPDATE events SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ClubError::NotFound);
        }

        Ok(())
    }

    pub async fn delete(id: i64, pool: &DbPool) -> ClubResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ClubError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;
    use crate::db;

    fn new_event(title: &str, event_date: Date, session_year: &str) -> NewEvent {
        NewEvent {
            title: title.to_owned(),
            description: None,
            category: "Workshop".to_owned(),
            status: EventStatus::Upcoming,
            event_date,
            event_time: None,
            location: None,
            duration: None,
            event_page_url: None,
            session_year: session_year.to_owned(),
        }
    }

    fn stored(id: i64, event_date: Date, session_year: &str) -> Event {
        Event {
            id,
            title: format!("Event {}", id),
            description: None,
            category: "Talk".to_owned(),
            status: EventStatus::Completed,
            event_date,
            event_time: None,
            location: None,
            duration: None,
            image_path: Event::DEFAULT_IMAGE.to_owned(),
            event_page_url: None,
            session_year: session_year.to_owned(),
            created_at: datetime!(2025-01-01 00:00:00),
        }
    }

    #[test]
    fn later_sessions_come_first() {
        let groups = Event::grouped_by_session(vec![
            stored(1, date!(2025 - 09 - 01), "2025-26"),
            stored(2, date!(2026 - 09 - 01), "2026-27"),
            stored(3, date!(2026 - 02 - 01), "2025-26"),
        ]);

        let labels: Vec<&str> = groups.iter().map(|g| g.session_year.as_str()).collect();
        assert_eq!(labels, vec!["2026-27", "2025-26"]);

        let ids: Vec<i64> = groups[1].events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn statuses_parse_from_their_names() {
        assert_eq!("upcoming".parse::<EventStatus>().unwrap(), EventStatus::Upcoming);
        assert_eq!("completed".parse::<EventStatus>().unwrap(), EventStatus::Completed);
        assert!("cancelled".parse::<EventStatus>().is_err());
    }

    #[tokio::test]
    async fn events_are_listed_latest_date_first() {
        let pool = db::in_memory().await.unwrap();
        for (title, event_date) in [
            ("Intro", date!(2025 - 08 - 10)),
            ("Hackathon", date!(2026 - 01 - 20)),
            ("Talk", date!(2025 - 11 - 05)),
        ] {
            Event::create(&new_event(title, event_date, "2025-26"), None, &pool)
                .await
                .unwrap();
        }

        let titles: Vec<String> = Event::all(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|event| event.title)
            .collect();
        assert_eq!(titles, vec!["Hackathon", "Talk", "Intro"]);

        let upcoming: Vec<String> = Event::upcoming(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|event| event.title)
            .collect();
        assert_eq!(upcoming, vec!["Intro", "Talk", "Hackathon"]);
    }

    #[tokio::test]
    async fn status_changes_touch_only_the_status() {
        let pool = db::in_memory().await.unwrap();
        let id = Event::create(
            &new_event("Intro", date!(2025 - 08 - 10), "2025-26"),
            Some("/uploads/intro.png"),
            &pool,
        )
        .await
        .unwrap();

        Event::set_status(id, EventStatus::Completed, &pool)
            .await
            .unwrap();

        let event = Event::with_id(id, &pool).await.unwrap();
        assert_eq!(event.status, EventStatus::Completed);
        assert_eq!(event.title, "Intro");
        assert_eq!(event.image_path, "/uploads/intro.png");
        assert_eq!(Event::count_with_status(EventStatus::Upcoming, &pool).await.unwrap(), 0);
        assert!(Event::completed(&pool).await.unwrap().iter().any(|e| e.id == id));
    }

    #[tokio::test]
    async fn events_without_an_image_get_the_default() {
        let pool = db::in_memory().await.unwrap();
        let id = Event::create(&new_event("Intro", date!(2025 - 08 - 10), "2025-26"), None, &pool)
            .await
            .unwrap();

        assert_eq!(
            Event::with_id(id, &pool).await.unwrap().image_path,
            Event::DEFAULT_IMAGE
        );
    }
}
