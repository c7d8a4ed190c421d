use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::DbPool;
use crate::error::{ClubError, ClubResult};
use crate::models::{require, require_email, serialize_timestamp};
use crate::util;

/// Where a join request is in the onboarding pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CommunityStatus {
    New,
    Contacted,
    Joined,
}

impl fmt::Display for CommunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommunityStatus::New => "new",
            CommunityStatus::Contacted => "contacted",
            CommunityStatus::Joined => "joined",
        })
    }
}

/// A request to join the community, sent through the public join form.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommunitySubmission {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    /// Their college roll number
    pub rollno: String,
    /// Their year of study
    pub year: String,
    pub branch: String,
    pub status: CommunityStatus,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCommunitySubmission {
    pub fullname: String,
    pub email: String,
    pub rollno: String,
    pub year: String,
    pub branch: String,
}

impl NewCommunitySubmission {
    pub fn validate(&self) -> ClubResult<()> {
        require("fullname", &self.fullname)?;
        require_email("email", &self.email)?;
        require("rollno", &self.rollno)?;
        require("year", &self.year)?;
        require("branch", &self.branch)
    }
}

impl CommunitySubmission {
    pub async fn with_id(id: i64, pool: &DbPool) -> ClubResult<Self> {
        sqlx::query_as("SELECT * FROM community_submissions WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ClubError::NotFound)
    }

    pub async fn all(pool: &DbPool) -> ClubResult<Vec<Self>> {
        sqlx::query_as("SELECT * FROM community_submissions ORDER BY created_at DESC, id DESC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Submissions created on a day within `from..=to`, counting days in
    /// the same zone the export displays submission dates in.
    pub async fn created_between(from: Date, to: Date, pool: &DbPool) -> ClubResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT * FROM community_submissions
             WHERE date(created_at, ?) BETWEEN ? AND ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(util::report_offset_modifier())
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count_with_status(status: CommunityStatus, pool: &DbPool) -> ClubResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM community_submissions WHERE status = ?")
            .bind(status)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(submission: &NewCommunitySubmission, pool: &DbPool) -> ClubResult<i64> {
        let result = sqlx::query(
            "INSERT INTO community_submissions (fullname, email, rollno, year, branch)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&submission.fullname)
        .bind(&submission.email)
        .bind(&submission.rollno)
        .bind(&submission.year)
        .bind(&submission.branch)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn set_status(id: i64, status: CommunityStatus, pool: &DbPool) -> ClubResult<()> {
        let result = sqlx::query("UPDATE community_submissions SET status = ? WHERE id = ?")
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
        let result = sqlx::query("DELETE FROM community_submissions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ClubError::NotFound);
        }

        Ok(())
    }
}
