use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::DbPool;
use crate::error::{ClubError, ClubResult};
use crate::models::{flexible_bool, require, require_email, serialize_timestamp};

/// Where a contact message is in the admins' triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContactStatus {
    New,
    Read,
    Replied,
}

/// A message sent through the public contact form.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactSubmission {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    /// Whether they asked to receive the newsletter
    pub newsletter: bool,
    pub status: ContactStatus,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub newsletter: bool,
}

impl NewContactSubmission {
    pub fn validate(&self) -> ClubResult<()> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        require_email("email", &self.email)?;
        require("subject", &self.subject)?;
        require("message", &self.message)
    }
}

impl ContactSubmission {
    pub async fn with_id(id: i64, pool: &DbPool) -> ClubResult<Self> {
        sqlx::query_as("SELECT * FROM contact_submissions WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ClubError::NotFound)
    }

    pub async fn all(pool: &DbPool) -> ClubResult<Vec<Self>> {
        sqlx::query_as("SELECT * FROM contact_submissions ORDER BY created_at DESC, id DESC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn count_with_status(status: ContactStatus, pool: &DbPool) -> ClubResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_submissions WHERE status = ?")
            .bind(status)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(submission: &NewContactSubmission, pool: &DbPool) -> ClubResult<i64> {
        let result = sqlx::query(
            "INSERT INTO contact_submissions
                 (first_name, last_name, email, phone, subject, message, newsletter)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&submission.first_name)
        .bind(&submission.last_name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.subject)
        .bind(&submission.message)
        .bind(submission.newsletter)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn set_status(id: i64, status: ContactStatus, pool: &DbPool) -> ClubResult<()> {
        let result = sqlx::query("UPDATE contact_submissions SET status = ? WHERE id = ?")
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
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ClubError::NotFound);
        }

        Ok(())
    }
}
