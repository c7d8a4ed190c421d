use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::DbPool;
use crate::error::{ClubError, ClubResult};
use crate::models::{check_session_year, require, serialize_timestamp};

/// A member of the club's core team for some session year.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Member {
    /// The ID of the member
    pub id: i64,
    /// Their full name
    pub name: String,
    /// Their position on the team (e.g. "Secretary")
    pub role: String,
    /// Their year of study
    pub year: String,
    /// A short bio
    pub description: Option<String>,
    /// What they're good at
    pub expertise: Option<String>,
    /// Where their photo is served from
    pub image_path: String,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub instagram: Option<String>,
    /// The session year they served in, e.g. `2025-26`
    pub session_year: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: PrimitiveDateTime,
}

/// The editable fields of a member, used both to create and to update one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewMember {
    pub name: String,
    pub role: String,
    pub year: String,
    pub session_year: String,
    pub description: Option<String>,
    pub expertise: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub instagram: Option<String>,
}

impl NewMember {
    pub fn validate(&self) -> ClubResult<()> {
        require("name", &self.name)?;
        require("role", &self.role)?;
        require("year", &self.year)?;
        require("session_year", &self.session_year)?;
        check_session_year(&self.session_year)
    }
}

impl Member {
    pub const DEFAULT_IMAGE: &'static str = "/images/team/core-team/default.jpg";

    pub async fn with_id(id: i64, pool: &DbPool) -> ClubResult<Self> {
        Self::with_id_opt(id, pool).await?.ok_or(ClubError::NotFound)
    }

    pub async fn with_id_opt(id: i64, pool: &DbPool) -> ClubResult<Option<Self>> {
        sqlx::query_as("SELECT * FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &DbPool) -> ClubResult<Vec<Self>> {
        sqlx::query_as("SELECT * FROM members ORDER BY created_at DESC, id DESC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn for_session_year(session_year: &str, pool: &DbPool) -> ClubResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT * FROM members WHERE session_year = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(session_year)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Every session year some member belongs to, newest first.
    pub async fn session_years(pool: &DbPool) -> ClubResult<Vec<String>> {
        sqlx::query_scalar(
            "SELECT DISTINCT session_year FROM members ORDER BY session_year DESC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count(pool: &DbPool) -> ClubResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Inserts the member and returns their new ID. Members without
    /// an uploaded photo get [`Member::DEFAULT_IMAGE`].
    pub async fn create(
        new_member: &NewMember,
        image_path: Option<&str>,
        pool: &DbPool,
    ) -> ClubResult<i64> {
        let result = sqlx::query(
            "INSERT INTO members
                 (name, role, year, description, expertise, image_path,
                  linkedin, github, instagram, session_year)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_member.name)
        .bind(&new_member.role)
        .bind(&new_member.year)
        .bind(&new_member.description)
        .bind(&new_member.expertise)
        .bind(image_path.unwrap_or(Self::DEFAULT_IMAGE))
        .bind(&new_member.linkedin)
        .bind(&new_member.github)
        .bind(&new_member.instagram)
        .bind(&new_member.session_year)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Replaces every editable field. The current photo is kept
    /// unless a new one is given.
    pub async fn update(
        id: i64,
        update: &NewMember,
        image_path: Option<&str>,
        pool: &DbPool,
    ) -> ClubResult<()> {
        let result = sqlx::query(
            "UPDATE members SET
                 name = ?, role = ?, year = ?, description = ?, expertise = ?,
                 image_path = COALESCE(?, image_path),
                 linkedin = ?, github = ?, instagram = ?, session_year = ?
             WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.role)
        .bind(&update.year)
        .bind(&update.description)
        .bind(&update.expertise)
        .bind(image_path)
        .bind(&update.linkedin)
        .bind(&update.github)
        .bind(&update.instagram)
        .bind(&update.session_year)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ClubError::NotFound);
        }

        Ok(())
    }

    pub async fn delete(id: i64, pool: &DbPool) -> ClubResult<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
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
    use super::*;
    use crate::db;

    fn member(name: &str, session_year: &str) -> NewMember {
        NewMember {
            name: name.to_owned(),
            role: "Member".to_owned(),
            year: "2nd".to_owned(),
            session_year: session_year.to_owned(),
            ..NewMember::default()
        }
    }

    #[test]
    fn validation_requires_a_well_formed_session_year() {
        assert!(member("Ada", "2025-26").validate().is_ok());
        assert!(member("Ada", "2025").validate().is_err());
        assert!(member("", "2025-26").validate().is_err());
    }

    #[tokio::test]
    async fn members_without_a_photo_get_the_default() {
        let pool = db::in_memory().await.unwrap();
        let id = Member::create(&member("Ada", "2025-26"), None, &pool)
            .await
            .unwrap();

        let stored = Member::with_id(id, &pool).await.unwrap();
        assert_eq!(stored.image_path, Member::DEFAULT_IMAGE);
        assert_eq!(stored.session_year, "2025-26");
    }

    #[tokio::test]
    async fn updates_keep_the_photo_unless_replaced() {
        let pool = db::in_memory().await.unwrap();
        let id = Member::create(&member("Ada", "2025-26"), Some("/uploads/ada.png"), &pool)
            .await
            .unwrap();

        Member::update(id, &member("Ada Lovelace", "2025-26"), None, &pool)
            .await
            .unwrap();
        let stored = Member::with_id(id, &pool).await.unwrap();
        assert_eq!(stored.name, "Ada Lovelace");
        assert_eq!(stored.image_path, "/uploads/ada.png");

        Member::update(id, &member("Ada Lovelace", "2025-26"), Some("/uploads/new.png"), &pool)
            .await
            .unwrap();
        let stored = Member::with_id(id, &pool).await.unwrap();
        assert_eq!(stored.image_path, "/uploads/new.png");
    }

    #[tokio::test]
    async fn missing_members_are_not_found() {
        let pool = db::in_memory().await.unwrap();

        assert!(matches!(
            Member::with_id(42, &pool).await,
            Err(ClubError::NotFound)
        ));
        assert!(matches!(
            Member::delete(42, &pool).await,
            Err(ClubError::NotFound)
        ));
        assert!(matches!(
            Member::update(42, &member("Ada", "2025-26"), None, &pool).await,
            Err(ClubError::NotFound)
        ));
    }

    #[tokio::test]
    async fn session_years_come_from_the_records() {
        let pool = db::in_memory().await.unwrap();
        for (name, session_year) in [("Ada", "2025-26"), ("Grace", "2026-27"), ("Alan", "2025-26")] {
            Member::create(&member(name, session_year), None, &pool)
                .await
                .unwrap();
        }

        assert_eq!(
            Member::session_years(&pool).await.unwrap(),
            vec!["2026-27".to_owned(), "2025-26".to_owned()]
        );

        let names: Vec<String> = Member::for_session_year("2025-26", &pool)
            .await
            .unwrap()
            .into_iter()
            .map(|member| member.name)
            .collect();
        assert_eq!(names, vec!["Alan".to_owned(), "Ada".to_owned()]);
    }
}
