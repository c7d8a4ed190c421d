use serde::Serialize;

use crate::db::DbPool;
use crate::error::ClubResult;
use crate::models::community::{CommunityStatus, CommunitySubmission};
use crate::models::contact::{ContactStatus, ContactSubmission};
use crate::models::event::{Event, EventStatus};
use crate::models::member::Member;

/// The numbers shown on the admin dashboard's front page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_members: i64,
    pub total_events: i64,
    pub upcoming_events: i64,
    /// Contact messages nobody has read yet
    pub new_contacts: i64,
    /// Join requests nobody has followed up on yet
    pub new_community_submissions: i64,
}

impl DashboardStats {
    pub async fn load(pool: &DbPool) -> ClubResult<Self> {
        let (
            total_members,
            total_events,
            upcoming_events,
            new_contacts,
            new_community_submissions,
        ) = tokio::try_join!(
            Member::count(pool),
            Event::count(pool),
            Event::count_with_status(EventStatus::Upcoming, pool),
            ContactSubmission::count_with_status(ContactStatus::New, pool),
            CommunitySubmission::count_with_status(CommunityStatus::New, pool),
        )?;

        Ok(Self {
            total_members,
            total_events,
            upcoming_events,
            new_contacts,
            new_community_submissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn an_empty_club_has_all_zeroes() {
        let pool = db::in_memory().await.unwrap();

        assert_eq!(
            DashboardStats::load(&pool).await.unwrap(),
            DashboardStats {
                total_members: 0,
                total_events: 0,
                upcoming_events: 0,
                new_contacts: 0,
                new_community_submissions: 0,
            }
        );
    }
}
