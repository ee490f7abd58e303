//! Club memberships.

use super::{Collection, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived membership state of a (user, club) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// No membership row exists
    NotMember,
    /// Membership without expiry or not yet expired
    Active,
    /// `expires_at` lies in the past
    Expired,
}

/// A user's membership in a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Unique identifier
    pub id: i64,
    /// Member
    pub user_id: i64,
    /// Club
    pub club_id: i64,
    /// Join time
    pub joined_at: DateTime<Utc>,
    /// Optional end of the membership
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Membership {
    /// Status of this membership at `now`.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> MembershipStatus {
        match self.expires_at {
            Some(expires_at) if expires_at < now => MembershipStatus::Expired,
            _ => MembershipStatus::Active,
        }
    }
}

impl Record for Membership {
    const COLLECTION: Collection = Collection::Memberships;
    const ENTITY: &'static str = "membership";

    fn id(&self) -> i64 {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.user_id, self.club_id))
    }
}
