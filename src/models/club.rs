//! Clubs and their weekly schedules.

use super::{Collection, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An organizational unit with one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Monthly contribution owed by each member, never negative
    #[serde(default)]
    pub membership_fee: f64,
    /// Owning user
    pub owner_id: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Record for Club {
    const COLLECTION: Collection = Collection::Clubs;
    const ENTITY: &'static str = "club";

    fn id(&self) -> i64 {
        self.id
    }
}

/// A recurring weekly slot of a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Unique identifier
    pub id: i64,
    /// Owning club
    pub club_id: i64,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    /// Start time, `HH:MM`
    pub time: String,
    /// Length in minutes
    pub duration: u32,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Record for Schedule {
    const COLLECTION: Collection = Collection::Schedules;
    const ENTITY: &'static str = "schedule";

    fn id(&self) -> i64 {
        self.id
    }
}
