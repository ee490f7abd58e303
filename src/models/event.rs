//! Events, registrations and per-attendee payment markers.

use super::{Collection, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether attending an event costs money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// No payment required
    Free,
    /// Attendees pay `price`
    Paid,
}

/// A club event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier
    pub id: i64,
    /// Owning club
    pub club_id: i64,
    /// Title
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Where it takes place
    #[serde(default)]
    pub location: String,
    /// Start time
    pub starts_at: DateTime<Utc>,
    /// Optional end time, strictly after `starts_at`
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Free or paid
    pub event_type: EventType,
    /// Price per attendee, 0 for free events
    #[serde(default)]
    pub price: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// True for paid events.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.event_type == EventType::Paid
    }
}

impl Record for Event {
    const COLLECTION: Collection = Collection::Events;
    const ENTITY: &'static str = "event";

    fn id(&self) -> i64 {
        self.id
    }
}

/// A user's registration for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    /// Unique identifier
    pub id: i64,
    /// Event
    pub event_id: i64,
    /// Registered user
    pub user_id: i64,
    /// Registration time
    pub registered_at: DateTime<Utc>,
}

impl Record for Attendance {
    const COLLECTION: Collection = Collection::Attendance;
    const ENTITY: &'static str = "attendance";

    fn id(&self) -> i64 {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.event_id, self.user_id))
    }
}

/// Status of an [`EventPayment`]. A row only exists once paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPaymentStatus {
    /// Settled
    Paid,
}

/// Marker that an attendee has paid for a paid event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayment {
    /// Unique identifier
    pub id: i64,
    /// Event
    pub event_id: i64,
    /// Payer
    pub user_id: i64,
    /// Amount paid
    pub amount: f64,
    /// Payment time
    pub paid_at: DateTime<Utc>,
    /// Always `paid`
    pub status: EventPaymentStatus,
}

impl Record for EventPayment {
    const COLLECTION: Collection = Collection::EventPayments;
    const ENTITY: &'static str = "event payment";

    fn id(&self) -> i64 {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.event_id, self.user_id))
    }
}
