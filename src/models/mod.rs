//! Domain records persisted by the entity store.
//!
//! Every record type is bound to exactly one named [`Collection`] through the
//! [`Record`] trait. The store keeps each collection as one ordered list and
//! replaces it wholesale on every write.

pub mod club;
pub mod event;
pub mod ledger;
pub mod membership;
pub mod session;
pub mod user;

pub use club::{Club, Schedule};
pub use event::{Attendance, Event, EventPayment, EventPaymentStatus, EventType};
pub use ledger::{
    ContributionStatus, Finance, FinanceType, MonthlyContribution, Payment, PaymentType,
    month_key, validate_month,
};
pub use membership::{Membership, MembershipStatus};
pub use session::Session;
pub use user::{Role, User, password_hash};

use serde::{Serialize, de::DeserializeOwned};

/// The fixed set of persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Accounts
    Users,
    /// Clubs
    Clubs,
    /// Club events
    Events,
    /// Event registrations
    Attendance,
    /// Club memberships
    Memberships,
    /// Income ledger
    Payments,
    /// Expense ledger
    Finances,
    /// Weekly club schedules
    Schedules,
    /// Per-attendee payment markers for paid events
    EventPayments,
    /// Per-member monthly dues
    MonthlyContributions,
}

impl Collection {
    /// All collections in seeding order.
    pub const ALL: [Self; 10] = [
        Self::Users,
        Self::Clubs,
        Self::Events,
        Self::Attendance,
        Self::Memberships,
        Self::Payments,
        Self::Finances,
        Self::Schedules,
        Self::EventPayments,
        Self::MonthlyContributions,
    ];

    /// Storage key of the collection document.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Clubs => "clubs",
            Self::Events => "events",
            Self::Attendance => "attendance",
            Self::Memberships => "memberships",
            Self::Payments => "payments",
            Self::Finances => "finances",
            Self::Schedules => "schedules",
            Self::EventPayments => "event_payments",
            Self::MonthlyContributions => "monthly_contributions",
        }
    }
}

/// A record stored in one of the named collections.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Collection this record type lives in
    const COLLECTION: Collection;

    /// Singular entity name used in error messages
    const ENTITY: &'static str;

    /// Identifier, unique within the collection
    fn id(&self) -> i64;

    /// Composite key that must be unique within the collection, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_collection_keys_are_distinct() {
        let keys: HashSet<_> = Collection::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys.len(), Collection::ALL.len());
        assert!(!keys.contains(session::SESSION_KEY));
    }
}
