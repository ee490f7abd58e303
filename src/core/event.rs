//! Event business logic - scheduling, registration and event payments.
//!
//! Paying for an event writes two records in one transaction: an
//! [`EventPayment`] marker for the attendee and a [`Payment`] in the club's
//! income ledger. Unregistering removes the registration and the marker but
//! never the ledger entry.

use crate::{
    core::{access, cascade},
    errors::{Error, Result},
    models::{
        Attendance, Club, Event, EventPayment, EventPaymentStatus, EventType, Payment,
        PaymentType,
    },
    store,
};
use chrono::{DateTime, Utc};
use sea_orm::{TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Editable fields of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetails {
    /// Title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Where it takes place
    pub location: String,
    /// Start time, must lie in the future
    pub starts_at: DateTime<Utc>,
    /// Optional end time, strictly after the start
    pub ends_at: Option<DateTime<Utc>>,
    /// Free or paid
    pub event_type: EventType,
    /// Price per attendee; ignored for free events
    pub price: f64,
}

/// Which events of a club to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Every event
    #[default]
    All,
    /// Starting now or later
    Upcoming,
    /// Already started
    Past,
}

/// Payment situation of one user for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    /// Event costs nothing
    Free,
    /// A payment marker exists
    Paid,
    /// Paid event without a payment marker
    Unpaid,
}

impl PaymentState {
    /// True unless a paid event is still unpaid.
    #[must_use]
    pub const fn is_satisfied(self) -> bool {
        !matches!(self, Self::Unpaid)
    }
}

/// Payment overview of one paid event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPaymentSummary {
    /// The event
    pub event: Event,
    /// Sum of all payment markers
    pub total_revenue: f64,
    /// Registered attendees
    pub attendee_count: usize,
    /// Attendees who paid
    pub paid_count: usize,
    /// Attendees who did not pay yet
    pub unpaid_count: usize,
    /// Ids of the attendees who did not pay yet
    pub unpaid_user_ids: Vec<i64>,
}

/// Validates event fields against `now` and normalizes them.
///
/// Free events always store a price of 0.
pub fn validate_event_details(
    mut details: EventDetails,
    now: DateTime<Utc>,
) -> Result<EventDetails> {
    details.title = details.title.trim().to_string();
    if details.title.is_empty() {
        return Err(Error::validation("Event title cannot be empty"));
    }
    if details.starts_at <= now {
        return Err(Error::validation("Event must start in the future"));
    }
    if let Some(ends_at) = details.ends_at {
        if ends_at <= details.starts_at {
            return Err(Error::validation("Event must end after it starts"));
        }
    }
    match details.event_type {
        EventType::Paid => {
            if !details.price.is_finite() || details.price <= 0.0 {
                return Err(Error::InvalidAmount {
                    amount: details.price,
                });
            }
        }
        EventType::Free => details.price = 0.0,
    }
    Ok(details)
}

/// Payment state of `user_id` for `event`, given the event payment markers.
#[must_use]
pub fn payment_state(event: &Event, event_payments: &[EventPayment], user_id: i64) -> PaymentState {
    if !event.is_paid() {
        return PaymentState::Free;
    }
    if event_payments
        .iter()
        .any(|p| p.event_id == event.id && p.user_id == user_id)
    {
        PaymentState::Paid
    } else {
        PaymentState::Unpaid
    }
}

/// Creates an event in a club. Owner or admin only.
#[instrument(skip(db, details), fields(title = %details.title))]
pub async fn create_event(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    details: EventDetails,
) -> Result<Event> {
    access::require_manager(db, actor_id, club_id, "create events in this club").await?;
    let details = validate_event_details(details, Utc::now())?;

    let event = store::append(db, |id| Event {
        id,
        club_id,
        title: details.title,
        description: details.description,
        location: details.location,
        starts_at: details.starts_at,
        ends_at: details.ends_at,
        event_type: details.event_type,
        price: details.price,
        created_at: Utc::now(),
    })
    .await?;

    info!("Created event {} in club {}", event.id, club_id);
    Ok(event)
}

/// Replaces the editable fields of an event. Owner or admin only.
#[instrument(skip(db, details))]
pub async fn update_event(
    db: &DatabaseConnection,
    actor_id: i64,
    event_id: i64,
    details: EventDetails,
) -> Result<Event> {
    let event = store::require::<Event, _>(db, event_id).await?;
    access::require_manager(db, actor_id, event.club_id, "edit this event").await?;
    let details = validate_event_details(details, Utc::now())?;

    let mut events: Vec<Event> = store::read(db).await?;
    let event = events
        .iter_mut()
        .find(|e| e.id == event_id)
        .ok_or_else(|| Error::not_found("event", event_id))?;
    event.title = details.title;
    event.description = details.description;
    event.location = details.location;
    event.starts_at = details.starts_at;
    event.ends_at = details.ends_at;
    event.event_type = details.event_type;
    event.price = details.price;
    let updated = event.clone();

    store::write(db, &events).await?;
    info!("Updated event {}", event_id);
    Ok(updated)
}

/// Deletes an event with its registrations and payment markers.
#[instrument(skip(db))]
pub async fn delete_event(
    db: &DatabaseConnection,
    actor_id: i64,
    event_id: i64,
) -> Result<cascade::CascadeReport> {
    let txn = db.begin().await?;

    let event = store::require::<Event, _>(&txn, event_id).await?;
    access::require_manager(&txn, actor_id, event.club_id, "delete this event").await?;
    let report = cascade::cascade(&txn, |snapshot| {
        cascade::plan_event_deletion(snapshot, event_id)
    })
    .await?;

    txn.commit().await?;

    info!("Deleted event {}", event_id);
    Ok(report)
}

/// Retrieves an event by id.
pub async fn get_event_by_id(db: &DatabaseConnection, event_id: i64) -> Result<Option<Event>> {
    store::find(db, event_id).await
}

/// Lists the events of a club, latest start first.
///
/// Only members, the owner and admins may see club events.
pub async fn list_club_events(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    filter: EventFilter,
) -> Result<Vec<Event>> {
    access::require_viewer(db, actor_id, club_id, "view events of this club").await?;

    let now = Utc::now();
    let mut events: Vec<Event> = store::read::<Event, _>(db)
        .await?
        .into_iter()
        .filter(|e| e.club_id == club_id)
        .filter(|e| match filter {
            EventFilter::All => true,
            EventFilter::Upcoming => e.starts_at >= now,
            EventFilter::Past => e.starts_at < now,
        })
        .collect();
    events.sort_by(|a, b| b.starts_at.cmp(&a.starts_at));
    Ok(events)
}

/// Registrations of an event in registration order.
pub async fn list_attendees(db: &DatabaseConnection, event_id: i64) -> Result<Vec<Attendance>> {
    Ok(store::read::<Attendance, _>(db)
        .await?
        .into_iter()
        .filter(|a| a.event_id == event_id)
        .collect())
}

async fn load_event_for_attendee<C>(conn: &C, user_id: i64, event_id: i64) -> Result<(Event, Club)>
where
    C: ConnectionTrait,
{
    let event = store::require::<Event, _>(conn, event_id).await?;
    let (_, club) =
        access::require_viewer(conn, user_id, event.club_id, "register for this event").await?;
    Ok((event, club))
}

async fn is_registered<C>(conn: &C, event_id: i64, user_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(store::read::<Attendance, _>(conn)
        .await?
        .iter()
        .any(|a| a.event_id == event_id && a.user_id == user_id))
}

async fn add_attendance<C>(conn: &C, event_id: i64, user_id: i64) -> Result<Attendance>
where
    C: ConnectionTrait,
{
    if is_registered(conn, event_id, user_id).await? {
        return Err(Error::validation(format!(
            "User {user_id} is already registered for event {event_id}"
        )));
    }
    store::append(conn, |id| Attendance {
        id,
        event_id,
        user_id,
        registered_at: Utc::now(),
    })
    .await
}

/// Appends the payment marker and the ledger entry for a registered attendee.
async fn record_event_payment<C>(conn: &C, event: &Event, user_id: i64) -> Result<Payment>
where
    C: ConnectionTrait,
{
    if !event.is_paid() {
        return Err(Error::validation(format!("Event {} is free", event.id)));
    }
    if !is_registered(conn, event.id, user_id).await? {
        return Err(Error::validation(format!(
            "User {user_id} is not registered for event {}",
            event.id
        )));
    }

    let markers: Vec<EventPayment> = store::read(conn).await?;
    if payment_state(event, &markers, user_id) == PaymentState::Paid {
        return Err(Error::AlreadyPaid { user_id });
    }

    let paid_at = Utc::now();
    store::append(conn, |id| EventPayment {
        id,
        event_id: event.id,
        user_id,
        amount: event.price,
        paid_at,
        status: EventPaymentStatus::Paid,
    })
    .await?;

    store::append(conn, |id| Payment {
        id,
        club_id: event.club_id,
        user_id: Some(user_id),
        amount: event.price,
        paid_at,
        kind: PaymentType::EventPayment,
        event_id: Some(event.id),
        month: None,
        description: None,
    })
    .await
}

/// Registers the user for a free event.
///
/// Paid events go through [`register_and_pay`].
#[instrument(skip(db))]
pub async fn register_for_event(
    db: &DatabaseConnection,
    user_id: i64,
    event_id: i64,
) -> Result<Attendance> {
    let (event, _) = load_event_for_attendee(db, user_id, event_id).await?;
    if event.is_paid() {
        return Err(Error::validation(format!(
            "Event {event_id} is paid, registration requires payment"
        )));
    }

    let attendance = add_attendance(db, event_id, user_id).await?;
    info!("User {} registered for event {}", user_id, event_id);
    Ok(attendance)
}

/// Registers the user for a paid event and books the payment.
#[instrument(skip(db))]
pub async fn register_and_pay(
    db: &DatabaseConnection,
    user_id: i64,
    event_id: i64,
) -> Result<(Attendance, Payment)> {
    let txn = db.begin().await?;

    let (event, _) = load_event_for_attendee(&txn, user_id, event_id).await?;
    if !event.is_paid() {
        return Err(Error::validation(format!("Event {event_id} is free")));
    }
    let attendance = add_attendance(&txn, event_id, user_id).await?;
    let payment = record_event_payment(&txn, &event, user_id).await?;

    txn.commit().await?;

    info!(
        "User {} registered for event {} and paid {:.2}",
        user_id, event_id, payment.amount
    );
    Ok((attendance, payment))
}

/// Pays for a paid event the user is already registered for.
#[instrument(skip(db))]
pub async fn pay_for_event(db: &DatabaseConnection, user_id: i64, event_id: i64) -> Result<Payment> {
    let txn = db.begin().await?;

    let (event, _) = load_event_for_attendee(&txn, user_id, event_id).await?;
    let payment = record_event_payment(&txn, &event, user_id).await?;

    txn.commit().await?;

    info!("User {} paid {:.2} for event {}", user_id, payment.amount, event_id);
    Ok(payment)
}

/// Records a payment on behalf of a registered attendee. Owner or admin only.
#[instrument(skip(db))]
pub async fn mark_event_payment_paid(
    db: &DatabaseConnection,
    actor_id: i64,
    event_id: i64,
    user_id: i64,
) -> Result<Payment> {
    let txn = db.begin().await?;

    let event = store::require::<Event, _>(&txn, event_id).await?;
    access::require_manager(&txn, actor_id, event.club_id, "manage event payments").await?;
    let payment = record_event_payment(&txn, &event, user_id).await?;

    txn.commit().await?;

    info!("Marked user {} as paid for event {}", user_id, event_id);
    Ok(payment)
}

/// Removes the user's registration and payment marker.
///
/// Income already booked for the event stays in the ledger; there is no
/// refund.
///
/// # Returns
/// * `Ok(true)` - The user was registered
/// * `Ok(false)` - There was nothing to remove
#[instrument(skip(db))]
pub async fn unregister_from_event(
    db: &DatabaseConnection,
    user_id: i64,
    event_id: i64,
) -> Result<bool> {
    let txn = db.begin().await?;

    store::require::<Event, _>(&txn, event_id).await?;

    let mut attendance: Vec<Attendance> = store::read(&txn).await?;
    let before = attendance.len();
    attendance.retain(|a| !(a.event_id == event_id && a.user_id == user_id));
    if attendance.len() == before {
        return Ok(false);
    }

    let mut markers: Vec<EventPayment> = store::read(&txn).await?;
    markers.retain(|p| !(p.event_id == event_id && p.user_id == user_id));

    store::write(&txn, &attendance).await?;
    store::write(&txn, &markers).await?;
    txn.commit().await?;

    info!("User {} unregistered from event {}", user_id, event_id);
    Ok(true)
}

/// Payment state of a user for an event.
pub async fn event_payment_status(
    db: &DatabaseConnection,
    event_id: i64,
    user_id: i64,
) -> Result<PaymentState> {
    let event = store::require::<Event, _>(db, event_id).await?;
    let markers: Vec<EventPayment> = store::read(db).await?;
    Ok(payment_state(&event, &markers, user_id))
}

/// Payment overview for every paid event of a club. Owner or admin only.
pub async fn event_payment_summary(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
) -> Result<Vec<EventPaymentSummary>> {
    access::require_manager(db, actor_id, club_id, "view event payments").await?;

    let events: Vec<Event> = store::read(db).await?;
    let attendance: Vec<Attendance> = store::read(db).await?;
    let markers: Vec<EventPayment> = store::read(db).await?;

    Ok(events
        .into_iter()
        .filter(|e| e.club_id == club_id && e.is_paid())
        .map(|event| {
            let paid: Vec<&EventPayment> =
                markers.iter().filter(|p| p.event_id == event.id).collect();
            let attendees: Vec<&Attendance> =
                attendance.iter().filter(|a| a.event_id == event.id).collect();
            let unpaid_user_ids: Vec<i64> = attendees
                .iter()
                .filter(|a| !paid.iter().any(|p| p.user_id == a.user_id))
                .map(|a| a.user_id)
                .collect();

            EventPaymentSummary {
                total_revenue: paid.iter().map(|p| p.amount).sum(),
                attendee_count: attendees.len(),
                paid_count: paid.len(),
                unpaid_count: unpaid_user_ids.len(),
                unpaid_user_ids,
                event,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::finance::club_balance;
    use crate::errors::ErrorKind;
    use crate::models::Role;
    use crate::test_utils::*;
    use chrono::Duration;

    fn details(event_type: EventType, price: f64) -> EventDetails {
        EventDetails {
            title: "Tournament".to_string(),
            description: String::new(),
            location: "Hall".to_string(),
            starts_at: Utc::now() + Duration::days(3),
            ends_at: None,
            event_type,
            price,
        }
    }

    #[test]
    fn test_validate_event_details() {
        let now = Utc::now();

        let mut past = details(EventType::Free, 0.0);
        past.starts_at = now - Duration::hours(1);
        assert!(validate_event_details(past, now).is_err());

        let mut backwards = details(EventType::Free, 0.0);
        backwards.ends_at = Some(backwards.starts_at - Duration::hours(1));
        assert!(validate_event_details(backwards, now).is_err());

        assert!(matches!(
            validate_event_details(details(EventType::Paid, 0.0), now),
            Err(Error::InvalidAmount { .. })
        ));

        let free = validate_event_details(details(EventType::Free, 25.0), now).unwrap();
        assert!(free.price.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_create_event_only_by_manager() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, member.id, club.id).await?;

        let denied = create_event(&db, member.id, club.id, details(EventType::Free, 0.0)).await;
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Authorization);

        let event = create_event(&db, owner.id, club.id, details(EventType::Paid, 15.0)).await?;
        assert_eq!(event.club_id, club.id);
        assert!(event.is_paid());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_club_events_sorted_and_filtered() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let soon = create_test_event(&db, owner.id, club.id, 0.0).await?;
        let mut later_details = details(EventType::Free, 0.0);
        later_details.starts_at = Utc::now() + Duration::days(30);
        let later = create_event(&db, owner.id, club.id, later_details).await?;
        let past = store::append(&db, |id| Event {
            id,
            starts_at: Utc::now() - Duration::days(2),
            ..soon.clone()
        })
        .await?;

        let all = list_club_events(&db, owner.id, club.id, EventFilter::All).await?;
        let ids: Vec<i64> = all.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![later.id, soon.id, past.id]);

        let upcoming = list_club_events(&db, owner.id, club.id, EventFilter::Upcoming).await?;
        assert_eq!(upcoming.len(), 2);
        let past_only = list_club_events(&db, owner.id, club.id, EventFilter::Past).await?;
        assert_eq!(past_only[0].id, past.id);

        let stranger = create_test_user(&db, "eve", Role::Member).await?;
        let denied = list_club_events(&db, stranger.id, club.id, EventFilter::All).await;
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Authorization);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_for_free_event() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, member.id, club.id).await?;
        let free = create_test_event(&db, owner.id, club.id, 0.0).await?;
        let paid = create_test_event(&db, owner.id, club.id, 20.0).await?;

        register_for_event(&db, member.id, free.id).await?;
        assert_eq!(list_attendees(&db, free.id).await?.len(), 1);
        assert_eq!(
            event_payment_status(&db, free.id, member.id).await?,
            PaymentState::Free
        );

        let twice = register_for_event(&db, member.id, free.id).await;
        assert_eq!(twice.unwrap_err().kind(), ErrorKind::Validation);

        let needs_payment = register_for_event(&db, member.id, paid.id).await;
        assert_eq!(needs_payment.unwrap_err().kind(), ErrorKind::Validation);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_member_cannot_register() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let stranger = create_test_user(&db, "eve", Role::Member).await?;
        let event = create_test_event(&db, owner.id, club.id, 0.0).await?;

        let denied = register_for_event(&db, stranger.id, event.id).await;
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Authorization);
        assert!(list_attendees(&db, event.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unregister_keeps_ledger_entry() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, member.id, club.id).await?;
        let event = create_test_event(&db, owner.id, club.id, 1000.0).await?;

        let (_, payment) = register_and_pay(&db, member.id, event.id).await?;
        assert_eq!(payment.kind, PaymentType::EventPayment);
        assert_eq!(payment.event_id, Some(event.id));
        assert!((club_balance(&db, club.id).await? - 1000.0).abs() < f64::EPSILON);
        assert_eq!(
            event_payment_status(&db, event.id, member.id).await?,
            PaymentState::Paid
        );

        assert!(unregister_from_event(&db, member.id, event.id).await?);
        assert!(list_attendees(&db, event.id).await?.is_empty());
        let markers: Vec<EventPayment> = store::read(&db).await?;
        assert!(markers.is_empty());
        assert!((club_balance(&db, club.id).await? - 1000.0).abs() < f64::EPSILON);

        assert!(!unregister_from_event(&db, member.id, event.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_after_event_becomes_paid() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, member.id, club.id).await?;
        let event = create_test_event(&db, owner.id, club.id, 0.0).await?;
        register_for_event(&db, member.id, event.id).await?;

        update_event(&db, owner.id, event.id, details(EventType::Paid, 40.0)).await?;
        assert_eq!(
            event_payment_status(&db, event.id, member.id).await?,
            PaymentState::Unpaid
        );

        pay_for_event(&db, member.id, event.id).await?;
        let again = pay_for_event(&db, member.id, event.id).await;
        assert!(matches!(again, Err(Error::AlreadyPaid { .. })));

        let payments: Vec<Payment> = store::read(&db).await?;
        assert_eq!(payments.len(), 1);
        assert!((club_balance(&db, club.id).await? - 40.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_owner_marks_attendee_paid_and_summary() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let ann = create_test_user(&db, "ann", Role::Member).await?;
        let bob = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, ann.id, club.id).await?;
        add_test_member(&db, bob.id, club.id).await?;
        let event = create_test_event(&db, owner.id, club.id, 0.0).await?;
        register_for_event(&db, ann.id, event.id).await?;
        register_for_event(&db, bob.id, event.id).await?;
        update_event(&db, owner.id, event.id, details(EventType::Paid, 25.0)).await?;

        let denied = mark_event_payment_paid(&db, bob.id, event.id, ann.id).await;
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Authorization);

        mark_event_payment_paid(&db, owner.id, event.id, ann.id).await?;

        let summary = event_payment_summary(&db, owner.id, club.id).await?;
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].attendee_count, 2);
        assert_eq!(summary[0].paid_count, 1);
        assert_eq!(summary[0].unpaid_count, 1);
        assert_eq!(summary[0].unpaid_user_ids, vec![bob.id]);
        assert!((summary[0].total_revenue - 25.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_register_and_pay_writes_nothing() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, member.id, club.id).await?;
        let free = create_test_event(&db, owner.id, club.id, 0.0).await?;

        let result = register_and_pay(&db, member.id, free.id).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
        assert!(list_attendees(&db, free.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_after_attendance_write_rolls_back() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, member.id, club.id).await?;
        let event = create_test_event(&db, owner.id, club.id, 25.0).await?;
        store::append(&db, |id| EventPayment {
            id,
            event_id: event.id,
            user_id: member.id,
            amount: event.price,
            paid_at: Utc::now(),
            status: EventPaymentStatus::Paid,
        })
        .await?;

        let result = register_and_pay(&db, member.id, event.id).await;
        assert!(matches!(result, Err(Error::AlreadyPaid { .. })));

        assert!(list_attendees(&db, event.id).await?.is_empty());
        let payments: Vec<Payment> = store::read(&db).await?;
        assert!(payments.is_empty());
        assert_eq!(store::read::<EventPayment, _>(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_event_cascades() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, member.id, club.id).await?;
        let event = create_test_event(&db, owner.id, club.id, 30.0).await?;
        register_and_pay(&db, member.id, event.id).await?;

        let report = delete_event(&db, owner.id, event.id).await?;
        assert_eq!(report.events, 1);
        assert_eq!(report.attendance, 1);
        assert_eq!(report.event_payments, 1);
        assert!(get_event_by_id(&db, event.id).await?.is_none());
        assert!(cascade::check_integrity(&db).await?.is_empty());
        let payments: Vec<Payment> = store::read(&db).await?;
        assert_eq!(payments[0].event_id, Some(event.id));
        assert!((club_balance(&db, club.id).await? - 30.0).abs() < f64::EPSILON);
        Ok(())
    }
}
