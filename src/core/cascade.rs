//! Cascade deletion of clubs and events.
//!
//! A deletion is computed in two steps. First every dependent collection is
//! read once into a [`Snapshot`] and the ids to remove are derived from that
//! pre-deletion state. Then the filtered collections are written back inside
//! the caller's transaction, so either every removal lands or none does.

use crate::{
    errors::Result,
    models::{
        Attendance, Club, Event, EventPayment, Finance, Membership, MonthlyContribution, Payment,
        Schedule,
    },
    store,
};
use sea_orm::ConnectionTrait;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Every collection that can hold a reference to a club or an event.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Clubs
    pub clubs: Vec<Club>,
    /// Events
    pub events: Vec<Event>,
    /// Event registrations
    pub attendance: Vec<Attendance>,
    /// Weekly schedules
    pub schedules: Vec<Schedule>,
    /// Memberships
    pub memberships: Vec<Membership>,
    /// Expenses
    pub finances: Vec<Finance>,
    /// Income ledger
    pub payments: Vec<Payment>,
    /// Event payment markers
    pub event_payments: Vec<EventPayment>,
    /// Monthly contributions
    pub contributions: Vec<MonthlyContribution>,
}

impl Snapshot {
    /// Reads all dependent collections.
    pub async fn load<C>(conn: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        Ok(Self {
            clubs: store::read(conn).await?,
            events: store::read(conn).await?,
            attendance: store::read(conn).await?,
            schedules: store::read(conn).await?,
            memberships: store::read(conn).await?,
            finances: store::read(conn).await?,
            payments: store::read(conn).await?,
            event_payments: store::read(conn).await?,
            contributions: store::read(conn).await?,
        })
    }

    /// Writes every collection back.
    pub async fn save<C>(&self, conn: &C) -> Result<()>
    where
        C: ConnectionTrait,
    {
        store::write(conn, &self.clubs).await?;
        store::write(conn, &self.events).await?;
        store::write(conn, &self.attendance).await?;
        store::write(conn, &self.schedules).await?;
        store::write(conn, &self.memberships).await?;
        store::write(conn, &self.finances).await?;
        store::write(conn, &self.payments).await?;
        store::write(conn, &self.event_payments).await?;
        store::write(conn, &self.contributions).await?;
        Ok(())
    }

    /// Describes every record whose club or event reference points nowhere.
    ///
    /// A payment's `event_id` is not checked. Income entries outlive the event
    /// they paid for, so only their club reference counts.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<String> {
        let club_ids: HashSet<i64> = self.clubs.iter().map(|c| c.id).collect();
        let event_ids: HashSet<i64> = self.events.iter().map(|e| e.id).collect();
        let mut dangling = Vec::new();

        let mut check_club = |kind: &str, id: i64, club_id: i64| {
            if !club_ids.contains(&club_id) {
                dangling.push(format!("{kind} {id} -> club {club_id}"));
            }
        };
        for e in &self.events {
            check_club("event", e.id, e.club_id);
        }
        for s in &self.schedules {
            check_club("schedule", s.id, s.club_id);
        }
        for m in &self.memberships {
            check_club("membership", m.id, m.club_id);
        }
        for f in &self.finances {
            check_club("expense", f.id, f.club_id);
        }
        for p in &self.payments {
            check_club("payment", p.id, p.club_id);
        }
        for c in &self.contributions {
            check_club("contribution", c.id, c.club_id);
        }

        for a in &self.attendance {
            if !event_ids.contains(&a.event_id) {
                dangling.push(format!("attendance {} -> event {}", a.id, a.event_id));
            }
        }
        for p in &self.event_payments {
            if !event_ids.contains(&p.event_id) {
                dangling.push(format!("event payment {} -> event {}", p.id, p.event_id));
            }
        }

        dangling
    }
}

/// Number of records removed per collection by one cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Clubs removed
    pub clubs: usize,
    /// Events removed
    pub events: usize,
    /// Registrations removed
    pub attendance: usize,
    /// Schedules removed
    pub schedules: usize,
    /// Memberships removed
    pub memberships: usize,
    /// Expenses removed
    pub finances: usize,
    /// Income entries removed
    pub payments: usize,
    /// Event payment markers removed
    pub event_payments: usize,
    /// Contributions removed
    pub contributions: usize,
}

impl CascadeReport {
    /// Total records removed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.clubs
            + self.events
            + self.attendance
            + self.schedules
            + self.memberships
            + self.finances
            + self.payments
            + self.event_payments
            + self.contributions
    }
}

fn remove_where<T>(items: &mut Vec<T>, doomed: impl Fn(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(|item| !doomed(item));
    before - items.len()
}

/// Removes a club and everything that references it or its events.
///
/// The set of doomed event ids is taken from the snapshot before any
/// collection is filtered.
#[must_use]
pub fn plan_club_deletion(mut snapshot: Snapshot, club_id: i64) -> (Snapshot, CascadeReport) {
    let event_ids: HashSet<i64> = snapshot
        .events
        .iter()
        .filter(|e| e.club_id == club_id)
        .map(|e| e.id)
        .collect();

    let report = CascadeReport {
        clubs: remove_where(&mut snapshot.clubs, |c| c.id == club_id),
        events: remove_where(&mut snapshot.events, |e| event_ids.contains(&e.id)),
        attendance: remove_where(&mut snapshot.attendance, |a| event_ids.contains(&a.event_id)),
        schedules: remove_where(&mut snapshot.schedules, |s| s.club_id == club_id),
        memberships: remove_where(&mut snapshot.memberships, |m| m.club_id == club_id),
        finances: remove_where(&mut snapshot.finances, |f| f.club_id == club_id),
        payments: remove_where(&mut snapshot.payments, |p| p.club_id == club_id),
        event_payments: remove_where(&mut snapshot.event_payments, |p| {
            event_ids.contains(&p.event_id)
        }),
        contributions: remove_where(&mut snapshot.contributions, |c| c.club_id == club_id),
    };

    (snapshot, report)
}

/// Removes an event with its registrations and payment markers.
///
/// Income already booked for the event stays in the club ledger.
#[must_use]
pub fn plan_event_deletion(mut snapshot: Snapshot, event_id: i64) -> (Snapshot, CascadeReport) {
    let report = CascadeReport {
        events: remove_where(&mut snapshot.events, |e| e.id == event_id),
        attendance: remove_where(&mut snapshot.attendance, |a| a.event_id == event_id),
        event_payments: remove_where(&mut snapshot.event_payments, |p| p.event_id == event_id),
        ..CascadeReport::default()
    };

    (snapshot, report)
}

/// Loads a snapshot, applies `plan`, and writes the result on `conn`.
#[instrument(skip(conn, plan))]
pub(crate) async fn cascade<C, F>(conn: &C, plan: F) -> Result<CascadeReport>
where
    C: ConnectionTrait,
    F: FnOnce(Snapshot) -> (Snapshot, CascadeReport),
{
    let snapshot = Snapshot::load(conn).await?;
    let (remaining, report) = plan(snapshot);
    remaining.save(conn).await?;
    debug!("Cascade removed {} records", report.total());
    Ok(report)
}

/// Reports dangling club/event references across the whole store.
pub async fn check_integrity<C>(conn: &C) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    Ok(Snapshot::load(conn).await?.dangling_references())
}
