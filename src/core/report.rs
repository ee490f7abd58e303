//! Report generation business logic.
//!
//! Application-wide statistics and the flattened per-club ledger used for
//! tabular export. All functions return structured data; formatting for
//! display is limited to the small helpers at the bottom.

use crate::{
    core::{access, cascade::Snapshot},
    errors::{Error, Result},
    models::{Finance, FinanceType, Payment, User, month_key},
    store,
};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::{collections::BTreeMap, fmt, str::FromStr};
use tracing::instrument;

/// Owner label used when a club's owner no longer exists.
const UNKNOWN_NAME: &str = "Unknown";

/// Application-wide statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplicationStats {
    /// Number of clubs
    pub total_clubs: usize,
    /// Number of users
    pub total_users: usize,
    /// Number of events
    pub total_events: usize,
    /// Number of memberships
    pub total_memberships: usize,
    /// Sum of all payments
    pub total_income: f64,
    /// Sum of all expenses
    pub total_expenses: f64,
    /// Income minus expenses
    pub total_balance: f64,
    /// Income divided by the number of clubs, 0 without clubs
    pub average_income_per_club: f64,
    /// Name of the club with the most events; the earliest club wins ties
    pub most_active_club: Option<String>,
    /// Owner name and number of owned clubs, in order of first club
    pub clubs_by_owner: Vec<(String, usize)>,
    /// Events per `YYYY-MM` of their start
    pub events_by_month: BTreeMap<String, usize>,
    /// Income per `YYYY-MM` of the payment
    pub income_by_month: BTreeMap<String, f64>,
}

/// Computes the statistics from users and a store snapshot.
#[must_use]
pub fn compute_application_stats(users: &[User], snapshot: &Snapshot) -> ApplicationStats {
    let total_income: f64 = snapshot.payments.iter().map(|p| p.amount).sum();
    let total_expenses: f64 = snapshot
        .finances
        .iter()
        .filter(|f| f.kind == FinanceType::Expense)
        .map(|f| f.amount)
        .sum();

    let mut most_active: Option<(&str, usize)> = None;
    let mut clubs_by_owner: Vec<(String, usize)> = Vec::new();
    for club in &snapshot.clubs {
        let event_count = snapshot
            .events
            .iter()
            .filter(|e| e.club_id == club.id)
            .count();
        if most_active.is_none_or(|(_, max)| event_count > max) {
            most_active = Some((club.name.as_str(), event_count));
        }

        let owner = users
            .iter()
            .find(|u| u.id == club.owner_id)
            .map_or(UNKNOWN_NAME, |u| u.name.as_str());
        match clubs_by_owner.iter_mut().find(|(name, _)| name == owner) {
            Some((_, count)) => *count += 1,
            None => clubs_by_owner.push((owner.to_string(), 1)),
        }
    }

    let mut events_by_month = BTreeMap::new();
    for event in &snapshot.events {
        *events_by_month.entry(month_key(event.starts_at)).or_insert(0) += 1;
    }
    let mut income_by_month = BTreeMap::new();
    for payment in &snapshot.payments {
        *income_by_month.entry(month_key(payment.paid_at)).or_insert(0.0) += payment.amount;
    }

    let total_clubs = snapshot.clubs.len();
    #[allow(clippy::cast_precision_loss)]
    let average_income_per_club = if total_clubs > 0 {
        total_income / total_clubs as f64
    } else {
        0.0
    };

    ApplicationStats {
        total_clubs,
        total_users: users.len(),
        total_events: snapshot.events.len(),
        total_memberships: snapshot.memberships.len(),
        total_income,
        total_expenses,
        total_balance: total_income - total_expenses,
        average_income_per_club,
        most_active_club: most_active.map(|(name, _)| name.to_string()),
        clubs_by_owner,
        events_by_month,
        income_by_month,
    }
}

/// Loads the application statistics without an access check.
///
/// Used at startup; interactive callers go through [`application_stats`].
pub async fn load_application_stats(db: &DatabaseConnection) -> Result<ApplicationStats> {
    let users: Vec<User> = store::read(db).await?;
    let snapshot = Snapshot::load(db).await?;
    Ok(compute_application_stats(&users, &snapshot))
}

/// Application statistics. Admin only.
#[instrument(skip(db))]
pub async fn application_stats(db: &DatabaseConnection, actor_id: i64) -> Result<ApplicationStats> {
    access::require_admin(db, actor_id, "view statistics").await?;
    load_application_stats(db).await
}

/// Time window of a ledger export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportPeriod {
    /// Every entry
    #[default]
    All,
    /// Since the first day of the current month
    Month,
    /// Since the first day of the current quarter
    Quarter,
    /// Since January 1st of the current year
    Year,
}

impl ExportPeriod {
    /// First instant covered by the period, `None` for [`ExportPeriod::All`].
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let month = match self {
            Self::All => return None,
            Self::Month => now.month(),
            Self::Quarter => (now.month0() / 3) * 3 + 1,
            Self::Year => 1,
        };
        Utc.with_ymd_and_hms(now.year(), month, 1, 0, 0, 0).single()
    }
}

impl FromStr for ExportPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(Error::validation(format!("unknown export period: {other}"))),
        }
    }
}

/// Side of the ledger an export row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCategory {
    /// A payment
    Income,
    /// An expense
    Expense,
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Income => "income",
            Self::Expense => "expense",
        })
    }
}

/// One row of a ledger export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    /// Income or expense
    pub category: EntryCategory,
    /// What the entry is about
    pub description: String,
    /// Positive for income, negative for expenses
    pub amount: f64,
    /// When the money moved
    pub date: DateTime<Utc>,
    /// `paid` for income, `posted` for expenses
    pub status: &'static str,
}

/// Flattens a club's ledger into export rows, income first.
///
/// An income row uses the payment's own description when it has one and
/// names the payer otherwise.
#[must_use]
pub fn build_export_rows(
    users: &[User],
    payments: &[Payment],
    finances: &[Finance],
    club_id: i64,
    since: Option<DateTime<Utc>>,
) -> Vec<ExportRow> {
    let in_period = |at: DateTime<Utc>| since.is_none_or(|start| at >= start);

    let income = payments
        .iter()
        .filter(|p| p.club_id == club_id && in_period(p.paid_at))
        .map(|p| {
            let description = p.description.clone().unwrap_or_else(|| {
                let payer = p
                    .user_id
                    .and_then(|id| users.iter().find(|u| u.id == id))
                    .map_or(UNKNOWN_NAME, |u| u.name.as_str());
                format!("Payment from {payer}")
            });
            ExportRow {
                category: EntryCategory::Income,
                description,
                amount: p.amount,
                date: p.paid_at,
                status: "paid",
            }
        });

    let expenses = finances
        .iter()
        .filter(|f| {
            f.club_id == club_id && f.kind == FinanceType::Expense && in_period(f.date)
        })
        .map(|f| ExportRow {
            category: EntryCategory::Expense,
            description: f.description.clone(),
            amount: -f.amount,
            date: f.date,
            status: "posted",
        });

    income.chain(expenses).collect()
}

/// Ledger rows of a club for the given period. Owner or admin only.
#[instrument(skip(db))]
pub async fn export_club_ledger(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    period: ExportPeriod,
) -> Result<Vec<ExportRow>> {
    access::require_manager(db, actor_id, club_id, "export club finances").await?;

    let users: Vec<User> = store::read(db).await?;
    let payments: Vec<Payment> = store::read(db).await?;
    let finances: Vec<Finance> = store::read(db).await?;
    let since = period.start(Utc::now());
    Ok(build_export_rows(&users, &payments, &finances, club_id, since))
}

/// Formats an amount with its sign, e.g. `+50.00` or `-25.50`.
#[must_use]
pub fn format_signed_amount(amount: f64) -> String {
    if amount >= 0.0 {
        format!("+{amount:.2}")
    } else {
        format!("-{:.2}", amount.abs())
    }
}

/// Formats the statistics into a human-readable multi-line summary.
#[must_use]
pub fn format_stats_summary(stats: &ApplicationStats) -> String {
    format!(
        "Clubs: {} | Users: {} | Events: {} | Memberships: {}\n\
         Income: {:.2} | Expenses: {:.2} | Balance: {}\n\
         Average income per club: {:.2} | Most active club: {}",
        stats.total_clubs,
        stats.total_users,
        stats.total_events,
        stats.total_memberships,
        stats.total_income,
        stats.total_expenses,
        format_signed_amount(stats.total_balance),
        stats.average_income_per_club,
        stats.most_active_club.as_deref().unwrap_or("none"),
    )
}
