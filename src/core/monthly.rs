//! Monthly contribution business logic
//!
//! Generates one pending contribution per member for a club and calendar
//! month, and settles contributions into the club's income ledger. A month is
//! generated at most once per club: if any contribution already exists for the
//! club and month, the whole batch is skipped and nothing is written.

use crate::{
    core::access,
    errors::{Error, Result},
    models::{
        ContributionStatus, Membership, MonthlyContribution, Payment, PaymentType, User,
        month_key, validate_month,
    },
    store,
};
use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Contributions created by one generation run.
#[derive(Debug, Clone)]
pub struct ContributionBatch {
    /// Club the batch belongs to
    pub club_id: i64,
    /// `YYYY-MM`
    pub month: String,
    /// Amount owed per member
    pub amount: f64,
    /// Newly created pending rows, in membership order
    pub contributions: Vec<MonthlyContribution>,
}

/// Contribution state of one member for a month.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberContribution {
    /// Member
    pub user_id: i64,
    /// `None` if no contribution exists for the month
    pub status: Option<ContributionStatus>,
    /// Amount of the contribution, 0 without one
    pub amount: f64,
}

/// Contribution state of all members of a club for a month.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionOverview {
    /// `YYYY-MM`
    pub month: String,
    /// One entry per member
    pub members: Vec<MemberContribution>,
    /// Sum of paid contributions
    pub collected: f64,
    /// Sum of pending contributions
    pub outstanding: f64,
}

/// The current calendar month as `YYYY-MM`.
#[must_use]
pub fn current_month() -> String {
    month_key(Utc::now())
}

/// Creates a pending contribution for every member of the club.
///
/// The amount of each row is the club's membership fee.
///
/// # Arguments
/// * `db` - Database connection
/// * `actor_id` - Acting user, must manage the club
/// * `club_id` - Club to bill
/// * `month` - `YYYY-MM`
///
/// # Returns
/// * `Ok(Some(batch))` - Contributions were created
/// * `Ok(None)` - The month already has contributions for this club
///
/// # Errors
/// Returns [`Error::InvalidAmount`] for a club without a membership fee.
#[instrument(skip(db))]
pub async fn generate_monthly_contributions(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    month: &str,
) -> Result<Option<ContributionBatch>> {
    validate_month(month)?;

    let txn = db.begin().await?;

    let (_, club) =
        access::require_manager(&txn, actor_id, club_id, "generate contributions").await?;
    if club.membership_fee <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: club.membership_fee,
        });
    }

    let mut contributions: Vec<MonthlyContribution> = store::read(&txn).await?;
    if contributions
        .iter()
        .any(|c| c.club_id == club_id && c.month == month)
    {
        warn!(
            "Contributions for club {} and {} already exist, skipping",
            club_id, month
        );
        return Ok(None);
    }

    let memberships: Vec<Membership> = store::read(&txn).await?;
    let mut id = store::next_free_id::<MonthlyContribution, _>(&txn).await?;
    let mut created = Vec::new();
    for membership in memberships.iter().filter(|m| m.club_id == club_id) {
        created.push(MonthlyContribution {
            id,
            club_id,
            user_id: membership.user_id,
            amount: club.membership_fee,
            month: month.to_string(),
            paid_at: None,
            status: ContributionStatus::Pending,
        });
        id += 1;
    }

    contributions.extend(created.iter().cloned());
    store::write(&txn, &contributions).await?;
    txn.commit().await?;

    info!(
        "Generated {} contributions of {:.2} for club {} in {}",
        created.len(),
        club.membership_fee,
        club_id,
        month
    );

    Ok(Some(ContributionBatch {
        club_id,
        month: month.to_string(),
        amount: club.membership_fee,
        contributions: created,
    }))
}

/// Settles a member's contribution for a month and books the income.
///
/// A pending row flips to paid. Without a row for the month, one is created
/// directly as paid with the club's membership fee, which requires the user
/// to be a member of the club.
///
/// # Errors
/// Returns [`Error::AlreadyPaid`] if the contribution is already settled and
/// [`Error::InvalidAmount`] if its amount is not positive. A user with no row
/// for the month who is not a member is a validation error. Nothing is
/// written in any of these cases.
#[instrument(skip(db))]
pub async fn mark_contribution_paid(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    user_id: i64,
    month: &str,
) -> Result<(MonthlyContribution, Payment)> {
    validate_month(month)?;

    let txn = db.begin().await?;

    let (_, club) =
        access::require_manager(&txn, actor_id, club_id, "record contributions").await?;
    store::require::<User, _>(&txn, user_id).await?;

    let paid_at = Utc::now();
    let mut contributions: Vec<MonthlyContribution> = store::read(&txn).await?;
    let existing = contributions
        .iter_mut()
        .find(|c| c.club_id == club_id && c.user_id == user_id && c.month == month);

    let contribution = match existing {
        Some(c) if c.status == ContributionStatus::Paid => {
            return Err(Error::AlreadyPaid { user_id });
        }
        Some(c) => {
            c.status = ContributionStatus::Paid;
            c.paid_at = Some(paid_at);
            c.clone()
        }
        None => {
            let memberships: Vec<Membership> = store::read(&txn).await?;
            if !access::is_member(&memberships, user_id, club_id) {
                return Err(Error::validation(format!(
                    "User {user_id} is not a member of club {club_id}"
                )));
            }
            let c = MonthlyContribution {
                id: store::next_free_id::<MonthlyContribution, _>(&txn).await?,
                club_id,
                user_id,
                amount: club.membership_fee,
                month: month.to_string(),
                paid_at: Some(paid_at),
                status: ContributionStatus::Paid,
            };
            contributions.push(c.clone());
            c
        }
    };
    if contribution.amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: contribution.amount,
        });
    }
    store::write(&txn, &contributions).await?;

    let payment = store::append(&txn, |id| Payment {
        id,
        club_id,
        user_id: Some(user_id),
        amount: contribution.amount,
        paid_at,
        kind: PaymentType::MonthlyContribution,
        event_id: None,
        month: Some(month.to_string()),
        description: None,
    })
    .await?;

    txn.commit().await?;

    info!(
        "User {} paid {:.2} for {} in club {}",
        user_id, contribution.amount, month, club_id
    );
    Ok((contribution, payment))
}

/// Contributions of a club, optionally limited to one month.
pub async fn list_contributions(
    db: &DatabaseConnection,
    club_id: i64,
    month: Option<&str>,
) -> Result<Vec<MonthlyContribution>> {
    Ok(store::read::<MonthlyContribution, _>(db)
        .await?
        .into_iter()
        .filter(|c| c.club_id == club_id && month.is_none_or(|m| c.month == m))
        .collect())
}

/// Paid, pending or missing contribution of every member for a month.
/// Owner or admin only.
pub async fn contribution_overview(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    month: &str,
) -> Result<ContributionOverview> {
    validate_month(month)?;
    access::require_manager(db, actor_id, club_id, "view contributions").await?;

    let memberships: Vec<Membership> = store::read(db).await?;
    let contributions = list_contributions(db, club_id, Some(month)).await?;

    let members: Vec<MemberContribution> = memberships
        .iter()
        .filter(|m| m.club_id == club_id)
        .map(|m| {
            let row = contributions.iter().find(|c| c.user_id == m.user_id);
            MemberContribution {
                user_id: m.user_id,
                status: row.map(|c| c.status),
                amount: row.map_or(0.0, |c| c.amount),
            }
        })
        .collect();

    let sum_with = |status: ContributionStatus| {
        contributions
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.amount)
            .sum::<f64>()
    };

    Ok(ContributionOverview {
        month: month.to_string(),
        members,
        collected: sum_with(ContributionStatus::Paid),
        outstanding: sum_with(ContributionStatus::Pending),
    })
}

/// Formats a contribution batch into a human-readable summary string.
#[must_use]
pub fn format_contribution_summary(batch: &ContributionBatch) -> String {
    use std::fmt::Write;

    let mut summary = format!(
        "Monthly Contributions - {} - Club {} - {} members at {:.2}\n",
        batch.month,
        batch.club_id,
        batch.contributions.len(),
        batch.amount
    );

    for contribution in &batch.contributions {
        // Writing to a String cannot fail
        let _ = writeln!(
            summary,
            "  User {} | {:.2} | pending",
            contribution.user_id, contribution.amount
        );
    }

    summary
}
