//! Club finances - income and expense entries, balances and statistics.
//!
//! The balance is never stored. It is derived on every call as the sum of
//! the club's payments minus the sum of its expenses, and may be negative.

use crate::{
    core::access,
    errors::{Error, Result},
    models::{Finance, FinanceType, Payment, PaymentType, User, month_key},
    store,
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Income of one payer within a club.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributorTotal {
    /// Payer, `None` for anonymous manual income
    pub user_id: Option<i64>,
    /// Sum of the payer's payments
    pub total_amount: f64,
    /// Number of payments
    pub payment_count: usize,
    /// Most recent payment
    pub last_payment: DateTime<Utc>,
}

/// Financial overview of one club.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClubFinancialStats {
    /// Sum of all payments
    pub total_income: f64,
    /// Sum of all expenses
    pub total_expenses: f64,
    /// Income minus expenses
    pub balance: f64,
    /// Per-payer totals in order of first payment
    pub contributors: Vec<ContributorTotal>,
    /// Income per `YYYY-MM`
    pub income_by_month: BTreeMap<String, f64>,
    /// Expenses per `YYYY-MM`
    pub expenses_by_month: BTreeMap<String, f64>,
    /// Mean payment amount, 0 without payments
    pub average_payment: f64,
    /// Number of payments
    pub payment_count: usize,
    /// Number of expenses
    pub expense_count: usize,
}

fn require_positive(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Balance of a club from raw ledger entries.
#[must_use]
pub fn balance_of(payments: &[Payment], finances: &[Finance], club_id: i64) -> f64 {
    let income: f64 = payments
        .iter()
        .filter(|p| p.club_id == club_id)
        .map(|p| p.amount)
        .sum();
    let expenses: f64 = finances
        .iter()
        .filter(|f| f.club_id == club_id && f.kind == FinanceType::Expense)
        .map(|f| f.amount)
        .sum();
    income - expenses
}

/// Current balance of a club.
pub async fn club_balance(db: &DatabaseConnection, club_id: i64) -> Result<f64> {
    let payments: Vec<Payment> = store::read(db).await?;
    let finances: Vec<Finance> = store::read(db).await?;
    Ok(balance_of(&payments, &finances, club_id))
}

/// Books manual income for a club. Owner or admin only.
///
/// `payer_id` may be left empty for income without a specific payer.
#[instrument(skip(db, description))]
pub async fn add_income(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    amount: f64,
    payer_id: Option<i64>,
    description: Option<&str>,
) -> Result<Payment> {
    access::require_manager(db, actor_id, club_id, "manage club finances").await?;
    require_positive(amount)?;
    if let Some(payer_id) = payer_id {
        store::require::<User, _>(db, payer_id).await?;
    }

    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(ToString::to_string);
    let payment = store::append(db, |id| Payment {
        id,
        club_id,
        user_id: payer_id,
        amount,
        paid_at: Utc::now(),
        kind: PaymentType::ManualIncome,
        event_id: None,
        month: None,
        description,
    })
    .await?;

    info!("Booked income {:.2} for club {}", amount, club_id);
    Ok(payment)
}

/// Books an expense for a club. Owner or admin only.
#[instrument(skip(db, description))]
pub async fn add_expense(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    description: &str,
    amount: f64,
    date: DateTime<Utc>,
) -> Result<Finance> {
    access::require_manager(db, actor_id, club_id, "manage club finances").await?;
    let description = description.trim();
    if description.is_empty() {
        return Err(Error::validation("Expense description cannot be empty"));
    }
    require_positive(amount)?;

    let expense = store::append(db, |id| Finance {
        id,
        club_id,
        kind: FinanceType::Expense,
        description: description.to_string(),
        amount,
        date,
    })
    .await?;

    info!("Booked expense {:.2} for club {}", amount, club_id);
    Ok(expense)
}

/// Income entries of a club in ledger order.
pub async fn list_payments(db: &DatabaseConnection, club_id: i64) -> Result<Vec<Payment>> {
    Ok(store::read::<Payment, _>(db)
        .await?
        .into_iter()
        .filter(|p| p.club_id == club_id)
        .collect())
}

/// Expense entries of a club in ledger order.
pub async fn list_expenses(db: &DatabaseConnection, club_id: i64) -> Result<Vec<Finance>> {
    Ok(store::read::<Finance, _>(db)
        .await?
        .into_iter()
        .filter(|f| f.club_id == club_id && f.kind == FinanceType::Expense)
        .collect())
}

/// Computes the financial overview of a club from its ledger entries.
#[must_use]
pub fn compute_club_stats(payments: &[Payment], finances: &[Finance]) -> ClubFinancialStats {
    let mut stats = ClubFinancialStats::default();

    for payment in payments {
        stats.total_income += payment.amount;
        *stats
            .income_by_month
            .entry(month_key(payment.paid_at))
            .or_insert(0.0) += payment.amount;

        match stats
            .contributors
            .iter_mut()
            .find(|c| c.user_id == payment.user_id)
        {
            Some(contributor) => {
                contributor.total_amount += payment.amount;
                contributor.payment_count += 1;
                contributor.last_payment = contributor.last_payment.max(payment.paid_at);
            }
            None => stats.contributors.push(ContributorTotal {
                user_id: payment.user_id,
                total_amount: payment.amount,
                payment_count: 1,
                last_payment: payment.paid_at,
            }),
        }
    }

    for expense in finances.iter().filter(|f| f.kind == FinanceType::Expense) {
        stats.total_expenses += expense.amount;
        stats.expense_count += 1;
        *stats
            .expenses_by_month
            .entry(month_key(expense.date))
            .or_insert(0.0) += expense.amount;
    }

    stats.payment_count = payments.len();
    stats.balance = stats.total_income - stats.total_expenses;
    if stats.payment_count > 0 {
        #[allow(clippy::cast_precision_loss)]
        let count = stats.payment_count as f64;
        stats.average_payment = stats.total_income / count;
    }
    stats
}

/// Financial overview of a club. Owner or admin only.
pub async fn club_financial_stats(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
) -> Result<ClubFinancialStats> {
    access::require_manager(db, actor_id, club_id, "view club finances").await?;
    let payments = list_payments(db, club_id).await?;
    let expenses = list_expenses(db, club_id).await?;
    Ok(compute_club_stats(&payments, &expenses))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::ErrorKind;
    use crate::models::Role;
    use crate::test_utils::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_balance_follows_income_and_expenses() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        assert!(club_balance(&db, club.id).await?.abs() < f64::EPSILON);

        add_income(&db, owner.id, club.id, 50.0, None, Some("Sponsor")).await?;
        assert!((club_balance(&db, club.id).await? - 50.0).abs() < f64::EPSILON);

        add_expense(&db, owner.id, club.id, "Hall rent", 100.0, Utc::now()).await?;
        assert!((club_balance(&db, club.id).await? + 50.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amounts() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;

        let zero = add_income(&db, owner.id, club.id, 0.0, None, None).await;
        assert!(matches!(zero, Err(Error::InvalidAmount { .. })));
        let negative = add_expense(&db, owner.id, club.id, "Rent", -5.0, Utc::now()).await;
        assert!(matches!(negative, Err(Error::InvalidAmount { .. })));
        let blank = add_expense(&db, owner.id, club.id, "  ", 5.0, Utc::now()).await;
        assert_eq!(blank.unwrap_err().kind(), ErrorKind::Validation);

        assert!(list_payments(&db, club.id).await?.is_empty());
        assert!(list_expenses(&db, club.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_only_manager_books_entries() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, member.id, club.id).await?;

        let denied = add_income(&db, member.id, club.id, 10.0, None, None).await;
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Authorization);
        let unknown_payer = add_income(&db, owner.id, club.id, 10.0, Some(99), None).await;
        assert_eq!(unknown_payer.unwrap_err().kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_club_financial_stats() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_income(&db, owner.id, club.id, 30.0, Some(member.id), None).await?;
        add_income(&db, owner.id, club.id, 10.0, Some(member.id), None).await?;
        add_income(&db, owner.id, club.id, 20.0, None, Some("Donation")).await?;
        let june = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        add_expense(&db, owner.id, club.id, "Chairs", 45.0, june).await?;

        let stats = club_financial_stats(&db, owner.id, club.id).await?;
        assert!((stats.total_income - 60.0).abs() < f64::EPSILON);
        assert!((stats.total_expenses - 45.0).abs() < f64::EPSILON);
        assert!((stats.balance - 15.0).abs() < f64::EPSILON);
        assert!((stats.average_payment - 20.0).abs() < f64::EPSILON);
        assert_eq!(stats.payment_count, 3);
        assert_eq!(stats.expense_count, 1);
        assert_eq!(stats.contributors.len(), 2);
        assert_eq!(stats.contributors[0].user_id, Some(member.id));
        assert_eq!(stats.contributors[0].payment_count, 2);
        assert!((stats.contributors[0].total_amount - 40.0).abs() < f64::EPSILON);
        assert_eq!(stats.contributors[1].user_id, None);
        assert!((stats.expenses_by_month["2024-06"] - 45.0).abs() < f64::EPSILON);
        assert!((stats.income_by_month[&month_key(Utc::now())] - 60.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_balance_of_ignores_other_clubs() {
        let payment = |club_id, amount| Payment {
            id: club_id,
            club_id,
            user_id: None,
            amount,
            paid_at: Utc::now(),
            kind: PaymentType::ManualIncome,
            event_id: None,
            month: None,
            description: None,
        };
        let payments = vec![payment(1, 70.0), payment(2, 500.0)];
        assert!((balance_of(&payments, &[], 1) - 70.0).abs() < f64::EPSILON);
        assert!(balance_of(&payments, &[], 3).abs() < f64::EPSILON);
    }
}
