//! Money records: income payments, expenses and monthly contributions.
//!
//! The income side (`Payment`) is append-only; only cascade deletes remove
//! rows. Contribution rows carry the one mutable projection, `pending → paid`.

use super::{Collection, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Source of an income payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Attendee paid for a paid event
    EventPayment,
    /// Member paid a monthly contribution
    MonthlyContribution,
    /// Income entered by hand
    ManualIncome,
}

/// One income entry of a club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Unique identifier
    pub id: i64,
    /// Receiving club
    pub club_id: i64,
    /// Payer, absent for anonymous manual income
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Always positive
    pub amount: f64,
    /// Payment time
    pub paid_at: DateTime<Utc>,
    /// Income source
    #[serde(rename = "type")]
    pub kind: PaymentType,
    /// Related event for event payments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
    /// Related `YYYY-MM` month for contributions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    /// Free-form note for manual income
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record for Payment {
    const COLLECTION: Collection = Collection::Payments;
    const ENTITY: &'static str = "payment";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Kind of a finance entry. Only expenses are recorded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceType {
    /// Money spent by the club
    Expense,
}

/// One expense entry of a club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finance {
    /// Unique identifier
    pub id: i64,
    /// Spending club
    pub club_id: i64,
    /// Always `expense`
    #[serde(rename = "type")]
    pub kind: FinanceType,
    /// What the money was spent on
    pub description: String,
    /// Always positive
    pub amount: f64,
    /// Date of the expense
    pub date: DateTime<Utc>,
}

impl Record for Finance {
    const COLLECTION: Collection = Collection::Finances;
    const ENTITY: &'static str = "expense";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Status of a monthly contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
    /// Created by batch generation, not yet paid
    Pending,
    /// Settled; a matching `Payment` exists
    Paid,
}

/// A member's due for one club and calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyContribution {
    /// Unique identifier
    pub id: i64,
    /// Club
    pub club_id: i64,
    /// Member
    pub user_id: i64,
    /// Amount owed
    pub amount: f64,
    /// `YYYY-MM`
    pub month: String,
    /// Set once paid, `None` while pending
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    /// Pending or paid
    pub status: ContributionStatus,
}

impl Record for MonthlyContribution {
    const COLLECTION: Collection = Collection::MonthlyContributions;
    const ENTITY: &'static str = "contribution";

    fn id(&self) -> i64 {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}:{}", self.club_id, self.user_id, self.month))
    }
}

/// Calendar month of a timestamp as `YYYY-MM`.
#[must_use]
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Checks that `month` is a valid `YYYY-MM` string.
pub fn validate_month(month: &str) -> Result<NaiveDate> {
    if month.len() != 7 {
        return Err(Error::validation(format!("month must be YYYY-MM: {month}")));
    }
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("month must be YYYY-MM: {month}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_key_formats_year_and_month() {
        let at = Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 0).unwrap();
        assert_eq!(month_key(at), "2024-06");
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month("2024-06").is_ok());
        assert!(validate_month("2024-13").is_err());
        assert!(validate_month("2024-6").is_err());
        assert!(validate_month("june").is_err());
    }

    #[test]
    fn test_payment_type_serialized_as_type_field() {
        let payment = Payment {
            id: 1,
            club_id: 2,
            user_id: None,
            amount: 50.0,
            paid_at: Utc::now(),
            kind: PaymentType::ManualIncome,
            event_id: None,
            month: None,
            description: Some("Sponsor".to_string()),
        };
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["type"], "manual_income");
        assert!(json.get("eventId").is_none());
    }
}
