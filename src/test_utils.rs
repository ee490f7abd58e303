//! Shared test utilities for the club ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::event::{self, EventDetails},
    errors::Result,
    models::{Club, Event, EventType, Membership, Role, User, password_hash},
    store,
};
use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user directly in the store, bypassing registration.
///
/// # Defaults
/// * email: `{name}@example.com`
/// * password: `password`
pub async fn create_test_user(db: &DatabaseConnection, name: &str, role: Role) -> Result<User> {
    store::append(db, |id| User {
        id,
        name: name.to_string(),
        email: format!("{name}@example.com"),
        password: password_hash("password"),
        role,
        created_at: Utc::now(),
    })
    .await
}

/// Creates a test club owned by `owner_id` with a membership fee of 300.
pub async fn create_test_club(db: &DatabaseConnection, owner_id: i64, name: &str) -> Result<Club> {
    store::append(db, |id| Club {
        id,
        name: name.to_string(),
        description: format!("{name} test club"),
        membership_fee: 300.0,
        owner_id,
        created_at: Utc::now(),
    })
    .await
}

/// Adds a membership without expiry.
pub async fn add_test_member(
    db: &DatabaseConnection,
    user_id: i64,
    club_id: i64,
) -> Result<Membership> {
    store::append(db, |id| Membership {
        id,
        user_id,
        club_id,
        joined_at: Utc::now(),
        expires_at: None,
    })
    .await
}

/// Creates an event starting in a week through the regular event operation.
///
/// A `price` of 0 makes a free event, anything else a paid one.
pub async fn create_test_event(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    price: f64,
) -> Result<Event> {
    let event_type = if price > 0.0 {
        EventType::Paid
    } else {
        EventType::Free
    };
    let details = EventDetails {
        title: "Test event".to_string(),
        description: String::new(),
        location: "Club house".to_string(),
        starts_at: Utc::now() + Duration::days(7),
        ends_at: None,
        event_type,
        price,
    };
    event::create_event(db, actor_id, club_id, details).await
}

/// Sets up a test database with an organizer and one club they own.
///
/// # Returns
/// Tuple of (database connection, owner, club)
pub async fn setup_with_club() -> Result<(DatabaseConnection, User, Club)> {
    let db = setup_test_db().await?;
    let owner = create_test_user(&db, "owner", Role::Organizer).await?;
    let club = create_test_club(&db, owner.id, "Chess").await?;
    Ok((db, owner, club))
}
