//! Club business logic - creating, editing, listing and deleting clubs.
//!
//! Deleting a club removes everything that depends on it in one transaction,
//! see [`cascade`](super::cascade).

use crate::{
    core::{access, cascade},
    errors::{Error, Result},
    models::{Club, User},
    store,
};
use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use tracing::{info, instrument};

fn validate_club_fields(name: &str, membership_fee: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Club name cannot be empty"));
    }
    if !membership_fee.is_finite() || membership_fee < 0.0 {
        return Err(Error::InvalidAmount {
            amount: membership_fee,
        });
    }
    Ok(())
}

/// Creates a club owned by the acting user.
///
/// # Errors
/// Returns an error if:
/// - The actor is neither admin nor organizer
/// - The name is empty or the fee is negative or not finite
#[instrument(skip(db, description))]
pub async fn create_club(
    db: &DatabaseConnection,
    actor_id: i64,
    name: &str,
    description: &str,
    membership_fee: f64,
) -> Result<Club> {
    let actor = access::load_actor(db, actor_id).await?;
    if !access::can_organize(&actor) {
        return Err(Error::unauthorized("create clubs"));
    }
    validate_club_fields(name, membership_fee)?;

    let club = store::append(db, |id| Club {
        id,
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        membership_fee,
        owner_id: actor.id,
        created_at: Utc::now(),
    })
    .await?;

    info!("Created club {} '{}'", club.id, club.name);
    Ok(club)
}

/// Replaces name, description and fee of a club. Owner or admin only.
#[instrument(skip(db, description))]
pub async fn update_club(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    name: &str,
    description: &str,
    membership_fee: f64,
) -> Result<Club> {
    access::require_manager(db, actor_id, club_id, "edit this club").await?;
    validate_club_fields(name, membership_fee)?;

    let mut clubs: Vec<Club> = store::read(db).await?;
    let club = clubs
        .iter_mut()
        .find(|c| c.id == club_id)
        .ok_or_else(|| Error::not_found("club", club_id))?;
    club.name = name.trim().to_string();
    club.description = description.trim().to_string();
    club.membership_fee = membership_fee;
    let updated = club.clone();

    store::write(db, &clubs).await?;
    info!("Updated club {}", club_id);
    Ok(updated)
}

/// Deletes a club and every record that references it or its events.
///
/// # Returns
/// Counts of the removed records per collection.
#[instrument(skip(db))]
pub async fn delete_club(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
) -> Result<cascade::CascadeReport> {
    let txn = db.begin().await?;

    access::require_manager(&txn, actor_id, club_id, "delete this club").await?;
    let report = cascade::cascade(&txn, |snapshot| {
        cascade::plan_club_deletion(snapshot, club_id)
    })
    .await?;

    txn.commit().await?;

    info!(
        "Deleted club {} with {} dependent records",
        club_id,
        report.total() - report.clubs
    );
    Ok(report)
}

/// Retrieves a club by id.
pub async fn get_club_by_id(db: &DatabaseConnection, club_id: i64) -> Result<Option<Club>> {
    store::find(db, club_id).await
}

/// Lists all clubs sorted by name, ignoring case.
pub async fn list_clubs(db: &DatabaseConnection) -> Result<Vec<Club>> {
    let mut clubs: Vec<Club> = store::read(db).await?;
    clubs.sort_by_key(|c| c.name.to_lowercase());
    Ok(clubs)
}

/// Clubs whose name or description contains `query`, ignoring case.
pub async fn search_clubs(db: &DatabaseConnection, query: &str) -> Result<Vec<Club>> {
    let needle = query.trim().to_lowercase();
    let clubs = list_clubs(db).await?;
    if needle.is_empty() {
        return Ok(clubs);
    }
    Ok(clubs
        .into_iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
        })
        .collect())
}

/// Clubs owned by a user.
pub async fn clubs_owned_by(db: &DatabaseConnection, user_id: i64) -> Result<Vec<Club>> {
    Ok(list_clubs(db)
        .await?
        .into_iter()
        .filter(|c| c.owner_id == user_id)
        .collect())
}

/// Resolves the owner account of a club.
pub async fn club_owner(db: &DatabaseConnection, club_id: i64) -> Result<User> {
    let club = store::require::<Club, _>(db, club_id).await?;
    store::require::<User, _>(db, club.owner_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::cascade::check_integrity;
    use crate::errors::ErrorKind;
    use crate::models::{Event, Membership, Payment, Role, Schedule};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_club_requires_organizer() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        let organizer = create_test_user(&db, "olga", Role::Organizer).await?;

        let denied = create_club(&db, member.id, "Chess", "", 0.0).await;
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Authorization);

        let club = create_club(&db, organizer.id, "  Chess ", "Board games", 250.0).await?;
        assert_eq!(club.id, 1);
        assert_eq!(club.name, "Chess");
        assert_eq!(club.owner_id, organizer.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_club_validates_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_user(&db, "root", Role::Admin).await?;

        let empty = create_club(&db, admin.id, "   ", "", 0.0).await;
        assert_eq!(empty.unwrap_err().kind(), ErrorKind::Validation);

        let negative = create_club(&db, admin.id, "Chess", "", -1.0).await;
        assert!(matches!(negative, Err(Error::InvalidAmount { .. })));

        let nan = create_club(&db, admin.id, "Chess", "", f64::NAN).await;
        assert!(matches!(nan, Err(Error::InvalidAmount { .. })));

        assert!(list_clubs(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_club_only_by_manager() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let stranger = create_test_user(&db, "eve", Role::Organizer).await?;

        let denied = update_club(&db, stranger.id, club.id, "Hacked", "", 0.0).await;
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Authorization);

        let updated = update_club(&db, owner.id, club.id, "Go", "Stones", 120.0).await?;
        assert_eq!(updated.name, "Go");
        assert!((updated.membership_fee - 120.0).abs() < f64::EPSILON);
        assert_eq!(get_club_by_id(&db, club.id).await?.unwrap().name, "Go");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_clubs_sorted_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_user(&db, "root", Role::Admin).await?;
        create_club(&db, admin.id, "chess", "", 0.0).await?;
        create_club(&db, admin.id, "Archery", "", 0.0).await?;
        create_club(&db, admin.id, "Bridge", "card game", 0.0).await?;

        let names: Vec<_> = list_clubs(&db).await?.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Archery", "Bridge", "chess"]);

        let found = search_clubs(&db, "CARD").await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bridge");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_club_leaves_no_orphans() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let other = create_test_club(&db, owner.id, "Other").await?;
        let member = create_test_user(&db, "bob", Role::Member).await?;
        add_test_member(&db, member.id, club.id).await?;
        add_test_member(&db, member.id, other.id).await?;
        let event = create_test_event(&db, owner.id, club.id, 100.0).await?;
        create_test_event(&db, owner.id, other.id, 0.0).await?;
        crate::core::event::register_and_pay(&db, member.id, event.id).await?;
        crate::core::schedule::add_schedule(&db, owner.id, club.id, 1, "18:30", 60, "").await?;

        let report = delete_club(&db, owner.id, club.id).await?;
        assert_eq!(report.clubs, 1);
        assert_eq!(report.events, 1);
        assert_eq!(report.attendance, 1);
        assert_eq!(report.event_payments, 1);
        assert_eq!(report.payments, 1);
        assert_eq!(report.memberships, 1);
        assert_eq!(report.schedules, 1);

        assert!(check_integrity(&db).await?.is_empty());
        assert!(get_club_by_id(&db, club.id).await?.is_none());

        let events: Vec<Event> = store::read(&db).await?;
        assert!(events.iter().all(|e| e.club_id == other.id));
        let memberships: Vec<Membership> = store::read(&db).await?;
        assert_eq!(memberships.len(), 1);
        let payments: Vec<Payment> = store::read(&db).await?;
        assert!(payments.is_empty());
        let schedules: Vec<Schedule> = store::read(&db).await?;
        assert!(schedules.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_club_denied_changes_nothing() -> Result<()> {
        let (db, _owner, club) = setup_with_club().await?;
        let stranger = create_test_user(&db, "eve", Role::Member).await?;

        let denied = delete_club(&db, stranger.id, club.id).await;
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Authorization);
        assert!(get_club_by_id(&db, club.id).await?.is_some());

        let missing = delete_club(&db, stranger.id, 99).await;
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_club_owner_resolves_user() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        assert_eq!(club_owner(&db, club.id).await?.id, owner.id);
        assert_eq!(clubs_owned_by(&db, owner.id).await?.len(), 1);
        Ok(())
    }
}
