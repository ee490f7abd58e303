//! Membership business logic - joining, leaving and managing club members.

use crate::{
    core::access,
    errors::{Error, Result},
    models::{Club, Membership, MembershipStatus, User},
    store,
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use tracing::{info, instrument};

/// A club member with the derived status of the membership.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    /// Member account
    pub user: User,
    /// Membership row
    pub membership: Membership,
    /// Status at the time of listing
    pub status: MembershipStatus,
}

/// Membership status of a (user, club) pair at `now`.
#[must_use]
pub fn membership_status_at(
    memberships: &[Membership],
    user_id: i64,
    club_id: i64,
    now: DateTime<Utc>,
) -> MembershipStatus {
    memberships
        .iter()
        .find(|m| m.user_id == user_id && m.club_id == club_id)
        .map_or(MembershipStatus::NotMember, |m| m.status_at(now))
}

/// Current membership status of a user in a club.
pub async fn membership_status(
    db: &DatabaseConnection,
    user_id: i64,
    club_id: i64,
) -> Result<MembershipStatus> {
    let memberships: Vec<Membership> = store::read(db).await?;
    Ok(membership_status_at(&memberships, user_id, club_id, Utc::now()))
}

async fn insert_membership(
    db: &DatabaseConnection,
    club: &Club,
    user_id: i64,
) -> Result<Membership> {
    let memberships: Vec<Membership> = store::read(db).await?;
    if access::is_member(&memberships, user_id, club.id) {
        return Err(Error::validation(format!(
            "User {user_id} is already a member of club {}",
            club.id
        )));
    }

    store::append(db, |id| Membership {
        id,
        user_id,
        club_id: club.id,
        joined_at: Utc::now(),
        expires_at: None,
    })
    .await
}

/// Joins a club as the signed-in user.
#[instrument(skip(db))]
pub async fn join_club(db: &DatabaseConnection, user_id: i64, club_id: i64) -> Result<Membership> {
    let user = access::load_actor(db, user_id).await?;
    let club = store::require::<Club, _>(db, club_id).await?;
    if club.owner_id == user.id {
        return Err(Error::validation("Club owners cannot join their own club"));
    }

    let membership = insert_membership(db, &club, user.id).await?;
    info!("User {} joined club {}", user_id, club_id);
    Ok(membership)
}

/// Leaves a club. The owner cannot leave.
///
/// # Returns
/// * `Ok(true)` - The membership was removed
/// * `Ok(false)` - The user was not a member
#[instrument(skip(db))]
pub async fn leave_club(db: &DatabaseConnection, user_id: i64, club_id: i64) -> Result<bool> {
    let club = store::require::<Club, _>(db, club_id).await?;
    if club.owner_id == user_id {
        return Err(Error::validation("The owner cannot leave the club"));
    }
    remove_membership(db, user_id, club_id).await
}

async fn remove_membership(db: &DatabaseConnection, user_id: i64, club_id: i64) -> Result<bool> {
    let mut memberships: Vec<Membership> = store::read(db).await?;
    let before = memberships.len();
    memberships.retain(|m| !(m.user_id == user_id && m.club_id == club_id));
    if memberships.len() == before {
        return Ok(false);
    }

    store::write(db, &memberships).await?;
    info!("User {} left club {}", user_id, club_id);
    Ok(true)
}

/// Adds another user to a club. Owner or admin only.
///
/// # Errors
/// Returns an error if:
/// - The actor may not manage the club
/// - The user does not exist or owns the club
/// - The user is already a member
#[instrument(skip(db))]
pub async fn add_member(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    user_id: i64,
) -> Result<Membership> {
    let (_, club) = access::require_manager(db, actor_id, club_id, "add members").await?;
    let user = store::require::<User, _>(db, user_id).await?;
    if club.owner_id == user.id {
        return Err(Error::validation("The owner is not added as a member"));
    }

    let membership = insert_membership(db, &club, user.id).await?;
    info!("User {} added to club {} by {}", user_id, club_id, actor_id);
    Ok(membership)
}

/// Removes a member from a club. Owner or admin only.
#[instrument(skip(db))]
pub async fn remove_member(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    user_id: i64,
) -> Result<bool> {
    access::require_manager(db, actor_id, club_id, "remove members").await?;
    remove_membership(db, user_id, club_id).await
}

/// Members of a club with their status, oldest membership first.
pub async fn list_members(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
) -> Result<Vec<MemberInfo>> {
    access::require_viewer(db, actor_id, club_id, "view members of this club").await?;

    let users: Vec<User> = store::read(db).await?;
    let memberships: Vec<Membership> = store::read(db).await?;
    let now = Utc::now();

    let mut members: Vec<MemberInfo> = memberships
        .into_iter()
        .filter(|m| m.club_id == club_id)
        .filter_map(|membership| {
            let user = users.iter().find(|u| u.id == membership.user_id)?.clone();
            Some(MemberInfo {
                status: membership.status_at(now),
                user,
                membership,
            })
        })
        .collect();
    members.sort_by(|a, b| a.membership.joined_at.cmp(&b.membership.joined_at));
    Ok(members)
}

/// Clubs the user is a member of.
pub async fn user_clubs(db: &DatabaseConnection, user_id: i64) -> Result<Vec<Club>> {
    let memberships: Vec<Membership> = store::read(db).await?;
    let clubs: Vec<Club> = store::read(db).await?;
    Ok(clubs
        .into_iter()
        .filter(|c| access::is_member(&memberships, user_id, c.id))
        .collect())
}
