//! Access rules - who may organize, manage and view clubs.
//!
//! The predicates are pure; the `require_*` helpers load the actor and club
//! and turn a refusal into [`Error::Unauthorized`] before anything is written.

use crate::{
    errors::{Error, Result},
    models::{Club, Membership, Role, User},
    store,
};
use sea_orm::ConnectionTrait;

/// Admins and organizers may create clubs.
#[must_use]
pub fn can_organize(user: &User) -> bool {
    matches!(user.role, Role::Admin | Role::Organizer)
}

/// Admins and the club owner may manage a club.
#[must_use]
pub fn can_manage_club(user: &User, club: &Club) -> bool {
    user.role == Role::Admin || user.id == club.owner_id
}

/// True if a membership row exists for the pair, expired or not.
#[must_use]
pub fn is_member(memberships: &[Membership], user_id: i64, club_id: i64) -> bool {
    memberships
        .iter()
        .any(|m| m.user_id == user_id && m.club_id == club_id)
}

/// Members, the owner and admins may see gated club content.
#[must_use]
pub fn can_view_club(user: &User, club: &Club, memberships: &[Membership]) -> bool {
    can_manage_club(user, club) || is_member(memberships, user.id, club.id)
}

/// Loads the acting user.
pub(crate) async fn load_actor<C>(conn: &C, actor_id: i64) -> Result<User>
where
    C: ConnectionTrait,
{
    store::require::<User, C>(conn, actor_id).await
}

/// Fails unless the actor is an admin.
pub(crate) async fn require_admin<C>(conn: &C, actor_id: i64, action: &str) -> Result<User>
where
    C: ConnectionTrait,
{
    let actor = load_actor(conn, actor_id).await?;
    if actor.role != Role::Admin {
        return Err(Error::unauthorized(action));
    }
    Ok(actor)
}

/// Loads actor and club, failing unless the actor may manage the club.
pub(crate) async fn require_manager<C>(
    conn: &C,
    actor_id: i64,
    club_id: i64,
    action: &str,
) -> Result<(User, Club)>
where
    C: ConnectionTrait,
{
    let actor = load_actor(conn, actor_id).await?;
    let club = store::require::<Club, C>(conn, club_id).await?;
    if !can_manage_club(&actor, &club) {
        return Err(Error::unauthorized(action));
    }
    Ok((actor, club))
}

/// Loads actor and club, failing unless the actor may view gated content.
pub(crate) async fn require_viewer<C>(
    conn: &C,
    actor_id: i64,
    club_id: i64,
    action: &str,
) -> Result<(User, Club)>
where
    C: ConnectionTrait,
{
    let actor = load_actor(conn, actor_id).await?;
    let club = store::require::<Club, C>(conn, club_id).await?;
    let memberships: Vec<Membership> = store::read(conn).await?;
    if !can_view_club(&actor, &club, &memberships) {
        return Err(Error::unauthorized(action));
    }
    Ok((actor, club))
}
