//! Account business logic - registration, login, session and roles.
//!
//! Passwords are stored through the placeholder [`password_hash`]; emails are
//! compared and stored lowercased. Registration and login both replace the
//! session record with the signed-in user.

use crate::{
    core::access,
    errors::{Error, Result},
    models::{Role, Session, User, password_hash},
    store,
};
use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registers a new member account and signs it in.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or the email is not plausible
/// - The password is shorter than [`MIN_PASSWORD_LEN`]
/// - Another account uses the same email (case-insensitive)
#[instrument(skip(db, password))]
pub async fn register(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User> {
    let name = name.trim();
    let email = email.trim().to_lowercase();

    if name.is_empty() {
        return Err(Error::validation("Name cannot be empty"));
    }
    if !email.contains('@') {
        return Err(Error::validation(format!("Invalid email: {email}")));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let txn = db.begin().await?;

    let users: Vec<User> = store::read(&txn).await?;
    if users.iter().any(|u| u.email.to_lowercase() == email) {
        return Err(Error::EmailTaken { email });
    }

    let user = store::append(&txn, |id| User {
        id,
        name: name.to_string(),
        email: email.clone(),
        password: password_hash(password),
        role: Role::Member,
        created_at: Utc::now(),
    })
    .await?;
    store::write_session(&txn, Session { user_id: Some(user.id) }).await?;

    txn.commit().await?;

    info!("Registered user {} ({})", user.id, user.email);
    Ok(user)
}

/// Signs in with email and password.
///
/// # Errors
/// Returns [`Error::InvalidCredentials`] for an unknown email or wrong password.
#[instrument(skip(db, password))]
pub async fn login(db: &DatabaseConnection, email: &str, password: &str) -> Result<User> {
    let email = email.trim().to_lowercase();
    let users: Vec<User> = store::read(db).await?;

    let user = users
        .into_iter()
        .find(|u| u.email.to_lowercase() == email)
        .filter(|u| u.password == password_hash(password))
        .ok_or(Error::InvalidCredentials)?;

    store::write_session(db, Session { user_id: Some(user.id) }).await?;
    info!("User {} logged in", user.id);
    Ok(user)
}

/// Clears the session.
pub async fn logout(db: &DatabaseConnection) -> Result<()> {
    store::write_session(db, Session::default()).await
}

/// Returns the signed-in user, if any.
///
/// A session pointing at a user that no longer exists counts as logged out.
pub async fn current_user(db: &DatabaseConnection) -> Result<Option<User>> {
    let session = store::read_session(db).await?;
    match session.user_id {
        Some(user_id) => store::find::<User, _>(db, user_id).await,
        None => Ok(None),
    }
}

/// Retrieves a user by id.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<User>> {
    store::find(db, user_id).await
}

/// Lists all users, newest registration first.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<User>> {
    let mut users: Vec<User> = store::read(db).await?;
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(users)
}

/// Changes a user's role. Admin only.
#[instrument(skip(db))]
pub async fn update_role(
    db: &DatabaseConnection,
    actor_id: i64,
    user_id: i64,
    role: Role,
) -> Result<User> {
    access::require_admin(db, actor_id, "change user roles").await?;

    let mut users: Vec<User> = store::read(db).await?;
    let user = users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or_else(|| Error::not_found("user", user_id))?;
    user.role = role;
    let updated = user.clone();

    store::write(db, &users).await?;
    info!("User {} is now {}", updated.id, updated.role);
    Ok(updated)
}
