//! User accounts.

use super::{Collection, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::Error;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including statistics and role management
    Admin,
    /// May create clubs
    Organizer,
    /// Regular member
    Member,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Organizer => "organizer",
            Self::Member => "member",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "organizer" => Ok(Self::Organizer),
            "member" => Ok(Self::Member),
            other => Err(Error::validation(format!("unknown role: {other}"))),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Lowercased email, unique across users
    pub email: String,
    /// Opaque password hash
    pub password: String,
    /// Account role
    pub role: Role,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

/// Non-cryptographic 32-bit string hash used as the stored password value.
///
/// Computes `h = h * 31 + unit` over the UTF-16 code units with `i32`
/// wrap-around and renders the result as `"h"` followed by its unsigned value.
#[must_use]
pub fn password_hash(password: &str) -> String {
    let h = password
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
    #[allow(clippy::cast_sign_loss)]
    let unsigned = h as u32;
    format!("h{unsigned}")
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
    const ENTITY: &'static str = "user";

    fn id(&self) -> i64 {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_lowercase())
    }
}
