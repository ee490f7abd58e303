//! Stored document entity - one row per named collection or session record.
//!
//! The `value` column holds the whole collection as a JSON array (or the
//! session as a JSON object). Rows are replaced wholesale, never patched.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored document database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Row identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Document key (e.g. `"users"`, `"session"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Serialized JSON content
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When the document was last replaced
    pub updated_at: DateTime,
}

/// Documents have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
