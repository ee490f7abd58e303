//! Entity module - SeaORM entity definitions for the database.
//!
//! The store keeps every collection as a single JSON document, so one table
//! is enough.

pub mod stored_document;

pub use stored_document::{
    Column as StoredDocumentColumn, Entity as StoredDocument, Model as StoredDocumentModel,
};
