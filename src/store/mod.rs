//! Entity store - the named collections and the session record.
//!
//! Each collection is read as a full ordered list and written back as a full
//! replacement list; there are no partial updates. A mutation of one record is
//! always read → change in memory → write. Functions are generic over
//! [`ConnectionTrait`], so callers can run several writes inside one database
//! transaction when a change spans collections.
//!
//! Reads never fail on bad content: a missing document is an empty list, an
//! unparseable document is an empty list, and an entry that does not decode is
//! left out of the list. Such entries stay in storage: writes carry them over
//! unchanged and id allocation still counts their numeric ids. Writes enforce
//! id uniqueness and each record's composite key.

pub mod identity;

pub use identity::next_id;

use crate::{
    config::seed::AdminConfig,
    entities::{StoredDocument, stored_document},
    errors::{Error, Result},
    models::{Collection, Record, Role, Session, User, password_hash, session::SESSION_KEY},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

async fn load_document<C>(conn: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let row = StoredDocument::find()
        .filter(stored_document::Column::Key.eq(key))
        .one(conn)
        .await?;
    Ok(row.map(|r| r.value))
}

async fn put_document<C>(conn: &C, key: &str, value: String) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let existing = StoredDocument::find()
        .filter(stored_document::Column::Key.eq(key))
        .one(conn)
        .await?;

    if let Some(row) = existing {
        let mut active_model: stored_document::ActiveModel = row.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(conn).await?;
    } else {
        let new_row = stored_document::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        };
        new_row.insert(conn).await?;
    }

    Ok(())
}

/// A collection split into the records that decode and the raw entries that
/// do not. Raw entries are written back unchanged.
struct Decoded<T> {
    records: Vec<T>,
    opaque: Vec<Value>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            opaque: Vec::new(),
        }
    }
}

impl<T: Record> Decoded<T> {
    fn next_id(&self) -> i64 {
        let opaque_ids = self.opaque.iter().filter_map(identity::raw_id);
        identity::next_id_after(self.records.iter().map(Record::id).chain(opaque_ids))
    }
}

fn decode_collection<T: Record>(raw: &str) -> Decoded<T> {
    let key = T::COLLECTION.key();
    let values: Vec<Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!("Collection {} is unreadable, treating as empty: {}", key, e);
            return Decoded::default();
        }
    };

    let mut decoded = Decoded::default();
    for value in values {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(record) => decoded.records.push(record),
            Err(e) => {
                warn!("Keeping undecodable entry in {} as is: {}", key, e);
                decoded.opaque.push(value);
            }
        }
    }
    decoded
}

async fn load_collection<T, C>(conn: &C) -> Result<Decoded<T>>
where
    T: Record,
    C: ConnectionTrait,
{
    Ok(match load_document(conn, T::COLLECTION.key()).await? {
        Some(raw) => decode_collection(&raw),
        None => Decoded::default(),
    })
}

fn check_unique<T: Record>(items: &[T], opaque: &[Value]) -> Result<()> {
    let collection = T::COLLECTION.key();
    let mut ids: HashSet<i64> = opaque.iter().filter_map(identity::raw_id).collect();
    let mut keys = HashSet::with_capacity(items.len());

    for item in items {
        if !ids.insert(item.id()) {
            return Err(Error::UniqueViolation {
                collection,
                key: item.id().to_string(),
            });
        }
        if let Some(key) = item.unique_key() {
            if !keys.insert(key.clone()) {
                return Err(Error::UniqueViolation { collection, key });
            }
        }
    }

    Ok(())
}

async fn store_collection<T, C>(conn: &C, items: &[T], opaque: &[Value]) -> Result<()>
where
    T: Record,
    C: ConnectionTrait,
{
    check_unique(items, opaque)?;
    let mut values = items
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    values.extend(opaque.iter().cloned());
    put_document(conn, T::COLLECTION.key(), serde_json::to_string(&values)?).await?;
    debug!("Collection written");
    Ok(())
}

/// Reads the full ordered list of a collection.
#[instrument(skip(conn), fields(collection = T::COLLECTION.key()))]
pub async fn read<T, C>(conn: &C) -> Result<Vec<T>>
where
    T: Record,
    C: ConnectionTrait,
{
    let items = load_collection::<T, C>(conn).await?.records;
    debug!("Read {} records", items.len());
    Ok(items)
}

/// Replaces the full list of a collection.
///
/// Entries already stored that do not decode as `T` are kept after the new
/// records, untouched.
///
/// # Errors
/// Returns [`Error::UniqueViolation`] without writing anything if two records
/// share an id or a composite key, or a record reuses the id of a kept entry.
#[instrument(skip(conn, items), fields(collection = T::COLLECTION.key(), len = items.len()))]
pub async fn write<T, C>(conn: &C, items: &[T]) -> Result<()>
where
    T: Record,
    C: ConnectionTrait,
{
    let opaque = load_collection::<T, C>(conn).await?.opaque;
    store_collection(conn, items, &opaque).await
}

/// The id the next record of a collection gets, counting undecodable
/// entries that carry a numeric id.
pub async fn next_free_id<T, C>(conn: &C) -> Result<i64>
where
    T: Record,
    C: ConnectionTrait,
{
    Ok(load_collection::<T, C>(conn).await?.next_id())
}

/// Finds a record by id.
pub async fn find<T, C>(conn: &C, id: i64) -> Result<Option<T>>
where
    T: Record,
    C: ConnectionTrait,
{
    Ok(read::<T, C>(conn).await?.into_iter().find(|r| r.id() == id))
}

/// Finds a record by id, failing with [`Error::NotFound`] if it is absent.
pub async fn require<T, C>(conn: &C, id: i64) -> Result<T>
where
    T: Record,
    C: ConnectionTrait,
{
    find::<T, C>(conn, id)
        .await?
        .ok_or_else(|| Error::not_found(T::ENTITY, id))
}

/// Appends one record built from the next free id and returns it.
pub async fn append<T, C, F>(conn: &C, build: F) -> Result<T>
where
    T: Record,
    C: ConnectionTrait,
    F: FnOnce(i64) -> T,
{
    let mut collection = load_collection::<T, C>(conn).await?;
    let record = build(collection.next_id());
    collection.records.push(record.clone());
    store_collection(conn, &collection.records, &collection.opaque).await?;
    Ok(record)
}

/// Reads the session record. Missing or unreadable state means logged out.
pub async fn read_session<C>(conn: &C) -> Result<Session>
where
    C: ConnectionTrait,
{
    let Some(raw) = load_document(conn, SESSION_KEY).await? else {
        return Ok(Session::default());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Session is unreadable, treating as logged out: {}", e);
        Session::default()
    }))
}

/// Replaces the session record.
pub async fn write_session<C>(conn: &C, session: Session) -> Result<()>
where
    C: ConnectionTrait,
{
    put_document(conn, SESSION_KEY, serde_json::to_string(&session)?).await
}

/// Initializes an empty store on first use.
///
/// If no users document exists yet, every collection is written empty, the
/// users collection gets the configured administrator with id 1, and the
/// session is logged out. Otherwise the persisted state is left untouched.
///
/// # Returns
/// * `Ok(true)` - The store was seeded
/// * `Ok(false)` - State already existed
#[instrument(skip(db, admin))]
pub async fn seed_if_empty(db: &DatabaseConnection, admin: &AdminConfig) -> Result<bool> {
    if load_document(db, Collection::Users.key()).await?.is_some() {
        debug!("Store already initialized");
        return Ok(false);
    }

    let txn = db.begin().await?;

    for collection in Collection::ALL {
        if collection != Collection::Users {
            put_document(&txn, collection.key(), "[]".to_string()).await?;
        }
    }

    let administrator = User {
        id: 1,
        name: admin.name.trim().to_string(),
        email: admin.email.trim().to_lowercase(),
        password: password_hash(&admin.password),
        role: Role::Admin,
        created_at: Utc::now(),
    };
    write(&txn, &[administrator]).await?;
    write_session(&txn, Session::default()).await?;

    txn.commit().await?;

    info!("Store seeded with administrator {}", admin.email);
    Ok(true)
}
