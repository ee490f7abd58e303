//! Identity allocation.
//!
//! Ids are `max(existing) + 1`, or `1` for an empty collection. Allocation is a
//! pure function of the current contents, so ids freed by deletions are never
//! handed out again while a higher id remains. Entries that no longer decode
//! still hold their id as long as it is numeric.

use crate::models::Record;
use serde_json::Value;

/// Returns the next free id for a collection with the given contents.
#[must_use]
pub fn next_id<'a, T: Record + 'a>(items: impl IntoIterator<Item = &'a T>) -> i64 {
    next_id_after(items.into_iter().map(Record::id))
}

/// Returns the next free id after a set of ids.
#[must_use]
pub fn next_id_after(ids: impl IntoIterator<Item = i64>) -> i64 {
    ids.into_iter().fold(0, i64::max).saturating_add(1)
}

/// The numeric `id` of a raw entry. Non-numeric ids are ignored.
#[must_use]
pub fn raw_id(value: &Value) -> Option<i64> {
    value.get("id")?.as_i64()
}
