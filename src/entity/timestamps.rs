//! Bookkeeping shared by every entity carrying `created_at` / `updated_at`.
//!
//! Values the caller sets explicitly always win. Otherwise both columns default
//! to "now" on insert, and `updated_at` is refreshed on any update that
//! changes at least one column. Everything is stored in UTC so the textual
//! SQLite representation sorts chronologically.

use chrono::Utc;
use sea_orm::ActiveValue::{self, Set};
use sea_orm::entity::prelude::DateTimeWithTimeZone;

pub fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

pub fn to_stored(value: DateTimeWithTimeZone) -> DateTimeWithTimeZone {
    value.with_timezone(&Utc).fixed_offset()
}

pub(crate) fn stamp(
    created_at: &mut ActiveValue<DateTimeWithTimeZone>,
    updated_at: &mut ActiveValue<DateTimeWithTimeZone>,
    insert: bool,
    changed: bool,
) {
    let now = now();
    if insert {
        if !created_at.is_set() {
            *created_at = Set(now);
        }
        if !updated_at.is_set() {
            *updated_at = Set(now);
        }
    } else if changed && !updated_at.is_set() {
        *updated_at = Set(now);
    }

    for column in [created_at, updated_at] {
        if let ActiveValue::Set(value) = column {
            *value = to_stored(*value);
        }
    }
}
