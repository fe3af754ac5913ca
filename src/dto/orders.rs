use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Item, Order};

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub name: String,
}

/// A child row for an order that is being created in the same transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDraft {
    pub number: i32,
    /// Overrides the default "now" timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub order_id: Option<i32>,
    pub number: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemChanges {
    pub number: Option<i32>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.updated_at.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<Item>,
}
