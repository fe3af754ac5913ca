use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::{
    dto::orders::{ItemChanges, ItemDraft, NewItem, NewOrder, OrderWithItems},
    entity::{
        items::{ActiveModel as ItemActive, Column as ItemCol, Entity as Items},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        timestamps,
    },
    error::{AppError, AppResult},
    models::{Item, Order},
    state::AppState,
};

pub async fn create_order(state: &AppState, payload: NewOrder) -> AppResult<Order> {
    let order = new_order(payload).insert(&state.orm).await?;
    tracing::debug!(order_id = order.id, "order created");
    Ok(order.into())
}

/// Insert an order and its items in one transaction.
pub async fn create_order_with_items(
    state: &AppState,
    payload: NewOrder,
    drafts: Vec<ItemDraft>,
) -> AppResult<OrderWithItems> {
    let txn = state.orm.begin().await?;

    let order = new_order(payload).insert(&txn).await?;
    for draft in drafts {
        new_item(order.id, draft.number, draft.updated_at)
            .insert(&txn)
            .await?;
    }

    let items = Items::find_by_order(order.id)
        .all(&txn)
        .await?
        .into_iter()
        .map(Item::from)
        .collect::<Vec<_>>();

    txn.commit().await?;

    tracing::debug!(order_id = order.id, items = items.len(), "order created with items");
    Ok(OrderWithItems {
        order: order.into(),
        items,
    })
}

pub async fn add_item(state: &AppState, payload: NewItem) -> AppResult<Item> {
    let Some(order_id) = payload.order_id else {
        return Err(AppError::ReferentialIntegrity(
            "item has no owning order".into(),
        ));
    };

    let item = match new_item(order_id, payload.number, payload.updated_at)
        .insert(&state.orm)
        .await
    {
        Ok(item) => item,
        Err(err) => {
            let err = AppError::from(err);
            if err.is_referential_integrity() {
                tracing::warn!(order_id, error = %err, "item rejected");
            }
            return Err(err);
        }
    };

    tracing::debug!(item_id = item.id, order_id, "item added");
    Ok(item.into())
}

/// Items of an order, most recently updated first.
pub async fn list_items(state: &AppState, order_id: i32) -> AppResult<Vec<Item>> {
    let items = Items::find_by_order(order_id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Item::from)
        .collect();
    Ok(items)
}

pub async fn get_order_with_items(state: &AppState, order_id: i32) -> AppResult<OrderWithItems> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = Items::order_newest_first(order.find_related(Items))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Item::from)
        .collect();

    Ok(OrderWithItems {
        order: order.into(),
        items,
    })
}

/// The order with the lowest id, if any exist.
pub async fn find_first_order(state: &AppState) -> AppResult<Option<Order>> {
    let order = Orders::find()
        .order_by_asc(OrderCol::Id)
        .one(&state.orm)
        .await?;
    Ok(order.map(Order::from))
}

pub async fn find_item(state: &AppState, item_id: i32) -> AppResult<Option<Item>> {
    let item = Items::find_by_id(item_id).one(&state.orm).await?;
    Ok(item.map(Item::from))
}

/// Apply `changes` to an item. Changing any column refreshes `updated_at`
/// unless the changes carry their own; a change set that alters nothing
/// performs no write.
pub async fn update_item(
    state: &AppState,
    item_id: i32,
    changes: ItemChanges,
) -> AppResult<Item> {
    let item = Items::find_by_id(item_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ItemActive = item.clone().into();
    if let Some(number) = changes.number.filter(|n| *n != item.number) {
        active.number = Set(number);
    }
    let mut changed = active.is_changed();
    if let Some(at) = changes.updated_at {
        let at = timestamps::to_stored(at.fixed_offset());
        changed |= at != item.updated_at;
        // Always set, so the refresh in `before_save` never overrides it.
        active.updated_at = Set(at);
    }

    if !changed {
        tracing::debug!(item_id, "item unchanged, skipping write");
        return Ok(item.into());
    }

    let item = active.update(&state.orm).await?;
    tracing::debug!(item_id, updated_at = %item.updated_at, "item updated");
    Ok(item.into())
}

pub async fn rename_order(state: &AppState, order_id: i32, name: String) -> AppResult<Order> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.name == name {
        return Ok(order.into());
    }

    let mut active: OrderActive = order.into();
    active.name = Set(name);
    let order = active.update(&state.orm).await?;
    Ok(order.into())
}

/// Delete a single item owned by `order_id`.
pub async fn remove_item(state: &AppState, order_id: i32, item_id: i32) -> AppResult<()> {
    let result = Items::delete_many()
        .filter(ItemCol::Id.eq(item_id))
        .filter(ItemCol::OrderId.eq(order_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::debug!(order_id, item_id, "item removed");
    Ok(())
}

/// Delete an order; its items go with it through the foreign key cascade.
/// Returns how many items were removed.
pub async fn delete_order(state: &AppState, order_id: i32) -> AppResult<u64> {
    let txn = state.orm.begin().await?;

    if Orders::find_by_id(order_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let removed = Items::find()
        .filter(ItemCol::OrderId.eq(order_id))
        .count(&txn)
        .await?;

    Orders::delete_by_id(order_id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id, items = removed, "order deleted");
    Ok(removed)
}

fn new_order(payload: NewOrder) -> OrderActive {
    OrderActive {
        id: NotSet,
        name: Set(payload.name),
        created_at: NotSet,
        updated_at: NotSet,
    }
}

fn new_item(order_id: i32, number: i32, updated_at: Option<DateTime<Utc>>) -> ItemActive {
    ItemActive {
        id: NotSet,
        number: Set(number),
        order_id: Set(order_id),
        created_at: NotSet,
        updated_at: match updated_at {
            Some(at) => Set(at.fixed_offset()),
            None => NotSet,
        },
    }
}
