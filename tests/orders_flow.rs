use chrono::{Duration, TimeZone, Utc};
use ordered_items::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::orders::{ItemChanges, ItemDraft, NewItem, NewOrder},
    error::AppError,
    services::order_service,
    state::AppState,
};

async fn setup_state() -> anyhow::Result<AppState> {
    let orm = create_orm_conn(&AppConfig::in_memory()).await?;
    run_migrations(&orm).await?;
    Ok(AppState { orm })
}

fn draft(number: i32, minutes: i64) -> ItemDraft {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    ItemDraft {
        number,
        updated_at: Some(base + Duration::minutes(minutes)),
    }
}

// Items stamped T, T-1min, T+1min come back newest first.
#[tokio::test]
async fn reloaded_order_lists_items_newest_first() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let created = order_service::create_order_with_items(
        &state,
        NewOrder {
            name: "Hello World!".into(),
        },
        vec![draft(5, 0), draft(1, -1), draft(10, 1)],
    )
    .await?;
    let created_numbers: Vec<i32> = created.items.iter().map(|i| i.number).collect();
    assert_eq!(created_numbers, [10, 5, 1]);

    let first = order_service::find_first_order(&state)
        .await?
        .expect("order should exist");
    assert_eq!(first.id, created.order.id);

    let reloaded = order_service::get_order_with_items(&state, first.id).await?;
    let numbers: Vec<i32> = reloaded.items.iter().map(|i| i.number).collect();
    assert_eq!(numbers, [10, 5, 1]);
    assert_eq!(reloaded.order.name, "Hello World!");

    let listed = order_service::list_items(&state, first.id).await?;
    assert_eq!(listed, reloaded.items);

    Ok(())
}

#[tokio::test]
async fn distinct_timestamps_are_strictly_descending() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let order = order_service::create_order(
        &state,
        NewOrder {
            name: "many".into(),
        },
    )
    .await?;

    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    // deliberately scrambled insertion order, with sub-second offsets
    for (number, offset_ms) in [(3, 3_000), (0, 0), (7, 7_250), (1, 1_500), (5, 5_001), (2, 2_000)] {
        order_service::add_item(
            &state,
            NewItem {
                order_id: Some(order.id),
                number,
                updated_at: Some(base + Duration::milliseconds(offset_ms)),
            },
        )
        .await?;
    }

    let items = order_service::list_items(&state, order.id).await?;
    assert_eq!(items.len(), 6);
    assert!(
        items.windows(2).all(|w| w[0].updated_at > w[1].updated_at),
        "not strictly descending: {items:?}"
    );
    let numbers: Vec<i32> = items.iter().map(|i| i.number).collect();
    assert_eq!(numbers, [7, 5, 3, 2, 1, 0]);

    Ok(())
}

#[tokio::test]
async fn equal_timestamps_keep_insertion_order() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let created = order_service::create_order_with_items(
        &state,
        NewOrder {
            name: "ties".into(),
        },
        vec![draft(1, 0), draft(2, 0), draft(3, 5)],
    )
    .await?;

    let numbers: Vec<i32> = order_service::list_items(&state, created.order.id)
        .await?
        .iter()
        .map(|i| i.number)
        .collect();
    assert_eq!(numbers, [3, 1, 2]);
    Ok(())
}

#[tokio::test]
async fn items_of_other_orders_are_not_listed() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let first = order_service::create_order_with_items(
        &state,
        NewOrder { name: "a".into() },
        vec![draft(1, 0)],
    )
    .await?;
    let second = order_service::create_order_with_items(
        &state,
        NewOrder { name: "b".into() },
        vec![draft(2, 0), draft(3, 1)],
    )
    .await?;

    let numbers: Vec<i32> = order_service::list_items(&state, second.order.id)
        .await?
        .iter()
        .map(|i| i.number)
        .collect();
    assert_eq!(numbers, [3, 2]);
    assert_eq!(order_service::list_items(&state, first.order.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn defaulted_timestamps_are_assigned_on_insert() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let before = Utc::now();
    let order = order_service::create_order(
        &state,
        NewOrder {
            name: "stamped".into(),
        },
    )
    .await?;
    let item = order_service::add_item(
        &state,
        NewItem {
            order_id: Some(order.id),
            number: 42,
            updated_at: None,
        },
    )
    .await?;

    assert!(order.created_at >= before);
    assert_eq!(order.created_at, order.updated_at);
    assert!(item.created_at >= before);
    assert_eq!(item.created_at, item.updated_at);
    Ok(())
}

#[tokio::test]
async fn resaving_without_changes_keeps_updated_at() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let created = order_service::create_order_with_items(
        &state,
        NewOrder { name: "x".into() },
        vec![draft(5, 0)],
    )
    .await?;
    let item = &created.items[0];

    let same = order_service::update_item(&state, item.id, ItemChanges::default()).await?;
    assert_eq!(same.updated_at, item.updated_at);

    let same = order_service::update_item(
        &state,
        item.id,
        ItemChanges {
            number: Some(item.number),
            updated_at: None,
        },
    )
    .await?;
    assert_eq!(same.updated_at, item.updated_at);
    Ok(())
}

#[tokio::test]
async fn changing_a_field_advances_updated_at_and_reorders() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let created = order_service::create_order_with_items(
        &state,
        NewOrder { name: "x".into() },
        vec![draft(5, 0), draft(1, -1), draft(10, 1)],
    )
    .await?;
    let oldest = created
        .items
        .iter()
        .find(|i| i.number == 1)
        .expect("item 1");

    let updated = order_service::update_item(
        &state,
        oldest.id,
        ItemChanges {
            number: Some(2),
            updated_at: None,
        },
    )
    .await?;
    assert!(updated.updated_at > oldest.updated_at);
    assert_eq!(updated.created_at, oldest.created_at);

    let numbers: Vec<i32> = order_service::list_items(&state, created.order.id)
        .await?
        .iter()
        .map(|i| i.number)
        .collect();
    assert_eq!(numbers, [2, 10, 5]);
    Ok(())
}

#[tokio::test]
async fn explicit_updated_at_wins_over_refresh() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let created = order_service::create_order_with_items(
        &state,
        NewOrder { name: "x".into() },
        vec![draft(5, 0), draft(10, 1)],
    )
    .await?;
    let newest = &created.items[0];
    let pinned = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

    let updated = order_service::update_item(
        &state,
        newest.id,
        ItemChanges {
            number: Some(11),
            updated_at: Some(pinned),
        },
    )
    .await?;
    assert_eq!(updated.updated_at, pinned);

    let numbers: Vec<i32> = order_service::list_items(&state, created.order.id)
        .await?
        .iter()
        .map(|i| i.number)
        .collect();
    assert_eq!(numbers, [5, 11]);
    Ok(())
}

#[tokio::test]
async fn explicit_updated_at_equal_to_stored_value_is_kept() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let created = order_service::create_order_with_items(
        &state,
        NewOrder { name: "x".into() },
        vec![draft(5, 0), draft(1, -1)],
    )
    .await?;
    let oldest = created
        .items
        .iter()
        .find(|i| i.number == 1)
        .expect("item 1");

    let updated = order_service::update_item(
        &state,
        oldest.id,
        ItemChanges {
            number: Some(2),
            updated_at: Some(oldest.updated_at),
        },
    )
    .await?;
    assert_eq!(updated.number, 2);
    assert_eq!(updated.updated_at, oldest.updated_at);

    let numbers: Vec<i32> = order_service::list_items(&state, created.order.id)
        .await?
        .iter()
        .map(|i| i.number)
        .collect();
    assert_eq!(numbers, [5, 2]);
    Ok(())
}

#[tokio::test]
async fn resaving_with_current_updated_at_skips_the_write() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let created = order_service::create_order_with_items(
        &state,
        NewOrder { name: "x".into() },
        vec![draft(5, 0)],
    )
    .await?;
    let item = &created.items[0];

    let same = order_service::update_item(
        &state,
        item.id,
        ItemChanges {
            number: Some(item.number),
            updated_at: Some(item.updated_at),
        },
    )
    .await?;
    assert_eq!(&same, item);
    Ok(())
}

#[tokio::test]
async fn renaming_an_order_touches_updated_at() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let order = order_service::create_order(
        &state,
        NewOrder {
            name: "before".into(),
        },
    )
    .await?;

    let renamed = order_service::rename_order(&state, order.id, "after".into()).await?;
    assert_eq!(renamed.name, "after");
    assert!(renamed.updated_at >= order.updated_at);
    assert_eq!(renamed.created_at, order.created_at);

    let unchanged = order_service::rename_order(&state, order.id, "after".into()).await?;
    assert_eq!(unchanged.updated_at, renamed.updated_at);
    Ok(())
}

#[tokio::test]
async fn missing_rows_are_not_found() -> anyhow::Result<()> {
    let state = setup_state().await?;

    assert!(matches!(
        order_service::get_order_with_items(&state, 404).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        order_service::update_item(&state, 404, ItemChanges::default()).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        order_service::rename_order(&state, 404, "x".into()).await,
        Err(AppError::NotFound)
    ));
    assert!(order_service::find_first_order(&state).await?.is_none());
    assert!(order_service::find_item(&state, 404).await?.is_none());
    Ok(())
}
