use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ordered_items::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::orders::{ItemDraft, NewOrder},
    integrity,
    services::order_service,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ordered_items=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config).await?;
    run_migrations(&orm).await?;
    let state = AppState { orm };

    let now = Utc::now();
    let created = order_service::create_order_with_items(
        &state,
        NewOrder {
            name: "Hello World!".into(),
        },
        vec![
            ItemDraft {
                number: 5,
                updated_at: Some(now),
            },
            ItemDraft {
                number: 1,
                updated_at: Some(now - Duration::minutes(1)),
            },
            ItemDraft {
                number: 10,
                updated_at: Some(now + Duration::minutes(1)),
            },
        ],
    )
    .await?;
    tracing::info!(order = %created.order, "order stored");

    let order = order_service::find_first_order(&state)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no order was stored"))?;
    let reloaded = order_service::get_order_with_items(&state, order.id).await?;

    let numbers: Vec<i32> = reloaded.items.iter().map(|item| item.number).collect();
    anyhow::ensure!(
        numbers == [10, 5, 1],
        "items of {} are not newest first: {numbers:?}",
        reloaded.order
    );

    for item in &reloaded.items {
        tracing::info!(item = %item, updated_at = %item.updated_at, "loaded");
    }

    let orphans = integrity::orphaned_item_count(state.pool()).await?;
    anyhow::ensure!(orphans == 0, "{orphans} items without an order");

    println!("{}", serde_json::to_string_pretty(&reloaded)?);
    Ok(())
}
