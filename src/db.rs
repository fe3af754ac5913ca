use std::str::FromStr;

use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sea_orm_migration::MigratorTrait;
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::{config::AppConfig, integrity, migration::Migrator};

/// Create a SeaORM connection with SQLite foreign keys switched on.
pub async fn create_orm_conn(config: &AppConfig) -> Result<DatabaseConnection> {
    let mut connect = SqliteConnectOptions::from_str(&config.database_url)?.foreign_keys(true);
    if !config.echo_sql {
        connect = connect.disable_statement_logging();
    }

    let pool = pool_options(&config.database_url)
        .connect_with(connect)
        .await?;

    if !integrity::foreign_keys_enabled(&pool).await? {
        anyhow::bail!("SQLite foreign key enforcement could not be enabled");
    }

    tracing::debug!(url = %config.database_url, "database connected");
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// Apply all pending schema migrations.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    tracing::debug!("migrations applied");
    Ok(())
}

fn pool_options(url: &str) -> SqlitePoolOptions {
    let options = SqlitePoolOptions::new();
    if !is_in_memory(url) {
        return options;
    }
    // An in-memory database lives exactly as long as its single connection,
    // so that connection must never be opened twice or recycled.
    options
        .max_connections(1)
        .min_connections(1)
        .max_lifetime(None)
        .idle_timeout(None)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
