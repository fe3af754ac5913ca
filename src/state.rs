use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
}

impl AppState {
    /// The sqlx pool behind the ORM connection, for raw SQL probes.
    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.orm.get_sqlite_connection_pool()
    }
}
