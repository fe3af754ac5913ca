use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    #[error("Database error: {0}")]
    DbError(sqlx::Error),

    #[error("ORM error: {0}")]
    OrmError(DbErr),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_referential_integrity(&self) -> bool {
        matches!(self, AppError::ReferentialIntegrity(_))
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => AppError::ReferentialIntegrity(msg),
            _ => AppError::OrmError(err),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(db_err.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
                return AppError::ReferentialIntegrity(db_err.message().to_string());
            }
        }
        AppError::DbError(err)
    }
}

pub type AppResult<T> = Result<T, AppError>;
