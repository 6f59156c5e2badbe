use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Database error: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    /// A uniqueness constraint rejected the insert (e.g. duplicate email).
    #[error("{resource} could not be created: {reason}")]
    Conflict { resource: &'static str, reason: String },

    /// A foreign key on the inserted row points at nothing.
    #[error("{resource} could not be created: {reason}")]
    InvalidReference { resource: &'static str, reason: String },
}

impl DbError {
    /// Classifies a failed INSERT by the constraint that rejected it.
    pub(crate) fn from_insert(resource: &'static str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DbError::Conflict { resource, reason: db_err.message().to_owned() };
            }
            if db_err.is_foreign_key_violation() {
                return DbError::InvalidReference { resource, reason: db_err.message().to_owned() };
            }
        }
        err.into()
    }
}
