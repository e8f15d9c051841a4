use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    EmailExists,

    #[error("email is required")]
    EmailRequired,

    #[error("club name is required")]
    NameRequired,

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl StoreError {
    /// True for errors caused by user input rather than the database.
    pub fn is_validation(&self) -> bool {
        !matches!(self, StoreError::Db(_))
    }
}

/// Postgres `unique_violation` on the given constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some("23505") && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}
