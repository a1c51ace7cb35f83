pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid rating {0}, must be between 0 and 5 stars")]
    InvalidRating(i64),
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        let unavailable = match &value {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => true,
            sqlx::Error::Database(e) => is_busy(e.code().as_deref()),
            _ => false,
        };
        if unavailable {
            Error::StorageUnavailable(value)
        } else {
            Error::DatabaseError(value)
        }
    }
}

// SQLITE_BUSY and SQLITE_LOCKED primary result codes, extended codes share the low byte
fn is_busy(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .map(|c| matches!(c & 0xff, 5 | 6))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(matches!(
            Error::from(sqlx::Error::PoolTimedOut),
            Error::StorageUnavailable(_)
        ));
        assert!(matches!(
            Error::from(sqlx::Error::PoolClosed),
            Error::StorageUnavailable(_)
        ));
        assert!(matches!(
            Error::from(sqlx::Error::RowNotFound),
            Error::DatabaseError(_)
        ));
    }

    #[test]
    fn test_busy_codes() {
        assert!(is_busy(Some("5")));
        assert!(is_busy(Some("517")));
        assert!(is_busy(Some("6")));
        assert!(!is_busy(Some("2067")));
        assert!(!is_busy(None));
    }
}
