use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::domain::ConflictReason;

/// Failure of a single store operation.
///
/// Constraint violations the caller can act on are split out from everything
/// else, which stays an opaque database error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Constraint violated: {0}")]
    Conflict(ConflictReason),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    #[must_use]
    pub const fn conflict(&self) -> Option<ConflictReason> {
        match self {
            Self::Conflict(reason) => Some(*reason),
            Self::Database(_) => None,
        }
    }
}

/// Maps a failed write to `Conflict(reason)` when a unique or foreign-key
/// constraint fired, and to `Database` otherwise.
///
/// Every insert touches exactly one table, so the table's own constraint is
/// the only one that can fire and `reason` names it.
pub(crate) fn classify(err: DbErr, reason: ConflictReason) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_) | SqlErr::ForeignKeyConstraintViolation(_)) => {
            StoreError::Conflict(reason)
        }
        _ => StoreError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_errors_stay_database_errors() {
        let err = classify(DbErr::Custom("boom".to_string()), ConflictReason::Pun);
        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(err.conflict(), None);
    }

    #[test]
    fn conflict_exposes_reason() {
        let err = StoreError::Conflict(ConflictReason::LoginId);
        assert_eq!(err.conflict(), Some(ConflictReason::LoginId));
        assert_eq!(err.to_string(), "Constraint violated: loginId");
    }
}
