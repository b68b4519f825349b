// Error taxonomy for the ledger
//
// Input errors are raised at the request boundary (form validation),
// reference errors by the store, everything else is wrapped infrastructure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Edit/delete of an id that does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Category names are unique (exact, case-sensitive match)
    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("Category name must not be empty")]
    EmptyCategoryName,

    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid category id: '{0}'")]
    InvalidCategoryId(String),

    /// Transaction points at a category that is not in the store
    #[error("Category {0} does not exist")]
    UnknownCategory(i64),

    #[error("Storage session is unavailable (poisoned lock)")]
    SessionPoisoned,

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        LedgerError::NotFound { entity, id }
    }

    /// True for errors caused by what the caller sent, not by the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LedgerError::EmptyCategoryName
                | LedgerError::InvalidAmount(_)
                | LedgerError::InvalidDate(_)
                | LedgerError::InvalidCategoryId(_)
                | LedgerError::UnknownCategory(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = LedgerError::not_found("Transaction", 42);
        assert_eq!(err.to_string(), "Transaction 42 not found");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_input_errors_are_client_errors() {
        assert!(LedgerError::InvalidAmount("abc".into()).is_client_error());
        assert!(LedgerError::InvalidDate("2025-13-01".into()).is_client_error());
        assert!(LedgerError::UnknownCategory(7).is_client_error());
        assert!(!LedgerError::DuplicateCategory("Food".into()).is_client_error());
    }
}
