// Error taxonomy for ledger operations
// Validation and not-found errors are reported back to the caller as
// structured results; storage faults propagate.

use thiserror::Error;

// ============================================================================
// ERROR KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, nothing was written
    Validation,
    /// Well-formed input, target row absent
    NotFound,
    /// Infrastructure failure (database, filesystem)
    Fault,
}

// ============================================================================
// LEDGER ERROR
// ============================================================================

/// Every `#[error]` text below is the exact message returned to callers.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate,

    #[error("Invalid date range format. Use YYYY-MM-DD")]
    InvalidDateRange,

    #[error("No fields provided to update")]
    NoFieldsProvided,

    #[error("Expense not found")]
    ExpenseNotFound,

    #[error("Entry not found")]
    EntryNotFound,

    #[error("Entry not found or already active")]
    NotFoundOrAlreadyActive,

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount
            | LedgerError::InvalidDate
            | LedgerError::InvalidDateRange
            | LedgerError::NoFieldsProvided => ErrorKind::Validation,
            LedgerError::ExpenseNotFound
            | LedgerError::EntryNotFound
            | LedgerError::NotFoundOrAlreadyActive => ErrorKind::NotFound,
            LedgerError::Storage(_) | LedgerError::Io(_) => ErrorKind::Fault,
        }
    }

    /// True for errors that must not be turned into a result payload
    pub fn is_fault(&self) -> bool {
        self.kind() == ErrorKind::Fault
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_wire_text() {
        assert_eq!(LedgerError::InvalidAmount.to_string(), "Invalid amount");
        assert_eq!(
            LedgerError::InvalidDate.to_string(),
            "Invalid date format. Use YYYY-MM-DD"
        );
        assert_eq!(
            LedgerError::InvalidDateRange.to_string(),
            "Invalid date range format. Use YYYY-MM-DD"
        );
        assert_eq!(
            LedgerError::NotFoundOrAlreadyActive.to_string(),
            "Entry not found or already active"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(LedgerError::NoFieldsProvided.kind(), ErrorKind::Validation);
        assert_eq!(LedgerError::ExpenseNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(LedgerError::EntryNotFound.kind(), ErrorKind::NotFound);

        let fault = LedgerError::from(rusqlite::Error::InvalidQuery);
        assert_eq!(fault.kind(), ErrorKind::Fault);
        assert!(fault.is_fault());
        assert!(!LedgerError::InvalidAmount.is_fault());
    }
}
