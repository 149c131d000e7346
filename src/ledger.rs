// Ledger - the record operations over one SQLite file
//
// Every operation opens its own connection, does one statement and drops the
// connection before returning. The only shared state is the one-time table
// creation flag and the lock around it.

use crate::config::Config;
use crate::db::{self, CategoryTotal, Entry, EntryPatch, EntryType, NewEntry};
use crate::error::{LedgerError, LedgerResult};
use crate::validation::{validate_amount, validate_date};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, warn};

pub struct Ledger {
    db_path: PathBuf,
    categories_path: PathBuf,
    initialized: AtomicBool,
    init_lock: Mutex<()>,
}

impl Ledger {
    pub fn new(db_path: impl Into<PathBuf>, categories_path: impl Into<PathBuf>) -> Self {
        Ledger {
            db_path: db_path.into(),
            categories_path: categories_path.into(),
            initialized: AtomicBool::new(false),
            init_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.db_path.clone(), config.categories_path.clone())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn connect(&self) -> LedgerResult<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    // ========================================================================
    // INITIALIZATION
    // ========================================================================

    /// Create the table if needed. Call once at startup; safe to repeat.
    pub fn initialize(&self) -> LedgerResult<()> {
        self.ensure_initialized()
    }

    /// Runs the schema setup at most once for this ledger.
    ///
    /// Concurrent first callers block on the lock until the creating caller
    /// finishes. A failed setup leaves the flag unset so the next call retries.
    fn ensure_initialized(&self) -> LedgerResult<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.is_initialized() {
            return Ok(());
        }

        let conn = self.connect()?;
        db::setup_database(&conn)?;
        self.initialized.store(true, Ordering::Release);

        info!(path = %self.db_path.display(), "expense table ready");
        Ok(())
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Record an expense and return its id
    pub fn add_expense(
        &self,
        amount: f64,
        category: &str,
        subcategory: &str,
        note: &str,
        date: &str,
    ) -> LedgerResult<i64> {
        self.insert(NewEntry {
            date: date.to_string(),
            amount,
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            note: note.to_string(),
            entry_type: EntryType::Expense,
        })
    }

    /// Record income; `source` is stored as the category
    pub fn add_credit(&self, amount: f64, source: &str, note: &str, date: &str) -> LedgerResult<i64> {
        self.insert(NewEntry {
            date: date.to_string(),
            amount,
            category: source.to_string(),
            subcategory: String::new(),
            note: note.to_string(),
            entry_type: EntryType::Income,
        })
    }

    fn insert(&self, entry: NewEntry) -> LedgerResult<i64> {
        self.ensure_initialized()?;

        if !validate_amount(entry.amount) {
            return Err(rejected("insert", LedgerError::InvalidAmount));
        }
        if !validate_date(&entry.date) {
            return Err(rejected("insert", LedgerError::InvalidDate));
        }

        let conn = self.connect()?;
        let id = db::insert_entry(&conn, &entry)?;

        info!(
            id,
            entry_type = entry.entry_type.as_str(),
            amount = entry.amount,
            "entry added"
        );
        Ok(id)
    }

    /// Update only the fields present in `patch`.
    ///
    /// Amount is validated before date, and both before the empty check.
    pub fn edit_expense(&self, id: i64, patch: &EntryPatch) -> LedgerResult<()> {
        self.ensure_initialized()?;

        if let Some(amount) = patch.amount {
            if !validate_amount(amount) {
                return Err(rejected("edit_expense", LedgerError::InvalidAmount));
            }
        }
        if let Some(date) = &patch.date {
            if !validate_date(date) {
                return Err(rejected("edit_expense", LedgerError::InvalidDate));
            }
        }
        if patch.is_empty() {
            return Err(rejected("edit_expense", LedgerError::NoFieldsProvided));
        }

        let conn = self.connect()?;
        if db::update_entry(&conn, id, patch)? == 0 {
            return Err(rejected("edit_expense", LedgerError::ExpenseNotFound));
        }

        info!(id, "entry updated");
        Ok(())
    }

    /// Soft delete. Deleting an already hidden entry succeeds again.
    pub fn delete_expense(&self, id: i64) -> LedgerResult<()> {
        self.ensure_initialized()?;

        let conn = self.connect()?;
        if db::set_deleted(&conn, id, true)? == 0 {
            return Err(rejected("delete_expense", LedgerError::EntryNotFound));
        }

        info!(id, "entry hidden");
        Ok(())
    }

    /// Clear the soft-delete flag.
    ///
    /// The row is matched by id alone, so restoring an active entry also
    /// succeeds; the error only fires for unknown ids.
    pub fn restore_expense(&self, id: i64) -> LedgerResult<()> {
        self.ensure_initialized()?;

        let conn = self.connect()?;
        if db::set_deleted(&conn, id, false)? == 0 {
            return Err(rejected("restore_expense", LedgerError::NotFoundOrAlreadyActive));
        }

        info!(id, "entry restored");
        Ok(())
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Active entries of both types in `[start_date, end_date]`
    pub fn list_expenses(&self, start_date: &str, end_date: &str) -> LedgerResult<Vec<Entry>> {
        self.ensure_initialized()?;
        check_range("list_expenses", start_date, end_date)?;

        let conn = self.connect()?;
        let entries = db::list_entries(&conn, start_date, end_date)?;

        debug!(start_date, end_date, count = entries.len(), "entries listed");
        Ok(entries)
    }

    /// Expense totals per category; an empty `category` means no filter
    pub fn summarize(
        &self,
        start_date: &str,
        end_date: &str,
        category: Option<&str>,
    ) -> LedgerResult<Vec<CategoryTotal>> {
        self.ensure_initialized()?;
        check_range("summarize", start_date, end_date)?;

        let category = category.filter(|c| !c.is_empty());
        let conn = self.connect()?;
        let totals = db::summarize_expenses(&conn, start_date, end_date, category)?;

        debug!(start_date, end_date, groups = totals.len(), "expenses summarized");
        Ok(totals)
    }

    /// Raw bytes of the categories document, unparsed
    pub fn read_categories(&self) -> LedgerResult<Vec<u8>> {
        Ok(std::fs::read(&self.categories_path)?)
    }

    /// Number of stored rows, hidden ones included
    pub fn count(&self) -> LedgerResult<i64> {
        self.ensure_initialized()?;

        let conn = self.connect()?;
        db::count_entries(&conn)
    }
}

fn check_range(operation: &str, start_date: &str, end_date: &str) -> LedgerResult<()> {
    if validate_date(start_date) && validate_date(end_date) {
        Ok(())
    } else {
        Err(rejected(operation, LedgerError::InvalidDateRange))
    }
}

fn rejected(operation: &str, err: LedgerError) -> LedgerError {
    warn!(operation, reason = %err, "request rejected");
    err
}
