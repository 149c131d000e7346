use crate::error::LedgerResult;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

// ============================================================================
// ENTRY TYPE
// ============================================================================

/// Kind of ledger entry, fixed at insert time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Expense,
    Income,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Expense => "expense",
            EntryType::Income => "income",
        }
    }
}

impl ToSql for EntryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for EntryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "expense" => Ok(EntryType::Expense),
            "income" => Ok(EntryType::Income),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

// ============================================================================
// ENTRY
// ============================================================================

/// One stored record, expense or income
///
/// For income entries `category` holds the income source and `subcategory`
/// is always empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub subcategory: String,
    pub note: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub is_deleted: bool,
}

impl Entry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Entry {
            id: row.get(0)?,
            date: row.get(1)?,
            amount: row.get(2)?,
            category: row.get(3)?,
            subcategory: row.get(4)?,
            note: row.get(5)?,
            entry_type: row.get(6)?,
            is_deleted: row.get(7)?,
        })
    }
}

/// Values for a new row; `id` and `is_deleted` are assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub subcategory: String,
    pub note: String,
    pub entry_type: EntryType,
}

/// Fields an edit may touch. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub note: Option<String>,
    pub date: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
            && self.note.is_none()
            && self.date.is_none()
    }
}

/// Per-category expense total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total_amount: f64,
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> LedgerResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            subcategory TEXT DEFAULT '',
            note TEXT DEFAULT '',
            type TEXT NOT NULL DEFAULT 'expense',
            is_deleted INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// STATEMENTS
// ============================================================================

const ENTRY_COLUMNS: &str =
    "id, date, amount, category, subcategory, note, type, is_deleted";

/// Insert a row and return its new id
pub fn insert_entry(conn: &Connection, entry: &NewEntry) -> LedgerResult<i64> {
    conn.execute(
        "INSERT INTO expenses (amount, category, subcategory, note, date, type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.amount,
            entry.category,
            entry.subcategory,
            entry.note,
            entry.date,
            entry.entry_type,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Fetch a row by id regardless of its deleted flag
pub fn get_entry(conn: &Connection, id: i64) -> LedgerResult<Option<Entry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {} FROM expenses WHERE id = ?1", ENTRY_COLUMNS),
            params![id],
            Entry::from_row,
        )
        .optional()?;

    Ok(entry)
}

/// Active entries of any type with `start <= date <= end`, oldest first
pub fn list_entries(conn: &Connection, start_date: &str, end_date: &str) -> LedgerResult<Vec<Entry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}
         FROM expenses
         WHERE date BETWEEN ?1 AND ?2 AND is_deleted = 0
         ORDER BY date ASC, id ASC",
        ENTRY_COLUMNS
    ))?;

    let entries = stmt
        .query_map(params![start_date, end_date], Entry::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

/// Sum active expenses per category in the inclusive range.
///
/// `category = None` aggregates every category. Income rows never count.
pub fn summarize_expenses(
    conn: &Connection,
    start_date: &str,
    end_date: &str,
    category: Option<&str>,
) -> LedgerResult<Vec<CategoryTotal>> {
    let mut stmt = conn.prepare(
        "SELECT category, SUM(amount) AS total_amount
         FROM expenses
         WHERE date BETWEEN ?1 AND ?2
           AND type = 'expense'
           AND is_deleted = 0
           AND (?3 IS NULL OR category = ?3)
         GROUP BY category
         ORDER BY category ASC",
    )?;

    let totals = stmt
        .query_map(params![start_date, end_date, category], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total_amount: row.get::<_, f64>(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(totals)
}

/// Apply a patch to the row with `id`; returns the number of rows matched.
///
/// One fixed statement: absent fields bind NULL and COALESCE keeps the
/// stored value. Every editable column is NOT NULL, so NULL never means
/// "clear".
pub fn update_entry(conn: &Connection, id: i64, patch: &EntryPatch) -> LedgerResult<usize> {
    let changed = conn.execute(
        "UPDATE expenses
         SET amount = COALESCE(?1, amount),
             category = COALESCE(?2, category),
             subcategory = COALESCE(?3, subcategory),
             note = COALESCE(?4, note),
             date = COALESCE(?5, date)
         WHERE id = ?6",
        params![
            patch.amount,
            patch.category,
            patch.subcategory,
            patch.note,
            patch.date,
            id,
        ],
    )?;

    Ok(changed)
}

/// Set the soft-delete flag; matched by id alone, so repeating is harmless
pub fn set_deleted(conn: &Connection, id: i64, deleted: bool) -> LedgerResult<usize> {
    let changed = conn.execute(
        "UPDATE expenses SET is_deleted = ?1 WHERE id = ?2",
        params![deleted, id],
    )?;

    Ok(changed)
}

/// Total rows, deleted ones included
pub fn count_entries(conn: &Connection) -> LedgerResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;

    Ok(count)
}
