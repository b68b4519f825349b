// Ledger Store - SQLite persistence for categories and transactions
//
// Owns both entity collections. Every mutation is a single statement or a
// single SQLite transaction; readers (the summary engine, views, export)
// only go through the query functions below.

use crate::entities::transaction::{is_storable_amount, is_storable_date};
use crate::entities::{Category, CategoryIndex, NewTransaction, Transaction, DATE_FORMAT};
use crate::errors::{LedgerError, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// STORE HANDLE
// ============================================================================

/// Owner of the single SQLite connection.
///
/// Callers borrow it per request through `session()`; the returned guard is
/// the storage session and releases the connection when dropped.
pub struct LedgerStore {
    conn: Mutex<Connection>,
}

impl LedgerStore {
    /// Open (or create) a file-backed ledger and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        setup_database(&conn)?;
        tracing::info!(path = %path.as_ref().display(), "ledger database opened");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        LedgerStore {
            conn: Mutex::new(conn),
        }
    }

    pub fn session(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| LedgerError::SessionPoisoned)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for file databases (in-memory connections silently keep "memory")
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL DEFAULT '',
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id)",
        [],
    )?;

    Ok(())
}

/// Remove every transaction and category. Callers that refill the ledger
/// wrap this in their own SQLite transaction.
pub fn clear_ledger(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM transactions", [])?;
    conn.execute("DELETE FROM categories", [])?;
    Ok(())
}

// ============================================================================
// CATEGORIES
// ============================================================================

/// Add a category. Names are compared exactly; an existing name yields
/// `DuplicateCategory` and nothing is written.
pub fn insert_category(conn: &Connection, name: &str) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::EmptyCategoryName);
    }

    if find_category_by_name(conn, name)?.is_some() {
        return Err(LedgerError::DuplicateCategory(name.to_string()));
    }

    conn.execute("INSERT INTO categories (name) VALUES (?1)", params![name])?;
    let category = Category::new(conn.last_insert_rowid(), name);

    tracing::info!(id = category.id, name = %category.name, "category added");
    Ok(category)
}

pub fn get_category(conn: &Connection, id: i64) -> Result<Category> {
    conn.query_row(
        "SELECT id, name FROM categories WHERE id = ?1",
        params![id],
        |row| Ok(Category::new(row.get(0)?, row.get::<_, String>(1)?)),
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Category", id))
}

pub fn find_category_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let category = conn
        .query_row(
            "SELECT id, name FROM categories WHERE name = ?1",
            params![name],
            |row| Ok(Category::new(row.get(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;
    Ok(category)
}

/// All categories ordered by name
pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;

    let categories = stmt
        .query_map([], |row| Ok(Category::new(row.get(0)?, row.get::<_, String>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(categories)
}

/// Delete a category after detaching it from its transactions.
///
/// Returns how many transactions were detached. Transactions are never
/// removed by this call.
pub fn delete_category(conn: &Connection, id: i64) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;

    let exists: Option<i64> = tx
        .query_row("SELECT id FROM categories WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    if exists.is_none() {
        return Err(LedgerError::not_found("Category", id));
    }

    let detached = tx.execute(
        "UPDATE transactions SET category_id = NULL WHERE category_id = ?1",
        params![id],
    )?;
    tx.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
    tx.commit()?;

    tracing::info!(id, detached, "category deleted");
    Ok(detached)
}

fn ensure_category_exists(conn: &Connection, category_id: Option<i64>) -> Result<()> {
    if let Some(id) = category_id {
        let found: Option<i64> = conn
            .query_row("SELECT id FROM categories WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?;
        if found.is_none() {
            return Err(LedgerError::UnknownCategory(id));
        }
    }
    Ok(())
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

const TRANSACTION_SELECT: &str = "SELECT t.id, t.description, t.amount, t.date, t.category_id, c.name, t.created_at
     FROM transactions t
     LEFT JOIN categories c ON c.id = t.category_id";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        category_id: row.get(4)?,
        category_name: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Values that would break month grouping or SUM() never reach the table
fn ensure_storable(values: &NewTransaction) -> Result<()> {
    if !is_storable_amount(values.amount) {
        return Err(LedgerError::InvalidAmount(values.amount.to_string()));
    }
    if !is_storable_date(values.date) {
        return Err(LedgerError::InvalidDate(values.date.format(DATE_FORMAT).to_string()));
    }
    Ok(())
}

pub fn insert_transaction(conn: &Connection, new_tx: &NewTransaction) -> Result<Transaction> {
    ensure_storable(new_tx)?;
    ensure_category_exists(conn, new_tx.category_id)?;

    conn.execute(
        "INSERT INTO transactions (description, amount, date, category_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_tx.description,
            new_tx.amount,
            new_tx.date,
            new_tx.category_id,
            Utc::now(),
        ],
    )?;
    let id = conn.last_insert_rowid();

    tracing::info!(id, amount = new_tx.amount, date = %new_tx.date, "transaction added");
    get_transaction(conn, id)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let sql = format!("{} WHERE t.id = ?1", TRANSACTION_SELECT);
    conn.query_row(&sql, params![id], row_to_transaction)
        .optional()?
        .ok_or_else(|| LedgerError::not_found("Transaction", id))
}

/// Overwrite the editable fields of an existing transaction in place
pub fn update_transaction(conn: &Connection, id: i64, changes: &NewTransaction) -> Result<Transaction> {
    // Unknown id wins over a bad category reference
    get_transaction(conn, id)?;
    ensure_storable(changes)?;
    ensure_category_exists(conn, changes.category_id)?;

    conn.execute(
        "UPDATE transactions
         SET description = ?1, amount = ?2, date = ?3, category_id = ?4
         WHERE id = ?5",
        params![
            changes.description,
            changes.amount,
            changes.date,
            changes.category_id,
            id,
        ],
    )?;

    tracing::info!(id, "transaction updated");
    get_transaction(conn, id)
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(LedgerError::not_found("Transaction", id));
    }

    tracing::info!(id, "transaction deleted");
    Ok(())
}

/// Every transaction, newest date first (ties in insertion order)
pub fn list_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let sql = format!("{} ORDER BY t.date DESC, t.id ASC", TRANSACTION_SELECT);
    let mut stmt = conn.prepare(&sql)?;

    let transactions = stmt
        .query_map([], row_to_transaction)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(transactions)
}

pub fn count_transactions(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
    Ok(count)
}

/// Category id → transaction ids, for every categorised transaction
pub fn category_index(conn: &Connection) -> Result<CategoryIndex> {
    let mut stmt = conn.prepare(
        "SELECT category_id, id FROM transactions
         WHERE category_id IS NOT NULL
         ORDER BY id",
    )?;

    let pairs = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(CategoryIndex::from_pairs(pairs))
}

// ============================================================================
// QUERY SURFACE FOR THE SUMMARY ENGINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// amount > 0
    Positive,
    /// amount < 0
    Negative,
}

/// Raw signed sum of the amounts on one side of zero; 0.0 when none match.
/// Zero amounts belong to neither side.
pub fn sum_amounts(conn: &Connection, sign: Sign) -> Result<f64> {
    let sql = match sign {
        Sign::Positive => "SELECT SUM(amount) FROM transactions WHERE amount > 0",
        Sign::Negative => "SELECT SUM(amount) FROM transactions WHERE amount < 0",
    };
    let total: Option<f64> = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(total.unwrap_or(0.0))
}

/// The `limit` transactions with the latest dates
pub fn recent_transactions(conn: &Connection, limit: usize) -> Result<Vec<Transaction>> {
    let sql = format!("{} ORDER BY t.date DESC, t.id ASC LIMIT ?1", TRANSACTION_SELECT);
    let mut stmt = conn.prepare(&sql)?;

    let transactions = stmt
        .query_map(params![limit as i64], row_to_transaction)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(transactions)
}

/// Net total per calendar month, keyed "YYYY-MM". Rows whose date SQLite
/// cannot read group under NULL and are left out.
pub fn monthly_totals(conn: &Connection) -> Result<HashMap<String, f64>> {
    let mut stmt = conn.prepare(
        "SELECT strftime('%Y-%m', date) AS month, SUM(amount) AS total
         FROM transactions
         GROUP BY month
         ORDER BY month",
    )?;

    let rows = stmt
        .query_map([], |row| {
            let month: Option<String> = row.get(0)?;
            let total: Option<f64> = row.get(1)?;
            Ok((month, total.unwrap_or(0.0)))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let totals = rows
        .into_iter()
        .filter_map(|(month, total)| month.map(|month| (month, total)))
        .collect();

    Ok(totals)
}
