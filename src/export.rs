// CSV export of the whole ledger
//
// Header: id,description,amount,date,category
// One row per transaction, newest date first; detached transactions get an
// empty category.

use crate::db;
use crate::entities::{Transaction, DATE_FORMAT};
use crate::errors::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::io::Write;

pub const EXPORT_FILENAME: &str = "transactions.csv";

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: i64,
    description: &'a str,
    amount: f64,
    date: String,
    category: &'a str,
}

impl<'a> From<&'a Transaction> for CsvRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        CsvRow {
            id: tx.id,
            description: &tx.description,
            amount: tx.amount,
            date: tx.date.format(DATE_FORMAT).to_string(),
            category: tx.category_label(),
        }
    }
}

/// Write `transactions` as CSV, header included even when the list is empty
pub fn write_transactions<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    // Header written by hand so an empty ledger still produces one
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(["id", "description", "amount", "date", "category"])?;
    for tx in transactions {
        wtr.serialize(CsvRow::from(tx))?;
    }
    wtr.flush()?;

    Ok(())
}

/// Export every transaction in the store; returns the number of rows written
pub fn export_ledger<W: Write>(conn: &Connection, writer: W) -> Result<usize> {
    let transactions = db::list_transactions(conn)?;
    write_transactions(writer, &transactions)?;

    tracing::info!(rows = transactions.len(), "ledger exported to CSV");
    Ok(transactions.len())
}

pub fn export_to_string(conn: &Connection) -> Result<String> {
    let mut buffer = Vec::new();
    export_ledger(conn, &mut buffer)?;
    // csv only ever writes the UTF-8 strings we hand it
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
