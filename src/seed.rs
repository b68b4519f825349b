// Sample data: three categories and one month of transactions

use crate::db::{clear_ledger, insert_category, insert_transaction};
use crate::entities::NewTransaction;
use crate::errors::{LedgerError, Result};
use chrono::NaiveDate;
use rusqlite::Connection;

fn sample_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| LedgerError::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day)))
}

/// Replace the ledger with the sample data in one SQLite transaction;
/// returns the transaction count. On failure the previous ledger is kept.
pub fn seed_sample_data(conn: &Connection) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    clear_ledger(&tx)?;

    let food = insert_category(&tx, "Food")?;
    let rent = insert_category(&tx, "Rent")?;
    let salary = insert_category(&tx, "Salary")?;

    let samples = [
        ("Grocery shopping", -50.0, sample_date(2025, 9, 25)?, food.id),
        ("Monthly rent", -1200.0, sample_date(2025, 9, 1)?, rent.id),
        ("Paycheck", 3000.0, sample_date(2025, 9, 30)?, salary.id),
    ];

    for (description, amount, date, category_id) in &samples {
        insert_transaction(
            &tx,
            &NewTransaction::new(*description, *amount, *date).with_category(*category_id),
        )?;
    }

    tx.commit()?;
    tracing::info!(transactions = samples.len(), "seeded sample ledger");
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_transactions, list_categories, list_transactions, setup_database};
    use crate::summary::{total_expenses, total_income};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_seed_is_repeatable() {
        let conn = setup();

        assert_eq!(seed_sample_data(&conn).unwrap(), 3);
        assert_eq!(seed_sample_data(&conn).unwrap(), 3);

        assert_eq!(count_transactions(&conn).unwrap(), 3);
        assert_eq!(list_categories(&conn).unwrap().len(), 3);
        assert_eq!(total_income(&conn).unwrap(), 3000.0);
        assert_eq!(total_expenses(&conn).unwrap(), -1250.0);
    }

    #[test]
    fn test_failed_seed_keeps_previous_ledger() {
        let conn = setup();
        seed_sample_data(&conn).unwrap();
        let before = list_transactions(&conn).unwrap();

        conn.execute_batch(
            "CREATE TRIGGER fail_paycheck BEFORE INSERT ON transactions
             WHEN NEW.description = 'Paycheck'
             BEGIN SELECT RAISE(ABORT, 'paycheck rejected'); END;",
        )
        .unwrap();

        assert!(seed_sample_data(&conn).is_err());

        assert_eq!(list_transactions(&conn).unwrap(), before);
        assert_eq!(list_categories(&conn).unwrap().len(), 3);
    }
}
