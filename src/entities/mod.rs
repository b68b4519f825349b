// Entity Models
//
// Plain values read from and written to the ledger store. Relationships are
// ids, never object references: a transaction knows its category id, and the
// reverse direction is answered by `CategoryIndex`.

pub mod category;
pub mod transaction;

pub use category::{Category, CategoryForm};
pub use transaction::{CategoryIndex, NewTransaction, Transaction, TransactionForm, DATE_FORMAT};
