// Pocket Ledger - Core Library
// Exposes the store, summary engine, export, and views for the CLI, the
// web server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod export;
pub mod logging;
pub mod seed;
pub mod summary;
pub mod views;

// Only compiled with the web server feature
#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use db::{
    LedgerStore, Sign,
    setup_database, insert_category, get_category, list_categories, delete_category,
    insert_transaction, get_transaction, update_transaction, delete_transaction,
    list_transactions, count_transactions, category_index,
};
pub use entities::{
    Category, CategoryForm, CategoryIndex,
    NewTransaction, Transaction, TransactionForm,
};
pub use errors::LedgerError;
pub use export::{export_ledger, export_to_string};
pub use summary::{
    DashboardSummary, MonthlyTrend,
    build_trend, monthly_trend, trend_window, month_label,
    total_income, total_expenses, recent_transactions,
    RECENT_LIMIT, TREND_MONTHS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
