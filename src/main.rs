// Pocket Ledger CLI - database maintenance, seeding, export, and a text summary

use anyhow::{bail, Context, Result};
use chrono::Local;
use pocket_ledger::{
    config::Config, export, logging, seed, summary, DashboardSummary, LedgerStore, VERSION,
};
use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

const USAGE: &str = "Usage: pocket-ledger <command>

Commands:
  init-db          Create the database schema
  seed             Replace the ledger with sample data
  export [PATH]    Write all transactions as CSV (stdout if no PATH)
  summary          Print totals and the 6-month trend";

fn main() -> Result<()> {
    logging::init_tracing();
    let args: Vec<String> = env::args().collect();
    let db_path = Config::db_path_from_env();

    match args.get(1).map(String::as_str) {
        Some("init-db") => run_init_db(&db_path),
        Some("seed") => run_seed(&db_path),
        Some("export") => run_export(&db_path, args.get(2).map(String::as_str)),
        Some("summary") => run_summary(&db_path),
        Some("--version") => {
            println!("pocket-ledger {}", VERSION);
            Ok(())
        }
        Some("help") | Some("--help") | None => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }
}

fn open_store(db_path: &Path) -> Result<LedgerStore> {
    LedgerStore::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))
}

fn run_init_db(db_path: &Path) -> Result<()> {
    open_store(db_path)?;
    println!("✓ Database ready at {}", db_path.display());
    println!("  (run `pocket-ledger seed` to load sample data)");
    Ok(())
}

fn run_seed(db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;
    let conn = store.session()?;
    let count = seed::seed_sample_data(&conn)?;
    println!("✓ Seeded {} sample transactions", count);
    Ok(())
}

fn run_export(db_path: &Path, path: Option<&str>) -> Result<()> {
    let store = open_store(db_path)?;
    let conn = store.session()?;

    match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
            let rows = export::export_ledger(&conn, BufWriter::new(file))?;
            eprintln!("✓ Exported {} transactions to {}", rows, path);
        }
        None => {
            export::export_ledger(&conn, io::stdout().lock())?;
        }
    }
    Ok(())
}

fn run_summary(db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;
    let conn = store.session()?;

    let dashboard = DashboardSummary::load(&conn)?;
    let trend = summary::monthly_trend(&conn, Local::now().date_naive())?;

    println!("Income:   {:>12.2}", dashboard.income);
    println!("Expenses: {:>12.2}", dashboard.expenses);
    println!("Net:      {:>12.2}", dashboard.net());

    println!("\nLast {} months:", trend.labels.len());
    for (label, value) in trend.points() {
        println!("  {}  {:>12.2}", label, value);
    }

    println!("\nRecent transactions:");
    for tx in &dashboard.recent {
        println!(
            "  {}  {:>10.2}  {:<12}  {}",
            tx.date,
            tx.amount,
            tx.category_label(),
            tx.description
        );
    }
    Ok(())
}
