// 📊 Summary Engine - derived views over the ledger
//
// Everything here is recomputed from the store on each call; nothing is
// cached between requests and nothing is written.
//
// Amounts are f64, so sums can carry binary representation error
// (0.1 + 0.2 != 0.3). Values are reported as SQLite sums them, unrounded.

use crate::db::{self, Sign};
use crate::entities::Transaction;
use crate::errors::Result;
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rows shown in the dashboard's "recent" list
pub const RECENT_LIMIT: usize = 10;

/// Length of the trend window, in calendar months, ending at the current month
pub const TREND_MONTHS: u32 = 6;

// ============================================================================
// MONTH LABELS
// ============================================================================

/// "YYYY-MM", zero padded. Must match SQLite's strftime('%Y-%m') exactly or
/// trend lookups silently fall back to 0.0.
pub fn month_label(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Year and month `offset` months before the month of `today`
fn months_back(today: NaiveDate, offset: u32) -> (i32, u32) {
    let index = today.year() * 12 + today.month0() as i32 - offset as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// The `TREND_MONTHS` consecutive month labels ending at `today`'s month,
/// oldest first.
pub fn trend_window(today: NaiveDate) -> Vec<String> {
    (0..TREND_MONTHS)
        .rev()
        .map(|offset| {
            let (year, month) = months_back(today, offset);
            month_label(year, month)
        })
        .collect()
}

// ============================================================================
// MONTHLY TREND
// ============================================================================

/// Payload of `GET /api/summary`: two index-aligned series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl MonthlyTrend {
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels.iter().map(String::as_str).zip(self.data.iter().copied())
    }
}

/// Project grouped month totals onto the trend window. Months without
/// transactions contribute 0.0, so the result always has `TREND_MONTHS` points.
pub fn build_trend(totals: &HashMap<String, f64>, today: NaiveDate) -> MonthlyTrend {
    let labels = trend_window(today);
    let data = labels
        .iter()
        .map(|label| totals.get(label).copied().unwrap_or(0.0))
        .collect();

    MonthlyTrend { labels, data }
}

pub fn monthly_trend(conn: &Connection, today: NaiveDate) -> Result<MonthlyTrend> {
    let totals = db::monthly_totals(conn)?;
    Ok(build_trend(&totals, today))
}

// ============================================================================
// TOTALS
// ============================================================================

/// Sum of positive amounts (0.0 when there are none)
pub fn total_income(conn: &Connection) -> Result<f64> {
    db::sum_amounts(conn, Sign::Positive)
}

/// Raw signed sum of negative amounts: usually negative, never an absolute value
pub fn total_expenses(conn: &Connection) -> Result<f64> {
    db::sum_amounts(conn, Sign::Negative)
}

pub fn recent_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    db::recent_transactions(conn, RECENT_LIMIT)
}

/// Values behind the dashboard page
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub income: f64,
    pub expenses: f64,
    pub recent: Vec<Transaction>,
}

impl DashboardSummary {
    pub fn load(conn: &Connection) -> Result<Self> {
        let summary = DashboardSummary {
            income: total_income(conn)?,
            expenses: total_expenses(conn)?,
            recent: recent_transactions(conn)?,
        };

        tracing::debug!(
            income = summary.income,
            expenses = summary.expenses,
            recent = summary.recent.len(),
            "dashboard summary computed"
        );
        Ok(summary)
    }

    /// Income plus (negative) expenses
    pub fn net(&self) -> f64 {
        self.income + self.expenses
    }
}
