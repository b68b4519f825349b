// 💸 Transaction Entity
//
// Sign convention: positive amount = income, negative amount = expense.
// `amount` is never null and `date` is always a real calendar date; the
// optional category reference is a plain id, resolved through the store.

use crate::errors::{LedgerError, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Date format used by forms, storage, and the CSV export
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest accepted |amount|. Keeps SQLite SUM() far away from f64 overflow,
/// which it reports as NULL.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

// ============================================================================
// TRANSACTION ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category_id: Option<i64>,

    /// Name of the referenced category, joined in at read time
    pub category_name: Option<String>,

    /// Set by the store on insert, never edited
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Category name for display, empty when detached
    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("")
    }
}

/// Validated values for creating or editing a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category_id: Option<i64>,
}

impl NewTransaction {
    pub fn new(description: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        NewTransaction {
            description: description.into(),
            amount,
            date,
            category_id: None,
        }
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

// ============================================================================
// REQUEST MODEL
// ============================================================================

/// Raw body of the create/edit transaction forms.
///
/// Every field arrives as text; `validate` turns it into a `NewTransaction`
/// or rejects it before anything touches the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
}

impl TransactionForm {
    pub fn validate(&self, today: NaiveDate) -> Result<NewTransaction> {
        Ok(NewTransaction {
            description: self.description.clone(),
            amount: parse_amount(&self.amount)?,
            date: parse_date_or(&self.date, today)?,
            category_id: parse_category_id(&self.category)?,
        })
    }
}

pub fn parse_amount(raw: &str) -> Result<f64> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| LedgerError::InvalidAmount(raw.to_string()))?;

    // "inf" and "NaN" parse as f64 but are not amounts
    if !is_storable_amount(amount) {
        return Err(LedgerError::InvalidAmount(raw.to_string()));
    }

    Ok(amount)
}

pub fn is_storable_amount(amount: f64) -> bool {
    amount.is_finite() && amount.abs() <= MAX_AMOUNT
}

/// Years SQLite's date functions understand (0000..=9999). Anything else is
/// stored with a sign or a fifth digit and drops out of month grouping.
pub fn is_storable_date(date: NaiveDate) -> bool {
    (0..=9999).contains(&date.year())
}

/// Exactly `DDDD-DD-DD`; chrono's %Y alone also takes "+10000" or "-0001"
fn has_iso_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Empty input means "today"; anything else must be YYYY-MM-DD
pub fn parse_date_or(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(today);
    }
    if !has_iso_date_shape(trimmed) {
        return Err(LedgerError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .filter(|date| is_storable_date(*date))
        .ok_or_else(|| LedgerError::InvalidDate(raw.to_string()))
}

pub fn parse_category_id(raw: &str) -> Result<Option<i64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| LedgerError::InvalidCategoryId(raw.to_string()))
}

// ============================================================================
// CATEGORY INDEX
// ============================================================================

/// Non-owning lookup: category id → ids of the transactions filed under it.
///
/// Built from a snapshot of the store; transactions stay owned by the
/// ledger, this only answers "which transactions use category X".
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    by_category: BTreeMap<i64, Vec<i64>>,
}

impl CategoryIndex {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i64, i64)>) -> Self {
        let mut by_category: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for (category_id, transaction_id) in pairs {
            by_category.entry(category_id).or_default().push(transaction_id);
        }
        CategoryIndex { by_category }
    }

    pub fn transactions_for(&self, category_id: i64) -> &[i64] {
        self.by_category
            .get(&category_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count(&self, category_id: i64) -> usize {
        self.transactions_for(category_id).len()
    }
}
