// 🏷️ Category Entity - flat, uniquely named labels for transactions
//
// A category owns nothing: transactions point at it by id, and deleting a
// category detaches those transactions instead of removing them.

use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// System-assigned identity (SQLite rowid)
    pub id: i64,

    /// Unique, non-empty display name (exact match, case-sensitive)
    pub name: String,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Category {
            id,
            name: name.into(),
        }
    }
}

// ============================================================================
// REQUEST MODEL
// ============================================================================

/// Body of `POST /categories/add`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

impl CategoryForm {
    /// Trimmed name, or None when nothing but whitespace was submitted
    pub fn name(&self) -> Option<&str> {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}
