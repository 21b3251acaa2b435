//! Merging of result sets produced by several search strategies.

use std::collections::HashSet;
use uuid::Uuid;

use crate::models::CatalogProduct;

/// Records with a stable identity
pub trait Identified {
    fn identity(&self) -> Uuid;
}

impl Identified for CatalogProduct {
    fn identity(&self) -> Uuid {
        self.id
    }
}

/// Deduplicated and truncated merge result
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<T> {
    pub items: Vec<T>,
    /// Distinct records before truncation
    pub total: usize,
}

impl<T> Default for Reconciled<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Concatenate `sets` in order, keep the first record per identity, then
/// truncate to `limit`.
///
/// Earlier sets win, so primary strategy results go first.
pub fn reconcile<T, I>(sets: I, limit: usize) -> Reconciled<T>
where
    T: Identified,
    I: IntoIterator<Item = Vec<T>>,
{
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for record in sets.into_iter().flatten() {
        if seen.insert(record.identity()) {
            items.push(record);
        }
    }

    let total = items.len();
    items.truncate(limit);

    Reconciled { items, total }
}
