//! The in-memory query pipeline for the transactions page: filtering,
//! pagination and the income/expense totals.

use crate::api::models::{Transaction, TransactionKind};

/// The debit/credit filter on the transactions page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Debit,
    Credit,
}

impl KindFilter {
    /// The query param value for this filter, or `None` for the default.
    pub fn as_query_value(self) -> Option<&'static str> {
        match self {
            KindFilter::All => None,
            KindFilter::Debit => Some("debit"),
            KindFilter::Credit => Some("credit"),
        }
    }

    /// Parse a `kind` query param. Unknown values fall back to showing
    /// everything rather than erroring out.
    pub fn from_query_value(value: Option<&str>) -> Self {
        match value {
            Some("debit") => KindFilter::Debit,
            Some("credit") => KindFilter::Credit,
            _ => KindFilter::All,
        }
    }

    fn matches(self, transaction: &Transaction) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Debit => transaction.kind() == TransactionKind::Debit,
            KindFilter::Credit => transaction.kind() == TransactionKind::Credit,
        }
    }
}

/// The filters a user can apply on the transactions page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive substring matched against the description and
    /// category of each transaction.
    pub search: String,
    /// Keep only transactions with this exact category.
    pub category: Option<String>,
    /// Keep only debits or credits.
    pub kind: KindFilter,
}

/// One page of query results along with the figures summarising the whole
/// filtered set.
#[derive(Debug, PartialEq)]
pub struct TransactionPage {
    /// The transactions on the current page.
    pub rows: Vec<Transaction>,
    /// How many transactions matched the filters across all pages.
    pub total_matches: u64,
    /// The sum of all matching credit amounts.
    pub income: f64,
    /// The absolute sum of all matching debit amounts.
    pub expenses: f64,
    /// The page `rows` belongs to, after clamping.
    pub curr_page: u64,
    /// How many pages the filtered set spans. At least one, even when empty.
    pub page_count: u64,
}

/// Filter `transactions` down to the requested page.
///
/// Filters are applied in order: search, then category, then kind. The income
/// and expense totals cover every match, not just the rows on the returned
/// page. The requested page is clamped into `1..=page_count` so that an out
/// of range page shows the nearest valid one rather than an empty table.
pub fn run_query(
    transactions: &[Transaction],
    filter: &TransactionFilter,
    page: u64,
    page_size: u64,
) -> TransactionPage {
    let search = filter.search.trim().to_lowercase();

    let matches: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| {
            search.is_empty()
                || transaction.description.to_lowercase().contains(&search)
                || transaction.category.to_lowercase().contains(&search)
        })
        .filter(|transaction| match &filter.category {
            Some(category) => transaction.category == *category,
            None => true,
        })
        .filter(|transaction| filter.kind.matches(transaction))
        .collect();

    let income = matches
        .iter()
        .filter(|transaction| transaction.kind() == TransactionKind::Credit)
        .map(|transaction| transaction.amount)
        .sum();
    let expenses = matches
        .iter()
        .filter(|transaction| transaction.kind() == TransactionKind::Debit)
        .map(|transaction| transaction.amount)
        .sum::<f64>()
        .abs();

    let total_matches = matches.len() as u64;
    let page_count = total_matches.div_ceil(page_size).max(1);
    let curr_page = page.clamp(1, page_count);

    let rows = matches
        .into_iter()
        .skip(((curr_page - 1) * page_size) as usize)
        .take(page_size as usize)
        .cloned()
        .collect();

    TransactionPage {
        rows,
        total_matches,
        income,
        expenses,
        curr_page,
        page_count,
    }
}

/// The distinct categories across `transactions`, sorted alphabetically.
///
/// Computed from the unfiltered list so the category dropdown keeps every
/// option visible while a filter is active.
pub fn distinct_categories(transactions: &[Transaction]) -> Vec<String> {
    let mut categories: Vec<String> = transactions
        .iter()
        .map(|transaction| transaction.category.clone())
        .collect();
    categories.sort();
    categories.dedup();

    categories
}
