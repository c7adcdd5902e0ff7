//! The accounts page and the aggregation behind its totals.

mod accounts_page;
mod core;

pub use accounts_page::{get_accounts_page, post_connect_bank};
pub use core::summarize_accounts;
