//! The transactions page and the query pipeline behind it.

mod query;
mod transactions_page;

pub use transactions_page::get_transactions_page;
