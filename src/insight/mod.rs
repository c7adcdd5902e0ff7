//! The insights page and the presentation rules for insight cards.

mod core;
mod insights_page;

pub use core::{insight_icon, priority_chip_class};
pub use insights_page::get_insights_page;
