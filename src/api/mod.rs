//! The typed boundary to the backend finance services and its injectable
//! in-memory double.

mod client;
mod mock;
pub mod models;

pub use client::{ApiError, ApiResult, FinanceApi};
pub use mock::{DEMO_EMAIL, DEMO_PASSWORD, MockFinanceApi};

pub use models::{Account, Credentials, Insight, LogInResponse, NewUser, Transaction, User};
