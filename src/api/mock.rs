//! An in-memory stand-in for the backend finance services.
//!
//! The mock issues real bearer tokens at log-in and checks them on every
//! data call, so the unauthorized paths behave like the real services would.
//! It is seeded with the demonstration data set used across the app.

use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use time::{UtcOffset, macros::datetime};

use super::{
    client::{ApiError, ApiResult, FinanceApi},
    models::{
        Account, AccountKind, Credentials, Insight, InsightKind, InsightPriority, LogInResponse,
        NewUser, Transaction, User,
    },
};

/// The email of the user seeded by [MockFinanceApi::with_demo_data].
pub const DEMO_EMAIL: &str = "demo@aureum.app";
/// The password of the user seeded by [MockFinanceApi::with_demo_data].
pub const DEMO_PASSWORD: &str = "aureum-demo";

struct StoredUser {
    user: User,
    password: String,
}

/// The injectable double for [FinanceApi].
pub struct MockFinanceApi {
    users: Mutex<Vec<StoredUser>>,
    sessions: Mutex<HashSet<String>>,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    insights: Vec<Insight>,
    outage: Mutex<Option<String>>,
    token_counter: AtomicU64,
}

impl MockFinanceApi {
    /// Create a mock with no users and no financial data.
    pub fn empty() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            sessions: Mutex::new(HashSet::new()),
            accounts: Vec::new(),
            transactions: Vec::new(),
            insights: Vec::new(),
            outage: Mutex::new(None),
            token_counter: AtomicU64::new(0),
        }
    }

    /// Create a mock seeded with the demonstration user, accounts,
    /// transactions, and insights.
    pub fn with_demo_data() -> Self {
        let mut mock = Self::empty();
        mock.accounts = demo_accounts();
        mock.transactions = demo_transactions();
        mock.insights = demo_insights();
        mock.users
            .get_mut()
            .expect("user table lock poisoned")
            .push(StoredUser {
                user: demo_user(),
                password: DEMO_PASSWORD.to_owned(),
            });
        mock
    }

    /// Issue a valid bearer token for the demonstration user without going
    /// through the log-in endpoint. Intended for tests.
    pub fn issue_token(&self) -> String {
        let token = self.mint_token(DEMO_EMAIL);
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .insert(token.clone());
        token
    }

    /// Invalidate a bearer token so that subsequent calls with it fail with
    /// [ApiError::Unauthorized], as if the session had expired server-side.
    pub fn revoke(&self, token: &str) {
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .remove(token);
    }

    /// Make all authenticated data calls fail with [ApiError::Unavailable]
    /// until [clear_outage](MockFinanceApi::clear_outage) is called.
    pub fn set_outage(&self, message: &str) {
        *self.outage.lock().expect("outage lock poisoned") = Some(message.to_owned());
    }

    /// End an outage started with [set_outage](MockFinanceApi::set_outage).
    pub fn clear_outage(&self) {
        *self.outage.lock().expect("outage lock poisoned") = None;
    }

    fn mint_token(&self, email: &str) -> String {
        let nonce = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let digest = Sha256::digest(format!("{email}:{nonce}"));
        digest.iter().fold(String::new(), |mut hex, byte| {
            hex.push_str(&format!("{byte:02x}"));
            hex
        })
    }

    fn check_session(&self, token: &str) -> ApiResult<()> {
        if !self
            .sessions
            .lock()
            .expect("session lock poisoned")
            .contains(token)
        {
            return Err(ApiError::Unauthorized);
        }

        if let Some(message) = self.outage.lock().expect("outage lock poisoned").as_ref() {
            return Err(ApiError::Unavailable(message.clone()));
        }

        Ok(())
    }
}

#[async_trait]
impl FinanceApi for MockFinanceApi {
    async fn log_in(&self, credentials: &Credentials) -> ApiResult<LogInResponse> {
        let users = self.users.lock().expect("user table lock poisoned");
        let stored = users
            .iter()
            .find(|stored| stored.user.email == credentials.email)
            .ok_or(ApiError::Unauthorized)?;

        if stored.password != credentials.password {
            return Err(ApiError::Unauthorized);
        }

        let user = stored.user.clone();
        drop(users);

        let token = self.mint_token(&user.email);
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .insert(token.clone());

        Ok(LogInResponse { token, user })
    }

    async fn register(&self, new_user: &NewUser) -> ApiResult<User> {
        let mut users = self.users.lock().expect("user table lock poisoned");

        if users
            .iter()
            .any(|stored| stored.user.email == new_user.email)
        {
            return Err(ApiError::Rejected(
                "An account with this email already exists.".to_owned(),
            ));
        }

        let user = User {
            id: (users.len() + 1).to_string(),
            email: new_user.email.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        users.push(StoredUser {
            user: user.clone(),
            password: new_user.password.clone(),
        });

        Ok(user)
    }

    async fn profile(&self, token: &str) -> ApiResult<User> {
        self.check_session(token)?;

        self.users
            .lock()
            .expect("user table lock poisoned")
            .first()
            .map(|stored| stored.user.clone())
            .ok_or_else(|| ApiError::Unavailable("no user record found".to_owned()))
    }

    async fn accounts(&self, token: &str) -> ApiResult<Vec<Account>> {
        self.check_session(token)?;
        Ok(self.accounts.clone())
    }

    async fn transactions(
        &self,
        token: &str,
        account_id: Option<&str>,
    ) -> ApiResult<Vec<Transaction>> {
        self.check_session(token)?;

        let transactions = match account_id {
            Some(account_id) => self
                .transactions
                .iter()
                .filter(|transaction| transaction.account_id == account_id)
                .cloned()
                .collect(),
            None => self.transactions.clone(),
        };

        Ok(transactions)
    }

    async fn insights(&self, token: &str) -> ApiResult<Vec<Insight>> {
        self.check_session(token)?;
        Ok(self.insights.clone())
    }

    async fn exchange_public_token(&self, token: &str, public_token: &str) -> ApiResult<()> {
        self.check_session(token)?;

        if public_token.is_empty() {
            return Err(ApiError::Rejected("The public token was empty.".to_owned()));
        }

        Ok(())
    }
}

fn demo_user() -> User {
    User {
        id: "1".to_owned(),
        email: DEMO_EMAIL.to_owned(),
        first_name: "Alex".to_owned(),
        last_name: "Morgan".to_owned(),
        created_at: datetime!(2025 - 01 - 15 09:30:00).assume_offset(UtcOffset::UTC),
    }
}

fn demo_accounts() -> Vec<Account> {
    let account = |id: &str, name: &str, kind, balance| Account {
        id: id.to_owned(),
        name: name.to_owned(),
        kind,
        balance,
        currency: "USD".to_owned(),
    };

    vec![
        account("1", "Chase Total Checking", AccountKind::Checking, 5420.50),
        account("2", "Chase Savings", AccountKind::Savings, 12890.75),
        account("3", "Chase Freedom Credit Card", AccountKind::Credit, -1250.00),
        account("4", "Wells Fargo Checking", AccountKind::Checking, 2180.25),
        account("5", "Discover Credit Card", AccountKind::Credit, -650.00),
    ]
}

fn demo_transactions() -> Vec<Transaction> {
    let transaction = |id: &str, account_id: &str, amount, description: &str, category: &str, date| {
        Transaction {
            id: id.to_owned(),
            account_id: account_id.to_owned(),
            amount,
            description: description.to_owned(),
            category: category.to_owned(),
            date,
        }
    };

    use time::macros::date;

    vec![
        transaction("1", "1", -85.30, "Whole Foods Market", "Food", date!(2025 - 07 - 05)),
        transaction("2", "1", -45.00, "Shell Gas Station", "Transportation", date!(2025 - 07 - 04)),
        transaction("3", "2", 2500.00, "Salary Deposit - ABC Corp", "Income", date!(2025 - 07 - 01)),
        transaction("4", "1", -120.00, "Pacific Gas & Electric", "Bills", date!(2025 - 06 - 30)),
        transaction("5", "3", -75.50, "Olive Garden", "Food", date!(2025 - 06 - 29)),
        transaction("6", "1", -25.99, "Netflix", "Entertainment", date!(2025 - 06 - 28)),
        transaction("7", "1", -12.50, "Starbucks", "Food", date!(2025 - 06 - 27)),
        transaction("8", "2", 500.00, "Transfer from Checking", "Transfer", date!(2025 - 06 - 26)),
        transaction("9", "1", -500.00, "Transfer to Savings", "Transfer", date!(2025 - 06 - 26)),
        transaction("10", "1", -89.99, "Target", "Shopping", date!(2025 - 06 - 25)),
        transaction("11", "1", -35.00, "Uber", "Transportation", date!(2025 - 06 - 24)),
        transaction("12", "3", -150.00, "Amazon Purchase", "Shopping", date!(2025 - 06 - 23)),
        transaction("13", "1", -8.50, "Subway", "Food", date!(2025 - 06 - 22)),
        transaction("14", "1", -65.00, "Gym Membership", "Health", date!(2025 - 06 - 21)),
        transaction("15", "1", -42.30, "Chevron", "Transportation", date!(2025 - 06 - 20)),
    ]
}

fn demo_insights() -> Vec<Insight> {
    let insight = |id: &str, kind, title: &str, description: &str, actionable, priority| Insight {
        id: id.to_owned(),
        kind,
        title: title.to_owned(),
        description: description.to_owned(),
        actionable,
        priority,
    };

    vec![
        insight(
            "1",
            InsightKind::Spending,
            "High Food Spending Alert",
            "You spent $285 on food this month, which is 23% more than your \
            average. Consider meal planning or cooking at home more often to \
            reduce expenses.",
            true,
            InsightPriority::High,
        ),
        insight(
            "2",
            InsightKind::Saving,
            "Excellent Savings Progress",
            "Congratulations! You saved $500 this month, reaching 20% of your \
            income. You're on track to meet your annual savings goal.",
            false,
            InsightPriority::Low,
        ),
        insight(
            "3",
            InsightKind::Investment,
            "Investment Opportunity",
            "Your emergency fund has reached 6 months of expenses. Consider \
            investing your surplus cash in index funds or ETFs for long-term \
            growth.",
            true,
            InsightPriority::Medium,
        ),
        insight(
            "4",
            InsightKind::Spending,
            "Subscription Optimization",
            "You have 8 active subscriptions totaling $89/month. Review and \
            cancel unused subscriptions to save money.",
            true,
            InsightPriority::Medium,
        ),
        insight(
            "5",
            InsightKind::Saving,
            "Budget Category Alert",
            "You've exceeded your entertainment budget by $45 this month. \
            Consider adjusting your spending in this category.",
            true,
            InsightPriority::Medium,
        ),
    ]
}
