//! The data shapes exchanged with the backend finance services.
//!
//! Field names follow the JSON documents the services emit (camelCase), so
//! these types double as the wire format for the client boundary.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

mod iso_date {
    //! Serializes a [time::Date] as a plain calendar date, e.g. "2025-07-05",
    //! matching the date strings in the transaction documents.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The profile of the account holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The unique ID assigned by the user service.
    pub id: String,
    /// The email address the user logs in with.
    pub email: String,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The kind of bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// An everyday transactional account.
    Checking,
    /// An interest bearing savings account.
    Savings,
    /// A credit card account.
    Credit,
}

impl AccountKind {
    /// A human readable label, e.g. for the chip on an account card.
    pub fn label(self) -> &'static str {
        match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
            AccountKind::Credit => "Credit",
        }
    }
}

/// A bank account and its current balance.
///
/// Credit card accounts carry a negative balance while money is owed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// The unique ID assigned by the account service.
    pub id: String,
    /// The display name, e.g. "Main Checking".
    pub name: String,
    /// What kind of account this is.
    #[serde(rename = "type")]
    pub kind: AccountKind,
    /// The current balance. Negative for credit cards with money owing.
    pub balance: f64,
    /// The ISO 4217 currency code, e.g. "USD".
    pub currency: String,
}

/// Whether a transaction took money out of an account or put money in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Money left the account.
    Debit,
    /// Money entered the account.
    Credit,
}

/// A single transaction against an account.
///
/// The signed `amount` is authoritative: negative amounts are debits and
/// non-negative amounts are credits. The services also send a redundant
/// `type` field, which is ignored on input so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The unique ID assigned by the transaction service.
    pub id: String,
    /// The ID of the account the transaction belongs to.
    pub account_id: String,
    /// The signed amount. Negative for debits, non-negative for credits.
    pub amount: f64,
    /// The merchant or a short description, e.g. "Whole Foods Market".
    pub description: String,
    /// The spending category, e.g. "Food".
    pub category: String,
    /// The calendar date the transaction happened on.
    #[serde(with = "iso_date")]
    pub date: Date,
}

impl Transaction {
    /// The debit/credit kind, derived from the sign of the amount.
    pub fn kind(&self) -> TransactionKind {
        if self.amount < 0.0 {
            TransactionKind::Debit
        } else {
            TransactionKind::Credit
        }
    }
}

/// What aspect of the user's finances an insight talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// An observation about spending habits.
    Spending,
    /// An observation about savings progress.
    Saving,
    /// A suggestion about investing.
    Investment,
}

/// How urgently an insight should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    /// Informational, no action needed.
    Low,
    /// Worth a look.
    Medium,
    /// Needs attention now.
    High,
}

impl InsightPriority {
    /// A human readable label, e.g. for the chip on an insight card.
    pub fn label(self) -> &'static str {
        match self {
            InsightPriority::Low => "Low",
            InsightPriority::Medium => "Medium",
            InsightPriority::High => "High",
        }
    }
}

/// A precomputed financial insight from the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    /// The unique ID assigned by the analysis service.
    pub id: String,
    /// What aspect of the user's finances this insight talks about.
    #[serde(rename = "type")]
    pub kind: InsightKind,
    /// A short headline, e.g. "High Dining Expenses".
    pub title: String,
    /// The full text of the insight.
    pub description: String,
    /// Whether the user can act on this insight right now.
    pub actionable: bool,
    /// How urgently the insight should be surfaced.
    pub priority: InsightPriority,
}

/// The email/password pair sent to the log-in endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// The email address the user logs in with.
    pub email: String,
    /// The plaintext password. Only ever sent to the user service.
    pub password: String,
}

/// The payload for registering a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// The email address to register with.
    pub email: String,
    /// The plaintext password. Only ever sent to the user service.
    pub password: String,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
}

/// The response from a successful log-in: a bearer token and the user it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInResponse {
    /// The bearer token for subsequent requests.
    pub token: String,
    /// The profile of the user that logged in.
    pub user: User,
}

#[cfg(test)]
mod transaction_tests {
    use time::macros::date;

    use super::{Transaction, TransactionKind};

    fn transaction(amount: f64) -> Transaction {
        Transaction {
            id: "1".to_owned(),
            account_id: "1".to_owned(),
            amount,
            description: "Whole Foods Market".to_owned(),
            category: "Food".to_owned(),
            date: date!(2025 - 07 - 05),
        }
    }

    #[test]
    fn negative_amount_is_debit() {
        assert_eq!(transaction(-85.30).kind(), TransactionKind::Debit);
    }

    #[test]
    fn positive_amount_is_credit() {
        assert_eq!(transaction(2500.00).kind(), TransactionKind::Credit);
    }

    #[test]
    fn zero_amount_is_credit() {
        assert_eq!(transaction(0.0).kind(), TransactionKind::Credit);
    }

    #[test]
    fn deserialises_wire_document() {
        let document = r#"{
            "id": "1",
            "accountId": "1",
            "amount": -85.30,
            "description": "Whole Foods Market",
            "category": "Food",
            "date": "2025-07-05",
            "type": "debit"
        }"#;

        let got: Transaction = serde_json::from_str(document).unwrap();

        assert_eq!(got, transaction(-85.30));
    }

    #[test]
    fn serialises_date_as_calendar_date() {
        let json = serde_json::to_string(&transaction(-85.30)).unwrap();

        assert!(
            json.contains(r#""date":"2025-07-05""#),
            "expected plain calendar date in {json}"
        );
    }
}
