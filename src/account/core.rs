//! Pure aggregation over the accounts returned by the backend: the asset and
//! debt totals and how each balance should be presented.

use crate::api::models::{Account, AccountKind};

/// The summary figures shown at the top of the accounts page.
#[derive(Debug, Default, PartialEq)]
pub struct AccountTotals {
    /// The sum of balances across checking and savings accounts.
    pub assets: f64,
    /// How much is owed across credit accounts, as a positive number.
    pub debt: f64,
    /// How many checking and savings accounts contributed to `assets`.
    pub asset_account_count: usize,
    /// How many credit accounts there are.
    pub credit_account_count: usize,
}

/// Compute the asset and debt totals.
///
/// Assets sum every non-credit balance as-is. Debt only counts negative
/// credit balances: a credit account that is paid off (or in credit) owes
/// nothing, it does not offset debt on other cards.
pub fn summarize_accounts(accounts: &[Account]) -> AccountTotals {
    let mut totals = AccountTotals::default();

    for account in accounts {
        if account.kind == AccountKind::Credit {
            totals.credit_account_count += 1;
            totals.debt += -account.balance.min(0.0);
        } else {
            totals.asset_account_count += 1;
            totals.assets += account.balance;
        }
    }

    totals
}

/// How an account balance should be coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceTone {
    /// Green: money available, or a paid-off credit account.
    Positive,
    /// Amber: an outstanding credit balance.
    Warning,
    /// Red: an overdrawn checking or savings account.
    Negative,
}

pub fn balance_tone(account: &Account) -> BalanceTone {
    if account.kind == AccountKind::Credit {
        if account.balance < 0.0 {
            BalanceTone::Warning
        } else {
            BalanceTone::Positive
        }
    } else if account.balance >= 0.0 {
        BalanceTone::Positive
    } else {
        BalanceTone::Negative
    }
}

/// The amount to show on an account card.
///
/// Credit accounts show what is owed as a positive figure, with zero for a
/// paid-off card. Other accounts show the balance unchanged.
pub fn display_balance(account: &Account) -> f64 {
    if account.kind == AccountKind::Credit {
        -account.balance.min(0.0)
    } else {
        account.balance
    }
}

/// The label above the amount on an account card.
pub fn balance_label(account: &Account) -> &'static str {
    if account.kind == AccountKind::Credit {
        "Outstanding Balance"
    } else {
        "Available Balance"
    }
}

#[cfg(test)]
mod account_totals_tests {
    use crate::api::models::{Account, AccountKind};

    use super::{AccountTotals, BalanceTone, balance_tone, display_balance, summarize_accounts};

    fn account(id: u32, kind: AccountKind, balance: f64) -> Account {
        Account {
            id: id.to_string(),
            name: format!("Account {id}"),
            kind,
            balance,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn sums_assets_across_non_credit_accounts() {
        let accounts = [
            account(1, AccountKind::Checking, 5420.50),
            account(2, AccountKind::Savings, 12890.75),
            account(3, AccountKind::Credit, -1250.00),
        ];

        let totals = summarize_accounts(&accounts);

        assert_eq!(totals.assets, 5420.50 + 12890.75);
        assert_eq!(totals.asset_account_count, 2);
    }

    #[test]
    fn debt_is_a_positive_figure() {
        let accounts = [
            account(1, AccountKind::Credit, -1250.00),
            account(2, AccountKind::Credit, -650.00),
        ];

        let totals = summarize_accounts(&accounts);

        assert_eq!(totals.debt, 1900.00);
        assert_eq!(totals.credit_account_count, 2);
    }

    #[test]
    fn paid_off_credit_account_does_not_offset_debt() {
        let accounts = [
            account(1, AccountKind::Credit, -650.00),
            account(2, AccountKind::Credit, 200.00),
        ];

        let totals = summarize_accounts(&accounts);

        assert_eq!(totals.debt, 650.00);
        assert_eq!(totals.credit_account_count, 2);
    }

    #[test]
    fn no_accounts_means_zero_totals() {
        assert_eq!(summarize_accounts(&[]), AccountTotals::default());
    }

    #[test]
    fn overdrawn_checking_account_reduces_assets() {
        let accounts = [
            account(1, AccountKind::Checking, 100.00),
            account(2, AccountKind::Checking, -40.00),
        ];

        let totals = summarize_accounts(&accounts);

        assert_eq!(totals.assets, 60.00);
    }

    #[test]
    fn balance_tone_follows_account_kind() {
        let cases = [
            (account(1, AccountKind::Checking, 100.0), BalanceTone::Positive),
            (account(2, AccountKind::Checking, 0.0), BalanceTone::Positive),
            (account(3, AccountKind::Savings, -5.0), BalanceTone::Negative),
            (account(4, AccountKind::Credit, -650.0), BalanceTone::Warning),
            (account(5, AccountKind::Credit, 0.0), BalanceTone::Positive),
        ];

        for (account, want) in cases {
            assert_eq!(
                balance_tone(&account),
                want,
                "wrong tone for {} with balance {}",
                account.name,
                account.balance
            );
        }
    }

    #[test]
    fn credit_accounts_display_what_is_owed() {
        assert_eq!(display_balance(&account(1, AccountKind::Credit, -650.0)), 650.0);
        assert_eq!(display_balance(&account(2, AccountKind::Credit, 100.0)), 0.0);
        assert_eq!(display_balance(&account(3, AccountKind::Checking, 42.0)), 42.0);
    }
}
