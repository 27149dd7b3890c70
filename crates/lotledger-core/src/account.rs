//! Account-name helpers.
//!
//! Account names are separator-delimited paths such as `Assets:Bank:Checking`.
//! The separator is not global: it lives in an [`AccountConfig`] that callers
//! pass to every operation that splits or joins names.

use serde::{Deserialize, Serialize};

/// Default path-segment separator.
pub const DEFAULT_SEPARATOR: &str = ":";

/// Configuration for splitting and joining account names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Path-segment separator (`:` by default)
    pub separator: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl AccountConfig {
    /// Create a configuration with a custom separator.
    #[must_use]
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Split an account name into its segments.
    ///
    /// The empty name (the root) has no segments.
    #[must_use]
    pub fn split<'a>(&self, account: &'a str) -> Vec<&'a str> {
        if account.is_empty() {
            return Vec::new();
        }
        account.split(self.separator.as_str()).collect()
    }

    /// Join segments into an account name.
    #[must_use]
    pub fn join<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut name = String::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                name.push_str(&self.separator);
            }
            name.push_str(part.as_ref());
        }
        name
    }

    /// The name of the parent account, or `None` for a top-level account
    /// and for the root.
    #[must_use]
    pub fn parent<'a>(&self, account: &'a str) -> Option<&'a str> {
        account
            .rfind(self.separator.as_str())
            .map(|idx| &account[..idx])
    }

    /// The last segment of an account name.
    #[must_use]
    pub fn leaf<'a>(&self, account: &'a str) -> &'a str {
        account
            .rfind(self.separator.as_str())
            .map_or(account, |idx| &account[idx + self.separator.len()..])
    }

    /// True if `account` is a non-empty path with no empty segment.
    #[must_use]
    pub fn is_valid(&self, account: &str) -> bool {
        !self.separator.is_empty()
            && !account.is_empty()
            && account.split(self.separator.as_str()).all(|s| !s.is_empty())
    }

    /// True if `segment` can name a single node: non-empty and free of the
    /// separator.
    #[must_use]
    pub fn is_valid_segment(&self, segment: &str) -> bool {
        !segment.is_empty() && !segment.contains(self.separator.as_str())
    }
}

/// The five kinds of account root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountType {
    /// Things owned
    Assets,
    /// Things owed
    Liabilities,
    /// Net worth
    Equity,
    /// Inflows
    Income,
    /// Outflows
    Expenses,
}

impl AccountType {
    /// True for accounts reported on the balance sheet.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Assets | Self::Liabilities | Self::Equity)
    }

    /// True for accounts reported on the income statement.
    #[must_use]
    pub const fn is_income_statement(self) -> bool {
        matches!(self, Self::Income | Self::Expenses)
    }
}

/// Names of the root account of each [`AccountType`].
///
/// Defaults to the English names; ledgers may rename them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountTypes {
    /// Root for assets
    pub assets: String,
    /// Root for liabilities
    pub liabilities: String,
    /// Root for equity
    pub equity: String,
    /// Root for income
    pub income: String,
    /// Root for expenses
    pub expenses: String,
}

impl Default for AccountTypes {
    fn default() -> Self {
        Self {
            assets: "Assets".to_string(),
            liabilities: "Liabilities".to_string(),
            equity: "Equity".to_string(),
            income: "Income".to_string(),
            expenses: "Expenses".to_string(),
        }
    }
}

impl AccountTypes {
    /// The root names, in balance-sheet then income-statement order.
    ///
    /// This is the usual set of accounts that must exist after realization.
    #[must_use]
    pub fn roots(&self) -> Vec<&str> {
        vec![
            self.assets.as_str(),
            self.liabilities.as_str(),
            self.equity.as_str(),
            self.income.as_str(),
            self.expenses.as_str(),
        ]
    }

    /// Classify an account by its first segment.
    #[must_use]
    pub fn account_type(&self, config: &AccountConfig, account: &str) -> Option<AccountType> {
        let root = config.split(account).into_iter().next()?;
        [
            (&self.assets, AccountType::Assets),
            (&self.liabilities, AccountType::Liabilities),
            (&self.equity, AccountType::Equity),
            (&self.income, AccountType::Income),
            (&self.expenses, AccountType::Expenses),
        ]
        .into_iter()
        .find(|(name, _)| name.as_str() == root)
        .map(|(_, kind)| kind)
    }

    /// True if the account is an asset, liability or equity account.
    #[must_use]
    pub fn is_balance_sheet_account(&self, config: &AccountConfig, account: &str) -> bool {
        self.account_type(config, account)
            .is_some_and(AccountType::is_balance_sheet)
    }

    /// True if the account is an income or expense account.
    #[must_use]
    pub fn is_income_statement_account(&self, config: &AccountConfig, account: &str) -> bool {
        self.account_type(config, account)
            .is_some_and(AccountType::is_income_statement)
    }
}
