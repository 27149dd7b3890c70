//! Realization options.

use lotledger_core::{AccountConfig, AccountTypes};
use serde::{Deserialize, Serialize};

/// Options for [`realize_with_options`](crate::realize_with_options).
///
/// Deserializes from a partial document: missing fields take their defaults.
///
/// ```
/// use lotledger_core::AccountTypes;
/// use lotledger_realization::RealizeOptions;
///
/// let options = RealizeOptions::default()
///     .with_account_types(&AccountTypes::default())
///     .with_allow_negative(false);
/// assert_eq!(options.min_accounts.len(), 5);
/// assert_eq!(options.accounts.separator, ":");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealizeOptions {
    /// How account names are split into tree paths.
    pub accounts: AccountConfig,
    /// Accounts created even when nothing posts to them.
    pub min_accounts: Vec<String>,
    /// Let account balances go negative.
    ///
    /// When false, postings that would leave a lot negative are left out of
    /// the balance and reported in [`Realization::errors`](crate::Realization::errors).
    pub allow_negative: bool,
}

impl Default for RealizeOptions {
    fn default() -> Self {
        Self {
            accounts: AccountConfig::default(),
            min_accounts: Vec::new(),
            allow_negative: true,
        }
    }
}

impl RealizeOptions {
    /// Use a custom account separator.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.accounts = AccountConfig::with_separator(separator);
        self
    }

    /// Add accounts that must exist after realization.
    #[must_use]
    pub fn with_min_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.min_accounts.extend(accounts.into_iter().map(Into::into));
        self
    }

    /// Require the root account of every account type.
    #[must_use]
    pub fn with_account_types(self, types: &AccountTypes) -> Self {
        self.with_min_accounts(types.roots())
    }

    /// Set whether balances may go negative.
    #[must_use]
    pub const fn with_allow_negative(mut self, allow_negative: bool) -> Self {
        self.allow_negative = allow_negative;
        self
    }
}
