//! Lot type identifying a cost-basis bucket of a commodity.
//!
//! A [`Lot`] is the key under which an [`Inventory`](crate::Inventory) stores
//! positions: the commodity being held plus the optional cost-basis fields
//! (per-unit cost, acquisition date and label). Two positions belong to the
//! same lot only if all four fields are equal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::intern::InternedStr;
use crate::Amount;

/// The identity of a holding.
///
/// When you buy 10 shares of GOOG at 500 USD on 2014-02-01, the lot is:
/// - currency: "GOOG"
/// - cost: Some(500 USD)
/// - date: Some(2014-02-01)
/// - label: None
///
/// Cash has a bare lot with only a currency.
///
/// # Examples
///
/// ```
/// use lotledger_core::{Amount, Lot};
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let cash = Lot::new("USD");
/// assert!(!cash.has_cost());
///
/// let lot = Lot::new("GOOG")
///     .with_cost(Amount::new(dec!(500), "USD"))
///     .with_date(NaiveDate::from_ymd_opt(2014, 2, 1).unwrap());
/// assert_eq!(lot.cost_currency(), Some("USD"));
/// assert_ne!(lot, Lot::new("GOOG").with_cost(Amount::new(dec!(500), "USD")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lot {
    /// The commodity held (e.g. "GOOG" or "USD")
    pub currency: InternedStr,
    /// Per-unit cost, if held at cost
    pub cost: Option<Amount>,
    /// Acquisition date
    pub date: Option<NaiveDate>,
    /// Explicit lot label
    pub label: Option<String>,
}

impl Lot {
    /// Create a bare lot for a currency, without any cost basis.
    #[must_use]
    pub fn new(currency: impl Into<InternedStr>) -> Self {
        Self {
            currency: currency.into(),
            cost: None,
            date: None,
            label: None,
        }
    }

    /// Set the per-unit cost.
    #[must_use]
    pub fn with_cost(mut self, cost: Amount) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Set the acquisition date.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the lot label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// True if the lot carries a per-unit cost.
    #[must_use]
    pub const fn has_cost(&self) -> bool {
        self.cost.is_some()
    }

    /// True if any of the cost-basis fields is set.
    ///
    /// Bare lots (plain currency holdings) return `false`.
    #[must_use]
    pub const fn is_booked(&self) -> bool {
        self.cost.is_some() || self.date.is_some() || self.label.is_some()
    }

    /// The currency the cost is expressed in, if any.
    #[must_use]
    pub fn cost_currency(&self) -> Option<&str> {
        self.cost.as_ref().map(|c| c.currency.as_str())
    }

    /// The `(currency, cost-currency)` pair used to group lots of a commodity.
    #[must_use]
    pub fn currency_pair(&self) -> (InternedStr, Option<InternedStr>) {
        (
            self.currency.clone(),
            self.cost.as_ref().map(|c| c.currency.clone()),
        )
    }
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.currency)?;
        if !self.is_booked() {
            return Ok(());
        }
        let mut parts = Vec::new();
        if let Some(cost) = &self.cost {
            parts.push(cost.to_string());
        }
        if let Some(date) = self.date {
            parts.push(date.to_string());
        }
        if let Some(label) = &self.label {
            parts.push(format!("\"{label}\""));
        }
        write!(f, " {{{}}}", parts.join(", "))
    }
}
