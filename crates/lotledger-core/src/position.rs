//! Position type representing a signed quantity of a lot.
//!
//! A [`Position`] pairs a [`Lot`] with a number of units. Positions with a
//! cost-bearing lot track investments; positions with a bare lot are plain
//! currency holdings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, Lot};

/// A number of units held in a lot.
///
/// # Examples
///
/// ```
/// use lotledger_core::{Amount, Position};
/// use rust_decimal_macros::dec;
///
/// let cash = Position::simple(Amount::new(dec!(-100), "USD"));
/// assert_eq!(cash.units(), Amount::new(dec!(-100), "USD"));
///
/// let stock = Position::with_cost(
///     Amount::new(dec!(10), "GOOG"),
///     Amount::new(dec!(500), "USD"),
/// );
/// assert_eq!(stock.cost(), Amount::new(dec!(5000), "USD"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// The lot this quantity belongs to
    pub lot: Lot,
    /// Signed number of units
    pub number: Decimal,
}

impl Position {
    /// Create a position from a lot and a number of units.
    #[must_use]
    pub const fn new(lot: Lot, number: Decimal) -> Self {
        Self { lot, number }
    }

    /// Create a position in a bare lot (no cost basis).
    #[must_use]
    pub fn simple(units: Amount) -> Self {
        Self::new(Lot::new(units.currency), units.number)
    }

    /// Create a position held at a per-unit cost.
    #[must_use]
    pub fn with_cost(units: Amount, cost: Amount) -> Self {
        Self::new(Lot::new(units.currency).with_cost(cost), units.number)
    }

    /// Check if this position holds zero units.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.number.is_zero()
    }

    /// Get the currency of this position's units.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.lot.currency
    }

    /// Get the cost currency, if this position is held at cost.
    #[must_use]
    pub fn cost_currency(&self) -> Option<&str> {
        self.lot.cost_currency()
    }

    /// The units of this position as an amount.
    #[must_use]
    pub fn units(&self) -> Amount {
        Amount::new(self.number, self.lot.currency.clone())
    }

    /// The total cost of this position.
    ///
    /// Positions without a cost are valued at their units.
    #[must_use]
    pub fn cost(&self) -> Amount {
        self.book_value().unwrap_or_else(|| self.units())
    }

    /// The total cost of this position, or `None` if it has no cost.
    #[must_use]
    pub fn book_value(&self) -> Option<Amount> {
        self.lot
            .cost
            .as_ref()
            .map(|c| Amount::new(self.number * c.number, c.currency.clone()))
    }

    /// Negate this position (reverse the sign of units).
    #[must_use]
    pub fn neg(&self) -> Self {
        Self::new(self.lot.clone(), -self.number)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.lot)
    }
}
