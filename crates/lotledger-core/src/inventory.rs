//! Inventory type representing a collection of positions keyed by lot.
//!
//! An [`Inventory`] is the balance of an account: at most one [`Position`] per
//! distinct [`Lot`]. Adding a position whose lot is already held sums the
//! quantities; a position whose quantity reaches exactly zero is removed on
//! the spot, so a stored position is never zero.
//!
//! Lot matching here is strict: no partial matching on cost fields is done.
//! Selecting which lots a reduction draws down (FIFO, LIFO, ...) is the job of
//! the booking stage that runs before the directives reach this crate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::{AddAssign, Mul, Neg};
use thiserror::Error;

use crate::intern::InternedStr;
use crate::{Amount, Lot, Position};

/// How a position was booked against an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Booking {
    /// A new lot was created.
    Created,
    /// An existing lot was reduced.
    Reduced,
    /// An existing lot was augmented.
    Augmented,
}

/// Error raised when a strict addition would leave a lot negative.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// The reduction cannot be attributed to a single lot because other lots
    /// of the same currency are held at a positive quantity.
    #[error("Ambiguous reduction of {lot}: {num_lots} other lot(s) of {currency} are held; resulting quantity would be {number}")]
    AmbiguousReduction {
        /// The lot the reduction was applied to.
        lot: Lot,
        /// The currency being reduced.
        currency: InternedStr,
        /// Number of other positive lots of the same currency.
        num_lots: usize,
        /// The quantity the lot would have been left with.
        number: Decimal,
    },
    /// The lot would be left with a negative quantity.
    #[error("Lot {lot} would go negative: {number}")]
    NegativeLot {
        /// The lot that would go negative.
        lot: Lot,
        /// The quantity the lot would have been left with.
        number: Decimal,
    },
}

impl BookingError {
    /// The lot the failing addition targeted.
    #[must_use]
    pub const fn lot(&self) -> &Lot {
        match self {
            Self::AmbiguousReduction { lot, .. } | Self::NegativeLot { lot, .. } => lot,
        }
    }
}

/// An inventory is a collection of positions with unique lots.
///
/// Equality ignores the storage order: two inventories are equal when they
/// hold the same set of `(lot, number)` pairs.
///
/// # Examples
///
/// ```
/// use lotledger_core::{Amount, Booking, Inventory, Position};
/// use rust_decimal_macros::dec;
///
/// let mut inv = Inventory::new();
/// let goog = Position::with_cost(Amount::new(dec!(10), "GOOG"), Amount::new(dec!(500), "USD"));
///
/// let (_, booking) = inv.add_position(&goog, false).unwrap();
/// assert_eq!(booking, Booking::Created);
///
/// let (pos, booking) = inv.add_position(&goog, false).unwrap();
/// assert_eq!(booking, Booking::Augmented);
/// assert_eq!(pos.number, dec!(20));
///
/// assert_eq!(inv.get_cost().get_units("USD").number, dec!(10000));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Position>", into = "Vec<Position>")]
pub struct Inventory {
    positions: Vec<Position>,
}

impl Inventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all positions, in insertion order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Check if the inventory holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.iter().all(Position::is_empty)
    }

    /// Get the number of stored positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Find the position held for an exact lot.
    #[must_use]
    pub fn get_position(&self, lot: &Lot) -> Option<&Position> {
        self.positions.iter().find(|p| &p.lot == lot)
    }

    /// Get total units of a currency, summed across all of its lots.
    #[must_use]
    pub fn units(&self, currency: &str) -> Decimal {
        self.positions
            .iter()
            .filter(|p| p.lot.currency == currency)
            .map(|p| p.number)
            .sum()
    }

    /// Get total units of a currency as an amount.
    #[must_use]
    pub fn get_units(&self, currency: &str) -> Amount {
        Amount::new(self.units(currency), currency)
    }

    /// Get all currencies held, sorted and deduplicated.
    #[must_use]
    pub fn currencies(&self) -> Vec<&str> {
        let mut currencies: Vec<&str> = self.positions.iter().map(Position::currency).collect();
        currencies.sort_unstable();
        currencies.dedup();
        currencies
    }

    /// Get the `(currency, cost-currency)` pairs held.
    #[must_use]
    pub fn currency_pairs(&self) -> BTreeSet<(InternedStr, Option<InternedStr>)> {
        self.positions.iter().map(|p| p.lot.currency_pair()).collect()
    }

    /// Add a position, matching its lot exactly.
    ///
    /// Returns the position as stored after the addition (with a zero number
    /// if the lot was closed out and removed) and how it was booked.
    ///
    /// With `allow_negative == false`, a lot may not be left at a negative
    /// quantity. The inventory is left untouched when an error is returned.
    pub fn add_position(
        &mut self,
        position: &Position,
        allow_negative: bool,
    ) -> Result<(Position, Booking), BookingError> {
        if !allow_negative {
            self.check_non_negative(position)?;
        }
        Ok(self.apply(position))
    }

    /// Add a position, allowing lots to go negative.
    pub fn add(&mut self, position: Position) {
        self.apply(&position);
    }

    /// Add using position components.
    pub fn add_amount(
        &mut self,
        units: &Amount,
        cost: Option<Amount>,
        date: Option<NaiveDate>,
        allow_negative: bool,
    ) -> Result<(Position, Booking), BookingError> {
        let mut lot = Lot::new(units.currency.clone());
        lot.cost = cost;
        lot.date = date;
        self.add_position(&Position::new(lot, units.number), allow_negative)
    }

    /// Add all the positions of another inventory to this one.
    pub fn add_inventory(&mut self, other: &Self) {
        for pos in &other.positions {
            self.apply(pos);
        }
    }

    fn check_non_negative(&self, position: &Position) -> Result<(), BookingError> {
        let current = self
            .get_position(&position.lot)
            .map_or(Decimal::ZERO, |p| p.number);
        let number = current + position.number;
        if number >= Decimal::ZERO {
            return Ok(());
        }

        let num_lots = self
            .positions
            .iter()
            .filter(|p| {
                p.lot.currency == position.lot.currency
                    && p.lot != position.lot
                    && p.number > Decimal::ZERO
            })
            .count();

        if num_lots > 0 {
            Err(BookingError::AmbiguousReduction {
                lot: position.lot.clone(),
                currency: position.lot.currency.clone(),
                num_lots,
                number,
            })
        } else {
            Err(BookingError::NegativeLot {
                lot: position.lot.clone(),
                number,
            })
        }
    }

    fn apply(&mut self, position: &Position) -> (Position, Booking) {
        let Some(idx) = self.positions.iter().position(|p| p.lot == position.lot) else {
            if !position.is_empty() {
                self.positions.push(position.clone());
            }
            return (position.clone(), Booking::Created);
        };

        let existing = &mut self.positions[idx];
        let reducing = !position.number.is_zero()
            && existing.number.is_sign_negative() != position.number.is_sign_negative();
        existing.number += position.number;
        let result = existing.clone();

        if result.is_empty() {
            self.positions.remove(idx);
        }

        let booking = if reducing {
            Booking::Reduced
        } else {
            Booking::Augmented
        };
        (result, booking)
    }

    /// Convert to an inventory of total costs.
    ///
    /// Every position held at cost becomes `number * cost` in the cost
    /// currency; positions without a cost keep their units. The result holds
    /// bare lots only.
    #[must_use]
    pub fn get_cost(&self) -> Self {
        self.positions
            .iter()
            .map(|p| Position::simple(p.cost()))
            .collect()
    }

    /// Convert to an inventory of units only, dropping all lot details.
    #[must_use]
    pub fn get_units_inventory(&self) -> Self {
        self.positions
            .iter()
            .map(|p| Position::simple(p.units()))
            .collect()
    }

    /// Merge all lots of each `(currency, cost-currency)` pair into a single
    /// lot held at the average cost.
    ///
    /// Groups whose units sum to zero are dropped.
    #[must_use]
    pub fn average(&self) -> Self {
        let mut groups: BTreeMap<(InternedStr, Option<InternedStr>), (Decimal, Decimal)> =
            BTreeMap::new();
        for pos in &self.positions {
            let (units, cost) = groups.entry(pos.lot.currency_pair()).or_default();
            *units += pos.number;
            if let Some(book) = pos.book_value() {
                *cost += book.number;
            }
        }

        let mut result = Self::new();
        for ((currency, cost_currency), (units, cost)) in groups {
            let lot = match cost_currency {
                Some(cost_currency) => match cost.checked_div(units) {
                    Some(per_unit) => Lot::new(currency).with_cost(Amount::new(per_unit, cost_currency)),
                    None => continue,
                },
                None => Lot::new(currency),
            };
            result.add(Position::new(lot, units));
        }
        result
    }

    /// True if every position is within `epsilon` of zero.
    #[must_use]
    pub fn is_small(&self, epsilon: Decimal) -> bool {
        self.positions.iter().all(|p| p.number.abs() <= epsilon)
    }

    /// True if some currency is held in both positive and negative lots.
    #[must_use]
    pub fn is_mixed(&self) -> bool {
        let mut signs: HashMap<&str, bool> = HashMap::new();
        self.positions.iter().any(|p| {
            let positive = p.number >= Decimal::ZERO;
            *signs.entry(p.currency()).or_insert(positive) != positive
        })
    }
}

impl PartialEq for Inventory {
    fn eq(&self, other: &Self) -> bool {
        let mine: Vec<&Position> = self.positions.iter().filter(|p| !p.is_empty()).collect();
        let theirs: Vec<&Position> = other.positions.iter().filter(|p| !p.is_empty()).collect();
        mine.len() == theirs.len()
            && mine
                .iter()
                .all(|p| other.get_position(&p.lot).is_some_and(|o| o.number == p.number))
    }
}

impl Eq for Inventory {}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }

        let mut sorted: Vec<&Position> = self.positions.iter().filter(|p| !p.is_empty()).collect();
        sorted.sort();
        for (i, pos) in sorted.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{pos}")?;
        }
        Ok(())
    }
}

impl FromIterator<Position> for Inventory {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut inv = Self::new();
        for pos in iter {
            inv.add(pos);
        }
        inv
    }
}

impl From<Vec<Position>> for Inventory {
    fn from(positions: Vec<Position>) -> Self {
        positions.into_iter().collect()
    }
}

impl From<Inventory> for Vec<Position> {
    fn from(inventory: Inventory) -> Self {
        inventory.positions
    }
}

impl Neg for &Inventory {
    type Output = Inventory;

    fn neg(self) -> Inventory {
        self.positions.iter().map(Position::neg).collect()
    }
}

impl Mul<Decimal> for &Inventory {
    type Output = Inventory;

    fn mul(self, scalar: Decimal) -> Inventory {
        self.positions
            .iter()
            .map(|p| Position::new(p.lot.clone(), p.number * scalar))
            .collect()
    }
}

impl AddAssign<&Self> for Inventory {
    fn add_assign(&mut self, other: &Self) {
        self.add_inventory(other);
    }
}
