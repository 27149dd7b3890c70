//! Amount type representing a decimal number with a currency.
//!
//! An [`Amount`] is the unit of value everywhere in the engine. Numbers are
//! exact decimals; currency codes are opaque strings compared by equality.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::intern::InternedStr;

/// A quantity paired with a currency.
///
/// Amounts order by currency first and number second, which is the order
/// used to render lists of amounts deterministically.
///
/// Binary arithmetic requires both sides to carry the same currency; this is
/// checked in debug builds only.
///
/// ```
/// use lotledger_core::Amount;
/// use rust_decimal_macros::dec;
///
/// let price = Amount::new(dec!(512.25), "USD");
/// let fee = Amount::new(dec!(9.95), "USD");
/// assert_eq!((&price + &fee).number, dec!(522.20));
/// assert_eq!((&price * dec!(4)).to_string(), "2049.00 USD");
///
/// let mut sorted = vec![price.clone(), Amount::new(dec!(1), "CAD")];
/// sorted.sort();
/// assert_eq!(sorted[0].currency, "CAD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// The decimal quantity
    pub number: Decimal,
    /// Currency or commodity code
    pub currency: InternedStr,
}

impl Amount {
    /// Pair a number with a currency.
    #[must_use]
    pub fn new(number: Decimal, currency: impl Into<InternedStr>) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }

    /// Zero units of `currency`.
    #[must_use]
    pub fn zero(currency: impl Into<InternedStr>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Same currency, different number.
    #[must_use]
    pub fn with_number(&self, number: Decimal) -> Self {
        Self::new(number, self.currency.clone())
    }

    /// True if the number is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.number.is_zero()
    }

    /// True if the number is above zero.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        !self.number.is_zero() && self.number.is_sign_positive()
    }

    /// True if the number is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        !self.number.is_zero() && self.number.is_sign_negative()
    }

    /// The amount with its sign dropped.
    #[must_use]
    pub fn abs(&self) -> Self {
        self.with_number(self.number.abs())
    }

    fn check_currency(&self, other: &Self, op: &str) {
        debug_assert!(
            self.currency == other.currency,
            "{op} of {self} and {other}: currency mismatch"
        );
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.currency, self.number).cmp(&(&other.currency, other.number))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}

impl Add for &Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        self.check_currency(rhs, "sum");
        self.with_number(self.number + rhs.number)
    }
}

impl Sub for &Amount {
    type Output = Amount;

    fn sub(self, rhs: &Amount) -> Amount {
        self.check_currency(rhs, "difference");
        self.with_number(self.number - rhs.number)
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        self.with_number(-self.number)
    }
}

impl Mul<Decimal> for &Amount {
    type Output = Amount;

    fn mul(self, factor: Decimal) -> Amount {
        self.with_number(self.number * factor)
    }
}

impl AddAssign<&Self> for Amount {
    fn add_assign(&mut self, rhs: &Self) {
        self.check_currency(rhs, "sum");
        self.number += rhs.number;
    }
}

impl SubAssign<&Self> for Amount {
    fn sub_assign(&mut self, rhs: &Self) {
        self.check_currency(rhs, "difference");
        self.number -= rhs.number;
    }
}

// Owned operands forward to the reference impls.
macro_rules! forward_owned_binop {
    ($($trait:ident :: $method:ident),*) => {$(
        impl $trait for Amount {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                $trait::$method(&self, &rhs)
            }
        }
    )*};
}

forward_owned_binop!(Add::add, Sub::sub);

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

impl Mul<Decimal> for Amount {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        &self * factor
    }
}
