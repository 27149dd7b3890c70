//! Core types for lotledger
//!
//! This crate provides the value types the realization engine works with:
//!
//! - [`Amount`] - A decimal number with a currency
//! - [`Lot`] - The cost-basis identity of a holding
//! - [`Position`] - A signed number of units in a lot
//! - [`Inventory`] - A collection of positions keyed by lot
//! - [`AccountConfig`] / [`AccountTypes`] - Account-name splitting and classification
//! - [`Directive`] - Directive records (Transaction, Balance, Open, Pad, ...)
//!
//! # Example
//!
//! ```
//! use lotledger_core::{Amount, Booking, Inventory, Lot, Position};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let mut inv = Inventory::new();
//!
//! // Buy 10 shares at 150 USD
//! let lot = Lot::new("AAPL")
//!     .with_cost(Amount::new(dec!(150.00), "USD"))
//!     .with_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
//! inv.add_position(&Position::new(lot.clone(), dec!(10)), false).unwrap();
//!
//! // Sell 4 of them out of the same lot
//! let (pos, booking) = inv.add_position(&Position::new(lot, dec!(-4)), false).unwrap();
//! assert_eq!(booking, Booking::Reduced);
//! assert_eq!(pos.number, dec!(6));
//! assert_eq!(inv.get_cost().units("USD"), dec!(900.00));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod amount;
pub mod directive;
pub mod intern;
pub mod inventory;
pub mod lot;
pub mod position;

pub use account::{AccountConfig, AccountType, AccountTypes, DEFAULT_SEPARATOR};
pub use amount::Amount;
pub use directive::{
    sort_directives, Balance, Close, Commodity, Directive, DirectivePriority, Document, Event,
    MetaValue, Metadata, Note, Open, Pad, Posting, Price, SourceLocation, Transaction,
};
pub use intern::InternedStr;
pub use inventory::{Booking, BookingError, Inventory};
pub use lot::Lot;
pub use position::Position;

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
