//! Realization of a directive stream into an account tree.
//!
//! This crate provides:
//! - Grouping postings and account directives by account
//! - The [`RealAccount`] tree, with per-account postings and balances
//! - Tree queries: lookup, depth-first iteration, filtering, subtree totals
//! - Running-balance iteration for journal reports
//!
//! # Realization
//!
//! ```
//! use lotledger_core::{AccountConfig, Amount, Directive, NaiveDate, Open, Posting, Transaction};
//! use lotledger_realization::{compute_balance, get, iter_depth_first, realize};
//! use rust_decimal_macros::dec;
//!
//! let date = NaiveDate::from_ymd_opt(2014, 2, 22).unwrap();
//! let entries = vec![
//!     Directive::Open(Open::new(date, "Assets:Bank:Checking")),
//!     Directive::Transaction(
//!         Transaction::new(date, "paycheck")
//!             .with_posting(Posting::simple("Assets:Bank:Checking", Amount::new(dec!(1000), "USD")))
//!             .with_posting(Posting::simple("Income:Salary", Amount::new(dec!(-1000), "USD"))),
//!     ),
//! ];
//!
//! let root = realize(&entries, &[]).unwrap();
//! let names: Vec<_> = iter_depth_first(&root, true).map(|a| a.account()).collect();
//! assert_eq!(names, vec!["Assets:Bank:Checking", "Income:Salary"]);
//!
//! let assets = get(&root, &AccountConfig::default(), "Assets").unwrap();
//! assert_eq!(compute_balance(assets).units("USD"), dec!(1000));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod balance;
mod entry;
mod error;
mod group;
mod options;
mod realize;
mod tree;

pub use balance::{iterate_with_balance, BalanceIter, BalanceRow};
pub use entry::{EntryRef, PostingOrEntry, TxnPosting};
pub use error::{PostingBookingError, RealizeError};
pub use group::{group_by_account, AccountGroups};
pub use options::RealizeOptions;
pub use realize::{
    compare_realizations, compute_balance, compute_postings_balance,
    compute_postings_balance_strict, compute_total_balance, find_last_active_posting,
    get_postings, realize, realize_with_options, Realization,
};
pub use tree::{
    contains, filter_tree, get, get_or_create, insert_child, iter_depth_first, DepthFirst,
    RealAccount,
};
