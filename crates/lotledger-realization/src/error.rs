//! Errors raised while building or walking the account tree.

use lotledger_core::{BookingError, NaiveDate, SourceLocation};
use thiserror::Error;

/// Contract violations that abort a realization call.
///
/// Booking problems are not in here: they depend on the data, and are
/// collected in [`Realization::errors`](crate::Realization::errors) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealizeError {
    /// An account name is empty or has an empty segment.
    #[error("invalid account name {account:?}")]
    InvalidAccountName {
        /// The offending name.
        account: String,
    },

    /// A child node does not fit under the key it was inserted with.
    #[error("cannot insert account {account:?} under key {key:?}: {reason}")]
    TreeConsistency {
        /// The key the child was inserted under.
        key: String,
        /// The child's full account name.
        account: String,
        /// What is wrong with the pair.
        reason: &'static str,
    },

    /// A balance iteration met an entry dated before the previous one.
    #[error("invalid date order at {location}: {date} comes after {previous}")]
    OrderingViolation {
        /// Date of the offending entry.
        date: NaiveDate,
        /// Date of the entries before it.
        previous: NaiveDate,
        /// Where the offending entry was declared.
        location: SourceLocation,
    },
}

/// A posting refused while summing an account's balance in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {account}: {source}")]
pub struct PostingBookingError {
    /// The account whose balance refused the posting.
    pub account: String,
    /// Where the posting's transaction was declared.
    pub location: SourceLocation,
    /// Why the posting was refused.
    #[source]
    pub source: BookingError,
}

impl RealizeError {
    pub(crate) fn invalid_account(account: &str) -> Self {
        Self::InvalidAccountName {
            account: account.to_string(),
        }
    }
}
