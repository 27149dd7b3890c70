//! Borrowed views of postings and directives stored in the account tree.
//!
//! The tree never owns directives: it keeps references into the caller's
//! directive slice. A posting is always paired with the transaction that owns
//! it, so a reader can get from a posting back to its entry without a stored
//! back-pointer.
//!
//! Entries are compared by *identity* (address), never by value. Two
//! transactions with identical contents are still two different entries.

use std::hash::{Hash, Hasher};
use std::ptr;

use lotledger_core::{
    Directive, DirectivePriority, NaiveDate, Position, Posting, SourceLocation, Transaction,
};

/// A posting together with the transaction that owns it.
#[derive(Debug, Clone, Copy)]
pub struct TxnPosting<'a> {
    /// The owning transaction
    pub txn: &'a Transaction,
    /// The posting, one of `txn.postings`
    pub posting: &'a Posting,
}

impl<'a> TxnPosting<'a> {
    /// Pair a posting with its transaction.
    #[must_use]
    pub const fn new(txn: &'a Transaction, posting: &'a Posting) -> Self {
        Self { txn, posting }
    }

    /// The date of the owning transaction.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.txn.date
    }

    /// The account the posting goes to.
    #[must_use]
    pub fn account(&self) -> &'a str {
        &self.posting.account
    }

    /// The booked position of the posting.
    #[must_use]
    pub const fn position(&self) -> &'a Position {
        &self.posting.position
    }
}

impl PartialEq for TxnPosting<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.txn, other.txn) && ptr::eq(self.posting, other.posting)
    }
}

impl Eq for TxnPosting<'_> {}

/// An item attached to an account: a posting, or a whole directive.
#[derive(Debug, Clone, Copy)]
pub enum PostingOrEntry<'a> {
    /// One leg of a transaction
    Posting(TxnPosting<'a>),
    /// A non-transaction directive (open, close, balance, note, document, pad)
    Entry(&'a Directive),
}

impl<'a> PostingOrEntry<'a> {
    /// The entry this item belongs to: the owning transaction for a posting,
    /// the directive itself otherwise.
    #[must_use]
    pub fn entry(&self) -> EntryRef<'a> {
        match self {
            Self::Posting(p) => EntryRef::Transaction(p.txn),
            Self::Entry(d) => EntryRef::from(*d),
        }
    }

    /// The date of the item's entry.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Posting(p) => p.txn.date,
            Self::Entry(d) => d.date(),
        }
    }

    /// The canonical sort key of the item's entry.
    #[must_use]
    pub fn sort_key(&self) -> (NaiveDate, DirectivePriority, &'a SourceLocation) {
        match self {
            Self::Posting(p) => (p.txn.date, DirectivePriority::Transaction, &p.txn.location),
            Self::Entry(d) => d.sort_key(),
        }
    }

    /// The posting, if this item is one.
    #[must_use]
    pub const fn as_posting(&self) -> Option<TxnPosting<'a>> {
        match self {
            Self::Posting(p) => Some(*p),
            Self::Entry(_) => None,
        }
    }

    /// The directive, if this item is not a posting.
    #[must_use]
    pub const fn as_directive(&self) -> Option<&'a Directive> {
        match self {
            Self::Posting(_) => None,
            Self::Entry(d) => Some(*d),
        }
    }

    /// The booked position, if this item is a posting.
    #[must_use]
    pub const fn position(&self) -> Option<&'a Position> {
        match self {
            Self::Posting(p) => Some(p.position()),
            Self::Entry(_) => None,
        }
    }
}

impl PartialEq for PostingOrEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Posting(a), Self::Posting(b)) => a == b,
            (Self::Entry(a), Self::Entry(b)) => ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for PostingOrEntry<'_> {}

impl<'a> From<TxnPosting<'a>> for PostingOrEntry<'a> {
    fn from(posting: TxnPosting<'a>) -> Self {
        Self::Posting(posting)
    }
}

impl<'a> From<&'a Directive> for PostingOrEntry<'a> {
    fn from(directive: &'a Directive) -> Self {
        Self::Entry(directive)
    }
}

/// Identity of an entry.
///
/// Equality and hashing use the address of the referenced record. Build it
/// with `From<&Directive>` so a transaction directive and its postings resolve
/// to the same identity.
#[derive(Debug, Clone, Copy)]
pub enum EntryRef<'a> {
    /// A transaction, reached through one of its postings
    Transaction(&'a Transaction),
    /// Any other directive
    Directive(&'a Directive),
}

impl<'a> EntryRef<'a> {
    /// The entry date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Transaction(t) => t.date,
            Self::Directive(d) => d.date(),
        }
    }

    /// Where the entry was declared.
    #[must_use]
    pub const fn location(&self) -> &'a SourceLocation {
        match self {
            Self::Transaction(t) => &t.location,
            Self::Directive(d) => d.location(),
        }
    }

    /// The transaction, if this entry is one.
    #[must_use]
    pub const fn as_transaction(&self) -> Option<&'a Transaction> {
        match self {
            Self::Transaction(t) => Some(*t),
            Self::Directive(d) => d.as_transaction(),
        }
    }

    /// The kind of entry, as a directive type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Transaction(_) => "transaction",
            Self::Directive(d) => d.type_name(),
        }
    }
}

impl<'a> From<&'a Directive> for EntryRef<'a> {
    fn from(directive: &'a Directive) -> Self {
        match directive {
            Directive::Transaction(t) => Self::Transaction(t),
            other => Self::Directive(other),
        }
    }
}

impl PartialEq for EntryRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Transaction(a), Self::Transaction(b)) => ptr::eq(*a, *b),
            (Self::Directive(a), Self::Directive(b)) => ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for EntryRef<'_> {}

impl Hash for EntryRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Transaction(t) => {
                state.write_u8(0);
                ptr::hash(*t, state);
            }
            Self::Directive(d) => {
                state.write_u8(1);
                ptr::hash(*d, state);
            }
        }
    }
}
