//! Directive records consumed by the realization engine.
//!
//! Directives arrive fully parsed and booked: every [`Posting`] already holds a
//! complete [`Position`] (lot and signed number). The kinds that matter for
//! realization are:
//!
//! - [`Transaction`] - owns an ordered list of postings
//! - [`Open`], [`Close`], [`Balance`], [`Note`], [`Document`] - attach to one account
//! - [`Pad`] - attaches to both the padded account and its source account
//!
//! [`Commodity`], [`Event`] and [`Price`] are carried so that a complete
//! directive stream can be represented, but do not belong to any account.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{Amount, Position};

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaValue {
    /// Free text, account names and currency codes
    Text(String),
    /// A bare number
    Number(Decimal),
    /// A date
    Date(NaiveDate),
    /// A number with a currency
    Amount(Amount),
    /// A flag-like boolean
    Bool(bool),
}

impl From<&str> for MetaValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Key-value annotations on directives and postings, in key order.
pub type Metadata = BTreeMap<String, MetaValue>;

/// Where a directive was declared.
///
/// Orders by file name, then line number. Used to break ties between
/// directives of the same date and kind, and to point errors at their source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file name
    pub filename: String,
    /// 1-based line number
    pub lineno: u32,
}

impl SourceLocation {
    /// A location in `filename` at line `lineno`.
    #[must_use]
    pub fn new(filename: impl Into<String>, lineno: u32) -> Self {
        Self {
            filename: filename.into(),
            lineno,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.lineno)
    }
}

/// One leg of a transaction.
///
/// A posting is owned by its [`Transaction`]; code that needs the owner keeps
/// a borrow of the transaction next to the posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Account receiving the position
    pub account: String,
    /// The booked position (lot and signed number)
    pub position: Position,
    /// Per-unit trade price
    pub price: Option<Amount>,
    /// Posting flag (e.g. '!')
    pub flag: Option<char>,
    /// Annotations
    pub meta: Metadata,
}

impl Posting {
    /// A posting of a booked position.
    #[must_use]
    pub fn new(account: impl Into<String>, position: Position) -> Self {
        Self {
            account: account.into(),
            position,
            price: None,
            flag: None,
            meta: Metadata::new(),
        }
    }

    /// A posting of plain units, without a cost.
    #[must_use]
    pub fn simple(account: impl Into<String>, units: Amount) -> Self {
        Self::new(account, Position::simple(units))
    }

    /// A posting of units held at a per-unit cost.
    #[must_use]
    pub fn at_cost(account: impl Into<String>, units: Amount, cost: Amount) -> Self {
        Self::new(account, Position::with_cost(units, cost))
    }

    /// Attach a trade price.
    #[must_use]
    pub fn with_price(self, price: Amount) -> Self {
        Self {
            price: Some(price),
            ..self
        }
    }

    /// Attach a flag.
    #[must_use]
    pub fn with_flag(self, flag: char) -> Self {
        Self {
            flag: Some(flag),
            ..self
        }
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// The units of this posting.
    #[must_use]
    pub fn units(&self) -> Amount {
        self.position.units()
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(flag) = self.flag {
            write!(f, "{flag} ")?;
        }
        write!(f, "{}  {}", self.account, self.position)?;
        match &self.price {
            Some(price) => write!(f, " @ {price}"),
            None => Ok(()),
        }
    }
}

/// Same-day ordering of directive kinds.
///
/// Accounts open before anything uses them and close after all activity;
/// pads come before the balance assertions they satisfy. The kinds in between
/// are fully ranked too, so same-day journals order by kind before line
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DirectivePriority {
    /// `open`
    Open,
    /// `commodity`
    Commodity,
    /// `pad`
    Pad,
    /// `balance`, checked at the start of the day
    Balance,
    /// `txn`
    Transaction,
    /// `note`
    Note,
    /// `document`
    Document,
    /// `event`
    Event,
    /// `price`, at the end of the day
    Price,
    /// `close`
    Close,
}

/// Defines `Directive` with one variant per record type, named after it,
/// plus the per-kind name and priority tables.
macro_rules! directive_kinds {
    ($($(#[$doc:meta])* $kind:ident => $name:literal),* $(,)?) => {
        /// Any directive of the stream.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum Directive {
            $($(#[$doc])* $kind($kind),)*
        }

        impl Directive {
            /// The directive keyword, e.g. `"open"`.
            #[must_use]
            pub const fn type_name(&self) -> &'static str {
                match self {
                    $(Self::$kind(_) => $name,)*
                }
            }

            /// Same-day ordering rank of this kind.
            #[must_use]
            pub const fn priority(&self) -> DirectivePriority {
                match self {
                    $(Self::$kind(_) => DirectivePriority::$kind,)*
                }
            }

            /// Date of the record.
            #[must_use]
            pub const fn date(&self) -> NaiveDate {
                match self {
                    $(Self::$kind(record) => record.date,)*
                }
            }

            /// Where the record was declared.
            #[must_use]
            pub const fn location(&self) -> &SourceLocation {
                match self {
                    $(Self::$kind(record) => &record.location,)*
                }
            }

            /// Annotations of the record.
            #[must_use]
            pub const fn meta(&self) -> &Metadata {
                match self {
                    $(Self::$kind(record) => &record.meta,)*
                }
            }
        }

        $(
            impl From<$kind> for Directive {
                fn from(record: $kind) -> Self {
                    Self::$kind(record)
                }
            }
        )*
    };
}

directive_kinds! {
    /// Transfers between accounts
    Transaction => "transaction",
    /// Balance assertion
    Balance => "balance",
    /// Account opening
    Open => "open",
    /// Account closing
    Close => "close",
    /// Commodity declaration
    Commodity => "commodity",
    /// Padding request
    Pad => "pad",
    /// Life event
    Event => "event",
    /// Dated note on an account
    Note => "note",
    /// Document linked to an account
    Document => "document",
    /// Commodity price
    Price => "price",
}

impl Directive {
    /// The accounts this directive refers to.
    ///
    /// Transactions report the account of every posting in order (with
    /// repeats); a pad reports its padded account, then its source.
    #[must_use]
    pub fn account_names(&self) -> Vec<&str> {
        match self {
            Self::Transaction(txn) => txn.postings.iter().map(|p| p.account.as_str()).collect(),
            Self::Pad(pad) => vec![pad.account.as_str(), pad.source_account.as_str()],
            Self::Balance(Balance { account, .. })
            | Self::Open(Open { account, .. })
            | Self::Close(Close { account, .. })
            | Self::Note(Note { account, .. })
            | Self::Document(Document { account, .. }) => vec![account.as_str()],
            Self::Commodity(_) | Self::Event(_) | Self::Price(_) => Vec::new(),
        }
    }

    /// The transaction, if this is one.
    #[must_use]
    pub const fn as_transaction(&self) -> Option<&Transaction> {
        if let Self::Transaction(txn) = self {
            Some(txn)
        } else {
            None
        }
    }

    /// The canonical sort key: date, then kind priority, then source location.
    #[must_use]
    pub const fn sort_key(&self) -> (NaiveDate, DirectivePriority, &SourceLocation) {
        (self.date(), self.priority(), self.location())
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Self::Transaction(txn) = self {
            return write!(f, "{txn}");
        }
        write!(f, "{} {}", self.date(), self.type_name())?;
        self.account_names()
            .iter()
            .try_for_each(|account| write!(f, " {account}"))
    }
}

/// Sort directives by their canonical sort key.
///
/// The sort is stable, so directives sharing a full key keep their order.
pub fn sort_directives(directives: &mut [Directive]) {
    directives.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// A dated set of postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Entry date
    pub date: NaiveDate,
    /// `*` for cleared, `!` for pending
    pub flag: char,
    /// Counterparty
    pub payee: Option<String>,
    /// Description
    pub narration: String,
    /// Annotations
    pub meta: Metadata,
    /// Where the transaction was declared
    pub location: SourceLocation,
    /// Postings, in declaration order
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// A cleared transaction with no postings yet.
    #[must_use]
    pub fn new(date: NaiveDate, narration: impl Into<String>) -> Self {
        Self {
            date,
            flag: '*',
            payee: None,
            narration: narration.into(),
            meta: Metadata::new(),
            location: SourceLocation::default(),
            postings: Vec::new(),
        }
    }

    /// Replace the flag.
    #[must_use]
    pub fn with_flag(self, flag: char) -> Self {
        Self { flag, ..self }
    }

    /// Set the payee.
    #[must_use]
    pub fn with_payee(self, payee: impl Into<String>) -> Self {
        Self {
            payee: Some(payee.into()),
            ..self
        }
    }

    /// Append a posting.
    #[must_use]
    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.flag)?;
        if let Some(payee) = &self.payee {
            write!(f, " {payee:?}")?;
        }
        write!(f, " {:?}", self.narration)?;
        self.postings
            .iter()
            .try_for_each(|posting| write!(f, "\n  {posting}"))
    }
}

/// Implements `with_location` and `with_meta` for every record type.
macro_rules! record_builders {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $ty {
                /// Set the source location.
                #[must_use]
                pub fn with_location(self, location: SourceLocation) -> Self {
                    Self { location, ..self }
                }

                /// Attach a metadata entry.
                #[must_use]
                pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
                    self.meta.insert(key.into(), value.into());
                    self
                }
            }
        )*
    };
}

record_builders!(Transaction, Balance, Open, Close, Commodity, Pad, Event, Note, Document, Price);

/// Asserts the units of one currency held in an account at the start of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Assertion date
    pub date: NaiveDate,
    /// Account checked
    pub account: String,
    /// Expected units
    pub amount: Amount,
    /// Annotations
    pub meta: Metadata,
    /// Where the assertion was declared
    pub location: SourceLocation,
}

impl Balance {
    /// Assert that `account` holds `amount` on `date`.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            account: account.into(),
            amount,
            meta: Metadata::new(),
            location: SourceLocation::default(),
        }
    }
}

/// Opens an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Open {
    /// Opening date
    pub date: NaiveDate,
    /// Full account name
    pub account: String,
    /// Currencies the account may hold; empty means any
    pub currencies: Vec<String>,
    /// Annotations
    pub meta: Metadata,
    /// Where the account was opened
    pub location: SourceLocation,
}

impl Open {
    /// Open `account` on `date` for any currency.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            currencies: Vec::new(),
            meta: Metadata::new(),
            location: SourceLocation::default(),
        }
    }

    /// Restrict the currencies the account may hold.
    #[must_use]
    pub fn with_currencies<I, S>(self, currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            currencies: currencies.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}

/// Closes an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Close {
    /// Closing date
    pub date: NaiveDate,
    /// Full account name
    pub account: String,
    /// Annotations
    pub meta: Metadata,
    /// Where the account was closed
    pub location: SourceLocation,
}

impl Close {
    /// Close `account` on `date`.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            meta: Metadata::new(),
            location: SourceLocation::default(),
        }
    }
}

/// Declares a commodity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    /// Declaration date
    pub date: NaiveDate,
    /// Commodity code
    pub currency: String,
    /// Annotations
    pub meta: Metadata,
    /// Where the commodity was declared
    pub location: SourceLocation,
}

impl Commodity {
    /// Declare `currency` on `date`.
    #[must_use]
    pub fn new(date: NaiveDate, currency: impl Into<String>) -> Self {
        Self {
            date,
            currency: currency.into(),
            meta: Metadata::new(),
            location: SourceLocation::default(),
        }
    }
}

/// Requests that `account` be filled from `source_account` up to the next
/// balance assertion. It belongs to both accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pad {
    /// Pad date
    pub date: NaiveDate,
    /// Account to fill
    pub account: String,
    /// Account the difference is taken from
    pub source_account: String,
    /// Annotations
    pub meta: Metadata,
    /// Where the pad was declared
    pub location: SourceLocation,
}

impl Pad {
    /// Pad `account` from `source_account` on `date`.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        account: impl Into<String>,
        source_account: impl Into<String>,
    ) -> Self {
        Self {
            date,
            account: account.into(),
            source_account: source_account.into(),
            meta: Metadata::new(),
            location: SourceLocation::default(),
        }
    }
}

/// Records the value of a named variable from a date on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event date
    pub date: NaiveDate,
    /// Variable name (e.g. "location")
    pub event_type: String,
    /// New value
    pub value: String,
    /// Annotations
    pub meta: Metadata,
    /// Where the event was declared
    pub location: SourceLocation,
}

impl Event {
    /// Set `event_type` to `value` on `date`.
    #[must_use]
    pub fn new(date: NaiveDate, event_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date,
            event_type: event_type.into(),
            value: value.into(),
            meta: Metadata::new(),
            location: SourceLocation::default(),
        }
    }
}

/// A dated comment on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note date
    pub date: NaiveDate,
    /// Account commented on
    pub account: String,
    /// Comment text
    pub comment: String,
    /// Annotations
    pub meta: Metadata,
    /// Where the note was declared
    pub location: SourceLocation,
}

impl Note {
    /// Comment on `account` on `date`.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            comment: comment.into(),
            meta: Metadata::new(),
            location: SourceLocation::default(),
        }
    }
}

/// Links a file to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document date
    pub date: NaiveDate,
    /// Account the file belongs to
    pub account: String,
    /// Path to the file
    pub path: String,
    /// Annotations
    pub meta: Metadata,
    /// Where the document was declared
    pub location: SourceLocation,
}

impl Document {
    /// Link `path` to `account` on `date`.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            path: path.into(),
            meta: Metadata::new(),
            location: SourceLocation::default(),
        }
    }
}

/// The price of one unit of a commodity on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Price date
    pub date: NaiveDate,
    /// Commodity priced
    pub currency: String,
    /// Price of one unit
    pub amount: Amount,
    /// Annotations
    pub meta: Metadata,
    /// Where the price was declared
    pub location: SourceLocation,
}

impl Price {
    /// One unit of `currency` is worth `amount` on `date`.
    #[must_use]
    pub fn new(date: NaiveDate, currency: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            currency: currency.into(),
            amount,
            meta: Metadata::new(),
            location: SourceLocation::default(),
        }
    }
}
