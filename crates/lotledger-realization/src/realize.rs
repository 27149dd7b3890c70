//! Building the account tree from a directive stream, and subtree queries.

use std::collections::BTreeSet;
use std::sync::Arc;

use lotledger_core::{AccountConfig, Directive, Inventory};
use tracing::{debug, instrument, warn};

use crate::entry::PostingOrEntry;
use crate::error::{PostingBookingError, RealizeError};
use crate::group::group_by_account;
use crate::options::RealizeOptions;
use crate::tree::{get, get_or_create, iter_depth_first, RealAccount};

/// The result of [`realize_with_options`].
#[derive(Debug, Clone)]
pub struct Realization<'a> {
    /// Root of the account tree (account name `""`).
    pub root: RealAccount<'a>,
    /// Booking errors met while summing balances in strict mode, grouped by
    /// account in name order. The offending postings are left out of their
    /// account's balance.
    pub errors: Vec<PostingBookingError>,
}

impl Realization<'_> {
    /// True if no booking error was collected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Build the account tree for `entries`.
///
/// Every account with at least one posting or account directive gets a node
/// holding those items (in input order) and the sum of its postings. Each
/// name in `min_accounts` is created even if nothing refers to it. No other
/// node is created besides the intermediate ones along those paths.
///
/// Balances are summed with negative lots allowed.
///
/// ```
/// use lotledger_core::{Amount, Directive, NaiveDate, Posting, Transaction};
/// use lotledger_realization::{get, realize};
/// use lotledger_core::AccountConfig;
/// use rust_decimal_macros::dec;
///
/// let entries = vec![Directive::Transaction(
///     Transaction::new(NaiveDate::from_ymd_opt(2014, 2, 22).unwrap(), "food")
///         .with_posting(Posting::simple("Assets:Checking", Amount::new(dec!(-100), "USD")))
///         .with_posting(Posting::simple("Expenses:Food", Amount::new(dec!(100), "USD"))),
/// )];
///
/// let root = realize(&entries, &["Equity"]).unwrap();
/// let config = AccountConfig::default();
/// let checking = get(&root, &config, "Assets:Checking").unwrap();
/// assert_eq!(checking.balance().units("USD"), dec!(-100));
/// assert!(get(&root, &config, "Equity").is_some());
/// ```
pub fn realize<'a>(
    entries: &'a [Directive],
    min_accounts: &[&str],
) -> Result<RealAccount<'a>, RealizeError> {
    let options = RealizeOptions::default().with_min_accounts(min_accounts.iter().copied());
    realize_with_options(entries, &options).map(|realization| realization.root)
}

/// Build the account tree for `entries` with explicit options.
///
/// Malformed account names abort the call. With `allow_negative` off, each
/// posting that would leave a lot negative is skipped in the balance and its
/// error collected; the tree is still built.
#[instrument(skip_all, fields(entries = entries.len(), allow_negative = options.allow_negative))]
pub fn realize_with_options<'a>(
    entries: &'a [Directive],
    options: &RealizeOptions,
) -> Result<Realization<'a>, RealizeError> {
    let groups = group_by_account(entries);
    let mut root = RealAccount::new("");
    let mut errors = Vec::new();

    for (account, postings) in groups {
        let balance = if options.allow_negative {
            compute_postings_balance(&postings)
        } else {
            let (balance, account_errors) = compute_postings_balance_strict(&postings);
            for error in &account_errors {
                warn!(account, location = %error.location, error = %error.source, "booking error");
            }
            errors.extend(account_errors);
            balance
        };

        let node = get_or_create(&mut root, &options.accounts, account)?;
        node.postings = Arc::new(postings);
        node.balance = Arc::new(balance);
    }

    for account in &options.min_accounts {
        get_or_create(&mut root, &options.accounts, account)?;
    }

    debug!(
        accounts = iter_depth_first(&root, false).count() - 1,
        errors = errors.len(),
        "realized accounts"
    );
    Ok(Realization { root, errors })
}

/// Sum the positions of the postings in `postings`, allowing negative lots.
/// Directives are skipped.
#[must_use]
pub fn compute_postings_balance(postings: &[PostingOrEntry<'_>]) -> Inventory {
    postings
        .iter()
        .filter_map(PostingOrEntry::position)
        .cloned()
        .collect()
}

/// Sum the positions of the postings in `postings`, refusing negative lots.
///
/// Postings that fail are left out of the sum; their errors are returned in
/// input order.
#[must_use]
pub fn compute_postings_balance_strict(
    postings: &[PostingOrEntry<'_>],
) -> (Inventory, Vec<PostingBookingError>) {
    let mut balance = Inventory::new();
    let mut errors = Vec::new();
    for posting in postings.iter().filter_map(PostingOrEntry::as_posting) {
        if let Err(source) = balance.add_position(posting.position(), false) {
            errors.push(PostingBookingError {
                account: posting.account().to_string(),
                location: posting.txn.location.clone(),
                source,
            });
        }
    }
    (balance, errors)
}

/// Total balance of `node` and all of its descendants.
#[must_use]
pub fn compute_balance(node: &RealAccount<'_>) -> Inventory {
    let mut total = Inventory::new();
    for account in iter_depth_first(node, false) {
        total.add_inventory(account.balance());
    }
    total
}

/// Sum of every transaction posting in `entries`.
///
/// For a ledger of balanced transactions the units of each cost currency sum
/// to zero.
#[must_use]
pub fn compute_total_balance(entries: &[Directive]) -> Inventory {
    entries
        .iter()
        .filter_map(Directive::as_transaction)
        .flat_map(|txn| txn.postings.iter().map(|p| p.position.clone()))
        .collect()
}

/// Postings and directives of `node` and all its descendants, sorted by date,
/// kind priority and source location. Items with equal keys keep tree order.
///
/// Same-day items follow the full [`DirectivePriority`] ranking, so a pad
/// sorts before a balance assertion and a transaction before a note even when
/// the later kind was declared first. A ranking of only open, then balance,
/// then everything else, then close, would order those by line instead.
///
/// [`DirectivePriority`]: lotledger_core::DirectivePriority
#[must_use]
pub fn get_postings<'a>(node: &RealAccount<'a>) -> Vec<PostingOrEntry<'a>> {
    let mut postings: Vec<PostingOrEntry<'a>> = iter_depth_first(node, false)
        .flat_map(|account| account.postings().iter().copied())
        .collect();
    postings.sort_by_key(PostingOrEntry::sort_key);
    postings
}

/// The last item that is neither an open nor a close directive.
#[must_use]
pub fn find_last_active_posting<'a>(postings: &[PostingOrEntry<'a>]) -> Option<PostingOrEntry<'a>> {
    postings
        .iter()
        .rev()
        .find(|item| {
            !matches!(
                item.as_directive(),
                Some(Directive::Open(_) | Directive::Close(_))
            )
        })
        .copied()
}

/// True if both trees have the same accounts, each with the same balance.
#[must_use]
pub fn compare_realizations(a: &RealAccount<'_>, b: &RealAccount<'_>, config: &AccountConfig) -> bool {
    fn names<'r>(root: &'r RealAccount<'_>) -> BTreeSet<&'r str> {
        iter_depth_first(root, false)
            .map(RealAccount::account)
            .collect()
    }

    names(a) == names(b)
        && iter_depth_first(a, false).all(|node| {
            get(b, config, node.account()).is_some_and(|other| other.balance() == node.balance())
        })
}
