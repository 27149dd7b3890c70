//! Grouping a flat directive stream by account.

use std::collections::BTreeMap;

use lotledger_core::Directive;
use tracing::{debug, instrument};

use crate::entry::{PostingOrEntry, TxnPosting};

/// Per-account lists of postings and directives, keyed by account name.
pub type AccountGroups<'a> = BTreeMap<&'a str, Vec<PostingOrEntry<'a>>>;

/// Group postings and account directives by the account they refer to.
///
/// - A transaction contributes each of its postings to that posting's account;
///   the transaction itself is not listed.
/// - Open, close, balance, note and document directives are listed under
///   their account.
/// - A pad is listed under both the padded account and the source account.
/// - Commodity, event and price directives are skipped.
///
/// Each list keeps the relative order of the input.
#[instrument(skip_all, fields(entries = entries.len()))]
pub fn group_by_account(entries: &[Directive]) -> AccountGroups<'_> {
    let mut groups: AccountGroups<'_> = BTreeMap::new();

    for entry in entries {
        match entry {
            Directive::Transaction(txn) => {
                for posting in &txn.postings {
                    groups
                        .entry(posting.account.as_str())
                        .or_default()
                        .push(TxnPosting::new(txn, posting).into());
                }
            }
            Directive::Open(_)
            | Directive::Close(_)
            | Directive::Balance(_)
            | Directive::Note(_)
            | Directive::Document(_)
            | Directive::Pad(_) => {
                for account in entry.account_names() {
                    groups.entry(account).or_default().push(entry.into());
                }
            }
            Directive::Commodity(_) | Directive::Event(_) | Directive::Price(_) => {}
        }
    }

    debug!(accounts = groups.len(), "grouped entries by account");
    groups
}
