//! Running-balance iteration over one account's postings.
//!
//! [`iterate_with_balance`] replays a date-sorted list of postings and
//! directives and yields one [`BalanceRow`] per entry, with the change that
//! entry made and the balance after it. This is the row source for journal
//! style reports.

use std::collections::{HashMap, VecDeque};

use lotledger_core::{Inventory, NaiveDate};

use crate::entry::{EntryRef, PostingOrEntry, TxnPosting};
use crate::error::RealizeError;

/// One entry of a running-balance report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow<'a> {
    /// The entry: the owning transaction for postings, or the directive.
    pub entry: EntryRef<'a>,
    /// The postings of this entry that were in the input, in input order.
    /// Empty for directives.
    pub postings: Vec<TxnPosting<'a>>,
    /// Sum of `postings`.
    pub change: Inventory,
    /// Running balance after applying `change`.
    pub balance: Inventory,
}

/// Iterate a date-sorted list of postings and directives with a running balance.
///
/// Postings of the same transaction on the same date are merged into one row;
/// entries are matched by identity. Rows for a date are emitted once the
/// next date (or the end of input) is seen, in the order their entries were
/// first met. Each directive gets a row of its own with an empty change.
///
/// An item dated before the previous one yields
/// [`RealizeError::OrderingViolation`] and ends the iteration. Sort the input
/// first, e.g. with [`get_postings`](crate::get_postings).
///
/// ```
/// use lotledger_core::{Amount, Directive, NaiveDate, Posting, Transaction};
/// use lotledger_realization::{iterate_with_balance, PostingOrEntry, TxnPosting};
/// use rust_decimal_macros::dec;
///
/// let date = NaiveDate::from_ymd_opt(2014, 2, 22).unwrap();
/// let txn = Transaction::new(date, "atm")
///     .with_posting(Posting::simple("Assets:Cash", Amount::new(dec!(20), "USD")))
///     .with_posting(Posting::simple("Assets:Cash", Amount::new(dec!(-5), "USD")));
/// let items: Vec<PostingOrEntry<'_>> = txn
///     .postings
///     .iter()
///     .map(|p| TxnPosting::new(&txn, p).into())
///     .collect();
///
/// let rows: Vec<_> = iterate_with_balance(items).collect::<Result<_, _>>().unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].postings.len(), 2);
/// assert_eq!(rows[0].balance.units("USD"), dec!(15));
/// ```
pub fn iterate_with_balance<'a, I>(items: I) -> BalanceIter<'a, I::IntoIter>
where
    I: IntoIterator<Item = PostingOrEntry<'a>>,
{
    BalanceIter {
        items: items.into_iter(),
        balance: Inventory::new(),
        prev_date: None,
        pending: Vec::new(),
        index: HashMap::new(),
        ready: VecDeque::new(),
        done: false,
    }
}

type PendingEntry<'a> = (EntryRef<'a>, Vec<TxnPosting<'a>>);

/// Iterator returned by [`iterate_with_balance`].
#[derive(Debug)]
pub struct BalanceIter<'a, I> {
    items: I,
    balance: Inventory,
    prev_date: Option<NaiveDate>,
    // Entries of the current date, in first-seen order.
    pending: Vec<PendingEntry<'a>>,
    // First pending slot of each entry.
    index: HashMap<EntryRef<'a>, usize>,
    ready: VecDeque<PendingEntry<'a>>,
    done: bool,
}

impl<'a, I> BalanceIter<'a, I> {
    /// The running balance after the rows yielded so far.
    pub fn balance(&self) -> &Inventory {
        &self.balance
    }

    fn flush_pending(&mut self) {
        self.ready.extend(self.pending.drain(..));
        self.index.clear();
    }

    fn push(&mut self, item: PostingOrEntry<'a>) {
        let entry = item.entry();
        match item.as_posting() {
            Some(posting) => {
                if let Some(&slot) = self.index.get(&entry) {
                    self.pending[slot].1.push(posting);
                } else {
                    self.index.insert(entry, self.pending.len());
                    self.pending.push((entry, vec![posting]));
                }
            }
            None => {
                self.index.entry(entry).or_insert(self.pending.len());
                self.pending.push((entry, Vec::new()));
            }
        }
    }

    fn emit(&mut self, (entry, postings): PendingEntry<'a>) -> BalanceRow<'a> {
        let mut change = Inventory::new();
        for posting in &postings {
            change.add(posting.position().clone());
            self.balance.add(posting.position().clone());
        }
        BalanceRow {
            entry,
            postings,
            change,
            balance: self.balance.clone(),
        }
    }
}

impl<'a, I> Iterator for BalanceIter<'a, I>
where
    I: Iterator<Item = PostingOrEntry<'a>>,
{
    type Item = Result<BalanceRow<'a>, RealizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pending) = self.ready.pop_front() {
                return Some(Ok(self.emit(pending)));
            }
            if self.done {
                return None;
            }

            let Some(item) = self.items.next() else {
                self.done = true;
                self.flush_pending();
                continue;
            };

            let date = item.date();
            if self.prev_date != Some(date) {
                if let Some(previous) = self.prev_date.filter(|prev| date < *prev) {
                    self.done = true;
                    self.pending.clear();
                    self.index.clear();
                    return Some(Err(RealizeError::OrderingViolation {
                        date,
                        previous,
                        location: item.entry().location().clone(),
                    }));
                }
                self.prev_date = Some(date);
                self.flush_pending();
            }
            self.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotledger_core::{Amount, Directive, Note, Open, Posting, SourceLocation, Transaction};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn usd(number: Decimal) -> Amount {
        Amount::new(number, "USD")
    }

    fn cash_txn(d: NaiveDate, amounts: &[Decimal]) -> Transaction {
        amounts.iter().fold(Transaction::new(d, "cash"), |txn, n| {
            txn.with_posting(Posting::simple("Assets:Cash", usd(*n)))
        })
    }

    fn postings_of(txn: &Transaction) -> impl Iterator<Item = PostingOrEntry<'_>> {
        txn.postings
            .iter()
            .map(move |p| PostingOrEntry::Posting(TxnPosting::new(txn, p)))
    }

    fn collect(items: Vec<PostingOrEntry<'_>>) -> Vec<BalanceRow<'_>> {
        iterate_with_balance(items)
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_empty() {
        assert!(collect(Vec::new()).is_empty());
    }

    #[test]
    fn test_running_balance() {
        let t1 = cash_txn(date(2014, 1, 1), &[dec!(100)]);
        let t2 = cash_txn(date(2014, 1, 2), &[dec!(-30)]);
        let t3 = cash_txn(date(2014, 1, 3), &[dec!(5)]);
        let items: Vec<_> = postings_of(&t1).chain(postings_of(&t2)).chain(postings_of(&t3)).collect();

        let rows = collect(items);
        let balances: Vec<_> = rows.iter().map(|r| r.balance.units("USD")).collect();
        let changes: Vec<_> = rows.iter().map(|r| r.change.units("USD")).collect();
        assert_eq!(balances, vec![dec!(100), dec!(70), dec!(75)]);
        assert_eq!(changes, vec![dec!(100), dec!(-30), dec!(5)]);
        assert_eq!(rows[1].entry, EntryRef::Transaction(&t2));
    }

    #[test]
    fn test_same_transaction_merged() {
        let t1 = cash_txn(date(2014, 1, 1), &[dec!(10), dec!(20), dec!(-5)]);
        let rows = collect(postings_of(&t1).collect());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].postings.len(), 3);
        assert_eq!(rows[0].change.units("USD"), dec!(25));
        // Input order is kept.
        assert_eq!(rows[0].postings[2].position().number, dec!(-5));
    }

    #[test]
    fn test_equal_transactions_stay_separate() {
        let d = date(2014, 1, 1);
        let t1 = cash_txn(d, &[dec!(10)]);
        let t2 = cash_txn(d, &[dec!(10)]);
        assert_eq!(t1, t2);

        let rows = collect(postings_of(&t1).chain(postings_of(&t2)).collect());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].balance.units("USD"), dec!(10));
        assert_eq!(rows[1].balance.units("USD"), dec!(20));
    }

    #[test]
    fn test_interleaved_same_date_first_seen_order() {
        let d = date(2014, 1, 1);
        let t1 = cash_txn(d, &[dec!(1), dec!(2)]);
        let t2 = cash_txn(d, &[dec!(10)]);
        let items = vec![
            PostingOrEntry::Posting(TxnPosting::new(&t1, &t1.postings[0])),
            PostingOrEntry::Posting(TxnPosting::new(&t2, &t2.postings[0])),
            PostingOrEntry::Posting(TxnPosting::new(&t1, &t1.postings[1])),
        ];

        let rows = collect(items);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entry, EntryRef::Transaction(&t1));
        assert_eq!(rows[0].change.units("USD"), dec!(3));
        assert_eq!(rows[1].entry, EntryRef::Transaction(&t2));
        assert_eq!(rows[1].balance.units("USD"), dec!(13));
    }

    #[test]
    fn test_directive_has_empty_change_and_current_balance() {
        let open = Directive::Open(Open::new(date(2014, 1, 1), "Assets:Cash"));
        let t1 = cash_txn(date(2014, 1, 2), &[dec!(50)]);
        let note = Directive::Note(Note::new(date(2014, 1, 3), "Assets:Cash", "hello"));

        let mut items = vec![PostingOrEntry::Entry(&open)];
        items.extend(postings_of(&t1));
        items.push(PostingOrEntry::Entry(&note));

        let rows = collect(items);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].entry, EntryRef::from(&open));
        assert!(rows[0].postings.is_empty());
        assert!(rows[0].change.is_empty());
        assert!(rows[0].balance.is_empty());

        assert!(rows[2].change.is_empty());
        assert_eq!(rows[2].balance.units("USD"), dec!(50));
    }

    #[test]
    fn test_same_directive_twice_gives_two_rows() {
        let note = Directive::Note(Note::new(date(2014, 1, 3), "Assets:Cash", "hello"));
        let rows = collect(vec![PostingOrEntry::Entry(&note), PostingOrEntry::Entry(&note)]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_posting_joins_directive_row_of_its_transaction() {
        let dir = Directive::Transaction(cash_txn(date(2014, 1, 1), &[dec!(7)]));
        let txn = dir.as_transaction().unwrap();
        let items = vec![
            PostingOrEntry::Entry(&dir),
            PostingOrEntry::Posting(TxnPosting::new(txn, &txn.postings[0])),
        ];

        let rows = collect(items);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].postings.len(), 1);
        assert_eq!(rows[0].balance.units("USD"), dec!(7));
    }

    #[test]
    fn test_ordering_violation() {
        let t1 = cash_txn(date(2014, 1, 2), &[dec!(1)])
            .with_location(SourceLocation::new("main.beancount", 10));
        let t2 = cash_txn(date(2014, 1, 1), &[dec!(1)])
            .with_location(SourceLocation::new("main.beancount", 20));
        let items: Vec<_> = postings_of(&t1).chain(postings_of(&t2)).collect();

        let mut iter = iterate_with_balance(items);
        let err = iter.next().unwrap().unwrap_err();
        assert_eq!(
            err,
            RealizeError::OrderingViolation {
                date: date(2014, 1, 1),
                previous: date(2014, 1, 2),
                location: SourceLocation::new("main.beancount", 20),
            }
        );
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_rows_before_violation_are_yielded() {
        let t1 = cash_txn(date(2014, 1, 1), &[dec!(1)]);
        let t2 = cash_txn(date(2014, 1, 5), &[dec!(1)]);
        let t3 = cash_txn(date(2014, 1, 3), &[dec!(1)]);
        let items: Vec<_> = postings_of(&t1)
            .chain(postings_of(&t2))
            .chain(postings_of(&t3))
            .collect();

        let results: Vec<_> = iterate_with_balance(items).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(RealizeError::OrderingViolation { .. })
        ));
    }

    #[test]
    fn test_final_balance_accessor() {
        let t1 = cash_txn(date(2014, 1, 1), &[dec!(4), dec!(6)]);
        let mut iter = iterate_with_balance(postings_of(&t1));
        while iter.next().is_some() {}
        assert_eq!(iter.balance().units("USD"), dec!(10));
    }
}
