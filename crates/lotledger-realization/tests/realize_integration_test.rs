//! Integration tests for the realization crate.
//!
//! Tests cover building the account tree from a directive stream, subtree
//! queries, strict-mode error collection and running-balance reports.

use lotledger_core::{
    AccountConfig, AccountTypes, Amount, Balance, Close, Directive, Document, Inventory, Lot,
    NaiveDate, Note, Open, Pad, Position, Posting, SourceLocation, Transaction,
};
use lotledger_realization::{
    compute_balance, filter_tree, find_last_active_posting, get, get_postings, group_by_account,
    iter_depth_first, iterate_with_balance, realize, realize_with_options, RealAccount,
    RealizeError, RealizeOptions,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Helper Functions
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn usd(number: Decimal) -> Amount {
    Amount::new(number, "USD")
}

fn config() -> AccountConfig {
    AccountConfig::default()
}

fn txn(d: NaiveDate, narration: &str, postings: &[(&str, Decimal)], line: u32) -> Directive {
    let txn = postings.iter().fold(
        Transaction::new(d, narration).with_location(SourceLocation::new("ledger.beancount", line)),
        |txn, (account, number)| txn.with_posting(Posting::simple(*account, usd(*number))),
    );
    Directive::Transaction(txn)
}

fn account_names<'r>(root: &'r RealAccount<'_>) -> Vec<&'r str> {
    iter_depth_first(root, false)
        .map(RealAccount::account)
        .collect()
}

/// A small household ledger, sorted by date.
fn household_ledger() -> Vec<Directive> {
    vec![
        Directive::Open(Open::new(date(2014, 1, 1), "Assets:Bank:Checking")),
        Directive::Open(Open::new(date(2014, 1, 1), "Assets:Cash")),
        Directive::Open(Open::new(date(2014, 1, 1), "Equity:Opening")),
        Directive::Open(Open::new(date(2014, 1, 1), "Expenses:Food")),
        Directive::Open(Open::new(date(2014, 1, 1), "Income:Salary")),
        Directive::Pad(Pad::new(date(2014, 1, 2), "Assets:Bank:Checking", "Equity:Opening")),
        txn(
            date(2014, 1, 2),
            "padding",
            &[("Assets:Bank:Checking", dec!(500)), ("Equity:Opening", dec!(-500))],
            10,
        ),
        Directive::Balance(Balance::new(date(2014, 1, 3), "Assets:Bank:Checking", usd(dec!(500)))),
        txn(
            date(2014, 1, 15),
            "paycheck",
            &[("Assets:Bank:Checking", dec!(2000)), ("Income:Salary", dec!(-2000))],
            20,
        ),
        txn(
            date(2014, 1, 16),
            "atm",
            &[("Assets:Bank:Checking", dec!(-100)), ("Assets:Cash", dec!(100))],
            30,
        ),
        txn(
            date(2014, 1, 16),
            "lunch",
            &[("Assets:Cash", dec!(-12)), ("Expenses:Food", dec!(12))],
            31,
        ),
        Directive::Note(Note::new(date(2014, 1, 20), "Assets:Cash", "wallet lost")),
        Directive::Document(Document::new(date(2014, 1, 31), "Assets:Bank:Checking", "jan.pdf")),
        Directive::Close(Close::new(date(2014, 2, 1), "Assets:Cash")),
    ]
}

// ============================================================================
// Realization Scenarios
// ============================================================================

#[test]
fn test_realize_food_transaction() {
    init_tracing();
    let entries = vec![
        Directive::Open(Open::new(date(2014, 1, 1), "Assets:Checking")),
        Directive::Open(Open::new(date(2014, 1, 1), "Expenses:Food")),
        txn(
            date(2014, 2, 22),
            "food",
            &[("Assets:Checking", dec!(-100)), ("Expenses:Food", dec!(100))],
            3,
        ),
    ];

    let root = realize(&entries, &[]).unwrap();
    assert_eq!(root.len(), 2);

    let assets = root.child("Assets").unwrap();
    let checking = assets.child("Checking").unwrap();
    assert_eq!(checking.account(), "Assets:Checking");
    assert_eq!(checking.balance().units("USD"), dec!(-100));
    assert_eq!(checking.balance().len(), 1);
    // The open directive plus the posting
    assert_eq!(checking.postings().len(), 2);
    assert_eq!(
        checking
            .postings()
            .iter()
            .filter(|item| item.as_posting().is_some())
            .count(),
        1
    );

    let food = root.child("Expenses").unwrap().child("Food").unwrap();
    assert_eq!(food.balance().units("USD"), dec!(100));
}

#[test]
fn test_realize_pad_in_both_accounts() {
    let entries = vec![Directive::Pad(Pad::new(
        date(2014, 1, 1),
        "Assets:Checking",
        "Equity:Opening",
    ))];

    let groups = group_by_account(&entries);
    assert_eq!(groups.values().map(Vec::len).sum::<usize>(), 2);

    let root = realize(&entries, &[]).unwrap();
    for account in ["Assets:Checking", "Equity:Opening"] {
        let node = get(&root, &config(), account).unwrap();
        assert_eq!(node.postings().len(), 1);
        assert!(node.balance().is_empty());
    }
}

#[test]
fn test_inventory_same_lot_merges() {
    let lot = Lot::new("GOOG").with_cost(usd(dec!(500)));
    let mut inv = Inventory::new();
    inv.add_position(&Position::new(lot.clone(), dec!(10)), false)
        .unwrap();
    inv.add_position(&Position::new(lot, dec!(5)), false).unwrap();

    assert_eq!(inv.len(), 1);
    assert_eq!(inv.units("GOOG"), dec!(15));

    let cost = inv.get_cost();
    assert_eq!(cost.len(), 1);
    assert_eq!(cost.units("USD"), dec!(7500));
}

#[test]
fn test_realize_household_ledger() {
    init_tracing();
    let entries = household_ledger();
    let root = realize(&entries, &[]).unwrap();

    assert_eq!(
        account_names(&root),
        vec![
            "",
            "Assets",
            "Assets:Bank",
            "Assets:Bank:Checking",
            "Assets:Cash",
            "Equity",
            "Equity:Opening",
            "Expenses",
            "Expenses:Food",
            "Income",
            "Income:Salary",
        ]
    );

    let checking = get(&root, &config(), "Assets:Bank:Checking").unwrap();
    assert_eq!(checking.balance().units("USD"), dec!(2400));
    // open, pad, posting, balance, posting, posting, document
    assert_eq!(checking.postings().len(), 7);

    let assets = get(&root, &config(), "Assets").unwrap();
    assert!(assets.balance().is_empty());
    assert_eq!(compute_balance(assets).units("USD"), dec!(2488));

    // Balanced transactions cancel out over the whole tree.
    assert!(compute_balance(&root).is_empty());
}

#[test]
fn test_realize_with_account_type_roots() {
    let entries = household_ledger();
    let types = AccountTypes::default();
    let root = realize(&entries[..1], &types.roots()).unwrap();

    assert_eq!(
        account_names(&root),
        vec![
            "",
            "Assets",
            "Assets:Bank",
            "Assets:Bank:Checking",
            "Equity",
            "Expenses",
            "Income",
            "Liabilities",
        ]
    );
    let liabilities = get(&root, &config(), "Liabilities").unwrap();
    assert!(liabilities.postings().is_empty());
}

#[test]
fn test_realize_custom_separator() {
    let entries = vec![txn(
        date(2014, 1, 1),
        "transfer",
        &[("Assets/Bank", dec!(5)), ("Income/Job", dec!(-5))],
        1,
    )];
    let options = RealizeOptions::default().with_separator("/");
    let realization = realize_with_options(&entries, &options).unwrap();

    let bank = get(&realization.root, &options.accounts, "Assets/Bank").unwrap();
    assert_eq!(bank.leaf_name(&options.accounts), "Bank");
    assert_eq!(bank.balance().units("USD"), dec!(5));
}

#[test]
fn test_realize_rejects_malformed_names() {
    for account in ["Assets:", ":Assets", "Assets::Cash"] {
        let entries = vec![txn(date(2014, 1, 1), "bad", &[(account, dec!(1))], 1)];
        let err = realize(&entries, &[]).unwrap_err();
        assert_eq!(
            err,
            RealizeError::InvalidAccountName {
                account: account.to_string()
            }
        );
        assert!(err.to_string().contains(account));
    }
}

// ============================================================================
// Strict Mode
// ============================================================================

#[test]
fn test_realize_strict_mode_collects_all_errors() {
    init_tracing();
    let entries = vec![
        txn(date(2014, 1, 1), "overdraw", &[("Assets:Cash", dec!(-10))], 1),
        txn(date(2014, 1, 2), "overdraw", &[("Assets:Wallet", dec!(-3))], 2),
        txn(date(2014, 1, 3), "deposit", &[("Assets:Cash", dec!(25))], 3),
    ];

    let options = RealizeOptions::default().with_allow_negative(false);
    let realization = realize_with_options(&entries, &options).unwrap();
    assert!(!realization.is_clean());
    assert_eq!(realization.errors.len(), 2);
    assert!(realization
        .errors
        .iter()
        .all(|e| e.source.lot().currency.as_str() == "USD"));

    // Each error names its account and the transaction that caused it.
    let blamed: Vec<_> = realization
        .errors
        .iter()
        .map(|e| (e.account.as_str(), e.location.lineno))
        .collect();
    assert_eq!(blamed, vec![("Assets:Cash", 1), ("Assets:Wallet", 2)]);

    // The failing postings are skipped but still listed.
    let cash = get(&realization.root, &config(), "Assets:Cash").unwrap();
    assert_eq!(cash.balance().units("USD"), dec!(25));
    assert_eq!(cash.postings().len(), 2);

    // The permissive pass over the same entries is clean.
    let permissive = realize_with_options(&entries, &RealizeOptions::default()).unwrap();
    assert!(permissive.is_clean());
    let cash = get(&permissive.root, &config(), "Assets:Cash").unwrap();
    assert_eq!(cash.balance().units("USD"), dec!(15));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_get_postings_for_subtree() {
    let entries = household_ledger();
    let root = realize(&entries, &[]).unwrap();
    let assets = get(&root, &config(), "Assets").unwrap();

    let postings = get_postings(assets);
    let dates: Vec<_> = postings.iter().map(|p| p.date()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    let total: usize = iter_depth_first(assets, false)
        .map(|a| a.postings().len())
        .sum();
    assert_eq!(postings.len(), total);

    // Same day: open before pad, pad before the padding transaction
    let kinds: Vec<_> = postings[..4].iter().map(|p| p.entry().type_name()).collect();
    assert_eq!(kinds, vec!["open", "open", "pad", "transaction"]);
}

#[test]
fn test_find_last_active_posting_skips_close() {
    let entries = household_ledger();
    let root = realize(&entries, &[]).unwrap();
    let cash = get(&root, &config(), "Assets:Cash").unwrap();

    let last = find_last_active_posting(cash.postings()).unwrap();
    assert_eq!(last.entry().type_name(), "note");
    assert_eq!(last.date(), date(2014, 1, 20));
}

#[test]
fn test_filter_tree_keeps_active_accounts() {
    let entries = household_ledger();
    let root = realize(&entries, &["Liabilities"]).unwrap();

    let filtered = filter_tree(&root, |node| !node.balance().is_empty()).unwrap();
    assert!(get(&filtered, &config(), "Liabilities").is_none());
    assert!(get(&filtered, &config(), "Assets:Bank:Checking").is_some());

    for leaf in iter_depth_first(&filtered, true) {
        assert!(!leaf.balance().is_empty(), "{leaf} should have a balance");
    }

    // Shallow copy: the filtered node holds the same postings.
    let original = get(&root, &config(), "Expenses:Food").unwrap();
    let copy = get(&filtered, &config(), "Expenses:Food").unwrap();
    assert!(std::ptr::eq(original.postings(), copy.postings()));
}

// ============================================================================
// Running Balance
// ============================================================================

#[test]
fn test_journal_rows_for_checking() {
    let entries = household_ledger();
    let root = realize(&entries, &[]).unwrap();
    let checking = get(&root, &config(), "Assets:Bank:Checking").unwrap();

    let rows = iterate_with_balance(get_postings(checking))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let summary: Vec<_> = rows
        .iter()
        .map(|row| (row.entry.type_name(), row.balance.units("USD")))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("open", dec!(0)),
            ("pad", dec!(0)),
            ("transaction", dec!(500)),
            ("balance", dec!(500)),
            ("transaction", dec!(2500)),
            ("transaction", dec!(2400)),
            ("document", dec!(2400)),
        ]
    );

    let last = rows.last().unwrap();
    assert_eq!(&last.balance, checking.balance());
    assert!(last.change.is_empty());
    assert_eq!(rows[4].change.units("USD"), dec!(2000));
}

#[test]
fn test_journal_rows_merge_postings_of_one_transaction() {
    let entries = vec![txn(
        date(2014, 1, 1),
        "split",
        &[
            ("Assets:Cash", dec!(10)),
            ("Assets:Cash", dec!(5)),
            ("Income:Job", dec!(-15)),
        ],
        1,
    )];
    let root = realize(&entries, &[]).unwrap();
    let cash = get(&root, &config(), "Assets:Cash").unwrap();

    let rows = iterate_with_balance(get_postings(cash))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].postings.len(), 2);
    assert_eq!(rows[0].change.units("USD"), dec!(15));
}

#[test]
fn test_journal_rows_reject_unsorted_input() {
    let entries = vec![
        txn(date(2014, 3, 1), "later", &[("Assets:Cash", dec!(1))], 1),
        txn(date(2014, 1, 1), "earlier", &[("Assets:Cash", dec!(2))], 2),
    ];
    let groups = group_by_account(&entries);

    let result: Result<Vec<_>, _> = iterate_with_balance(groups["Assets:Cash"].clone()).collect();
    match result {
        Err(RealizeError::OrderingViolation {
            date: d,
            previous,
            location,
        }) => {
            assert_eq!(d, date(2014, 1, 1));
            assert_eq!(previous, date(2014, 3, 1));
            assert_eq!(location.lineno, 2);
        }
        other => panic!("expected an ordering violation, got {other:?}"),
    }
}
