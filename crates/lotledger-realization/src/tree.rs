//! The realized-account tree.
//!
//! A [`RealAccount`] node is keyed in its parent by the last segment of its
//! full account name. Children are kept in a `BTreeMap`, so every traversal
//! visits them in sorted key order no matter how they were inserted.
//!
//! Path operations are free functions that take the [`AccountConfig`] used to
//! split names; the tree itself holds no separator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use lotledger_core::{AccountConfig, Inventory};
use tracing::trace;

use crate::entry::PostingOrEntry;
use crate::error::RealizeError;

/// A node of the account tree.
///
/// The postings list and the balance belong to this account only; neither
/// includes anything from the children. Use
/// [`compute_balance`](crate::compute_balance) and
/// [`get_postings`](crate::get_postings) for subtree totals.
///
/// Both are shared behind an `Arc`, so cloning a node (or filtering a tree)
/// never copies posting lists or inventories.
#[derive(Debug, Clone, Default)]
pub struct RealAccount<'a> {
    account: String,
    children: BTreeMap<String, RealAccount<'a>>,
    pub(crate) postings: Arc<Vec<PostingOrEntry<'a>>>,
    pub(crate) balance: Arc<Inventory>,
}

impl<'a> RealAccount<'a> {
    /// Create an empty node for a full account name. The root is `""`.
    #[must_use]
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            ..Self::default()
        }
    }

    /// The full account name of this node.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// The last segment of the account name; empty for the root.
    #[must_use]
    pub fn leaf_name(&self, config: &AccountConfig) -> &str {
        config.leaf(&self.account)
    }

    /// Postings and directives attached directly to this account.
    #[must_use]
    pub fn postings(&self) -> &[PostingOrEntry<'a>] {
        &self.postings
    }

    /// Balance of this account's own postings.
    #[must_use]
    pub fn balance(&self) -> &Inventory {
        &self.balance
    }

    /// Look up a direct child by key.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Self> {
        self.children.get(key)
    }

    /// Direct children in sorted key order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Self)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Same as [`Self::is_leaf`]; pairs with [`Self::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_leaf()
    }
}

/// Trees compare equal when names, balances and children match and the
/// posting lists hold the same items (by identity) in the same order.
impl PartialEq for RealAccount<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.account == other.account
            && self.balance == other.balance
            && self.postings == other.postings
            && self.children == other.children
    }
}

impl Eq for RealAccount<'_> {}

impl fmt::Display for RealAccount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.account.is_empty() {
            write!(f, "(root) {}", self.balance)
        } else {
            write!(f, "{} {}", self.account, self.balance)
        }
    }
}

/// Walk down from `node` along `account`, creating missing nodes.
///
/// Created nodes are named by joining `node`'s own name with the path walked
/// so far, so when `node` is the root they get the full account name.
pub fn get_or_create<'r, 'a>(
    node: &'r mut RealAccount<'a>,
    config: &AccountConfig,
    account: &str,
) -> Result<&'r mut RealAccount<'a>, RealizeError> {
    if !config.is_valid(account) {
        return Err(RealizeError::invalid_account(account));
    }

    let mut path = node.account.clone();
    let mut current = node;
    for segment in config.split(account) {
        if !path.is_empty() {
            path.push_str(&config.separator);
        }
        path.push_str(segment);
        current = current
            .children
            .entry(segment.to_string())
            .or_insert_with(|| {
                trace!(account = %path, "creating account node");
                RealAccount::new(path.clone())
            });
    }
    Ok(current)
}

/// Find the node at `account` below `node` without creating anything.
///
/// The empty name resolves to `node` itself. Returns `None` at the first
/// missing segment.
#[must_use]
pub fn get<'r, 'a>(
    node: &'r RealAccount<'a>,
    config: &AccountConfig,
    account: &str,
) -> Option<&'r RealAccount<'a>> {
    config
        .split(account)
        .into_iter()
        .try_fold(node, |current, segment| current.children.get(segment))
}

/// True if `account` names `node` or one of its descendants.
#[must_use]
pub fn contains(node: &RealAccount<'_>, config: &AccountConfig, account: &str) -> bool {
    get(node, config, account).is_some()
}

/// Insert `child` under `parent` with the given key.
///
/// The key must be a single non-empty segment, and the child's name must be
/// the parent's name extended by the key. Returns the child previously held
/// under the key, if any.
pub fn insert_child<'a>(
    parent: &mut RealAccount<'a>,
    config: &AccountConfig,
    key: &str,
    child: RealAccount<'a>,
) -> Result<Option<RealAccount<'a>>, RealizeError> {
    let fail = |reason| RealizeError::TreeConsistency {
        key: key.to_string(),
        account: child.account.clone(),
        reason,
    };

    if key.is_empty() {
        return Err(fail("empty key"));
    }
    if !config.is_valid_segment(key) {
        return Err(fail("key contains the account separator"));
    }
    if config.leaf(&child.account) != key {
        return Err(fail("account name does not end with the key"));
    }
    let expected_parent = config.parent(&child.account).unwrap_or_default();
    if expected_parent != parent.account {
        return Err(fail("account name does not extend the parent's name"));
    }

    Ok(parent.children.insert(key.to_string(), child))
}

/// Iterate a tree depth-first, children in sorted key order.
///
/// Yields `node` first, then each subtree in turn. With `leaves_only`, only
/// nodes without children are yielded.
pub fn iter_depth_first<'r, 'a>(node: &'r RealAccount<'a>, leaves_only: bool) -> DepthFirst<'r, 'a> {
    DepthFirst {
        stack: vec![node],
        leaves_only,
    }
}

/// Iterator returned by [`iter_depth_first`].
#[derive(Debug, Clone)]
pub struct DepthFirst<'r, 'a> {
    stack: Vec<&'r RealAccount<'a>>,
    leaves_only: bool,
}

impl<'r, 'a> Iterator for DepthFirst<'r, 'a> {
    type Item = &'r RealAccount<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            self.stack.extend(node.children.values().rev());
            if !self.leaves_only || node.is_leaf() {
                return Some(node);
            }
        }
        None
    }
}

/// Copy the part of a tree selected by `predicate`.
///
/// A node is kept if the predicate holds for it or if any of its descendants
/// is kept; the predicate is not evaluated for nodes that keep a child. Every
/// leaf of the result satisfies the predicate. Returns `None` if nothing is
/// kept.
///
/// Kept nodes share their postings and balance with the source tree.
pub fn filter_tree<'a, F>(node: &RealAccount<'a>, mut predicate: F) -> Option<RealAccount<'a>>
where
    F: FnMut(&RealAccount<'a>) -> bool,
{
    filter_node(node, &mut predicate)
}

fn filter_node<'a, F>(node: &RealAccount<'a>, predicate: &mut F) -> Option<RealAccount<'a>>
where
    F: FnMut(&RealAccount<'a>) -> bool,
{
    let children: BTreeMap<String, RealAccount<'a>> = node
        .children
        .iter()
        .filter_map(|(key, child)| filter_node(child, predicate).map(|c| (key.clone(), c)))
        .collect();

    if children.is_empty() && !predicate(node) {
        return None;
    }

    Some(RealAccount {
        account: node.account.clone(),
        children,
        postings: Arc::clone(&node.postings),
        balance: Arc::clone(&node.balance),
    })
}
