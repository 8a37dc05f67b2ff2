//! Membership-set reconciliation.
//!
//! Group and role membership is stored remotely as unordered identifier sets
//! and updated through incremental `add_*` / `remove_*` lists. [`diff`]
//! computes those lists from the stored set and the planned one. APIs that
//! replace the whole list take [`replacement`] instead and skip diffing.

use std::collections::BTreeSet;
use std::iter::FromIterator;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tristate::TriState;

/// A set of opaque identifiers (user ids, role ids, permissions).
///
/// Iteration and serialization are in sorted order, so the same members always
/// persist as the same JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipSet(BTreeSet<String>);

impl MembershipSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `id` is a member.
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Add a member. Returns `false` if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    /// Remove a member. Returns `false` if it was not present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    /// Iterate members in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Members sorted lexicographically, for request bodies and logs.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for MembershipSet {
    fn from(members: Vec<String>) -> Self {
        members.into_iter().collect()
    }
}

impl IntoIterator for MembershipSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Incremental changes that turn the stored set into the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Members in desired but not stored.
    pub additions: MembershipSet,
    /// Members stored but not desired.
    pub removals: MembershipSet,
}

impl Diff {
    /// Returns `true` if nothing needs to change.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Apply the diff to a set: add `additions`, then drop `removals`.
    pub fn apply(&self, current: &MembershipSet) -> MembershipSet {
        let mut next = current.clone();
        for id in self.additions.iter() {
            next.insert(id);
        }
        for id in self.removals.iter() {
            next.remove(id);
        }
        next
    }

    /// Split into `(add, remove)` request fields, omitting empty lists.
    pub fn into_payload(self) -> (Option<Vec<String>>, Option<Vec<String>>) {
        let non_empty = |set: MembershipSet| (!set.is_empty()).then(|| set.to_sorted_vec());
        (non_empty(self.additions), non_empty(self.removals))
    }
}

/// Compute the add/remove lists for a membership update.
///
/// - `Unknown` desired: no changes at all, so a partial plan never wipes
///   membership it cannot see yet.
/// - `Null` desired: remove every current member.
/// - `Known(s)`: `s \ current` added, `current \ s` removed.
pub fn diff(current: &MembershipSet, desired: &TriState<MembershipSet>) -> Diff {
    let result = match desired {
        TriState::Unknown => Diff::default(),
        TriState::Null => Diff {
            additions: MembershipSet::new(),
            removals: current.clone(),
        },
        TriState::Known(desired) => Diff {
            additions: desired.iter().filter(|id| !current.contains(id)).collect(),
            removals: current.iter().filter(|id| !desired.contains(id)).collect(),
        },
    };

    debug!(
        additions = result.additions.len(),
        removals = result.removals.len(),
        "Computed membership diff"
    );
    result
}

/// [`diff`] against the set held in prior state.
///
/// A prior value that is not `Known` counts as no members.
pub fn diff_from_state(
    prior: &TriState<MembershipSet>,
    desired: &TriState<MembershipSet>,
) -> Diff {
    match prior {
        TriState::Known(current) => diff(current, desired),
        TriState::Null | TriState::Unknown => diff(&MembershipSet::new(), desired),
    }
}

/// The full list for a replace-style request field.
///
/// `Unknown` omits the field, `Null` sends an empty list, `Known` sends every
/// member.
pub fn replacement(desired: &TriState<MembershipSet>) -> Option<Vec<String>> {
    match desired {
        TriState::Known(members) => Some(members.to_sorted_vec()),
        TriState::Null => Some(Vec::new()),
        TriState::Unknown => None,
    }
}

/// Lift a server membership list into state.
///
/// A non-empty list is `Known`. An empty or missing list is `Null`, unless the
/// prior stored value was an explicit empty set, which is kept so that
/// `members = []` does not drift to null on every read.
pub fn lift_on_read(
    server: Option<Vec<String>>,
    prior: &TriState<MembershipSet>,
) -> TriState<MembershipSet> {
    let members: MembershipSet = server.unwrap_or_default().into();
    if !members.is_empty() {
        return TriState::Known(members);
    }
    match prior {
        TriState::Known(prior) if prior.is_empty() => TriState::Known(MembershipSet::new()),
        _ => TriState::Null,
    }
}
