//! Scalar reconciliation.
//!
//! The remote API reads an omitted field as "no change" and an empty value as
//! "clear". Payload fields are therefore `Option<T>`: `None` is skipped during
//! serialization, `Some(T::cleared())` is sent as an explicit clear.
//!
//! | desired     | payload field           |
//! |-------------|-------------------------|
//! | `Known(v)`  | `Some(v)`               |
//! | `Null`      | `Some(T::cleared())`    |
//! | `Unknown`   | `None` (omitted)        |

use std::collections::{BTreeMap, HashMap};

use crate::tristate::TriState;

/// Types with an explicit "clear" value understood by the remote API.
pub trait Clearable {
    /// The value that clears the field remotely.
    fn cleared() -> Self;

    /// Returns `true` if a server value means "nothing set".
    fn is_cleared(&self) -> bool;
}

impl Clearable for String {
    fn cleared() -> Self {
        String::new()
    }

    fn is_cleared(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Clearable for Vec<T> {
    fn cleared() -> Self {
        Vec::new()
    }

    fn is_cleared(&self) -> bool {
        self.is_empty()
    }
}

impl<K: Ord, V> Clearable for BTreeMap<K, V> {
    fn cleared() -> Self {
        BTreeMap::new()
    }

    fn is_cleared(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Clearable for HashMap<K, V> {
    fn cleared() -> Self {
        HashMap::new()
    }

    fn is_cleared(&self) -> bool {
        self.is_empty()
    }
}

impl Clearable for serde_json::Map<String, serde_json::Value> {
    fn cleared() -> Self {
        serde_json::Map::new()
    }

    fn is_cleared(&self) -> bool {
        self.is_empty()
    }
}

/// Build the payload field for a partial update.
pub fn reconcile_scalar<T: Clearable + Clone>(desired: &TriState<T>) -> Option<T> {
    match desired {
        TriState::Known(value) => Some(value.clone()),
        TriState::Null => Some(T::cleared()),
        TriState::Unknown => None,
    }
}

/// Lift a server value into state. Absent and empty both become `Null`.
pub fn reconcile_scalar_on_read<T: Clearable>(server: Option<T>) -> TriState<T> {
    match server {
        Some(value) if !value.is_cleared() => TriState::Known(value),
        _ => TriState::Null,
    }
}

/// Send only known values.
///
/// Used for create bodies, where there is nothing to clear, and for fields
/// such as booleans that have no clear sentinel.
pub fn known_only<T: Clone>(desired: &TriState<T>) -> Option<T> {
    desired.as_known().cloned()
}
