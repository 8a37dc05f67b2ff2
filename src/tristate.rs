//! Tri-state values supplied by the form layer.
//!
//! Every configurable attribute arrives in exactly one of three states:
//! a concrete value, an explicit null, or a value that cannot be resolved
//! until apply time. Collapsing `Null` and `Unknown` into a single "absent"
//! case loses the distinction the reconcilers depend on, so the two are kept
//! as separate variants.
//!
//! # Example
//!
//! ```
//! use braintrust_provider_core::TriState;
//!
//! let name: TriState<String> = TriState::Known("ci".to_string());
//! assert_eq!(name.as_known().map(String::as_str), Some("ci"));
//!
//! let unset: TriState<String> = Some(String::new()).filter(|s| !s.is_empty()).into();
//! assert!(unset.is_null());
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value that is known, explicitly null, or not yet resolvable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TriState<T> {
    /// A concrete value.
    Known(T),
    /// Explicitly absent.
    #[default]
    Null,
    /// Not resolvable until apply (computed or depends on another resource).
    Unknown,
}

impl<T> TriState<T> {
    /// Returns `true` if the value is [`TriState::Known`].
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Returns `true` if the value is [`TriState::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is [`TriState::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Borrow the known value, if any.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Take the known value, if any.
    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Convert `&TriState<T>` into `TriState<&T>`.
    pub fn as_ref(&self) -> TriState<&T> {
        match self {
            Self::Known(value) => TriState::Known(value),
            Self::Null => TriState::Null,
            Self::Unknown => TriState::Unknown,
        }
    }

    /// Map the known value, keeping `Null` and `Unknown` as they are.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> TriState<U> {
        match self {
            Self::Known(value) => TriState::Known(f(value)),
            Self::Null => TriState::Null,
            Self::Unknown => TriState::Unknown,
        }
    }

    /// Collapse `Unknown` into `Null`.
    ///
    /// Stored state may never hold an unresolved value once apply finishes.
    pub fn or_null(self) -> Self {
        match self {
            Self::Unknown => Self::Null,
            other => other,
        }
    }

    /// Equality that only holds between two known values.
    ///
    /// `Null == Null` and `Unknown == Unknown` are both `false` here.
    pub fn known_eq(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        match (self, other) {
            (Self::Known(a), Self::Known(b)) => a == b,
            _ => false,
        }
    }
}

impl<T: Clone> TriState<&T> {
    /// Clone the borrowed value into an owned tri-state.
    pub fn cloned(self) -> TriState<T> {
        self.map(Clone::clone)
    }
}

impl<T> From<Option<T>> for TriState<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Known(value),
            None => Self::Null,
        }
    }
}

impl<T: Serialize> Serialize for TriState<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(value) => serializer.serialize_some(value),
            Self::Null => serializer.serialize_none(),
            Self::Unknown => Err(serde::ser::Error::custom(
                "cannot persist a value that is still unknown",
            )),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TriState<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_predicates() {
        assert!(TriState::Known(1).is_known());
        assert!(TriState::<i32>::Null.is_null());
        assert!(TriState::<i32>::Unknown.is_unknown());
        assert_eq!(TriState::<i32>::default(), TriState::Null);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(TriState::from(Some("a")), TriState::Known("a"));
        assert_eq!(TriState::<&str>::from(None), TriState::Null);
    }

    #[test]
    fn test_known_eq_only_between_known() {
        assert!(TriState::Known(3).known_eq(&TriState::Known(3)));
        assert!(!TriState::Known(3).known_eq(&TriState::Known(4)));
        assert!(!TriState::<i32>::Null.known_eq(&TriState::Null));
        assert!(!TriState::<i32>::Unknown.known_eq(&TriState::Unknown));
    }

    #[test]
    fn test_or_null() {
        assert_eq!(TriState::<i32>::Unknown.or_null(), TriState::Null);
        assert_eq!(TriState::Known(1).or_null(), TriState::Known(1));
    }

    #[test]
    fn test_serde() {
        assert_eq!(
            serde_json::to_value(TriState::Known("x")).unwrap(),
            json!("x")
        );
        assert_eq!(
            serde_json::to_value(TriState::<String>::Null).unwrap(),
            json!(null)
        );
        assert!(serde_json::to_value(TriState::<String>::Unknown).is_err());

        let parsed: TriState<String> = serde_json::from_value(json!(null)).unwrap();
        assert!(parsed.is_null());
        let parsed: TriState<u8> = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(parsed, TriState::Known(7));
    }
}
