//! Name-based lookup.
//!
//! Data sources accept either an explicit id or a name. Name lookups list
//! candidates with an exact-name filter and then insist on exactly one live
//! match: zero is [`ProviderError::NotFound`], more than one is
//! [`ProviderError::Ambiguous`]. The first duplicate is never picked.

use tracing::debug;

use crate::client::EntityKind;
use crate::error::ProviderError;
use crate::tristate::TriState;
use crate::validation::ensure_exclusive;

/// Entities that can be looked up by name.
pub trait Named {
    /// The entity's display name.
    fn name(&self) -> &str;

    /// Whether the entity carries a soft-delete marker.
    fn is_deleted(&self) -> bool {
        false
    }
}

/// Pick the single live candidate whose name equals `name` exactly.
///
/// The result depends only on the multiset of candidates, never on their
/// order.
pub fn select_unique<E, I>(kind: EntityKind, candidates: I, name: &str) -> Result<E, ProviderError>
where
    E: Named,
    I: IntoIterator<Item = E>,
{
    let mut matches = candidates
        .into_iter()
        .filter(|candidate| !candidate.is_deleted() && candidate.name() == name);

    let first = matches.next();
    let extra = matches.count();
    debug!(%kind, name, matches = first.is_some() as usize + extra, "Selecting by name");

    match first {
        None => Err(ProviderError::NotFound {
            kind,
            key: name.to_string(),
        }),
        Some(entity) if extra == 0 => Ok(entity),
        Some(_) => Err(ProviderError::Ambiguous {
            kind,
            name: name.to_string(),
        }),
    }
}

/// How the caller identified the entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// By server id.
    Id(String),
    /// By exact name.
    Name(String),
}

/// Resolve the `id` / `name` pair of a data source configuration.
///
/// Exactly one must be set, and it must be resolvable at read time.
pub fn resolve_identifier(
    id: &TriState<String>,
    name: &TriState<String>,
) -> Result<Identifier, ProviderError> {
    ensure_exclusive("id", id, "name", name)?;
    match (id, name) {
        (TriState::Null, TriState::Null) => Err(ProviderError::validation(
            "id",
            "one of 'id' or 'name' must be set",
        )),
        (TriState::Null, _) => resolved("name", name).map(Identifier::Name),
        _ => resolved("id", id).map(Identifier::Id),
    }
}

fn resolved(field: &str, value: &TriState<String>) -> Result<String, ProviderError> {
    match value {
        TriState::Known(v) if !v.trim().is_empty() => Ok(v.clone()),
        TriState::Known(_) => Err(ProviderError::validation(field, "must not be blank")),
        _ => Err(ProviderError::validation(
            field,
            "must be known before the lookup runs",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Candidate {
        id: &'static str,
        name: &'static str,
        deleted: bool,
    }

    impl Named for Candidate {
        fn name(&self) -> &str {
            self.name
        }

        fn is_deleted(&self) -> bool {
            self.deleted
        }
    }

    fn live(id: &'static str, name: &'static str) -> Candidate {
        Candidate {
            id,
            name,
            deleted: false,
        }
    }

    #[test]
    fn test_single_match() {
        let found = select_unique(
            EntityKind::Project,
            vec![live("a", "x"), live("b", "y")],
            "x",
        )
        .unwrap();
        assert_eq!(found.id, "a");
    }

    #[test]
    fn test_duplicates_are_ambiguous() {
        let err = select_unique(
            EntityKind::Project,
            vec![live("a", "x"), live("b", "x")],
            "x",
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::Ambiguous { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_empty_is_not_found() {
        let err = select_unique::<Candidate, _>(EntityKind::Project, vec![], "x").unwrap_err();
        assert!(matches!(err, ProviderError::NotFound { ref key, .. } if key == "x"));
    }

    #[test]
    fn test_match_is_exact() {
        let err = select_unique(
            EntityKind::Group,
            vec![live("a", "X"), live("b", "x ")],
            "x",
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_deleted_candidates_are_ignored() {
        let deleted = Candidate {
            id: "old",
            name: "x",
            deleted: true,
        };
        let found = select_unique(EntityKind::Role, vec![deleted.clone(), live("new", "x")], "x")
            .unwrap();
        assert_eq!(found.id, "new");

        let err = select_unique(EntityKind::Role, vec![deleted], "x").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_resolve_identifier() {
        let id = TriState::Known("p-1".to_string());
        let name = TriState::Known("billing".to_string());

        assert_eq!(
            resolve_identifier(&id, &TriState::Null).unwrap(),
            Identifier::Id("p-1".to_string())
        );
        assert_eq!(
            resolve_identifier(&TriState::Null, &name).unwrap(),
            Identifier::Name("billing".to_string())
        );
        assert!(matches!(
            resolve_identifier(&id, &name),
            Err(ProviderError::ConflictingInput { .. })
        ));
        assert!(matches!(
            resolve_identifier(&TriState::Unknown, &name),
            Err(ProviderError::ConflictingInput { .. })
        ));
        assert!(matches!(
            resolve_identifier(&TriState::Null, &TriState::Null),
            Err(ProviderError::Validation { .. })
        ));
        assert!(matches!(
            resolve_identifier(&TriState::Null, &TriState::Unknown),
            Err(ProviderError::Validation { ref field, .. }) if field == "name"
        ));
        assert!(matches!(
            resolve_identifier(&TriState::Known("  ".to_string()), &TriState::Null),
            Err(ProviderError::Validation { ref field, .. }) if field == "id"
        ));
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Outcome {
        Found,
        NotFound,
        Ambiguous,
    }

    fn classify(result: Result<Candidate, ProviderError>) -> Outcome {
        match result {
            Ok(_) => Outcome::Found,
            Err(ProviderError::NotFound { .. }) => Outcome::NotFound,
            Err(ProviderError::Ambiguous { .. }) => Outcome::Ambiguous,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    fn arb_candidates() -> impl Strategy<Value = Vec<Candidate>> {
        let names = prop_oneof![Just("x"), Just("y"), Just("z")];
        let ids = prop_oneof![Just("a"), Just("b"), Just("c"), Just("d")];
        proptest::collection::vec(
            (ids, names, any::<bool>()).prop_map(|(id, name, deleted)| Candidate {
                id,
                name,
                deleted,
            }),
            0..8,
        )
    }

    proptest! {
        #[test]
        fn prop_selection_is_order_independent(
            (candidates, shuffled) in arb_candidates()
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        ) {
            let a = select_unique(EntityKind::Project, candidates.clone(), "x");
            let b = select_unique(EntityKind::Project, shuffled, "x");
            let live_matches = candidates.iter().filter(|c| !c.deleted && c.name == "x").count();

            let (a, b) = (classify(a), classify(b));
            prop_assert_eq!(a, b);
            let expected = match live_matches {
                0 => Outcome::NotFound,
                1 => Outcome::Found,
                _ => Outcome::Ambiguous,
            };
            prop_assert_eq!(a, expected);
        }
    }
}
