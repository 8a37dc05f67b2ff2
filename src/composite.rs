//! Reconciliation for nested objects that are written as one unit.
//!
//! Experiment `repo_info` is the motivating case: the object is sent whole or
//! not at all, and some write endpoints accept it without echoing it back.
//! Absence from a write response is therefore never read as a deletion unless
//! the user asked for one.

use tracing::trace;

use crate::tristate::TriState;

/// The request-body field for a composite object.
///
/// `Known` objects are sent whole; `Null` and `Unknown` omit the field.
pub fn build_update_payload<T: Clone>(desired: &TriState<T>) -> Option<T> {
    desired.as_known().cloned()
}

/// Decide the stored value after a create or update.
///
/// * `in_config`: whether the attribute was set in configuration at all.
/// * `submitted`: the planned value that was sent (or withheld).
/// * `echoed`: what the write response returned for the field.
/// * `prior`: what state held before the write.
///
/// Rules, in order:
///
/// 1. Not in config: keep `prior`, whatever the server returned.
/// 2. In config, nothing echoed, `submitted` was `Null` or `Unknown`: keep `prior`.
/// 3. Otherwise adopt the echo. A missing echo becomes `Null`.
pub fn reconcile_after_write<T: Clone>(
    in_config: bool,
    submitted: &TriState<T>,
    echoed: Option<T>,
    prior: &TriState<T>,
) -> TriState<T> {
    if !in_config {
        trace!("Composite not configured, keeping prior value");
        return prior.clone();
    }

    match (echoed, submitted) {
        (None, TriState::Null | TriState::Unknown) => {
            trace!("Composite not echoed, keeping prior value");
            prior.clone()
        },
        (echoed, _) => TriState::from(echoed),
    }
}

/// Lift a composite from a read response.
pub fn lift_on_read<T>(server: Option<T>) -> TriState<T> {
    TriState::from(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepoInfo;
    use proptest::prelude::*;

    fn repo(commit: &str) -> RepoInfo {
        RepoInfo {
            commit: Some(commit.to_string()),
            branch: Some("main".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_payload_is_all_or_nothing() {
        assert_eq!(build_update_payload(&TriState::Known(repo("abc"))), Some(repo("abc")));
        assert_eq!(build_update_payload::<RepoInfo>(&TriState::Null), None);
        assert_eq!(build_update_payload::<RepoInfo>(&TriState::Unknown), None);
    }

    #[test]
    fn test_absent_from_config_ignores_server() {
        let prior = TriState::Known(repo("old"));
        let result = reconcile_after_write(false, &TriState::Null, Some(repo("server")), &prior);
        assert_eq!(result, prior);
    }

    #[test]
    fn test_absent_from_config_with_nothing_stored_stays_null() {
        let result =
            reconcile_after_write(false, &TriState::Unknown, Some(repo("server")), &TriState::Null);
        assert_eq!(result, TriState::Null);
    }

    #[test]
    fn test_silence_after_unknown_or_null_keeps_prior() {
        let prior = TriState::Known(repo("old"));
        assert_eq!(
            reconcile_after_write(true, &TriState::Unknown, None, &prior),
            prior
        );
        assert_eq!(reconcile_after_write(true, &TriState::Null, None, &prior), prior);
    }

    #[test]
    fn test_server_echo_is_adopted() {
        let prior = TriState::Known(repo("old"));
        let result = reconcile_after_write(
            true,
            &TriState::Known(repo("new")),
            Some(repo("new-normalized")),
            &prior,
        );
        assert_eq!(result, TriState::Known(repo("new-normalized")));

        let result =
            reconcile_after_write(true, &TriState::Unknown, Some(repo("computed")), &prior);
        assert_eq!(result, TriState::Known(repo("computed")));
    }

    #[test]
    fn test_known_submitted_but_not_echoed_becomes_null() {
        let prior = TriState::Known(repo("old"));
        let result = reconcile_after_write(true, &TriState::Known(repo("new")), None, &prior);
        assert_eq!(result, TriState::Null);
    }

    fn arb_tristate() -> impl Strategy<Value = TriState<String>> {
        prop_oneof![
            "[a-z]{1,6}".prop_map(TriState::Known),
            Just(TriState::Null),
            Just(TriState::Unknown),
        ]
    }

    proptest! {
        #[test]
        fn prop_preserve_on_absence(
            submitted in arb_tristate(),
            prior in arb_tristate(),
            echoed in proptest::option::of("[a-z]{1,6}"),
        ) {
            let result = reconcile_after_write(false, &submitted, echoed, &prior);
            prop_assert_eq!(result, prior);
        }
    }
}
