//! Fetch-or-skip decision.
//!
//! Precedence:
//! 1. local file missing → fetch
//! 2. `overwrite` → fetch
//! 3. `keep` → skip
//! 4. identities differ → fetch, otherwise skip
//!
//! The local file is only hashed for step 4.

use std::fmt;

use fetchini_core::{ContentIdentity, FetchPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchReason {
    /// No local file yet.
    Missing,
    /// `overwrite` forced the fetch.
    Forced,
    /// Local and remote identities differ.
    Changed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `keep` protects the existing local file.
    Kept,
    /// Local file already matches the remote.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    Fetch(FetchReason),
    Skip(SkipReason),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Kept => write!(f, "kept"),
            SkipReason::Unchanged => write!(f, "unchanged"),
        }
    }
}

impl fmt::Display for FetchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchReason::Missing => write!(f, "new"),
            FetchReason::Forced => write!(f, "forced"),
            FetchReason::Changed => write!(f, "changed"),
        }
    }
}

/// `local_identity` is called at most once, and only when neither the
/// missing file nor the policy settles the outcome.
pub fn decide<E>(
    local_exists: bool,
    remote: &ContentIdentity,
    policy: FetchPolicy,
    local_identity: impl FnOnce() -> Result<ContentIdentity, E>,
) -> Result<FetchDecision, E> {
    if !local_exists {
        return Ok(FetchDecision::Fetch(FetchReason::Missing));
    }
    if policy.overwrite {
        return Ok(FetchDecision::Fetch(FetchReason::Forced));
    }
    if policy.keep {
        return Ok(FetchDecision::Skip(SkipReason::Kept));
    }
    if local_identity()? == *remote {
        Ok(FetchDecision::Skip(SkipReason::Unchanged))
    } else {
        Ok(FetchDecision::Fetch(FetchReason::Changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn id(s: &str) -> ContentIdentity {
        ContentIdentity::new(s)
    }

    #[rstest]
    #[case(None, false, false, FetchDecision::Fetch(FetchReason::Missing))]
    #[case(None, true, false, FetchDecision::Fetch(FetchReason::Missing))]
    #[case(None, false, true, FetchDecision::Fetch(FetchReason::Missing))]
    #[case(Some("aaa"), false, false, FetchDecision::Skip(SkipReason::Unchanged))]
    #[case(Some("bbb"), false, false, FetchDecision::Fetch(FetchReason::Changed))]
    #[case(Some("aaa"), false, true, FetchDecision::Fetch(FetchReason::Forced))]
    #[case(Some("bbb"), true, false, FetchDecision::Skip(SkipReason::Kept))]
    #[case(Some("aaa"), true, true, FetchDecision::Fetch(FetchReason::Forced))]
    fn decision_table(
        #[case] local: Option<&str>,
        #[case] keep: bool,
        #[case] overwrite: bool,
        #[case] expected: FetchDecision,
    ) {
        let decision = decide(
            local.is_some(),
            &id("aaa"),
            FetchPolicy { keep, overwrite },
            || local.map(id).ok_or("hashed a missing file"),
        );
        assert_eq!(decision, Ok(expected));
    }

    #[rstest]
    #[case(true, false, FetchDecision::Skip(SkipReason::Kept))]
    #[case(false, true, FetchDecision::Fetch(FetchReason::Forced))]
    fn policy_settles_without_hashing(
        #[case] keep: bool,
        #[case] overwrite: bool,
        #[case] expected: FetchDecision,
    ) {
        let decision = decide(true, &id("aaa"), FetchPolicy { keep, overwrite }, || {
            Err("local file must not be read")
        });
        assert_eq!(decision, Ok(expected));
    }

    #[test]
    fn hashing_error_is_returned() {
        let decision = decide(true, &id("aaa"), FetchPolicy::default(), || {
            Err::<ContentIdentity, _>("unreadable")
        });
        assert_eq!(decision, Err("unreadable"));
    }
}
