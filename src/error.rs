//! Error types for `seqhalve`.

use thiserror::Error;

/// Errors surfaced when constructing a scheduler.
///
/// Everything that can go wrong *after* construction (late rewards, unknown arm ids,
/// non-finite rewards, clock skew) is absorbed by the scheduler and never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HalvingError {
    /// `k = 0`: there is no elimination ladder over an empty arm set.
    #[error("a bandit problem needs at least one arm")]
    NoArms,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arms_message_is_stable() {
        assert_eq!(
            HalvingError::NoArms.to_string(),
            "a bandit problem needs at least one arm"
        );
    }
}
