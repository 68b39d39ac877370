//! Domain primitives shared by the store, the services and the HTTP layer.
//!
//! Expected outcomes (uniqueness conflicts, rejected credentials, invalid
//! tokens) are modelled as values rather than errors, so callers match on
//! them instead of inspecting error strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The uniqueness constraint that stopped an account from being provisioned.
///
/// Variants are declared in the order provisioning touches them, so the first
/// one that fires is always the one reported.
///
/// # Examples
///
/// ```rust
/// use swanpipe::domain::ConflictReason;
///
/// assert_eq!(ConflictReason::LoginId.to_string(), "loginId");
/// assert!(ConflictReason::LoginId < ConflictReason::Pun);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictReason {
    /// A login with the requested id already exists.
    LoginId,

    /// The signup token has already been consumed.
    SignupToken,

    /// An actor with the requested preferred user name already exists.
    Pun,

    /// The login/actor link could not be written.
    OwnerLink,
}

impl ConflictReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoginId => "loginId",
            Self::SignupToken => "signupToken",
            Self::Pun => "pun",
            Self::OwnerLink => "ownerLink",
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_camel_case() {
        let json = serde_json::to_string(&ConflictReason::SignupToken).unwrap();
        assert_eq!(json, "\"signupToken\"");

        let back: ConflictReason = serde_json::from_str("\"ownerLink\"").unwrap();
        assert_eq!(back, ConflictReason::OwnerLink);
    }

    #[test]
    fn display_matches_wire_name() {
        for reason in [
            ConflictReason::LoginId,
            ConflictReason::SignupToken,
            ConflictReason::Pun,
            ConflictReason::OwnerLink,
        ] {
            let wire = serde_json::to_value(reason).unwrap();
            assert_eq!(wire.as_str(), Some(reason.as_str()));
        }
    }
}
