//! Authorization policies an endpoint can require.

use std::collections::HashSet;

use crate::{Denial, TokenClaims};

/// Rule the caller's identity must satisfy.
///
/// Built per request from route context; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Any authenticated identity.
    Unrestricted,

    /// The subject must be exactly this username.
    SameUser { expected_username: String },

    /// The role must be [`Role::ADMIN`](crate::Role::ADMIN).
    Administrator,

    /// The email must be one of the group's members.
    GroupMember { allowed_emails: HashSet<String> },
}

impl AuthPolicy {
    pub fn same_user(expected_username: impl Into<String>) -> Self {
        AuthPolicy::SameUser {
            expected_username: expected_username.into(),
        }
    }

    pub fn group_member<I, S>(allowed_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuthPolicy::GroupMember {
            allowed_emails: allowed_emails.into_iter().map(Into::into).collect(),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthPolicy::Unrestricted => "unrestricted",
            AuthPolicy::SameUser { .. } => "same_user",
            AuthPolicy::Administrator => "administrator",
            AuthPolicy::GroupMember { .. } => "group_member",
        }
    }

    /// Decide whether `identity` satisfies this policy.
    ///
    /// - No IO
    /// - No panics
    /// - Looks only at the identity fields, never at expiry
    pub fn evaluate(&self, identity: &TokenClaims) -> Result<(), Denial> {
        match self {
            AuthPolicy::Unrestricted => Ok(()),
            AuthPolicy::SameUser { expected_username } => {
                if identity.username == *expected_username {
                    Ok(())
                } else {
                    Err(Denial::UsernameMismatch)
                }
            }
            AuthPolicy::Administrator => {
                if identity.role.is_admin() {
                    Ok(())
                } else {
                    Err(Denial::AdminRequired)
                }
            }
            AuthPolicy::GroupMember { allowed_emails } => {
                if allowed_emails.contains(&identity.email) {
                    Ok(())
                } else {
                    Err(Denial::NotInGroup)
                }
            }
        }
    }
}
