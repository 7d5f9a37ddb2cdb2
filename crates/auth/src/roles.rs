use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role carried in a token's `role` claim.
///
/// Roles are opaque strings; the only value the gate interprets is
/// [`Role::ADMIN`]. An empty role decodes successfully and is rejected later
/// by claim validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Administrator role value (case-sensitive).
    pub const ADMIN: Role = Role(Cow::Borrowed("Admin"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_admin(&self) -> bool {
        *self == Self::ADMIN
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
