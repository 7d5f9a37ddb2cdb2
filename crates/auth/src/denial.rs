use thiserror::Error;

/// Reason a request was refused.
///
/// Denials are expected outcomes, not faults. `Display` renders the exact
/// reason string reported to clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Denial {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Token is missing information")]
    MissingInformation,

    #[error("Mismatched users")]
    MismatchedUsers,

    #[error("Perform login again")]
    LoginRequired,

    #[error("Admin authority needed")]
    AdminRequired,

    #[error("Token has a username different from the requested one")]
    UsernameMismatch,

    #[error("User is not in the group")]
    NotInGroup,

    /// A token failed verification; carries the codec's failure label.
    #[error("{0}")]
    Token(&'static str),
}

impl Denial {
    /// Whether the caller is authenticated but lacks the authority the
    /// policy asks for, as opposed to presenting unusable credentials.
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            Denial::AdminRequired | Denial::UsernameMismatch | Denial::NotInGroup
        )
    }

    /// Stable machine-readable code for the denial.
    pub fn code(&self) -> &'static str {
        match self {
            Denial::Unauthorized => "unauthorized",
            Denial::MissingInformation => "incomplete_token",
            Denial::MismatchedUsers => "mismatched_users",
            Denial::LoginRequired => "login_required",
            Denial::AdminRequired => "admin_required",
            Denial::UsernameMismatch => "username_mismatch",
            Denial::NotInGroup => "not_in_group",
            Denial::Token(_) => "invalid_token",
        }
    }
}
