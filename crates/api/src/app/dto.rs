use serde::Deserialize;
use serde_json::json;

use spendbook_auth::TokenClaims;

#[derive(Debug, Deserialize)]
pub struct PutGroupRequest {
    pub members: Vec<String>,
}

pub fn identity_to_json(identity: &TokenClaims) -> serde_json::Value {
    json!({
        "username": identity.username,
        "email": identity.email,
        "role": identity.role.as_str(),
        "expiresAt": identity.expires_at.to_rfc3339(),
    })
}
