//! HTTP API: reference caller of the request gate.
//!
//! Every protected handler pulls the request's credentials, builds the
//! [`AuthPolicy`](spendbook_auth::AuthPolicy) its route needs, and lets
//! [`authz::authorize_request`] decide. Renewed access tokens are attached
//! to the response through the same transport the client used.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
