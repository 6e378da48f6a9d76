//! Identity resolution used by HTTP handlers.
//!
//! The session only stores a user id; every request that needs an identity
//! re-reads the user so deleted or unknown ids stop authenticating.

use tracing::warn;

use crate::domain::{Error, User};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Resolve the session to a stored user or fail with `401 Unauthorized`.
pub async fn session_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let user_id = session.require_user_id()?;
    match state.users.find_user(user_id).await? {
        Some(user) => Ok(user),
        None => {
            warn!(%user_id, "session refers to an unknown user");
            session.clear();
            Err(Error::unauthorized("login required"))
        }
    }
}
