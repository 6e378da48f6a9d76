//! Cache policy for session-bound responses.

use actix_web::http::header::{CacheControl, CacheDirective};

/// `Cache-Control` for responses that depend on who is logged in.
///
/// Shared caches must not keep them and browsers revalidate on every use, so
/// a logout is never masked by a cached identity.
pub fn session_bound() -> CacheControl {
    CacheControl(vec![
        CacheDirective::Private,
        CacheDirective::NoCache,
        CacheDirective::MustRevalidate,
    ])
}
