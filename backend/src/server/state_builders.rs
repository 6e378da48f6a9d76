//! Builders wiring the domain services over the configured store.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use teamboard::domain::ports::{ProjectRepository, UserRepository};
use teamboard::domain::{AccountService, AdminSecret, PasswordHasher, ProjectService};
use teamboard::inbound::http::state::HttpState;
use teamboard::outbound::persistence::{
    DocumentStore, DocumentStoreConfig, DocumentStoreConfigError, InMemoryStore,
};

/// Wire both services over one store instance.
///
/// `S` serves as user and project repository so completion credits and
/// logins observe the same records.
fn services_over<S>(store: Arc<S>, admin_secret: Option<AdminSecret>) -> HttpState
where
    S: UserRepository + ProjectRepository + 'static,
{
    let accounts = AccountService::new(
        store.clone(),
        Arc::new(PasswordHasher::default()),
        admin_secret,
    );
    let projects = ProjectService::new(store.clone(), store, Arc::new(DefaultClock));
    HttpState::from_services(accounts, projects)
}

/// Build handler state over the document store when one is configured,
/// otherwise over a fresh in-memory store.
pub(crate) fn build_http_state(
    store: Option<DocumentStoreConfig>,
    admin_secret: Option<AdminSecret>,
) -> Result<HttpState, DocumentStoreConfigError> {
    match store {
        Some(config) => {
            info!(base_url = %config.base_url, namespace = %config.namespace, "using document store");
            let store = DocumentStore::new(config)?;
            Ok(services_over(Arc::new(store), admin_secret))
        }
        None => {
            info!("using in-memory store; records are lost on restart");
            Ok(services_over(Arc::new(InMemoryStore::new()), admin_secret))
        }
    }
}
