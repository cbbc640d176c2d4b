//! CLI subcommand implementations.

pub mod account;
pub mod run;

use std::sync::Arc;

use anyhow::Result;

use leveltest_api::auth::HttpAuthBackend;
use leveltest_api::config::ClientConfig;
use leveltest_auth::context::{SessionAuth, SessionContext};
use leveltest_auth::store::FileTokenStore;

/// Wire the auth lifecycle against the configured backend and the
/// well-known token store.
pub(crate) fn build_auth(config: &ClientConfig) -> Result<SessionAuth> {
    let context = Arc::new(SessionContext::new());
    let store = Arc::new(FileTokenStore::default_store()?);
    let backend = Arc::new(HttpAuthBackend::new(config));
    Ok(SessionAuth::new(store, backend, context))
}
