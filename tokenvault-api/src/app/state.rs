use std::sync::Arc;
use tokenvault_core::AccountManager;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountManager>,
}
