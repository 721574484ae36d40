use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

use sharecal_core::config::SharecalConfig;
use sharecal_core::store::EventStore;
use sharecal_core::users::UserDirectory;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SharecalConfig>,
    // Events are re-read from disk on every request so CLI edits show up
    // without a restart.
    pub store: Arc<EventStore>,
    pub users: Arc<RwLock<UserDirectory>>,
}

impl AppState {
    pub fn new(config: SharecalConfig) -> Result<Self> {
        let store = EventStore::open(&config)?;
        let users = UserDirectory::load(&config.users_path())?;

        Ok(AppState {
            config: Arc::new(config),
            store: Arc::new(store),
            users: Arc::new(RwLock::new(users)),
        })
    }
}
