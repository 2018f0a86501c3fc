use std::sync::Arc;

use crate::config::Config;
use crate::services::lead_store::LeadStore;
use crate::services::router::LeadRouter;
use crate::websocket::SocketHub;

#[derive(Clone)]
pub struct AppState {
    pub hub: SocketHub,
    pub leads: Arc<LeadStore>,
    pub router: Arc<LeadRouter>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        Self {
            hub: SocketHub::new(),
            leads: Arc::new(LeadStore::new()),
            router: Arc::new(LeadRouter::new(config.classifier.clone())),
            config,
        }
    }
}
