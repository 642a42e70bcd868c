use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{info, warn};

use angebot_core::config::{AppConfig, ConfigError, LoadOptions};
use angebot_core::{
    CrmConnector, InMemorySessionStore, MessageSender, NoopCrmConnector, Processor, SessionStore,
};
use angebot_whatsapp::api::WhatsAppClient;

use crate::crm::HubspotConnector;
use crate::health;
use crate::routes::{self, AppState};

pub struct Application {
    pub config: AppConfig,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    Ok(bootstrap_with_config(config))
}

/// Constructs every collaborator once and injects it; component lifecycles
/// are owned here, not inside the core.
pub fn bootstrap_with_config(config: AppConfig) -> Application {
    let client = Arc::new(WhatsAppClient::new(&config.whatsapp));
    let store: Arc<dyn SessionStore> =
        Arc::new(InMemorySessionStore::new(Duration::from_secs(config.session.ttl_secs)));

    let crm: Arc<dyn CrmConnector> = match HubspotConnector::try_new(&config.hubspot) {
        Some(connector) => {
            info!(
                event_name = "system.bootstrap.crm_connected",
                correlation_id = "bootstrap",
                "hubspot connector configured"
            );
            Arc::new(connector)
        }
        None => {
            warn!(
                event_name = "system.bootstrap.crm_disabled",
                correlation_id = "bootstrap",
                "hubspot is disabled; contact upserts will be dropped"
            );
            Arc::new(NoopCrmConnector)
        }
    };

    let sender: Arc<dyn MessageSender> = client.clone();
    let processor = Arc::new(Processor::new(store, sender, crm));

    let state = AppState {
        verify_token: config.whatsapp.verify_token.expose_secret().to_string(),
        client,
        processor,
    };
    let router = routes::router(state).merge(health::router());

    Application { config, router }
}
