use crate::config::{DeliveryPolicy, ServiceConfig};
use crate::notifications::NotificationHub;
use crate::repository::{ContentStore, IdGenerator, IdentityStore, SessionRegistry};

/// Shared state of the service, built once at startup.
///
/// Every `BackendService` behind a dispatch proxy must hold the same context,
/// otherwise users, videos and sessions are silently partitioned.
pub struct ServiceContext {
    pub identity: IdentityStore,
    pub content: ContentStore,
    pub sessions: SessionRegistry,
    pub hub: NotificationHub,
    pub ids: IdGenerator,
    pub delivery: DeliveryPolicy,
}

impl ServiceContext {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            identity: IdentityStore::new(),
            content: ContentStore::new(config.video_id_length),
            sessions: SessionRegistry::new(config.token_length),
            hub: NotificationHub::new(),
            ids: IdGenerator::new(config.id_max_attempts),
            delivery: config.delivery,
        }
    }
}

impl Default for ServiceContext {
    fn default() -> Self {
        Self::new(&ServiceConfig::default())
    }
}
