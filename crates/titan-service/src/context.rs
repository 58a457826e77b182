//! # Service Context
//!
//! Shared state and dependency wiring for the use-case services.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::Config;
use crate::usecases::{HubService, UnitService};
use titan_domain::DomainEvent;
use titan_persistence::{
    HubRepository, InMemoryHubRepository, InMemoryUnitRepository, UnitRepository,
};

/// Application context shared by every use-case
#[derive(Clone)]
pub struct ServiceContext {
    /// Unit repository
    pub units: Arc<dyn UnitRepository>,

    /// Hub repository
    pub hubs: Arc<dyn HubRepository>,

    /// Runtime configuration
    pub config: Arc<Config>,

    /// Domain event broadcaster
    events_tx: broadcast::Sender<DomainEvent>,
}

impl ServiceContext {
    pub fn new(
        units: Arc<dyn UnitRepository>,
        hubs: Arc<dyn HubRepository>,
        config: Config,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            units,
            hubs,
            config: Arc::new(config),
            events_tx,
        }
    }

    /// Context backed by the in-memory adapters
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            Arc::new(InMemoryUnitRepository::new()),
            Arc::new(InMemoryHubRepository::new()),
            config,
        )
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events_tx.subscribe()
    }

    /// Broadcast events in order. Having no subscribers is not an error.
    pub fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            let name = event.event_name();
            if self.events_tx.send(event).is_err() {
                debug!(event = name, "No subscribers for domain event");
            }
        }
    }

    pub fn unit_service(&self) -> UnitService {
        UnitService::new(self.clone())
    }

    pub fn hub_service(&self) -> HubService {
        HubService::new(self.clone())
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("config", &self.config)
            .field("subscribers", &self.events_tx.receiver_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use titan_domain::HubEventKind;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let ctx = ServiceContext::in_memory(Config::default());
        let mut rx = ctx.subscribe();
        let unit_id = Uuid::new_v4();

        ctx.publish(vec![DomainEvent::new(
            None,
            HubEventKind::UnitAllocated { unit_id },
        )]);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.unit_id(), unit_id);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let ctx = ServiceContext::in_memory(Config::default());
        ctx.publish(vec![DomainEvent::new(
            None,
            HubEventKind::UnitDeallocated {
                unit_id: Uuid::new_v4(),
            },
        )]);
    }
}
