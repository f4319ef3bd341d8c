use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{application::services::event_bus::CollectionBus, domain::events::CollectionChanged};

const DEFAULT_CAPACITY: usize = 64;

/// In-process fan-out of collection changes to presentation subscribers.
pub struct BroadcastCollectionBus {
    sender: broadcast::Sender<CollectionChanged>,
}

impl BroadcastCollectionBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChanged> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastCollectionBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionBus for BroadcastCollectionBus {
    async fn publish(&self, event: CollectionChanged) -> anyhow::Result<()> {
        // no subscriber is fine, nobody is rendering
        let _ = self.sender.send(event);
        Ok(())
    }
}
