use async_trait::async_trait;

use crate::domain::events::CollectionChanged;

#[async_trait]
pub trait CollectionBus: Send + Sync {
    async fn publish(&self, event: CollectionChanged) -> anyhow::Result<()>;
}
