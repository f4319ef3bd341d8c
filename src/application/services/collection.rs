use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    application::services::event_bus::CollectionBus,
    domain::{
        errors::DomainError,
        events::{ChangeSource, CollectionChanged},
        models::{UserId, UserRecord},
        repositories::UserStore,
    },
};

#[derive(Default)]
struct CollectionState {
    users: Vec<UserRecord>,
    revision: u64,
    applied_ticket: u64,
}

/// The displayed list of users. `refresh` and `replace_all` are the only
/// writes and both swap the whole list; nothing is patched in place.
pub struct UserCollection {
    state: RwLock<CollectionState>,
    tickets: AtomicU64,
    bus: Arc<dyn CollectionBus>,
}

impl UserCollection {
    pub fn new(bus: Arc<dyn CollectionBus>) -> Self {
        Self {
            state: RwLock::new(CollectionState::default()),
            tickets: AtomicU64::new(0),
            bus,
        }
    }

    /// Reloads the list from the store. On failure the current list stays.
    ///
    /// A refresh that started before another applied replacement is
    /// discarded, so the latest-started refresh decides what is shown.
    pub async fn refresh(&self, store: &dyn UserStore) -> Result<u64, DomainError> {
        let ticket = self.next_ticket();
        let users = store.list().await?;
        match self.apply(ticket, users, ChangeSource::Refresh).await {
            Some(revision) => Ok(revision),
            None => {
                debug!(ticket, "dropping refresh result overtaken by a newer replacement");
                Ok(self.revision().await)
            }
        }
    }

    /// Replaces the list without contacting the store (import path).
    ///
    /// Always applied: refreshes started before the import lose to it.
    pub async fn replace_all(&self, users: Vec<UserRecord>) -> u64 {
        let event = {
            let mut state = self.state.write().await;
            // ticket taken under the write lock, so no applied ticket can exceed it
            let ticket = self.next_ticket();
            Self::swap(&mut state, ticket, users, ChangeSource::Import)
        };
        self.publish(event).await
    }

    pub async fn snapshot(&self) -> Vec<UserRecord> {
        self.state.read().await.users.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, id: &UserId) -> Option<UserRecord> {
        let state = self.state.read().await;
        state.users.iter().find(|u| &u.id == id).cloned()
    }

    pub async fn revision(&self) -> u64 {
        self.state.read().await.revision
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn apply(&self, ticket: u64, users: Vec<UserRecord>, source: ChangeSource) -> Option<u64> {
        let event = {
            let mut state = self.state.write().await;
            if ticket < state.applied_ticket {
                return None;
            }
            Self::swap(&mut state, ticket, users, source)
        };
        Some(self.publish(event).await)
    }

    fn swap(
        state: &mut CollectionState,
        ticket: u64,
        users: Vec<UserRecord>,
        source: ChangeSource,
    ) -> CollectionChanged {
        state.applied_ticket = ticket;
        state.users = users;
        state.revision += 1;
        CollectionChanged {
            revision: state.revision,
            len: state.users.len(),
            source,
        }
    }

    async fn publish(&self, event: CollectionChanged) -> u64 {
        debug!(revision = event.revision, len = event.len, source = ?event.source, "collection replaced");
        if let Err(err) = self.bus.publish(event).await {
            warn!("failed to publish collection change: {err:?}");
        }
        event.revision
    }
}
