use std::sync::Arc;

use tracing::info;

use crate::{
    application::services::collection::UserCollection,
    domain::{errors::DomainError, models::UserId, repositories::UserStore},
};

pub struct DeleteUserUseCase {
    store: Arc<dyn UserStore>,
    collection: Arc<UserCollection>,
}

impl DeleteUserUseCase {
    pub fn new(store: Arc<dyn UserStore>, collection: Arc<UserCollection>) -> Self {
        Self { store, collection }
    }

    /// Deletes remotely, then reloads. A failed delete leaves the displayed
    /// list untouched.
    pub async fn execute(&self, id: &UserId) -> Result<(), DomainError> {
        self.store.delete(id).await?;
        info!(%id, "user deleted");
        self.collection.refresh(self.store.as_ref()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::models::{Role, UserRecord},
        infrastructure::{
            events::broadcast::BroadcastCollectionBus, repositories::in_memory::InMemoryUserStore,
        },
    };

    fn user(id: u64) -> UserRecord {
        UserRecord {
            id: UserId::from(id),
            name: "n".into(),
            username: "u".into(),
            email: "e@x".into(),
            birthday: None,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn delete_refreshes_collection() {
        let store = Arc::new(InMemoryUserStore::with_users(vec![user(1), user(2)]));
        let collection = Arc::new(UserCollection::new(Arc::new(BroadcastCollectionBus::new())));
        collection.refresh(store.as_ref()).await.unwrap();
        let usecase = DeleteUserUseCase::new(store.clone(), collection.clone());

        usecase.execute(&UserId::from(1)).await.unwrap();

        assert_eq!(collection.snapshot().await, vec![user(2)]);
    }

    #[tokio::test]
    async fn deleting_missing_id_is_not_found_and_keeps_collection() {
        let store = Arc::new(InMemoryUserStore::with_users(vec![user(1)]));
        let collection = Arc::new(UserCollection::new(Arc::new(BroadcastCollectionBus::new())));
        collection.refresh(store.as_ref()).await.unwrap();
        let revision = collection.revision().await;
        let usecase = DeleteUserUseCase::new(store.clone(), collection.clone());

        let result = usecase.execute(&UserId::from(42)).await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert_eq!(collection.snapshot().await, vec![user(1)]);
        assert_eq!(collection.revision().await, revision);
    }
}
