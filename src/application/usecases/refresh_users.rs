use std::sync::Arc;

use crate::{
    application::services::collection::UserCollection,
    domain::{errors::DomainError, repositories::UserStore},
};

pub struct RefreshUsersUseCase {
    store: Arc<dyn UserStore>,
    collection: Arc<UserCollection>,
}

impl RefreshUsersUseCase {
    pub fn new(store: Arc<dyn UserStore>, collection: Arc<UserCollection>) -> Self {
        Self { store, collection }
    }

    /// Returns the collection revision after the refresh.
    pub async fn execute(&self) -> Result<u64, DomainError> {
        self.collection.refresh(self.store.as_ref()).await
    }
}
