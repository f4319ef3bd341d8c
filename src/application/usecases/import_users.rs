use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::{
    application::services::collection::UserCollection,
    domain::errors::DomainError,
    infrastructure::tabular::import_users,
};

/// Loads a spreadsheet into the collection. Nothing is sent to the store;
/// rows are persisted only when edited and saved one by one.
pub struct ImportUsersUseCase {
    collection: Arc<UserCollection>,
}

impl ImportUsersUseCase {
    pub fn new(collection: Arc<UserCollection>) -> Self {
        Self { collection }
    }

    /// Returns the number of imported rows.
    pub async fn execute(&self, bytes: &[u8]) -> Result<usize, DomainError> {
        let users = import_users(bytes)?;
        let count = users.len();
        self.collection.replace_all(users).await;
        info!(count, "imported users");
        Ok(count)
    }

    pub async fn execute_file(&self, path: &Path) -> Result<usize, DomainError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::Parse(format!("cannot read {}: {e}", path.display())))?;
        self.execute(&bytes).await
    }
}
