use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::{
    application::services::collection::UserCollection,
    domain::errors::DomainError,
    infrastructure::tabular::{ExportFormat, export_users},
};

pub struct ExportUsersUseCase {
    collection: Arc<UserCollection>,
}

impl ExportUsersUseCase {
    pub fn new(collection: Arc<UserCollection>) -> Self {
        Self { collection }
    }

    /// Serializes what is currently displayed.
    pub async fn execute(&self, format: ExportFormat) -> Result<Vec<u8>, DomainError> {
        let users = self.collection.snapshot().await;
        export_users(&users, format)
    }

    /// Writes the export to `path`, choosing the format from its extension.
    pub async fn execute_to_file(&self, path: &Path) -> Result<ExportFormat, DomainError> {
        let format = ExportFormat::from_path(path);
        let bytes = self.execute(format).await?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| DomainError::Export(format!("cannot write {}: {e}", path.display())))?;
        info!(path = %path.display(), format = format.extension(), "exported users");
        Ok(format)
    }
}
