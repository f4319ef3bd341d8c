use std::sync::Arc;

use tokio::sync::broadcast::{Receiver, error::TryRecvError};
use tracing::debug;

use crate::{
    application::services::collection::UserCollection,
    domain::{errors::DomainError, events::CollectionChanged},
    presentation::console::grid::render_grid,
};

/// Re-renders the grid whenever the collection announced a change.
pub struct ConsoleView {
    changes: Receiver<CollectionChanged>,
    collection: Arc<UserCollection>,
}

impl ConsoleView {
    pub fn new(
        changes: Receiver<CollectionChanged>,
        collection: Arc<UserCollection>,
    ) -> Self {
        Self {
            changes,
            collection,
        }
    }

    /// The freshly rendered grid if any change arrived since the last call.
    pub async fn render_pending(&mut self) -> Option<String> {
        let mut changed = false;
        loop {
            match self.changes.try_recv() {
                Ok(event) => {
                    debug!(revision = event.revision, "collection changed");
                    changed = true;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "missed collection changes");
                    changed = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if !changed {
            return None;
        }
        Some(render_grid(&self.collection.snapshot().await))
    }
}

/// User-facing description of a failed action.
pub fn describe_error(err: &DomainError) -> String {
    match err {
        DomainError::Validation(errors) => {
            let mut out = String::from("Please fix the form:");
            for error in errors.errors() {
                out.push_str(&format!("\n  {}: {}", error.field.as_str(), error.message));
            }
            out
        }
        DomainError::NotFound(what) => format!("{what} no longer exists; reload the list"),
        DomainError::Transport(reason) => format!("Could not reach the user service: {reason}"),
        other => other.to_string(),
    }
}
