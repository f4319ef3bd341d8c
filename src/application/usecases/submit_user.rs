use std::sync::Arc;

use tracing::warn;

use crate::{
    application::services::{collection::UserCollection, edit_session::EditSession},
    domain::{
        errors::DomainError,
        models::{UserForm, UserRecord},
        repositories::UserStore,
    },
};

pub struct SubmitUserUseCase {
    store: Arc<dyn UserStore>,
    collection: Arc<UserCollection>,
}

impl SubmitUserUseCase {
    pub fn new(store: Arc<dyn UserStore>, collection: Arc<UserCollection>) -> Self {
        Self { store, collection }
    }

    /// Creates or updates depending on the session, then reloads the
    /// collection so the store's version of the record is what is shown.
    pub async fn execute(
        &self,
        session: &mut EditSession,
        form: UserForm,
    ) -> Result<UserRecord, DomainError> {
        let len = self.collection.len().await;
        let stored = session.submit(form, len, self.store.as_ref()).await?;

        if let Err(err) = self.collection.refresh(self.store.as_ref()).await {
            warn!(id = %stored.id, "user saved but the list could not be reloaded: {err}");
            return Err(err);
        }
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        application::services::edit_session::SessionState,
        domain::models::{Role, UserId},
        infrastructure::{
            events::broadcast::BroadcastCollectionBus,
            repositories::in_memory::{InMemoryUserStore, StoreCall},
        },
    };

    fn form() -> UserForm {
        UserForm {
            name: "Ann".into(),
            username: "ann1".into(),
            email: "a@x.com".into(),
            birthday: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            role: Role::Admin,
        }
    }

    fn existing(id: u64) -> UserRecord {
        UserRecord {
            id: UserId::from(id),
            name: format!("user{id}"),
            username: format!("user{id}"),
            email: format!("user{id}@x.com"),
            birthday: None,
            role: Role::User,
        }
    }

    fn setup(users: Vec<UserRecord>) -> (Arc<InMemoryUserStore>, Arc<UserCollection>, SubmitUserUseCase) {
        let store = Arc::new(InMemoryUserStore::with_users(users));
        let collection = Arc::new(UserCollection::new(Arc::new(BroadcastCollectionBus::new())));
        let usecase = SubmitUserUseCase::new(store.clone(), collection.clone());
        (store, collection, usecase)
    }

    #[tokio::test]
    async fn create_sends_one_post_and_refreshes() {
        let (store, collection, usecase) = setup(vec![existing(1)]);
        collection.refresh(store.as_ref()).await.unwrap();
        let mut session = EditSession::new();
        session.open_create();

        let saved = usecase.execute(&mut session, form()).await.unwrap();

        let creates: Vec<StoreCall> = store
            .calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, StoreCall::Create(_)))
            .collect();
        assert_eq!(creates.len(), 1);
        let StoreCall::Create(sent) = &creates[0] else {
            unreachable!()
        };
        assert_eq!(sent.id, Some(UserId::from(2)));
        assert_eq!(
            serde_json::to_value(sent).unwrap()["birthday"],
            serde_json::json!("1990-05-01")
        );

        assert_eq!(session.state(), &SessionState::Closed);
        assert_eq!(collection.len().await, 2);
        assert_eq!(collection.get(&saved.id).await, Some(saved));
    }

    #[tokio::test]
    async fn edit_persists_submitted_fields_under_same_id() {
        let (store, collection, usecase) = setup(vec![existing(1), existing(2)]);
        collection.refresh(store.as_ref()).await.unwrap();
        let mut session = EditSession::new();
        session.open_edit(collection.get(&UserId::from(2)).await.unwrap());

        usecase.execute(&mut session, form()).await.unwrap();

        let persisted = store.list().await.unwrap();
        assert_eq!(persisted[1], UserRecord::from_form(UserId::from(2), form()));
        assert_eq!(collection.snapshot().await, persisted);
    }

    #[tokio::test]
    async fn validation_failure_makes_no_store_call() {
        let (store, _collection, usecase) = setup(vec![]);
        let mut session = EditSession::new();
        session.open_create();

        let result = usecase
            .execute(
                &mut session,
                UserForm {
                    email: String::new(),
                    ..form()
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(store.calls().await.is_empty());
        assert_eq!(session.state(), &SessionState::Creating);
    }
}
