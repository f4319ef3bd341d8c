use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    errors::DomainError,
    models::{NewUser, UserId, UserRecord},
    repositories::UserStore,
};

/// A call received by [`InMemoryUserStore`], kept in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Create(NewUser),
    Update(UserRecord),
    Delete(UserId),
}

/// Local stand-in for the users endpoint.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
    calls: RwLock<Vec<StoreCall>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users: RwLock::new(users),
            calls: RwLock::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().await.clone()
    }

    async fn record(&self, call: StoreCall) {
        self.calls.write().await.push(call);
    }
}

fn next_free_id(users: &[UserRecord]) -> UserId {
    let max = users.iter().filter_map(|u| u.id.as_number()).max().unwrap_or(0);
    UserId::from(max.max(users.len() as u64) + 1)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Result<Vec<UserRecord>, DomainError> {
        self.record(StoreCall::List).await;
        Ok(self.users.read().await.clone())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, DomainError> {
        self.record(StoreCall::Create(user.clone())).await;
        let mut users = self.users.write().await;

        let id = match &user.id {
            Some(proposed) if !users.iter().any(|u| &u.id == proposed) => proposed.clone(),
            _ => next_free_id(&users),
        };
        let record = user.into_record(id);
        users.push(record.clone());
        Ok(record)
    }

    async fn update(&self, user: &UserRecord) -> Result<UserRecord, DomainError> {
        self.record(StoreCall::Update(user.clone())).await;
        let mut users = self.users.write().await;

        let existing = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| DomainError::NotFound(format!("user {}", user.id)))?;
        *existing = user.clone();
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        self.record(StoreCall::Delete(id.clone())).await;
        let mut users = self.users.write().await;

        let position = users
            .iter()
            .position(|u| &u.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("user {id}")))?;
        users.remove(position);
        Ok(())
    }
}
