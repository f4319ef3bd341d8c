use async_trait::async_trait;

use crate::domain::{
    errors::DomainError,
    models::{NewUser, UserId, UserRecord},
};

/// Remote collection of users. Implementations never touch local state;
/// callers refresh the collection after a mutation.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<UserRecord>, DomainError>;
    async fn create(&self, user: NewUser) -> Result<UserRecord, DomainError>;
    async fn update(&self, user: &UserRecord) -> Result<UserRecord, DomainError>;
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;
}
