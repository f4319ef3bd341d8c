use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::{
    errors::DomainError,
    models::{NewUser, UserId, UserRecord},
    repositories::UserStore,
};

/// REST client for the `/users` collection.
pub struct HttpUserStore {
    http: Client,
    base_url: Url,
}

impl HttpUserStore {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, DomainError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DomainError::Transport(format!("invalid base url '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::Transport(format!(
                "base url '{base_url}' cannot hold a path"
            )));
        }

        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(DomainError::transport)?;

        Ok(Self { http, base_url })
    }

    fn build_url(&self, id: Option<&UserId>) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    fn request(&self, method: Method, id: Option<&UserId>) -> RequestBuilder {
        self.http.request(method, self.build_url(id))
    }

    /// Sends the request and maps non-2xx answers. A 404 becomes
    /// `NotFound` only when a specific record was targeted.
    async fn send(
        &self,
        request: RequestBuilder,
        target: Option<&UserId>,
    ) -> Result<Response, DomainError> {
        let response = request.send().await.map_err(|e| {
            warn!("users endpoint unreachable: {e}");
            DomainError::transport(e)
        })?;

        let status = response.status();
        debug!(url = %response.url(), %status, "users endpoint answered");

        match (status, target) {
            (s, _) if s.is_success() => Ok(response),
            (StatusCode::NOT_FOUND, Some(id)) => Err(DomainError::NotFound(format!("user {id}"))),
            (s, _) => Err(DomainError::Transport(format!(
                "{} answered {}",
                response.url(),
                s
            ))),
        }
    }

    /// Decodes the body, or `None` when the store answered with no content.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<Option<T>, DomainError> {
        let body = response.bytes().await.map_err(DomainError::transport)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| DomainError::Transport(format!("undecodable users payload: {e}")))
    }
}

#[async_trait]
impl UserStore for HttpUserStore {
    async fn list(&self) -> Result<Vec<UserRecord>, DomainError> {
        let response = self.send(self.request(Method::GET, None), None).await?;
        let users: Option<Vec<UserRecord>> = Self::decode(response).await?;
        Ok(users.unwrap_or_default())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, DomainError> {
        let request = self.request(Method::POST, None).json(&user);
        let response = self.send(request, None).await?;
        match Self::decode::<UserRecord>(response).await? {
            Some(stored) => Ok(stored),
            None => {
                let id = user.id.clone().ok_or_else(|| {
                    DomainError::Transport("store created a user without returning it".to_string())
                })?;
                Ok(user.into_record(id))
            }
        }
    }

    async fn update(&self, user: &UserRecord) -> Result<UserRecord, DomainError> {
        let request = self.request(Method::PUT, Some(&user.id)).json(user);
        let response = self.send(request, Some(&user.id)).await?;
        Ok(Self::decode(response).await?.unwrap_or_else(|| user.clone()))
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        self.send(self.request(Method::DELETE, Some(id)), Some(id)).await?;
        Ok(())
    }
}
