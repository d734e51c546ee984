use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::LeadId,
    error::{ApiError, ErrorCode},
    protocol::{CreateLeadData, DataEnvelope, Lead, UpdateLeadData},
};
use tracing::debug;

use crate::{
    config::{normalize_base_url, ClientSettings},
    repository::{LeadRepository, RepositoryError, RepositoryResult},
};

/// Talks to the leads REST endpoints under `{base_url}/leads`.
pub struct HttpLeadRepository {
    http: Client,
    base_url: String,
    api_token: Option<String>,
}

enum HttpFailure {
    Transport(reqwest::Error),
    Status(ApiError),
}

impl HttpFailure {
    fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(err) if err.code == ErrorCode::NotFound)
    }

    fn describe(self) -> String {
        match self {
            Self::Transport(err) => err.to_string(),
            Self::Status(err) => err.to_string(),
        }
    }
}

impl HttpLeadRepository {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let base_url = normalize_base_url(&settings.api_base_url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url,
            api_token: settings.api_token.clone(),
        })
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .header(ACCEPT, "application/json");
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, HttpFailure> {
        let response = request.send().await.map_err(HttpFailure::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(HttpFailure::Status(ApiError::from_response(
            status.as_u16(),
            &body,
        )))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, HttpFailure> {
        let envelope: DataEnvelope<T> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(HttpFailure::Transport)?;
        Ok(envelope.into_inner())
    }
}

#[async_trait]
impl LeadRepository for HttpLeadRepository {
    async fn list(&self) -> RepositoryResult<Vec<Lead>> {
        let leads: Vec<Lead> = self
            .send_json(self.request(Method::GET, "/leads"))
            .await
            .map_err(|err| RepositoryError::Fetch(err.describe()))?;
        debug!(count = leads.len(), "fetched leads");
        Ok(leads)
    }

    async fn create(&self, data: CreateLeadData) -> RepositoryResult<Lead> {
        self.send_json(self.request(Method::POST, "/leads").json(&data))
            .await
            .map_err(|err| RepositoryError::Save(err.describe()))
    }

    async fn update(&self, id: LeadId, data: UpdateLeadData) -> RepositoryResult<Lead> {
        self.send_json(
            self.request(Method::PUT, &format!("/leads/{id}"))
                .json(&data),
        )
        .await
        .map_err(|err| {
            if err.is_not_found() {
                RepositoryError::NotFound(id)
            } else {
                RepositoryError::Save(err.describe())
            }
        })
    }

    async fn delete(&self, id: LeadId) -> RepositoryResult<()> {
        self.send(self.request(Method::DELETE, &format!("/leads/{id}")))
            .await
            .map(|_| ())
            .map_err(|err| {
                if err.is_not_found() {
                    RepositoryError::NotFound(id)
                } else {
                    RepositoryError::Delete(err.describe())
                }
            })
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
