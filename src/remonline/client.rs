// src/remonline/client.rs

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{
    catalog::ImportRow,
    sync::{NewRemoteClient, RemoteClient},
};
use crate::remonline::{RemonlineApi, RemonlineError};

// Every RemOnline endpoint wraps its payload in this envelope.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedClient {
    id: i64,
}

#[derive(Clone)]
pub struct RemonlineClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemonlineClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        // Constructed once at startup; a broken TLS backend must abort boot
        // rather than fall back to a client without the timeout.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn get_clients(
        &self,
        param: &str,
        value: &str,
    ) -> Result<Vec<RemoteClient>, RemonlineError> {
        let url = format!("{}/clients/", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[(param, value)])
            .send()
            .await
            .map_err(|e| RemonlineError::Network(e.to_string()))?;

        let envelope: ApiEnvelope<Vec<RemoteClient>> = Self::read_envelope(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn read_envelope<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<T>, RemonlineError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemonlineError::Api(status.as_u16(), body));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| RemonlineError::Unexpected(e.to_string()))?;

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "request rejected".to_string());
            return Err(RemonlineError::Api(status.as_u16(), message));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl RemonlineApi for RemonlineClient {
    async fn find_client_by_email(
        &self,
        email: &str,
    ) -> Result<Option<RemoteClient>, RemonlineError> {
        let clients = self.get_clients("email", email).await?;
        // The API filter can be fuzzy; keep only exact (case-insensitive) hits.
        Ok(clients.into_iter().find(|c| {
            c.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        }))
    }

    async fn find_client_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<RemoteClient>, RemonlineError> {
        let clients = self.get_clients("phone", phone).await?;
        Ok(clients
            .into_iter()
            .find(|c| c.phone.iter().any(|p| p == phone)))
    }

    async fn create_client(
        &self,
        client: &NewRemoteClient,
    ) -> Result<RemoteClient, RemonlineError> {
        let url = format!("{}/clients/", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(client)
            .send()
            .await
            .map_err(|e| RemonlineError::Network(e.to_string()))?;

        let envelope: ApiEnvelope<CreatedClient> = Self::read_envelope(response).await?;
        let created = envelope
            .data
            .ok_or_else(|| RemonlineError::Unexpected("create returned no id".to_string()))?;

        Ok(RemoteClient {
            id: created.id,
            name: Some(format!("{} {}", client.first_name, client.last_name)),
            email: Some(client.email.clone()),
            phone: client.phone.clone(),
            address: client.address.clone(),
        })
    }

    async fn list_services(&self) -> Result<Vec<ImportRow>, RemonlineError> {
        let url = format!("{}/services/", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| RemonlineError::Network(e.to_string()))?;

        let envelope: ApiEnvelope<Vec<ImportRow>> = Self::read_envelope(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }
}
