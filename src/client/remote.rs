//! HTTP client for the academy backend.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{ClientError, DataSource, Resource};
use crate::errors::ErrorDetails;
use crate::models::{LoginRequest, LoginResponse};

/// Response envelope as sent by the backend, success or failure.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<ErrorDetails>,
}

/// Remote data client holding the backend URL and an admin session token.
#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Log in and keep the issued session token for later calls.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .send(self.request(Method::POST, "/api/admin/login").json(&body))
            .await?;
        self.token = Some(response.token.clone());
        Ok(response)
    }

    /// Drop the server-side session and forget the token.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let _: () = self
            .send(self.request(Method::POST, "/api/admin/logout"))
            .await?;
        self.token = None;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        decode(response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(self.request(Method::DELETE, path)).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let envelope: Envelope<T> = response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))?;

    if envelope.success {
        // `()` payloads arrive as JSON null
        match envelope.data {
            Some(data) => Ok(data),
            None => serde_json::from_value(serde_json::Value::Null)
                .map_err(|_| ClientError::Decode("missing data".to_string())),
        }
    } else {
        let details = envelope
            .error
            .ok_or_else(|| ClientError::Decode("error envelope without details".to_string()))?;
        Err(ClientError::Remote {
            status,
            code: details.code,
            message: details.message,
        })
    }
}

#[async_trait]
impl<T: Resource> DataSource<T> for RemoteClient {
    async fn list(&self) -> Result<Vec<T>, ClientError> {
        self.get(T::ADMIN_PATH).await
    }

    async fn update(&self, id: &str, patch: &T::Patch) -> Result<T, ClientError> {
        self.put(&format!("{}/{}", T::ADMIN_PATH, id), patch).await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        RemoteClient::delete(self, &format!("{}/{}", T::ADMIN_PATH, id)).await
    }
}
