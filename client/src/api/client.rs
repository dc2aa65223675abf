//! The request function and its per-verb wrappers.

use std::sync::Arc;

use reqwest::{
    header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::{
    options::RequestOptions,
    refresh::{RefreshCoordinator, RefreshFailure, TokenRefresher, REFRESH_PATH},
};
use crate::{config::ClientConfig, errors::ClientError, session::SessionStore};

/// How many times one call may go through refresh-and-retry.
pub const MAX_AUTH_RETRIES: u8 = 1;

/// Cheap to clone; clones share the session and the refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    base_url: String,
    session: SessionStore,
    refresher: TokenRefresher,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Self::with_http(http, &config.api_url, session)
    }

    pub fn with_http(
        http: Client,
        base_url: &str,
        session: SessionStore,
    ) -> Result<Self, ClientError> {
        Url::parse(base_url).map_err(|source| ClientError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let refresher = TokenRefresher::new(
            http.clone(),
            format!("{base_url}{REFRESH_PATH}"),
            session.clone(),
        );

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                session,
                refresher,
                refresh: RefreshCoordinator::default(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Absolute `http(s)://` paths are used as-is, anything else is appended
    /// to the base URL.
    pub fn resolve_url(&self, path: &str) -> Result<Url, ClientError> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.inner.base_url)
        } else {
            format!("{}/{path}", self.inner.base_url)
        };

        Url::parse(&raw).map_err(|source| ClientError::InvalidUrl { url: raw, source })
    }

    /// Sends a JSON request and decodes the response.
    ///
    /// A 401 on an authenticated request of a logged in session refreshes the
    /// tokens (sharing any refresh already underway) and retries once. If the
    /// refresh fails the session is cleared and the call returns
    /// [`ClientError::SessionExpired`] or [`ClientError::MissingRefreshToken`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let url = self.resolve_url(path)?;
        let mut token = if options.skip_auth {
            None
        } else {
            self.inner.session.access_token()
        };
        let mut retries_left = MAX_AUTH_RETRIES;

        loop {
            let response = self.send(&url, &options, token.as_deref()).await?;

            let recoverable = response.status() == StatusCode::UNAUTHORIZED
                && !options.skip_auth
                && self.inner.session.is_authenticated();
            if recoverable && retries_left > 0 {
                retries_left -= 1;
                token = Some(self.recover(token.as_deref()).await?);
                debug!(%url, "retrying with refreshed token");
                continue;
            }

            return read_response(response).await;
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        self.request(path, options.method(Method::GET)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        self.request(path, options.method(Method::POST).json(body)?)
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        self.request(path, options.method(Method::PATCH).json(body)?)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        self.request(path, options.method(Method::PUT).json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        self.request(path, options.method(Method::DELETE)).await
    }

    /// Returns an access token to retry with.
    async fn recover(&self, stale: Option<&str>) -> Result<String, ClientError> {
        // Another request may have finished a refresh since this one was sent.
        if let Some(current) = self.inner.session.access_token() {
            if stale != Some(current.as_str()) {
                debug!("access token already rotated");
                return Ok(current);
            }
        }

        match self.inner.refresh.refresh(&self.inner.refresher).await {
            Ok(auth) => Ok(auth.tokens.access_token),
            Err(RefreshFailure::MissingRefreshToken) => Err(ClientError::MissingRefreshToken),
            Err(RefreshFailure::Abandoned) => {
                self.inner.session.logout();
                Err(ClientError::SessionExpired)
            }
            Err(_) => Err(ClientError::SessionExpired),
        }
    }

    async fn send(
        &self,
        url: &Url,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut headers = options.headers.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut request = self
            .inner
            .http
            .request(options.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        debug!(method = %options.method, %url, authenticated = token.is_some(), "sending request");
        Ok(request.send().await?)
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let data = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| Value::Object(Map::new()));
        let message = error_message(&data)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        debug!(%status, %message, "request rejected");
        return Err(ClientError::Api {
            status,
            message,
            data,
        });
    }

    let body = response.bytes().await?;
    if status == StatusCode::NO_CONTENT || body.is_empty() {
        return Ok(serde_json::from_value(Value::Object(Map::new()))?);
    }
    Ok(serde_json::from_slice(&body)?)
}

/// `message` of an error body; validation errors may send a list of them.
fn error_message(data: &Value) -> Option<String> {
    match data.get("message")? {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Array(parts) => {
            let parts: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}
