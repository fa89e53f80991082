//! API client for the creators dashboard REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests against the Profile, Platform, User and Identity collections.
//! Every call is a single request: no retries, no caching.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Request, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::TokenSource;
use crate::config::Config;
use crate::models::{
    ConfigResponse, CreatedId, DevLoginRequest, DevLoginResponse, EntityInput, EntityUpdate,
    Identity, ListQuery, Page, Platform, Profile, User,
};

use super::{ApiError, ApiResult, Resource};

// ============================================================================
// Constants
// ============================================================================

/// Prefix of every collection endpoint
const API_PREFIX: &str = "api";

/// Dev-login endpoint, relative to the base URL
const DEV_LOGIN_PATH: &str = "dev-login";

/// Server configuration endpoint, under the API prefix
const CONFIG_PATH: &str = "config";

/// API client for the dashboard.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    /// Create a client without a request timeout
    pub fn new(base_url: &str, tokens: impl TokenSource + 'static) -> ApiResult<Self> {
        Self::with_timeout(base_url, tokens, None)
    }

    pub fn with_timeout(
        base_url: &str,
        tokens: impl TokenSource + 'static,
        timeout: Option<Duration>,
    ) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "'{}' cannot be used as a base URL",
                base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            tokens: Arc::new(tokens),
        })
    }

    pub fn from_config(config: &Config, tokens: impl TokenSource + 'static) -> ApiResult<Self> {
        Self::with_timeout(&config.api_base_url, tokens, config.request_timeout())
    }

    /// Create a new ApiClient reading tokens from another source, sharing the connection pool.
    pub fn with_tokens(&self, tokens: impl TokenSource + 'static) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            tokens: Arc::new(tokens),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("'{}' cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn collection_url(&self, resource: Resource) -> ApiResult<Url> {
        self.endpoint(&[API_PREFIX, resource.path()])
    }

    fn item_url(&self, resource: Resource, id: &str) -> ApiResult<Url> {
        self.endpoint(&[API_PREFIX, resource.path(), id])
    }

    fn auth_headers(&self) -> ApiResult<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.access_token() {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("access token is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn build(&self, method: Method, url: Url, body: Option<&impl Serialize>) -> ApiResult<Request> {
        let mut builder = self.client.request(method, url).headers(self.auth_headers()?);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    fn ensure_writable(resource: Resource) -> ApiResult<()> {
        if resource.is_read_only() {
            return Err(ApiError::InvalidRequest(format!(
                "{} records are read-only",
                resource
            )));
        }
        Ok(())
    }

    // ===== Request construction =====

    pub(crate) fn list_request(&self, resource: Resource, query: &ListQuery) -> ApiResult<Request> {
        self.client
            .get(self.collection_url(resource)?)
            .headers(self.auth_headers()?)
            .query(query)
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    pub(crate) fn get_request(&self, resource: Resource, id: &str) -> ApiResult<Request> {
        self.build(Method::GET, self.item_url(resource, id)?, None::<&()>)
    }

    pub(crate) fn create_request<B: Serialize>(&self, resource: Resource, input: &B) -> ApiResult<Request> {
        Self::ensure_writable(resource)?;
        self.build(Method::POST, self.collection_url(resource)?, Some(input))
    }

    pub(crate) fn update_request<B: Serialize>(
        &self,
        resource: Resource,
        id: &str,
        update: &B,
    ) -> ApiResult<Request> {
        Self::ensure_writable(resource)?;
        self.build(Method::PATCH, self.item_url(resource, id)?, Some(update))
    }

    /// Send a request and decode a JSON success body.
    /// Non-success statuses become `ApiError::Http`; transport failures pass through.
    async fn execute<T: DeserializeOwned>(&self, request: Request) -> ApiResult<T> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "Sending request");

        let response = self.client.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            // The status is known even if the body never arrives
            let body = response.text().await.unwrap_or_else(|e| {
                debug!(%method, %url, error = %e, "Failed to read error body");
                String::new()
            });
            warn!(
                %method,
                %url,
                status = status.as_u16(),
                body = %ApiError::truncate_body(&body),
                "Request failed"
            );
            return Err(ApiError::from_status(status, &body));
        }

        let body = response.text().await?;
        debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "Response received");

        if body.trim().is_empty() {
            return Err(ApiError::InvalidResponse(format!(
                "empty response body from {} {}",
                method, url
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    // ===== Generic collection operations =====

    /// Fetch one page of a collection
    pub async fn list<T: DeserializeOwned>(&self, resource: Resource, query: &ListQuery) -> ApiResult<Page<T>> {
        self.execute(self.list_request(resource, query)?).await
    }

    pub async fn get<T: DeserializeOwned>(&self, resource: Resource, id: &str) -> ApiResult<T> {
        self.execute(self.get_request(resource, id)?).await
    }

    pub async fn create<B: Serialize>(&self, resource: Resource, input: &B) -> ApiResult<CreatedId> {
        self.execute(self.create_request(resource, input)?).await
    }

    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        resource: Resource,
        id: &str,
        update: &B,
    ) -> ApiResult<T> {
        self.execute(self.update_request(resource, id, update)?).await
    }

    /// Fetch every page, following `next_cursor` through `after_id`.
    /// Stops early if the server hands out a cursor it already returned.
    pub async fn list_all<T: DeserializeOwned>(&self, resource: Resource, query: &ListQuery) -> ApiResult<Vec<T>> {
        let mut query = query.clone();
        let mut seen: HashSet<String> = query.after_id.iter().cloned().collect();
        let mut items = Vec::new();

        loop {
            let page: Page<T> = self.list(resource, &query).await?;
            let next = page.next_after().map(str::to_string);
            items.extend(page.items);

            match next {
                Some(cursor) if !seen.insert(cursor.clone()) => {
                    warn!(%resource, cursor = %cursor, "Server repeated a cursor, stopping");
                    break;
                }
                Some(cursor) => query.after_id = Some(cursor),
                None => break,
            }
        }

        debug!(%resource, count = items.len(), "Fetched all pages");
        Ok(items)
    }

    // ===== Profiles =====

    pub async fn get_profiles(&self, query: &ListQuery) -> ApiResult<Page<Profile>> {
        self.list(Resource::Profile, query).await
    }

    pub async fn get_profile(&self, id: &str) -> ApiResult<Profile> {
        self.get(Resource::Profile, id).await
    }

    pub async fn create_profile(&self, input: &EntityInput) -> ApiResult<CreatedId> {
        self.create(Resource::Profile, input).await
    }

    pub async fn update_profile(&self, id: &str, update: &EntityUpdate) -> ApiResult<Profile> {
        self.update(Resource::Profile, id, update).await
    }

    // ===== Platforms =====

    pub async fn get_platforms(&self, query: &ListQuery) -> ApiResult<Page<Platform>> {
        self.list(Resource::Platform, query).await
    }

    pub async fn get_platform(&self, id: &str) -> ApiResult<Platform> {
        self.get(Resource::Platform, id).await
    }

    pub async fn create_platform(&self, input: &EntityInput) -> ApiResult<CreatedId> {
        self.create(Resource::Platform, input).await
    }

    pub async fn update_platform(&self, id: &str, update: &EntityUpdate) -> ApiResult<Platform> {
        self.update(Resource::Platform, id, update).await
    }

    // ===== Users =====

    pub async fn get_users(&self, query: &ListQuery) -> ApiResult<Page<User>> {
        self.list(Resource::User, query).await
    }

    pub async fn get_user(&self, id: &str) -> ApiResult<User> {
        self.get(Resource::User, id).await
    }

    pub async fn create_user(&self, input: &EntityInput) -> ApiResult<CreatedId> {
        self.create(Resource::User, input).await
    }

    pub async fn update_user(&self, id: &str, update: &EntityUpdate) -> ApiResult<User> {
        self.update(Resource::User, id, update).await
    }

    // ===== Identities (read-only) =====

    pub async fn get_identities(&self, query: &ListQuery) -> ApiResult<Page<Identity>> {
        self.list(Resource::Identity, query).await
    }

    pub async fn get_identity(&self, id: &str) -> ApiResult<Identity> {
        self.get(Resource::Identity, id).await
    }

    // ===== Auth & configuration =====

    /// Mint a development token for the given subject and roles
    pub async fn dev_login(&self, request: &DevLoginRequest) -> ApiResult<DevLoginResponse> {
        let url = self.endpoint(&[DEV_LOGIN_PATH])?;
        let response: DevLoginResponse = self.execute(self.build(Method::POST, url, Some(request))?).await?;
        debug!(subject = %response.subject, roles = ?response.roles, "Dev login succeeded");
        Ok(response)
    }

    pub async fn get_config(&self) -> ApiResult<ConfigResponse> {
        let url = self.endpoint(&[API_PREFIX, CONFIG_PATH])?;
        self.execute(self.build(Method::GET, url, None::<&()>)?).await
    }
}
