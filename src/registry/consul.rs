//! Consul KV registry client.
//!
//! # Responsibilities
//! - Build an HTTP session scoped to one service's configuration subtree
//! - Check key presence via `GET /v1/kv/<path>`
//! - Overwrite values via `PUT /v1/kv/<path>`
//! - Attach the ACL token when one is configured

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use crate::registry::{
    RegistryClient, RegistryClientFactory, RegistryConfig, RegistryError, CONSUL_REGISTRY_TYPE,
};

const KV_PREFIX: [&str; 2] = ["v1", "kv"];
const TOKEN_HEADER: &str = "X-Consul-Token";

/// Consul KV client bound to `<stem><version><service>/`.
#[derive(Debug)]
pub struct ConsulClient {
    http: reqwest::Client,
    base_url: Url,
    base_path: String,
    token: Option<String>,
}

impl ConsulClient {
    /// Create a client for `service` against the configured endpoint.
    pub fn new(service: &str, config: &RegistryConfig) -> Result<Self, RegistryError> {
        let endpoint = config.url();
        let base_url =
            Url::parse(&endpoint).map_err(|_| RegistryError::InvalidEndpoint(endpoint.clone()))?;
        if base_url.cannot_be_a_base() || base_url.host_str().is_none() {
            return Err(RegistryError::InvalidEndpoint(endpoint));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            base_path: config.base_path(service),
            token: config.access_token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Full key of `path` inside the registry.
    pub fn full_path(&self, path: &str) -> String {
        format!("{}{}", self.base_path, path.trim_start_matches('/'))
    }

    /// KV endpoint of `path`, one percent-encoded URL segment per key segment.
    fn kv_url(&self, path: &str) -> Result<Url, RegistryError> {
        let full = self.full_path(path);
        // Dot segments would be normalised away and address another key.
        if full.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(RegistryError::InvalidKey(full));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RegistryError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(KV_PREFIX)
            .extend(full.split('/'));
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }
}

#[async_trait]
impl RegistryClient for ConsulClient {
    async fn exists(&self, path: &str) -> Result<bool, RegistryError> {
        let url = self.kv_url(path)?;
        let response = self.request(reqwest::Method::GET, url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(RegistryError::ExistsStatus {
                path: self.full_path(path),
                status: status.as_u16(),
            }),
        }
    }

    async fn put(&self, path: &str, value: &[u8]) -> Result<(), RegistryError> {
        let url = self.kv_url(path)?;
        let response = self
            .request(reqwest::Method::PUT, url)
            .body(value.to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RegistryError::PutRejected {
                path: self.full_path(path),
                reason: format!("status {}", status.as_u16()),
            });
        }
        // Consul answers a plain `true` or `false`.
        if body.trim() != "true" {
            return Err(RegistryError::PutRejected {
                path: self.full_path(path),
                reason: format!("registry answered '{}'", body.trim()),
            });
        }
        Ok(())
    }
}

/// Factory used by the running service: dispatches on the registry type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClientFactory;

impl RegistryClientFactory for DefaultClientFactory {
    fn create(
        &self,
        service: &str,
        config: &RegistryConfig,
    ) -> Result<Box<dyn RegistryClient>, RegistryError> {
        if config.registry_type != CONSUL_REGISTRY_TYPE {
            return Err(RegistryError::UnsupportedType(config.registry_type.clone()));
        }
        Ok(Box::new(ConsulClient::new(service, config)?))
    }
}
