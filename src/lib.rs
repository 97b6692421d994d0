// src/lib.rs
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub mod api;
pub mod flag;
pub mod report;
mod tests;

use crate::api::{instant_from_millis, GetResponse, PostResponse, StatusQuery};
use crate::flag::Flag;

const BASE_URL: &str = "https://app.launchdarkly.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Overall deadline for one pipeline run, enforced by the caller.
pub const PIPELINE_DEADLINE: Duration = Duration::from_secs(5 * 60);

const PAGE_LIMIT: u32 = 50;

#[derive(Debug, Error)]
pub enum FlagError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Missing authentication: {0}")]
    AuthError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("pipeline deadline exceeded")]
    DeadlineExceeded,
}

pub struct Client {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Base URL of the remote service, also used for report deep links.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, FlagError> {
        if self.api_key.is_empty() {
            return Err(FlagError::AuthError("API token is required".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| FlagError::AuthError(e.to_string()))?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, url))
            .headers(headers)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FlagError::ApiError(format!(
                "Unexpected status code: {}",
                response.status()
            )));
        }

        Ok(response.json::<T>().await?)
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, FlagError> {
        if self.api_key.is_empty() {
            return Err(FlagError::AuthError("API token is required".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| FlagError::AuthError(e.to_string()))?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("LD-API-Version", HeaderValue::from_static("beta"));

        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, url))
            .headers(headers)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FlagError::ApiError(format!(
                "Unexpected status code: {}",
                response.status()
            )));
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetch every live flag for `project`/`env`, following pagination
    /// and cross-referencing each page against the flag-statuses query
    /// endpoint for last-requested instants.
    ///
    /// Any transport, status, or decode failure aborts the whole run;
    /// no partial list is ever returned.
    pub async fn get_flags(&self, project: &str, env: &str) -> Result<Vec<Flag>, FlagError> {
        let mut flags = Vec::new();
        let mut url = first_page(project, env);

        loop {
            debug!("fetching flags page: {}", url);
            let get_response: GetResponse = self.get(&url).await?;

            let post_response: PostResponse = self
                .post(
                    &query_url(project),
                    &StatusQuery {
                        environment_keys: vec![env.to_string()],
                        flag_keys: get_response.keys(),
                    },
                )
                .await?;

            let last_requested = post_response.last_requested(env);

            for item in &get_response.items {
                let maintainer_email = if item.maintainer.email.is_empty() {
                    "unknown".to_string()
                } else {
                    item.maintainer.email.clone()
                };

                let last_modified = item
                    .environments
                    .get(env)
                    .map(|e| e.last_modified)
                    .unwrap_or(0);

                flags.push(Flag {
                    key: item.key.clone(),
                    maintainer_email,
                    creation_date: instant_from_millis(item.creation_date),
                    last_modified: instant_from_millis(last_modified),
                    last_requested: last_requested.get(&item.key).copied(),
                    temporary: item.temporary,
                });
            }

            match get_response.next_href() {
                Some(next) => url = next.to_string(),
                None => break,
            }
        }

        Ok(flags)
    }
}

fn first_page(project: &str, env: &str) -> String {
    format!(
        "/api/v2/flags/{}?limit={}&env={}&sort=creationDate&filter=state%3Alive",
        project, PAGE_LIMIT, env
    )
}

fn query_url(project: &str) -> String {
    format!("/api/v2/projects/{}/flag-statuses/queries", project)
}

pub struct ClientBuilder {
    base_url: String,
    api_key: String,
}

impl ClientBuilder {
    fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: String::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    pub fn build(self) -> Client {
        Client {
            base_url: self.base_url,
            api_key: self.api_key,
            http_client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap(),
        }
    }
}
