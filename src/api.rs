// src/api.rs
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body for the flag-statuses query endpoint.
#[derive(Debug, Serialize)]
pub struct StatusQuery {
    #[serde(rename = "environmentKeys")]
    pub environment_keys: Vec<String>,
    #[serde(rename = "flagKeys")]
    pub flag_keys: Vec<String>,
}

/// One page of the flags listing endpoint.
#[derive(Debug, Deserialize)]
pub struct GetResponse {
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(default)]
    pub items: Vec<FlagItem>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Links {
    #[serde(default)]
    pub next: Option<Link>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: String,
}

#[derive(Debug, Deserialize)]
pub struct FlagItem {
    pub key: String,
    #[serde(rename = "_maintainer", default)]
    pub maintainer: Maintainer,
    #[serde(default)]
    pub temporary: bool,
    #[serde(rename = "creationDate", default)]
    pub creation_date: i64,
    #[serde(default)]
    pub environments: HashMap<String, FlagEnvironment>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Maintainer {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct FlagEnvironment {
    #[serde(rename = "lastModified", default)]
    pub last_modified: i64,
}

impl GetResponse {
    /// Server-supplied relative link to the next page, if any. An absent
    /// or empty href both mean this was the last page.
    pub fn next_href(&self) -> Option<&str> {
        self.links
            .next
            .as_ref()
            .map(|link| link.href.as_str())
            .filter(|href| !href.is_empty())
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.iter().map(|item| item.key.clone()).collect()
    }
}

/// Response of the flag-statuses query endpoint.
#[derive(Debug, Deserialize)]
pub struct PostResponse {
    #[serde(default)]
    pub items: Vec<StatusItem>,
}

#[derive(Debug, Deserialize)]
pub struct StatusItem {
    pub key: String,
    #[serde(default)]
    pub environments: HashMap<String, StatusEnvironment>,
}

#[derive(Debug, Deserialize)]
pub struct StatusEnvironment {
    #[serde(default)]
    pub name: String,
    // Absent when the flag was never requested in this environment.
    #[serde(rename = "lastRequested", default)]
    pub last_requested: Option<DateTime<Utc>>,
}

impl PostResponse {
    /// Map of flag key to last-requested instant for one environment.
    /// Keys never requested in `env` are simply absent.
    pub fn last_requested(&self, env: &str) -> HashMap<String, DateTime<Utc>> {
        let mut last_requested = HashMap::new();
        for item in &self.items {
            if let Some(status) = item.environments.get(env) {
                if let Some(instant) = status.last_requested {
                    last_requested.insert(item.key.clone(), instant);
                }
            }
        }
        last_requested
    }
}

/// Epoch milliseconds to an instant; zero or negative means "never".
pub fn instant_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis)
}
