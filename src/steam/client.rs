use crate::steam::locale::StoreLocale;
use crate::steam::models::{ApplicationDetails, ApplicationInfo};
use crate::config::DEFAULT_STEAM_API_URL;
use reqwest::{Client, Error as ReqwestError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SteamError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),
    #[error("API rate limit exceeded")]
    RateLimit,
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Source of store metadata for the importer
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Store details for one application. `None` when the store has no entry.
    async fn details(&self, appid: u64) -> Result<Option<ApplicationInfo>, SteamError>;
}

/// Client for the undocumented API behind the Steam store pages
#[derive(Clone)]
pub struct SteampoweredClient {
    client: Client,
    base_url: String,
    locale: StoreLocale,
}

impl Default for SteampoweredClient {
    fn default() -> Self {
        Self::new(DEFAULT_STEAM_API_URL)
    }
}

impl SteampoweredClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: Client::new(),
            base_url,
            locale: StoreLocale::default(),
        }
    }

    /// Localize responses for the user's locale
    pub fn use_device_locale(mut self) -> Self {
        self.locale = StoreLocale::from_env();
        debug!(
            "SteampoweredClient: Using region {:?}, language {:?}",
            self.locale.region, self.locale.language
        );
        self
    }

    pub fn with_locale(mut self, locale: StoreLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn locale(&self) -> &StoreLocale {
        &self.locale
    }

    /// Send a GET to `path` with `query` plus the locale parameters
    async fn execute(&self, path: &str, query: &[(&str, String)]) -> Result<Value, SteamError> {
        let url = format!("{}{}", self.base_url, path);

        let mut params: Vec<(&str, String)> = query.to_vec();
        if let Some(region) = &self.locale.region {
            params.push(("cc", region.clone()));
        }
        if let Some(language) = &self.locale.language {
            params.push(("l", language.clone()));
        }

        let response = self.client.get(&url).query(&params).send().await?;

        if response.status().is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else if response.status() == 429 {
            Err(SteamError::RateLimit)
        } else {
            Err(SteamError::Status(response.status().as_u16()))
        }
    }

    /// Details for several applications in one request.
    ///
    /// Entries that are unsuccessful or fail to decode are left out; they never
    /// fail the batch.
    pub async fn details_batch(
        &self,
        appids: &[u64],
        filter: &[&str],
    ) -> Result<HashMap<u64, ApplicationInfo>, SteamError> {
        let ids = appids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut query = vec![("appids", ids)];
        if !filter.is_empty() {
            query.push(("filter", filter.join(",")));
        }

        let envelope: Map<String, Value> = serde_json::from_value(self.execute("appdetails", &query).await?)?;
        Ok(decode_envelope(envelope))
    }
}

#[async_trait::async_trait]
impl MetadataSource for SteampoweredClient {
    async fn details(&self, appid: u64) -> Result<Option<ApplicationInfo>, SteamError> {
        let mut applications = self.details_batch(&[appid], &[]).await?;
        Ok(applications.remove(&appid))
    }
}

fn decode_envelope(envelope: Map<String, Value>) -> HashMap<u64, ApplicationInfo> {
    let mut applications = HashMap::new();

    for (key, value) in envelope {
        let Ok(appid) = key.parse::<u64>() else {
            warn!("SteampoweredClient: Skipping non-numeric key '{}'", key);
            continue;
        };

        match serde_json::from_value::<ApplicationDetails>(value) {
            Ok(ApplicationDetails {
                success: true,
                data: Some(info),
            }) => {
                applications.insert(appid, info);
            }
            Ok(_) => {
                warn!("SteampoweredClient: No store entry for app {}", appid);
            }
            Err(e) => {
                warn!("SteampoweredClient: Could not decode app {}: {}", appid, e);
            }
        }
    }

    applications
}
