use crate::config::Config;
use crate::error::Error;
use crate::model::data::{Lead, LeadsEmbedded, Page};
use crate::model::EntityId;
use crate::Result;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

pub mod auth;
pub mod strategy;

pub use strategy::{ContactsById, PipelineStatuses, RelatedFetch, UsersById};

/// Read-only amoCRM REST client. One outbound request per call, no retries.
#[derive(Clone)]
pub struct AmoClient {
    http: Client,
    base_url: String,
    token: String,
}

impl AmoClient {
    pub fn new(config: &Config) -> Result<AmoClient> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.AMOCRM_TIMEOUT {
            builder = builder.timeout(timeout);
        }

        Ok(AmoClient {
            http: builder.build()?,
            base_url: config.AMOCRM_API_URL.clone(),
            token: config.AMOCRM_API_TOKEN.clone(),
        })
    }

    /// `GET {base}{path}?{query}`. `Ok(None)` means amoCRM answered
    /// `204 No Content`, which it does for empty collections.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str, query: Option<&str>) -> Result<Option<T>> {
        self.send::<T>(path, query).await.inspect_err(|err| {
            error!("Failed to fetch {path} from amoCRM: {err}");
        })
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, query: Option<&str>) -> Result<Option<T>> {
        let mut url = format!("{}{path}", self.base_url);
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(q);
        }
        debug!("GET {url}");

        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                path: path.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| Error::Decode {
                path: path.to_string(),
                source,
            })
    }

    pub async fn fetch_leads(&self) -> Result<Vec<Lead>> {
        let page = self
            .fetch::<Page<LeadsEmbedded>>("/leads", Some("with=contacts"))
            .await?;
        let leads = page
            .and_then(|p| p._embedded)
            .and_then(|e| e.leads)
            .unwrap_or_default();
        debug!("fetched {} leads", leads.len());
        Ok(leads)
    }

    /// Fetches the entities behind `ids` the way `strategy` prescribes.
    pub async fn fetch_related<S: RelatedFetch>(&self, strategy: &S, ids: &[EntityId]) -> Result<Vec<S::Entity>> {
        let query = strategy.query(ids);
        let envelope = self.fetch::<S::Envelope>(strategy.path(), query.as_deref()).await?;
        Ok(envelope
            .map(|e| strategy.select(e, ids))
            .unwrap_or_default())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}
