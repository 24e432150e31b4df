use async_trait::async_trait;
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::models::fare::RawFare;
use crate::models::itinerary::RawItineraryPayload;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("Destination {0} was not found")]
    NotFound(String),
    #[error("Catalog API answered with status {0}")]
    Status(u16),
    #[error("Catalog API request failed: {0}")]
    Request(String),
    #[error("Catalog API sent an unreadable payload: {0}")]
    Decode(String),
}

/// The remote catalog the itinerary and fare data come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_itinerary(&self, destination_id: &str)
        -> Result<RawItineraryPayload, LoadError>;

    async fn fetch_fares(&self, destination_id: &str) -> Result<Vec<RawFare>, LoadError>;
}

// The listing endpoint has shipped both a bare array and a wrapped object
#[derive(Deserialize)]
#[serde(untagged)]
enum FaresPayload {
    List(Vec<RawFare>),
    Wrapped {
        #[serde(alias = "tours", alias = "data")]
        fares: Vec<RawFare>,
    },
}

pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCatalog {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::Request(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, destination_id: &str, leaf: &str) -> Result<Url, LoadError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LoadError::Request(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["destinations", destination_id, leaf]);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        destination_id: &str,
        url: Url,
    ) -> Result<T, LoadError> {
        debug!("GET {}", url);

        let res = match self.client.get(url.clone()).send().await {
            Ok(res) => res,
            Err(err) => {
                error!("Catalog request to {} failed: {:?}", url, err);
                return Err(LoadError::Request(err.to_string()));
            }
        };

        let status = res.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound(destination_id.to_string()));
        }
        if !status.is_success() {
            error!("Catalog API returned {} for {}", status, url);
            return Err(LoadError::Status(status.as_u16()));
        }

        let body = res
            .text()
            .await
            .map_err(|e| LoadError::Request(e.to_string()))?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            error!("Could not decode catalog payload from {}: {}", url, e);
            LoadError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_itinerary(
        &self,
        destination_id: &str,
    ) -> Result<RawItineraryPayload, LoadError> {
        let url = self.endpoint(destination_id, "itinerary")?;
        self.get_json(destination_id, url).await
    }

    async fn fetch_fares(&self, destination_id: &str) -> Result<Vec<RawFare>, LoadError> {
        let url = self.endpoint(destination_id, "tours")?;
        let payload: FaresPayload = self.get_json(destination_id, url).await?;
        Ok(match payload {
            FaresPayload::List(fares) => fares,
            FaresPayload::Wrapped { fares } => fares,
        })
    }
}
