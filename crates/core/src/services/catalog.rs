//! Book catalog client.
//!
//! Books are not stored locally; search and detail pages read through to an
//! external volumes API and pass its JSON on mostly untouched.

use std::time::Duration;

use serde_json::Value;
use shelf_common::{AppError, AppResult, config::CatalogConfig};
use url::Url;

/// Client for the external book catalog.
#[derive(Clone)]
pub struct CatalogClient {
    base_url: Url,
    max_results: u32,
    http_client: reqwest::Client,
}

impl CatalogClient {
    /// Create a new catalog client.
    pub fn new(config: &CatalogConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("Invalid catalog base URL: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            max_results: config.max_results,
            http_client,
        })
    }

    /// Search volumes. A blank query returns nothing without a request.
    pub async fn search(&self, query: &str) -> AppResult<Vec<Value>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }

        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("maxResults", &self.max_results.to_string());

        let mut body = self.get_json(url).await?;

        Ok(match body.get_mut("items").map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => vec![],
        })
    }

    /// Fetch one volume, with its cover links upgraded.
    pub async fn get_book(&self, id: &str) -> AppResult<Value> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Config("Catalog base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(id);

        let mut volume = self.get_json(url).await?;
        upgrade_image_links(&mut volume);
        Ok(volume)
    }

    async fn get_json(&self, url: Url) -> AppResult<Value> {
        tracing::debug!(%url, "Catalog request");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Catalog request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalService(format!(
                "Catalog API error: {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse catalog response: {e}")))
    }
}

/// Prefer https and larger covers in `volumeInfo.imageLinks`.
///
/// `thumbnail` and `smallThumbnail` move to https at zoom 2; `large` and
/// `medium` are filled in from the thumbnail when absent.
pub fn upgrade_image_links(volume: &mut Value) {
    let Some(links) = volume
        .pointer_mut("/volumeInfo/imageLinks")
        .and_then(Value::as_object_mut)
    else {
        return;
    };

    for key in ["thumbnail", "smallThumbnail"] {
        if let Some(Value::String(link)) = links.get_mut(key) {
            *link = link
                .replacen("http://", "https://", 1)
                .replacen("&zoom=1", "&zoom=2", 1);
        }
    }

    let Some(thumbnail) = links
        .get("thumbnail")
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        return;
    };

    if links.get("large").is_none_or(Value::is_null) {
        links.insert(
            "large".to_string(),
            Value::String(thumbnail.replacen("&zoom=2", "&zoom=3", 1)),
        );
    }
    if links.get("medium").is_none_or(Value::is_null) {
        links.insert("medium".to_string(), Value::String(thumbnail));
    }
}
