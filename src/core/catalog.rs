//! Catalog client for iconify-dl
//!
//! Reads collections, icon name lists and icon body batches from an
//! Iconify-compatible API and decodes them into typed records.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use log::debug;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::error::{Error, Result};

/// Canvas size assumed when the catalog omits one
const DEFAULT_CANVAS_SIZE: f64 = 16.0;

/// Configuration for catalog endpoints
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the Iconify API, without trailing slash
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.iconify.design".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Create a configuration pointing at a custom API host
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Build the HTTP client shared by every catalog request of a run
///
/// No request timeout is set: a hung request blocks the run.
pub fn create_http_client() -> Result<Client> {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(4)
        .user_agent(format!("iconify-dl/{}", env!("ICONIFY_DL_VERSION")))
        .build()
        .map_err(|e| Error::TransportError(format!("Failed to create HTTP client: {e}")))
}

/// An icon collection published by the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub total: u64,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    name: String,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    category: String,
}

#[derive(Debug, Deserialize)]
struct IconListResponse {
    #[serde(default)]
    categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    uncategorized: Vec<String>,
}

/// Raw body of a single icon plus optional canvas overrides
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IconBody {
    pub body: String,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// Icon bodies for one requested chunk
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IconBatchResponse {
    #[serde(default = "default_canvas_size")]
    pub width: f64,
    #[serde(default = "default_canvas_size")]
    pub height: f64,
    #[serde(default)]
    pub icons: HashMap<String, IconBody>,
    /// Requested names the catalog does not know
    #[serde(default)]
    pub not_found: Vec<String>,
}

fn default_canvas_size() -> f64 {
    DEFAULT_CANVAS_SIZE
}

/// Read-only client for the icon catalog
pub struct CatalogClient {
    client: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    /// Create a catalog client from an already built HTTP client
    pub fn new(client: Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }

    /// Create a catalog client with its own HTTP client and the given configuration
    pub fn with_config(config: CatalogConfig) -> Result<Self> {
        Ok(Self::new(create_http_client()?, config))
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// List every collection, sorted by display name
    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        let url = format!("{}/collections", self.config.base_url);
        let raw: HashMap<String, CollectionInfo> = self.get_json(&url, &[]).await?;

        let mut collections: Vec<Collection> = raw
            .into_iter()
            .map(|(id, info)| Collection {
                id,
                name: info.name,
                total: info.total,
                category: info.category,
            })
            .collect();

        collections.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        debug!("Catalog lists {} collections", collections.len());
        Ok(collections)
    }

    /// List the icon names of one collection, sorted and without duplicates
    pub async fn list_icon_ids(&self, collection_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/collection", self.config.base_url);
        let query = [
            ("prefix", collection_id),
            ("chars", "true"),
            ("aliases", "true"),
        ];
        let response: IconListResponse = self.get_json(&url, &query).await?;

        Ok(merge_icon_ids(response))
    }

    /// Fetch the bodies of a chunk of icons with a single request
    ///
    /// Icons the catalog omits are not an error; callers render what is returned.
    pub async fn fetch_icon_batch(
        &self,
        collection_id: &str,
        icon_ids: &[String],
    ) -> Result<IconBatchResponse> {
        let url = format!("{}/{}.json", self.config.base_url, collection_id);
        let icons = icon_ids.join(",");
        self.get_json(&url, &[("icons", icons.as_str())]).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::TransportError(format!(
                "Catalog request to {url} failed: {status}"
            )));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::DecodeError(format!("Unexpected response from {url}: {e}")))
    }
}

/// Collapse every category bucket and the uncategorized bucket into one sorted list
fn merge_icon_ids(response: IconListResponse) -> Vec<String> {
    response
        .categories
        .into_values()
        .flatten()
        .chain(response.uncategorized)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> CatalogClient {
        CatalogClient::with_config(CatalogConfig::with_base_url(server.uri())).unwrap()
    }

    #[test]
    fn test_default_config() {
        assert_eq!(CatalogConfig::default().base_url, "https://api.iconify.design");
        assert_eq!(
            CatalogConfig::with_base_url("http://localhost:8080/").base_url,
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_merge_icon_ids_dedups_across_categories() {
        let response: IconListResponse = serde_json::from_value(serde_json::json!({
            "prefix": "mdi",
            "categories": {
                "Account": ["account", "home", "zoom"],
                "Home": ["home", "bed"]
            },
            "uncategorized": ["zoom", "apple"]
        }))
        .unwrap();

        assert_eq!(
            merge_icon_ids(response),
            vec!["account", "apple", "bed", "home", "zoom"]
        );
    }

    #[test]
    fn test_merge_icon_ids_missing_buckets() {
        let response: IconListResponse =
            serde_json::from_value(serde_json::json!({ "prefix": "x" })).unwrap();
        assert!(merge_icon_ids(response).is_empty());
    }

    #[test]
    fn test_batch_response_defaults() {
        let batch: IconBatchResponse = serde_json::from_value(serde_json::json!({
            "prefix": "mdi",
            "icons": {
                "home": { "body": "<path/>", "height": 32 }
            }
        }))
        .unwrap();

        assert_eq!(batch.width, 16.0);
        assert_eq!(batch.height, 16.0);
        let home = &batch.icons["home"];
        assert_eq!(home.width, None);
        assert_eq!(home.height, Some(32.0));
        assert!(batch.not_found.is_empty());
    }

    #[tokio::test]
    async fn test_list_collections_sorted_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tabler": { "name": "Tabler Icons", "total": 5000, "category": "General" },
                "mdi": { "name": "Material Design Icons", "total": 7000, "category": "Material" },
                "lucide": { "name": "Lucide", "total": 1500 }
            })))
            .mount(&server)
            .await;

        let collections = client_for(&server).await.list_collections().await.unwrap();

        let names: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Lucide", "Material Design Icons", "Tabler Icons"]);
        assert_eq!(collections[1].id, "mdi");
        assert_eq!(collections[1].total, 7000);
        assert_eq!(collections[0].category, "");
    }

    #[tokio::test]
    async fn test_list_icon_ids_sends_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collection"))
            .and(query_param("prefix", "mdi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "categories": { "A": ["home", "account"], "B": ["account"] },
                "uncategorized": ["home"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ids = client_for(&server).await.list_icon_ids("mdi").await.unwrap();
        assert_eq!(ids, vec!["account", "home"]);
    }

    #[tokio::test]
    async fn test_fetch_icon_batch_joins_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mdi.json"))
            .and(query_param("icons", "account,home"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "prefix": "mdi",
                "width": 24,
                "height": 24,
                "icons": {
                    "account": { "body": "<path d=\"M1\"/>" }
                },
                "not_found": ["home"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ids = vec!["account".to_string(), "home".to_string()];
        let batch = client_for(&server)
            .await
            .fetch_icon_batch("mdi", &ids)
            .await
            .unwrap();

        assert_eq!(batch.width, 24.0);
        assert_eq!(batch.icons.len(), 1);
        assert_eq!(batch.not_found, vec!["home"]);
    }

    #[tokio::test]
    async fn test_malformed_response_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2, 3]"))
            .mount(&server)
            .await;

        let result = client_for(&server).await.list_collections().await;
        match result {
            Err(Error::DecodeError(msg)) => assert!(msg.contains("/collections")),
            other => panic!("Expected DecodeError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collection"))
            .respond_with(ResponseTemplate::new(404).set_body_string("404"))
            .mount(&server)
            .await;

        let result = client_for(&server).await.list_icon_ids("nope").await;
        match result {
            Err(Error::TransportError(msg)) => assert!(msg.contains("404")),
            other => panic!("Expected TransportError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Nothing listens on port 9 locally
        let client = CatalogClient::with_config(CatalogConfig::with_base_url("http://127.0.0.1:9")).unwrap();
        match client.list_collections().await {
            Err(Error::TransportError(_)) => {}
            other => panic!("Expected TransportError, got {other:?}"),
        }
    }
}
