//! Skill catalog index.
//!
//! The index is a JSON array of records, one per skill, typically published
//! as `skills_index.json` next to the skills tree:
//!
//! ```text
//! [
//!   {
//!     "id": "writer",
//!     "name": "writer",
//!     "category": "tools",
//!     "description": "Drafts and edits prose.",
//!     "path": "skills/tools/writer",
//!     "source": "community"
//!   }
//! ]
//! ```
//!
//! It is read once per page instance and searched by exact identifier.

mod path;

pub use path::{REDUNDANT_PREFIX, ResolvedPath};

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::LoadError;
use crate::location::Location;

/// Metadata for one skill as listed in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Unique key used in links and on the command line.
    pub id: String,
    /// Display name, also used for the `@name` mention.
    pub name: String,
    /// Category label (e.g. "tools", "development").
    #[serde(default)]
    pub category: String,
    /// What the skill does and when to use it.
    #[serde(default)]
    pub description: String,
    /// Storage path relative to the repository root (`skills/<category>/<name>`).
    pub path: String,
    /// Where the skill came from (e.g. "microsoft/skills", "community").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl CatalogRecord {
    /// Normalized document location for this record.
    pub fn resolved_path(&self) -> ResolvedPath {
        ResolvedPath::normalize(&self.path)
    }
}

/// Find the first record whose id equals `id` exactly.
pub fn resolve_record<'a>(
    id: &str,
    records: &'a [CatalogRecord],
) -> Result<&'a CatalogRecord, LoadError> {
    records
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| LoadError::NotFound(id.to_string()))
}

/// A readable catalog index.
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Read the full list of records.
    async fn fetch_index(&self) -> Result<Vec<CatalogRecord>, LoadError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Index served over HTTP(S).
pub struct HttpIndex {
    client: reqwest::Client,
    url: Url,
}

impl HttpIndex {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl IndexSource for HttpIndex {
    async fn fetch_index(&self) -> Result<Vec<CatalogRecord>, LoadError> {
        debug!("Fetching skill index from {}", self.url);
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| LoadError::IndexUnavailable(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::IndexUnavailable(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        let records: Vec<CatalogRecord> = response.json().await.map_err(|e| {
            LoadError::IndexUnavailable(format!("invalid index at {}: {}", self.url, e))
        })?;
        info!("Loaded {} skill records from {}", records.len(), self.url);
        Ok(records)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Index stored as a local JSON file.
pub struct FileIndex {
    path: PathBuf,
}

impl FileIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl IndexSource for FileIndex {
    async fn fetch_index(&self) -> Result<Vec<CatalogRecord>, LoadError> {
        debug!("Reading skill index from {}", self.path.display());
        let data = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            LoadError::IndexUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let records: Vec<CatalogRecord> = serde_json::from_str(&data).map_err(|e| {
            LoadError::IndexUnavailable(format!("invalid index at {}: {}", self.path.display(), e))
        })?;
        info!(
            "Loaded {} skill records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pick the index implementation for a location.
pub fn index_source(location: &Location, client: reqwest::Client) -> Arc<dyn IndexSource> {
    match location {
        Location::Remote(url) => Arc::new(HttpIndex::new(client, url.clone())),
        Location::Local(path) => Arc::new(FileIndex::new(path.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(id: &str, path: &str) -> CatalogRecord {
        CatalogRecord {
            id: id.to_string(),
            name: id.to_string(),
            category: "tools".to_string(),
            description: format!("The {} skill.", id),
            path: path.to_string(),
            source: None,
        }
    }

    const INDEX_JSON: &str = r#"[
        {"id": "writer", "name": "writer", "category": "tools",
         "description": "Drafts prose.", "path": "skills/tools/writer"},
        {"id": "azure-ai", "name": "Azure AI", "category": "official/microsoft",
         "description": "Azure AI SDK guidance.", "path": "skills/official/microsoft/azure-ai",
         "source": "microsoft/skills"}
    ]"#;

    #[test]
    fn test_resolve_exact_match() {
        let records = vec![record("writer", "skills/tools/writer"), record("reader", "skills/tools/reader")];
        let found = resolve_record("reader", &records).unwrap();
        assert_eq!(found.id, "reader");
    }

    #[test]
    fn test_resolve_returns_first_match() {
        let mut second = record("writer", "skills/other/writer");
        second.name = "shadow".to_string();
        let records = vec![record("writer", "skills/tools/writer"), second];
        assert_eq!(resolve_record("writer", &records).unwrap().path, "skills/tools/writer");
    }

    #[test]
    fn test_resolve_is_not_prefix_or_case_insensitive() {
        let records = vec![record("writer", "skills/tools/writer")];
        assert_eq!(
            resolve_record("write", &records),
            Err(LoadError::NotFound("write".to_string()))
        );
        assert!(resolve_record("Writer", &records).is_err());
        assert!(resolve_record("writer ", &records).is_err());
    }

    #[test]
    fn test_resolve_empty_index() {
        assert_eq!(
            resolve_record("ghost", &[]),
            Err(LoadError::NotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_record_deserialize_optional_fields() {
        let records: Vec<CatalogRecord> = serde_json::from_str(INDEX_JSON).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, None);
        assert_eq!(records[1].source.as_deref(), Some("microsoft/skills"));
        assert_eq!(records[1].resolved_path().as_str(), "official/microsoft/azure-ai");
    }

    #[tokio::test]
    async fn test_file_index_reads_records() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("skills_index.json");
        std::fs::write(&file, INDEX_JSON).unwrap();

        let index = FileIndex::new(&file);
        let records = index.fetch_index().await.unwrap();
        assert_eq!(records[0].id, "writer");
    }

    #[tokio::test]
    async fn test_file_index_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let index = FileIndex::new(tmp.path().join("nope.json"));
        let err = index.fetch_index().await.unwrap_err();
        assert_eq!(err.kind(), "index_unavailable");
    }

    #[tokio::test]
    async fn test_file_index_invalid_json() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("skills_index.json");
        std::fs::write(&file, "{ not json").unwrap();
        let err = FileIndex::new(&file).fetch_index().await.unwrap_err();
        assert!(matches!(err, LoadError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn test_http_index_fetches_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/skills_index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(INDEX_JSON, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/skills_index.json", server.uri())).unwrap();
        let index = HttpIndex::new(reqwest::Client::new(), url);
        let records = index.fetch_index().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_http_index_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/skills_index.json", server.uri())).unwrap();
        let err = HttpIndex::new(reqwest::Client::new(), url)
            .fetch_index()
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::IndexUnavailable(msg) if msg.contains("500")));
    }

    #[test]
    fn test_index_source_picks_implementation() {
        let client = reqwest::Client::new();
        let remote = index_source(&Location::parse("https://example.com/i.json"), client.clone());
        assert_eq!(remote.describe(), "https://example.com/i.json");
        let local = index_source(&Location::parse("data/skills_index.json"), client);
        assert_eq!(local.describe(), "data/skills_index.json");
    }
}
