//! Skill document loading.
//!
//! Every skill keeps its instructions in a `SKILL.md` file under its own
//! directory. The document target is built from the document root and the
//! record's normalized path:
//!
//! ```text
//! <document-root>/<resolved-path>/SKILL.md
//! ```
//!
//! A fetch is attempted once. Anything other than a successful read is
//! reported as [`LoadError::DocumentFetchFailed`].

mod frontmatter;

pub use frontmatter::{SkillFrontmatter, parse_frontmatter, strip_frontmatter};

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::ResolvedPath;
use crate::error::LoadError;
use crate::location::Location;

/// File name of the document inside each skill directory.
pub const SKILL_FILE_NAME: &str = "SKILL.md";

/// Raw text of a successfully loaded SKILL.md.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent(String);

impl DocumentContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Frontmatter key-value pairs, empty when the document has none.
    pub fn frontmatter(&self) -> SkillFrontmatter {
        parse_frontmatter(&self.0)
    }

    /// Markdown body with any leading frontmatter removed.
    pub fn body(&self) -> &str {
        strip_frontmatter(&self.0)
    }
}

/// Where skill documents are read from.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_document(&self, path: &ResolvedPath) -> Result<DocumentContent, LoadError>;

    /// Human-readable fetch target for a path, for logs and error messages.
    fn target(&self, path: &ResolvedPath) -> String;
}

/// Build the document URL under a remote root.
///
/// The root is treated as a directory whether or not it ends in `/`. Each
/// path segment is percent-encoded, so `#`, `?` and `:` stay inside the path.
pub fn document_url(root: &Url, path: &ResolvedPath) -> Result<Url, url::ParseError> {
    let mut url = root.clone();
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(path.segments())
        .push(SKILL_FILE_NAME);
    Ok(url)
}

/// Documents served over HTTP(S).
pub struct HttpDocuments {
    client: reqwest::Client,
    root: Url,
}

impl HttpDocuments {
    pub fn new(client: reqwest::Client, root: Url) -> Self {
        Self { client, root }
    }
}

#[async_trait]
impl DocumentSource for HttpDocuments {
    async fn fetch_document(&self, path: &ResolvedPath) -> Result<DocumentContent, LoadError> {
        let url = document_url(&self.root, path).map_err(|e| LoadError::DocumentFetchFailed {
            target: self.target(path),
            reason: e.to_string(),
        })?;
        let failed = |reason: String| LoadError::DocumentFetchFailed {
            target: url.to_string(),
            reason,
        };

        debug!("Fetching skill document {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Skill document {} returned HTTP {}", url, status);
            return Err(failed(format!("HTTP {}", status)));
        }

        let text = response.text().await.map_err(|e| failed(e.to_string()))?;
        Ok(DocumentContent::new(text))
    }

    fn target(&self, path: &ResolvedPath) -> String {
        document_url(&self.root, path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}/{}/{}", self.root, path, SKILL_FILE_NAME))
    }
}

/// Documents stored in a local skills directory.
pub struct FsDocuments {
    root: PathBuf,
}

impl FsDocuments {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_path(&self, path: &ResolvedPath) -> PathBuf {
        let mut file = self.root.clone();
        for segment in path.segments() {
            file.push(segment);
        }
        file.push(SKILL_FILE_NAME);
        file
    }
}

/// True when a relative path stays inside whatever it is joined onto.
fn stays_inside(path: &ResolvedPath) -> bool {
    path.segments()
        .all(|s| matches!(Path::new(s).components().next(), Some(Component::Normal(_))))
}

#[async_trait]
impl DocumentSource for FsDocuments {
    async fn fetch_document(&self, path: &ResolvedPath) -> Result<DocumentContent, LoadError> {
        let file = self.file_path(path);
        if !stays_inside(path) {
            return Err(LoadError::DocumentFetchFailed {
                target: file.display().to_string(),
                reason: "path escapes the document root".to_string(),
            });
        }

        debug!("Reading skill document {}", file.display());
        match tokio::fs::read_to_string(&file).await {
            Ok(text) => Ok(DocumentContent::new(text)),
            Err(e) => {
                warn!("Failed to read skill document {}: {}", file.display(), e);
                Err(LoadError::DocumentFetchFailed {
                    target: file.display().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn target(&self, path: &ResolvedPath) -> String {
        self.file_path(path).display().to_string()
    }
}

/// Pick the document implementation for a root location.
pub fn document_source(root: &Location, client: reqwest::Client) -> Arc<dyn DocumentSource> {
    match root {
        Location::Remote(url) => Arc::new(HttpDocuments::new(client, url.clone())),
        Location::Local(path) => Arc::new(FsDocuments::new(path.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolved(raw: &str) -> ResolvedPath {
        ResolvedPath::normalize(raw)
    }

    #[test]
    fn test_document_url_without_trailing_slash() {
        let root = Url::parse("https://example.com/skills").unwrap();
        let url = document_url(&root, &resolved("skills/tools/writer")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/skills/tools/writer/SKILL.md");
    }

    #[test]
    fn test_document_url_with_trailing_slash() {
        let root = Url::parse("https://example.com/skills/").unwrap();
        let url = document_url(&root, &resolved("tools/writer")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/skills/tools/writer/SKILL.md");
    }

    #[test]
    fn test_document_url_does_not_duplicate_skills_segment() {
        let root = Url::parse("https://example.com/skills").unwrap();
        let url = document_url(&root, &resolved("skills/writer")).unwrap();
        assert!(!url.as_str().contains("skills/skills"));
    }

    #[test]
    fn test_document_url_encodes_reserved_characters() {
        let root = Url::parse("https://example.com/skills").unwrap();

        let url = document_url(&root, &resolved("skills/tools/c#-helper")).unwrap();
        assert_eq!(url.path(), "/skills/tools/c%23-helper/SKILL.md");
        assert_eq!(url.fragment(), None);

        let url = document_url(&root, &resolved("skills/tools/what?x")).unwrap();
        assert_eq!(url.path(), "/skills/tools/what%3Fx/SKILL.md");
        assert_eq!(url.query(), None);

        let url = document_url(&root, &resolved("skills/dev:ops/writer")).unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/skills/dev:ops/writer/SKILL.md");
    }

    #[test]
    fn test_document_url_rejects_cannot_be_a_base_root() {
        let root = Url::parse("mailto:skills@example.com").unwrap();
        assert!(document_url(&root, &resolved("tools/writer")).is_err());
    }

    #[test]
    fn test_body_strips_frontmatter() {
        let doc = DocumentContent::new("---\nname: writer\n---\n# Writer\nDoes X.");
        assert_eq!(doc.body(), "# Writer\nDoes X.");
        assert_eq!(doc.frontmatter().get("name").map(String::as_str), Some("writer"));
    }

    #[tokio::test]
    async fn test_fs_documents_reads_skill_md() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("tools").join("writer");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("SKILL.md"), "# Writer\nDoes X.").unwrap();

        let docs = FsDocuments::new(tmp.path());
        let content = docs.fetch_document(&resolved("skills/tools/writer")).await.unwrap();
        assert_eq!(content.as_str(), "# Writer\nDoes X.");
    }

    #[tokio::test]
    async fn test_fs_documents_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = FsDocuments::new(tmp.path());
        let err = docs.fetch_document(&resolved("tools/ghost")).await.unwrap_err();
        match err {
            LoadError::DocumentFetchFailed { target, .. } => {
                assert!(target.ends_with("SKILL.md"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fs_documents_rejects_parent_segments() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = FsDocuments::new(tmp.path().join("skills"));
        let err = docs.fetch_document(&resolved("../secrets")).await.unwrap_err();
        assert_eq!(err.kind(), "document_fetch_failed");
    }

    #[tokio::test]
    async fn test_http_documents_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/skills/tools/writer/SKILL.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Writer\nDoes X."))
            .expect(1)
            .mount(&server)
            .await;

        let root = Url::parse(&format!("{}/skills", server.uri())).unwrap();
        let docs = HttpDocuments::new(reqwest::Client::new(), root);
        let content = docs.fetch_document(&resolved("skills/tools/writer")).await.unwrap();
        assert_eq!(content.as_str(), "# Writer\nDoes X.");
    }

    #[tokio::test]
    async fn test_http_documents_requests_encoded_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/skills/tools/c%23-helper/SKILL.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# C# helper"))
            .expect(1)
            .mount(&server)
            .await;

        let root = Url::parse(&format!("{}/skills", server.uri())).unwrap();
        let docs = HttpDocuments::new(reqwest::Client::new(), root);
        let content = docs.fetch_document(&resolved("skills/tools/c#-helper")).await.unwrap();
        assert_eq!(content.as_str(), "# C# helper");
    }

    #[tokio::test]
    async fn test_http_documents_non_success_is_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let root = Url::parse(&format!("{}/skills", server.uri())).unwrap();
        let docs = HttpDocuments::new(reqwest::Client::new(), root);
        let err = docs.fetch_document(&resolved("tools/writer")).await.unwrap_err();
        match err {
            LoadError::DocumentFetchFailed { target, reason } => {
                assert!(target.ends_with("/skills/tools/writer/SKILL.md"));
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
