//! Content store access.
//!
//! The pipeline only needs one capability from the CMS: list the published
//! portfolio records, in display order. [`ContentRepository`] is that seam.
//!
//! | Implementation | Source |
//! |----------------|--------|
//! | [`SanityClient`] | Sanity HTTP query API (GROQ) |
//! | [`JsonFileRepository`] | JSON export on disk, for offline/CI builds |
//! | [`InMemoryRepository`] | Fixed records, for tests and dry runs |
//!
//! Ordering and visibility filtering happen in the store: records flagged
//! `showInWorkList == false` are excluded server-side and the rest arrive
//! sorted by the explicit `order` field, then by `year` descending.

use crate::config::CmsConfig;
use crate::types::ContentRecord;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("CMS is not configured: {0}")]
    NotConfigured(String),
    #[error("content store unavailable: {0}")]
    Unavailable(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid CMS URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lists published content records in display order.
pub trait ContentRepository {
    fn list_published(&self) -> Result<Vec<ContentRecord>, ContentError>;
}

/// Query the Sanity HTTP API.
pub struct SanityClient {
    client: reqwest::blocking::Client,
    endpoint: Url,
}

#[derive(Deserialize)]
struct QueryResponse {
    result: Vec<ContentRecord>,
}

impl SanityClient {
    pub fn new(cms: &CmsConfig) -> Result<Self, ContentError> {
        if cms.project_id.trim().is_empty() {
            return Err(ContentError::NotConfigured(
                "cms.project_id is empty".to_string(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("prerender/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cms.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: query_url(cms)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ContentRepository for SanityClient {
    fn list_published(&self) -> Result<Vec<ContentRecord>, ContentError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()?
            .error_for_status()?;
        let body: QueryResponse = response.json()?;
        Ok(body.result)
    }
}

/// Full query URL, GROQ included as the `query` parameter.
///
/// `cms.api_base` replaces the project's Sanity origin when set.
pub fn query_url(cms: &CmsConfig) -> Result<Url, ContentError> {
    let base = match &cms.api_base {
        Some(base) => base.trim_end_matches('/').to_string(),
        None => {
            let host = if cms.use_cdn { "apicdn" } else { "api" };
            format!("https://{}.{}.sanity.io", cms.project_id, host)
        }
    };
    let mut url = Url::parse(&format!(
        "{base}/v{}/data/query/{}",
        cms.api_version, cms.dataset
    ))?;
    url.query_pairs_mut()
        .append_pair("query", &published_query(&cms.document_type));
    Ok(url)
}

/// GROQ query for published records of one document type.
pub fn published_query(document_type: &str) -> String {
    // GROQ string literals share JSON's quoting rules.
    let doc_type = serde_json::Value::String(document_type.to_string());
    format!(
        "*[_type == {doc_type} && showInWorkList != false] | order(order asc, year desc) \
         {{ slug, \"heroImageId\": heroImage.asset._ref, \"imageId\": image.asset._ref, _updatedAt }}"
    )
}

/// Records read from a JSON array on disk.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentRepository for JsonFileRepository {
    fn list_published(&self) -> Result<Vec<ContentRecord>, ContentError> {
        let content = fs::read_to_string(&self.path).map_err(|source| ContentError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Fixed set of records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    records: Vec<ContentRecord>,
}

impl InMemoryRepository {
    pub fn new(records: Vec<ContentRecord>) -> Self {
        Self { records }
    }
}

impl ContentRepository for InMemoryRepository {
    fn list_published(&self) -> Result<Vec<ContentRecord>, ContentError> {
        Ok(self.records.clone())
    }
}

/// A content store that could not be set up. Every fetch fails with the
/// original reason, so callers take their usual fetch-failure path.
#[derive(Debug, Clone)]
pub struct UnavailableRepository {
    reason: String,
}

impl ContentRepository for UnavailableRepository {
    fn list_published(&self) -> Result<Vec<ContentRecord>, ContentError> {
        Err(ContentError::Unavailable(self.reason.clone()))
    }
}

/// Pick the repository the config asks for.
///
/// A `records_file` wins over the HTTP API; relative paths resolve against
/// the project root. Setup failures (no project id, client build errors)
/// yield an [`UnavailableRepository`] rather than an error.
pub fn repository_from_config(cms: &CmsConfig, root: &Path) -> Box<dyn ContentRepository> {
    if let Some(file) = &cms.records_file {
        return Box::new(JsonFileRepository::new(root.join(file)));
    }
    match SanityClient::new(cms) {
        Ok(client) => Box::new(client),
        Err(err) => Box::new(UnavailableRepository {
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use tempfile::TempDir;

    fn cms() -> CmsConfig {
        CmsConfig {
            project_id: "abc123".into(),
            ..CmsConfig::default()
        }
    }

    #[test]
    fn query_url_uses_cdn_host() {
        let url = query_url(&cms()).unwrap();
        assert_eq!(url.host_str(), Some("abc123.apicdn.sanity.io"));
        assert_eq!(url.path(), "/v2024-01-01/data/query/production");
    }

    #[test]
    fn query_url_uses_live_host_without_cdn() {
        let mut cms = cms();
        cms.use_cdn = false;
        let url = query_url(&cms).unwrap();
        assert_eq!(url.host_str(), Some("abc123.api.sanity.io"));
    }

    #[test]
    fn query_url_carries_encoded_groq() {
        let url = query_url(&cms()).unwrap();
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "query");
        assert!(value.starts_with("*[_type == \"project\""));
        assert!(value.contains("showInWorkList != false"));
        assert!(value.contains("order(order asc, year desc)"));
    }

    #[test]
    fn query_url_honors_api_base() {
        let mut cms = cms();
        cms.api_base = Some("http://127.0.0.1:9000/".into());
        let url = query_url(&cms).unwrap();
        assert!(url.as_str().starts_with("http://127.0.0.1:9000/v2024-01-01/data/query/production?query="));
    }

    #[test]
    fn published_query_quotes_document_type() {
        let q = published_query("case\"study");
        assert!(q.contains(r#"_type == "case\"study""#));
    }

    #[test]
    fn sanity_client_requires_project_id() {
        let result = SanityClient::new(&CmsConfig::default());
        assert!(matches!(result, Err(ContentError::NotConfigured(_))));
    }

    // =========================================================================
    // SanityClient against a local mock
    // =========================================================================

    fn mock_cms(server: &MockServer) -> CmsConfig {
        CmsConfig {
            api_base: Some(server.base_url()),
            timeout_secs: 5,
            ..cms()
        }
    }

    #[test]
    fn sanity_client_returns_records_in_response_order() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET").path("/v2024-01-01/data/query/production");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"ms": 3, "result": [
                    {"slug": {"current": "newest"}, "heroImageId": "image-a-10x10-jpg"},
                    {"slug": {"current": "older"}, "_updatedAt": "2024-01-02T00:00:00Z"}
                ]}"#);
        });

        let client = SanityClient::new(&mock_cms(&server)).unwrap();
        assert!(client.endpoint().as_str().starts_with(&server.base_url()));
        let records = client.list_published().unwrap();
        mock.assert();

        let slugs: Vec<_> = records.iter().filter_map(|r| r.slug()).collect();
        assert_eq!(slugs, vec!["newest", "older"]);
        assert_eq!(records[0].preferred_image_id(), Some("image-a-10x10-jpg"));
        assert_eq!(records[1].updated_at.as_deref(), Some("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn sanity_client_server_error_is_http_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET");
            then.status(500).body("upstream exploded");
        });

        let client = SanityClient::new(&mock_cms(&server)).unwrap();
        let err = client.list_published().unwrap_err();
        mock.assert();
        assert!(matches!(err, ContentError::Http(_)), "{err}");
    }

    #[test]
    fn sanity_client_unexpected_body_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"error": "query parse error"}"#);
        });

        let client = SanityClient::new(&mock_cms(&server)).unwrap();
        assert!(client.list_published().is_err());
    }

    #[test]
    fn query_response_shape_deserializes() {
        let body = r#"{"ms": 4, "query": "...", "result": [
            {"slug": {"current": "one"}, "heroImageId": null, "imageId": "image-a-1x1-jpg"},
            {"slug": null}
        ]}"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result.len(), 2);
        assert_eq!(parsed.result[0].slug(), Some("one"));
        assert_eq!(parsed.result[1].slug(), None);
    }

    #[test]
    fn json_file_repository_reads_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("projects.json");
        fs::write(
            &path,
            r#"[{"slug": {"current": "alpha"}}, {"slug": {"current": "beta"}}]"#,
        )
        .unwrap();

        let records = JsonFileRepository::new(&path).list_published().unwrap();
        let slugs: Vec<_> = records.iter().filter_map(|r| r.slug()).collect();
        assert_eq!(slugs, vec!["alpha", "beta"]);
    }

    #[test]
    fn json_file_repository_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonFileRepository::new(tmp.path().join("nope.json"));
        assert!(matches!(
            repo.list_published(),
            Err(ContentError::Read { .. })
        ));
    }

    #[test]
    fn records_file_takes_precedence() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("export.json"), "[]").unwrap();
        let cms = CmsConfig {
            records_file: Some("export.json".into()),
            ..CmsConfig::default()
        };
        // project_id is empty, so only the file repository can succeed
        let repo = repository_from_config(&cms, tmp.path());
        assert!(repo.list_published().unwrap().is_empty());
    }

    #[test]
    fn unconfigured_cms_fails_on_fetch() {
        let tmp = TempDir::new().unwrap();
        let repo = repository_from_config(&CmsConfig::default(), tmp.path());
        let err = repo.list_published().unwrap_err();
        assert!(matches!(err, ContentError::Unavailable(_)));
        assert!(err.to_string().contains("project_id"));
    }
}
