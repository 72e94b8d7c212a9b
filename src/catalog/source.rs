//! 书库资源的读取：本地目录或远程静态站点。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::models::{NovelDetail, NovelSummary};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid json in {resource}: {source}")]
    Json {
        resource: String,
        source: serde_json::Error,
    },
    #[error("invalid library location '{0}'")]
    Location(String),
}

/// 静态书库资源的提供方。
pub trait LibrarySource: Send + Sync {
    fn fetch_manifest(&self) -> Result<Vec<NovelSummary>, CatalogError>;
    fn fetch_detail(&self, novel_id: &str) -> Result<NovelDetail, CatalogError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLocation {
    Directory(PathBuf),
    Remote(Url),
}

impl LibraryLocation {
    /// `http(s)://` 开头视为远程站点，其余视为本地目录。
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(CatalogError::Location(raw.to_string()));
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            // Url::join 只在以 '/' 结尾时保留最后一段路径
            let base = if s.ends_with('/') {
                s.to_string()
            } else {
                format!("{s}/")
            };
            let url = Url::parse(&base).map_err(|_| CatalogError::Location(raw.to_string()))?;
            return Ok(Self::Remote(url));
        }
        Ok(Self::Directory(PathBuf::from(s)))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Directory(p) => p.display().to_string(),
            Self::Remote(u) => u.to_string(),
        }
    }
}

pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
            resource: path.display().to_string(),
            source,
        })
    }
}

impl LibrarySource for DirectorySource {
    fn fetch_manifest(&self) -> Result<Vec<NovelSummary>, CatalogError> {
        self.read_json(&self.root.join(MANIFEST_FILE))
    }

    fn fetch_detail(&self, novel_id: &str) -> Result<NovelDetail, CatalogError> {
        self.read_json(&self.root.join(format!("{novel_id}.json")))
    }
}

pub struct RemoteSource {
    client: Client,
    base: Url,
}

impl RemoteSource {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|source| CatalogError::Http {
                url: base.to_string(),
                source,
            })?;
        Ok(Self { client, base })
    }

    fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<T, CatalogError> {
        let url = self
            .base
            .join(name)
            .map_err(|_| CatalogError::Location(format!("{}{name}", self.base)))?;
        let url_text = url.to_string();
        debug!(target: "catalog", url = %url_text, "GET");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| CatalogError::Http {
                url: url_text.clone(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url_text,
                status: status.as_u16(),
            });
        }
        let body = resp.text().map_err(|source| CatalogError::Http {
            url: url_text.clone(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| CatalogError::Json {
            resource: url_text,
            source,
        })
    }
}

impl LibrarySource for RemoteSource {
    fn fetch_manifest(&self) -> Result<Vec<NovelSummary>, CatalogError> {
        self.get_json(MANIFEST_FILE)
    }

    fn fetch_detail(&self, novel_id: &str) -> Result<NovelDetail, CatalogError> {
        self.get_json(&format!("{novel_id}.json"))
    }
}

/// 按位置构造对应的资源读取器。
pub fn open_source(
    location: &LibraryLocation,
    timeout: Duration,
) -> Result<Arc<dyn LibrarySource>, CatalogError> {
    let source: Arc<dyn LibrarySource> = match location {
        LibraryLocation::Directory(root) => Arc::new(DirectorySource::new(root.clone())),
        LibraryLocation::Remote(base) => Arc::new(RemoteSource::new(base.clone(), timeout)?),
    };
    Ok(source)
}
