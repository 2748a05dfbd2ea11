use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

const SUMMARY_PATH: [&str; 4] = ["api", "rest_v1", "page", "summary"];
const SEARCH_PATH: [&str; 2] = ["w", "api.php"];

/// Outcome of a single encyclopedia call.
///
/// `Absent` means the upstream answered and simply had nothing for us;
/// `Failed` covers transport errors, unexpected statuses and bodies we could
/// not decode. Neither is an error for the caller of the resolver.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    Absent,
    Failed(WikiError),
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::Absent | Lookup::Failed(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum WikiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("undecodable body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid base url {0:?}")]
    BaseUrl(String),
}

#[derive(Debug, Default, Deserialize)]
struct PageSummary {
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: Option<String>,
}

/// Read-only client for the two encyclopedia endpoints we use: the REST page
/// summary by exact title and the action API full-text search.
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: reqwest::Client,
    base: Url,
}

impl WikiClient {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, WikiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, WikiError> {
        let base = Url::parse(base_url).map_err(|_| WikiError::BaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(WikiError::BaseUrl(base_url.to_string()));
        }
        Ok(Self { client, base })
    }

    pub fn summary_url(&self, title: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            // push() percent-encodes the title, '/' included
            segments.pop_if_empty().extend(SUMMARY_PATH).push(title);
        }
        url
    }

    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(SEARCH_PATH);
        }
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("list", "search")
            .append_pair("srsearch", query)
            .append_pair("srlimit", "1")
            .append_pair("format", "json");
        url
    }

    /// Thumbnail URL of the page whose title is exactly `title`.
    pub async fn page_thumbnail(&self, title: &str) -> Lookup<String> {
        let body = match self.get_text(self.summary_url(title)).await {
            Ok(Some(body)) => body,
            Ok(None) => return Lookup::Absent,
            Err(e) => return Lookup::Failed(e),
        };
        match thumbnail_from_summary(&body) {
            Ok(Some(source)) => Lookup::Found(source),
            Ok(None) => Lookup::Absent,
            Err(e) => Lookup::Failed(e.into()),
        }
    }

    /// Title of the top-ranked full-text search hit for `query`.
    pub async fn top_search_title(&self, query: &str) -> Lookup<String> {
        let body = match self.get_text(self.search_url(query)).await {
            Ok(Some(body)) => body,
            Ok(None) => return Lookup::Absent,
            Err(e) => return Lookup::Failed(e),
        };
        match top_title_from_search(&body) {
            Ok(Some(title)) => Lookup::Found(title),
            Ok(None) => Lookup::Absent,
            Err(e) => Lookup::Failed(e.into()),
        }
    }

    /// GET returning the body, `None` on 404.
    async fn get_text(&self, url: Url) -> Result<Option<String>, WikiError> {
        log::debug!("GET {url}");
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(WikiError::Status(status));
        }
        Ok(Some(res.text().await?))
    }
}

fn thumbnail_from_summary(body: &str) -> Result<Option<String>, serde_json::Error> {
    let summary: PageSummary = serde_json::from_str(body)?;
    Ok(summary
        .thumbnail
        .and_then(|t| t.source)
        .filter(|s| !s.is_empty()))
}

// Only the first hit counts; a first hit without a title is "no result".
fn top_title_from_search(body: &str) -> Result<Option<String>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .query
        .and_then(|q| q.search.into_iter().next())
        .and_then(|hit| hit.title)
        .filter(|t| !t.is_empty()))
}
