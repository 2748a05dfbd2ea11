//! Local stand-in for the encyclopedia and chat upstreams.
//!
//! Serves the summary, search and chat-completion endpoints from a scripted
//! table on `127.0.0.1:0` and counts every call.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use termlens::api::AppState;
use termlens::chat::ChatClient;
use termlens::config::Credential;
use termlens::image_resolver::ImageResolver;
use termlens::wiki::WikiClient;

pub const TEST_KEY: &str = "sk-test-key";

#[derive(Debug, Clone)]
pub enum Summary {
    Thumb(String),
    NoThumb,
    Status(u16),
    Garbage,
}

#[derive(Debug, Clone)]
pub enum Search {
    Titles(Vec<Option<String>>),
    Status(u16),
    Garbage,
}

#[derive(Debug, Clone)]
pub enum Chat {
    Content(String),
    NoChoices,
    Status(u16),
    Garbage,
}

#[derive(Debug, Clone)]
pub struct Script {
    summaries: HashMap<String, Summary>,
    searches: HashMap<String, Search>,
    chat: Chat,
}

impl Default for Script {
    fn default() -> Self {
        Script {
            summaries: HashMap::new(),
            searches: HashMap::new(),
            chat: Chat::Content("English term: test".to_string()),
        }
    }
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, title: &str, summary: Summary) -> Self {
        self.summaries.insert(title.to_string(), summary);
        self
    }

    pub fn thumb(self, title: &str, url: &str) -> Self {
        self.summary(title, Summary::Thumb(url.to_string()))
    }

    pub fn search(mut self, query: &str, search: Search) -> Self {
        self.searches.insert(query.to_string(), search);
        self
    }

    pub fn search_hit(self, query: &str, title: &str) -> Self {
        self.search(query, Search::Titles(vec![Some(title.to_string())]))
    }

    pub fn chat(mut self, chat: Chat) -> Self {
        self.chat = chat;
        self
    }
}

#[derive(Debug, Default)]
pub struct Calls {
    summary: AtomicUsize,
    search: AtomicUsize,
    chat: AtomicUsize,
    summary_titles: Mutex<Vec<String>>,
    search_queries: Mutex<Vec<String>>,
    chat_requests: Mutex<Vec<(Option<String>, Value)>>,
}

impl Calls {
    pub fn summary(&self) -> usize {
        self.summary.load(Ordering::SeqCst)
    }

    pub fn search(&self) -> usize {
        self.search.load(Ordering::SeqCst)
    }

    pub fn chat(&self) -> usize {
        self.chat.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.summary() + self.search() + self.chat()
    }

    pub fn summary_titles(&self) -> Vec<String> {
        self.summary_titles.lock().unwrap().clone()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }

    /// Authorization header and JSON body of each chat request.
    pub fn chat_requests(&self) -> Vec<(Option<String>, Value)> {
        self.chat_requests.lock().unwrap().clone()
    }
}

struct MockState {
    script: Script,
    calls: Arc<Calls>,
}

pub struct MockUpstream {
    pub base_url: String,
    pub calls: Arc<Calls>,
}

impl MockUpstream {
    pub async fn start(script: Script) -> Self {
        let calls = Arc::new(Calls::default());
        let state = Arc::new(MockState {
            script,
            calls: calls.clone(),
        });
        let app = Router::new()
            .route("/api/rest_v1/page/summary/:title", get(summary))
            .route("/w/api.php", get(search))
            .route("/v1/chat/completions", post(chat))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpstream {
            base_url: format!("http://{addr}"),
            calls,
        }
    }

    pub fn wiki(&self) -> WikiClient {
        WikiClient::with_client(http_client(), &self.base_url).unwrap()
    }

    pub fn resolver(&self) -> ImageResolver {
        ImageResolver::new(self.wiki())
    }

    pub fn chat_client(&self) -> ChatClient {
        ChatClient::with_client(http_client(), &self.base_url, "gpt-4.1-mini", 0.2)
    }

    pub fn state(&self, credential: Credential) -> AppState {
        AppState::new(self.chat_client(), self.resolver(), credential)
    }

    pub fn state_with_key(&self) -> AppState {
        self.state(Credential::Fixed(Some(TEST_KEY.to_string())))
    }
}

/// Client that ignores proxy settings from the environment.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// A base url nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn status(code: u16) -> Response {
    StatusCode::from_u16(code).unwrap().into_response()
}

fn garbage() -> Response {
    ([(header::CONTENT_TYPE, "text/html")], "<html>upstream hiccup</html>").into_response()
}

async fn summary(State(state): State<Arc<MockState>>, Path(title): Path<String>) -> Response {
    state.calls.summary.fetch_add(1, Ordering::SeqCst);
    state.calls.summary_titles.lock().unwrap().push(title.clone());

    match state.script.summaries.get(&title) {
        Some(Summary::Thumb(url)) => Json(json!({
            "title": title,
            "thumbnail": { "source": url, "width": 320, "height": 240 },
        }))
        .into_response(),
        Some(Summary::NoThumb) => Json(json!({ "title": title, "extract": "text only" })).into_response(),
        Some(Summary::Status(code)) => status(*code),
        Some(Summary::Garbage) => garbage(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "type": "https://mediawiki.org/wiki/HyperSwitch/errors/not_found" })),
        )
            .into_response(),
    }
}

async fn search(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.calls.search.fetch_add(1, Ordering::SeqCst);
    let query = params.get("srsearch").cloned().unwrap_or_default();
    state.calls.search_queries.lock().unwrap().push(query.clone());

    match state.script.searches.get(&query) {
        Some(Search::Titles(titles)) => {
            let hits: Vec<Value> = titles
                .iter()
                .map(|t| match t {
                    Some(title) => json!({ "ns": 0, "title": title }),
                    None => json!({ "ns": 0 }),
                })
                .collect();
            Json(json!({ "batchcomplete": "", "query": { "search": hits } })).into_response()
        }
        Some(Search::Status(code)) => status(*code),
        Some(Search::Garbage) => garbage(),
        None => Json(json!({ "batchcomplete": "", "query": { "search": [] } })).into_response(),
    }
}

async fn chat(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.calls.chat.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.calls.chat_requests.lock().unwrap().push((auth, body));

    match &state.script.chat {
        Chat::Content(text) => Json(json!({
            "id": "chatcmpl-test",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }],
        }))
        .into_response(),
        Chat::NoChoices => Json(json!({ "id": "chatcmpl-test" })).into_response(),
        Chat::Status(code) => (
            StatusCode::from_u16(*code).unwrap(),
            Json(json!({ "error": { "message": "internal upstream detail" } })),
        )
            .into_response(),
        Chat::Garbage => garbage(),
    }
}
