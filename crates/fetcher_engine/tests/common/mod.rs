#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use fetcher_engine::{
    FailureKind, FetchError, FetchSettings, ImageFetcher, ResponseMetadata, Transport,
    TransportResponse,
};
use futures_util::StreamExt;

/// Canned response served by `FakeTransport`.
#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub declared_length: Option<u64>,
    pub chunks: Vec<Vec<u8>>,
}

impl FakeResponse {
    pub fn image(content_type: &str, body: &[u8]) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.to_string()),
            declared_length: Some(body.len() as u64),
            chunks: vec![body.to_vec()],
        }
    }

    pub fn undeclared(mut self) -> Self {
        self.declared_length = None;
        self
    }

    pub fn chunked(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks;
        self
    }
}

#[derive(Debug, Clone)]
enum Route {
    Respond(FakeResponse),
    Fail(String),
}

/// In-memory transport keyed by exact URL; unknown URLs fail like a refused
/// connection.
#[derive(Clone, Default)]
pub struct FakeTransport {
    routes: HashMap<String, Route>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, response: FakeResponse) -> Self {
        self.routes
            .insert(url.to_string(), Route::Respond(response));
        self
    }

    pub fn fail(mut self, url: &str, message: &str) -> Self {
        self.routes
            .insert(url.to_string(), Route::Fail(message.to_string()));
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let route = self
            .routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| Route::Fail("connection refused".to_string()));
        match route {
            Route::Fail(message) => Err(FetchError::new(FailureKind::Network, message)),
            Route::Respond(response) => {
                let metadata = ResponseMetadata {
                    status_code: response.status,
                    content_type: response.content_type,
                    declared_length: response.declared_length,
                    final_url: url.to_string(),
                };
                let body = futures_util::stream::iter(
                    response
                        .chunks
                        .into_iter()
                        .map(|chunk| Ok::<_, FetchError>(Bytes::from(chunk))),
                )
                .boxed();
                Ok(TransportResponse { metadata, body })
            }
        }
    }
}

pub fn settings_in(dir: &Path) -> FetchSettings {
    FetchSettings {
        storage_dir: dir.to_path_buf(),
        ..FetchSettings::default()
    }
}

pub fn fetcher_in(dir: &Path, transport: impl Transport + 'static) -> ImageFetcher {
    fetcher_logging::initialize_for_tests();
    ImageFetcher::open(&settings_in(dir), Box::new(transport)).expect("open fetcher")
}

/// Names of saved images in `dir`, ignoring the ledger and temp files.
pub fn saved_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    names
}

pub fn ledger_lines(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join(fetcher_engine::LEDGER_FILENAME))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
