//! A mock metadata service on a random local port.
//!
//! Routes:
//! - `/movie/{id}`: ids 1..=99 exist, 500 answers with a server error,
//!   900 hangs for five seconds, anything else is 404
//! - `/trending/movie/week`: one page of 12 movies
//! - `/discover/movie`, `/search/movie`: 20 movies per page over
//!   [`MockMetadataService::LIST_PAGES`] pages; a search for `nothing` finds
//!   no results
//!
//! Synthetic movies are titled `Movie {id}`, carry genre ids 28, 12 and 9999
//! and are in English. Every request target is recorded.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct MockMetadataService {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl MockMetadataService {
    pub const LIST_PAGES: u32 = 3;
    pub const TRENDING_COUNT: u32 = 12;

    pub async fn start() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream, Arc::clone(&log)));
            }
        });

        Ok(Self {
            url: format!("http://{}", addr),
            requests,
            handle,
        })
    }

    /// Base URL to hand to `MetadataConfig::with_api_url`
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request targets (path and query) received so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Drop for MockMetadataService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Value of `key` in the query string of `target`
pub fn query_param<'a>(target: &'a str, key: &str) -> Option<&'a str> {
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

fn movie_json(id: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Movie {id}"),
        "overview": "Synthetic",
        "genres": [{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}, {"id": 9999, "name": "Other"}],
        "poster_path": format!("/{id}.jpg"),
        "release_date": "2010-01-01",
        "runtime": 120,
        "vote_average": 7.5,
        "original_language": "en"
    })
}

fn list_item_json(id: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Movie {id}"),
        "genre_ids": [28, 12, 9999],
        "poster_path": format!("/{id}.jpg"),
        "release_date": "2010-01-01",
        "original_language": "en",
        "popularity": 10.0
    })
}

fn page_json(page: u32, ids: impl Iterator<Item = u32>, total_pages: u32) -> String {
    serde_json::json!({
        "page": page,
        "results": ids.map(list_item_json).collect::<Vec<_>>(),
        "total_pages": total_pages
    })
    .to_string()
}

async fn route(target: &str) -> (&'static str, String) {
    let path = target.split('?').next().unwrap_or("/");
    let page: u32 = query_param(target, "page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let list_page = |page: u32| {
        if page == 0 || page > MockMetadataService::LIST_PAGES {
            page_json(page, 0..0, MockMetadataService::LIST_PAGES)
        } else {
            let first = (page - 1) * 20 + 1;
            page_json(page, first..first + 20, MockMetadataService::LIST_PAGES)
        }
    };

    match path {
        "/trending/movie/week" => (
            "200 OK",
            page_json(1, 1..=MockMetadataService::TRENDING_COUNT, 1),
        ),
        "/discover/movie" => ("200 OK", list_page(page)),
        "/search/movie" if query_param(target, "query") == Some("nothing") => {
            ("200 OK", page_json(1, 0..0, 0))
        }
        "/search/movie" => ("200 OK", list_page(page)),
        _ => {
            let id: u32 = path
                .strip_prefix("/movie/")
                .and_then(|id| id.parse().ok())
                .unwrap_or(0);
            match id {
                1..=99 => ("200 OK", movie_json(id).to_string()),
                500 => ("500 Internal Server Error", "{}".to_string()),
                900 => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    ("200 OK", "{}".to_string())
                }
                _ => ("404 Not Found", r#"{"success":false}"#.to_string()),
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream, log: Arc<Mutex<Vec<String>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let request = String::from_utf8_lossy(&buf);
    let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();
    if let Ok(mut requests) = log.lock() {
        requests.push(target.clone());
    }

    let (status, body) = route(&target).await;
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
