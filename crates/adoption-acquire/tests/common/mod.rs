#![allow(dead_code)]

use adoption_acquire::{ClientConfig, Fetcher};
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
}

/// Local stand-in for the adoption site. Serves canned responses keyed by
/// path (plus query) and records how many requests overlap.
pub struct SiteState {
    routes: Mutex<HashMap<String, Canned>>,
    hits: Mutex<HashMap<String, usize>>,
    current: AtomicUsize,
    peak: AtomicUsize,
    latency: Duration,
}

impl SiteState {
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    pub fn reset_counters(&self) {
        self.hits.lock().unwrap().clear();
        self.peak.store(0, Ordering::SeqCst);
    }
}

pub struct TestSite {
    pub base: String,
    pub state: Arc<SiteState>,
}

impl TestSite {
    pub async fn start(latency: Duration) -> Self {
        let state = Arc::new(SiteState {
            routes: Mutex::new(HashMap::new()),
            hits: Mutex::new(HashMap::new()),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            latency,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(serve).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub fn html(&self, path: &str, body: impl Into<String>) {
        self.add(path, StatusCode::OK, "text/html; charset=utf-8", body.into().into_bytes());
    }

    pub fn bytes(&self, path: &str, body: &[u8]) {
        self.add(path, StatusCode::OK, "image/jpeg", body.to_vec());
    }

    pub fn status(&self, path: &str, status: StatusCode) {
        self.add(path, status, "text/plain", b"nope".to_vec());
    }

    fn add(&self, path: &str, status: StatusCode, content_type: &'static str, body: Vec<u8>) {
        self.state.routes.lock().unwrap().insert(
            path.to_string(),
            Canned {
                status,
                content_type,
                body,
            },
        );
    }
}

async fn serve(State(state): State<Arc<SiteState>>, uri: Uri) -> Response {
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let now = state.current.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak.fetch_max(now, Ordering::SeqCst);
    *state.hits.lock().unwrap().entry(key.clone()).or_default() += 1;

    tokio::time::sleep(state.latency).await;

    let canned = state.routes.lock().unwrap().get(&key).cloned();
    state.current.fetch_sub(1, Ordering::SeqCst);

    match canned {
        Some(c) => (c.status, [(header::CONTENT_TYPE, c.content_type)], c.body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn fetcher() -> Arc<Fetcher> {
    fetcher_with_timeout(Duration::from_secs(5))
}

pub fn fetcher_with_timeout(timeout: Duration) -> Arc<Fetcher> {
    let config = ClientConfig {
        timeout,
        connect_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    Arc::new(Fetcher::new(&config).unwrap())
}

pub fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("adoption-it-{label}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Minimal profile page in the site's markup.
pub fn profile_page(name: &str, photos: &[String]) -> String {
    let slides: String = photos
        .iter()
        .map(|src| {
            format!(r#"<div class="swiper-slide"><div class="img"><img data-src="{src}"></div></div>"#)
        })
        .collect();
    format!(
        r#"<html><body><div class="adoptionProfilePage">
            <div class="profile-head"><h3>{name}</h3><p class="body-secondary">2 роки, Дівчинка</p></div>
            <div class="swiper slider-profile"><div class="swiper-wrapper">{slides}</div></div>
        </div></body></html>"#
    )
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
