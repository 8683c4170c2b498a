#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use pulgarpedia::client::HttpContentSource;
use pulgarpedia::config::Config;
use pulgarpedia::server::{router, AppState};

pub const CATALOG: &str = include_str!("../fixtures/catalog.json");

/// How the fake content endpoint answers.
#[derive(Debug, Clone)]
pub enum Mode {
    Ok,
    Body(String),
    Status(u16),
    Slow(Duration),
}

#[derive(Clone)]
struct UpstreamState {
    hits: Arc<AtomicUsize>,
    mode: Arc<Mutex<Mode>>,
}

pub struct Upstream {
    pub url: String,
    state: UpstreamState,
}

impl Upstream {
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.state.mode.lock().unwrap() = mode;
    }
}

async fn serve_catalog(State(state): State<UpstreamState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let mode = state.mode.lock().unwrap().clone();
    match mode {
        Mode::Ok => CATALOG.into_response(),
        Mode::Body(body) => body.into_response(),
        Mode::Status(status) => StatusCode::from_u16(status).unwrap().into_response(),
        Mode::Slow(delay) => {
            tokio::time::sleep(delay).await;
            CATALOG.into_response()
        }
    }
}

/// Start a fake content endpoint on an ephemeral port.
pub async fn spawn_upstream(mode: Mode) -> Upstream {
    let state = UpstreamState {
        hits: Arc::new(AtomicUsize::new(0)),
        mode: Arc::new(Mutex::new(mode)),
    };
    let app = Router::new()
        .route("/content", get(serve_catalog))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Upstream {
        url: format!("http://{}/content", addr),
        state,
    }
}

pub fn test_config(endpoint: &str) -> Config {
    let mut config = Config::minimal();
    config.content.endpoint = endpoint.to_string();
    config.content.timeout_secs = 1;
    config.catalog.scroll_delay_ms = 10;
    config
}

/// Start the site against `config` and return its base URL.
pub async fn spawn_app(config: Config) -> String {
    let source = Arc::new(HttpContentSource::new(&config.content).unwrap());
    let state = AppState::new(config, source).unwrap();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// HTTP client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
