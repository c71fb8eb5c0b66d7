//! In-process HTTP fixture server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Router;

#[derive(Clone)]
enum Route {
    Body(String),
    Status(u16),
}

#[derive(Default)]
struct Inner {
    routes: HashMap<String, Route>,
    hits: HashMap<String, usize>,
}

/// Serves configurable fixture bodies on an ephemeral local port and counts
/// requests per route. Unknown routes answer 404.
#[derive(Clone)]
pub struct FixtureServer {
    addr: SocketAddr,
    inner: Arc<Mutex<Inner>>,
}

impl FixtureServer {
    /// Bind an ephemeral port and start serving in the background.
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(Inner::default()));
        let app = Router::new()
            .fallback(serve_route)
            .with_state(Arc::clone(&inner));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture server");
        let addr = listener.local_addr().expect("fixture server local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Self { addr, inner }
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Serve `body` with status 200 at `path`.
    pub fn set_body(&self, path: &str, body: impl Into<String>) {
        self.lock()
            .routes
            .insert(path.to_string(), Route::Body(body.into()));
    }

    /// Serve a bare status code at `path`, e.g. 500 to simulate an outage.
    pub fn set_status(&self, path: &str, status: u16) {
        self.lock()
            .routes
            .insert(path.to_string(), Route::Status(status));
    }

    /// Number of requests `path` has received so far.
    pub fn hits(&self, path: &str) -> usize {
        self.lock().hits.get(path).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn serve_route(State(inner): State<Arc<Mutex<Inner>>>, uri: Uri) -> (StatusCode, String) {
    let path = uri.path().to_string();
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
    *inner.hits.entry(path.clone()).or_insert(0) += 1;
    match inner.routes.get(&path) {
        Some(Route::Body(body)) => (StatusCode::OK, body.clone()),
        Some(Route::Status(code)) => (
            StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            String::new(),
        ),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}
