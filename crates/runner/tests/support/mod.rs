//! Fixture HTTP server shared by the integration tests

use axum::{http::StatusCode, response::Html, routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::oneshot;

/// The single page every fixture spec is written against
pub const PAGE: &str = "<!DOCTYPE html>\n\
<html>\n\
<head>\n\
</head>\n\
<body>\n\
<p id=\"p1\" style=\"width:400px;float:left;\">First paragraph.</p>\n\
<p id=\"p2\">Second paragraph.</p>\n\
</body>\n\
</html>";

/// Serves [`PAGE`] on every path except `/broken`, which answers 500
pub struct FixtureServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FixtureServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture server");
        let addr = listener.local_addr().expect("fixture server address");

        let app = Router::new()
            .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .fallback(|| async { Html(PAGE) });

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .expect("fixture server");
        });

        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
