//! In-process fake server helpers for unit tests.

use crate::client::HttpClient;
use crate::session::Session;
use pharm_core::ClientConfig;
use std::path::PathBuf;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(crate) async fn spawn(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

pub(crate) fn test_config(base: &str) -> ClientConfig {
    ClientConfig::new(base, PathBuf::from("unused-session.json"), PathBuf::from("."))
        .expect("valid test config")
}

pub(crate) fn test_client(base: &str, session: Session) -> HttpClient {
    HttpClient::new(&test_config(base), session).expect("client builds")
}
