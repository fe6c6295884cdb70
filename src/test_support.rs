/// Helpers shared by unit tests: a canned local HTTP server and a baseline config
use std::sync::Arc;

use axum::http::{StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;

pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Serve HTTP on an ephemeral local port, answering every request with
/// `handler(path_and_query)`. Returns the base URL.
pub async fn serve<F>(handler: F) -> String
where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
{
    let handler = Arc::new(handler);
    let app = Router::new().fallback(move |uri: Uri| {
        let handler = Arc::clone(&handler);
        async move {
            let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
            let reply = handler(target);
            let status = StatusCode::from_u16(reply.status).unwrap();
            (status, reply.body)
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Test server stopped: {}", e);
        }
    });

    format!("http://{}", addr)
}

/// Client that never routes through a proxy picked up from the environment
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "OPENWEATHER_API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
    .unwrap()
}
