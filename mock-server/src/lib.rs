use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Body served by `GET /hello`.
pub const HELLO_BODY: &str = "HELLO WORLD";

/// JSON document served by `GET /json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
    pub count: u32,
}

/// Address the binary listens on when `MOCK_SERVER_ADDR` is unset.
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Every fixture route as `(method, path)`.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/hello"),
    ("GET", "/json"),
    ("POST", "/echo"),
    ("GET", "/headers"),
    ("GET", "/redirect"),
    ("GET", "/slow/{ms}"),
    ("GET", "/status/{code}"),
];

pub fn app() -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/json", get(json))
        .route("/echo", post(echo))
        .route("/headers", get(headers))
        .route("/redirect", get(redirect))
        .route("/slow/{ms}", get(slow))
        .route("/status/{code}", get(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn hello() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], HELLO_BODY)
}

async fn json() -> Json<Greeting> {
    Json(Greeting {
        message: "hello".to_string(),
        count: 1,
    })
}

async fn echo(body: Bytes) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], body)
}

/// Received headers as `[name, value]` pairs, in arrival order.
async fn headers(headers: HeaderMap) -> Json<Vec<(String, String)>> {
    let pairs = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(pairs)
}

async fn redirect() -> Redirect {
    Redirect::to("/hello")
}

async fn slow(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "ok"
}

async fn status(Path(code): Path<u16>) -> Result<StatusCode, StatusCode> {
    StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)
}
