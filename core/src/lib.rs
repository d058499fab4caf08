//! Pre-configured HTTP request building and dispatch.
//!
//! # Overview
//! `HttpApi` produces ready-to-send `HttpRequest` descriptors for a few
//! common shapes (JSON GET, plain-text GET, binary POST, empty POST), each
//! carrying the same default identity headers and timeout, and hands them to
//! a `ureq::Agent` for blocking or deferred execution.
//!
//! # Design
//! - Descriptors are immutable values; building and sending are separate
//!   steps so a request can be inspected before it goes out.
//! - `send_blocking` / `send_async` log failures and return `None`;
//!   `try_send_blocking` / `try_send_async` return the `HttpApiError`.
//! - All concurrency belongs to the agent and the tokio runtime; `HttpApi`
//!   itself holds no mutable state and is cheap to clone.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;

pub use client::{HttpApi, PendingResponse, Target};
pub use config::HttpApiConfig;
pub use error::{HttpApiError, TargetError};
pub use http::{AsBytes, AsText, BodyDecoder, Discarding, HttpMethod, HttpRequest, HttpResponse};
pub use query::map_to_url_encoded_parameters;
