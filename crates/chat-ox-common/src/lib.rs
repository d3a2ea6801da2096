#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(clippy::unwrap_used, clippy::missing_docs_in_private_items)]

//! Shared HTTP plumbing for the chat-ox completion client
//!
//! Request construction, authentication, SSE decoding and the error type
//! every endpoint call reports through.

pub mod error;
pub mod request_builder;
pub mod streaming;
pub mod timestamp;
pub mod usage;

pub use error::CommonRequestError;
pub use request_builder::{AuthMethod, Endpoint, HttpMethod, RequestBuilder, RequestConfig};
pub use streaming::SseParser;
pub use timestamp::Timestamp;
pub use usage::TokenUsage;

pub use futures_util::stream::BoxStream;
