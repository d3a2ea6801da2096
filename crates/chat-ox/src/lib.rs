//! OpenAI-compatible chat completion client for Rust
//!
//! This crate covers the chat completions endpoint:
//! - Blocking request/response exchanges
//! - Streaming exchanges, either as a `Stream` or through the pull-style [`ChatStream`]
//! - Typed errors decoded from provider error payloads
//!
//! # Example
//!
//! ```rust,no_run
//! use chat_ox::{ChatClient, Model};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ChatClient::from_env()?;
//!
//!     let request = client
//!         .chat()
//!         .model(Model::Gpt5_2)
//!         .user_message("Say this is a test")
//!         .build();
//!
//!     let response = client.send(&request).await?;
//!     println!("{}", response.first_text()?);
//!
//!     let mut stream = client.chat_stream(&request);
//!     while stream.next().await {
//!         if let Some(text) = stream.current().and_then(|chunk| chunk.delta_content()) {
//!             print!("{text}");
//!         }
//!     }
//!     stream.into_result()?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
mod internal;
pub mod message;
pub mod model;
pub mod request;
pub mod response;
pub mod stream;

pub use client::ChatClient;
pub use error::ChatError;
pub use message::{Message, Role};
pub use model::Model;
pub use request::{ChatRequest, ChatRequestBuilder, StreamOptions};
pub use response::{ChatCompletionChunk, ChatResponse, Choice, ChunkChoice, MessageDelta};
pub use stream::ChatStream;

pub use chat_ox_common::{Timestamp, TokenUsage as Usage};
