use chat_ox_common::BoxStream;
use futures_util::StreamExt;

use crate::{ChatCompletionChunk, ChatError, Usage};

/// Pull-style view over a streamed completion.
///
/// `next` advances and reports whether a chunk is available, `current`
/// returns that chunk, and once `next` returns `false` `err` tells a clean
/// end of stream apart from a failure.
///
/// ```rust,no_run
/// # async fn demo(client: chat_ox::ChatClient, request: chat_ox::ChatRequest) -> Result<(), chat_ox::ChatError> {
/// let mut stream = client.chat_stream(&request);
/// while stream.next().await {
///     if let Some(text) = stream.current().and_then(|c| c.delta_content()) {
///         print!("{text}");
///     }
/// }
/// stream.into_result()
/// # }
/// ```
pub struct ChatStream {
    inner: BoxStream<'static, Result<ChatCompletionChunk, ChatError>>,
    current: Option<ChatCompletionChunk>,
    usage: Option<Usage>,
    error: Option<ChatError>,
    finished: bool,
}

impl ChatStream {
    pub fn new(inner: BoxStream<'static, Result<ChatCompletionChunk, ChatError>>) -> Self {
        Self {
            inner,
            current: None,
            usage: None,
            error: None,
            finished: false,
        }
    }

    /// Advance to the next chunk. Returns `false` at end of stream or on error.
    pub async fn next(&mut self) -> bool {
        if self.finished {
            return false;
        }

        match self.inner.next().await {
            Some(Ok(chunk)) => {
                if let Some(usage) = &chunk.usage {
                    self.usage = Some(usage.clone());
                }
                self.current = Some(chunk);
                true
            }
            Some(Err(err)) => {
                tracing::debug!(error = %err, "chat stream terminated with error");
                self.current = None;
                self.error = Some(err);
                self.finished = true;
                false
            }
            None => {
                self.current = None;
                self.finished = true;
                false
            }
        }
    }

    /// The chunk most recently advanced to
    pub fn current(&self) -> Option<&ChatCompletionChunk> {
        self.current.as_ref()
    }

    /// The error that ended the stream, if it did not end cleanly
    pub fn err(&self) -> Option<&ChatError> {
        self.error.as_ref()
    }

    /// Token usage from the trailing usage chunk, when the provider sent one
    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume the stream, surfacing the terminal error if there was one
    pub fn into_result(self) -> Result<(), ChatError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream")
            .field("current", &self.current)
            .field("error", &self.error)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
