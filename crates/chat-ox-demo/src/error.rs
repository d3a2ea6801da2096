use chat_ox::ChatError;
use thiserror::Error;

/// Why a run stopped early
#[derive(Debug, Error)]
pub enum RunError {
    #[error("completion request failed")]
    Completion(#[source] ChatError),

    #[error("streaming request failed")]
    Stream(#[source] ChatError),

    #[error("failed to write output")]
    Io(#[from] std::io::Error),
}
