use chat_ox_common::CommonRequestError;
use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

/// Errors that can occur when making chat completion requests
#[derive(Debug, Error)]
pub enum ChatError {
    /// Transport, decoding or provider-reported failure
    #[error(transparent)]
    Request(#[from] CommonRequestError),

    /// No API key was configured
    #[error("Missing API key: set OPENAI_API_KEY or pass a key explicitly")]
    MissingApiKey,

    /// The response carried no choices to read
    #[error("Response contained no choices")]
    EmptyChoices,
}

impl ChatError {
    /// HTTP status reported by the provider, if the failure came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Request(e) => e.status(),
            _ => None,
        }
    }
}

impl Serialize for ChatError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ChatError::Request(CommonRequestError::Api {
                status,
                message,
                r#type,
                code,
            }) => {
                let mut state = serializer.serialize_struct("ChatError", 5)?;
                state.serialize_field("type", "ApiError")?;
                state.serialize_field("status", status)?;
                state.serialize_field("message", message)?;
                state.serialize_field("error_type", r#type)?;
                state.serialize_field("code", code)?;
                state.end()
            }
            ChatError::Request(e) => {
                let mut state = serializer.serialize_struct("ChatError", 2)?;
                state.serialize_field("type", "RequestError")?;
                state.serialize_field("error", &e.to_string())?;
                state.end()
            }
            ChatError::MissingApiKey => {
                let mut state = serializer.serialize_struct("ChatError", 1)?;
                state.serialize_field("type", "MissingApiKey")?;
                state.end()
            }
            ChatError::EmptyChoices => {
                let mut state = serializer.serialize_struct("ChatError", 1)?;
                state.serialize_field("type", "EmptyChoices")?;
                state.end()
            }
        }
    }
}
