use chat_ox::{ChatClient, ChatRequest};
use std::io::Write;

use crate::{Cli, RunError};

/// Send `request` and print the first choice's text on its own line.
///
/// A response without choices is an error rather than an empty line.
pub async fn print_completion<W: Write>(
    client: &ChatClient,
    request: &ChatRequest,
    out: &mut W,
) -> Result<(), RunError> {
    let response = client.send(request).await.map_err(RunError::Completion)?;
    let text = response.first_text().map_err(RunError::Completion)?;

    writeln!(out, "{text}")?;
    Ok(())
}

/// Stream `request`, writing each fragment as soon as it arrives.
///
/// Nothing is appended after the last fragment. Chunks without a choice
/// (keep-alives, the trailing usage chunk) are skipped.
pub async fn print_stream<W: Write>(
    client: &ChatClient,
    request: &ChatRequest,
    out: &mut W,
) -> Result<(), RunError> {
    let mut stream = client.chat_stream(request);

    while stream.next().await {
        let Some(fragment) = stream.current().and_then(|chunk| chunk.delta_content()) else {
            continue;
        };
        write!(out, "{fragment}")?;
        out.flush()?;
    }

    if let Some(usage) = stream.usage() {
        tracing::debug!(total_tokens = usage.total_tokens(), "stream usage");
    }

    stream.into_result().map_err(RunError::Stream)
}

pub fn greeting(name: &str) -> String {
    format!("Hello, {name}")
}

pub fn print_greeting<W: Write>(name: &str, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", greeting(name))
}

/// Run every step in order, stopping at the first failure.
pub async fn run<W: Write>(client: &ChatClient, cli: &Cli, out: &mut W) -> Result<(), RunError> {
    tracing::info!(model = %cli.model, base_url = client.base_url(), "starting run");

    print_completion(client, &cli.completion_request(), out).await?;
    print_stream(client, &cli.stream_request(), out).await?;

    // streamed text has no trailing newline
    writeln!(out)?;
    print_greeting(&cli.name, out)?;

    Ok(())
}
