use crate::error::CommonRequestError;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::pin::Pin;

/// Terminator some providers send instead of closing the connection
const DONE_MARKER: &str = "[DONE]";

/// Raw response body as it arrives off the wire
type ByteStream = Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>;

/// Server-Sent Events parser for streaming responses
pub struct SseParser {
    /// Source of body chunks
    byte_stream: ByteStream,
    /// Bytes received but not yet split into lines
    buffer: Vec<u8>,
    /// `data:` payloads of the event being assembled
    data_lines: Vec<String>,
    /// Set once `[DONE]` arrives or the body ends
    done: bool,
}

impl SseParser {
    pub fn new(response: reqwest::Response) -> Self {
        Self::from_stream(response.bytes_stream())
    }

    /// Build a parser over any byte stream, e.g. a canned body in tests.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
    {
        Self {
            byte_stream: Box::pin(stream),
            buffer: Vec::new(),
            data_lines: Vec::new(),
            done: false,
        }
    }

    /// Get the next parsed event from the stream
    ///
    /// Returns `Ok(None)` once the body is exhausted or `[DONE]` was seen.
    pub async fn next_event<T: DeserializeOwned>(&mut self) -> Result<Option<T>, CommonRequestError> {
        if self.done {
            return Ok(None);
        }

        loop {
            if let Some(event) = self.try_parse_event_from_buffer::<T>()? {
                return Ok(Some(event));
            }
            if self.done {
                return Ok(None);
            }

            if let Some(chunk_result) = self.byte_stream.next().await {
                let chunk = chunk_result?;
                self.buffer.extend_from_slice(&chunk);
            } else {
                self.done = true;
                return self.try_parse_final_event::<T>();
            }
        }
    }

    /// Try to parse an event from the current buffer
    fn try_parse_event_from_buffer<T: DeserializeOwned>(
        &mut self,
    ) -> Result<Option<T>, CommonRequestError> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes = self.buffer.drain(..=pos).collect::<Vec<u8>>();
            let line = String::from_utf8(line_bytes)?;

            if let Some(event) = self.process_line::<T>(&line)? {
                return Ok(Some(event));
            }
            if self.done {
                return Ok(None);
            }
        }

        Ok(None)
    }

    /// Flush whatever is left once the byte stream has ended
    fn try_parse_final_event<T: DeserializeOwned>(
        &mut self,
    ) -> Result<Option<T>, CommonRequestError> {
        if !self.buffer.is_empty() {
            let line = String::from_utf8(std::mem::take(&mut self.buffer))?;
            if let Some(event) = self.process_line::<T>(&line)? {
                return Ok(Some(event));
            }
        }

        finalize_data_lines(&mut self.data_lines)
    }

    /// Feed one line into the current event, returning it when a blank line completes it
    fn process_line<T: DeserializeOwned>(
        &mut self,
        line: &str,
    ) -> Result<Option<T>, CommonRequestError> {
        let line = line.trim_end_matches(['\n', '\r']);

        if line.is_empty() {
            return finalize_data_lines(&mut self.data_lines);
        }

        if line.starts_with(':') {
            return Ok(None);
        }

        if let Some(rest) = line.strip_prefix("data:") {
            let data = rest.strip_prefix(' ').unwrap_or(rest);

            if data == DONE_MARKER {
                self.data_lines.clear();
                self.done = true;
                return Ok(None);
            }

            self.data_lines.push(data.to_string());
        }

        // event:, id: and retry: carry nothing we need
        Ok(None)
    }
}

/// Parse every SSE event in a complete chunk of text
pub fn parse_sse_events<T: DeserializeOwned>(chunk: &str) -> Result<Vec<T>, CommonRequestError> {
    let mut events = Vec::new();
    let mut data_lines = Vec::new();

    for line in chunk.lines() {
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            if let Some(event) = finalize_data_lines::<T>(&mut data_lines)? {
                events.push(event);
            }
            continue;
        }

        if line.starts_with(':') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("data:") {
            let data = rest.strip_prefix(' ').unwrap_or(rest);

            if data == DONE_MARKER {
                data_lines.clear();
                break;
            }

            data_lines.push(data.to_string());
        }
    }

    if let Some(event) = finalize_data_lines::<T>(&mut data_lines)? {
        events.push(event);
    }

    Ok(events)
}

/// Join the collected `data:` lines and decode them as one event
fn finalize_data_lines<T: DeserializeOwned>(
    data_lines: &mut Vec<String>,
) -> Result<Option<T>, CommonRequestError> {
    if data_lines.is_empty() {
        return Ok(None);
    }

    let payload = data_lines.join("\n");
    data_lines.clear();

    if payload.trim().is_empty() {
        return Ok(None);
    }

    tracing::trace!(payload = %payload, "sse event");

    let event: T = serde_json::from_str(&payload)
        .map_err(|e| CommonRequestError::InvalidEventData(format!("JSON parse error: {e}; payload: {payload}")))?;

    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde_json::Value;

    fn parser_over(parts: &[&'static str]) -> SseParser {
        let chunks: Vec<Result<bytes::Bytes, reqwest::Error>> = parts
            .iter()
            .map(|p| Ok(bytes::Bytes::from_static(p.as_bytes())))
            .collect();
        SseParser::from_stream(stream::iter(chunks))
    }

    #[test]
    fn test_parse_sse_events_empty() {
        let events: Vec<Value> = parse_sse_events("").unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_parse_sse_events_done_message() {
        let events: Vec<Value> = parse_sse_events("data: [DONE]\n\n").unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_parse_sse_events_valid_json() {
        let events: Vec<Value> = parse_sse_events("data: {\"test\": \"value\"}\n\n").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["test"], "value");
    }

    #[test]
    fn test_parse_sse_events_skips_comments_and_fields() {
        let sse = ": keep-alive\nevent: message\nid: 7\ndata: {\"n\": 1}\n\ndata: {\"n\": 2}\n\n";
        let events: Vec<Value> = parse_sse_events(sse).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["n"], 2);
    }

    #[test]
    fn test_parse_sse_events_joins_multiline_data() {
        let sse = "data: {\"a\":\ndata: 1}\n\n";
        let events: Vec<Value> = parse_sse_events(sse).unwrap();
        assert_eq!(events[0]["a"], 1);
    }

    #[test]
    fn test_parse_sse_events_invalid_json() {
        let result: Result<Vec<Value>, _> = parse_sse_events("data: {invalid json}\n\n");
        assert!(matches!(result, Err(CommonRequestError::InvalidEventData(_))));
    }

    #[tokio::test]
    async fn parser_handles_events_split_across_chunks() {
        let mut parser = parser_over(&["data: {\"te", "xt\": \"Old\"}\n", "\ndata: {\"text\": \" pond\"}\n\n"]);

        let first: Value = parser.next_event().await.unwrap().unwrap();
        let second: Value = parser.next_event().await.unwrap().unwrap();
        assert_eq!(first["text"], "Old");
        assert_eq!(second["text"], " pond");
        assert!(parser.next_event::<Value>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn parser_stops_at_done_marker() {
        let mut parser = parser_over(&["data: {\"n\": 1}\n\ndata: [DONE]\n\ndata: {\"n\": 2}\n\n"]);

        let first: Value = parser.next_event().await.unwrap().unwrap();
        assert_eq!(first["n"], 1);
        assert!(parser.next_event::<Value>().await.unwrap().is_none());
        assert!(parser.next_event::<Value>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn parser_flushes_unterminated_final_event() {
        let mut parser = parser_over(&["data: {\"n\": 3}"]);

        let event: Value = parser.next_event().await.unwrap().unwrap();
        assert_eq!(event["n"], 3);
        assert!(parser.next_event::<Value>().await.unwrap().is_none());
    }
}
