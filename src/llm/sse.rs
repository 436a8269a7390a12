//! Server-Sent Events decoding
//!
//! Turns a byte stream into the sequence of `data:` payloads it carries.
//! Reading is lazy: bytes are only pulled from the transport when the next
//! payload is requested.

use super::LlmError;
use futures::Stream;
use std::io;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio_util::bytes::Buf;
use tokio_util::io::StreamReader;

/// Decode SSE `data:` payloads from `bytes`.
///
/// Multi-line data fields are joined with `\n`; `event:`, `id:`, `retry:` and
/// comment lines are ignored.
pub fn data_events<S, B>(bytes: S) -> impl Stream<Item = Result<String, LlmError>> + Send
where
    S: Stream<Item = Result<B, io::Error>> + Send + Unpin,
    B: Buf + Send,
{
    let lines = BufReader::new(StreamReader::new(bytes)).lines();
    futures::stream::unfold(Some(lines), next_payload)
}

async fn next_payload<S, B>(
    state: Option<Lines<BufReader<StreamReader<S, B>>>>,
) -> Option<(
    Result<String, LlmError>,
    Option<Lines<BufReader<StreamReader<S, B>>>>,
)>
where
    S: Stream<Item = Result<B, io::Error>> + Unpin,
    B: Buf,
{
    let mut lines = state?;
    let mut data = String::new();
    let mut has_data = false;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.is_empty() {
                    // Blank line terminates an event
                    if has_data {
                        return Some((Ok(data), Some(lines)));
                    }
                    continue;
                }
                if let Some(payload) = line.strip_prefix("data:") {
                    if has_data {
                        data.push('\n');
                    }
                    data.push_str(payload.strip_prefix(' ').unwrap_or(payload));
                    has_data = true;
                }
            }
            Ok(None) => {
                return has_data.then_some((Ok(data), None));
            }
            Err(e) => {
                return Some((Err(LlmError::network(format!("Stream read failed: {e}"))), None));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn decode(parts: Vec<&'static str>) -> Vec<Result<String, LlmError>> {
        let bytes = futures::stream::iter(
            parts
                .into_iter()
                .map(|p| Ok::<_, io::Error>(p.as_bytes())),
        );
        data_events(bytes).collect().await
    }

    #[tokio::test]
    async fn test_single_events() {
        let events = decode(vec!["data: one\n\ndata: two\n\n"]).await;
        let payloads: Vec<_> = events.into_iter().map(Result::unwrap).collect();
        assert_eq!(payloads, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_event_split_across_chunks() {
        let events = decode(vec!["da", "ta: {\"a\":", "1}\n", "\n"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_multiline_data_and_ignored_fields() {
        let events = decode(vec![": keepalive\nevent: delta\ndata: a\ndata: b\nid: 7\n\n"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), "a\nb");
    }

    #[tokio::test]
    async fn test_trailing_event_without_blank_line() {
        let events = decode(vec!["data: [DONE]"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), "[DONE]");
    }

    #[tokio::test]
    async fn test_read_error_surfaces() {
        let bytes = futures::stream::iter(vec![
            Ok("data: ok\n\n".as_bytes()),
            Err(io::Error::other("connection reset")),
        ]);
        let events: Vec<_> = data_events(bytes).collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap(), "ok");
        let err = events[1].as_ref().unwrap_err();
        assert!(err.message.contains("connection reset"));
    }
}
