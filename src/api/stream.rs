//! Data stream framing for chat replies
//!
//! One line per part, `<type>:<json>\n`:
//! - `0:` text fragment (JSON string)
//! - `3:` error message (JSON string)
//! - `d:` finish marker with the finish reason
//!
//! Every stream ends with exactly one `d:` line so clients never hang.

use crate::agent::ChunkStream;
use crate::llm::LlmError;
use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde_json::{json, Value};
use std::convert::Infallible;

pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";
pub const DATA_STREAM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub fn text_part(text: &str) -> String {
    format!("0:{}\n", Value::String(text.to_string()))
}

pub fn error_part(message: &str) -> String {
    format!("3:{}\n", Value::String(message.to_string()))
}

pub fn finish_part(reason: &str) -> String {
    format!("d:{}\n", json!({ "finishReason": reason }))
}

enum Phase {
    Streaming {
        pending: Option<Result<String, LlmError>>,
        chunks: ChunkStream,
    },
    Done,
}

/// Frame a completion as a streamed response.
///
/// `first` is an item already pulled from `chunks` (the handler peeks it to
/// decide the status code); it is emitted before the rest.
pub fn data_stream_response(
    first: Option<Result<String, LlmError>>,
    chunks: ChunkStream,
) -> Response {
    let start = Phase::Streaming {
        pending: first,
        chunks,
    };

    let frames = futures::stream::unfold(start, |phase| async move {
        let Phase::Streaming {
            pending,
            mut chunks,
        } = phase
        else {
            return None;
        };

        let item = match pending {
            Some(item) => Some(item),
            None => chunks.next().await,
        };

        match item {
            Some(Ok(text)) => Some((
                text_part(&text),
                Phase::Streaming {
                    pending: None,
                    chunks,
                },
            )),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Chat stream failed mid-reply");
                Some((
                    format!("{}{}", error_part(&e.message), finish_part("error")),
                    Phase::Done,
                ))
            }
            None => Some((finish_part("stop"), Phase::Done)),
        }
    });

    (
        [
            (header::CONTENT_TYPE, DATA_STREAM_CONTENT_TYPE),
            (header::HeaderName::from_static(DATA_STREAM_HEADER), "v1"),
        ],
        Body::from_stream(frames.map(Ok::<_, Infallible>)),
    )
        .into_response()
}

/// Extract the concatenated text of a framed body
#[cfg(test)]
pub fn collect_text(body: &str) -> String {
    body.lines()
        .filter_map(|line| line.strip_prefix("0:"))
        .filter_map(|json| serde_json::from_str::<String>(json).ok())
        .collect()
}
