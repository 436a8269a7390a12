//! Pull-based completion streams
//!
//! A completion is produced by a background task and consumed through a
//! bounded channel: the producer waits whenever `CHUNK_BUFFER` fragments are
//! queued and unread. Dropping the consumer cancels the producer.

use crate::llm::LlmError;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Fragments the producer may run ahead of the consumer
pub const CHUNK_BUFFER: usize = 8;

enum Frame {
    Chunk(String),
    Done,
    Failed(LlmError),
}

/// Create a connected producer/consumer pair
pub fn channel() -> (ChunkSender, CompletionStream) {
    let (tx, rx) = mpsc::channel(CHUNK_BUFFER);
    let cancel = CancellationToken::new();
    let sender = ChunkSender {
        tx,
        cancel: cancel.clone(),
    };
    let stream = CompletionStream {
        rx,
        collected: String::new(),
        sink: None,
        finished: false,
        _cancel_on_drop: cancel.drop_guard(),
    };
    (sender, stream)
}

/// Producer half of a completion
pub struct ChunkSender {
    tx: mpsc::Sender<Frame>,
    cancel: CancellationToken,
}

impl ChunkSender {
    /// Queue a fragment, waiting while the buffer is full.
    ///
    /// Fails with `Cancelled` once the consumer is gone.
    pub async fn send(&self, chunk: String) -> Result<(), LlmError> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.tx
            .send(Frame::Chunk(chunk))
            .await
            .map_err(|_| LlmError::cancelled())
    }

    /// Terminate the sequence, successfully or with an error
    pub async fn close(&self, result: Result<(), LlmError>) {
        let frame = match result {
            Ok(()) => Frame::Done,
            Err(e) => Frame::Failed(e),
        };
        // Consumer may already be gone
        let _ = self.tx.send(frame).await;
    }

    /// Token cancelled when the consumer drops its stream
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Consumer half of a completion.
///
/// Iterate it as a `Stream` for progressive consumption, or call
/// [`CompletionStream::text`] to wait for the whole response.
pub struct CompletionStream {
    rx: mpsc::Receiver<Frame>,
    collected: String,
    sink: Option<Box<dyn FnMut(&str) + Send>>,
    finished: bool,
    _cancel_on_drop: DropGuard,
}

impl CompletionStream {
    /// Mirror each fragment into `sink` as it is consumed.
    ///
    /// Consumers still receive every fragment unchanged.
    pub fn mirror(mut self, sink: impl FnMut(&str) + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Drain the remaining fragments and return the full response text,
    /// including fragments already pulled progressively.
    pub async fn text(mut self) -> Result<String, LlmError> {
        use futures::StreamExt;
        while let Some(item) = self.next().await {
            item?;
        }
        Ok(std::mem::take(&mut self.collected))
    }

    /// Consume the same completion both ways at once.
    ///
    /// The returned `FullResponse` resolves after the `ChunkStream` has been
    /// drained, to the concatenation of everything it yielded.
    pub fn split(self) -> (ChunkStream, FullResponse) {
        let (tx, rx) = oneshot::channel();
        (
            ChunkStream {
                inner: self,
                full: Some(tx),
            },
            FullResponse { rx },
        )
    }
}

impl Stream for CompletionStream {
    type Item = Result<String, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        let frame = ready!(this.rx.poll_recv(cx));
        match frame {
            Some(Frame::Chunk(chunk)) => {
                if let Some(sink) = this.sink.as_mut() {
                    sink(&chunk);
                }
                this.collected.push_str(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Frame::Done) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Some(Frame::Failed(e)) => {
                this.finished = true;
                Poll::Ready(Some(Err(e)))
            }
            None => {
                // Producer vanished without closing (e.g. panicked)
                this.finished = true;
                Poll::Ready(Some(Err(LlmError::stream(
                    "Completion ended without a terminal frame",
                ))))
            }
        }
    }
}

/// Progressive half of a split completion
pub struct ChunkStream {
    inner: CompletionStream,
    full: Option<oneshot::Sender<Result<String, LlmError>>>,
}

impl Stream for ChunkStream {
    type Item = Result<String, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let item = ready!(Pin::new(&mut this.inner).poll_next(cx));
        match &item {
            None => {
                if let Some(full) = this.full.take() {
                    let _ = full.send(Ok(this.inner.collected.clone()));
                }
            }
            Some(Err(e)) => {
                if let Some(full) = this.full.take() {
                    let _ = full.send(Err(e.clone()));
                }
            }
            Some(Ok(_)) => {}
        }
        Poll::Ready(item)
    }
}

impl Drop for ChunkStream {
    fn drop(&mut self) {
        if let Some(full) = self.full.take() {
            let _ = full.send(Err(LlmError::cancelled()));
        }
    }
}

/// Buffered half of a split completion
pub struct FullResponse {
    rx: oneshot::Receiver<Result<String, LlmError>>,
}

impl Future for FullResponse {
    type Output = Result<String, LlmError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let result = ready!(Pin::new(&mut self.rx).poll(cx));
        Poll::Ready(result.unwrap_or_else(|_| Err(LlmError::cancelled())))
    }
}
