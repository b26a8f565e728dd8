// src/stream/mod.rs

//! Consumer-facing side of an execution.
//!
//! An [`OutputStream`] is a lazy, non-restartable sequence of
//! [`OutputChunk`]s. Chunks are produced independently by the pipe readers;
//! polling the stream only takes what is already queued. The stream ends with
//! `None` after a clean exit, or yields exactly one `Err(ExecError)` and then
//! `None` forever.
//!
//! Dropping the stream before it finished cancels the execution.

pub mod chunk;
pub mod decode;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{FusedStream, Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::errors::ExecError;

pub use chunk::{Origin, OutputChunk};
pub use decode::Utf8Decoder;

/// Item type flowing from the engine to the consumer.
pub type StreamItem = Result<OutputChunk, ExecError>;

/// Stdout and stderr bytes of a finished execution, kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub struct OutputStream {
    rx: mpsc::Receiver<StreamItem>,
    /// Dropping or firing this sender is what cancels the execution.
    cancel: Option<oneshot::Sender<()>>,
    finished: bool,
}

impl OutputStream {
    pub(crate) fn new(rx: mpsc::Receiver<StreamItem>, cancel: oneshot::Sender<()>) -> Self {
        Self {
            rx,
            cancel: Some(cancel),
            finished: false,
        }
    }

    /// Ask the engine to terminate the process.
    ///
    /// Idempotent. Chunks queued before the request are still yielded; the
    /// stream then ends with `ExecError::Cancelled` unless the process had
    /// already finished on its own.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            if cancel.send(()).is_err() {
                debug!("cancel requested after execution already finished");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Reduce the stream to text.
    ///
    /// Bytes are decoded as UTF-8 on a best-effort basis (see
    /// [`Utf8Decoder`]). With `include_stderr` the stderr chunks are
    /// interleaved in arrival order; otherwise they are skipped.
    pub async fn collect_output(mut self, include_stderr: bool) -> Result<String, ExecError> {
        let mut out = String::new();
        let mut stdout_decoder = Utf8Decoder::new();
        let mut stderr_decoder = Utf8Decoder::new();

        while let Some(item) = self.next().await {
            let chunk = item?;
            match chunk.origin() {
                Origin::Stdout => stdout_decoder.decode_into(chunk.bytes(), &mut out),
                Origin::Stderr if include_stderr => {
                    stderr_decoder.decode_into(chunk.bytes(), &mut out)
                }
                Origin::Stderr => {}
            }
        }

        stdout_decoder.finish();
        stderr_decoder.finish();
        Ok(out)
    }

    /// Reduce the stream to raw bytes, one buffer per origin.
    pub async fn collect_bytes(mut self) -> Result<CollectedOutput, ExecError> {
        let mut collected = CollectedOutput::default();

        while let Some(item) = self.next().await {
            let chunk = item?;
            match chunk.origin() {
                Origin::Stdout => collected.stdout.extend_from_slice(chunk.bytes()),
                Origin::Stderr => collected.stderr.extend_from_slice(chunk.bytes()),
            }
        }

        Ok(collected)
    }
}

impl Stream for OutputStream {
    type Item = StreamItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(err))) => {
                self.finished = true;
                self.rx.close();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedStream for OutputStream {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(origin: Origin, bytes: &[u8]) -> StreamItem {
        Ok(OutputChunk::new(origin, bytes.to_vec()).expect("non-empty"))
    }

    fn stream_of(items: Vec<StreamItem>) -> (OutputStream, oneshot::Receiver<()>) {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            tx.try_send(item).expect("capacity");
        }
        drop(tx);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        (OutputStream::new(rx, cancel_tx), cancel_rx)
    }

    #[tokio::test]
    async fn collect_output_filters_stderr() {
        let items = vec![
            chunk(Origin::Stdout, b"out\n"),
            chunk(Origin::Stderr, b"err\n"),
        ];
        let (stream, _cancel) = stream_of(items.clone());
        assert_eq!(stream.collect_output(false).await, Ok("out\n".to_string()));

        let (stream, _cancel) = stream_of(items);
        assert_eq!(stream.collect_output(true).await, Ok("out\nerr\n".to_string()));
    }

    #[tokio::test]
    async fn error_is_terminal() {
        let items = vec![
            chunk(Origin::Stdout, b"partial"),
            Err(ExecError::Signaled(9)),
        ];
        let (mut stream, _cancel) = stream_of(items);

        assert!(matches!(stream.next().await, Some(Ok(_))));
        assert_eq!(stream.next().await, Some(Err(ExecError::Signaled(9))));
        assert!(stream.is_terminated());
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn collect_bytes_keeps_origins_apart() {
        let items = vec![
            chunk(Origin::Stderr, b"e1"),
            chunk(Origin::Stdout, b"o1"),
            chunk(Origin::Stderr, b"e2"),
        ];
        let (stream, _cancel) = stream_of(items);
        let collected = stream.collect_bytes().await.expect("clean end");
        assert_eq!(collected.stdout, b"o1".to_vec());
        assert_eq!(collected.stderr, b"e1e2".to_vec());
    }

    #[tokio::test]
    async fn dropping_unfinished_stream_fires_cancel() {
        let (tx, rx) = mpsc::channel::<StreamItem>(1);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let stream = OutputStream::new(rx, cancel_tx);

        drop(stream);
        drop(tx);
        assert!(cancel_rx.await.is_ok());
    }

    #[tokio::test]
    async fn explicit_cancel_is_idempotent() {
        let (_tx, rx) = mpsc::channel::<StreamItem>(1);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let mut stream = OutputStream::new(rx, cancel_tx);

        stream.cancel();
        stream.cancel();
        assert!(cancel_rx.await.is_ok());
    }
}
