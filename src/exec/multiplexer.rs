// src/exec/multiplexer.rs

//! Concurrent draining of the child's stdout and stderr.
//!
//! Each pipe gets its own Tokio task. A reader forwards every non-empty read
//! as one [`OutputChunk`] into the shared channel, so neither pipe can fill up
//! and block the child while we are busy with the other one.
//!
//! Readers follow a shared [`Phase`]:
//! - `Running`: read whatever is ready.
//! - `Exited`: do one final drain (until EOF, or until the pipe stays idle
//!   for the drain timeout) and close the pipe.
//! - `Cancelled`: stop at once, even in the middle of a send.
//!
//! The stderr reader also keeps every byte it delivered and hands the buffer
//! back through its `JoinHandle`.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::stream::{Origin, OutputChunk, StreamItem};

/// Lifecycle phase broadcast from the engine to the readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Exited,
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct ReaderConfig {
    pub buffer_size: usize,
    pub drain_timeout: Duration,
}

/// Spawn the reader task for one pipe.
///
/// The returned handle resolves to the accumulated bytes when `accumulate` is
/// set, and to an empty buffer otherwise.
pub fn spawn_reader<R>(
    origin: Origin,
    pipe: R,
    tx: mpsc::Sender<StreamItem>,
    phase: watch::Receiver<Phase>,
    config: ReaderConfig,
    accumulate: bool,
) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = PipeReader {
            origin,
            pipe,
            tx,
            phase,
            buf: vec![0u8; config.buffer_size.max(1)],
            accumulated: Vec::new(),
            accumulate,
        };

        debug!(origin = origin.as_str(), "pipe reader started");
        reader.run(config.drain_timeout).await;
        debug!(
            origin = origin.as_str(),
            accumulated = reader.accumulated.len(),
            "pipe reader finished"
        );

        reader.accumulated
    })
}

struct PipeReader<R> {
    origin: Origin,
    pipe: R,
    tx: mpsc::Sender<StreamItem>,
    phase: watch::Receiver<Phase>,
    buf: Vec<u8>,
    accumulated: Vec<u8>,
    accumulate: bool,
}

impl<R> PipeReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn run(&mut self, drain_timeout: Duration) {
        loop {
            let current = *self.phase.borrow_and_update();
            match current {
                Phase::Cancelled => return,
                Phase::Exited => {
                    self.final_drain(drain_timeout).await;
                    return;
                }
                Phase::Running => {}
            }

            tokio::select! {
                biased;

                changed = self.phase.changed() => {
                    if changed.is_err() {
                        // Engine went away without a verdict; close like an exit.
                        self.final_drain(drain_timeout).await;
                        return;
                    }
                }

                read = self.pipe.read(&mut self.buf) => {
                    match read {
                        Ok(0) => return,
                        Ok(n) => {
                            if !self.emit(n).await {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(origin = self.origin.as_str(), error = %e, "pipe read failed");
                            return;
                        }
                    }
                }
            }
        }
    }

    async fn final_drain(&mut self, drain_timeout: Duration) {
        loop {
            match timeout(drain_timeout, self.pipe.read(&mut self.buf)).await {
                Ok(Ok(0)) => return,
                Ok(Ok(n)) => {
                    if !self.emit(n).await {
                        return;
                    }
                }
                Ok(Err(e)) => {
                    warn!(origin = self.origin.as_str(), error = %e, "pipe read failed during drain");
                    return;
                }
                Err(_) => {
                    debug!(
                        origin = self.origin.as_str(),
                        "pipe still open after exit; closing"
                    );
                    return;
                }
            }
        }
    }

    /// Forward `buf[..n]`. Returns false when the reader should stop.
    async fn emit(&mut self, n: usize) -> bool {
        let Some(chunk) = OutputChunk::new(self.origin, self.buf[..n].to_vec()) else {
            return true;
        };

        let sent = tokio::select! {
            biased;

            _ = wait_cancelled(&mut self.phase) => false,
            res = self.tx.send(Ok(chunk)) => res.is_ok(),
        };

        if sent && self.accumulate {
            self.accumulated.extend_from_slice(&self.buf[..n]);
        }
        sent
    }
}

async fn wait_cancelled(phase: &mut watch::Receiver<Phase>) {
    let closed = phase.wait_for(|p| *p == Phase::Cancelled).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
