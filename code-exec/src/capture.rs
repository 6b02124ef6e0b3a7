//! Output Capture & Truncation.
//!
//! Each child stream is drained by its own task for as long as the pipe is
//! open. Bytes past the ceiling are read and dropped so the child never
//! blocks on a full pipe.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Bytes kept from one stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

impl Captured {
    fn push(&mut self, chunk: &[u8], cap: usize) {
        if self.truncated {
            return;
        }
        let remaining = cap.saturating_sub(self.bytes.len());
        if chunk.len() <= remaining {
            self.bytes.extend_from_slice(chunk);
        } else {
            self.bytes.extend_from_slice(&chunk[..remaining]);
            self.truncated = true;
        }
    }
}

/// A stream being drained in the background
pub struct StreamCapture {
    name: &'static str,
    buffer: Arc<Mutex<Captured>>,
    handle: JoinHandle<()>,
}

impl StreamCapture {
    pub fn spawn<R>(name: &'static str, reader: Option<R>, cap: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Captured::default()));
        let sink = buffer.clone();

        let handle = tokio::spawn(async move {
            let Some(mut reader) = reader else {
                return;
            };
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut captured) = sink.lock() {
                            captured.push(&chunk[..n], cap);
                        }
                    }
                    Err(e) => {
                        warn!("Error reading child {}: {}", name, e);
                        break;
                    }
                }
            }
        });

        Self {
            name,
            buffer,
            handle,
        }
    }

    /// Wait up to `grace` for the stream to reach EOF, then return whatever
    /// was captured. A descendant that escaped the kill can hold the pipe open
    /// forever; in that case the reader is abandoned with its partial output.
    pub async fn finish(mut self, grace: Duration) -> Captured {
        if tokio::time::timeout(grace, &mut self.handle).await.is_err() {
            debug!("Child {} still open after {:?}, abandoning reader", self.name, grace);
            self.handle.abort();
        }
        let captured = match self.buffer.lock() {
            Ok(mut captured) => std::mem::take(&mut *captured),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        captured
    }
}
