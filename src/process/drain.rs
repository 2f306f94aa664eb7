//! Concurrent draining of child stdout and stderr.
//!
//! Each stream gets its own Tokio task that appends to a private buffer, so a
//! full stdout pipe can never stall stderr and vice versa. Readers stop at
//! end-of-stream, on a read error, or when the collector drops the shared
//! stop sender after its grace period expires.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

const READ_CHUNK_SIZE: usize = 8192;

/// Which output stream a reader drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Text captured from both streams.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct CapturedOutput {
    pub(super) stdout: String,
    pub(super) stderr: String,
}

/// Running reader tasks for a single child process.
pub(super) struct StreamDrain {
    stdout: JoinHandle<Vec<u8>>,
    stderr: JoinHandle<Vec<u8>>,
    stop: watch::Sender<()>,
}

impl StreamDrain {
    /// Spawn one reader per stream. A missing stream counts as already drained.
    pub(super) fn start<O, E>(stdout: Option<O>, stderr: Option<E>) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        let (stop, stop_rx) = watch::channel(());
        Self {
            stdout: spawn_reader(stdout, StreamKind::Stdout, stop_rx.clone()),
            stderr: spawn_reader(stderr, StreamKind::Stderr, stop_rx),
            stop,
        }
    }

    /// Wait up to `grace` for both readers to reach end-of-stream, then stop
    /// them and return whatever they captured.
    pub(super) async fn finish(self, grace: Duration) -> CapturedOutput {
        let Self {
            stdout,
            stderr,
            stop,
        } = self;

        let readers = async { tokio::join!(stdout, stderr) };
        tokio::pin!(readers);

        let (stdout_bytes, stderr_bytes) = tokio::select! {
            outputs = &mut readers => outputs,
            () = tokio::time::sleep(grace) => {
                debug!(?grace, "abandoning output collection after grace period");
                drop(stop);
                readers.await
            }
        };

        CapturedOutput {
            stdout: decode(stdout_bytes, StreamKind::Stdout),
            stderr: decode(stderr_bytes, StreamKind::Stderr),
        }
    }
}

fn spawn_reader<R>(
    stream: Option<R>,
    kind: StreamKind,
    stop: watch::Receiver<()>,
) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        match stream {
            Some(reader) => read_until_stopped(reader, kind, stop).await,
            None => Vec::new(),
        }
    })
}

/// Read `reader` to the end, a read error, or the stop signal.
///
/// A read error truncates the capture at the bytes read so far.
pub(super) async fn read_until_stopped<R>(
    mut reader: R,
    kind: StreamKind,
    mut stop: watch::Receiver<()>,
) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut captured = Vec::new();
    let mut chunk = vec![0_u8; READ_CHUNK_SIZE];

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            read = reader.read(&mut chunk) => match read {
                Ok(0) => break,
                Ok(count) => captured.extend_from_slice(chunk.get(..count).unwrap_or_default()),
                Err(error) => {
                    debug!(stream = kind.as_str(), %error, "stream read failed, truncating capture");
                    break;
                }
            },
        }
    }

    captured
}

fn decode(joined: Result<Vec<u8>, tokio::task::JoinError>, kind: StreamKind) -> String {
    match joined {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(error) => {
            debug!(stream = kind.as_str(), %error, "stream reader task failed");
            String::new()
        }
    }
}
