//! Single-shot transfers into memory or onto disk

use crate::client::NetClient;
use autospec_errors::{Error, NetworkError, UserFacingError};
use autospec_events::{AppEvent, DownloadEvent, EventEmitter, EventSender};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::{self as tokio_fs, File};
use tokio::io::AsyncWriteExt;

/// What a successful transfer produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// Response body held in memory
    Bytes(Vec<u8>),
    /// Response body streamed to this path
    File(PathBuf),
}

impl Fetched {
    /// Body bytes, if the transfer was buffered
    #[must_use]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::File(_) => None,
        }
    }
}

/// One transfer to perform
#[derive(Debug, Clone)]
pub struct FetchRequest {
    url: String,
    destination: Option<PathBuf>,
    post_body: Option<Vec<u8>>,
    fatal: bool,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            destination: None,
            post_body: None,
            fatal: false,
        }
    }

    /// Stream the body into `path` instead of buffering it
    #[must_use]
    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination = Some(path.into());
        self
    }

    /// Send a POST with this body instead of a GET
    #[must_use]
    pub fn post(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.post_body = Some(body.into());
        self
    }

    /// Turn failures into [`NetworkError::Fatal`] instead of `Ok(None)`
    #[must_use]
    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Perform a transfer.
///
/// Returns `Ok(Some(..))` on success. On any transport or HTTP failure the
/// partial destination file is removed and the result is `Ok(None)`, or a
/// [`NetworkError::Fatal`] when the request was marked fatal.
///
/// # Errors
///
/// Only fatal requests return errors.
pub async fn fetch(
    client: &NetClient,
    request: FetchRequest,
    tx: &EventSender,
) -> Result<Option<Fetched>, Error> {
    tx.emit(AppEvent::Download(DownloadEvent::Started {
        url: request.url.clone(),
        destination: request
            .destination
            .as_ref()
            .map(|p| p.display().to_string()),
    }));

    match transfer(client, &request).await {
        Ok((fetched, bytes)) => {
            tx.emit(AppEvent::Download(DownloadEvent::Completed {
                url: request.url.clone(),
                bytes,
            }));
            Ok(Some(fetched))
        }
        Err(err) => {
            if let Some(dest) = &request.destination {
                // Best-effort cleanup
                let _ = tokio_fs::remove_file(dest).await;
            }

            let reason = err.user_message().into_owned();
            tracing::debug!(url = %request.url, %reason, "transfer failed");
            tx.emit(AppEvent::Download(DownloadEvent::Failed {
                url: request.url.clone(),
                error: reason.clone(),
                fatal: request.fatal,
            }));

            if request.fatal {
                Err(NetworkError::Fatal {
                    url: request.url,
                    reason,
                }
                .into())
            } else {
                Ok(None)
            }
        }
    }
}

async fn transfer(client: &NetClient, request: &FetchRequest) -> Result<(Fetched, u64), Error> {
    let url = request.url.as_str();
    crate::parse_url(url)?;

    let mut file = match &request.destination {
        Some(path) => Some(create_destination(path).await?),
        None => None,
    };

    let config = client.config();
    let stall_window = (config.low_speed_limit > 0).then_some(config.low_speed_time);

    let send = async {
        match &request.post_body {
            Some(body) => client.post(url, body.clone()).await,
            None => client.get(url).await,
        }
    };
    // A server that never answers counts as a stalled transfer
    let response = match stall_window {
        Some(window) => tokio::time::timeout(window, send)
            .await
            .map_err(|_| low_speed(url, config.low_speed_limit, window))??,
        None => send.await?,
    };

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(NetworkError::HttpError {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        }
        .into());
    }

    let mut guard = SpeedGuard::new(config.low_speed_limit, config.low_speed_time, Instant::now());
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    let mut total = 0u64;

    loop {
        let next = match stall_window {
            Some(window) => tokio::time::timeout(window, stream.next())
                .await
                .map_err(|_| low_speed(url, config.low_speed_limit, window))?,
            None => stream.next().await,
        };
        let Some(chunk) = next else { break };
        let chunk = chunk.map_err(|e| NetClient::convert(url, &e))?;

        total += chunk.len() as u64;
        if !guard.record(chunk.len() as u64, Instant::now()) {
            return Err(low_speed(url, config.low_speed_limit, config.low_speed_time));
        }

        match file.as_mut() {
            Some((handle, path)) => handle
                .write_all(&chunk)
                .await
                .map_err(|e| write_failed(path, &e))?,
            None => body.extend_from_slice(&chunk),
        }
    }

    let fetched = match file {
        Some((mut handle, path)) => {
            handle.flush().await.map_err(|e| write_failed(&path, &e))?;
            Fetched::File(path)
        }
        None => Fetched::Bytes(body),
    };
    Ok((fetched, total))
}

async fn create_destination(path: &Path) -> Result<(File, PathBuf), Error> {
    let handle = File::create(path)
        .await
        .map_err(|e| write_failed(path, &e))?;
    Ok((handle, path.to_path_buf()))
}

fn write_failed(path: &Path, error: &std::io::Error) -> Error {
    NetworkError::WriteFailed {
        path: path.display().to_string(),
        message: error.to_string(),
    }
    .into()
}

fn low_speed(url: &str, limit: u64, window: Duration) -> Error {
    NetworkError::LowSpeed {
        url: url.to_string(),
        limit,
        seconds: window.as_secs(),
    }
    .into()
}

/// Tracks throughput over consecutive windows
#[derive(Debug)]
struct SpeedGuard {
    limit: u64,
    window: Duration,
    started: Instant,
    bytes: u64,
}

impl SpeedGuard {
    fn new(limit: u64, window: Duration, now: Instant) -> Self {
        Self {
            limit,
            window,
            started: now,
            bytes: 0,
        }
    }

    /// Record `n` received bytes; false once a full window fell below the limit
    fn record(&mut self, n: u64, now: Instant) -> bool {
        self.bytes += n;
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.window {
            return true;
        }

        let ok = u128::from(self.bytes) * 1000 >= u128::from(self.limit) * elapsed.as_millis();
        self.started = now;
        self.bytes = 0;
        ok
    }
}
