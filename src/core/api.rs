//! HTTP dashboard for the web profile
//!
//! Endpoints:
//! - GET /           - Dashboard page
//! - GET /video_feed - MJPEG stream of annotated frames
//! - GET /stats      - `{score, quality, status}`
//! - GET /health     - Health check
//!
//! The monitor runs on one blocking thread and owns all posture state. It
//! publishes stats through a `watch` channel and ready-made MJPEG parts through
//! a `broadcast` channel; handlers only ever read.

use std::convert::Infallible;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use futures_util::Stream;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::core::mjpeg::{encode_jpeg, multipart_part, stream_content_type};
use crate::core::{Beeper, FrameSource, LandmarkProvider, Monitor, ProcessedFrame};
use crate::types::Stats;
use crate::{Error, Result, STATUS_STOPPED};

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// Frames buffered per stream client before it starts skipping
const FRAME_BUFFER: usize = 4;

/// Read side shared by all handlers
pub struct AppState {
    stats: watch::Receiver<Stats>,
    frames: broadcast::Sender<Bytes>,
    closed: watch::Receiver<bool>,
}

/// Write side, owned by whoever drives the monitor
#[derive(Clone)]
pub struct Feeds {
    stats: Arc<watch::Sender<Stats>>,
    frames: broadcast::Sender<Bytes>,
    closed: Arc<watch::Sender<bool>>,
}

impl Feeds {
    pub fn publish_stats(&self, stats: Stats) {
        self.stats.send_replace(stats);
    }

    /// Queue one encoded JPEG for every connected stream client
    pub fn publish_jpeg(&self, jpeg: &[u8]) {
        // no receivers is fine
        let _ = self.frames.send(Bytes::from(multipart_part(jpeg)));
    }

    /// Number of connected `/video_feed` clients
    pub fn viewers(&self) -> usize {
        self.frames.receiver_count()
    }

    /// Publish a processed frame; JPEG encoding is skipped with no viewers
    pub fn publish(&self, frame: &ProcessedFrame) -> Result<()> {
        if let Some(image) = &frame.image {
            if self.viewers() > 0 {
                let jpeg = encode_jpeg(image)?;
                self.publish_jpeg(&jpeg);
            }
        }
        self.publish_stats(frame.report.stats.clone());
        Ok(())
    }

    /// Final status once the monitor has ended: `STOPPED`, or `ERROR: ...`
    pub fn publish_stopped(&self, error: Option<&Error>) {
        let status = match error {
            Some(e) => format!("ERROR: {}", e),
            None => STATUS_STOPPED.to_string(),
        };
        self.stats.send_modify(|stats| stats.status = status);
    }

    /// End every open `/video_feed` stream
    pub fn close(&self) {
        self.closed.send_replace(true);
    }
}

/// Create linked feed/state halves, starting from `Stats::default()`
pub fn channels() -> (Feeds, Arc<AppState>) {
    let (stats_tx, stats_rx) = watch::channel(Stats::default());
    let (frames_tx, _) = broadcast::channel(FRAME_BUFFER);
    let (closed_tx, closed_rx) = watch::channel(false);

    let feeds = Feeds {
        stats: Arc::new(stats_tx),
        frames: frames_tx.clone(),
        closed: Arc::new(closed_tx),
    };
    let state = Arc::new(AppState {
        stats: stats_rx,
        frames: frames_tx,
        closed: closed_rx,
    });
    (feeds, state)
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub viewers: usize,
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/stats", get(stats))
        .route("/video_feed", get(video_feed))
        .route("/health", get(health))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<Stats> {
    Json(state.stats.borrow().clone())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        viewers: state.frames.receiver_count(),
    })
}

async fn video_feed(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rx = state.frames.subscribe();
    info!(viewers = state.frames.receiver_count(), "stream client connected");

    (
        [
            (header::CONTENT_TYPE, stream_content_type()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        Body::from_stream(mjpeg_stream(rx, state.closed.clone())),
    )
}

/// Forward multipart parts until the feeds close; lagging clients skip frames
fn mjpeg_stream(
    rx: broadcast::Receiver<Bytes>,
    closed: watch::Receiver<bool>,
) -> impl Stream<Item = std::result::Result<Bytes, Infallible>> {
    futures_util::stream::unfold((rx, closed), |(mut rx, mut closed)| async move {
        let already_closed = *closed.borrow();
        if already_closed {
            return None;
        }
        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Ok(part) => return Some((Ok(part), (rx, closed))),
                    Err(RecvError::Lagged(skipped)) => debug!(skipped, "stream client lagging"),
                    Err(RecvError::Closed) => return None,
                },
                changed = closed.changed() => {
                    let done = changed.is_err() || *closed.borrow();
                    if done {
                        debug!("stream closed");
                        return None;
                    }
                }
            }
        }
    })
}

/// Run the dashboard server and the monitor until Ctrl-C
pub async fn run_server<S, P, B>(addr: &str, monitor: Monitor<S, P, B>, max_frames: Option<u64>) -> Result<()>
where
    S: FrameSource + Send + 'static,
    P: LandmarkProvider + Send + 'static,
    B: Beeper + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, monitor, max_frames, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Serve the dashboard on `listener` while the monitor runs on a blocking
/// thread, until `shutdown` resolves.
///
/// The server outlives the monitor: once the monitor ends, `/stats` reports
/// `STOPPED` or the error and open streams are closed. Returns the monitor's
/// result.
pub async fn serve<S, P, B, F>(
    listener: tokio::net::TcpListener,
    mut monitor: Monitor<S, P, B>,
    max_frames: Option<u64>,
    shutdown: F,
) -> Result<()>
where
    S: FrameSource + Send + 'static,
    P: LandmarkProvider + Send + 'static,
    B: Beeper + Send + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let (feeds, state) = channels();
    let stop = Arc::new(AtomicBool::new(false));

    let pipeline_stop = stop.clone();
    let pipeline_feeds = feeds.clone();
    let pipeline = tokio::task::spawn_blocking(move || {
        let result = monitor.run(&pipeline_stop, max_frames, |frame| pipeline_feeds.publish(&frame));
        match &result {
            Ok(processed) => info!(processed, "monitor finished"),
            Err(e) => error!(error = %e, "monitor stopped with an error"),
        }
        pipeline_feeds.publish_stopped(result.as_ref().err());
        pipeline_feeds.close();
        result
    });

    let router = create_router(state);
    let shutdown_stop = stop.clone();
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "PostureGuard dashboard running");
    }
    info!("  GET /           - Dashboard");
    info!("  GET /video_feed - MJPEG stream");
    info!("  GET /stats      - Posture stats");
    info!("  GET /health     - Health check");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("shutting down");
            shutdown_stop.store(true, Ordering::SeqCst);
            feeds.close();
        })
        .await;
    stop.store(true, Ordering::SeqCst);
    served?;

    match pipeline.await {
        Ok(result) => result.map(|_| ()),
        Err(e) => Err(Error::Io(std::io::Error::other(e))),
    }
}
