//! JSON-lines console: one hub request per input line, one response per
//! output line.
//!
//! In concurrent mode requests run in their own tasks and responses are
//! written as they complete, so they may come back out of order; callers
//! correlate them by `id`. Invocations on the same thing still run in input
//! order: each thing gets a lane that handles its invocations one by one.
//! In serial mode responses come back in request order.
//!
//! Reading stops as soon as responses can no longer be written.

use std::collections::HashMap;
use std::fmt;

use thingkit_app::hub::{Hub, HubRequest};
use thingkit_app::ports::Actuator;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Serve requests from `input` until it is exhausted, then wait for
/// outstanding requests and return.
///
/// # Errors
///
/// Returns an IO error if reading `input` or writing `output` fails.
pub async fn run<A, R, W>(hub: Hub<A>, input: R, mut output: W, concurrent: bool) -> std::io::Result<()>
where
    A: Actuator + 'static,
    A::Command: fmt::Debug + Send + Sync + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            output.write_all(line.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut pending = JoinSet::new();
    let mut lanes: HashMap<String, mpsc::UnboundedSender<HubRequest>> = HashMap::new();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if tx.is_closed() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request = match HubRequest::from_line(line) {
            Ok(request) => request,
            Err(response) => {
                if tx.send(response.to_line()).is_err() {
                    break;
                }
                continue;
            }
        };

        if !concurrent {
            if tx.send(hub.handle(request).await.to_line()).is_err() {
                break;
            }
            continue;
        }

        match request.invoked_thing().map(str::to_string) {
            Some(thing) => {
                let lane = lanes
                    .entry(thing)
                    .or_insert_with(|| open_lane(&mut pending, hub.clone(), tx.clone()));
                if lane.send(request).is_err() {
                    break;
                }
            }
            None => {
                let hub = hub.clone();
                let tx = tx.clone();
                pending.spawn(async move {
                    let _ = tx.send(hub.handle(request).await.to_line());
                });
            }
        }
    }
    if tx.is_closed() {
        tracing::warn!("output closed, no longer reading requests");
    }
    tracing::debug!(pending = pending.len(), "input closed");

    drop(lanes);
    while let Some(result) = pending.join_next().await {
        if let Err(err) = result {
            tracing::error!(error = %err, "request task failed");
        }
    }
    drop(tx);
    writer.await.map_err(std::io::Error::other)?
}

/// Spawn a task that answers one thing's invocations in arrival order.
fn open_lane<A>(
    pending: &mut JoinSet<()>,
    hub: Hub<A>,
    tx: mpsc::UnboundedSender<String>,
) -> mpsc::UnboundedSender<HubRequest>
where
    A: Actuator + 'static,
    A::Command: fmt::Debug + Send + Sync + 'static,
{
    let (lane, mut requests) = mpsc::unbounded_channel::<HubRequest>();
    pending.spawn(async move {
        while let Some(request) = requests.recv().await {
            if tx.send(hub.handle(request).await.to_line()).is_err() {
                break;
            }
        }
    });
    lane
}
