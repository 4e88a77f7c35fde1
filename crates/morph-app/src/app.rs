// Command loop: JSON-lines requests in, JSON-lines responses and events out.

use morph_core::broadcast::DuelEvent;
use morph_core::duel::DuelEngine;
use morph_core::protocol::{dispatch, Request, Response};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One line of output. Responses answer requests in order; events are the
/// broadcast snapshots the engine publishes as matches change.
#[derive(Debug, Serialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum OutputLine {
    Response { response: Response },
    Event { event: DuelEvent },
}

/// Forward non-blank lines from `reader` into `tx` until EOF or until the
/// receiver is dropped.
pub async fn read_lines<R>(reader: R, tx: mpsc::Sender<String>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if tx.send(line.to_string()).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Decode one request line and run it. Undecodable input is answered with
/// an `INVALID_REQUEST` rejection rather than ending the loop.
pub async fn handle_line(engine: &DuelEngine, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => {
            debug!("Request: {request:?}");
            dispatch(engine, request).await
        }
        Err(e) => {
            warn!("Malformed request: {e}");
            Response::invalid_request(e.to_string())
        }
    }
}

/// Run the command loop until the input channel closes.
///
/// Events are drained before the next request is taken, so every request's
/// events are written right after its response and the event channel never
/// backs up behind a busy input stream.
pub async fn run<W>(
    engine: &DuelEngine,
    mut line_rx: mpsc::Receiver<String>,
    mut event_rx: mpsc::Receiver<DuelEvent>,
    out: &mut W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    info!("Command loop started");

    let mut events_open = true;

    loop {
        tokio::select! {
            biased;

            // --- Broadcast events ---
            event = event_rx.recv(), if events_open => {
                match event {
                    Some(event) => write_line(out, &OutputLine::Event { event }).await?,
                    None => {
                        info!("Event channel closed");
                        events_open = false;
                    }
                }
            }

            // --- Requests ---
            line = line_rx.recv() => {
                match line {
                    Some(line) => {
                        let response = handle_line(engine, &line).await;
                        write_line(out, &OutputLine::Response { response }).await?;
                    }
                    None => {
                        info!("Input closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    // Events published by the final request.
    while let Ok(event) = event_rx.try_recv() {
        write_line(out, &OutputLine::Event { event }).await?;
    }

    info!("Command loop exiting");
    Ok(())
}

async fn write_line<W>(out: &mut W, line: &OutputLine) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut json = serde_json::to_vec(line)?;
    json.push(b'\n');
    out.write_all(&json).await?;
    out.flush().await?;
    Ok(())
}
