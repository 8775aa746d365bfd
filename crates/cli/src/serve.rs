use crate::handler::RequestHandler;
use anyhow::{Context, Result};
use dirlens_protocol::serialize_json;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Serve newline-delimited JSON requests until `reader` reaches EOF.
///
/// Every request runs on its own task, so responses come back in completion
/// order, one JSON object per line. Returns the writer once all responses are
/// flushed.
pub async fn serve_lines<R, W>(handler: Arc<RequestHandler>, reader: R, writer: W) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<W, std::io::Error>(writer)
    });

    let mut tasks = JoinSet::new();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.context("read request line")? {
        if line.trim().is_empty() {
            continue;
        }
        let handler = Arc::clone(&handler);
        let tx = tx.clone();
        tasks.spawn(async move {
            let response = handler.handle_line(&line).await;
            match serialize_json(&response) {
                Ok(json) => {
                    if tx.send(json).is_err() {
                        log::warn!("Response writer is gone; dropping a response");
                    }
                }
                Err(err) => log::error!("Cannot serialize response: {err:#}"),
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            log::error!("Request task failed: {err}");
        }
    }
    drop(tx);

    let writer = writer_task
        .await
        .context("join response writer")?
        .context("write response")?;
    Ok(writer)
}

pub async fn serve_stdio(handler: Arc<RequestHandler>) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve_lines(handler, stdin, tokio::io::stdout()).await?;
    Ok(())
}
