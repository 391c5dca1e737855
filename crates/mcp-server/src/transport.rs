//! Line-delimited transport.
//!
//! One JSON message per line, strictly sequential: read a line, hand it to
//! the handler, write the handler's line back (or nothing, for
//! notifications), repeat until stdin closes. Responses always end with a
//! single `\n` and are flushed immediately so the client never waits on a
//! buffered reply.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::Result;

pub struct LineTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
}

impl LineTransport<tokio::io::Stdin, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Serves until EOF. The handler returns the response line for a message,
    /// or an empty string when the message must not produce output.
    pub async fn listen<F>(mut self, mut handle: F) -> Result<()>
    where
        F: FnMut(&str) -> String,
    {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line).await {
                Ok(0) => {
                    log::info!("stdin closed, shutting down");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("Failed to read from stdin: {e}");
                    break;
                }
            }

            let message = line.trim();
            if message.is_empty() {
                continue;
            }

            let response = handle(message);
            if response.is_empty() {
                continue;
            }
            self.writer.write_all(response.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await?;
        }
        Ok(())
    }
}
