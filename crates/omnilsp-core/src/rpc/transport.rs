//! Framed transport for the editor stream.
//!
//! Implements the LSP header-content message format. Messages follow:
//! ```text
//! Content-Length: 123\r\n
//! \r\n
//! {"jsonrpc":"2.0",...}
//! ```
//!
//! The reader and writer halves are generic over the underlying I/O so the
//! production path runs on stdin/stdout while tests drive the codec through
//! in-memory duplex pipes.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::rpc::types::{InboundMessage, JsonRpcNotification, JsonRpcRequest, RequestId};

/// Reading half of the framed editor stream.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
}

/// Writing half of the framed editor stream.
#[derive(Debug)]
pub struct FrameWriter<W> {
    writer: W,
}

/// Build the production transport over the process stdio pair.
///
/// The pair is the single shared resource of the process; it is opened once
/// here and owned by the gateway until shutdown.
#[must_use]
pub fn stdio_transport() -> (FrameReader<BufReader<Stdin>>, FrameWriter<Stdout>) {
    (
        FrameReader::new(BufReader::new(tokio::io::stdin())),
        FrameWriter::new(tokio::io::stdout()),
    )
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    /// Wrap a buffered reader.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Receive the next message from the editor.
    ///
    /// Reads headers, extracts Content-Length, reads the exact message
    /// content, and classifies it as a request or notification. Returns
    /// `Ok(None)` when the peer closes the stream at a frame boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The stream closes mid-frame
    /// - The Content-Length header is missing or invalid
    /// - The body is not valid JSON or lacks a method name
    pub async fn receive(&mut self) -> Result<Option<InboundMessage>> {
        let Some(headers) = self.read_headers().await? else {
            return Ok(None);
        };

        let content_length = headers
            .get("content-length")
            .ok_or_else(|| Error::Protocol("missing Content-Length header".to_string()))?
            .parse::<usize>()
            .map_err(|e| Error::Protocol(format!("invalid Content-Length: {e}")))?;

        let content = self.read_content(content_length).await?;

        trace!("received message: {}", content);

        let value: Value = serde_json::from_str(&content)?;

        if value.get("method").is_none() {
            return Err(Error::Protocol(
                "message has no method; client responses are not expected".to_string(),
            ));
        }

        let raw_id = value.get("id").cloned();
        if let Some(raw_id) = raw_id {
            let id: Option<RequestId> = serde_json::from_value(raw_id).ok();
            match serde_json::from_value::<JsonRpcRequest>(value) {
                Ok(request) => Ok(Some(InboundMessage::Request(request))),
                // With a usable ID the decode failure can still be answered;
                // without one there is no reply channel.
                Err(e) => id.map_or_else(
                    || Err(Error::Decode(format!("invalid request: {e}"))),
                    |id| {
                        Ok(Some(InboundMessage::Invalid {
                            id,
                            reason: format!("invalid request: {e}"),
                        }))
                    },
                ),
            }
        } else {
            let notification: JsonRpcNotification = serde_json::from_value(value)
                .map_err(|e| Error::Decode(format!("invalid notification: {e}")))?;
            Ok(Some(InboundMessage::Notification(notification)))
        }
    }

    /// Read headers until the blank separator line.
    ///
    /// `Ok(None)` means EOF before any header byte, which is a graceful
    /// close. EOF after a partial header set is a stream error.
    async fn read_headers(&mut self) -> Result<Option<HashMap<String, String>>> {
        let mut headers = HashMap::new();
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = self.reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                if headers.is_empty() {
                    return Ok(None);
                }
                return Err(Error::StreamClosed);
            }

            if line == "\r\n" || line == "\n" {
                break;
            }

            if let Some((key, value)) = line.trim_end().split_once(':') {
                headers.insert(key.trim().to_lowercase(), value.trim().to_string());
            } else {
                warn!("malformed header: {}", line.trim());
            }
        }

        Ok(Some(headers))
    }

    /// Read exactly `length` content bytes.
    async fn read_content(&mut self, length: usize) -> Result<String> {
        let mut buffer = vec![0u8; length];
        self.reader
            .read_exact(&mut buffer)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => Error::StreamClosed,
                _ => Error::Io(e),
            })?;

        String::from_utf8(buffer)
            .map_err(|e| Error::Protocol(format!("invalid UTF-8 in content: {e}")))
    }
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Wrap a writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Send a message to the editor.
    ///
    /// Serializes the message, prepends the Content-Length header, and
    /// flushes so the editor sees the frame immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let content = serde_json::to_string(message)?;
        let header = format!("Content-Length: {}\r\n\r\n", content.len());

        trace!("sending message: {}", content);

        self.writer.write_all(header.as_bytes()).await?;
        self.writer.write_all(content.as_bytes()).await?;
        self.writer.flush().await?;

        Ok(())
    }
}
