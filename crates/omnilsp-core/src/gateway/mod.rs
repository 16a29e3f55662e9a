//! Protocol gateway: the editor-facing receive loop and method dispatch.
//!
//! The gateway owns the framed stdio stream for the process lifetime. Each
//! incoming request is dispatched by method name; completion requests run in
//! their own task so concurrent requests block independently on the backend,
//! and all responses funnel through a single writer task so frames never
//! interleave on the shared output stream.

mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

pub use handlers::{handle_completion, initialize_result, uri_to_file_path};

use crate::backend::CompletionBackend;
use crate::error::{
    CODE_INVALID_REQUEST, CODE_METHOD_NOT_FOUND, CODE_REQUEST_CANCELLED, Error, Result,
};
use crate::rpc::{FrameReader, FrameWriter, InboundMessage, JsonRpcRequest, JsonRpcResponse, RequestId};

/// Requests the gateway knows how to answer.
///
/// Everything else is `Unsupported` and yields a method-not-found error
/// response rather than a silent drop.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Method {
    /// `initialize` handshake.
    Initialize,
    /// `textDocument/completion`.
    Completion,
    /// `shutdown` request preceding the `exit` notification.
    Shutdown,
    /// Any method this server does not implement.
    Unsupported(String),
}

impl Method {
    fn parse(method: &str) -> Self {
        match method {
            "initialize" => Self::Initialize,
            "textDocument/completion" => Self::Completion,
            "shutdown" => Self::Shutdown,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

/// Cancellation tokens for in-flight requests, keyed by request ID.
type CancelRegistry = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// The editor-facing gateway.
///
/// Holds the backend handle; all remaining state is request-scoped, so
/// concurrent handlers never contend on shared mutable data.
#[derive(Debug)]
pub struct Gateway<B> {
    backend: Arc<B>,
}

impl<B: CompletionBackend> Gateway<B> {
    /// Create a gateway over the given completion backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Run the receive loop until the editor closes the stream.
    ///
    /// Returns `Ok(())` on graceful closure (`exit` notification or EOF at
    /// a frame boundary). Per-request failures are answered with error
    /// responses and never terminate the loop.
    ///
    /// # Errors
    ///
    /// Returns an error only for stream-level failures: a mid-frame close
    /// or an I/O error on either half of the stdio pair.
    pub async fn run<R, W>(
        self,
        mut reader: FrameReader<R>,
        mut writer: FrameWriter<W>,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(32);
        let writer_task = tokio::spawn(async move {
            while let Some(response) = rx.recv().await {
                writer.send(&response).await?;
            }
            Ok::<(), Error>(())
        });

        let registry: CancelRegistry = Arc::new(Mutex::new(HashMap::new()));
        let mut shutdown_requested = false;
        let mut outcome = Ok(());

        loop {
            match reader.receive().await {
                Ok(Some(InboundMessage::Request(request))) => {
                    if self
                        .dispatch_request(request, &tx, &registry, &mut shutdown_requested)
                        .await
                        .is_err()
                    {
                        // Writer task is gone; the output stream is broken.
                        outcome = Err(Error::StreamClosed);
                        break;
                    }
                }
                Ok(Some(InboundMessage::Notification(notification))) => {
                    match notification.method.as_str() {
                        "exit" => {
                            if !shutdown_requested {
                                warn!("exit received without a preceding shutdown request");
                            }
                            info!("exit notification received, closing stream");
                            break;
                        }
                        "$/cancelRequest" => {
                            cancel_request(&registry, notification.params).await;
                        }
                        "initialized" | "textDocument/didOpen" | "textDocument/didChange"
                        | "textDocument/didClose" => {
                            debug!(method = %notification.method, "notification accepted");
                        }
                        other => {
                            trace!(method = %other, "ignoring notification");
                        }
                    }
                }
                Ok(Some(InboundMessage::Invalid { id, reason })) => {
                    warn!(id = ?id, "malformed request envelope: {reason}");
                    let response = JsonRpcResponse::error(id, CODE_INVALID_REQUEST, reason);
                    if tx.send(response).await.is_err() {
                        outcome = Err(Error::StreamClosed);
                        break;
                    }
                }
                Ok(None) => {
                    info!("editor closed the stream");
                    break;
                }
                // Malformed frames abort only the offending exchange.
                Err(e @ (Error::Json(_) | Error::Decode(_) | Error::Protocol(_))) => {
                    warn!("discarding malformed message: {e}");
                }
                Err(e) => {
                    error!("stream failure: {e}");
                    outcome = Err(e);
                    break;
                }
            }
        }

        // Release any in-flight handlers so shutdown is not held hostage by
        // a slow backend call.
        for token in registry.lock().await.values() {
            token.cancel();
        }

        drop(tx);
        match writer_task.await {
            Ok(Ok(())) => outcome,
            Ok(Err(e)) => outcome.and(Err(e)),
            Err(e) => outcome.and(Err(Error::Protocol(format!("writer task failed: {e}")))),
        }
    }

    /// Dispatch one request. Fails only when the writer channel is closed.
    async fn dispatch_request(
        &self,
        request: JsonRpcRequest,
        tx: &mpsc::Sender<JsonRpcResponse>,
        registry: &CancelRegistry,
        shutdown_requested: &mut bool,
    ) -> std::result::Result<(), mpsc::error::SendError<JsonRpcResponse>> {
        match Method::parse(&request.method) {
            Method::Initialize => {
                debug!("initialize request");
                let result = serde_json::to_value(handlers::initialize_result())
                    .unwrap_or(Value::Null);
                tx.send(JsonRpcResponse::success(request.id, result)).await
            }
            Method::Shutdown => {
                debug!("shutdown request");
                *shutdown_requested = true;
                tx.send(JsonRpcResponse::success(request.id, Value::Null))
                    .await
            }
            Method::Completion => {
                // Register the token before the task is spawned so a cancel
                // arriving on the very next frame always finds it.
                let token = CancellationToken::new();
                registry
                    .lock()
                    .await
                    .insert(request.id.clone(), token.clone());
                self.spawn_completion(request, token, tx.clone(), Arc::clone(registry));
                Ok(())
            }
            Method::Unsupported(name) => {
                debug!(method = %name, "unsupported method");
                tx.send(JsonRpcResponse::error(
                    request.id,
                    CODE_METHOD_NOT_FOUND,
                    format!("method not found: {name}"),
                ))
                .await
            }
        }
    }

    /// Run a completion request in its own task.
    ///
    /// The token is already in the registry; the HTTP call is dropped at
    /// the select point when it fires, so cancellation propagates to the
    /// in-flight backend request.
    fn spawn_completion(
        &self,
        request: JsonRpcRequest,
        token: CancellationToken,
        tx: mpsc::Sender<JsonRpcResponse>,
        registry: CancelRegistry,
    ) {
        let backend = Arc::clone(&self.backend);

        tokio::spawn(async move {
            let response = tokio::select! {
                () = token.cancelled() => {
                    debug!(id = ?request.id, "completion request cancelled");
                    JsonRpcResponse::error(
                        request.id.clone(),
                        CODE_REQUEST_CANCELLED,
                        Error::Cancelled.to_string(),
                    )
                }
                result = handlers::handle_completion(backend.as_ref(), request.params) => {
                    match result {
                        Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
                        Err(e) => {
                            warn!(id = ?request.id, "completion failed: {e}");
                            JsonRpcResponse::error(request.id.clone(), e.rpc_code(), e.to_string())
                        }
                    }
                }
            };

            registry.lock().await.remove(&request.id);
            // A closed channel means the gateway is shutting down; the
            // response has nowhere to go.
            let _ = tx.send(response).await;
        });
    }
}

/// Cancel the in-flight request named by a `$/cancelRequest` notification.
async fn cancel_request(registry: &CancelRegistry, params: Option<Value>) {
    let Some(id) = cancel_id(params) else {
        warn!("malformed $/cancelRequest params");
        return;
    };

    if let Some(token) = registry.lock().await.get(&id) {
        token.cancel();
    } else {
        trace!(id = ?id, "cancel for unknown or completed request");
    }
}

fn cancel_id(params: Option<Value>) -> Option<RequestId> {
    let id = params?.get("id")?.clone();
    serde_json::from_value(id).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!(Method::parse("initialize"), Method::Initialize);
        assert_eq!(Method::parse("textDocument/completion"), Method::Completion);
        assert_eq!(Method::parse("shutdown"), Method::Shutdown);
        assert_eq!(
            Method::parse("textDocument/hover"),
            Method::Unsupported("textDocument/hover".to_string())
        );
    }

    #[test]
    fn test_cancel_id_parsing() {
        assert_eq!(
            cancel_id(Some(json!({"id": 5}))),
            Some(RequestId::Number(5))
        );
        assert_eq!(
            cancel_id(Some(json!({"id": "req-9"}))),
            Some(RequestId::String("req-9".to_string()))
        );
        assert_eq!(cancel_id(Some(json!({"other": 1}))), None);
        assert_eq!(cancel_id(None), None);
    }
}
