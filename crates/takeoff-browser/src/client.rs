//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use crate::error::BrowserError;
use crate::page::{PageSession, SessionCore};
use crate::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Pending request waiting for its response.
pub(crate) struct PendingRequest {
    pub tx: oneshot::Sender<Result<Value, BrowserError>>,
}

pub(crate) type PendingMap = Arc<Mutex<HashMap<u64, PendingRequest>>>;
pub(crate) type EventHandlerMap = Arc<Mutex<HashMap<String, mpsc::UnboundedSender<CdpResponse>>>>;

/// Client for a Chrome instance with remote debugging enabled.
///
/// Owns the browser-level WebSocket; page interaction goes through
/// [`PageSession`]s attached via [`CdpClient::attach_page`].
pub struct CdpClient {
    /// HTTP endpoint for page discovery.
    http_endpoint: String,
    /// Browser WebSocket URL.
    browser_ws_url: String,
    /// WebSocket sender, shared with sessions.
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    /// Request ID counter, shared with sessions.
    request_id: Arc<AtomicU64>,
    /// Requests waiting for responses.
    pending: PendingMap,
    /// Event channels by session ID.
    event_handlers: EventHandlerMap,
    /// Background receive task.
    _recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given debugging endpoint
    /// (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, BrowserError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| BrowserError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| BrowserError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!("connected to browser: {}", version.browser);

        let browser_ws_url = version.web_socket_debugger_url;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&browser_ws_url)
            .await
            .map_err(|e| BrowserError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let ws_tx = Arc::new(tokio::sync::Mutex::new(ws_sink));
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let event_handlers: EventHandlerMap = Arc::new(Mutex::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            let event_handlers = event_handlers.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending, event_handlers).await;
            })
        };

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            http_endpoint,
            browser_ws_url,
            ws_tx,
            request_id: Arc::new(AtomicU64::new(1)),
            pending,
            event_handlers,
            _recv_task: recv_task,
        })
    }

    /// WebSocket receive loop: routes command responses to their waiters
    /// and events to the owning session's channel.
    async fn receive_loop(
        mut ws_source: WsSource,
        pending: PendingMap,
        event_handlers: EventHandlerMap,
    ) {
        while let Some(message) = ws_source.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(response) => {
                            if let Some(id) = response.id {
                                let waiter = pending.lock().remove(&id);
                                if let Some(request) = waiter {
                                    let result = if let Some(error) = response.error {
                                        Err(BrowserError::Protocol {
                                            code: error.code,
                                            message: error.message,
                                        })
                                    } else {
                                        Ok(response.result.unwrap_or(Value::Null))
                                    };
                                    let _ = request.tx.send(result);
                                }
                            } else if response.method.is_some() {
                                let session_id = response.session_id.clone().unwrap_or_default();
                                let tx = event_handlers.lock().get(&session_id).cloned();
                                if let Some(tx) = tx {
                                    let _ = tx.send(response);
                                }
                            }
                        }
                        Err(e) => {
                            warn!("failed to parse CDP message: {}", e);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Send a browser-level CDP command and wait for its response.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, BrowserError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: None,
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await?;
        }

        match tokio::time::timeout(std::time::Duration::from_secs(30), rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BrowserError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(BrowserError::Timeout(format!("request {} timed out", method)))
            }
        }
    }

    /// Browser WebSocket URL.
    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    /// List all open pages.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, BrowserError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(pages)
    }

    /// Create a new page/tab and attach a session to it.
    pub async fn new_page(&self, url: Option<&str>) -> Result<PageSession, BrowserError> {
        // Chrome requires PUT for /json/new.
        let create_url = match url {
            Some(u) => format!("{}/json/new?{}", self.http_endpoint, u),
            None => format!("{}/json/new", self.http_endpoint),
        };

        let client = reqwest::Client::new();
        let page_info: PageInfo = client.put(&create_url).send().await?.json().await?;
        debug!("created new page: {} - {}", page_info.id, page_info.url);

        self.attach_page(&page_info.id).await
    }

    /// Attach a session to an existing page target.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, BrowserError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| BrowserError::InvalidResponse("missing sessionId".to_string()))?
            .to_string();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.event_handlers.lock().insert(session_id.clone(), event_tx);

        let core = SessionCore::new(
            session_id,
            self.ws_tx.clone(),
            self.pending.clone(),
            self.request_id.clone(),
        );

        let session = PageSession::new(target_id.to_string(), core, event_rx);
        session.enable_domains().await?;

        Ok(session)
    }

    /// Close a page/target.
    pub async fn close_page(&self, target_id: &str) -> Result<(), BrowserError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}
