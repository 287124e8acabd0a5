//! Page session: every DOM and input operation the flows use.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::SinkExt;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};

use crate::client::{PendingMap, PendingRequest, WsSink};
use crate::error::BrowserError;
use crate::observer::{parse_network_event, NetworkEvent, NetworkObserver};
use crate::protocol::{BoxModel, CdpRequest, CdpResponse, KeyEventType, MouseButton, MouseEventType};

/// Selector covering the elements the action scripts address by index.
/// The order of `querySelectorAll` over this selector defines the 1-based
/// indices used in initial actions and the agent's element digest.
pub const INTERACTIVE_SELECTOR: &str = "input, textarea, select, button, a";

/// Opaque handle to a DOM element (a CDP node id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHandle(pub i64);

/// Compact description of one interactive element, fed to the agent.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ElementDigest {
    pub index: usize,
    pub tag: String,
    pub text: String,
}

/// Shared per-session transport: everything needed to issue a sessioned
/// CDP command. Cloned into the event pump so it can fetch response bodies.
#[derive(Clone)]
pub(crate) struct SessionCore {
    session_id: String,
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    pending: PendingMap,
    request_id: Arc<AtomicU64>,
}

impl SessionCore {
    pub(crate) fn new(
        session_id: String,
        ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
        pending: PendingMap,
        request_id: Arc<AtomicU64>,
    ) -> Self {
        Self {
            session_id,
            ws_tx,
            pending,
            request_id,
        }
    }

    /// Send a CDP command in this session and wait for its response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, BrowserError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: Some(self.session_id.clone()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP session send: {}", json);

        let (tx, rx) = tokio::sync::oneshot::channel();
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
}

type ObserverList = Arc<Mutex<Vec<Arc<dyn NetworkObserver>>>>;

/// A session attached to a single page, plus its network-event pump.
pub struct PageSession {
    target_id: String,
    core: SessionCore,
    observers: ObserverList,
    _pump_task: tokio::task::JoinHandle<()>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        core: SessionCore,
        event_rx: mpsc::UnboundedReceiver<CdpResponse>,
    ) -> Self {
        let observers: ObserverList = Arc::new(Mutex::new(Vec::new()));
        let pump_task = {
            let core = core.clone();
            let observers = observers.clone();
            tokio::spawn(async move {
                Self::pump_events(event_rx, core, observers).await;
            })
        };

        Self {
            target_id,
            core,
            observers,
            _pump_task: pump_task,
        }
    }

    /// Target ID of the attached page.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Register a network observer. Observers receive every page request
    /// and response until the session is dropped.
    pub fn add_observer(&self, observer: Arc<dyn NetworkObserver>) {
        self.observers.lock().push(observer);
    }

    /// Background task: turn CDP network events into observer callbacks.
    /// Body fetches are best-effort; any failure here is logged and the
    /// pump keeps going.
    async fn pump_events(
        mut event_rx: mpsc::UnboundedReceiver<CdpResponse>,
        core: SessionCore,
        observers: ObserverList,
    ) {
        while let Some(message) = event_rx.recv().await {
            let Some(event) = parse_network_event(&message) else {
                continue;
            };
            match event {
                NetworkEvent::Request(request) => {
                    let observers = observers.lock().clone();
                    for observer in observers {
                        observer.on_request(&request);
                    }
                }
                NetworkEvent::Response { request_id, mut event } => {
                    if event.mime_type.contains("json") {
                        match core
                            .call(
                                "Network.getResponseBody",
                                Some(json!({"requestId": request_id})),
                            )
                            .await
                        {
                            Ok(result) => {
                                if result["base64Encoded"].as_bool() != Some(true) {
                                    event.body =
                                        result["body"].as_str().map(|s| s.to_string());
                                }
                            }
                            Err(e) => {
                                debug!(url = %event.url, error = %e, "response body unavailable");
                            }
                        }
                    }
                    let observers = observers.lock().clone();
                    for observer in observers {
                        observer.on_response(&event);
                    }
                }
            }
        }
    }

    /// Send a CDP command in this page's session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, BrowserError> {
        self.core.call(method, params).await
    }

    /// Enable the CDP domains the flows rely on.
    pub(crate) async fn enable_domains(&self) -> Result<(), BrowserError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Network.enable", None).await?;
        debug!("enabled CDP domains for target {}", self.target_id);
        Ok(())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigate to a URL and wait for the document to load.
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let result = self.call("Page.navigate", Some(json!({"url": url}))).await?;

        if let Some(error) = result.get("errorText") {
            return Err(BrowserError::NavigationFailed(
                error.as_str().unwrap_or("unknown error").to_string(),
            ));
        }

        self.wait_for_load().await?;
        debug!("navigated to {}", url);
        Ok(())
    }

    /// Poll `document.readyState` until the page has loaded.
    pub async fn wait_for_load(&self) -> Result<(), BrowserError> {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_secs(30);

        loop {
            let result = self.evaluate("document.readyState").await?;

            if let Some(state) = result.as_str() {
                if state == "complete" || state == "interactive" {
                    return Ok(());
                }
            }

            if start.elapsed() > timeout {
                return Err(BrowserError::Timeout("page load timeout".to_string()));
            }

            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }

    /// Fixed sleep between scripted actions. The host UI gives no reliable
    /// signal for when it has settled, so the flows wait flat durations.
    pub async fn wait_ms(&self, duration_ms: u64) {
        tokio::time::sleep(std::time::Duration::from_millis(duration_ms)).await;
    }

    // ========================================================================
    // JavaScript
    // ========================================================================

    /// Evaluate a JavaScript expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("unknown error");
            return Err(BrowserError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Register a script evaluated on every new document, before page
    /// scripts run.
    pub async fn add_init_script(&self, source: &str) -> Result<(), BrowserError> {
        self.call(
            "Page.addScriptToEvaluateOnNewDocument",
            Some(json!({"source": source})),
        )
        .await?;
        Ok(())
    }

    // ========================================================================
    // Request shaping
    // ========================================================================

    /// Send extra HTTP headers with every page request.
    pub async fn set_extra_headers(
        &self,
        headers: &std::collections::HashMap<String, String>,
    ) -> Result<(), BrowserError> {
        self.call("Network.setExtraHTTPHeaders", Some(json!({"headers": headers})))
            .await?;
        Ok(())
    }

    /// Override the user agent string.
    pub async fn set_user_agent(&self, user_agent: &str) -> Result<(), BrowserError> {
        self.call(
            "Network.setUserAgentOverride",
            Some(json!({"userAgent": user_agent})),
        )
        .await?;
        Ok(())
    }

    // ========================================================================
    // Element lookup and reads
    // ========================================================================

    /// Node id of the document root.
    async fn document_node(&self) -> Result<i64, BrowserError> {
        let result = self.call("DOM.getDocument", Some(json!({"depth": 0}))).await?;
        result["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| BrowserError::InvalidResponse("missing document root".to_string()))
    }

    /// First element matching `selector`, if any.
    pub async fn query_selector(
        &self,
        selector: &str,
    ) -> Result<Option<ElementHandle>, BrowserError> {
        let root = self.document_node().await?;
        let result = self
            .call(
                "DOM.querySelector",
                Some(json!({"nodeId": root, "selector": selector})),
            )
            .await?;

        let node_id = result["nodeId"].as_i64().unwrap_or(0);
        Ok((node_id != 0).then_some(ElementHandle(node_id)))
    }

    /// All elements matching `selector`, in DOM order.
    pub async fn query_selector_all(
        &self,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, BrowserError> {
        let root = self.document_node().await?;
        self.query_selector_all_from(ElementHandle(root), selector).await
    }

    /// All elements matching `selector` beneath `scope`, in DOM order.
    pub async fn query_selector_all_from(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, BrowserError> {
        let result = self
            .call(
                "DOM.querySelectorAll",
                Some(json!({"nodeId": scope.0, "selector": selector})),
            )
            .await?;

        let handles = result["nodeIds"]
            .as_array()
            .map(|array| {
                array
                    .iter()
                    .filter_map(|v| v.as_i64())
                    .map(ElementHandle)
                    .collect()
            })
            .unwrap_or_default();

        Ok(handles)
    }

    /// Interactive elements in DOM order; index `n` in an action script
    /// addresses entry `n - 1` of this list.
    pub async fn interactive_elements(&self) -> Result<Vec<ElementHandle>, BrowserError> {
        self.query_selector_all(INTERACTIVE_SELECTOR).await
    }

    /// Compact digest of the interactive elements, for the agent's
    /// observation step. Indices match [`PageSession::interactive_elements`].
    pub async fn interactive_digest(&self) -> Result<Vec<ElementDigest>, BrowserError> {
        let expression = format!(
            r#"JSON.stringify(Array.from(document.querySelectorAll("{}")).map((el, i) => ({{
                index: i + 1,
                tag: el.tagName.toLowerCase(),
                text: ((el.innerText || el.value || el.placeholder || '') + '').trim().slice(0, 80)
            }})))"#,
            INTERACTIVE_SELECTOR
        );
        let value = self.evaluate(&expression).await?;
        let json = value
            .as_str()
            .ok_or_else(|| BrowserError::InvalidResponse("digest is not a string".to_string()))?;
        Ok(serde_json::from_str(json)?)
    }

    /// Trimmed `textContent` of an element.
    pub async fn text_content(&self, element: ElementHandle) -> Result<String, BrowserError> {
        let object = self
            .call("DOM.resolveNode", Some(json!({"nodeId": element.0})))
            .await?;
        let object_id = object["object"]["objectId"]
            .as_str()
            .ok_or_else(|| BrowserError::ElementNotFound(format!("node {}", element.0)))?;

        let result = self
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": "function() { return this.textContent || ''; }",
                    "returnByValue": true,
                })),
            )
            .await?;

        Ok(result["result"]["value"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Value of an attribute, or `None` when the element lacks it.
    pub async fn get_attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let result = self
            .call("DOM.getAttributes", Some(json!({"nodeId": element.0})))
            .await?;

        // CDP returns a flat [name, value, name, value, ...] list.
        let attributes = result["attributes"].as_array().cloned().unwrap_or_default();
        Ok(attributes
            .chunks_exact(2)
            .find(|pair| pair[0].as_str() == Some(name))
            .and_then(|pair| pair[1].as_str().map(|s| s.to_string())))
    }

    /// Whether the element currently has a non-empty layout box.
    pub async fn is_visible(&self, element: ElementHandle) -> Result<bool, BrowserError> {
        Ok(self
            .box_model(element)
            .await?
            .map(|model| model.width > 0 && model.height > 0)
            .unwrap_or(false))
    }

    /// Box model of an element; `None` when it has no layout (hidden).
    async fn box_model(&self, element: ElementHandle) -> Result<Option<BoxModel>, BrowserError> {
        let result = self
            .call("DOM.getBoxModel", Some(json!({"nodeId": element.0})))
            .await;

        match result {
            Ok(value) => {
                let model: BoxModel = serde_json::from_value(value["model"].clone())?;
                Ok(Some(model))
            }
            Err(BrowserError::Protocol { code: -32000, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Click the center of an element.
    pub async fn click_element(&self, element: ElementHandle) -> Result<(), BrowserError> {
        let model = self.box_model(element).await?.ok_or_else(|| {
            BrowserError::ElementNotFound(format!("node {} (not visible)", element.0))
        })?;

        let (x, y) = quad_center(&model.content);
        for event_type in [MouseEventType::MousePressed, MouseEventType::MouseReleased] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event_type,
                    "x": x,
                    "y": y,
                    "button": MouseButton::Left,
                    "clickCount": 1,
                })),
            )
            .await?;
        }

        debug!("clicked node {} at ({}, {})", element.0, x, y);
        Ok(())
    }

    /// Focus an element.
    pub async fn focus(&self, element: ElementHandle) -> Result<(), BrowserError> {
        self.call("DOM.focus", Some(json!({"nodeId": element.0}))).await?;
        Ok(())
    }

    /// Insert text at the current focus.
    pub async fn type_text(&self, text: &str) -> Result<(), BrowserError> {
        self.call("Input.insertText", Some(json!({"text": text}))).await?;
        Ok(())
    }

    /// Press and release a key by its DOM key name.
    pub async fn press_key(&self, key: &str) -> Result<(), BrowserError> {
        for event_type in [KeyEventType::KeyDown, KeyEventType::KeyUp] {
            self.call(
                "Input.dispatchKeyEvent",
                Some(json!({"type": event_type, "key": key})),
            )
            .await?;
        }
        Ok(())
    }

    /// Select-all in the focused element (Control+a).
    async fn select_all(&self) -> Result<(), BrowserError> {
        for event_type in [KeyEventType::KeyDown, KeyEventType::KeyUp] {
            self.call(
                "Input.dispatchKeyEvent",
                Some(json!({"type": event_type, "key": "a", "modifiers": 2})),
            )
            .await?;
        }
        Ok(())
    }

    /// Focus an element, replace its content with `text`.
    pub async fn fill_element(
        &self,
        element: ElementHandle,
        text: &str,
    ) -> Result<(), BrowserError> {
        self.focus(element).await?;
        self.select_all().await?;
        self.type_text(text).await?;
        Ok(())
    }

    /// Replace an element's content and commit the edit by advancing focus.
    /// The host grid only registers a value once focus leaves the input.
    pub async fn fill_and_commit(
        &self,
        element: ElementHandle,
        text: &str,
        commit_key: &str,
    ) -> Result<(), BrowserError> {
        self.fill_element(element, text).await?;
        self.press_key(commit_key).await?;
        Ok(())
    }

    // ========================================================================
    // File upload
    // ========================================================================

    /// Hand local files to a file input. Works on hidden inputs too, which
    /// is how the import dialog's `input[type="file"]` is driven.
    pub async fn set_file_input(
        &self,
        selector: &str,
        paths: &[std::path::PathBuf],
    ) -> Result<(), BrowserError> {
        let element = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))?;

        let files: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();

        self.call(
            "DOM.setFileInputFiles",
            Some(json!({"files": files, "nodeId": element.0})),
        )
        .await?;

        debug!(selector, count = files.len(), "file input populated");
        Ok(())
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self._pump_task.abort();
    }
}

/// Center point of a CDP content quad.
fn quad_center(quad: &[f64]) -> (f64, f64) {
    if quad.len() >= 8 {
        let x = (quad[0] + quad[2] + quad[4] + quad[6]) / 4.0;
        let y = (quad[1] + quad[3] + quad[5] + quad[7]) / 4.0;
        (x, y)
    } else {
        (0.0, 0.0)
    }
}
