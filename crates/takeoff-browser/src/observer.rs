//! Network observer registration.
//!
//! Observers are notified of page requests and responses from a background
//! task; they run fire-and-forget and must handle their own failures. The
//! main flow never blocks on, or fails because of, an observer.

use std::collections::HashMap;

use crate::protocol::{
    headers_map, CdpResponse, RequestWillBeSentParams, ResponseReceivedParams,
};

/// One outgoing page request.
#[derive(Debug, Clone)]
pub struct RequestEvent {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub post_data: Option<String>,
}

/// One received response. `body` is only populated for JSON responses and
/// only when the body could still be fetched from the browser.
#[derive(Debug, Clone)]
pub struct ResponseEvent {
    pub status: u16,
    pub url: String,
    pub mime_type: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

/// Receives page network traffic. Implementations log or record; they have
/// no way to signal failure back into the flow.
pub trait NetworkObserver: Send + Sync {
    fn on_request(&self, event: &RequestEvent);
    fn on_response(&self, event: &ResponseEvent);
}

/// Parsed network event, before the optional body fetch.
#[derive(Debug)]
pub(crate) enum NetworkEvent {
    Request(RequestEvent),
    Response {
        /// CDP request id, needed for `Network.getResponseBody`.
        request_id: String,
        event: ResponseEvent,
    },
}

/// Map a raw CDP event message to a network event, if it is one.
pub(crate) fn parse_network_event(message: &CdpResponse) -> Option<NetworkEvent> {
    let params = message.params.as_ref()?;
    match message.method.as_deref()? {
        "Network.requestWillBeSent" => {
            let parsed: RequestWillBeSentParams =
                serde_json::from_value(params.clone()).ok()?;
            Some(NetworkEvent::Request(RequestEvent {
                method: parsed.request.method,
                url: parsed.request.url,
                headers: headers_map(&parsed.request.headers),
                post_data: parsed.request.post_data,
            }))
        }
        "Network.responseReceived" => {
            let parsed: ResponseReceivedParams = serde_json::from_value(params.clone()).ok()?;
            Some(NetworkEvent::Response {
                request_id: parsed.request_id,
                event: ResponseEvent {
                    status: parsed.response.status,
                    url: parsed.response.url,
                    mime_type: parsed.response.mime_type,
                    headers: headers_map(&parsed.response.headers),
                    body: None,
                },
            })
        }
        _ => None,
    }
}
