//! Browser automation surface over the Chrome DevTools Protocol.
//!
//! Connects to an already-running Chrome instance (remote debugging
//! enabled) and exposes the operations the takeoff flows need: navigation,
//! element lookup, text/attribute reads, clicks, typed input with a
//! focus-advance commit, file-input uploads, and network request/response
//! observers for API logging.

pub mod client;
pub mod error;
pub mod fill_target;
pub mod observer;
pub mod page;
pub mod protocol;
pub mod stealth;

pub use client::CdpClient;
pub use error::BrowserError;
pub use fill_target::{find_enabled_button, AspireFillTarget};
pub use observer::{NetworkObserver, RequestEvent, ResponseEvent};
pub use page::{ElementDigest, ElementHandle, PageSession, INTERACTIVE_SELECTOR};
pub use stealth::{stealth_headers, STEALTH_INIT_SCRIPT};
