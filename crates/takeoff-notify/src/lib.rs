//! Slack progress notifications.
//!
//! One-way, fire-and-forget: a failed delivery is logged locally and never
//! surfaces to the flow that sent it.

mod slack;

pub use slack::{NotifyError, SlackNotifier};
