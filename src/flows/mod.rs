//! Flow orchestration.
//!
//! Both flows share the same shell: open a page on the running Chrome,
//! apply fingerprint settings, run the scripted login, do the flow's work,
//! and close the page whatever happened. Teardown failures are logged on
//! their own so they never mask the error that ended the flow.

mod estimation;
mod property;

use std::sync::Arc;

use tracing::{info, warn};

use takeoff_agent::InitialAction;
use takeoff_browser::{stealth_headers, CdpClient, PageSession, STEALTH_INIT_SCRIPT};
use takeoff_config::Config;
use takeoff_notify::SlackNotifier;

use crate::netlog::ApiLogRecorder;

pub async fn run_property(config: &Config, capture_api_log: bool) -> anyhow::Result<()> {
    let session = FlowSession::open(config, capture_api_log).await?;
    let result = property::run(config, &session.page).await;
    session.close().await;
    result
}

pub async fn run_estimation(config: &Config, capture_api_log: bool) -> anyhow::Result<()> {
    let session = FlowSession::open(config, capture_api_log).await?;
    let result = estimation::run(config, &session.page).await;
    session.close().await;
    result
}

/// One browser page plus the client that owns it.
struct FlowSession {
    client: CdpClient,
    page: PageSession,
}

impl FlowSession {
    /// Connect to Chrome, open a fresh page, and apply the configured
    /// fingerprint (init script, user agent, extra headers) before any
    /// navigation happens.
    async fn open(config: &Config, capture_api_log: bool) -> anyhow::Result<Self> {
        let client = CdpClient::connect(&config.browser.cdp_endpoint).await?;
        let page = client.new_page(None).await?;

        if config.browser.stealth {
            page.add_init_script(STEALTH_INIT_SCRIPT).await?;
        }
        if !config.browser.user_agent.is_empty() {
            page.set_user_agent(&config.browser.user_agent).await?;
        }

        let mut headers = config.browser.extra_headers.clone();
        if config.browser.stealth {
            headers.extend(stealth_headers());
        }
        if !headers.is_empty() {
            page.set_extra_headers(&headers).await?;
        }

        if capture_api_log {
            let path = format!(
                "api_logs_{}.txt",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            );
            let recorder = ApiLogRecorder::create(&path)?;
            info!(path = %recorder.path().display(), "recording page API traffic");
            page.add_observer(Arc::new(recorder));
        }

        Ok(Self { client, page })
    }

    /// Best-effort teardown.
    async fn close(self) {
        if let Err(e) = self.client.close_page(self.page.target_id()).await {
            warn!(error = %e, "failed to close page during teardown");
        }
    }
}

/// The scripted login preamble shared by both flows.
fn login_actions(config: &Config) -> Vec<InitialAction> {
    let login = &config.flow.login;
    let aspire = &config.aspire;
    vec![
        InitialAction::GoToUrl {
            url: aspire.login_url.clone(),
        },
        InitialAction::Wait {
            seconds: login.settle_secs,
        },
        InitialAction::InputText {
            index: login.email_index,
            text: aspire.email.clone(),
        },
        InitialAction::InputText {
            index: login.password_index,
            text: aspire.password.clone(),
        },
        InitialAction::InputText {
            index: login.pin_index,
            text: aspire.pin.clone(),
        },
        InitialAction::InputText {
            index: login.device_name_index,
            text: aspire.device_name.clone(),
        },
        InitialAction::ClickElement {
            index: login.submit_index,
        },
    ]
}

fn notifier(config: &Config) -> SlackNotifier {
    SlackNotifier::new(
        config.slack.token.clone(),
        config.slack.channel.clone(),
        config.slack.post_message_url.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.aspire.login_url = "https://cloud.example.com/login".to_string();
        config.aspire.email = "bot@example.com".to_string();
        config.aspire.password = "secret".to_string();
        config.aspire.pin = "1234".to_string();
        config.aspire.device_name = "takeoff-bot".to_string();
        config
    }

    #[test]
    fn login_script_covers_all_form_fields_then_submits() {
        let actions = login_actions(&config());
        assert_eq!(actions.len(), 7);
        assert_eq!(
            actions[0],
            InitialAction::GoToUrl {
                url: "https://cloud.example.com/login".to_string()
            }
        );
        assert_eq!(actions[1], InitialAction::Wait { seconds: 10 });
        assert_eq!(
            actions[2],
            InitialAction::InputText {
                index: 1,
                text: "bot@example.com".to_string()
            }
        );
        assert_eq!(actions[6], InitialAction::ClickElement { index: 6 });
    }
}
