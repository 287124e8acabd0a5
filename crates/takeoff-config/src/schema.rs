//! Configuration schema.
//!
//! Defaults mirror the selector strings, element indices and settle
//! durations observed on the Aspire screens; anything secret is expected
//! to arrive via `${VAR}` expansion.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aspire: AspireConfig,
    pub llm: LlmConfig,
    pub slack: SlackConfig,
    pub browser: BrowserConfig,
    pub flow: FlowConfig,
}

/// Aspire application endpoints and credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AspireConfig {
    pub login_url: String,
    pub email: String,
    pub password: String,
    pub pin: String,
    pub device_name: String,
    pub property_base_url: String,
    pub property_id: String,
    pub estimation_base_url: String,
    pub estimation_id: String,
}

impl AspireConfig {
    /// Full URL of the property takeoff screen.
    pub fn property_url(&self) -> String {
        format!("{}/{}", self.property_base_url, self.property_id)
    }

    /// Full URL of the estimation screen.
    pub fn estimation_url(&self) -> String {
        format!("{}/{}", self.estimation_base_url, self.estimation_id)
    }
}

/// OpenAI-compatible chat endpoint for the agent, typically fronted by a
/// gateway that authenticates via extra headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Extra request headers (e.g. gateway api/virtual keys).
    pub extra_headers: HashMap<String, String>,
    pub max_steps: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: String::new(),
            api_key: None,
            extra_headers: HashMap::new(),
            max_steps: 10,
        }
    }
}

/// Slack notification channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub token: String,
    pub channel: String,
    pub post_message_url: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel: String::new(),
            post_message_url: "https://slack.com/api/chat.postMessage".to_string(),
        }
    }
}

/// Browser connection and fingerprint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Chrome remote-debugging endpoint.
    pub cdp_endpoint: String,
    /// User agent override; empty keeps the browser default.
    pub user_agent: String,
    /// Extra HTTP headers sent with every request.
    pub extra_headers: HashMap<String, String>,
    /// Inject the anti-automation-detection init script.
    pub stealth: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            cdp_endpoint: "http://localhost:9222".to_string(),
            user_agent: String::new(),
            extra_headers: HashMap::new(),
            stealth: false,
        }
    }
}

/// One scripted navigation click: an interactive-element index plus the
/// settle wait that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationClick {
    pub index: usize,
    pub wait_secs: u64,
}

/// Login form element indices and post-submit settle time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub email_index: usize,
    pub password_index: usize,
    pub pin_index: usize,
    pub device_name_index: usize,
    pub submit_index: usize,
    /// Wait after the login page loads, before typing.
    pub settle_secs: u64,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            email_index: 1,
            password_index: 2,
            pin_index: 3,
            device_name_index: 4,
            submit_index: 6,
            settle_secs: 10,
        }
    }
}

/// Property-flow specific waits and navigation script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFlowConfig {
    pub post_login_wait_secs: u64,
    pub page_load_wait_secs: u64,
    /// Clicks that open the takeoff tab once the property page is up.
    pub navigation_clicks: Vec<NavigationClick>,
}

impl Default for PropertyFlowConfig {
    fn default() -> Self {
        Self {
            post_login_wait_secs: 5,
            page_load_wait_secs: 20,
            navigation_clicks: vec![
                NavigationClick { index: 21, wait_secs: 5 },
                NavigationClick { index: 72, wait_secs: 5 },
                NavigationClick { index: 10, wait_secs: 5 },
            ],
        }
    }
}

/// Estimation-flow specific waits and upload task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationFlowConfig {
    pub post_login_wait_secs: u64,
    pub page_load_wait_secs: u64,
    /// Spreadsheet handed to the import dialog.
    pub upload_file: PathBuf,
}

impl Default for EstimationFlowConfig {
    fn default() -> Self {
        Self {
            post_login_wait_secs: 10,
            page_load_wait_secs: 20,
            upload_file: PathBuf::from("aspire_upload_example.xlsx"),
        }
    }
}

/// Shared flow tuning: selectors, files and fill behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub login: LoginConfig,
    pub property: PropertyFlowConfig,
    pub estimation: EstimationFlowConfig,
    /// Pause after each fill instruction, letting the grid re-render.
    pub fill_delay_ms: u64,
    /// Focus-advance key that commits an edited field: "Tab" or "Enter".
    pub commit_key: String,
    pub row_selector: String,
    pub cell_selector: String,
    pub toggler_selector: String,
    pub numeric_input_selector: String,
    pub save_button_selector: String,
    pub service_items_csv: PathBuf,
    pub takeoff_data_csv: PathBuf,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            login: LoginConfig::default(),
            property: PropertyFlowConfig::default(),
            estimation: EstimationFlowConfig::default(),
            fill_delay_ms: 3000,
            commit_key: "Tab".to_string(),
            row_selector: "tr.ng-star-inserted".to_string(),
            cell_selector: "td".to_string(),
            toggler_selector: "button.p-treetable-toggler".to_string(),
            numeric_input_selector: "input.e-control.e-numerictextbox".to_string(),
            save_button_selector: "button.p-button-success".to_string(),
            service_items_csv: PathBuf::from("takeoff_service_items.csv"),
            takeoff_data_csv: PathBuf::from("takeoff_data.csv"),
        }
    }
}

impl Config {
    /// Reject configurations that cannot possibly log in or notify.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aspire.login_url.is_empty() {
            return Err(ConfigError::Invalid("aspire.login_url is empty".to_string()));
        }
        if self.aspire.email.is_empty() || self.aspire.password.is_empty() {
            return Err(ConfigError::Invalid(
                "aspire login credentials are empty".to_string(),
            ));
        }
        if self.slack.token.is_empty() || self.slack.channel.is_empty() {
            return Err(ConfigError::Invalid(
                "slack token/channel are empty".to_string(),
            ));
        }
        if !matches!(self.flow.commit_key.as_str(), "Tab" | "tab" | "Enter" | "enter") {
            return Err(ConfigError::Invalid(format!(
                "flow.commit_key must be Tab or Enter, got {}",
                self.flow.commit_key
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.aspire.login_url = "https://cloud.example.com/login".to_string();
        config.aspire.email = "bot@example.com".to_string();
        config.aspire.password = "secret".to_string();
        config.slack.token = "xoxb-1".to_string();
        config.slack.channel = "#takeoff".to_string();
        config
    }

    #[test]
    fn defaults_match_observed_screen_values() {
        let config = Config::default();
        assert_eq!(config.flow.row_selector, "tr.ng-star-inserted");
        assert_eq!(config.flow.toggler_selector, "button.p-treetable-toggler");
        assert_eq!(config.flow.fill_delay_ms, 3000);
        assert_eq!(config.flow.login.submit_index, 6);
        assert_eq!(config.flow.property.navigation_clicks.len(), 3);
        assert_eq!(config.flow.estimation.post_login_wait_secs, 10);
        assert_eq!(config.llm.max_steps, 10);
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_credentials() {
        let mut config = valid();
        config.aspire.password.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_commit_key() {
        let mut config = valid();
        config.flow.commit_key = "Escape".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn urls_join_base_and_id() {
        let mut config = Config::default();
        config.aspire.property_base_url = "https://cloud.example.com/properties".to_string();
        config.aspire.property_id = "123".to_string();
        assert_eq!(
            config.aspire.property_url(),
            "https://cloud.example.com/properties/123"
        );
    }
}
