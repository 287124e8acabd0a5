//! Observe → plan → act loop.

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{info, warn};

use takeoff_browser::PageSession;

use crate::actions::{ActionRunner, InitialAction};
use crate::client::{AgentClient, ChatMessage};
use crate::error::AgentError;

/// System prompt for the planning model. Replies must be a single JSON
/// object so the response can be parsed without scraping.
const AGENT_SYSTEM_PROMPT: &str = r#"You are a browser automation agent.
You receive a task and the page's interactive elements as a numbered list.
Reply with a single JSON object of the form:
{"actions": [...], "done": false}
Each action is one of:
{"click_element": {"index": N}}
{"input_text": {"index": N, "text": "..."}}
{"wait": {"seconds": N}}
{"go_to_url": {"url": "..."}}
{"upload_file": {"selector": "css selector of a file input", "path": "..."}}
Indices refer to the numbered element list. Use only listed indices and
only file paths named in the task. Set "done": true once the task is
complete, with an empty action list if nothing remains."#;

/// One action the model may request. A superset of [`InitialAction`] with
/// the registered `upload_file` capability.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentAction {
    GoToUrl { url: String },
    Wait { seconds: u64 },
    InputText { index: usize, text: String },
    ClickElement { index: usize },
    UploadFile { selector: String, path: PathBuf },
}

/// One parsed model reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepPlan {
    #[serde(default)]
    pub actions: Vec<AgentAction>,
    #[serde(default)]
    pub done: bool,
}

/// Result of one agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutcome {
    /// Planning steps consumed.
    pub steps: usize,
    /// Whether the model declared the task complete (as opposed to the
    /// step budget running out).
    pub done: bool,
}

/// LLM-driven agent bound to one page.
pub struct Agent<'a> {
    page: &'a PageSession,
    client: &'a AgentClient,
    max_steps: usize,
    /// Files `upload_file` is allowed to hand to the browser.
    available_file_paths: Vec<PathBuf>,
}

impl<'a> Agent<'a> {
    pub fn new(page: &'a PageSession, client: &'a AgentClient, max_steps: usize) -> Self {
        Self {
            page,
            client,
            max_steps,
            available_file_paths: Vec::new(),
        }
    }

    /// Allow-list of files the model may upload.
    pub fn with_available_file_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.available_file_paths = paths;
        self
    }

    /// Run the task until the model reports done or the step budget is
    /// spent. Individual action failures are reported back to the model on
    /// the next step instead of aborting the run.
    pub async fn run(&self, task: &str) -> Result<AgentOutcome, AgentError> {
        let runner = ActionRunner::new(self.page);
        let mut last_error: Option<String> = None;

        for step in 1..=self.max_steps {
            let observation = self.observe(task, last_error.take()).await?;
            let reply = self
                .client
                .complete(&[ChatMessage::system(AGENT_SYSTEM_PROMPT), observation])
                .await?;
            let plan = parse_plan(&reply)?;

            info!(step, actions = plan.actions.len(), done = plan.done, "agent step");

            for action in &plan.actions {
                if let Err(e) = self.execute(&runner, action).await {
                    warn!(step, error = %e, "agent action failed");
                    last_error = Some(e.to_string());
                    break;
                }
            }

            if plan.done {
                return Ok(AgentOutcome { steps: step, done: true });
            }
        }

        warn!(max_steps = self.max_steps, "agent stopped without completing the task");
        Ok(AgentOutcome {
            steps: self.max_steps,
            done: false,
        })
    }

    /// Build the observation message: task, element digest, last failure.
    async fn observe(
        &self,
        task: &str,
        last_error: Option<String>,
    ) -> Result<ChatMessage, AgentError> {
        let digest = self.page.interactive_digest().await?;
        let mut lines = Vec::with_capacity(digest.len());
        for element in &digest {
            lines.push(format!("[{}] <{}> {}", element.index, element.tag, element.text));
        }

        let mut content = format!(
            "Task:\n{}\n\nInteractive elements:\n{}",
            task,
            lines.join("\n")
        );
        if !self.available_file_paths.is_empty() {
            let paths: Vec<String> = self
                .available_file_paths
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect();
            content.push_str(&format!("\n\nAvailable file paths:\n{}", paths.join("\n")));
        }
        if let Some(error) = last_error {
            content.push_str(&format!("\n\nPrevious action failed: {}", error));
        }

        Ok(ChatMessage::user(content))
    }

    /// Execute one model-requested action.
    async fn execute(&self, runner: &ActionRunner<'_>, action: &AgentAction) -> Result<(), AgentError> {
        match action {
            AgentAction::GoToUrl { url } => {
                runner
                    .execute(&InitialAction::GoToUrl { url: url.clone() })
                    .await
            }
            AgentAction::Wait { seconds } => {
                runner.execute(&InitialAction::Wait { seconds: *seconds }).await
            }
            AgentAction::InputText { index, text } => {
                runner
                    .execute(&InitialAction::InputText {
                        index: *index,
                        text: text.clone(),
                    })
                    .await
            }
            AgentAction::ClickElement { index } => {
                runner
                    .execute(&InitialAction::ClickElement { index: *index })
                    .await
            }
            AgentAction::UploadFile { selector, path } => {
                self.upload_file(selector, path).await
            }
        }
    }

    /// Drive a (possibly hidden) file input, after checking the path is
    /// allow-listed and exists.
    async fn upload_file(&self, selector: &str, path: &PathBuf) -> Result<(), AgentError> {
        validate_upload(&self.available_file_paths, path)?;

        self.page
            .set_file_input(selector, std::slice::from_ref(path))
            .await?;
        info!(selector, path = %path.display(), "file uploaded via selector");
        Ok(())
    }
}

/// Parse a model reply into a step plan.
pub(crate) fn parse_plan(reply: &str) -> Result<StepPlan, AgentError> {
    serde_json::from_str(reply)
        .map_err(|e| AgentError::InvalidResponse(format!("plan parse error: {}", e)))
}

/// Reject uploads of paths the flow never offered, or that do not exist.
pub(crate) fn validate_upload(allowed: &[PathBuf], path: &PathBuf) -> Result<(), AgentError> {
    if !allowed.contains(path) {
        return Err(AgentError::FileNotAllowed(path.display().to_string()));
    }
    if !path.exists() {
        return Err(AgentError::FileNotAllowed(format!(
            "{} does not exist",
            path.display()
        )));
    }
    Ok(())
}
