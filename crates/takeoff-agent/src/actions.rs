//! Scripted initial actions.
//!
//! A flow's login/navigation preamble is a fixed action list executed
//! without the model. Element indices are 1-based positions into the
//! page's interactive elements in DOM order (see
//! [`takeoff_browser::INTERACTIVE_SELECTOR`]); the element list is
//! re-enumerated before every index-addressed action because earlier
//! actions can re-render the page.

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::info;

use takeoff_browser::{ElementHandle, PageSession};

use crate::error::AgentError;

/// One scripted browser action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialAction {
    /// Navigate to a URL and wait for the document to load.
    GoToUrl { url: String },
    /// Flat settle wait.
    Wait { seconds: u64 },
    /// Type text into the interactive element at `index`.
    InputText { index: usize, text: String },
    /// Click the interactive element at `index`.
    ClickElement { index: usize },
}

/// Executes initial actions strictly in order against one page.
pub struct ActionRunner<'a> {
    page: &'a PageSession,
}

impl<'a> ActionRunner<'a> {
    pub fn new(page: &'a PageSession) -> Self {
        Self { page }
    }

    /// Run all actions; the first failure aborts the remainder.
    pub async fn run(&self, actions: &[InitialAction]) -> Result<(), AgentError> {
        for action in actions {
            self.execute(action).await?;
        }
        Ok(())
    }

    /// Run a single action.
    pub async fn execute(&self, action: &InitialAction) -> Result<(), AgentError> {
        match action {
            InitialAction::GoToUrl { url } => {
                info!(url = %url, "navigating");
                self.page.navigate(url).await?;
            }
            InitialAction::Wait { seconds } => {
                info!(seconds, "waiting");
                self.page.wait_ms(seconds * 1000).await;
            }
            InitialAction::InputText { index, text } => {
                let element = self.element_at(*index).await?;
                self.page.fill_element(element, text).await?;
            }
            InitialAction::ClickElement { index } => {
                info!(index, "clicking element");
                let element = self.element_at(*index).await?;
                self.page.click_element(element).await?;
            }
        }
        Ok(())
    }

    /// Resolve a 1-based interactive-element index against the live page.
    async fn element_at(&self, index: usize) -> Result<ElementHandle, AgentError> {
        let elements = self.page.interactive_elements().await?;
        index
            .checked_sub(1)
            .and_then(|i| elements.get(i).copied())
            .ok_or(AgentError::ElementIndex(index))
    }
}
