//! Fill pass: write takeoff values into the live takeoff screen.
//!
//! The filler never talks to a browser directly; it drives a [`FillTarget`]
//! so the pass can be exercised against a fake target in tests and against
//! a CDP-backed page in production.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::FillInstruction;

/// Keystroke used to commit an edited field and move focus away.
///
/// The host application only registers a value once focus leaves the
/// input, so every write ends with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitKey {
    Tab,
    Enter,
}

impl CommitKey {
    /// DOM key name for the keyboard event.
    pub fn key_name(self) -> &'static str {
        match self {
            CommitKey::Tab => "Tab",
            CommitKey::Enter => "Enter",
        }
    }
}

impl FromStr for CommitKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tab" | "tab" => Ok(CommitKey::Tab),
            "Enter" | "enter" => Ok(CommitKey::Enter),
            other => Err(CoreError::UnknownCommitKey(other.to_string())),
        }
    }
}

/// Opaque handle to an editable field, meaningful only to the target that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef(pub i64);

/// Collaborator surface the fill pass writes through.
#[async_trait]
pub trait FillTarget: Send + Sync {
    /// Editable numeric fields inside rows whose rendered text contains
    /// `item_label` (substring, case-sensitive), in DOM order across the
    /// whole match set.
    async fn candidate_fields(&self, item_label: &str) -> Result<Vec<FieldRef>, CoreError>;

    /// Whether the field currently has layout (is rendered and visible).
    async fn is_visible(&self, field: &FieldRef) -> Result<bool, CoreError>;

    /// Clear the field, type `value`, and commit via the focus-advance key.
    async fn write_and_commit(&self, field: &FieldRef, value: &str) -> Result<(), CoreError>;
}

/// Outcome of one fill pass, for logs and the progress notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Item labels that were written and committed.
    pub filled: Vec<String>,
    /// Item labels with no visible editable field (silently skipped).
    pub skipped: Vec<String>,
    /// Instructions that failed with a target error (logged, run continued).
    pub failed: usize,
}

/// Writes fill instructions into a [`FillTarget`], strictly in input order.
#[derive(Debug, Clone)]
pub struct FieldFiller {
    /// Pause after every instruction so the host UI can settle/re-render.
    pub delay: Duration,
}

impl FieldFiller {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Run all instructions against `target`.
    ///
    /// Instructions are never retried or reordered. An instruction with no
    /// visible editable field is skipped without error; a target failure is
    /// logged and the pass continues with the next instruction. The settle
    /// delay applies after every instruction, including skipped ones.
    pub async fn fill(
        &self,
        instructions: &[FillInstruction],
        target: &dyn FillTarget,
    ) -> FillReport {
        let mut report = FillReport::default();

        for instruction in instructions {
            debug!(
                item = %instruction.service_item_type,
                value = %instruction.value,
                "processing fill instruction"
            );

            match self.apply(instruction, target).await {
                Ok(true) => report.filled.push(instruction.service_item_type.clone()),
                Ok(false) => {
                    warn!(
                        item = %instruction.service_item_type,
                        "no visible editable field found; instruction skipped"
                    );
                    report.skipped.push(instruction.service_item_type.clone());
                }
                Err(e) => {
                    warn!(
                        item = %instruction.service_item_type,
                        error = %e,
                        "fill instruction failed"
                    );
                    report.failed += 1;
                }
            }

            tokio::time::sleep(self.delay).await;
        }

        report
    }

    /// Write one instruction. Returns `Ok(false)` when no visible field
    /// exists in the match set.
    async fn apply(
        &self,
        instruction: &FillInstruction,
        target: &dyn FillTarget,
    ) -> Result<bool, CoreError> {
        let fields = target
            .candidate_fields(&instruction.service_item_type)
            .await?;

        for field in &fields {
            if target.is_visible(field).await? {
                target.write_and_commit(field, &instruction.value).await?;
                debug!(
                    item = %instruction.service_item_type,
                    value = %instruction.value,
                    "value written and committed"
                );
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
#[path = "fill_tests.rs"]
mod tests;
