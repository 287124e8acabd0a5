//! Live-page implementation of the fill pass collaborator.

use async_trait::async_trait;
use takeoff_core::{CommitKey, CoreError, FieldRef, FillTarget};

use crate::error::BrowserError;
use crate::page::{ElementHandle, PageSession};

/// [`FillTarget`] over a live takeoff grid.
///
/// Rows are matched by rendered-text substring against `row_selector`
/// matches; candidate fields are the numeric inputs inside every matching
/// row, in DOM order across the whole match set.
pub struct AspireFillTarget<'a> {
    page: &'a PageSession,
    row_selector: String,
    input_selector: String,
    commit_key: CommitKey,
}

impl<'a> AspireFillTarget<'a> {
    pub fn new(
        page: &'a PageSession,
        row_selector: impl Into<String>,
        input_selector: impl Into<String>,
        commit_key: CommitKey,
    ) -> Self {
        Self {
            page,
            row_selector: row_selector.into(),
            input_selector: input_selector.into(),
            commit_key,
        }
    }
}

fn target_err(e: BrowserError) -> CoreError {
    CoreError::Target(e.to_string())
}

#[async_trait]
impl FillTarget for AspireFillTarget<'_> {
    async fn candidate_fields(&self, item_label: &str) -> Result<Vec<FieldRef>, CoreError> {
        let rows = self
            .page
            .query_selector_all(&self.row_selector)
            .await
            .map_err(target_err)?;

        let mut fields = Vec::new();
        for row in rows {
            let text = self.page.text_content(row).await.map_err(target_err)?;
            if !text.contains(item_label) {
                continue;
            }
            let inputs = self
                .page
                .query_selector_all_from(row, &self.input_selector)
                .await
                .map_err(target_err)?;
            fields.extend(inputs.into_iter().map(|input| FieldRef(input.0)));
        }

        Ok(fields)
    }

    async fn is_visible(&self, field: &FieldRef) -> Result<bool, CoreError> {
        self.page
            .is_visible(ElementHandle(field.0))
            .await
            .map_err(target_err)
    }

    async fn write_and_commit(&self, field: &FieldRef, value: &str) -> Result<(), CoreError> {
        self.page
            .fill_and_commit(ElementHandle(field.0), value, self.commit_key.key_name())
            .await
            .map_err(target_err)
    }
}

/// Find the first visible, enabled button matching `selector` whose text
/// contains `label`. Used for the terminal Save click, which must not fire
/// while the host page keeps the button disabled.
pub async fn find_enabled_button(
    page: &PageSession,
    selector: &str,
    label: &str,
) -> Result<Option<ElementHandle>, BrowserError> {
    let buttons = page.query_selector_all(selector).await?;
    for button in buttons {
        let text = page.text_content(button).await?;
        if !text.contains(label) {
            continue;
        }
        if page.get_attribute(button, "disabled").await?.is_some() {
            continue;
        }
        if page.is_visible(button).await? {
            return Ok(Some(button));
        }
    }
    Ok(None)
}
