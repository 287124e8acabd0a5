//! Property flow: extract the takeoff tree table, then fill takeoff
//! values back into it.

use std::time::Duration;

use tracing::{info, warn};

use takeoff_agent::{ActionRunner, InitialAction};
use takeoff_browser::{find_enabled_button, AspireFillTarget, BrowserError, PageSession};
use takeoff_config::{Config, FlowConfig};
use takeoff_core::{
    extract_service_items, read_fill_instructions, write_service_items, CommitKey, FieldFiller,
    TableRow,
};

use super::{login_actions, notifier};

pub(super) async fn run(config: &Config, page: &PageSession) -> anyhow::Result<()> {
    let slack = notifier(config);
    let flow = &config.flow;
    slack.notify("Property takeoff run started.").await;

    let runner = ActionRunner::new(page);
    runner.run(&login_actions(config)).await?;
    page.wait_ms(flow.property.post_login_wait_secs * 1000).await;

    runner
        .execute(&InitialAction::GoToUrl {
            url: config.aspire.property_url(),
        })
        .await?;
    page.wait_ms(flow.property.page_load_wait_secs * 1000).await;

    // Clicks that open the takeoff tab; indices and waits come from config.
    for click in &flow.property.navigation_clicks {
        runner
            .execute(&InitialAction::ClickElement { index: click.index })
            .await?;
        page.wait_ms(click.wait_secs * 1000).await;
    }

    let rows = snapshot_rows(page, flow).await?;
    let records = extract_service_items(&rows);
    info!(rows = rows.len(), records = records.len(), "tree table extracted");

    write_service_items(&flow.service_items_csv, &records)?;
    slack
        .notify(&format!(
            "Extracted {} service items to {}.",
            records.len(),
            flow.service_items_csv.display()
        ))
        .await;

    let instructions = read_fill_instructions(&flow.takeoff_data_csv)?;
    let commit_key: CommitKey = flow.commit_key.parse()?;
    let target = AspireFillTarget::new(
        page,
        flow.row_selector.as_str(),
        flow.numeric_input_selector.as_str(),
        commit_key,
    );
    let filler = FieldFiller::new(Duration::from_millis(flow.fill_delay_ms));
    let report = filler.fill(&instructions, &target).await;
    info!(
        filled = report.filled.len(),
        skipped = report.skipped.len(),
        failed = report.failed,
        "fill pass finished"
    );

    // Save only fires once the host page enables the button.
    match find_enabled_button(page, &flow.save_button_selector, "Save").await? {
        Some(button) => {
            page.click_element(button).await?;
            info!("save clicked");
        }
        None => warn!("no enabled Save button found, filled values were not saved"),
    }

    slack
        .notify(&format!(
            "Takeoff fill finished: {} filled, {} skipped, {} failed.",
            report.filled.len(),
            report.skipped.len(),
            report.failed
        ))
        .await;

    Ok(())
}

/// Snapshot the tree table into rows: first cell is the label, second the
/// measurement, and the toggler's inline style carries the nesting level.
/// Rows without data cells (headers, spacers) are skipped.
async fn snapshot_rows(
    page: &PageSession,
    flow: &FlowConfig,
) -> Result<Vec<TableRow>, BrowserError> {
    let row_nodes = page.query_selector_all(&flow.row_selector).await?;
    let mut rows = Vec::with_capacity(row_nodes.len());

    for node in row_nodes {
        let cells = page.query_selector_all_from(node, &flow.cell_selector).await?;
        let Some(first) = cells.first() else {
            continue;
        };
        let label = page.text_content(*first).await?;
        let secondary = match cells.get(1) {
            Some(cell) => page.text_content(*cell).await?,
            None => String::new(),
        };

        let togglers = page
            .query_selector_all_from(node, &flow.toggler_selector)
            .await?;
        let toggler_style = match togglers.first() {
            Some(toggler) => page.get_attribute(*toggler, "style").await?,
            None => None,
        };

        rows.push(TableRow::from_cells(label, secondary, toggler_style.as_deref()));
    }

    Ok(rows)
}
