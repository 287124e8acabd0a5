//! Estimation flow: hand the import dialog to the LLM agent.

use tracing::{info, warn};

use takeoff_agent::{ActionRunner, Agent, AgentClient, InitialAction};
use takeoff_browser::PageSession;
use takeoff_config::Config;

use super::{login_actions, notifier};

pub(super) async fn run(config: &Config, page: &PageSession) -> anyhow::Result<()> {
    let slack = notifier(config);
    let flow = &config.flow;
    slack.notify("Estimation import run started.").await;

    let runner = ActionRunner::new(page);
    runner.run(&login_actions(config)).await?;
    page.wait_ms(flow.estimation.post_login_wait_secs * 1000).await;

    runner
        .execute(&InitialAction::GoToUrl {
            url: config.aspire.estimation_url(),
        })
        .await?;
    page.wait_ms(flow.estimation.page_load_wait_secs * 1000).await;

    let upload_file = flow.estimation.upload_file.clone();
    let client = AgentClient::new(config.llm.api_url.clone(), config.llm.model.clone())
        .with_api_key(config.llm.api_key.as_deref())
        .with_extra_headers(config.llm.extra_headers.clone());
    let agent = Agent::new(page, &client, config.llm.max_steps)
        .with_available_file_paths(vec![upload_file.clone()]);

    let task = format!(
        "You are on an estimation screen of a property management application. \
         Open the import dialog for estimation items, upload the spreadsheet at {} \
         into the file input of that dialog, and confirm the import. \
         The screen is done once the imported items appear in the estimation table.",
        upload_file.display()
    );
    let outcome = agent.run(&task).await?;

    if outcome.done {
        info!(steps = outcome.steps, "estimation import completed");
        slack
            .notify(&format!(
                "Estimation import finished in {} agent step(s).",
                outcome.steps
            ))
            .await;
    } else {
        warn!(steps = outcome.steps, "agent ran out of steps before finishing the import");
        slack
            .notify(&format!(
                "Estimation import did not finish within {} agent steps; check the screen.",
                outcome.steps
            ))
            .await;
    }

    Ok(())
}
