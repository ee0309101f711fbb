use clap::Parser;

use crate::engine::DemoEngine;

/// List a user's pending approvals.
#[derive(Parser, Debug)]
pub struct ListPending {
    #[arg(long)]
    pub user_id: u64,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

impl ListPending {
    pub async fn run(self, demo: &DemoEngine) -> anyhow::Result<()> {
        let page = workflow_engine::list_pending_for_user(
            demo.engine.instances.as_ref(),
            workflow_model::UserId(self.user_id),
            self.page,
            demo.engine.config.default_page_size,
        )
        .await;
        println!("{}", serde_json::to_string_pretty(&page)?);
        Ok(())
    }
}

/// List a user's approval history.
#[derive(Parser, Debug)]
pub struct ListHistory {
    #[arg(long)]
    pub user_id: u64,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

impl ListHistory {
    pub async fn run(self, demo: &DemoEngine) -> anyhow::Result<()> {
        let page = workflow_engine::list_history_for_user(
            demo.engine.instances.as_ref(),
            workflow_model::UserId(self.user_id),
            self.page,
            demo.engine.config.default_page_size,
        )
        .await;
        println!("{}", serde_json::to_string_pretty(&page)?);
        Ok(())
    }
}
