use clap::Parser;

use crate::engine::DemoEngine;

/// Delegate a pending assignment to another user.
#[derive(Parser, Debug)]
pub struct Delegate {
    #[arg(long)]
    pub workflow_instance_id: u64,
    #[arg(long)]
    pub stage_instance_id: u64,
    #[arg(long)]
    pub from_user: u64,
    #[arg(long)]
    pub to_user: u64,
    #[arg(long)]
    pub comment: Option<String>,
}

impl Delegate {
    pub async fn run(self, demo: &DemoEngine) -> anyhow::Result<()> {
        demo.engine
            .delegate(
                workflow_model::WorkflowInstanceId(self.workflow_instance_id),
                workflow_model::StageInstanceId(self.stage_instance_id),
                workflow_model::UserId(self.from_user),
                workflow_model::UserId(self.to_user),
                self.comment,
            )
            .await?;
        println!("ok");
        Ok(())
    }
}
