use clap::{Parser, ValueEnum};

use crate::engine::DemoEngine;

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ActionArg {
    Approve,
    Reject,
}

impl From<ActionArg> for workflow_model::ActionKind {
    fn from(value: ActionArg) -> Self {
        match value {
            ActionArg::Approve => workflow_model::ActionKind::Approve,
            ActionArg::Reject => workflow_model::ActionKind::Reject,
        }
    }
}

/// Approve or reject a pending assignment.
#[derive(Parser, Debug)]
pub struct ProcessAction {
    #[arg(long)]
    pub workflow_instance_id: u64,
    #[arg(long)]
    pub stage_instance_id: u64,
    #[arg(long)]
    pub user_id: u64,
    #[arg(long, value_enum)]
    pub action: ActionArg,
    #[arg(long)]
    pub comment: Option<String>,
}

impl ProcessAction {
    pub async fn run(self, demo: &DemoEngine) -> anyhow::Result<()> {
        demo.engine
            .process_action(
                workflow_model::WorkflowInstanceId(self.workflow_instance_id),
                workflow_model::UserId(self.user_id),
                workflow_model::StageInstanceId(self.stage_instance_id),
                self.action.into(),
                self.comment,
            )
            .await?;
        println!("ok");
        Ok(())
    }
}
