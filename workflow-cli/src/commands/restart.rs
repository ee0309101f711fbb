use clap::Parser;

use crate::engine::DemoEngine;

/// Restart a terminal workflow instance, if its template allows reopening.
#[derive(Parser, Debug)]
pub struct RestartWorkflow {
    #[arg(long)]
    pub workflow_instance_id: u64,
}

impl RestartWorkflow {
    pub async fn run(self, demo: &DemoEngine) -> anyhow::Result<()> {
        let instance = demo
            .engine
            .restart_workflow(workflow_model::WorkflowInstanceId(self.workflow_instance_id))
            .await?;
        println!("{}", serde_json::to_string_pretty(&instance)?);
        Ok(())
    }
}
