use clap::Parser;

use crate::engine::DemoEngine;

/// Cancel a workflow instance outright.
#[derive(Parser, Debug)]
pub struct CancelWorkflow {
    #[arg(long)]
    pub workflow_instance_id: u64,
}

impl CancelWorkflow {
    pub async fn run(self, demo: &DemoEngine) -> anyhow::Result<()> {
        demo.engine
            .cancel_workflow(workflow_model::WorkflowInstanceId(self.workflow_instance_id))
            .await?;
        println!("ok");
        Ok(())
    }
}
