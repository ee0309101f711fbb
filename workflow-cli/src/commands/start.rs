use clap::Parser;

use crate::engine::DemoEngine;

/// Start a transfer's workflow chain.
#[derive(Parser, Debug)]
pub struct StartWorkflow {
    /// Transfer id to start.
    #[arg(long)]
    pub transfer_id: u64,
}

impl StartWorkflow {
    pub async fn run(self, demo: &DemoEngine) -> anyhow::Result<()> {
        let instance = demo
            .engine
            .start_workflow(workflow_model::TransferId(self.transfer_id))
            .await?;
        println!("{}", serde_json::to_string_pretty(&instance)?);
        Ok(())
    }
}
