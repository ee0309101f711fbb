pub mod action;
pub mod cancel;
pub mod delegate;
pub mod restart;
pub mod start;
pub mod visibility;

use clap::Subcommand;

use crate::engine::DemoEngine;

#[derive(Subcommand, Debug)]
pub enum Command {
    Start(start::StartWorkflow),
    Action(action::ProcessAction),
    Delegate(delegate::Delegate),
    Cancel(cancel::CancelWorkflow),
    Restart(restart::RestartWorkflow),
    ListPending(visibility::ListPending),
    ListHistory(visibility::ListHistory),
}

impl Command {
    pub async fn run(self, demo: &DemoEngine) -> anyhow::Result<()> {
        match self {
            Command::Start(cmd) => cmd.run(demo).await,
            Command::Action(cmd) => cmd.run(demo).await,
            Command::Delegate(cmd) => cmd.run(demo).await,
            Command::Cancel(cmd) => cmd.run(demo).await,
            Command::Restart(cmd) => cmd.run(demo).await,
            Command::ListPending(cmd) => cmd.run(demo).await,
            Command::ListHistory(cmd) => cmd.run(demo).await,
        }
    }
}
