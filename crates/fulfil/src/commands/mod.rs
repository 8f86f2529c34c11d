mod plan;
mod run;

use clap::Subcommand;

use crate::error::Result;
use plan::PlanArgs;
use run::RunArgs;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a fulfillment scenario and report how it ended
    Run(RunArgs),
    /// Show the steps of a scenario and how each one is compensated
    Plan(PlanArgs),
}

impl Commands {
    pub(crate) fn execute(self) -> Result<()> {
        match self {
            Self::Run(args) => run::run(args),
            Self::Plan(args) => plan::run(&args),
        }
    }
}
