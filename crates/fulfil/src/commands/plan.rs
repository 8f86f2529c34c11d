use std::path::PathBuf;

use clap::Args;
use fulfil_saga::SagaStep;
use fulfil_steps::step_for;

use crate::config::{self, Scenario};
use crate::error::Result;

#[derive(Args)]
pub(crate) struct PlanArgs {
    /// Scenario file (TOML); a built-in order is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub(crate) fn run(args: &PlanArgs) -> Result<()> {
    let scenario = config::resolve(args.config.as_deref())?;
    print!("{}", render_plan(&scenario));
    Ok(())
}

fn render_plan(scenario: &Scenario) -> String {
    if scenario.steps.is_empty() {
        return format!("No steps planned for order '{}'.\n", scenario.order.id);
    }

    let mut output = format!("Fulfillment plan for order '{}':\n", scenario.order.id);
    for (index, &kind) in scenario.steps.iter().enumerate() {
        let step = step_for(kind, &scenario.order);
        output.push_str(&format!(
            "  {}. {:<9} on failure: {}\n",
            index + 1,
            step.name(),
            step.compensation_description()
        ));
    }
    output
}
