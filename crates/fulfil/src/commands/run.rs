use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use fulfil_saga::{SagaCoordinator, SagaOutcome};
use fulfil_steps::{FulfillmentContext, StepKind, fulfillment_saga};
use tracing::info;

use crate::config::{self, Scenario};
use crate::error::Result;
use crate::output::{OutputFormat, RunView};

#[derive(Args)]
pub(crate) struct RunArgs {
    /// Scenario file (TOML); a built-in order is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Steps to run, in order (comma-separated); overrides the scenario
    #[arg(long, value_delimiter = ',')]
    steps: Option<Vec<StepKind>>,

    /// Make this step fail when it executes
    #[arg(long)]
    fail_at: Option<StepKind>,

    /// Make this step fail when it is compensated
    #[arg(long)]
    fail_compensation_at: Option<StepKind>,

    /// Report format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

impl RunArgs {
    fn apply(&self, scenario: &mut Scenario) {
        if let Some(steps) = &self.steps {
            scenario.steps.clone_from(steps);
        }
        if self.fail_at.is_some() {
            scenario.fail_at = self.fail_at;
        }
        if self.fail_compensation_at.is_some() {
            scenario.fail_compensation_at = self.fail_compensation_at;
        }
    }
}

pub(crate) fn run(args: RunArgs) -> Result<()> {
    let mut scenario = config::resolve(args.config.as_deref())?;
    args.apply(&mut scenario);

    let backend = Arc::new(scenario.backend());
    let ctx = FulfillmentContext::from_backend(&backend);
    let mut coordinator = SagaCoordinator::new(fulfillment_saga(&scenario.order, &scenario.steps));

    info!(order = %scenario.order.id, steps = scenario.steps.len(), "running fulfillment");
    let report = coordinator.run(&ctx);
    let journal = backend.journal();

    let view = RunView {
        order: &scenario.order,
        report: &report,
        journal: &journal,
    };
    let rendered = args.format.render(&view)?;
    println!("{}", rendered.trim_end());

    match report.outcome {
        SagaOutcome::Succeeded => Ok(()),
        SagaOutcome::Failed(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            steps: None,
            fail_at: None,
            fail_compensation_at: None,
            format: OutputFormat::Plain,
        }
    }

    #[test]
    fn flags_override_scenario() {
        let mut scenario = Scenario {
            fail_at: Some(StepKind::Payment),
            ..Scenario::default()
        };
        let args = RunArgs {
            steps: Some(vec![StepKind::Order, StepKind::Delivery]),
            fail_at: Some(StepKind::Delivery),
            fail_compensation_at: Some(StepKind::Order),
            ..args()
        };

        args.apply(&mut scenario);

        assert_eq!(scenario.steps, [StepKind::Order, StepKind::Delivery]);
        assert_eq!(scenario.fail_at, Some(StepKind::Delivery));
        assert_eq!(scenario.fail_compensation_at, Some(StepKind::Order));
    }

    #[test]
    fn absent_flags_keep_scenario_values() {
        let mut scenario = Scenario {
            fail_at: Some(StepKind::Inventory),
            ..Scenario::default()
        };

        args().apply(&mut scenario);

        assert_eq!(scenario.steps, StepKind::ALL);
        assert_eq!(scenario.fail_at, Some(StepKind::Inventory));
        assert!(scenario.fail_compensation_at.is_none());
    }

    #[test]
    fn default_scenario_runs_successfully() {
        assert!(run(args()).is_ok());
    }

    #[test]
    fn injected_failure_surfaces_as_error() {
        let result = run(RunArgs {
            fail_at: Some(StepKind::Inventory),
            ..args()
        });

        assert!(matches!(
            result,
            Err(crate::error::CliError::SagaFailed { ref step, .. }) if step == "inventory"
        ));
    }
}
