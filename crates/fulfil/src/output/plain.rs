use fulfil_saga::SagaOutcome;

use super::{ReportFormatter, RunView};
use crate::error::Result;

pub(crate) struct PlainTextFormatter;

impl PlainTextFormatter {
    fn format_header(output: &mut String, run: &RunView<'_>) {
        let order = run.order;
        output.push_str(&format!(
            "Order '{}' for {}: {} cents, {} x '{}' to {}\n",
            order.id, order.customer, order.amount_cents, order.quantity, order.sku, order.address
        ));
    }

    fn format_steps(output: &mut String, run: &RunView<'_>) {
        let summary = run.report.audit_log.summary();
        if summary.is_empty() {
            output.push_str("\nNo steps were run.\n");
            return;
        }

        output.push_str("\nSteps:\n");
        for line in summary.lines() {
            output.push_str(&format!("  {line}\n"));
        }
    }

    fn format_effects(output: &mut String, run: &RunView<'_>) {
        if run.journal.is_empty() {
            return;
        }

        output.push_str("\nEffects:\n");
        for effect in run.journal {
            output.push_str(&format!("  {effect}\n"));
        }
    }

    fn format_outcome(output: &mut String, run: &RunView<'_>) {
        match &run.report.outcome {
            SagaOutcome::Succeeded => output.push_str("\nSaga executed successfully.\n"),
            SagaOutcome::Failed(err) => {
                output.push_str(&format!(
                    "\nSaga execution failed: {}\n",
                    err.step_error()
                ));
                let failures = err.compensation_errors();
                if !failures.is_empty() {
                    output.push_str("Compensations that failed:\n");
                    for failure in failures {
                        output.push_str(&format!(
                            "  {} ({}): {}\n",
                            failure.step, failure.description, failure.error
                        ));
                    }
                }
            }
        }
    }
}

impl ReportFormatter for PlainTextFormatter {
    fn format(&self, run: &RunView<'_>) -> Result<String> {
        let mut output = String::new();
        Self::format_header(&mut output, run);
        Self::format_steps(&mut output, run);
        Self::format_effects(&mut output, run);
        Self::format_outcome(&mut output, run);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fulfil_saga::SagaCoordinator;
    use fulfil_steps::{
        BackendSettings, FulfillmentContext, InMemoryBackend, OrderRequest, StepKind,
        standard_saga,
    };

    use super::*;

    fn order() -> OrderRequest {
        OrderRequest {
            id: "ORD-1".to_string(),
            customer: "ada".to_string(),
            amount_cents: 250,
            sku: "WIDGET-7".to_string(),
            quantity: 2,
            address: "12 Analytical Row".to_string(),
        }
    }

    fn render(backend: InMemoryBackend) -> anyhow::Result<String> {
        let backend = Arc::new(backend);
        let ctx = FulfillmentContext::from_backend(&backend);
        let order = order();
        let report = SagaCoordinator::new(standard_saga(&order)).run(&ctx);
        let journal = backend.journal();

        let view = RunView {
            order: &order,
            report: &report,
            journal: &journal,
        };
        Ok(PlainTextFormatter.format(&view)?)
    }

    #[test]
    fn successful_run_lists_steps_and_effects() -> anyhow::Result<()> {
        let output = render(InMemoryBackend::new(
            BackendSettings::default().with_stock("WIDGET-7", 5),
        ))?;

        assert!(output.contains("Order 'ORD-1' for ada"));
        assert!(output.contains("  ✓ payment\n"));
        assert!(output.contains("  ✓ delivery\n"));
        assert!(output.contains("  charged 250 cents for order 'ORD-1'\n"));
        assert!(output.ends_with("Saga executed successfully.\n"));
        Ok(())
    }

    #[test]
    fn failed_run_shows_compensations_and_cause() -> anyhow::Result<()> {
        let output = render(
            InMemoryBackend::new(BackendSettings::default().with_stock("WIDGET-7", 5))
                .with_failure(StepKind::Delivery),
        )?;

        assert!(output.contains("  ↩ payment\n"));
        assert!(output.contains("  ✗ delivery\n"));
        assert!(output.contains("  released 2 x 'WIDGET-7'\n"));
        assert!(output.contains("Saga execution failed: delivery step failed: injected failure"));
        assert!(!output.contains("Compensations that failed"));
        Ok(())
    }

    #[test]
    fn failed_compensation_is_listed() -> anyhow::Result<()> {
        let output = render(
            InMemoryBackend::new(BackendSettings::default().with_stock("WIDGET-7", 5))
                .with_failure(StepKind::Inventory)
                .with_reversal_failure(StepKind::Payment),
        )?;

        assert!(output.contains("  ⚠ payment\n"));
        assert!(output.contains("Compensations that failed:\n"));
        assert!(output.contains(
            "  payment (refund 250 cents for order 'ORD-1'): could not reverse payment step: injected failure"
        ));
        Ok(())
    }
}
