use fulfil_saga::{SagaOutcome, StepRecord};
use fulfil_steps::Effect;
use serde::Serialize;

use super::{ReportFormatter, RunView};
use crate::error::Result;

pub(crate) struct JsonFormatter;

#[derive(Serialize)]
struct JsonReport<'a> {
    order_id: &'a str,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<JsonFailure>,
    steps: Vec<JsonStep<'a>>,
    effects: &'a [Effect],
}

#[derive(Serialize)]
struct JsonFailure {
    step: String,
    error: String,
    compensation_failures: Vec<JsonCompensationFailure>,
}

#[derive(Serialize)]
struct JsonCompensationFailure {
    step: String,
    description: String,
    error: String,
}

#[derive(Serialize)]
struct JsonStep<'a> {
    name: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    compensation: Option<&'a str>,
}

impl<'a> From<&'a StepRecord> for JsonStep<'a> {
    fn from(record: &'a StepRecord) -> Self {
        Self {
            name: &record.name,
            status: record.status.as_str(),
            compensation: record.compensation_description.as_deref(),
        }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, run: &RunView<'_>) -> Result<String> {
        let failure = match &run.report.outcome {
            SagaOutcome::Succeeded => None,
            SagaOutcome::Failed(err) => Some(JsonFailure {
                step: err.failed_step().to_string(),
                error: err.step_error().to_string(),
                compensation_failures: err
                    .compensation_errors()
                    .iter()
                    .map(|failure| JsonCompensationFailure {
                        step: failure.step.clone(),
                        description: failure.description.clone(),
                        error: failure.error.to_string(),
                    })
                    .collect(),
            }),
        };

        let report = JsonReport {
            order_id: &run.order.id,
            success: run.report.is_success(),
            failure,
            steps: run
                .report
                .audit_log
                .records()
                .iter()
                .map(JsonStep::from)
                .collect(),
            effects: run.journal,
        };

        Ok(serde_json::to_string_pretty(&report)?)
    }
}
