use fulfil_saga::SagaReport;
use fulfil_steps::{Effect, ExecutionError, OrderRequest};

use crate::error::Result;

/// Everything a report shows about one fulfillment run.
pub(crate) struct RunView<'a> {
    pub(crate) order: &'a OrderRequest,
    pub(crate) report: &'a SagaReport<ExecutionError>,
    pub(crate) journal: &'a [Effect],
}

pub(crate) trait ReportFormatter {
    fn format(&self, run: &RunView<'_>) -> Result<String>;
}
