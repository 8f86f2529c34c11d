mod formatter;
mod json;
mod plain;

use clap::ValueEnum;

pub(crate) use formatter::{ReportFormatter, RunView};
use json::JsonFormatter;
use plain::PlainTextFormatter;

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable report
    #[default]
    Plain,
    /// Machine-readable JSON report
    Json,
}

impl OutputFormat {
    pub(crate) fn render(self, run: &RunView<'_>) -> Result<String> {
        match self {
            Self::Plain => PlainTextFormatter.format(run),
            Self::Json => JsonFormatter.format(run),
        }
    }
}
