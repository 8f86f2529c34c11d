use std::fs;
use std::path::Path;

use fulfil_steps::{BackendSettings, InMemoryBackend, OrderRequest, StepKind};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, Result};

/// A fulfillment run: the order, the steps to run, and the simulated backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default = "default_steps")]
    pub(crate) steps: Vec<StepKind>,
    pub(crate) fail_at: Option<StepKind>,
    pub(crate) fail_compensation_at: Option<StepKind>,
    pub(crate) order: OrderRequest,
    #[serde(default)]
    pub(crate) backend: BackendSettings,
}

fn default_steps() -> Vec<StepKind> {
    StepKind::ALL.to_vec()
}

impl Default for Scenario {
    fn default() -> Self {
        let order = OrderRequest {
            id: "ORD-1001".to_string(),
            customer: "ada".to_string(),
            amount_cents: 4_999,
            sku: "WIDGET-7".to_string(),
            quantity: 2,
            address: "12 Analytical Row".to_string(),
        };
        let backend = BackendSettings::default().with_stock(order.sku.clone(), 10);

        Self {
            steps: default_steps(),
            fail_at: None,
            fail_compensation_at: None,
            order,
            backend,
        }
    }
}

impl Scenario {
    /// Build the in-memory backend this scenario describes.
    pub(crate) fn backend(&self) -> InMemoryBackend {
        let mut backend = InMemoryBackend::new(self.backend.clone());
        if let Some(kind) = self.fail_at {
            backend = backend.with_failure(kind);
        }
        if let Some(kind) = self.fail_compensation_at {
            backend = backend.with_reversal_failure(kind);
        }
        backend
    }
}

/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid scenario.
pub(crate) fn load(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    let scenario: Scenario = toml::from_str(&content).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        path = %path.display(),
        order = %scenario.order.id,
        steps = scenario.steps.len(),
        "loaded scenario"
    );
    Ok(scenario)
}

/// Load the scenario at `path`, or the built-in one when no path is given.
///
/// # Errors
///
/// Returns an error if a given file cannot be loaded.
pub(crate) fn resolve(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(path) => load(path),
        None => Ok(Scenario::default()),
    }
}
