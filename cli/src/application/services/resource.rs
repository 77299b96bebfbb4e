//! Resource-level entry points: validate a configuration, apply it to a host.
//!
//! These are what a host orchestration runtime calls once per target.
//! Imports only from `crate::domain` and `crate::application`.

use anyhow::Result;
use serde::Serialize;

use crate::application::ports::{Communicator, OutputSink, PathResolver};
use crate::application::services::pipeline::provision;
use crate::application::services::retry::{Retrier, RetryStrategy, establish};
use crate::application::services::validate::validate_config;
use crate::domain::config::{ConnectionInfo, ProvisioningConfig, SSH_CONNECTION};
use crate::domain::error::ProvisionError;

/// Warnings and errors collected while validating a configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// `true` when there are no errors. Warnings do not fail validation.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate `config` without touching the network.
///
/// The caller's config is left untouched; validation runs on a copy.
pub fn validate_resource(
    config: &ProvisioningConfig,
    resolver: &impl PathResolver,
) -> ValidationReport {
    let mut config = config.clone();
    let mut report = ValidationReport::default();

    if let Err(e) = validate_config(&mut config, resolver) {
        report.errors.push(format!("{e:#}"));
        return report;
    }

    if config.module_path.is_some() {
        report.warnings.push(
            "module_path is ignored: modules are uploaded together with the playbook directory"
                .to_string(),
        );
    }
    if config.plays.is_empty() && config.hosts.is_empty() {
        report.warnings.push(
            "neither plays nor hosts are set: the bootstrap script needs at least one".to_string(),
        );
    }
    report
}

/// Apply `config` to the host behind `comm`.
///
/// Validates, rejects non-ssh connections, connects with retry inside the
/// communicator's timeout, runs the pipeline, and disconnects whatever the
/// pipeline's outcome.
///
/// # Errors
///
/// Returns the validation, connection, or pipeline error that stopped the run.
pub async fn apply_resource<C: Communicator>(
    sink: &impl OutputSink,
    connection: &ConnectionInfo,
    config: &ProvisioningConfig,
    comm: &C,
    resolver: &impl PathResolver,
    strategy: impl RetryStrategy,
) -> Result<()> {
    let mut config = config.clone();
    if let Err(e) = validate_config(&mut config, resolver) {
        sink.output("Invalid provisioner configuration settings");
        return Err(e);
    }

    if connection.kind != SSH_CONNECTION {
        return Err(ProvisionError::UnsupportedConnection(connection.kind.clone()).into());
    }

    let retrier = Retrier::new(comm.timeout(), strategy);
    establish(comm, &retrier).await?;
    tracing::info!(target_host = %connection.host, "connected");

    let result = provision(&config, comm, resolver, sink).await;

    if let Err(e) = comm.disconnect().await {
        tracing::warn!(error = %e, "disconnect failed");
    }
    result
}
